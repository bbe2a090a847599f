//! SeaORM entities backing the employees service.

pub mod employees;
