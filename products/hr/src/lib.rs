//! HR vertical slice.
//!
//! The slice is layered the same way every product crate is: a narrow
//! [`EmployeeRepository`] over the `employees` table, an [`EmployeeService`]
//! that owns not-found semantics and response shaping, and a [`hal`] module
//! that decorates transfer objects with hypermedia links. The HTTP surface
//! lives in the server crate and only renders [`EmployeeReply`] values.

pub mod dto;
pub mod error;
pub mod hal;
pub mod repository;
pub mod service;

pub use dto::{EmployeeDto, NewEmployee};
pub use error::{HrError, HrResult};
pub use hal::{
    Assembler, CollectionModel, EntityModel, HalAssembler, Link, Links, PlainAssembler, Routes,
};
pub use repository::{Employee, EmployeeRepository, SeaOrmEmployeeRepository};
pub use service::{EmployeeReply, EmployeeService};
