use std::sync::Arc;

use products_hr::{EmployeeDto, EmployeeService, Routes, SeaOrmEmployeeRepository};
use sea_orm::{ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, Statement};

pub async fn sqlite_pool() -> DatabaseConnection {
    let conn = Database::connect("sqlite::memory:").await.unwrap();
    bootstrap_sqlite(&conn).await;
    conn
}

async fn bootstrap_sqlite(db: &DatabaseConnection) {
    db.execute(Statement::from_string(
        DatabaseBackend::Sqlite,
        r#"
        CREATE TABLE employees (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            email TEXT NOT NULL,
            role TEXT
        );
        "#,
    ))
    .await
    .unwrap();
}

pub async fn repository() -> SeaOrmEmployeeRepository {
    SeaOrmEmployeeRepository::new(sqlite_pool().await)
}

pub async fn service() -> EmployeeService {
    EmployeeService::with_hal(Arc::new(repository().await), Routes::default())
}

pub fn dto(name: &str, email: &str) -> EmployeeDto {
    EmployeeDto::new(name, email)
}
