use sea_orm_migration::{prelude::*, sea_orm::ConnectionTrait};

const UP_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS employees (
    id bigserial PRIMARY KEY,
    name text NOT NULL,
    email text NOT NULL,
    role text NULL
);

CREATE INDEX IF NOT EXISTS idx_employees_email ON employees (email);
CREATE INDEX IF NOT EXISTS idx_employees_name_lower ON employees (lower(name) text_pattern_ops);
"#;

const DOWN_SQL: &str = r#"
DROP INDEX IF EXISTS idx_employees_name_lower;
DROP INDEX IF EXISTS idx_employees_email;
DROP TABLE IF EXISTS employees;
"#;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(UP_SQL)
            .await
            .map(|_| ())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(DOWN_SQL)
            .await
            .map(|_| ())
    }
}
