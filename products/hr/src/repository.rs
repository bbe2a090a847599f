use async_trait::async_trait;
use entity::employees;
use platform_db::DbPool;
use sea_orm::{
    ActiveModelTrait,
    ActiveValue::{NotSet, Set, Unchanged},
    ColumnTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    sea_query::Expr,
};

use crate::dto::NewEmployee;

/// Persisted employee row.
pub type Employee = employees::Model;

/// Gateway to the `employees` table.
///
/// Lookups that find nothing return `None` or an empty vec; only store
/// failures surface as errors.
#[async_trait]
pub trait EmployeeRepository: Send + Sync {
    /// Every row, ordered by id.
    async fn find_all(&self) -> Result<Vec<Employee>, DbErr>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Employee>, DbErr>;

    /// Inserts a row and returns it with its store-assigned id.
    async fn insert(&self, employee: NewEmployee) -> Result<Employee, DbErr>;

    /// Overwrites the mutable fields of an existing row. `None` when no row
    /// with that id exists.
    async fn update(&self, employee: Employee) -> Result<Option<Employee>, DbErr>;

    /// `true` when a row was removed.
    async fn delete_by_id(&self, id: i64) -> Result<bool, DbErr>;

    async fn find_by_email(&self, email: &str) -> Result<Option<Employee>, DbErr>;

    /// Case-insensitive prefix match on name, ordered by id.
    async fn find_by_name_starting_with_ignore_case(
        &self,
        prefix: &str,
    ) -> Result<Vec<Employee>, DbErr>;
}

#[derive(Clone, Debug)]
pub struct SeaOrmEmployeeRepository {
    db: DbPool,
}

impl SeaOrmEmployeeRepository {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl EmployeeRepository for SeaOrmEmployeeRepository {
    async fn find_all(&self) -> Result<Vec<Employee>, DbErr> {
        employees::Entity::find()
            .order_by_asc(employees::Column::Id)
            .all(&self.db)
            .await
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Employee>, DbErr> {
        employees::Entity::find_by_id(id).one(&self.db).await
    }

    async fn insert(&self, employee: NewEmployee) -> Result<Employee, DbErr> {
        employees::ActiveModel {
            id: NotSet,
            name: Set(employee.name),
            email: Set(employee.email),
            role: Set(employee.role),
        }
        .insert(&self.db)
        .await
    }

    async fn update(&self, employee: Employee) -> Result<Option<Employee>, DbErr> {
        let model = employees::ActiveModel {
            id: Unchanged(employee.id),
            name: Set(employee.name),
            email: Set(employee.email),
            role: Set(employee.role),
        };
        match model.update(&self.db).await {
            Ok(updated) => Ok(Some(updated)),
            Err(DbErr::RecordNotUpdated) | Err(DbErr::RecordNotFound(_)) => Ok(None),
            Err(err) => Err(err),
        }
    }

    async fn delete_by_id(&self, id: i64) -> Result<bool, DbErr> {
        let result = employees::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(result.rows_affected > 0)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Employee>, DbErr> {
        employees::Entity::find()
            .filter(employees::Column::Email.eq(email))
            .order_by_asc(employees::Column::Id)
            .one(&self.db)
            .await
    }

    async fn find_by_name_starting_with_ignore_case(
        &self,
        prefix: &str,
    ) -> Result<Vec<Employee>, DbErr> {
        let pattern = format!("{}%", escape_like(prefix));
        employees::Entity::find()
            .filter(Expr::cust_with_exprs(
                NAME_PREFIX_MATCH,
                [
                    Expr::col((employees::Entity, employees::Column::Name)).into(),
                    Expr::val(pattern).into(),
                ],
            ))
            .order_by_asc(employees::Column::Id)
            .all(&self.db)
            .await
    }
}

// Avoids backslash, whose quoting differs between Postgres and SQLite.
const LIKE_ESCAPE: char = '!';

// Both sides are folded by the database so they agree on what `lower` means.
// SQLite only folds ASCII; Postgres folds per the database locale.
const NAME_PREFIX_MATCH: &str = "LOWER($1) LIKE LOWER($2) ESCAPE '!'";

/// Escapes LIKE metacharacters so the prefix matches literally.
fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if matches!(ch, '%' | '_' | LIKE_ESCAPE) {
            escaped.push(LIKE_ESCAPE);
        }
        escaped.push(ch);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::escape_like;

    #[test]
    fn escapes_like_metacharacters() {
        assert_eq!(escape_like("jo"), "jo");
        assert_eq!(escape_like("50%_a!b"), "50!%!_a!!b");
    }
}
