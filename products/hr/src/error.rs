use sea_orm::DbErr;
use thiserror::Error;

pub type HrResult<T> = Result<T, HrError>;

#[derive(Debug, Error)]
pub enum HrError {
    #[error("invalid employee: {0}")]
    Validation(String),
    #[error("no employee with email {0}")]
    EmailNotFound(String),
    #[error(transparent)]
    Storage(#[from] DbErr),
}

impl HrError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}
