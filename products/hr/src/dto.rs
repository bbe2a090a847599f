use entity::employees;
use serde::{Deserialize, Serialize};

use crate::error::{HrError, HrResult};

const MAX_NAME_CHARS: usize = 100;
const MAX_EMAIL_CHARS: usize = 254;

/// Transfer projection of an employee row.
///
/// `id` is ignored on input; the store assigns it and it is always present on
/// output.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role: Option<String>,
}

impl EmployeeDto {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            email: email.into(),
            role: None,
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    /// Normalizes the mutable fields, rejecting input the store must never see.
    pub fn validate(&self) -> HrResult<NewEmployee> {
        Ok(NewEmployee {
            name: validate_name(&self.name)?,
            email: validate_email(&self.email)?,
            role: self
                .role
                .as_deref()
                .map(str::trim)
                .filter(|role| !role.is_empty())
                .map(str::to_string),
        })
    }
}

impl From<employees::Model> for EmployeeDto {
    fn from(model: employees::Model) -> Self {
        Self {
            id: Some(model.id),
            name: model.name,
            email: model.email,
            role: model.role,
        }
    }
}

/// Validated mutable fields of an employee, ready for the repository.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewEmployee {
    pub name: String,
    pub email: String,
    pub role: Option<String>,
}

fn validate_name(value: &str) -> HrResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(HrError::validation("name is required"));
    }
    if trimmed.chars().count() > MAX_NAME_CHARS {
        return Err(HrError::validation(format!(
            "name must be <= {MAX_NAME_CHARS} characters"
        )));
    }
    Ok(trimmed.to_string())
}

fn validate_email(value: &str) -> HrResult<String> {
    let trimmed = value.trim();
    let Some((local, domain)) = trimmed.split_once('@') else {
        return Err(HrError::validation("invalid email address"));
    };
    if local.is_empty() || domain.is_empty() || trimmed.chars().any(char::is_whitespace) {
        return Err(HrError::validation("invalid email address"));
    }
    if trimmed.chars().count() > MAX_EMAIL_CHARS {
        return Err(HrError::validation("email address too long"));
    }
    Ok(trimmed.to_string())
}
