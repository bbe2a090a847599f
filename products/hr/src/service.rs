use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::{
    dto::EmployeeDto,
    error::{HrError, HrResult},
    hal::{Assembler, CollectionModel, EntityModel, HalAssembler, Routes},
    repository::{Employee, EmployeeRepository},
};

/// Outcome of a single-resource operation.
///
/// `NotFound` is a regular result, not an error: the caller decides how to
/// render it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EmployeeReply {
    Found(EntityModel<EmployeeDto>),
    Created {
        location: String,
        body: EntityModel<EmployeeDto>,
    },
    Deleted,
    NotFound {
        id: i64,
    },
}

impl EmployeeReply {
    pub fn is_not_found(&self) -> bool {
        matches!(self, EmployeeReply::NotFound { .. })
    }

    /// The resource carried by `Found` or `Created`.
    pub fn resource(&self) -> Option<&EntityModel<EmployeeDto>> {
        match self {
            EmployeeReply::Found(model) | EmployeeReply::Created { body: model, .. } => {
                Some(model)
            }
            EmployeeReply::Deleted | EmployeeReply::NotFound { .. } => None,
        }
    }
}

/// Application-facing employee operations.
#[derive(Clone)]
pub struct EmployeeService {
    repo: Arc<dyn EmployeeRepository>,
    routes: Routes,
    assembler: Arc<dyn Assembler>,
}

impl EmployeeService {
    pub fn new(
        repo: Arc<dyn EmployeeRepository>,
        routes: Routes,
        assembler: Arc<dyn Assembler>,
    ) -> Self {
        Self {
            repo,
            routes,
            assembler,
        }
    }

    /// Service emitting HAL links against `routes`.
    pub fn with_hal(repo: Arc<dyn EmployeeRepository>, routes: Routes) -> Self {
        Self::new(repo, routes, Arc::new(HalAssembler))
    }

    #[instrument(name = "employees.find_all", skip_all)]
    pub async fn find_all(&self) -> HrResult<CollectionModel<EmployeeDto>> {
        let rows = self.repo.find_all().await?;
        Ok(self.collection(rows, self.routes.employees()))
    }

    #[instrument(name = "employees.new", skip_all)]
    pub async fn new_employee(&self, dto: EmployeeDto) -> HrResult<EmployeeReply> {
        let input = dto.validate()?;
        let created = self.repo.insert(input).await?;
        info!(id = created.id, "employee created");
        Ok(EmployeeReply::Created {
            location: self.routes.employee(created.id),
            body: self.model(created),
        })
    }

    #[instrument(name = "employees.find_by_id", skip(self))]
    pub async fn find_by_id(&self, id: i64) -> HrResult<EmployeeReply> {
        match self.repo.find_by_id(id).await? {
            Some(employee) => Ok(EmployeeReply::Found(self.model(employee))),
            None => {
                debug!("employee not found");
                Ok(EmployeeReply::NotFound { id })
            }
        }
    }

    #[instrument(name = "employees.find_by_email", skip(self))]
    pub async fn find_by_email(&self, email: &str) -> HrResult<EntityModel<EmployeeDto>> {
        let employee = self
            .repo
            .find_by_email(email)
            .await?
            .ok_or_else(|| HrError::EmailNotFound(email.to_string()))?;
        Ok(self.model(employee))
    }

    /// Overwrites the mutable fields of an existing employee. A missing id is
    /// reported as `NotFound` and nothing is created.
    #[instrument(name = "employees.save", skip(self, dto))]
    pub async fn save(&self, dto: EmployeeDto, id: i64) -> HrResult<EmployeeReply> {
        let input = dto.validate()?;
        let Some(mut current) = self.repo.find_by_id(id).await? else {
            debug!("save rejected: employee not found");
            return Ok(EmployeeReply::NotFound { id });
        };
        current.name = input.name;
        current.email = input.email;
        current.role = input.role;
        match self.repo.update(current).await? {
            Some(updated) => {
                info!("employee updated");
                Ok(EmployeeReply::Found(self.model(updated)))
            }
            None => {
                debug!("employee removed before update");
                Ok(EmployeeReply::NotFound { id })
            }
        }
    }

    #[instrument(name = "employees.delete", skip(self))]
    pub async fn delete_by_id(&self, id: i64) -> HrResult<EmployeeReply> {
        if self.repo.delete_by_id(id).await? {
            info!("employee deleted");
            Ok(EmployeeReply::Deleted)
        } else {
            debug!("delete skipped: employee not found");
            Ok(EmployeeReply::NotFound { id })
        }
    }

    #[instrument(name = "employees.find_by_name_prefix", skip(self))]
    pub async fn find_by_name_starting_with(
        &self,
        prefix: &str,
    ) -> HrResult<CollectionModel<EmployeeDto>> {
        let rows = self
            .repo
            .find_by_name_starting_with_ignore_case(prefix)
            .await?;
        Ok(self.collection(rows, self.routes.search_by_name(prefix)))
    }

    fn model(&self, employee: Employee) -> EntityModel<EmployeeDto> {
        self.assembler
            .to_model(&self.routes, EmployeeDto::from(employee))
    }

    fn collection(&self, rows: Vec<Employee>, self_href: String) -> CollectionModel<EmployeeDto> {
        let items = rows.into_iter().map(|row| self.model(row)).collect();
        self.assembler.to_collection(items, self_href)
    }
}
