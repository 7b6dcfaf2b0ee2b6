use std::collections::HashMap;

use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

use crate::api::response::{created, ok};
use crate::error::AppError;
use crate::model::employee::{Employee, EmployeeChanges, EmployeeWithLeaves, NewEmployee};
use crate::model::gender::Gender;
use crate::model::leave::Leave;
use crate::store::Store;
use crate::utils::validation::Violations;

#[derive(Deserialize, Serialize, ToSchema)]
pub struct CreateEmployee {
    #[schema(example = "John")]
    pub first_name: String,
    #[schema(example = "Doe")]
    pub last_name: String,
    #[schema(example = "john@deptech.com", format = "email")]
    pub email: String,
    #[schema(example = "08123456789")]
    pub phone: String,
    #[schema(example = "Jakarta")]
    pub address: String,
    pub gender: Gender,
}

impl CreateEmployee {
    fn validate(&self) -> Result<(), AppError> {
        Violations::new()
            .not_blank("first_name", &self.first_name)
            .not_blank("last_name", &self.last_name)
            .email("email", &self.email)
            .not_blank("phone", &self.phone)
            .not_blank("address", &self.address)
            .finish()
    }

    fn into_new(self) -> NewEmployee {
        NewEmployee {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: self.phone.trim().to_string(),
            address: self.address.trim().to_string(),
            gender: self.gender,
        }
    }
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateEmployee {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[schema(format = "email")]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub gender: Option<Gender>,
}

impl UpdateEmployee {
    fn validate(&self) -> Result<(), AppError> {
        Violations::new()
            .optional(self.first_name.as_deref(), |v, s| {
                v.not_blank("first_name", s);
            })
            .optional(self.last_name.as_deref(), |v, s| {
                v.not_blank("last_name", s);
            })
            .optional(self.email.as_deref(), |v, s| {
                v.email("email", s);
            })
            .optional(self.phone.as_deref(), |v, s| {
                v.not_blank("phone", s);
            })
            .optional(self.address.as_deref(), |v, s| {
                v.not_blank("address", s);
            })
            .finish()
    }

    fn into_changes(self) -> EmployeeChanges {
        let trimmed = |v: Option<String>| v.map(|s| s.trim().to_string());
        EmployeeChanges {
            first_name: trimmed(self.first_name),
            last_name: trimmed(self.last_name),
            email: trimmed(self.email),
            phone: trimmed(self.phone),
            address: trimmed(self.address),
            gender: self.gender,
        }
    }
}

async fn find_employee(store: &dyn Store, id: u64) -> Result<Employee, AppError> {
    store
        .find_employee(id)
        .await
        .map_err(AppError::store("Employee", Some(id)))?
        .ok_or_else(|| AppError::not_found("Employee", id))
}

/// Create Employee
#[utoipa::path(
    post,
    path = "/api/employee",
    request_body = CreateEmployee,
    responses(
        (status = 201, description = "Employee created successfully", body = Object),
        (status = 400, description = "Validation failed", body = Object),
        (status = 409, description = "Employee with this email already exists", body = Object)
    ),
    tag = "Employee",
    security(("bearer_auth" = []))
)]
pub async fn create_employee(
    store: web::Data<dyn Store>,
    payload: web::Json<CreateEmployee>,
) -> Result<HttpResponse, AppError> {
    let payload = payload.into_inner();
    payload.validate()?;

    let employee = store
        .create_employee(payload.into_new())
        .await
        .map_err(AppError::store("Employee", None))?;

    info!(employee_id = employee.id, "Employee created");
    Ok(created("Employee created successfully", employee))
}

#[utoipa::path(
    get,
    path = "/api/employee",
    responses((status = 200, description = "Retrieved all employees", body = Object)),
    tag = "Employee",
    security(("bearer_auth" = []))
)]
pub async fn list_employees(store: web::Data<dyn Store>) -> Result<HttpResponse, AppError> {
    let employees = store
        .list_employees()
        .await
        .map_err(AppError::store("Employee", None))?;
    Ok(ok("Retrieved all employees", employees))
}

#[utoipa::path(
    get,
    path = "/api/employee/with-leaves",
    responses((status = 200, description = "Retrieved all employees with their leave records", body = Object)),
    tag = "Employee",
    security(("bearer_auth" = []))
)]
pub async fn list_employees_with_leaves(
    store: web::Data<dyn Store>,
) -> Result<HttpResponse, AppError> {
    let employees = store
        .list_employees()
        .await
        .map_err(AppError::store("Employee", None))?;
    let leaves = store
        .list_leaves(None)
        .await
        .map_err(AppError::store("Leave", None))?;

    let mut by_employee: HashMap<u64, Vec<Leave>> = HashMap::new();
    for leave in leaves {
        by_employee.entry(leave.employee_id).or_default().push(leave);
    }

    let data: Vec<EmployeeWithLeaves> = employees
        .into_iter()
        .map(|employee| EmployeeWithLeaves {
            leaves: by_employee.remove(&employee.id).unwrap_or_default(),
            employee,
        })
        .collect();

    Ok(ok("Retrieved all employees with their leave records", data))
}

#[utoipa::path(
    get,
    path = "/api/employee/{id}",
    params(("id" = u64, Path, description = "Employee id")),
    responses(
        (status = 200, description = "Retrieved employee", body = Employee),
        (status = 404, description = "Employee not found", body = Object)
    ),
    tag = "Employee",
    security(("bearer_auth" = []))
)]
pub async fn get_employee(
    store: web::Data<dyn Store>,
    path: web::Path<u64>,
) -> Result<HttpResponse, AppError> {
    let employee = find_employee(store.get_ref(), path.into_inner()).await?;
    Ok(ok("Retrieved employee", employee))
}

#[utoipa::path(
    get,
    path = "/api/employee/{id}/leaves",
    params(("id" = u64, Path, description = "Employee id")),
    responses(
        (status = 200, description = "Retrieved employee with leave records", body = Object),
        (status = 404, description = "Employee not found", body = Object)
    ),
    tag = "Employee",
    security(("bearer_auth" = []))
)]
pub async fn get_employee_leaves(
    store: web::Data<dyn Store>,
    path: web::Path<u64>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let employee = find_employee(store.get_ref(), id).await?;
    let leaves = store
        .list_leaves(Some(id))
        .await
        .map_err(AppError::store("Leave", None))?;

    Ok(ok(
        "Retrieved employee with leave records",
        EmployeeWithLeaves { employee, leaves },
    ))
}

#[utoipa::path(
    patch,
    path = "/api/employee/{id}",
    params(("id" = u64, Path, description = "Employee id")),
    request_body = UpdateEmployee,
    responses(
        (status = 200, description = "Employee updated successfully", body = Employee),
        (status = 404, description = "Employee not found", body = Object),
        (status = 409, description = "Employee with this email already exists", body = Object)
    ),
    tag = "Employee",
    security(("bearer_auth" = []))
)]
pub async fn update_employee(
    store: web::Data<dyn Store>,
    path: web::Path<u64>,
    payload: web::Json<UpdateEmployee>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let payload = payload.into_inner();
    payload.validate()?;

    let employee = store
        .update_employee(id, payload.into_changes())
        .await
        .map_err(AppError::store("Employee", Some(id)))?
        .ok_or_else(|| AppError::not_found("Employee", id))?;

    info!(employee_id = id, "Employee updated");
    Ok(ok("Employee updated successfully", employee))
}

#[utoipa::path(
    delete,
    path = "/api/employee/{id}",
    params(("id" = u64, Path, description = "Employee id")),
    responses(
        (status = 200, description = "Employee deleted successfully", body = Object),
        (status = 404, description = "Employee not found", body = Object),
        (status = 409, description = "Employee still has leave records", body = Object)
    ),
    tag = "Employee",
    security(("bearer_auth" = []))
)]
pub async fn delete_employee(
    store: web::Data<dyn Store>,
    path: web::Path<u64>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let deleted = store
        .delete_employee(id)
        .await
        .map_err(AppError::store("Employee", Some(id)))?;

    if !deleted {
        return Err(AppError::not_found("Employee", id));
    }

    info!(employee_id = id, "Employee deleted");
    Ok(ok("Employee deleted successfully", ()))
}
