use crate::api::admin::UpdateAdmin;
use crate::api::employee::{CreateEmployee, UpdateEmployee};
use crate::api::leave::{CreateLeave, UpdateLeave};
use crate::model::admin::Admin;
use crate::model::employee::Employee;
use crate::model::gender::Gender;
use crate::model::leave::{Leave, LeaveStatus};
use crate::models::{LoginReqDto, RegisterAdmin};
use utoipa::Modify;
use utoipa::OpenApi;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "HRMS API",
        version = "1.0.0",
        description = r#"
## Employee & Leave Records

Admins manage employee records and their leave requests.

### 🔹 Leave rules
- At most **12 days** of leave per calendar year
- At most **1 day** of leave per calendar month
- A single request never crosses a month boundary

Requests that break a rule are answered with `400` and `details.reason`
set to one of `INVALID_RANGE`, `MULTI_MONTH_SPAN`, `YEARLY_QUOTA_EXCEEDED`,
`MONTHLY_QUOTA_EXCEEDED`.

### 🔐 Security
Everything except `/admin/register` and `/admin/login` requires a
**JWT Bearer** access token obtained from `/admin/login`.

### 📦 Response Format
Success: `{ "message", "data" }`.
Errors: `{ "status_code", "message", "error", "details", "timestamp" }`.
"#,
    ),
    paths(
        crate::auth::handlers::register,
        crate::auth::handlers::login,

        crate::api::admin::list_admins,
        crate::api::admin::get_admin,
        crate::api::admin::update_admin,
        crate::api::admin::delete_admin,

        crate::api::employee::create_employee,
        crate::api::employee::list_employees,
        crate::api::employee::list_employees_with_leaves,
        crate::api::employee::get_employee,
        crate::api::employee::get_employee_leaves,
        crate::api::employee::update_employee,
        crate::api::employee::delete_employee,

        crate::api::leave::create_leave,
        crate::api::leave::list_leaves,
        crate::api::leave::get_leave,
        crate::api::leave::update_leave,
        crate::api::leave::delete_leave
    ),
    components(
        schemas(
            Admin,
            RegisterAdmin,
            LoginReqDto,
            UpdateAdmin,
            Employee,
            CreateEmployee,
            UpdateEmployee,
            Gender,
            Leave,
            LeaveStatus,
            CreateLeave,
            UpdateLeave
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Admin", description = "Admin accounts and login"),
        (name = "Employee", description = "Employee records"),
        (name = "Leave", description = "Leave requests and quota checks"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_routes_and_bearer_scheme() {
        let doc = ApiDoc::openapi();

        assert!(doc.paths.paths.contains_key("/api/leave/{id}"));
        assert!(doc.paths.paths.contains_key("/api/employee/with-leaves"));
        assert!(doc
            .components
            .as_ref()
            .is_some_and(|c| c.security_schemes.contains_key("bearer_auth")));
    }
}
