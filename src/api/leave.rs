use actix_web::{HttpResponse, web};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::debug;
use utoipa::{IntoParams, ToSchema};

use crate::api::response::{created, ok};
use crate::auth::auth::AuthAdmin;
use crate::error::AppError;
use crate::model::leave::{LeaveChanges, LeaveStatus, NewLeave};
use crate::service::LeaveService;
use crate::utils::validation::Violations;

#[derive(Deserialize, ToSchema)]
pub struct CreateLeave {
    #[schema(example = "Family Event")]
    pub reason: String,
    /// `YYYY-MM-DD` or an RFC 3339 timestamp
    #[schema(example = "2025-09-10", format = "date", value_type = String)]
    #[serde(deserialize_with = "crate::utils::date::deserialize")]
    pub start_date: NaiveDate,
    #[schema(example = "2025-09-10", format = "date", value_type = String)]
    #[serde(deserialize_with = "crate::utils::date::deserialize")]
    pub end_date: NaiveDate,
    #[schema(example = 1)]
    pub employee_id: u64,
    #[serde(default)]
    pub status: LeaveStatus,
}

impl CreateLeave {
    fn validate(&self) -> Result<(), AppError> {
        Violations::new().not_blank("reason", &self.reason).finish()
    }

    fn into_new(self) -> NewLeave {
        NewLeave {
            reason: self.reason.trim().to_string(),
            start_date: self.start_date,
            end_date: self.end_date,
            employee_id: self.employee_id,
            status: self.status,
        }
    }
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateLeave {
    pub reason: Option<String>,
    #[schema(example = "2025-10-15", format = "date", value_type = Option<String>)]
    #[serde(default, deserialize_with = "crate::utils::date::deserialize_option")]
    pub start_date: Option<NaiveDate>,
    #[schema(example = "2025-10-15", format = "date", value_type = Option<String>)]
    #[serde(default, deserialize_with = "crate::utils::date::deserialize_option")]
    pub end_date: Option<NaiveDate>,
    pub status: Option<LeaveStatus>,
}

impl UpdateLeave {
    fn validate(&self) -> Result<(), AppError> {
        Violations::new()
            .optional(self.reason.as_deref(), |v, s| {
                v.not_blank("reason", s);
            })
            .finish()
    }

    fn into_changes(self) -> LeaveChanges {
        LeaveChanges {
            reason: self.reason.map(|s| s.trim().to_string()),
            start_date: self.start_date,
            end_date: self.end_date,
            status: self.status,
        }
    }
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LeaveQuery {
    /// Only leaves of this employee
    pub employee_id: Option<u64>,
}

/// Request a leave; rejected when it breaks the yearly or monthly quota.
#[utoipa::path(
    post,
    path = "/api/leave",
    request_body = CreateLeave,
    responses(
        (status = 201, description = "Leave request created successfully", body = Object),
        (status = 400, description = "Rejected by the leave rules", body = Object, example = json!({
            "status_code": 400,
            "message": "Leave request exceeds the limit of 1 day(s) per month.",
            "error": "Bad Request",
            "details": { "reason": "MONTHLY_QUOTA_EXCEEDED" },
            "timestamp": "2025-09-01T00:00:00+00:00"
        })),
        (status = 404, description = "Employee not found", body = Object)
    ),
    tag = "Leave",
    security(("bearer_auth" = []))
)]
pub async fn create_leave(
    admin: AuthAdmin,
    leaves: web::Data<LeaveService>,
    payload: web::Json<CreateLeave>,
) -> Result<HttpResponse, AppError> {
    let payload = payload.into_inner();
    payload.validate()?;

    debug!(admin_id = admin.admin_id, employee_id = payload.employee_id, "Leave requested");
    let leave = leaves.create(payload.into_new()).await?;
    Ok(created("Leave request created successfully", leave))
}

#[utoipa::path(
    get,
    path = "/api/leave",
    params(LeaveQuery),
    responses((status = 200, description = "Retrieved leave records", body = Object)),
    tag = "Leave",
    security(("bearer_auth" = []))
)]
pub async fn list_leaves(
    leaves: web::Data<LeaveService>,
    query: web::Query<LeaveQuery>,
) -> Result<HttpResponse, AppError> {
    let records = leaves.list(query.employee_id).await?;
    Ok(ok("Retrieved leave records", records))
}

#[utoipa::path(
    get,
    path = "/api/leave/{id}",
    params(("id" = u64, Path, description = "Leave id")),
    responses(
        (status = 200, description = "Retrieved leave record", body = Object),
        (status = 404, description = "Leave not found", body = Object)
    ),
    tag = "Leave",
    security(("bearer_auth" = []))
)]
pub async fn get_leave(
    leaves: web::Data<LeaveService>,
    path: web::Path<u64>,
) -> Result<HttpResponse, AppError> {
    let leave = leaves.find(path.into_inner()).await?;
    Ok(ok("Retrieved leave record", leave))
}

/// Partial update. New dates go through the leave rules again, with the
/// record itself left out of the totals.
#[utoipa::path(
    patch,
    path = "/api/leave/{id}",
    params(("id" = u64, Path, description = "Leave id")),
    request_body = UpdateLeave,
    responses(
        (status = 200, description = "Leave record updated successfully", body = Object),
        (status = 400, description = "Rejected by the leave rules", body = Object),
        (status = 404, description = "Leave not found", body = Object)
    ),
    tag = "Leave",
    security(("bearer_auth" = []))
)]
pub async fn update_leave(
    admin: AuthAdmin,
    leaves: web::Data<LeaveService>,
    path: web::Path<u64>,
    payload: web::Json<UpdateLeave>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let payload = payload.into_inner();
    payload.validate()?;

    debug!(admin_id = admin.admin_id, leave_id = id, "Leave update requested");
    let leave = leaves.update(id, payload.into_changes()).await?;
    Ok(ok("Leave record updated successfully", leave))
}

#[utoipa::path(
    delete,
    path = "/api/leave/{id}",
    params(("id" = u64, Path, description = "Leave id")),
    responses(
        (status = 200, description = "Leave record deleted successfully", body = Object),
        (status = 404, description = "Leave not found", body = Object)
    ),
    tag = "Leave",
    security(("bearer_auth" = []))
)]
pub async fn delete_leave(
    leaves: web::Data<LeaveService>,
    path: web::Path<u64>,
) -> Result<HttpResponse, AppError> {
    leaves.delete(path.into_inner()).await?;
    Ok(ok("Leave record deleted successfully", ()))
}
