use actix_web::body::{BoxBody, MessageBody};
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::http::{StatusCode, Uri};
use actix_web::middleware::Next;
use actix_web::{HttpResponse, ResponseError};
use chrono::Utc;
use derive_more::Display;
use serde_json::{Value, json};

use crate::eligibility::Rejection;
use crate::store::StoreError;

#[derive(Debug, Display)]
pub enum AppError {
    #[display(fmt = "{}", _0)]
    BadRequest(String),

    /// Field-level problems in a request body.
    #[display(fmt = "Validation failed")]
    Validation(Vec<String>),

    #[display(fmt = "{}", _0)]
    LeaveRejected(Rejection),

    #[display(fmt = "{}", _0)]
    Unauthorized(String),

    #[display(fmt = "{}", _0)]
    NotFound(String),

    #[display(fmt = "{}", _0)]
    Conflict(String),

    /// Detail is logged, never sent to the client.
    #[display(fmt = "Internal server error")]
    Internal(String),
}

impl std::error::Error for AppError {}

impl AppError {
    pub fn not_found(entity: &str, id: u64) -> Self {
        AppError::NotFound(format!("{} with ID {} not found", entity, id))
    }

    /// Translates a store failure for the given entity, e.g.
    /// `.map_err(AppError::store("Employee", Some(id)))`.
    pub fn store(entity: &'static str, id: Option<u64>) -> impl FnOnce(StoreError) -> AppError {
        move |err| {
            let identifier = id.map(|id| format!(" with ID {}", id)).unwrap_or_default();
            match err {
                StoreError::Duplicate(field) => {
                    AppError::Conflict(format!("{} with this {} already exists", entity, field))
                }
                StoreError::Referenced => AppError::Conflict(format!(
                    "Cannot modify {}{} because it is referenced by other records",
                    entity, identifier
                )),
                StoreError::MissingReference => AppError::BadRequest(format!(
                    "{}{} references a record that does not exist",
                    entity, identifier
                )),
                other => {
                    tracing::error!(error = %other, entity, id, "Store operation failed");
                    AppError::Internal(other.to_string())
                }
            }
        }
    }

    fn details(&self) -> Value {
        match self {
            AppError::Validation(problems) => json!(problems),
            AppError::LeaveRejected(rejection) => json!({ "reason": rejection.reason() }),
            _ => Value::Null,
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::store("Record", None)(err)
    }
}

impl From<Rejection> for AppError {
    fn from(rejection: Rejection) -> Self {
        AppError::LeaveRejected(rejection)
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) | AppError::Validation(_) | AppError::LeaveRejected(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        self.envelope(None)
    }
}

impl AppError {
    /// The JSON error body. `path` is the request target, filled in by
    /// `with_request_path` on routed requests.
    pub fn envelope(&self, path: Option<&str>) -> HttpResponse {
        let status = self.status_code();
        let mut body = json!({
            "status_code": status.as_u16(),
            "message": self.to_string(),
            "error": status.canonical_reason().unwrap_or("Error"),
            "details": self.details(),
            "timestamp": Utc::now().to_rfc3339(),
        });
        if let Some(path) = path {
            body["path"] = json!(path);
        }
        HttpResponse::build(status).json(body)
    }
}

/// Path plus query string, as the client sent it.
pub fn request_target(uri: &Uri) -> String {
    uri.path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| uri.path().to_string())
}

/// Re-renders responses carrying an `AppError` so the envelope names the
/// request that failed.
pub async fn with_request_path<B: MessageBody + 'static>(
    req: ServiceRequest,
    next: Next<B>,
) -> Result<ServiceResponse<BoxBody>, actix_web::Error> {
    let target = request_target(req.uri());
    let res = next.call(req).await?;

    let rendered = res
        .response()
        .error()
        .and_then(|err| err.as_error::<AppError>())
        .map(|err| err.envelope(Some(&target)));

    Ok(match rendered {
        Some(response) => res.into_response(response),
        None => res.map_into_boxed_body(),
    })
}
