use crate::auth::auth::AuthAdmin;
use crate::auth::jwt::verify_token;
use crate::config::Config;
use crate::error::request_target;
use actix_web::middleware::Next;
use actix_web::{
    Error, HttpMessage, HttpResponse,
    body::BoxBody,
    dev::{ServiceRequest, ServiceResponse},
    web::Data,
};
use serde_json::json;

fn unauthorized(message: &str, details: Option<String>, path: &str) -> HttpResponse {
    HttpResponse::Unauthorized().json(json!({
        "status_code": 401,
        "message": message,
        "error": "Unauthorized",
        "details": details,
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "path": path,
    }))
}

pub async fn auth_middleware(
    req: ServiceRequest,
    next: Next<BoxBody>,
) -> Result<ServiceResponse<BoxBody>, Error> {
    let config = req
        .app_data::<Data<Config>>()
        .ok_or_else(|| actix_web::error::ErrorInternalServerError("App config missing"))?;
    let path = request_target(req.uri());

    let header_value = match req.headers().get("Authorization") {
        Some(h) => match h.to_str() {
            Ok(v) => v,
            Err(_) => {
                let resp = unauthorized("Invalid Authorization header encoding", None, &path);
                return Ok(req.into_response(resp));
            }
        },
        None => {
            let resp = unauthorized("Missing Authorization header", None, &path);
            return Ok(req.into_response(resp));
        }
    };

    let token = match header_value.strip_prefix("Bearer ") {
        Some(t) => t,
        None => {
            let resp = unauthorized("Authorization header must start with Bearer", None, &path);
            return Ok(req.into_response(resp));
        }
    };

    let claims = match verify_token(token, &config.jwt_secret) {
        Ok(c) => c,
        Err(e) => {
            tracing::debug!(error = %e, "Rejected bearer token");
            let resp = unauthorized("Invalid or expired token", Some(e), &path);
            return Ok(req.into_response(resp));
        }
    };

    let auth_admin = AuthAdmin {
        admin_id: claims.sub,
        email: claims.email,
    };

    req.extensions_mut().insert(auth_admin);

    next.call(req).await
}
