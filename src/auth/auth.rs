use actix_web::{FromRequest, HttpMessage, HttpRequest, dev::Payload};
use futures::future::{Ready, ready};

use crate::error::AppError;

/// The admin behind the bearer token, put in request extensions by
/// `auth_middleware`.
#[derive(Debug, Clone)]
pub struct AuthAdmin {
    pub admin_id: u64,
    pub email: String,
}

impl FromRequest for AuthAdmin {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<AuthAdmin>()
                .cloned()
                .ok_or_else(|| AppError::Unauthorized("Missing token".to_string()).into()),
        )
    }
}
