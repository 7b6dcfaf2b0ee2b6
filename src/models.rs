use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::AppError;
use crate::model::admin::Admin;
use crate::model::gender::Gender;
use crate::utils::validation::Violations;

/// Access-token payload.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Admin id.
    pub sub: u64,
    pub email: String,
    pub exp: usize,
    pub jti: String,
}

#[derive(Deserialize, ToSchema)]
pub struct RegisterAdmin {
    #[schema(example = "Super")]
    pub first_name: String,
    #[schema(example = "Admin")]
    pub last_name: String,
    #[schema(example = "admin@deptech.com", format = "email")]
    pub email: String,
    #[schema(example = "1990-01-01", format = "date", value_type = String)]
    #[serde(deserialize_with = "crate::utils::date::deserialize")]
    pub birth_date: NaiveDate,
    pub gender: Gender,
    #[schema(example = "admin123", min_length = 6)]
    pub password: String,
}

impl RegisterAdmin {
    pub fn validate(&self) -> Result<(), AppError> {
        Violations::new()
            .not_blank("first_name", &self.first_name)
            .not_blank("last_name", &self.last_name)
            .email("email", &self.email)
            .min_len("password", &self.password, 6)
            .finish()
    }
}

#[derive(Deserialize, ToSchema)]
pub struct LoginReqDto {
    #[schema(example = "admin@deptech.com")]
    pub email: String,
    #[schema(example = "admin123")]
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub user: Admin,
    pub access_token: String,
}
