use chrono::NaiveDate;
use serde::Serialize;
use utoipa::ToSchema;

use super::gender::Gender;

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "first_name": "Super",
        "last_name": "Admin",
        "email": "admin@deptech.com",
        "birth_date": "1990-01-01",
        "gender": "MALE"
    })
)]
pub struct Admin {
    pub id: u64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[schema(value_type = String, format = "date")]
    pub birth_date: NaiveDate,
    pub gender: Gender,
    /// Argon2 PHC string; never leaves the service.
    #[serde(skip)]
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct NewAdmin {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub birth_date: NaiveDate,
    pub gender: Gender,
    pub password: String,
}

/// Partial update; a supplied password must already be hashed.
#[derive(Debug, Clone, Default)]
pub struct AdminChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub password: Option<String>,
}

impl AdminChanges {
    pub fn apply_to(&self, admin: &Admin) -> Admin {
        Admin {
            id: admin.id,
            first_name: self
                .first_name
                .clone()
                .unwrap_or_else(|| admin.first_name.clone()),
            last_name: self
                .last_name
                .clone()
                .unwrap_or_else(|| admin.last_name.clone()),
            email: self.email.clone().unwrap_or_else(|| admin.email.clone()),
            birth_date: self.birth_date.unwrap_or(admin.birth_date),
            gender: self.gender.unwrap_or(admin.gender),
            password: self
                .password
                .clone()
                .unwrap_or_else(|| admin.password.clone()),
        }
    }
}
