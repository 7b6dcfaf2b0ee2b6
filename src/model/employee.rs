use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::gender::Gender;
use super::leave::Leave;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "first_name": "John",
        "last_name": "Doe",
        "email": "john@deptech.com",
        "phone": "08123456789",
        "address": "Jakarta",
        "gender": "MALE"
    })
)]
pub struct Employee {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = "John")]
    pub first_name: String,

    #[schema(example = "Doe")]
    pub last_name: String,

    #[schema(example = "john@deptech.com")]
    pub email: String,

    #[schema(example = "08123456789")]
    pub phone: String,

    #[schema(example = "Jakarta")]
    pub address: String,

    pub gender: Gender,
}

#[derive(Debug, Clone)]
pub struct NewEmployee {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub gender: Gender,
}

/// Fields to overwrite; `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct EmployeeChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub gender: Option<Gender>,
}

impl EmployeeChanges {
    pub fn apply_to(&self, employee: &Employee) -> Employee {
        Employee {
            id: employee.id,
            first_name: self
                .first_name
                .clone()
                .unwrap_or_else(|| employee.first_name.clone()),
            last_name: self
                .last_name
                .clone()
                .unwrap_or_else(|| employee.last_name.clone()),
            email: self.email.clone().unwrap_or_else(|| employee.email.clone()),
            phone: self.phone.clone().unwrap_or_else(|| employee.phone.clone()),
            address: self
                .address
                .clone()
                .unwrap_or_else(|| employee.address.clone()),
            gender: self.gender.unwrap_or(employee.gender),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EmployeeWithLeaves {
    #[serde(flatten)]
    pub employee: Employee,
    pub leaves: Vec<Leave>,
}
