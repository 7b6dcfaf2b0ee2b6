pub mod admin;
pub mod employee;
pub mod gender;
pub mod leave;
