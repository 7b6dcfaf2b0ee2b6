//! Record store for admins, employees and leaves.
//!
//! Handlers and the leave service only see the traits below, injected as
//! `web::Data<dyn Store>`. `MySqlStore` backs production, `MemoryStore` backs
//! tests and local demos.

use async_trait::async_trait;
use derive_more::Display;

use crate::model::admin::{Admin, AdminChanges, NewAdmin};
use crate::model::employee::{Employee, EmployeeChanges, NewEmployee};
use crate::model::leave::{Leave, LeaveChanges, NewLeave};

pub mod memory;
pub mod mysql;
pub mod seed;

pub use memory::MemoryStore;
pub use mysql::MySqlStore;

#[derive(Debug, Display)]
pub enum StoreError {
    /// A unique column already holds the value; carries the column name.
    #[display(fmt = "duplicate value for {}", _0)]
    Duplicate(String),
    /// Deleting would orphan rows that point at this one.
    #[display(fmt = "record is referenced by other records")]
    Referenced,
    /// The row points at something that does not exist.
    #[display(fmt = "referenced record does not exist")]
    MissingReference,
    #[display(fmt = "corrupt row: {}", _0)]
    Corrupt(String),
    #[display(fmt = "database error: {}", _0)]
    Database(sqlx::Error),
    #[display(fmt = "store unavailable: {}", _0)]
    Unavailable(String),
}

impl std::error::Error for StoreError {}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return StoreError::Duplicate(unique_column(db_err.message()));
            }
            if db_err.is_foreign_key_violation() {
                // 1451: parent row still referenced, 1452: child points nowhere.
                return if db_err.message().contains("parent row") {
                    StoreError::Referenced
                } else {
                    StoreError::MissingReference
                };
            }
        }
        StoreError::Database(err)
    }
}

/// Pulls the key name out of MySQL's "Duplicate entry 'x' for key 'table.email'".
fn unique_column(message: &str) -> String {
    message
        .rsplit_once("for key ")
        .map(|(_, key)| key.trim_matches(|c| c == '\'' || c == '`'))
        .and_then(|key| key.rsplit('.').next())
        .filter(|key| !key.is_empty())
        .unwrap_or("field")
        .to_string()
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait AdminStore: Send + Sync {
    async fn create_admin(&self, admin: NewAdmin) -> StoreResult<Admin>;
    async fn find_admin(&self, id: u64) -> StoreResult<Option<Admin>>;
    async fn find_admin_by_email(&self, email: &str) -> StoreResult<Option<Admin>>;
    async fn list_admins(&self) -> StoreResult<Vec<Admin>>;
    /// Every registered email, for warming the availability index.
    async fn admin_emails(&self) -> StoreResult<Vec<String>>;
    async fn update_admin(&self, id: u64, changes: AdminChanges) -> StoreResult<Option<Admin>>;
    async fn delete_admin(&self, id: u64) -> StoreResult<bool>;
}

#[async_trait]
pub trait EmployeeStore: Send + Sync {
    async fn create_employee(&self, employee: NewEmployee) -> StoreResult<Employee>;
    async fn find_employee(&self, id: u64) -> StoreResult<Option<Employee>>;
    async fn list_employees(&self) -> StoreResult<Vec<Employee>>;
    async fn update_employee(
        &self,
        id: u64,
        changes: EmployeeChanges,
    ) -> StoreResult<Option<Employee>>;
    async fn delete_employee(&self, id: u64) -> StoreResult<bool>;
}

#[async_trait]
pub trait LeaveStore: Send + Sync {
    async fn create_leave(&self, leave: NewLeave) -> StoreResult<Leave>;
    async fn find_leave(&self, id: u64) -> StoreResult<Option<Leave>>;
    async fn list_leaves(&self, employee_id: Option<u64>) -> StoreResult<Vec<Leave>>;
    /// An employee's leaves, optionally minus the one being edited.
    async fn leaves_for_employee(
        &self,
        employee_id: u64,
        exclude_id: Option<u64>,
    ) -> StoreResult<Vec<Leave>>;
    async fn update_leave(&self, id: u64, changes: LeaveChanges) -> StoreResult<Option<Leave>>;
    async fn delete_leave(&self, id: u64) -> StoreResult<bool>;
}

pub trait Store: AdminStore + EmployeeStore + LeaveStore {}

impl<T: AdminStore + EmployeeStore + LeaveStore> Store for T {}

#[cfg(test)]
mod tests {
    use super::unique_column;

    #[test]
    fn unique_column_reads_mysql_key_names() {
        assert_eq!(
            unique_column("Duplicate entry 'a@b.c' for key 'admins.email'"),
            "email"
        );
        assert_eq!(unique_column("Duplicate entry 'a@b.c' for key 'email'"), "email");
        assert_eq!(unique_column("something else entirely"), "field");
    }
}
