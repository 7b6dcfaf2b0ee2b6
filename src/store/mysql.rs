use async_trait::async_trait;
use chrono::NaiveDate;
use futures_util::TryStreamExt;
use sqlx::{FromRow, MySqlPool};

use super::{AdminStore, EmployeeStore, LeaveStore, StoreError, StoreResult};
use crate::model::admin::{Admin, AdminChanges, NewAdmin};
use crate::model::employee::{Employee, EmployeeChanges, NewEmployee};
use crate::model::gender::Gender;
use crate::model::leave::{Leave, LeaveChanges, LeaveStatus, NewLeave};
use crate::utils::db_utils::{UpdateBuilder, execute_update};

const ADMIN_COLUMNS: &str = "id, first_name, last_name, email, birth_date, gender, password";
const EMPLOYEE_COLUMNS: &str = "id, first_name, last_name, email, phone, address, gender";
const LEAVE_COLUMNS: &str = "id, reason, start_date, end_date, employee_id, status";

#[derive(Clone)]
pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct AdminRow {
    id: u64,
    first_name: String,
    last_name: String,
    email: String,
    birth_date: NaiveDate,
    gender: String,
    password: String,
}

impl TryFrom<AdminRow> for Admin {
    type Error = StoreError;

    fn try_from(row: AdminRow) -> Result<Self, Self::Error> {
        Ok(Admin {
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            birth_date: row.birth_date,
            gender: parse_gender(&row.gender)?,
            password: row.password,
        })
    }
}

#[derive(FromRow)]
struct EmployeeRow {
    id: u64,
    first_name: String,
    last_name: String,
    email: String,
    phone: String,
    address: String,
    gender: String,
}

impl TryFrom<EmployeeRow> for Employee {
    type Error = StoreError;

    fn try_from(row: EmployeeRow) -> Result<Self, Self::Error> {
        Ok(Employee {
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            phone: row.phone,
            address: row.address,
            gender: parse_gender(&row.gender)?,
        })
    }
}

#[derive(FromRow)]
struct LeaveRow {
    id: u64,
    reason: String,
    start_date: NaiveDate,
    end_date: NaiveDate,
    employee_id: u64,
    status: String,
}

impl TryFrom<LeaveRow> for Leave {
    type Error = StoreError;

    fn try_from(row: LeaveRow) -> Result<Self, Self::Error> {
        let status = row
            .status
            .parse::<LeaveStatus>()
            .map_err(|e| StoreError::Corrupt(format!("leave {} status {:?}: {}", row.id, row.status, e)))?;
        Ok(Leave {
            id: row.id,
            reason: row.reason,
            start_date: row.start_date,
            end_date: row.end_date,
            employee_id: row.employee_id,
            status,
        })
    }
}

fn parse_gender(value: &str) -> StoreResult<Gender> {
    value
        .parse::<Gender>()
        .map_err(|e| StoreError::Corrupt(format!("gender {:?}: {}", value, e)))
}

fn convert<R, T>(rows: Vec<R>) -> StoreResult<Vec<T>>
where
    T: TryFrom<R, Error = StoreError>,
{
    rows.into_iter().map(T::try_from).collect()
}

#[async_trait]
impl AdminStore for MySqlStore {
    async fn create_admin(&self, admin: NewAdmin) -> StoreResult<Admin> {
        let result = sqlx::query(
            r#"
            INSERT INTO admins (first_name, last_name, email, birth_date, gender, password)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&admin.first_name)
        .bind(&admin.last_name)
        .bind(&admin.email)
        .bind(admin.birth_date)
        .bind(admin.gender.as_ref())
        .bind(&admin.password)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_id();
        self.find_admin(id)
            .await?
            .ok_or_else(|| StoreError::Corrupt(format!("admin {} vanished after insert", id)))
    }

    async fn find_admin(&self, id: u64) -> StoreResult<Option<Admin>> {
        let sql = format!("SELECT {} FROM admins WHERE id = ?", ADMIN_COLUMNS);
        sqlx::query_as::<_, AdminRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Admin::try_from)
            .transpose()
    }

    async fn find_admin_by_email(&self, email: &str) -> StoreResult<Option<Admin>> {
        let sql = format!("SELECT {} FROM admins WHERE email = ?", ADMIN_COLUMNS);
        sqlx::query_as::<_, AdminRow>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?
            .map(Admin::try_from)
            .transpose()
    }

    async fn list_admins(&self) -> StoreResult<Vec<Admin>> {
        let sql = format!("SELECT {} FROM admins ORDER BY id", ADMIN_COLUMNS);
        let rows = sqlx::query_as::<_, AdminRow>(&sql)
            .fetch_all(&self.pool)
            .await?;
        convert(rows)
    }

    async fn admin_emails(&self) -> StoreResult<Vec<String>> {
        let emails = sqlx::query_scalar::<_, String>("SELECT email FROM admins")
            .fetch(&self.pool)
            .try_collect::<Vec<_>>()
            .await?;
        Ok(emails)
    }

    async fn update_admin(&self, id: u64, changes: AdminChanges) -> StoreResult<Option<Admin>> {
        if self.find_admin(id).await?.is_none() {
            return Ok(None);
        }

        let update = UpdateBuilder::new("admins")
            .set("first_name", changes.first_name)
            .set("last_name", changes.last_name)
            .set("email", changes.email)
            .set("birth_date", changes.birth_date)
            .set("gender", changes.gender.map(|g| g.as_ref().to_string()))
            .set("password", changes.password)
            .build("id", id);

        if let Some(update) = update {
            execute_update(&self.pool, update).await?;
        }
        self.find_admin(id).await
    }

    async fn delete_admin(&self, id: u64) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM admins WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl EmployeeStore for MySqlStore {
    async fn create_employee(&self, employee: NewEmployee) -> StoreResult<Employee> {
        let result = sqlx::query(
            r#"
            INSERT INTO employees (first_name, last_name, email, phone, address, gender)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&employee.first_name)
        .bind(&employee.last_name)
        .bind(&employee.email)
        .bind(&employee.phone)
        .bind(&employee.address)
        .bind(employee.gender.as_ref())
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_id();
        self.find_employee(id)
            .await?
            .ok_or_else(|| StoreError::Corrupt(format!("employee {} vanished after insert", id)))
    }

    async fn find_employee(&self, id: u64) -> StoreResult<Option<Employee>> {
        let sql = format!("SELECT {} FROM employees WHERE id = ?", EMPLOYEE_COLUMNS);
        sqlx::query_as::<_, EmployeeRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Employee::try_from)
            .transpose()
    }

    async fn list_employees(&self) -> StoreResult<Vec<Employee>> {
        let sql = format!("SELECT {} FROM employees ORDER BY id", EMPLOYEE_COLUMNS);
        let rows = sqlx::query_as::<_, EmployeeRow>(&sql)
            .fetch_all(&self.pool)
            .await?;
        convert(rows)
    }

    async fn update_employee(
        &self,
        id: u64,
        changes: EmployeeChanges,
    ) -> StoreResult<Option<Employee>> {
        if self.find_employee(id).await?.is_none() {
            return Ok(None);
        }

        let update = UpdateBuilder::new("employees")
            .set("first_name", changes.first_name)
            .set("last_name", changes.last_name)
            .set("email", changes.email)
            .set("phone", changes.phone)
            .set("address", changes.address)
            .set("gender", changes.gender.map(|g| g.as_ref().to_string()))
            .build("id", id);

        if let Some(update) = update {
            execute_update(&self.pool, update).await?;
        }
        self.find_employee(id).await
    }

    async fn delete_employee(&self, id: u64) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM employees WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl LeaveStore for MySqlStore {
    async fn create_leave(&self, leave: NewLeave) -> StoreResult<Leave> {
        let result = sqlx::query(
            r#"
            INSERT INTO leaves (reason, start_date, end_date, employee_id, status)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&leave.reason)
        .bind(leave.start_date)
        .bind(leave.end_date)
        .bind(leave.employee_id)
        .bind(leave.status.as_ref())
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_id();
        self.find_leave(id)
            .await?
            .ok_or_else(|| StoreError::Corrupt(format!("leave {} vanished after insert", id)))
    }

    async fn find_leave(&self, id: u64) -> StoreResult<Option<Leave>> {
        let sql = format!("SELECT {} FROM leaves WHERE id = ?", LEAVE_COLUMNS);
        sqlx::query_as::<_, LeaveRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Leave::try_from)
            .transpose()
    }

    async fn list_leaves(&self, employee_id: Option<u64>) -> StoreResult<Vec<Leave>> {
        let rows = match employee_id {
            Some(employee_id) => {
                let sql = format!(
                    "SELECT {} FROM leaves WHERE employee_id = ? ORDER BY id",
                    LEAVE_COLUMNS
                );
                sqlx::query_as::<_, LeaveRow>(&sql)
                    .bind(employee_id)
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                let sql = format!("SELECT {} FROM leaves ORDER BY id", LEAVE_COLUMNS);
                sqlx::query_as::<_, LeaveRow>(&sql)
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        convert(rows)
    }

    async fn leaves_for_employee(
        &self,
        employee_id: u64,
        exclude_id: Option<u64>,
    ) -> StoreResult<Vec<Leave>> {
        // id 0 is never assigned by AUTO_INCREMENT, so it excludes nothing.
        let sql = format!(
            "SELECT {} FROM leaves WHERE employee_id = ? AND id <> ? ORDER BY start_date",
            LEAVE_COLUMNS
        );
        let rows = sqlx::query_as::<_, LeaveRow>(&sql)
            .bind(employee_id)
            .bind(exclude_id.unwrap_or(0))
            .fetch_all(&self.pool)
            .await?;
        convert(rows)
    }

    async fn update_leave(&self, id: u64, changes: LeaveChanges) -> StoreResult<Option<Leave>> {
        if self.find_leave(id).await?.is_none() {
            return Ok(None);
        }

        let update = UpdateBuilder::new("leaves")
            .set("reason", changes.reason)
            .set("start_date", changes.start_date)
            .set("end_date", changes.end_date)
            .set("status", changes.status.map(|s| s.as_ref().to_string()))
            .build("id", id);

        if let Some(update) = update {
            execute_update(&self.pool, update).await?;
        }
        self.find_leave(id).await
    }

    async fn delete_leave(&self, id: u64) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM leaves WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
