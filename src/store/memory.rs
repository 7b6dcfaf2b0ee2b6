use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use super::{AdminStore, EmployeeStore, LeaveStore, StoreError, StoreResult};
use crate::model::admin::{Admin, AdminChanges, NewAdmin};
use crate::model::employee::{Employee, EmployeeChanges, NewEmployee};
use crate::model::leave::{Leave, LeaveChanges, NewLeave};

/// In-process store with the same constraints as the MySQL schema: unique
/// emails (case-insensitive), leaves must point at an existing employee, and
/// an employee with leaves cannot be deleted.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

#[derive(Debug, Default)]
struct Tables {
    admins: BTreeMap<u64, Admin>,
    employees: BTreeMap<u64, Employee>,
    leaves: BTreeMap<u64, Leave>,
    last_admin_id: u64,
    last_employee_id: u64,
    last_leave_id: u64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".into()))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".into()))
    }
}

fn email_taken<'a, I>(mut emails: I, email: &str, except: Option<u64>) -> bool
where
    I: Iterator<Item = (&'a u64, &'a String)>,
{
    emails.any(|(id, existing)| Some(*id) != except && existing.eq_ignore_ascii_case(email))
}

#[async_trait]
impl AdminStore for MemoryStore {
    async fn create_admin(&self, admin: NewAdmin) -> StoreResult<Admin> {
        let mut tables = self.write()?;
        if email_taken(
            tables.admins.iter().map(|(id, a)| (id, &a.email)),
            &admin.email,
            None,
        ) {
            return Err(StoreError::Duplicate("email".into()));
        }

        tables.last_admin_id += 1;
        let created = Admin {
            id: tables.last_admin_id,
            first_name: admin.first_name,
            last_name: admin.last_name,
            email: admin.email,
            birth_date: admin.birth_date,
            gender: admin.gender,
            password: admin.password,
        };
        tables.admins.insert(created.id, created.clone());
        Ok(created)
    }

    async fn find_admin(&self, id: u64) -> StoreResult<Option<Admin>> {
        Ok(self.read()?.admins.get(&id).cloned())
    }

    async fn find_admin_by_email(&self, email: &str) -> StoreResult<Option<Admin>> {
        Ok(self
            .read()?
            .admins
            .values()
            .find(|a| a.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn list_admins(&self) -> StoreResult<Vec<Admin>> {
        Ok(self.read()?.admins.values().cloned().collect())
    }

    async fn admin_emails(&self) -> StoreResult<Vec<String>> {
        Ok(self
            .read()?
            .admins
            .values()
            .map(|a| a.email.clone())
            .collect())
    }

    async fn update_admin(&self, id: u64, changes: AdminChanges) -> StoreResult<Option<Admin>> {
        let mut tables = self.write()?;
        let Some(current) = tables.admins.get(&id) else {
            return Ok(None);
        };
        let updated = changes.apply_to(current);
        if email_taken(
            tables.admins.iter().map(|(id, a)| (id, &a.email)),
            &updated.email,
            Some(id),
        ) {
            return Err(StoreError::Duplicate("email".into()));
        }
        tables.admins.insert(id, updated.clone());
        Ok(Some(updated))
    }

    async fn delete_admin(&self, id: u64) -> StoreResult<bool> {
        Ok(self.write()?.admins.remove(&id).is_some())
    }
}

#[async_trait]
impl EmployeeStore for MemoryStore {
    async fn create_employee(&self, employee: NewEmployee) -> StoreResult<Employee> {
        let mut tables = self.write()?;
        if email_taken(
            tables.employees.iter().map(|(id, e)| (id, &e.email)),
            &employee.email,
            None,
        ) {
            return Err(StoreError::Duplicate("email".into()));
        }

        tables.last_employee_id += 1;
        let created = Employee {
            id: tables.last_employee_id,
            first_name: employee.first_name,
            last_name: employee.last_name,
            email: employee.email,
            phone: employee.phone,
            address: employee.address,
            gender: employee.gender,
        };
        tables.employees.insert(created.id, created.clone());
        Ok(created)
    }

    async fn find_employee(&self, id: u64) -> StoreResult<Option<Employee>> {
        Ok(self.read()?.employees.get(&id).cloned())
    }

    async fn list_employees(&self) -> StoreResult<Vec<Employee>> {
        Ok(self.read()?.employees.values().cloned().collect())
    }

    async fn update_employee(
        &self,
        id: u64,
        changes: EmployeeChanges,
    ) -> StoreResult<Option<Employee>> {
        let mut tables = self.write()?;
        let Some(current) = tables.employees.get(&id) else {
            return Ok(None);
        };
        let updated = changes.apply_to(current);
        if email_taken(
            tables.employees.iter().map(|(id, e)| (id, &e.email)),
            &updated.email,
            Some(id),
        ) {
            return Err(StoreError::Duplicate("email".into()));
        }
        tables.employees.insert(id, updated.clone());
        Ok(Some(updated))
    }

    async fn delete_employee(&self, id: u64) -> StoreResult<bool> {
        let mut tables = self.write()?;
        if !tables.employees.contains_key(&id) {
            return Ok(false);
        }
        if tables.leaves.values().any(|l| l.employee_id == id) {
            return Err(StoreError::Referenced);
        }
        tables.employees.remove(&id);
        Ok(true)
    }
}

#[async_trait]
impl LeaveStore for MemoryStore {
    async fn create_leave(&self, leave: NewLeave) -> StoreResult<Leave> {
        let mut tables = self.write()?;
        if !tables.employees.contains_key(&leave.employee_id) {
            return Err(StoreError::MissingReference);
        }

        tables.last_leave_id += 1;
        let created = Leave {
            id: tables.last_leave_id,
            reason: leave.reason,
            start_date: leave.start_date,
            end_date: leave.end_date,
            employee_id: leave.employee_id,
            status: leave.status,
        };
        tables.leaves.insert(created.id, created.clone());
        Ok(created)
    }

    async fn find_leave(&self, id: u64) -> StoreResult<Option<Leave>> {
        Ok(self.read()?.leaves.get(&id).cloned())
    }

    async fn list_leaves(&self, employee_id: Option<u64>) -> StoreResult<Vec<Leave>> {
        Ok(self
            .read()?
            .leaves
            .values()
            .filter(|l| employee_id.map_or(true, |e| l.employee_id == e))
            .cloned()
            .collect())
    }

    async fn leaves_for_employee(
        &self,
        employee_id: u64,
        exclude_id: Option<u64>,
    ) -> StoreResult<Vec<Leave>> {
        Ok(self
            .read()?
            .leaves
            .values()
            .filter(|l| l.employee_id == employee_id && Some(l.id) != exclude_id)
            .cloned()
            .collect())
    }

    async fn update_leave(&self, id: u64, changes: LeaveChanges) -> StoreResult<Option<Leave>> {
        let mut tables = self.write()?;
        let Some(current) = tables.leaves.get(&id) else {
            return Ok(None);
        };
        let updated = changes.apply_to(current);
        tables.leaves.insert(id, updated.clone());
        Ok(Some(updated))
    }

    async fn delete_leave(&self, id: u64) -> StoreResult<bool> {
        Ok(self.write()?.leaves.remove(&id).is_some())
    }
}
