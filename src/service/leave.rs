use std::sync::Arc;

use tracing::{debug, info};

use crate::eligibility::{DateRange, LeaveInterval, LeavePolicy};
use crate::error::AppError;
use crate::model::employee::Employee;
use crate::model::leave::{Leave, LeaveChanges, LeaveWithEmployee, NewLeave};
use crate::store::Store;
use crate::utils::employee_locks::EmployeeLocks;

/// Leave bookkeeping on top of the store. Creates and date updates hold the
/// employee's lock from the snapshot read until the write lands, so the quota
/// check always sees every committed leave of that employee.
pub struct LeaveService {
    store: Arc<dyn Store>,
    policy: LeavePolicy,
    locks: EmployeeLocks,
}

impl LeaveService {
    pub fn new(store: Arc<dyn Store>, policy: LeavePolicy) -> Self {
        Self {
            store,
            policy,
            locks: EmployeeLocks::new(),
        }
    }

    pub fn policy(&self) -> LeavePolicy {
        self.policy
    }

    async fn employee(&self, employee_id: u64) -> Result<Employee, AppError> {
        self.store
            .find_employee(employee_id)
            .await
            .map_err(AppError::store("Employee", Some(employee_id)))?
            .ok_or_else(|| AppError::not_found("Employee", employee_id))
    }

    async fn leave(&self, id: u64) -> Result<Leave, AppError> {
        self.store
            .find_leave(id)
            .await
            .map_err(AppError::store("Leave", Some(id)))?
            .ok_or_else(|| AppError::not_found("Leave", id))
    }

    async fn with_employee(&self, leave: Leave) -> Result<LeaveWithEmployee, AppError> {
        let employee = self.employee(leave.employee_id).await?;
        Ok(LeaveWithEmployee { leave, employee })
    }

    pub async fn create(&self, new: NewLeave) -> Result<LeaveWithEmployee, AppError> {
        let employee_id = new.employee_id;
        let _guard = self.locks.lock(employee_id).await;

        let employee = self.employee(employee_id).await?;
        let existing = self
            .store
            .leaves_for_employee(employee_id, None)
            .await
            .map_err(AppError::store("Leave", None))?;

        let candidate = LeaveInterval::new(employee_id, new.start_date, new.end_date);
        let eligible = self.policy.validate_create(&candidate, &existing)?;

        let leave = self
            .store
            .create_leave(new)
            .await
            .map_err(AppError::store("Leave", None))?;

        info!(
            leave_id = leave.id,
            employee_id,
            days = eligible.days_requested,
            used_this_year = eligible.days_used_this_year,
            "Leave created"
        );

        Ok(LeaveWithEmployee { leave, employee })
    }

    pub async fn find(&self, id: u64) -> Result<LeaveWithEmployee, AppError> {
        let leave = self.leave(id).await?;
        self.with_employee(leave).await
    }

    pub async fn list(&self, employee_id: Option<u64>) -> Result<Vec<LeaveWithEmployee>, AppError> {
        let leaves = self
            .store
            .list_leaves(employee_id)
            .await
            .map_err(AppError::store("Leave", None))?;

        let mut joined = Vec::with_capacity(leaves.len());
        for leave in leaves {
            joined.push(self.with_employee(leave).await?);
        }
        Ok(joined)
    }

    pub async fn update(&self, id: u64, changes: LeaveChanges) -> Result<LeaveWithEmployee, AppError> {
        let employee_id = self.leave(id).await?.employee_id;
        let _guard = self.locks.lock(employee_id).await;

        // Re-read under the lock: the record may have moved while we waited.
        let baseline = self.leave(id).await?;

        if changes.touches_dates() {
            let merged = changes.apply_to(&baseline);
            let others = self
                .store
                .leaves_for_employee(employee_id, Some(id))
                .await
                .map_err(AppError::store("Leave", Some(id)))?;

            let candidate = LeaveInterval::new(employee_id, merged.start_date, merged.end_date)
                .excluding(id);
            let eligible =
                self.policy
                    .validate_update(&candidate, DateRange::of(&baseline), &others)?;
            debug!(
                leave_id = id,
                days = eligible.days_requested,
                used_this_year = eligible.days_used_this_year,
                "Leave dates accepted"
            );
        }

        let leave = self
            .store
            .update_leave(id, changes)
            .await
            .map_err(AppError::store("Leave", Some(id)))?
            .ok_or_else(|| AppError::not_found("Leave", id))?;

        info!(leave_id = id, employee_id, "Leave updated");
        self.with_employee(leave).await
    }

    pub async fn delete(&self, id: u64) -> Result<(), AppError> {
        let deleted = self
            .store
            .delete_leave(id)
            .await
            .map_err(AppError::store("Leave", Some(id)))?;

        if !deleted {
            return Err(AppError::not_found("Leave", id));
        }
        info!(leave_id = id, "Leave deleted");
        Ok(())
    }
}
