use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use futures::lock::{Mutex as AsyncMutex, OwnedMutexGuard};

/// One async mutex per employee, created on demand and dropped once nobody
/// holds or waits on it. Serializes read-decide-write of leave quotas so two
/// requests cannot both spend the last free day.
#[derive(Default)]
pub struct EmployeeLocks {
    slots: Mutex<HashMap<u64, Arc<AsyncMutex<()>>>>,
}

pub struct EmployeeGuard<'a> {
    locks: &'a EmployeeLocks,
    employee_id: u64,
    slot: Arc<AsyncMutex<()>>,
    guard: Option<OwnedMutexGuard<()>>,
}

impl EmployeeLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn lock(&self, employee_id: u64) -> EmployeeGuard<'_> {
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            slots.entry(employee_id).or_default().clone()
        };
        let guard = slot.clone().lock_owned().await;

        EmployeeGuard {
            locks: self,
            employee_id,
            slot,
            guard: Some(guard),
        }
    }

    /// Employees with a live lock entry.
    pub fn active(&self) -> usize {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl Drop for EmployeeGuard<'_> {
    fn drop(&mut self) {
        self.guard.take();

        let mut slots = self
            .locks
            .slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        // Map entry plus ours: nobody else is waiting.
        if Arc::strong_count(&self.slot) == 2 {
            slots.remove(&self.employee_id);
        }
    }
}
