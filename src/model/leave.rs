use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, EnumString};
use utoipa::ToSchema;

use super::employee::Employee;
use crate::eligibility::LeaveSpan;

/// Review state of a leave. The quota rules do not look at it: rejected
/// leaves still count.
#[derive(
    Debug,
    Copy,
    Clone,
    Default,
    Eq,
    PartialEq,
    Serialize,
    Deserialize,
    ToSchema,
    AsRefStr,
    EnumString,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum LeaveStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Leave {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = "Vacation")]
    pub reason: String,

    #[schema(example = "2025-09-10", value_type = String, format = "date")]
    pub start_date: NaiveDate,

    #[schema(example = "2025-09-10", value_type = String, format = "date")]
    pub end_date: NaiveDate,

    #[schema(example = 1)]
    pub employee_id: u64,

    pub status: LeaveStatus,
}

impl LeaveSpan for Leave {
    fn leave_id(&self) -> u64 {
        self.id
    }

    fn employee_id(&self) -> u64 {
        self.employee_id
    }

    fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    fn end_date(&self) -> NaiveDate {
        self.end_date
    }
}

#[derive(Debug, Clone)]
pub struct NewLeave {
    pub reason: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub employee_id: u64,
    pub status: LeaveStatus,
}

/// Partial update of a leave; `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct LeaveChanges {
    pub reason: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: Option<LeaveStatus>,
}

impl LeaveChanges {
    pub fn touches_dates(&self) -> bool {
        self.start_date.is_some() || self.end_date.is_some()
    }

    pub fn apply_to(&self, leave: &Leave) -> Leave {
        Leave {
            id: leave.id,
            reason: self.reason.clone().unwrap_or_else(|| leave.reason.clone()),
            start_date: self.start_date.unwrap_or(leave.start_date),
            end_date: self.end_date.unwrap_or(leave.end_date),
            employee_id: leave.employee_id,
            status: self.status.unwrap_or(leave.status),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LeaveWithEmployee {
    #[serde(flatten)]
    pub leave: Leave,
    pub employee: Employee,
}
