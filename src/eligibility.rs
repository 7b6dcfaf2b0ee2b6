//! Leave eligibility rules.
//!
//! Decides whether a candidate leave interval may be committed for an
//! employee, given a snapshot of that employee's other leave records. Nothing
//! here touches the store: callers read the snapshot, ask the policy, and
//! commit only on acceptance.

use std::fmt;

use chrono::{Datelike, Days, Months, NaiveDate};
use serde::Serialize;
use strum_macros::AsRefStr;

/// Anything the quota rules can count: a persisted record or a test fixture.
pub trait LeaveSpan {
    fn leave_id(&self) -> u64;
    fn employee_id(&self) -> u64;
    fn start_date(&self) -> NaiveDate;
    fn end_date(&self) -> NaiveDate;
}

/// The not-yet-committed interval under evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeaveInterval {
    pub employee_id: u64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Existing record to leave out of the totals (the one being edited).
    pub exclude_id: Option<u64>,
}

impl LeaveInterval {
    pub fn new(employee_id: u64, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            employee_id,
            start_date,
            end_date,
            exclude_id: None,
        }
    }

    pub fn excluding(mut self, leave_id: u64) -> Self {
        self.exclude_id = Some(leave_id);
        self
    }
}

/// Start/end of a record before an update is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl DateRange {
    pub fn of<L: LeaveSpan>(leave: &L) -> Self {
        Self {
            start_date: leave.start_date(),
            end_date: leave.end_date(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, AsRefStr)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum RejectionReason {
    InvalidRange,
    MultiMonthSpan,
    YearlyQuotaExceeded,
    MonthlyQuotaExceeded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    InvalidRange {
        start_date: NaiveDate,
        end_date: NaiveDate,
    },
    MultiMonthSpan {
        start_date: NaiveDate,
        end_date: NaiveDate,
        monthly_limit: i64,
    },
    YearlyQuotaExceeded {
        year: i32,
        used: i64,
        requested: i64,
        limit: i64,
    },
    MonthlyQuotaExceeded {
        year: i32,
        month: u32,
        /// `None` when the request alone is over the limit and no history was consulted.
        used: Option<i64>,
        requested: i64,
        limit: i64,
    },
}

impl Rejection {
    pub fn reason(&self) -> RejectionReason {
        match self {
            Rejection::InvalidRange { .. } => RejectionReason::InvalidRange,
            Rejection::MultiMonthSpan { .. } => RejectionReason::MultiMonthSpan,
            Rejection::YearlyQuotaExceeded { .. } => RejectionReason::YearlyQuotaExceeded,
            Rejection::MonthlyQuotaExceeded { .. } => RejectionReason::MonthlyQuotaExceeded,
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::InvalidRange { .. } => write!(f, "End date cannot be before start date"),
            Rejection::MultiMonthSpan { monthly_limit, .. } => write!(
                f,
                "Leave requests cannot span across multiple months due to the {}-day-per-month limit.",
                monthly_limit
            ),
            Rejection::YearlyQuotaExceeded { used, limit, .. } => write!(
                f,
                "Employee has already used {} days of leave this year. Cannot exceed {} days per year.",
                used, limit
            ),
            Rejection::MonthlyQuotaExceeded {
                used: None, limit, ..
            } => write!(
                f,
                "Leave request exceeds the limit of {} day(s) per month.",
                limit
            ),
            Rejection::MonthlyQuotaExceeded {
                year,
                month,
                used: Some(used),
                limit,
                ..
            } => write!(
                f,
                "Employee has already used {} day(s) of leave in {}/{}. Maximum {} day(s) per month is allowed.",
                used, month, year, limit
            ),
        }
    }
}

impl std::error::Error for Rejection {}

/// Outcome of an accepted interval, handy for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Eligible {
    pub days_requested: i64,
    pub days_used_this_year: i64,
}

/// Leave quotas. Defaults: 12 days per calendar year, 1 day per calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeavePolicy {
    pub yearly_limit: i64,
    pub monthly_limit: i64,
}

impl Default for LeavePolicy {
    fn default() -> Self {
        Self {
            yearly_limit: 12,
            monthly_limit: 1,
        }
    }
}

impl LeavePolicy {
    /// Validates a brand new leave against everything already on file.
    pub fn validate_create<L: LeaveSpan>(
        &self,
        candidate: &LeaveInterval,
        existing: &[L],
    ) -> Result<Eligible, Rejection> {
        self.evaluate(candidate, existing, true)
    }

    /// Validates new dates for an existing leave.
    ///
    /// `existing` should not contain the record under edit; if it does, set
    /// `candidate.exclude_id` and it is skipped. The monthly overlap is only
    /// recomputed when the start date moved to another month or year; the end
    /// date of the baseline plays no part in that decision.
    pub fn validate_update<L: LeaveSpan>(
        &self,
        candidate: &LeaveInterval,
        baseline: DateRange,
        existing: &[L],
    ) -> Result<Eligible, Rejection> {
        if candidate.start_date == baseline.start_date && candidate.end_date == baseline.end_date {
            return Ok(Eligible {
                days_requested: inclusive_day_count(candidate.start_date, candidate.end_date),
                days_used_this_year: self.used_in_year(candidate, existing),
            });
        }

        let month_changed = year_month(candidate.start_date) != year_month(baseline.start_date);

        self.evaluate(candidate, existing, month_changed)
    }

    fn evaluate<L: LeaveSpan>(
        &self,
        candidate: &LeaveInterval,
        existing: &[L],
        check_month: bool,
    ) -> Result<Eligible, Rejection> {
        let (start, end) = (candidate.start_date, candidate.end_date);

        if end < start {
            return Err(Rejection::InvalidRange {
                start_date: start,
                end_date: end,
            });
        }

        let requested = inclusive_day_count(start, end);

        if year_month(start) != year_month(end) {
            return Err(Rejection::MultiMonthSpan {
                start_date: start,
                end_date: end,
                monthly_limit: self.monthly_limit,
            });
        }

        let used_this_year = self.used_in_year(candidate, existing);
        if used_this_year + requested > self.yearly_limit {
            return Err(Rejection::YearlyQuotaExceeded {
                year: start.year(),
                used: used_this_year,
                requested,
                limit: self.yearly_limit,
            });
        }

        if requested > self.monthly_limit {
            return Err(Rejection::MonthlyQuotaExceeded {
                year: start.year(),
                month: start.month(),
                used: None,
                requested,
                limit: self.monthly_limit,
            });
        }

        if check_month {
            let (first, last) = month_bounds(start);
            let used_this_month = counted(candidate, existing)
                .filter_map(|leave| clipped_day_count(leave, first, last))
                .sum::<i64>();

            if used_this_month + requested > self.monthly_limit {
                return Err(Rejection::MonthlyQuotaExceeded {
                    year: start.year(),
                    month: start.month(),
                    used: Some(used_this_month),
                    requested,
                    limit: self.monthly_limit,
                });
            }
        }

        Ok(Eligible {
            days_requested: requested,
            days_used_this_year: used_this_year,
        })
    }

    fn used_in_year<L: LeaveSpan>(&self, candidate: &LeaveInterval, existing: &[L]) -> i64 {
        let year = candidate.start_date.year();
        counted(candidate, existing)
            .filter(|leave| leave.start_date().year() == year)
            .map(|leave| inclusive_day_count(leave.start_date(), leave.end_date()))
            .sum()
    }
}

/// Records of the candidate's employee, minus the excluded one.
fn counted<'a, L: LeaveSpan>(
    candidate: &'a LeaveInterval,
    existing: &'a [L],
) -> impl Iterator<Item = &'a L> + 'a {
    existing.iter().filter(move |leave| {
        leave.employee_id() == candidate.employee_id
            && candidate.exclude_id != Some(leave.leave_id())
    })
}

/// Both ends count: a same-day leave is one day.
pub fn inclusive_day_count(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days() + 1
}

fn year_month(date: NaiveDate) -> (i32, u32) {
    (date.year(), date.month())
}

/// First and last day of the month containing `date`.
pub fn month_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let first = date - Days::new(u64::from(date.day0()));
    let last = first
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(NaiveDate::MAX);
    (first, last)
}

fn clipped_day_count<L: LeaveSpan>(leave: &L, first: NaiveDate, last: NaiveDate) -> Option<i64> {
    let start = leave.start_date().max(first);
    let end = leave.end_date().min(last);
    (start <= end).then(|| inclusive_day_count(start, end))
}
