//! Two requests for the same employee racing for the last free day.

use std::sync::Arc;

use actix_web::rt::task::yield_now;
use async_trait::async_trait;
use chrono::NaiveDate;
use futures::future::join;

use hrms::eligibility::{LeavePolicy, RejectionReason, inclusive_day_count};
use hrms::error::AppError;
use hrms::model::admin::{Admin, AdminChanges, NewAdmin};
use hrms::model::employee::{Employee, EmployeeChanges, NewEmployee};
use hrms::model::gender::Gender;
use hrms::model::leave::{Leave, LeaveChanges, LeaveStatus, NewLeave};
use hrms::service::LeaveService;
use hrms::store::{AdminStore, EmployeeStore, LeaveStore, MemoryStore, StoreResult};

/// Memory store that yields after every snapshot read, so without locking
/// both requests would see the same eleven days.
#[derive(Default)]
struct SlowStore {
    inner: MemoryStore,
}

#[async_trait]
impl AdminStore for SlowStore {
    async fn create_admin(&self, admin: NewAdmin) -> StoreResult<Admin> {
        self.inner.create_admin(admin).await
    }
    async fn find_admin(&self, id: u64) -> StoreResult<Option<Admin>> {
        self.inner.find_admin(id).await
    }
    async fn find_admin_by_email(&self, email: &str) -> StoreResult<Option<Admin>> {
        self.inner.find_admin_by_email(email).await
    }
    async fn list_admins(&self) -> StoreResult<Vec<Admin>> {
        self.inner.list_admins().await
    }
    async fn admin_emails(&self) -> StoreResult<Vec<String>> {
        self.inner.admin_emails().await
    }
    async fn update_admin(&self, id: u64, changes: AdminChanges) -> StoreResult<Option<Admin>> {
        self.inner.update_admin(id, changes).await
    }
    async fn delete_admin(&self, id: u64) -> StoreResult<bool> {
        self.inner.delete_admin(id).await
    }
}

#[async_trait]
impl EmployeeStore for SlowStore {
    async fn create_employee(&self, employee: NewEmployee) -> StoreResult<Employee> {
        self.inner.create_employee(employee).await
    }
    async fn find_employee(&self, id: u64) -> StoreResult<Option<Employee>> {
        self.inner.find_employee(id).await
    }
    async fn list_employees(&self) -> StoreResult<Vec<Employee>> {
        self.inner.list_employees().await
    }
    async fn update_employee(
        &self,
        id: u64,
        changes: EmployeeChanges,
    ) -> StoreResult<Option<Employee>> {
        self.inner.update_employee(id, changes).await
    }
    async fn delete_employee(&self, id: u64) -> StoreResult<bool> {
        self.inner.delete_employee(id).await
    }
}

#[async_trait]
impl LeaveStore for SlowStore {
    async fn create_leave(&self, leave: NewLeave) -> StoreResult<Leave> {
        self.inner.create_leave(leave).await
    }
    async fn find_leave(&self, id: u64) -> StoreResult<Option<Leave>> {
        self.inner.find_leave(id).await
    }
    async fn list_leaves(&self, employee_id: Option<u64>) -> StoreResult<Vec<Leave>> {
        self.inner.list_leaves(employee_id).await
    }
    async fn leaves_for_employee(
        &self,
        employee_id: u64,
        exclude_id: Option<u64>,
    ) -> StoreResult<Vec<Leave>> {
        let snapshot = self.inner.leaves_for_employee(employee_id, exclude_id).await;
        yield_now().await;
        yield_now().await;
        snapshot
    }
    async fn update_leave(&self, id: u64, changes: LeaveChanges) -> StoreResult<Option<Leave>> {
        self.inner.update_leave(id, changes).await
    }
    async fn delete_leave(&self, id: u64) -> StoreResult<bool> {
        self.inner.delete_leave(id).await
    }
}

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn single_day(employee_id: u64, date: NaiveDate) -> NewLeave {
    NewLeave {
        reason: "Vacation".into(),
        start_date: date,
        end_date: date,
        employee_id,
        status: LeaveStatus::Pending,
    }
}

async fn employee_with_eleven_days(store: &SlowStore) -> u64 {
    let employee = store
        .create_employee(NewEmployee {
            first_name: "John".into(),
            last_name: "Doe".into(),
            email: "john@deptech.com".into(),
            phone: "08123456789".into(),
            address: "Jakarta".into(),
            gender: Gender::Male,
        })
        .await
        .unwrap();

    for month in 1..=11 {
        store
            .create_leave(single_day(employee.id, day(2025, month, 10)))
            .await
            .unwrap();
    }
    employee.id
}

#[actix_web::test]
async fn only_one_of_two_concurrent_requests_gets_the_last_day() {
    let store = Arc::new(SlowStore::default());
    let employee_id = employee_with_eleven_days(&store).await;
    let service = LeaveService::new(store.clone(), LeavePolicy::default());

    // Different days of December: the monthly rule alone would let either in.
    let (first, second) = join(
        service.create(single_day(employee_id, day(2025, 12, 5))),
        service.create(single_day(employee_id, day(2025, 12, 20))),
    )
    .await;

    let accepted = [first.is_ok(), second.is_ok()].iter().filter(|ok| **ok).count();
    assert_eq!(accepted, 1);

    let rejected = first.err().or(second.err()).unwrap();
    match rejected {
        AppError::LeaveRejected(rejection) => assert!(matches!(
            rejection.reason(),
            RejectionReason::YearlyQuotaExceeded | RejectionReason::MonthlyQuotaExceeded
        )),
        other => panic!("expected a rejection, got {:?}", other),
    }

    let total: i64 = store
        .list_leaves(Some(employee_id))
        .await
        .unwrap()
        .iter()
        .map(|l| inclusive_day_count(l.start_date, l.end_date))
        .sum();
    assert_eq!(total, 12);
}

#[actix_web::test]
async fn different_employees_do_not_block_each_other() {
    let store = Arc::new(SlowStore::default());
    let john = employee_with_eleven_days(&store).await;
    let jane = store
        .create_employee(NewEmployee {
            first_name: "Jane".into(),
            last_name: "Smith".into(),
            email: "jane@deptech.com".into(),
            phone: "08234567890".into(),
            address: "Bandung".into(),
            gender: Gender::Female,
        })
        .await
        .unwrap()
        .id;
    let service = LeaveService::new(store.clone(), LeavePolicy::default());

    let (a, b) = join(
        service.create(single_day(john, day(2025, 12, 5))),
        service.create(single_day(jane, day(2025, 12, 5))),
    )
    .await;

    assert!(a.is_ok());
    assert!(b.is_ok());
}
