//! Demo data: three admins, four employees and a handful of leaves.
//!
//! Leaves are written straight to the store, the way an import would, so the
//! eligibility rules are not consulted.

use chrono::NaiveDate;
use tracing::info;

use super::Store;
use crate::auth::password::hash_password;
use crate::model::admin::NewAdmin;
use crate::model::employee::NewEmployee;
use crate::model::gender::Gender;
use crate::model::leave::{LeaveStatus, NewLeave};

const DEMO_PASSWORD: &str = "admin123";

fn date(y: i32, m: u32, d: u32) -> anyhow::Result<NaiveDate> {
    NaiveDate::from_ymd_opt(y, m, d).ok_or_else(|| anyhow::anyhow!("invalid seed date {y}-{m}-{d}"))
}

pub async fn seed_demo_data(store: &dyn Store) -> anyhow::Result<()> {
    if !store.list_admins().await?.is_empty() || !store.list_employees().await?.is_empty() {
        info!("Store already has data, skipping demo seed");
        return Ok(());
    }

    let password = hash_password(DEMO_PASSWORD)
        .map_err(|e| anyhow::anyhow!("failed to hash demo password: {e}"))?;

    let admins = [
        ("Super", "Admin", "admin@deptech.com", date(1990, 1, 1)?, Gender::Male),
        ("HR", "Manager", "hr@deptech.com", date(1988, 5, 15)?, Gender::Female),
        ("Finance", "Director", "finance@deptech.com", date(1985, 10, 20)?, Gender::Male),
    ];
    for (first_name, last_name, email, birth_date, gender) in admins {
        store
            .create_admin(NewAdmin {
                first_name: first_name.into(),
                last_name: last_name.into(),
                email: email.into(),
                birth_date,
                gender,
                password: password.clone(),
            })
            .await?;
    }

    let employees = [
        ("John", "Doe", "john@deptech.com", "08123456789", "Jakarta", Gender::Male),
        ("Jane", "Smith", "jane@deptech.com", "08129876543", "Bandung", Gender::Female),
        ("Robert", "Johnson", "robert@deptech.com", "08567891234", "Surabaya", Gender::Male),
        ("Maria", "Garcia", "maria@deptech.com", "08765432198", "Yogyakarta", Gender::Female),
    ];
    let mut ids = Vec::with_capacity(employees.len());
    for (first_name, last_name, email, phone, address, gender) in employees {
        let employee = store
            .create_employee(NewEmployee {
                first_name: first_name.into(),
                last_name: last_name.into(),
                email: email.into(),
                phone: phone.into(),
                address: address.into(),
                gender,
            })
            .await?;
        ids.push(employee.id);
    }

    let leaves = [
        (ids[0], "Vacation", date(2025, 9, 10)?, LeaveStatus::Approved),
        (ids[0], "Family Event", date(2025, 10, 15)?, LeaveStatus::Pending),
        (ids[1], "Medical Checkup", date(2025, 9, 5)?, LeaveStatus::Approved),
        (ids[2], "Wedding", date(2025, 11, 20)?, LeaveStatus::Pending),
        (ids[2], "Sick Leave", date(2025, 8, 5)?, LeaveStatus::Approved),
    ];
    for (employee_id, reason, day, status) in leaves {
        store
            .create_leave(NewLeave {
                reason: reason.into(),
                start_date: day,
                end_date: day,
                employee_id,
                status,
            })
            .await?;
    }

    info!(
        admins = 3,
        employees = ids.len(),
        leaves = 5,
        "Demo data seeded"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{AdminStore, EmployeeStore, LeaveStore, MemoryStore};

    #[actix_web::test]
    async fn seeds_once() {
        let store = MemoryStore::new();
        seed_demo_data(&store).await.unwrap();
        seed_demo_data(&store).await.unwrap();

        assert_eq!(store.list_admins().await.unwrap().len(), 3);
        assert_eq!(store.list_employees().await.unwrap().len(), 4);
        assert_eq!(store.list_leaves(None).await.unwrap().len(), 5);
    }
}
