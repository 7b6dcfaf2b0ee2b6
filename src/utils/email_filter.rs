use anyhow::Result;
use autoscale_cuckoo_filter::CuckooFilter;
use std::sync::{PoisonError, RwLock};

use crate::store::AdminStore;

/// Expected capacity and false-positive rate.
/// Tune these based on real admin counts.
const FILTER_CAPACITY: usize = 10_000;
const FALSE_POSITIVE_RATE: f64 = 0.001;

#[inline]
fn normalize(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Probabilistic set of registered admin emails: a miss means the email is
/// certainly free, a hit still has to be confirmed.
pub struct EmailFilter {
    inner: RwLock<CuckooFilter<String>>,
}

impl Default for EmailFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl EmailFilter {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(CuckooFilter::new(FILTER_CAPACITY, FALSE_POSITIVE_RATE)),
        }
    }

    /// Check if an email might be registered (false positives possible)
    pub fn might_exist(&self, email: &str) -> bool {
        let email = normalize(email);
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&email)
    }

    pub fn insert(&self, email: &str) {
        let email = normalize(email);
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .add(&email);
    }

    pub fn remove(&self, email: &str) {
        let email = normalize(email);
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&email);
    }

    /// Load every registered email, in batches to keep write-lock holds short.
    pub async fn warmup<S>(&self, store: &S, batch_size: usize) -> Result<()>
    where
        S: AdminStore + ?Sized,
    {
        let emails = store.admin_emails().await?;
        let total = emails.len();

        for batch in emails.chunks(batch_size.max(1)) {
            let mut filter = self.inner.write().unwrap_or_else(PoisonError::into_inner);
            for email in batch {
                filter.add(&normalize(email));
            }
        }

        log::info!("Email filter warmup complete: {} admins", total);
        Ok(())
    }
}
