use anyhow::Result;
use futures::future::join_all;
use moka::future::Cache;
use std::time::Duration;

use crate::store::AdminStore;

/// Recently confirmed admin emails.
/// true  => email is TAKEN
/// (only taken emails are stored)
pub struct EmailCache {
    inner: Cache<String, bool>,
}

impl Default for EmailCache {
    fn default() -> Self {
        Self::new()
    }
}

impl EmailCache {
    pub fn new() -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(50_000)
                .time_to_live(Duration::from_secs(86400)) // 24h TTL
                .build(),
        }
    }

    /// Mark a single email as taken
    pub async fn mark_taken(&self, email: &str) {
        self.inner.insert(email.trim().to_lowercase(), true).await;
    }

    /// Check if email is taken
    pub async fn is_taken(&self, email: &str) -> bool {
        self.inner
            .get(&email.trim().to_lowercase())
            .await
            .unwrap_or(false)
    }

    pub async fn forget(&self, email: &str) {
        self.inner.invalidate(&email.trim().to_lowercase()).await;
    }

    /// Batch mark emails as taken
    async fn batch_mark(&self, emails: &[String]) {
        let futures: Vec<_> = emails
            .iter()
            .map(|e| self.inner.insert(e.trim().to_lowercase(), true))
            .collect();

        // Await all insertions concurrently
        join_all(futures).await;
    }

    /// Load registered emails into the cache (batched)
    pub async fn warmup<S>(&self, store: &S, batch_size: usize) -> Result<()>
    where
        S: AdminStore + ?Sized,
    {
        let emails = store.admin_emails().await?;

        for batch in emails.chunks(batch_size.max(1)) {
            self.batch_mark(batch).await;
        }

        log::info!("Email cache warmup complete: {} admins", emails.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[actix_web::test]
    async fn warmup_marks_stored_emails() {
        let store = MemoryStore::new();
        crate::store::seed::seed_demo_data(&store).await.unwrap();

        let cache = EmailCache::new();
        cache.warmup(&store, 2).await.unwrap();

        assert!(cache.is_taken("HR@deptech.com").await);
        assert!(!cache.is_taken("nobody@deptech.com").await);

        cache.forget("hr@deptech.com").await;
        assert!(!cache.is_taken("hr@deptech.com").await);
    }
}
