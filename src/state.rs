use std::sync::Arc;

use actix_web::{error, web};

use crate::config::Config;
use crate::error::AppError;
use crate::routes::{self, RateLimits};
use crate::service::LeaveService;
use crate::store::Store;
use crate::utils::{email_cache::EmailCache, email_filter::EmailFilter};

/// Everything the handlers share. Cloning is cheap: all parts are
/// reference counted.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn Store>,
    pub leaves: web::Data<LeaveService>,
    pub email_filter: web::Data<EmailFilter>,
    pub email_cache: web::Data<EmailCache>,
    limits: RateLimits,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn Store>) -> anyhow::Result<Self> {
        let limits = RateLimits::new(
            config.rate_login_per_min,
            config.rate_register_per_min,
            config.rate_protected_per_min,
        )?;
        let leaves = LeaveService::new(store.clone(), config.leave_policy);

        Ok(Self {
            config,
            store,
            leaves: web::Data::new(leaves),
            email_filter: web::Data::new(EmailFilter::new()),
            email_cache: web::Data::new(EmailCache::new()),
            limits,
        })
    }

    /// Loads registered admin emails into the filter and the cache.
    pub async fn warmup(&self) -> anyhow::Result<()> {
        self.email_filter.warmup(self.store.as_ref(), 100).await?;
        self.email_cache.warmup(self.store.as_ref(), 250).await?;
        Ok(())
    }

    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(web::Data::new(self.config.clone()))
            .app_data(web::Data::from(self.store.clone()))
            .app_data(self.leaves.clone())
            .app_data(self.email_filter.clone())
            .app_data(self.email_cache.clone())
            // malformed input gets the same error body as everything else
            .app_data(web::JsonConfig::default().error_handler(|err, _| bad_request(err)))
            .app_data(web::PathConfig::default().error_handler(|err, _| bad_request(err)))
            .app_data(web::QueryConfig::default().error_handler(|err, _| bad_request(err)));

        routes::configure(cfg, &self.config.api_prefix, &self.limits);
    }
}

fn bad_request(err: impl std::fmt::Display) -> error::Error {
    AppError::BadRequest(err.to_string()).into()
}
