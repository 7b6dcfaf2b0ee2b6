use crate::{
    api::{admin, employee, leave},
    auth::{handlers, middleware::auth_middleware},
    error::with_request_path,
};
use actix_governor::{
    Governor, GovernorConfig, GovernorConfigBuilder, PeerIpKeyExtractor,
    governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};

pub type LimiterConfig = GovernorConfig<PeerIpKeyExtractor, NoOpMiddleware>;

/// Per-IP request budgets, one per route group.
#[derive(Clone)]
pub struct RateLimits {
    pub login: LimiterConfig,
    pub register: LimiterConfig,
    pub protected: LimiterConfig,
}

impl RateLimits {
    pub fn new(login_per_min: u32, register_per_min: u32, protected_per_min: u32) -> anyhow::Result<Self> {
        Ok(Self {
            login: build_limiter(login_per_min)?,
            register: build_limiter(register_per_min)?,
            protected: build_limiter(protected_per_min)?,
        })
    }
}

// Helper to build per-route limiter
fn build_limiter(requests_per_min: u32) -> anyhow::Result<LimiterConfig> {
    let requests_per_min = requests_per_min.max(1);
    let per_ms = (60_000 / requests_per_min as u64).max(1);

    GovernorConfigBuilder::default()
        .per_millisecond(per_ms)
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .ok_or_else(|| anyhow::anyhow!("invalid rate limit: {} per minute", requests_per_min))
}

pub fn configure(cfg: &mut web::ServiceConfig, api_prefix: &str, limits: &RateLimits) {
    // Public routes. Registered ahead of the protected scope, which would
    // otherwise claim every path under the prefix.
    cfg.service(
        web::resource(format!("{}/admin/register", api_prefix))
            .wrap(from_fn(with_request_path))
            .wrap(Governor::new(&limits.register))
            .route(web::post().to(handlers::register)),
    )
    .service(
        web::resource(format!("{}/admin/login", api_prefix))
            .wrap(from_fn(with_request_path))
            .wrap(Governor::new(&limits.login))
            .route(web::post().to(handlers::login)),
    );

    // Protected routes
    cfg.service(
        web::scope(api_prefix)
            .wrap(from_fn(with_request_path)) // error envelope path
            .wrap(from_fn(auth_middleware)) // authentication
            .wrap(Governor::new(&limits.protected)) // rate limiting
            .service(
                web::scope("/admin")
                    // /admin
                    .service(web::resource("").route(web::get().to(admin::list_admins)))
                    // /admin/{id}
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(admin::get_admin))
                            .route(web::patch().to(admin::update_admin))
                            .route(web::delete().to(admin::delete_admin)),
                    ),
            )
            .service(
                web::scope("/employee")
                    // /employee
                    .service(
                        web::resource("")
                            .route(web::post().to(employee::create_employee))
                            .route(web::get().to(employee::list_employees)),
                    )
                    // /employee/with-leaves, ahead of /{id}
                    .service(
                        web::resource("/with-leaves")
                            .route(web::get().to(employee::list_employees_with_leaves)),
                    )
                    // /employee/{id}
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(employee::get_employee))
                            .route(web::patch().to(employee::update_employee))
                            .route(web::delete().to(employee::delete_employee)),
                    )
                    // /employee/{id}/leaves
                    .service(
                        web::resource("/{id}/leaves")
                            .route(web::get().to(employee::get_employee_leaves)),
                    ),
            )
            .service(
                web::scope("/leave")
                    // /leave
                    .service(
                        web::resource("")
                            .route(web::get().to(leave::list_leaves))
                            .route(web::post().to(leave::create_leave)),
                    )
                    // /leave/{id}
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(leave::get_leave))
                            .route(web::patch().to(leave::update_leave))
                            .route(web::delete().to(leave::delete_leave)),
                    ),
            ),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_budget_is_clamped_instead_of_failing() {
        assert!(RateLimits::new(0, 30, 1000).is_ok());
    }
}
