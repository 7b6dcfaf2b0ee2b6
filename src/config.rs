use std::env;
use std::str::FromStr;

use anyhow::{Context, anyhow};
use dotenvy::dotenv;
use strum_macros::{AsRefStr, EnumString};

use crate::eligibility::LeavePolicy;

/// Where records live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum StoreBackend {
    Mysql,
    Memory,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub server_addr: String,
    pub store_backend: StoreBackend,
    /// Required for the MySQL backend only.
    pub database_url: Option<String>,
    pub seed_demo_data: bool,
    pub jwt_secret: String,
    pub access_token_ttl: usize,

    // Rate limiting
    pub rate_login_per_min: u32,
    pub rate_register_per_min: u32,
    pub rate_protected_per_min: u32,

    pub api_prefix: String,

    pub leave_policy: LeavePolicy,
}

fn var_or<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow!("{} has an invalid value {:?}: {}", key, raw, e)),
        Err(_) => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv().ok();

        let defaults = LeavePolicy::default();

        let config = Self {
            server_addr: env::var("SERVER_ADDR").context("SERVER_ADDR must be set")?,
            store_backend: var_or("STORE_BACKEND", StoreBackend::Mysql)?,
            database_url: env::var("DATABASE_URL").ok(),
            seed_demo_data: var_or("SEED_DEMO_DATA", false)?,
            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            access_token_ttl: var_or("ACCESS_TOKEN_TTL", 3600)?, // default 1 hour

            rate_login_per_min: var_or("RATE_LOGIN_PER_MIN", 60)?,
            rate_register_per_min: var_or("RATE_REGISTER_PER_MIN", 30)?,
            rate_protected_per_min: var_or("RATE_PROTECTED_PER_MIN", 1000)?,

            api_prefix: env::var("API_PREFIX").unwrap_or_else(|_| "/api".to_string()),

            leave_policy: LeavePolicy {
                yearly_limit: var_or("LEAVE_YEARLY_LIMIT", defaults.yearly_limit)?,
                monthly_limit: var_or("LEAVE_MONTHLY_LIMIT", defaults.monthly_limit)?,
            },
        };

        if config.store_backend == StoreBackend::Mysql && config.database_url.is_none() {
            return Err(anyhow!("DATABASE_URL must be set when STORE_BACKEND=mysql"));
        }
        if config.leave_policy.yearly_limit < 0 || config.leave_policy.monthly_limit < 0 {
            return Err(anyhow!("leave limits cannot be negative"));
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_names_parse_case_insensitively() {
        assert_eq!("memory".parse::<StoreBackend>().unwrap(), StoreBackend::Memory);
        assert_eq!("MySQL".parse::<StoreBackend>().unwrap(), StoreBackend::Mysql);
        assert!("postgres".parse::<StoreBackend>().is_err());
        assert_eq!(StoreBackend::Memory.as_ref(), "memory");
    }

    #[test]
    fn unset_variables_fall_back_to_defaults() {
        assert_eq!(var_or("HRMS_TEST_SURELY_UNSET_VAR", 42u32).unwrap(), 42);
    }
}
