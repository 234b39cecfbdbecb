use std::env;
use std::str::FromStr;

use anyhow::{Context, Result, anyhow, bail};
use tracing::Level;

use crate::store::leave::LeavePolicy;

/// Where the stores keep their records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Storage {
    Memory,
    MySql { database_url: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_addr: String,
    pub jwt_secret: String,
    pub storage: Storage,

    // Rate limiting
    pub rate_protected_per_min: u32,

    pub api_prefix: String,
    pub leave_policy: LeavePolicy,

    pub log_dir: String,
    pub log_level: Level,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; `from_env` passes the process env.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |key: &str| get(key).ok_or_else(|| anyhow!("{key} must be set"));

        let storage = match get("STORAGE").as_deref().map(str::trim) {
            None | Some("") | Some("memory") => Storage::Memory,
            Some("mysql") => Storage::MySql {
                database_url: required("DATABASE_URL")?,
            },
            Some(other) => bail!("STORAGE must be memory or mysql, got {other:?}"),
        };

        let min_lead_days = match get("LEAVE_LEAD_DAYS") {
            Some(raw) => Some(parse("LEAVE_LEAD_DAYS", &raw)?),
            None => None,
        };

        Ok(Self {
            server_addr: required("SERVER_ADDR")?,
            jwt_secret: required("JWT_SECRET")?,
            storage,
            rate_protected_per_min: parse(
                "RATE_PROTECTED_PER_MIN",
                &get("RATE_PROTECTED_PER_MIN").unwrap_or_else(|| "1000".to_string()),
            )?,
            api_prefix: get("API_PREFIX").unwrap_or_else(|| "/api".to_string()),
            leave_policy: LeavePolicy { min_lead_days },
            log_dir: get("LOG_DIR").unwrap_or_else(|| "logs".to_string()),
            log_level: parse("LOG_LEVEL", &get("LOG_LEVEL").unwrap_or_else(|| "debug".to_string()))?,
        })
    }
}

fn parse<T>(key: &str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.trim()
        .parse()
        .with_context(|| format!("{key} has an invalid value {raw:?}"))
}
