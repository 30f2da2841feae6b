use std::time::Duration;

use serde::Deserialize;
use time::{macros::format_description, UtcOffset};

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_days: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DbConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub db: DbConfig,
    pub jwt: JwtConfig,
    /// Marks the session cookie `Secure`.
    pub production: bool,
    pub request_timeout_secs: u64,
    /// Offset used to decide which calendar day "now" falls on.
    pub local_offset: UtcOffset,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let db = DbConfig {
            url: std::env::var("DATABASE_URL")?,
            max_connections: env_or("DB_MAX_CONNECTIONS", 10),
            acquire_timeout_secs: env_or("DB_ACQUIRE_TIMEOUT_SECS", 5),
        };
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "hourlog".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "hourlog-users".into()),
            ttl_days: env_or("SESSION_TTL_DAYS", 7),
        };
        let production = std::env::var("APP_ENV")
            .map(|v| v.eq_ignore_ascii_case("production"))
            .unwrap_or(false);
        Ok(Self {
            db,
            jwt,
            production,
            request_timeout_secs: env_or("REQUEST_TIMEOUT_SECS", 15),
            local_offset: local_offset_from_env()?,
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// `LOCAL_UTC_OFFSET` such as `-05:00`, else the host offset, else UTC.
fn local_offset_from_env() -> anyhow::Result<UtcOffset> {
    match std::env::var("LOCAL_UTC_OFFSET") {
        Ok(raw) => parse_offset(&raw),
        Err(_) => Ok(UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC)),
    }
}

fn parse_offset(raw: &str) -> anyhow::Result<UtcOffset> {
    let format = format_description!("[offset_hour sign:mandatory]:[offset_minute]");
    UtcOffset::parse(raw.trim(), format)
        .map_err(|e| anyhow::anyhow!("invalid LOCAL_UTC_OFFSET {raw:?}: {e}"))
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}
