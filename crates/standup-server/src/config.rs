use anyhow::Context;
use chrono::Duration as TtlDuration;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use standup_core::{DEFAULT_TTL_SECS, MAX_TTL_SECS};

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host address
    pub host: String,
    /// Server port
    pub port: u16,
    /// Database connection URL
    pub database_url: String,
    /// Maximum pooled database connections
    pub max_connections: u32,
    /// Lifetime of a record, measured from its creation
    pub record_ttl_secs: i64,
    /// Seconds between expiry sweeps, 0 disables the sweeper
    pub sweep_interval_secs: u64,
    /// Directory of pre-built client assets served as a fallback
    pub static_dir: Option<PathBuf>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = parse_or(&lookup, "PORT", 5000)?;
        let database_url = lookup("DATABASE_URL")
            .filter(|url| !url.trim().is_empty())
            .context("DATABASE_URL environment variable is not set")?;
        let max_connections = parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 10)?;
        let record_ttl_secs = parse_or(&lookup, "RECORD_TTL_SECS", DEFAULT_TTL_SECS)?;
        if !(1..=MAX_TTL_SECS).contains(&record_ttl_secs) {
            anyhow::bail!(
                "RECORD_TTL_SECS must be between 1 and {}, got {}",
                MAX_TTL_SECS,
                record_ttl_secs
            );
        }
        let sweep_interval_secs = parse_or(&lookup, "EXPIRY_SWEEP_SECS", 3600)?;
        let static_dir = lookup("STATIC_DIR")
            .filter(|dir| !dir.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            host,
            port,
            database_url,
            max_connections,
            record_ttl_secs,
            sweep_interval_secs,
            static_dir,
        })
    }

    pub fn record_ttl(&self) -> TtlDuration {
        TtlDuration::seconds(self.record_ttl_secs)
    }

    /// `None` when the sweeper is disabled
    pub fn sweep_interval(&self) -> Option<Duration> {
        (self.sweep_interval_secs > 0).then(|| Duration::from_secs(self.sweep_interval_secs))
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> anyhow::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("invalid value for {}: '{}'", key, raw)),
        None => Ok(default),
    }
}
