use std::env;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable '{0}'")]
    Missing(&'static str),
    #[error("Invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Runtime settings read from the environment (and `.env`, if present).
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub db_pool_size: u32,
    pub seed_db: bool,
    /// Directory holding `demo-manager.sh`.
    pub demo_dir: PathBuf,
    /// Env file whose database URLs the demo control panel reports.
    pub env_file: PathBuf,
    pub script_timeout: Duration,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = parse(&lookup, "PORT", 8080u16)?;
        let db_pool_size = parse(&lookup, "DB_POOL_SIZE", 10u32)?;
        let seed_db = parse(&lookup, "SEED_DB", false)?;
        let script_timeout = Duration::from_secs(parse(&lookup, "SCRIPT_TIMEOUT_SECS", 120u64)?);
        let demo_dir = lookup("DEMO_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("../../demo"));
        let env_file = lookup("ENV_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(".env"));

        Ok(Self {
            host,
            port,
            database_url,
            db_pool_size,
            seed_db,
            demo_dir,
            env_file,
            script_timeout,
        })
    }
}

fn parse<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            reason: e.to_string(),
        }),
    }
}
