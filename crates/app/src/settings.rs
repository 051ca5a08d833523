//! Application settings.
//!
//! Read from `souq.toml` (override the path with `SOUQ_CONFIG`), with
//! `SOUQ__`-prefixed environment variables layered on top.

use config::{Config, ConfigError, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub app: App,
    pub server: Option<Server>,
}

#[derive(Debug, Deserialize)]
pub struct App {
    /// Log filter level (`info`, `debug`, ...).
    pub level: String,
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub bind: Option<String>,
    pub port: u16,
    pub database: Database,
}

/// Database backing the ledger.
///
/// TOML: `database = "memory"` or `database = { sqlite = "./souq.db" }`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let path = std::env::var("SOUQ_CONFIG").unwrap_or_else(|_| "souq.toml".to_string());
        let settings = Config::builder()
            .set_default("app.level", "info")?
            .add_source(File::with_name(&path).required(false))
            .add_source(config::Environment::with_prefix("SOUQ").separator("__"))
            .build()?;

        settings.try_deserialize()
    }
}
