//! Configuration management

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::constants::{
    DEFAULT_ACCESS_TOKEN_EXPIRY, DEFAULT_PENDING_TTL_SECONDS, DEFAULT_REFRESH_TOKEN_EXPIRY,
    DEFAULT_RETENTION_SECONDS, DEFAULT_SWEEP_INTERVAL_SECONDS,
};

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub app: AppSettings,
    pub database: DatabaseSettings,
    pub session: SessionSettings,
    pub handoff: HandoffSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppSettings {
    pub env: String,
    pub host: String,
    pub port: u16,
    pub name: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SessionSettings {
    pub secret: String,
    pub access_token_expiry: i64,
    pub refresh_token_expiry: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct HandoffSettings {
    /// Lifetime of a pending session, in seconds.
    pub pending_ttl_seconds: i64,
    /// How long expired records are retained before the sweeper deletes them.
    pub retention_seconds: i64,
    pub sweep_interval_seconds: u64,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".into());
        let config = Config::builder()
            .set_default("app.env", "development")?
            .set_default("app.host", "127.0.0.1")?
            .set_default("app.port", 8080)?
            .set_default("app.name", "handoff-server")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 1)?
            .set_default("session.access_token_expiry", DEFAULT_ACCESS_TOKEN_EXPIRY)?
            .set_default("session.refresh_token_expiry", DEFAULT_REFRESH_TOKEN_EXPIRY)?
            .set_default("handoff.pending_ttl_seconds", DEFAULT_PENDING_TTL_SECONDS)?
            .set_default("handoff.retention_seconds", DEFAULT_RETENTION_SECONDS)?
            .set_default(
                "handoff.sweep_interval_seconds",
                DEFAULT_SWEEP_INTERVAL_SECONDS,
            )?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::default().separator("__").try_parsing(true))
            .build()?;
        config.try_deserialize()
    }
}
