//! Application configuration
//!
//! Configuration is layered: built-in defaults, then an optional
//! `linktrail.toml`, then `LINKTRAIL_*` environment variables
//! (e.g. `LINKTRAIL_SERVER__PORT=9000`).

use once_cell::sync::OnceCell;
use serde::Deserialize;

use crate::errors::{LinktrailError, Result};

static CONFIG: OnceCell<AppConfig> = OnceCell::new();

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub tracking: TrackingConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Base URL used when building short URLs in API responses
    #[serde(default = "default_public_url")]
    pub public_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_url")]
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrackingConfig {
    /// utm_source value stamped onto tagged destination URLs
    #[serde(default = "default_utm_source")]
    pub utm_source: String,
    /// utm_medium value stamped onto tagged destination URLs
    #[serde(default = "default_utm_medium")]
    pub utm_medium: String,
    /// Click history retention, independent of the attribution window
    #[serde(default = "default_click_retention_days")]
    pub click_retention_days: u64,
    #[serde(default = "default_cleanup_interval_hours")]
    pub cleanup_interval_hours: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// "plain" or "json"
    #[serde(default = "default_log_format")]
    pub format: String,
    /// Log file path; empty means stdout
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default)]
    pub enable_rotation: bool,
    #[serde(default = "default_max_backups")]
    pub max_backups: u32,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_public_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_database_url() -> String {
    "sqlite://linktrail.db?mode=rwc".to_string()
}

fn default_utm_source() -> String {
    "youtube".to_string()
}

fn default_utm_medium() -> String {
    "campaign_link".to_string()
}

fn default_click_retention_days() -> u64 {
    90
}

fn default_cleanup_interval_hours() -> u64 {
    24
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "plain".to_string()
}

fn default_max_backups() -> u32 {
    7
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            public_url: default_public_url(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
        }
    }
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            utm_source: default_utm_source(),
            utm_medium: default_utm_medium(),
            click_retention_days: default_click_retention_days(),
            cleanup_interval_hours: default_cleanup_interval_hours(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
            enable_rotation: false,
            max_backups: default_max_backups(),
        }
    }
}

impl AppConfig {
    /// Load configuration from file + environment
    pub fn load() -> Result<Self> {
        let builder = config::Config::builder()
            .add_source(config::File::with_name("linktrail").required(false))
            .add_source(
                config::Environment::with_prefix("LINKTRAIL")
                    .separator("__")
                    .try_parsing(true),
            );

        let settings = builder
            .build()
            .map_err(|e| LinktrailError::config(format!("Failed to load config: {}", e)))?;

        settings
            .try_deserialize()
            .map_err(|e| LinktrailError::config(format!("Invalid configuration: {}", e)))
    }
}

/// Initialize the global config. Later calls keep the first value.
pub fn init_config() -> &'static AppConfig {
    CONFIG.get_or_init(|| AppConfig::load().unwrap_or_else(|e| {
        eprintln!("Config load failed, using defaults: {}", e);
        AppConfig {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            tracking: TrackingConfig::default(),
            logging: LoggingConfig::default(),
        }
    }))
}

/// Get the global config; initializes with defaults when unset.
pub fn get_config() -> &'static AppConfig {
    init_config()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = AppConfig {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            tracking: TrackingConfig::default(),
            logging: LoggingConfig::default(),
        };
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.tracking.utm_source, "youtube");
        assert_eq!(cfg.tracking.click_retention_days, 90);
    }
}
