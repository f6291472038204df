//! Application configuration management.

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::Deserialize;

use crate::error::AppError;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// School-wide settings.
    #[serde(default)]
    pub school: SchoolConfig,
    /// Table rendering settings.
    #[serde(default)]
    pub listing: ListingConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// School-wide settings.
#[derive(Debug, Clone, Deserialize)]
pub struct SchoolConfig {
    /// IANA timezone used to decide what "today" is for due dates.
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

impl Default for SchoolConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
        }
    }
}

fn default_timezone() -> String {
    "America/Sao_Paulo".to_string()
}

impl SchoolConfig {
    /// Parses the configured timezone.
    pub fn tz(&self) -> Result<Tz, AppError> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_| AppError::Validation(format!("Unknown timezone: {}", self.timezone)))
    }

    /// Calendar date at the school for the given instant.
    pub fn today(&self, now: DateTime<Utc>) -> Result<NaiveDate, AppError> {
        Ok(now.with_timezone(&self.tz()?).date_naive())
    }
}

/// Table rendering settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ListingConfig {
    /// Rows per table page.
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    /// `chrono` format string for date cells.
    #[serde(default = "default_date_format")]
    pub date_format: String,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            date_format: default_date_format(),
        }
    }
}

fn default_page_size() -> usize {
    10
}

fn default_date_format() -> String {
    "%d/%m/%Y".to_string()
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("CAMPUS").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
