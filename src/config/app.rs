//! Main application configuration
//!
//! This module defines the primary configuration structures for the
//! clinic-kiosk service, including environment variable loading, TOML file
//! loading, and validation.

use crate::utils::parse_schedule_date;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub service: ServiceSettings,
    pub upstream: UpstreamSettings,
    pub kiosk: KioskSettings,
}

/// Service-level settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    /// Service name for logging and metrics
    pub name: String,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Port for the board, health, and metrics endpoints
    pub http_port: u16,
    /// Graceful shutdown timeout in seconds
    pub shutdown_timeout_seconds: u64,
}

/// Upstream scheduling API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamSettings {
    /// Base URL of the scheduling API
    pub base_url: String,
    /// Stored OAuth access token; absent means the kiosk is not signed in
    pub access_token: Option<String>,
    /// Per-request timeout in seconds
    pub request_timeout_seconds: u64,
    /// Serve seeded sample data instead of a live upstream
    pub use_sample_data: bool,
}

/// Kiosk display settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KioskSettings {
    /// Fixed `YYYY-MM-DD` schedule date; defaults to today when unset
    pub schedule_date: Option<String>,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            name: "clinic-kiosk".to_string(),
            log_level: "info".to_string(),
            http_port: 8080,
            shutdown_timeout_seconds: 30,
        }
    }
}

impl Default for UpstreamSettings {
    fn default() -> Self {
        Self {
            base_url: "https://app.drchrono.com/api".to_string(),
            access_token: None,
            request_timeout_seconds: 30,
            use_sample_data: true,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables with fallback to defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        // Service settings
        if let Ok(name) = env::var("SERVICE_NAME") {
            config.service.name = name;
        }
        if let Ok(log_level) = env::var("LOG_LEVEL") {
            config.service.log_level = log_level;
        }
        if let Ok(port) = env::var("HTTP_PORT") {
            config.service.http_port = port
                .parse()
                .map_err(|_| anyhow!("Invalid HTTP_PORT value: {}", port))?;
        }
        if let Ok(timeout) = env::var("SHUTDOWN_TIMEOUT_SECONDS") {
            config.service.shutdown_timeout_seconds = timeout
                .parse()
                .map_err(|_| anyhow!("Invalid SHUTDOWN_TIMEOUT_SECONDS value: {}", timeout))?;
        }

        // Upstream settings
        if let Ok(url) = env::var("UPSTREAM_BASE_URL") {
            config.upstream.base_url = url;
        }
        if let Ok(token) = env::var("UPSTREAM_ACCESS_TOKEN") {
            config.upstream.access_token = Some(token);
        }
        if let Ok(timeout) = env::var("UPSTREAM_TIMEOUT_SECONDS") {
            config.upstream.request_timeout_seconds = timeout
                .parse()
                .map_err(|_| anyhow!("Invalid UPSTREAM_TIMEOUT_SECONDS value: {}", timeout))?;
        }
        if let Ok(sample) = env::var("USE_SAMPLE_DATA") {
            config.upstream.use_sample_data = sample
                .parse()
                .map_err(|_| anyhow!("Invalid USE_SAMPLE_DATA value: {}", sample))?;
        }

        // Kiosk settings
        if let Ok(date) = env::var("SCHEDULE_DATE") {
            config.kiosk.schedule_date = Some(date);
        }

        validate_config(&config)?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: AppConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        validate_config(&config)?;
        Ok(config)
    }

    /// Get shutdown timeout as Duration
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.service.shutdown_timeout_seconds)
    }

    /// Get upstream request timeout as Duration
    pub fn upstream_request_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream.request_timeout_seconds)
    }

    /// The schedule date to render: the configured date, or today
    pub fn schedule_date(&self) -> String {
        self.kiosk
            .schedule_date
            .clone()
            .unwrap_or_else(crate::utils::today_date_string)
    }
}

/// Validate configuration values
pub fn validate_config(config: &AppConfig) -> Result<()> {
    // Validate log level
    match config.service.log_level.to_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => {}
        _ => return Err(anyhow!("Invalid log level: {}", config.service.log_level)),
    }

    // Validate ports
    if config.service.http_port == 0 {
        return Err(anyhow!("HTTP port cannot be 0"));
    }

    // Validate timeouts
    if config.service.shutdown_timeout_seconds == 0 {
        return Err(anyhow!("Shutdown timeout must be greater than 0"));
    }
    if config.upstream.request_timeout_seconds == 0 {
        return Err(anyhow!("Upstream request timeout must be greater than 0"));
    }

    // Validate upstream settings
    if config.upstream.base_url.is_empty() {
        return Err(anyhow!("Upstream base URL cannot be empty"));
    }

    // Validate kiosk settings
    if let Some(date) = &config.kiosk.schedule_date {
        if parse_schedule_date(date).is_none() {
            return Err(anyhow!("Invalid schedule date (expected YYYY-MM-DD): {}", date));
        }
    }

    Ok(())
}
