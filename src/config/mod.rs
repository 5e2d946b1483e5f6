//! Configuration management for the clinic-kiosk service
//!
//! This module handles all configuration loading from environment variables
//! and optional TOML files, validation, and default values.

pub mod app;

// Re-export commonly used types
pub use app::{validate_config, AppConfig, KioskSettings, ServiceSettings, UpstreamSettings};
