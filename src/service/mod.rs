//! Service layer for the clinic-kiosk service
//!
//! This module contains the main application state, the board composition
//! used by the HTTP surface, health checks, and background task management.

pub mod app;
pub mod health;
pub mod http;

pub use app::{AppState, BoardService, ServiceError};
pub use health::{HealthCheck, HealthStatus};
pub use http::KioskServer;
