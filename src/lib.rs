//! Clinic Kiosk - Waiting-room appointment board service
//!
//! This crate renders a doctor's daily appointment schedule with patient
//! details and derived wait times, served over HTTP for kiosk displays.

pub mod auth;
pub mod config;
pub mod error;
pub mod metrics;
pub mod schedule;
pub mod service;
pub mod types;
pub mod upstream;
pub mod utils;

// Re-export commonly used types and traits
pub use error::{KioskError, Result};
pub use types::*;

// Re-export key components
pub use auth::{CredentialProvider, StaticCredentialProvider};
pub use schedule::AppointmentWaitAggregator;
pub use upstream::{AppointmentLister, DoctorLister, InMemoryScheduleProvider, PatientFetcher};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
