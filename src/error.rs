//! Error types for the kiosk service
//!
//! This module defines all error types using anyhow for consistent error handling
//! throughout the application.

/// Result type alias for convenience
pub type Result<T> = anyhow::Result<T>;

/// Custom error types for specific kiosk scenarios
#[derive(Debug, thiserror::Error)]
pub enum KioskError {
    #[error("No stored credential available: {message}")]
    AuthenticationMissing { message: String },

    #[error("Upstream fetch failed for {resource}: {message}")]
    UpstreamFetchFailure { resource: String, message: String },

    #[error("Patient not found: {patient_id}")]
    PatientNotFound { patient_id: String },

    #[error("Malformed appointment record {appointment_id}: {reason}")]
    MalformedAppointmentRecord {
        appointment_id: String,
        reason: String,
    },

    #[error("Doctor listing is empty")]
    NoDoctorAvailable,

    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },

    #[error("Internal service error: {message}")]
    InternalError { message: String },
}
