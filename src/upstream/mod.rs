//! Upstream scheduling API capabilities
//!
//! The kiosk consumes three narrow capabilities from the scheduling system:
//! a doctor listing, a per-date appointment listing, and a per-id patient
//! fetch. The real REST client (with its pagination and retry behavior) is
//! out of scope; the in-memory provider stands in for it during development
//! and testing.

pub mod memory;
pub mod provider;

// Re-export commonly used types
pub use memory::InMemoryScheduleProvider;
pub use provider::{AppointmentLister, DoctorLister, PatientFetcher};
