//! Capability traits for the upstream scheduling system
//!
//! Each trait is one resource of the scheduling API. Implementations return
//! read-only snapshots; the aggregation core never mutates or persists them.

use crate::error::Result;
use crate::types::{Appointment, Doctor, Patient};
use async_trait::async_trait;

/// Trait for listing the practice's doctors
#[async_trait]
pub trait DoctorLister: Send + Sync {
    /// List all doctors; the board uses the first element
    async fn list(&self) -> Result<Vec<Doctor>>;
}

/// Trait for listing appointments for one calendar date
#[async_trait]
pub trait AppointmentLister: Send + Sync {
    /// List appointments for a `YYYY-MM-DD` date, in stable upstream order
    async fn list(&self, date: &str) -> Result<Vec<Appointment>>;
}

/// Trait for fetching one patient by id
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PatientFetcher: Send + Sync {
    /// Fetch a single patient; fails if the id is unknown or the upstream
    /// call errors
    async fn fetch(&self, id: &str) -> Result<Patient>;
}
