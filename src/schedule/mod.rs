//! Appointment board aggregation
//!
//! This module joins a day's appointments with patient details and a derived
//! wait time per appointment, in upstream order, for display on the kiosk.

pub mod aggregator;
pub mod wait_time;

// Re-export commonly used types
pub use aggregator::AppointmentWaitAggregator;
pub use wait_time::{derive_wait_time, is_ready_status, READY_STATUSES};
