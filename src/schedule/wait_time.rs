//! Wait-time derivation from appointment status transitions
//!
//! A wait time exists only for appointments in a ready status: the patient is
//! physically or virtually present and waiting for the doctor. It is the
//! datetime of the transition that moved the appointment into that status,
//! copied verbatim from the transition record.

use crate::types::{Appointment, WaitTime};

/// Statuses indicating the patient is present and awaiting the doctor
pub const READY_STATUSES: [&str; 3] = ["Arrived", "Checked In", "Checked In Online"];

/// Whether a status string is in the ready set
pub fn is_ready_status(status: &str) -> bool {
    READY_STATUSES.contains(&status)
}

/// Derive the wait time for one appointment.
///
/// Non-ready appointments and ready appointments without transition data get
/// the empty sentinel. For ready appointments the transition list is scanned
/// in order and every transition into the current status overwrites the
/// result, so the LAST matching transition's datetime wins. This matches the
/// source system's behavior when an appointment re-enters a status; tests pin
/// the policy.
pub fn derive_wait_time(appointment: &Appointment) -> WaitTime {
    if !is_ready_status(&appointment.status) {
        return WaitTime::empty();
    }

    let Some(transitions) = &appointment.status_transitions else {
        return WaitTime::empty();
    };

    let mut wait_time = WaitTime::empty();
    for transition in transitions {
        if transition.to_status == appointment.status {
            wait_time = WaitTime::since(transition.datetime.clone());
        }
    }
    wait_time
}
