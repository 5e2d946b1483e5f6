//! Common types used throughout the kiosk service

use crate::error::{KioskError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unique identifier for doctors
pub type DoctorId = String;

/// Unique identifier for appointments
pub type AppointmentId = String;

/// Unique identifier for patients
pub type PatientId = String;

/// A doctor as returned by the upstream scheduling system.
///
/// The board header uses the first doctor from the listing; the remaining
/// fields are passed through for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Doctor {
    pub id: DoctorId,
    pub first_name: String,
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specialty: Option<String>,
}

impl Doctor {
    /// Display name for the board header
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// A timestamped record of an appointment moving into a given status.
///
/// The `datetime` is string-encoded by the source system and is passed
/// through uninterpreted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusTransition {
    pub to_status: String,
    pub datetime: String,
}

/// One appointment on the day's schedule.
///
/// `status` is an open-ended set of strings; see
/// [`crate::schedule::wait_time::READY_STATUSES`] for the states that count
/// as "patient is present and waiting". Transition history is an explicit
/// optional field: the upstream API omits it on some records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: AppointmentId,
    pub patient: PatientId,
    pub status: String,
    pub scheduled_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exam_room: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_transitions: Option<Vec<StatusTransition>>,
}

impl Appointment {
    /// Reject records that would produce a misaligned or meaningless board row.
    ///
    /// Serde already fails on records missing whole fields; empty-string ids
    /// and statuses are the remaining malformed shape.
    pub fn validate(&self) -> Result<()> {
        if self.id.is_empty() {
            return Err(KioskError::MalformedAppointmentRecord {
                appointment_id: "<unknown>".to_string(),
                reason: "empty appointment id".to_string(),
            }
            .into());
        }
        if self.patient.is_empty() {
            return Err(KioskError::MalformedAppointmentRecord {
                appointment_id: self.id.clone(),
                reason: "empty patient reference".to_string(),
            }
            .into());
        }
        if self.status.is_empty() {
            return Err(KioskError::MalformedAppointmentRecord {
                appointment_id: self.id.clone(),
                reason: "empty status".to_string(),
            }
            .into());
        }
        Ok(())
    }
}

/// A patient as returned by the upstream scheduling system.
///
/// Demographics are opaque to the aggregation core and pass through unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    pub id: PatientId,
    pub first_name: String,
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
}

/// Derived wait-time value for a board row.
///
/// Either the empty sentinel (unknown / not applicable) or the datetime
/// copied from the transition that moved the appointment into its current
/// ready status. Serialized transparently so the empty case is `""`, not a
/// missing value.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WaitTime(String);

impl WaitTime {
    /// The empty sentinel: wait time unknown or not applicable
    pub fn empty() -> Self {
        WaitTime(String::new())
    }

    /// Wait time anchored at the given transition datetime
    pub fn since(datetime: impl Into<String>) -> Self {
        WaitTime(datetime.into())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for WaitTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0.is_empty() {
            write!(f, "-")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// One fully-joined board row: the i-th detail describes the i-th input
/// appointment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppointmentDetail {
    pub appointment: Appointment,
    pub patient: Patient,
    pub wait_time: WaitTime,
}

/// The rendered board for one doctor and one calendar date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppointmentBoard {
    pub doctor: Doctor,
    pub date: String,
    pub appointments: Vec<AppointmentDetail>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::current_timestamp;

    fn appointment(id: &str, patient: &str, status: &str) -> Appointment {
        Appointment {
            id: id.to_string(),
            patient: patient.to_string(),
            status: status.to_string(),
            scheduled_time: current_timestamp(),
            reason: None,
            exam_room: None,
            status_transitions: None,
        }
    }

    #[test]
    fn test_appointment_validation() {
        assert!(appointment("a1", "p1", "Scheduled").validate().is_ok());
        assert!(appointment("", "p1", "Scheduled").validate().is_err());
        assert!(appointment("a1", "", "Scheduled").validate().is_err());
        assert!(appointment("a1", "p1", "").validate().is_err());
    }

    #[test]
    fn test_validation_error_names_the_record() {
        let err = appointment("a7", "", "Arrived").validate().unwrap_err();
        let kiosk_err = err.downcast_ref::<KioskError>().unwrap();
        match kiosk_err {
            KioskError::MalformedAppointmentRecord { appointment_id, .. } => {
                assert_eq!(appointment_id, "a7");
            }
            other => panic!("unexpected error variant: {other:?}"),
        }
    }

    #[test]
    fn test_wait_time_sentinel() {
        let empty = WaitTime::empty();
        assert!(empty.is_empty());
        assert_eq!(empty.as_str(), "");
        assert_eq!(serde_json::to_string(&empty).unwrap(), "\"\"");

        let anchored = WaitTime::since("2026-02-06T09:00:00");
        assert!(!anchored.is_empty());
        assert_eq!(
            serde_json::to_string(&anchored).unwrap(),
            "\"2026-02-06T09:00:00\""
        );
    }

    #[test]
    fn test_appointment_serde_omits_absent_transitions() {
        let appt = appointment("a1", "p1", "Arrived");
        let json = serde_json::to_string(&appt).unwrap();
        assert!(!json.contains("status_transitions"));

        let parsed: Appointment = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.status_transitions, None);
    }

    #[test]
    fn test_doctor_full_name() {
        let doctor = Doctor {
            id: "d1".to_string(),
            first_name: "Alice".to_string(),
            last_name: "Nguyen".to_string(),
            specialty: Some("Family Medicine".to_string()),
        };
        assert_eq!(doctor.full_name(), "Alice Nguyen");
    }
}
