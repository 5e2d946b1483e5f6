//! Test fixtures and mock implementations for integration testing

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use clinic_kiosk::error::{KioskError, Result};
use clinic_kiosk::types::{Appointment, Patient, StatusTransition};
use clinic_kiosk::upstream::PatientFetcher;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Patient fetcher that records every requested id, for asserting call
/// counts and ordering. Ids listed in `failing_ids` return an upstream
/// error instead of a patient.
#[derive(Debug, Default)]
pub struct RecordingPatientFetcher {
    patients: HashMap<String, Patient>,
    failing_ids: Vec<String>,
    requested_ids: Arc<Mutex<Vec<String>>>,
}

impl RecordingPatientFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_patient(mut self, patient: Patient) -> Self {
        self.patients.insert(patient.id.clone(), patient);
        self
    }

    /// Make requests for this id fail with an upstream error
    pub fn with_failing_id(mut self, id: &str) -> Self {
        self.failing_ids.push(id.to_string());
        self
    }

    /// All ids requested so far, in request order
    pub fn requested_ids(&self) -> Vec<String> {
        self.requested_ids
            .lock()
            .map(|ids| ids.clone())
            .unwrap_or_default()
    }

    pub fn request_count(&self) -> usize {
        self.requested_ids().len()
    }
}

#[async_trait]
impl PatientFetcher for RecordingPatientFetcher {
    async fn fetch(&self, patient_id: &str) -> Result<Patient> {
        if let Ok(mut ids) = self.requested_ids.lock() {
            ids.push(patient_id.to_string());
        }

        if self.failing_ids.iter().any(|id| id == patient_id) {
            return Err(KioskError::UpstreamFetchFailure {
                resource: "patient".to_string(),
                message: format!("injected failure for {}", patient_id),
            }
            .into());
        }

        self.patients
            .get(patient_id)
            .cloned()
            .ok_or_else(|| {
                KioskError::PatientNotFound {
                    patient_id: patient_id.to_string(),
                }
                .into()
            })
    }
}

/// Build a patient with placeholder demographics
pub fn patient(id: &str, first_name: &str, last_name: &str) -> Patient {
    Patient {
        id: id.to_string(),
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        date_of_birth: None,
        gender: None,
    }
}

/// Build an appointment with no transition history
pub fn appointment(id: &str, patient_id: &str, status: &str, hour: u32) -> Appointment {
    Appointment {
        id: id.to_string(),
        patient: patient_id.to_string(),
        status: status.to_string(),
        scheduled_time: schedule_time(hour),
        reason: None,
        exam_room: None,
        status_transitions: None,
    }
}

/// Build an appointment carrying the given transition history
pub fn appointment_with_transitions(
    id: &str,
    patient_id: &str,
    status: &str,
    hour: u32,
    transitions: Vec<(&str, &str)>,
) -> Appointment {
    let mut appt = appointment(id, patient_id, status, hour);
    appt.status_transitions = Some(
        transitions
            .into_iter()
            .map(|(to_status, datetime)| StatusTransition {
                to_status: to_status.to_string(),
                datetime: datetime.to_string(),
            })
            .collect(),
    );
    appt
}

fn schedule_time(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 2, 6, hour, 0, 0).single().unwrap()
}
