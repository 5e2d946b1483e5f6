//! In-memory scheduling provider for development and testing
//!
//! Serves the three upstream capabilities from seeded data. Lookups return
//! snapshots by value and the provider performs no caching of its own, so
//! repeated fetches of the same patient are fully independent calls.

use crate::error::{KioskError, Result};
use crate::types::{Appointment, Doctor, Patient, PatientId, StatusTransition};
use crate::upstream::provider::{AppointmentLister, DoctorLister, PatientFetcher};
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory stand-in for the scheduling API client
#[derive(Debug, Default)]
pub struct InMemoryScheduleProvider {
    doctors: RwLock<Vec<Doctor>>,
    /// Appointments keyed by `YYYY-MM-DD` date
    appointments: RwLock<HashMap<String, Vec<Appointment>>>,
    patients: RwLock<HashMap<PatientId, Patient>>,
}

impl InMemoryScheduleProvider {
    /// Create an empty provider
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a provider seeded with one doctor and a representative day:
    /// arrived, checked-in, scheduled, and complete appointments, plus one
    /// patient with two visits.
    pub fn with_sample_day(date: &str) -> Self {
        let provider = Self::new();

        provider.add_doctor(Doctor {
            id: "d1".to_string(),
            first_name: "Alice".to_string(),
            last_name: "Nguyen".to_string(),
            specialty: Some("Family Medicine".to_string()),
        });

        let sample_patients = vec![
            ("p1", "Maya", "Okafor"),
            ("p2", "Jordan", "Reyes"),
            ("p3", "Sam", "Whitfield"),
        ];
        for (id, first, last) in sample_patients {
            provider.add_patient(Patient {
                id: id.to_string(),
                first_name: first.to_string(),
                last_name: last.to_string(),
                date_of_birth: None,
                gender: None,
            });
        }

        let rows = vec![
            // (id, patient, status, hour, checked-in transition time)
            ("a1", "p1", "Arrived", 9, Some("08:52")),
            ("a2", "p2", "Checked In", 10, Some("09:47")),
            ("a3", "p3", "Scheduled", 11, None),
            ("a4", "p1", "Complete", 8, None),
        ];
        for (id, patient, status, hour, checked_in) in rows {
            let transitions = checked_in.map(|at| {
                vec![StatusTransition {
                    to_status: status.to_string(),
                    datetime: format!("{date}T{at}:00"),
                }]
            });
            provider.add_appointment(
                date,
                Appointment {
                    id: id.to_string(),
                    patient: patient.to_string(),
                    status: status.to_string(),
                    scheduled_time: sample_time(date, hour),
                    reason: None,
                    exam_room: None,
                    status_transitions: transitions,
                },
            );
        }

        provider
    }

    /// Add a doctor to the listing
    pub fn add_doctor(&self, doctor: Doctor) {
        if let Ok(mut doctors) = self.doctors.write() {
            doctors.push(doctor);
        }
    }

    /// Add a patient snapshot
    pub fn add_patient(&self, patient: Patient) {
        if let Ok(mut patients) = self.patients.write() {
            patients.insert(patient.id.clone(), patient);
        }
    }

    /// Append an appointment to a date's schedule, preserving insertion order
    pub fn add_appointment(&self, date: &str, appointment: Appointment) {
        if let Ok(mut appointments) = self.appointments.write() {
            appointments
                .entry(date.to_string())
                .or_default()
                .push(appointment);
        }
    }

    /// Number of seeded patients (for health reporting)
    pub fn patient_count(&self) -> usize {
        self.patients.read().map(|p| p.len()).unwrap_or(0)
    }
}

/// Scheduled time for a seeded appointment at a whole hour of the given date
fn sample_time(date: &str, hour: u32) -> chrono::DateTime<Utc> {
    let day = NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap_or_default();
    let time = NaiveTime::from_hms_opt(hour, 0, 0).unwrap_or_default();
    Utc.from_utc_datetime(&day.and_time(time))
}

#[async_trait]
impl DoctorLister for InMemoryScheduleProvider {
    async fn list(&self) -> Result<Vec<Doctor>> {
        let doctors = self.doctors.read().map_err(|_| KioskError::InternalError {
            message: "Failed to acquire doctors read lock".to_string(),
        })?;

        Ok(doctors.clone())
    }
}

#[async_trait]
impl AppointmentLister for InMemoryScheduleProvider {
    async fn list(&self, date: &str) -> Result<Vec<Appointment>> {
        let appointments = self
            .appointments
            .read()
            .map_err(|_| KioskError::InternalError {
                message: "Failed to acquire appointments read lock".to_string(),
            })?;

        Ok(appointments.get(date).cloned().unwrap_or_default())
    }
}

#[async_trait]
impl PatientFetcher for InMemoryScheduleProvider {
    async fn fetch(&self, id: &str) -> Result<Patient> {
        let patients = self.patients.read().map_err(|_| KioskError::InternalError {
            message: "Failed to acquire patients read lock".to_string(),
        })?;

        patients.get(id).cloned().ok_or_else(|| {
            KioskError::PatientNotFound {
                patient_id: id.to_string(),
            }
            .into()
        })
    }
}
