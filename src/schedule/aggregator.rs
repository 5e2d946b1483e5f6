//! Per-appointment join of appointment, patient, and wait time
//!
//! The aggregator walks the day's appointments in upstream order, fetches
//! each patient through the injected capability, derives the wait time, and
//! emits one aligned board row per input appointment. Fetches run strictly in
//! sequence with no caching or deduplication; callers rely on that ordering
//! and on the all-or-nothing failure behavior.

use crate::error::Result;
use crate::schedule::wait_time::derive_wait_time;
use crate::types::{Appointment, AppointmentDetail};
use crate::upstream::provider::PatientFetcher;
use std::sync::Arc;
use tracing::debug;

/// Joins appointments with patients and derived wait times for the board
pub struct AppointmentWaitAggregator {
    patient_fetcher: Arc<dyn PatientFetcher>,
}

impl AppointmentWaitAggregator {
    /// Create an aggregator over the given patient-fetch capability
    pub fn new(patient_fetcher: Arc<dyn PatientFetcher>) -> Self {
        Self { patient_fetcher }
    }

    /// Produce one board row per input appointment, in input order.
    ///
    /// Output length always equals input length. Any malformed record or
    /// failed patient fetch aborts the whole call; partial boards are never
    /// produced because a dropped row would misalign the display.
    pub async fn aggregate(&self, appointments: Vec<Appointment>) -> Result<Vec<AppointmentDetail>> {
        let mut details = Vec::with_capacity(appointments.len());

        for appointment in appointments {
            appointment.validate()?;

            let patient = self.patient_fetcher.fetch(&appointment.patient).await?;
            let wait_time = derive_wait_time(&appointment);

            debug!(
                appointment = %appointment.id,
                patient = %patient.id,
                status = %appointment.status,
                wait_time = %wait_time,
                "Aggregated board row"
            );

            details.push(AppointmentDetail {
                appointment,
                patient,
                wait_time,
            });
        }

        Ok(details)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::KioskError;
    use crate::types::{Patient, StatusTransition, WaitTime};
    use crate::upstream::provider::MockPatientFetcher;
    use crate::utils::current_timestamp;
    use anyhow::anyhow;
    use proptest::prelude::*;

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

    fn patient(id: &str) -> Patient {
        Patient {
            id: id.to_string(),
            first_name: "Test".to_string(),
            last_name: id.to_uppercase(),
            date_of_birth: None,
            gender: None,
        }
    }

    fn fetcher_for_any_patient() -> MockPatientFetcher {
        let mut fetcher = MockPatientFetcher::new();
        fetcher
            .expect_fetch()
            .returning(|id| Ok(patient(&id.to_string())));
        fetcher
    }

    #[tokio::test]
    async fn test_output_aligns_with_input() {
        let aggregator = AppointmentWaitAggregator::new(Arc::new(fetcher_for_any_patient()));

        let appointments = vec![
            appointment("a1", "p1", "Arrived"),
            appointment("a2", "p2", "Scheduled"),
            appointment("a3", "p3", "Complete"),
        ];
        let details = aggregator.aggregate(appointments.clone()).await.unwrap();

        assert_eq!(details.len(), appointments.len());
        for (detail, input) in details.iter().zip(appointments.iter()) {
            assert_eq!(detail.appointment.id, input.id);
            assert_eq!(detail.patient.id, input.patient);
        }
    }

    #[tokio::test]
    async fn test_wait_times_follow_status_policy() {
        let aggregator = AppointmentWaitAggregator::new(Arc::new(fetcher_for_any_patient()));

        let mut arrived = appointment("a1", "p1", "Arrived");
        arrived.status_transitions = Some(vec![StatusTransition {
            to_status: "Arrived".to_string(),
            datetime: "09:00".to_string(),
        }]);
        let scheduled = appointment("a2", "p2", "Scheduled");

        let details = aggregator.aggregate(vec![arrived, scheduled]).await.unwrap();

        assert_eq!(details[0].wait_time, WaitTime::since("09:00"));
        assert_eq!(details[1].wait_time, WaitTime::empty());
    }

    #[tokio::test]
    async fn test_fetch_failure_aborts_the_whole_aggregation() {
        let mut fetcher = MockPatientFetcher::new();
        fetcher
            .expect_fetch()
            .withf(|id| id == "p1")
            .returning(|id| Ok(patient(&id.to_string())));
        fetcher
            .expect_fetch()
            .withf(|id| id == "p2")
            .returning(|_| Err(anyhow!("upstream returned 500")));

        let aggregator = AppointmentWaitAggregator::new(Arc::new(fetcher));

        let result = aggregator
            .aggregate(vec![
                appointment("a1", "p1", "Arrived"),
                appointment("a2", "p2", "Arrived"),
                appointment("a3", "p1", "Arrived"),
            ])
            .await;

        // All-or-nothing: no partial board comes back
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_failure_stops_before_later_fetches() {
        let mut fetcher = MockPatientFetcher::new();
        fetcher
            .expect_fetch()
            .withf(|id| id == "p1")
            .times(1)
            .returning(|_| Err(anyhow!("boom")));
        // No expectation for p2: a fetch for it would panic the mock

        let aggregator = AppointmentWaitAggregator::new(Arc::new(fetcher));

        let result = aggregator
            .aggregate(vec![
                appointment("a1", "p1", "Arrived"),
                appointment("a2", "p2", "Arrived"),
            ])
            .await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_duplicate_patients_are_fetched_once_per_appointment() {
        let mut fetcher = MockPatientFetcher::new();
        fetcher
            .expect_fetch()
            .withf(|id| id == "p1")
            .times(3)
            .returning(|id| Ok(patient(&id.to_string())));

        let aggregator = AppointmentWaitAggregator::new(Arc::new(fetcher));

        let details = aggregator
            .aggregate(vec![
                appointment("a1", "p1", "Arrived"),
                appointment("a2", "p1", "Scheduled"),
                appointment("a3", "p1", "Complete"),
            ])
            .await
            .unwrap();

        assert_eq!(details.len(), 3);
    }

    #[tokio::test]
    async fn test_malformed_record_fails_the_call() {
        let aggregator = AppointmentWaitAggregator::new(Arc::new(fetcher_for_any_patient()));

        let result = aggregator
            .aggregate(vec![
                appointment("a1", "p1", "Arrived"),
                appointment("a2", "", "Arrived"),
            ])
            .await;

        let err = result.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<KioskError>(),
            Some(KioskError::MalformedAppointmentRecord { .. })
        ));
    }

    #[tokio::test]
    async fn test_empty_input_produces_empty_board() {
        let aggregator = AppointmentWaitAggregator::new(Arc::new(MockPatientFetcher::new()));

        let details = aggregator.aggregate(Vec::new()).await.unwrap();
        assert!(details.is_empty());
    }

    proptest! {
        /// Whatever the statuses look like, every returned row stays aligned
        /// with its input appointment.
        #[test]
        fn prop_output_always_aligns_with_input(
            statuses in proptest::collection::vec("[A-Za-z ]{1,16}", 1..12),
        ) {
            let appointments: Vec<Appointment> = statuses
                .iter()
                .enumerate()
                .map(|(i, status)| {
                    appointment(&format!("a{}", i), &format!("p{}", i), status)
                })
                .collect();

            let aggregator =
                AppointmentWaitAggregator::new(Arc::new(fetcher_for_any_patient()));
            let details =
                tokio_test::block_on(aggregator.aggregate(appointments.clone())).unwrap();

            prop_assert_eq!(details.len(), appointments.len());
            for (detail, input) in details.iter().zip(appointments.iter()) {
                prop_assert_eq!(&detail.appointment.id, &input.id);
                prop_assert_eq!(&detail.patient.id, &input.patient);
            }
        }
    }
}
