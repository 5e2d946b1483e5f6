//! Main application state and service coordination
//!
//! This module contains the production AppState that wires the credential
//! provider, the upstream capabilities, and the aggregation core together,
//! plus the BoardService composition consumed by the HTTP surface.

use crate::auth::provider::{CredentialProvider, StaticCredentialProvider};
use crate::config::AppConfig;
use crate::error::{KioskError, Result as KioskResult};
use crate::metrics::MetricsCollector;
use crate::schedule::aggregator::AppointmentWaitAggregator;
use crate::service::http::{KioskServer, KioskServerConfig};
use crate::types::{AppointmentBoard, Patient};
use crate::upstream::memory::InMemoryScheduleProvider;
use crate::upstream::provider::{AppointmentLister, DoctorLister, PatientFetcher};
use crate::utils::generate_request_id;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::Duration;
use tracing::{debug, error, info, warn};

/// Service-level errors
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Service initialization error: {message}")]
    Initialization { message: String },

    #[error("Background task error: {message}")]
    BackgroundTask { message: String },
}

/// Patient fetcher wrapper that records fetch metrics before delegating
struct MeteredPatientFetcher {
    inner: Arc<dyn PatientFetcher>,
    metrics: Arc<MetricsCollector>,
}

#[async_trait]
impl PatientFetcher for MeteredPatientFetcher {
    async fn fetch(&self, id: &str) -> KioskResult<Patient> {
        let result = self.inner.fetch(id).await;
        self.metrics
            .record_upstream_fetch("patient", result.is_ok());
        result
    }
}

/// The board composition: credential check, doctor lookup, appointment
/// listing, and wait-time aggregation for one request.
pub struct BoardService {
    credentials: Arc<dyn CredentialProvider>,
    doctors: Arc<dyn DoctorLister>,
    appointments: Arc<dyn AppointmentLister>,
    aggregator: AppointmentWaitAggregator,
    metrics: Arc<MetricsCollector>,
    default_date: String,
}

impl BoardService {
    /// Wire a board service from its capabilities
    pub fn new(
        credentials: Arc<dyn CredentialProvider>,
        doctors: Arc<dyn DoctorLister>,
        appointments: Arc<dyn AppointmentLister>,
        patients: Arc<dyn PatientFetcher>,
        metrics: Arc<MetricsCollector>,
        default_date: String,
    ) -> Self {
        let metered = Arc::new(MeteredPatientFetcher {
            inner: patients,
            metrics: metrics.clone(),
        });

        Self {
            credentials,
            doctors,
            appointments,
            aggregator: AppointmentWaitAggregator::new(metered),
            metrics,
            default_date,
        }
    }

    /// Render the appointment board for the given date (or the configured
    /// default). Fails whole, never partially: a missing credential, a
    /// failed upstream fetch, or a malformed record aborts the request.
    pub async fn render_board(&self, date: Option<&str>) -> KioskResult<AppointmentBoard> {
        let request_id = generate_request_id();
        let date = date.unwrap_or(&self.default_date).to_string();
        let timer = self.metrics.start_timer();

        debug!(%request_id, %date, "Rendering appointment board");

        // Credential check comes first; without a token no upstream call is
        // attempted and the caller gets a re-authentication prompt.
        if let Err(e) = self.credentials.access_token().await {
            self.metrics.record_auth_rejection();
            return Err(e);
        }

        let doctor_listing = self.doctors.list().await;
        self.metrics
            .record_upstream_fetch("doctor", doctor_listing.is_ok());
        let doctor = doctor_listing?
            .into_iter()
            .next()
            .ok_or(KioskError::NoDoctorAvailable)?;

        let appointment_listing = self.appointments.list(&date).await;
        self.metrics
            .record_upstream_fetch("appointment", appointment_listing.is_ok());
        let appointments = appointment_listing?;

        let details = self.aggregator.aggregate(appointments).await?;

        let elapsed = timer.stop();
        self.metrics.record_board_rendered(details.len(), elapsed);
        info!(
            %request_id,
            %date,
            doctor = %doctor.full_name(),
            appointments = details.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "Appointment board rendered"
        );

        Ok(AppointmentBoard {
            doctor,
            date,
            appointments: details,
        })
    }

    /// Whether a credential is currently stored (for health reporting)
    pub async fn has_credential(&self) -> bool {
        self.credentials.has_credential().await
    }

    /// Probe the doctor listing (for readiness reporting)
    pub async fn probe_upstream(&self) -> KioskResult<usize> {
        Ok(self.doctors.list().await?.len())
    }
}

/// Main application state containing all service components
pub struct AppState {
    /// Application configuration
    config: AppConfig,

    /// The board composition served over HTTP
    board: Arc<BoardService>,

    /// Metrics collector shared with the HTTP surface
    metrics: Arc<MetricsCollector>,

    /// The HTTP server, once started
    server: Mutex<Option<Arc<KioskServer>>>,

    /// Background task handles
    background_tasks: Mutex<Vec<JoinHandle<()>>>,

    /// Service status
    is_running: Arc<RwLock<bool>>,
}

impl AppState {
    /// Initialize the application with all dependencies
    pub async fn new(config: AppConfig) -> Result<Self, ServiceError> {
        info!("Initializing clinic-kiosk service");
        info!(
            "Configuration: service={}, upstream={}, sample_data={}",
            config.service.name, config.upstream.base_url, config.upstream.use_sample_data
        );

        let metrics = Arc::new(
            MetricsCollector::new().map_err(|e| ServiceError::Initialization {
                message: format!("Failed to create metrics collector: {}", e),
            })?,
        );

        let credentials = Arc::new(StaticCredentialProvider::from_config(
            config.upstream.access_token.as_deref(),
        ));

        // The real scheduling API client lives outside this service; the
        // in-memory provider supplies all three capabilities.
        let schedule = if config.upstream.use_sample_data {
            Arc::new(InMemoryScheduleProvider::with_sample_day(
                &config.schedule_date(),
            ))
        } else {
            Arc::new(InMemoryScheduleProvider::new())
        };

        let board = Arc::new(BoardService::new(
            credentials,
            schedule.clone(),
            schedule.clone(),
            schedule,
            metrics.clone(),
            config.schedule_date(),
        ));

        Ok(Self {
            config,
            board,
            metrics,
            server: Mutex::new(None),
            background_tasks: Mutex::new(Vec::new()),
            is_running: Arc::new(RwLock::new(false)),
        })
    }

    /// Start the HTTP surface and background tasks
    pub async fn start(self: &Arc<Self>) -> Result<(), ServiceError> {
        info!("Starting clinic-kiosk service");

        *self.is_running.write().await = true;

        self.start_http_server().await?;
        self.start_background_tasks().await;

        info!("Clinic-kiosk service started successfully");
        Ok(())
    }

    /// Perform graceful shutdown
    pub async fn shutdown(&self) -> Result<(), ServiceError> {
        info!("Starting graceful shutdown of clinic-kiosk service");

        *self.is_running.write().await = false;

        if let Some(server) = self.server.lock().await.take() {
            if let Err(e) = server.stop().await {
                warn!("Failed to stop HTTP server: {}", e);
            } else {
                info!("HTTP server stopped");
            }
        }

        self.stop_background_tasks().await;

        info!(
            "Final board statistics: rendered={}, auth_rejections={}",
            self.metrics.board().boards_rendered_total.get(),
            self.metrics.board().auth_rejections_total.get()
        );
        info!("Clinic-kiosk service shutdown completed");

        Ok(())
    }

    /// Get service configuration
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Check if service is running
    pub async fn is_running(&self) -> bool {
        *self.is_running.read().await
    }

    /// Get the board service
    pub fn board_service(&self) -> Arc<BoardService> {
        self.board.clone()
    }

    /// Get the metrics collector
    pub fn metrics(&self) -> Arc<MetricsCollector> {
        self.metrics.clone()
    }

    /// Start the HTTP server task
    async fn start_http_server(self: &Arc<Self>) -> Result<(), ServiceError> {
        let server_config = KioskServerConfig {
            port: self.config.service.http_port,
            host: "0.0.0.0".to_string(),
        };
        let server = Arc::new(KioskServer::new(server_config, self.clone()));

        let server_task = {
            let server = server.clone();
            tokio::spawn(async move {
                if let Err(e) = server.start().await {
                    error!("HTTP server failed: {}", e);
                }
            })
        };

        *self.server.lock().await = Some(server);
        self.background_tasks.lock().await.push(server_task);

        // Give the listener a moment to bind
        tokio::time::sleep(Duration::from_millis(100)).await;

        info!(
            "HTTP server started on port {}",
            self.config.service.http_port
        );
        Ok(())
    }

    /// Start background maintenance tasks
    async fn start_background_tasks(self: &Arc<Self>) {
        info!("Starting uptime metrics task (60s interval)...");
        let uptime_task = {
            let metrics = self.metrics.clone();
            let is_running = self.is_running.clone();

            tokio::spawn(async move {
                let mut interval = tokio::time::interval(Duration::from_secs(60));
                let start_time = tokio::time::Instant::now();

                while *is_running.read().await {
                    interval.tick().await;

                    let uptime_seconds = start_time.elapsed().as_secs() as i64;
                    metrics.service().uptime_seconds.set(uptime_seconds);
                    metrics.update_health_status(2);

                    debug!("Updated service health metrics - uptime: {}s", uptime_seconds);
                }
            })
        };

        self.background_tasks.lock().await.push(uptime_task);
    }

    /// Stop all background tasks
    async fn stop_background_tasks(&self) {
        let mut tasks = self.background_tasks.lock().await;
        let task_count = tasks.len();
        if task_count == 0 {
            return;
        }

        info!("Stopping {} background tasks...", task_count);
        for task in tasks.drain(..) {
            task.abort();
        }

        // Give tasks time to clean up
        tokio::time::sleep(Duration::from_millis(100)).await;
        info!("All {} background tasks stopped", task_count);
    }
}
