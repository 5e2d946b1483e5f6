//! HTTP surface for the kiosk
//!
//! One axum server carries the appointment board endpoint alongside the
//! health probes and Prometheus metrics.

use crate::error::KioskError;
use crate::service::app::AppState;
use crate::service::health::{HealthCheck, HealthStatus};
use anyhow::{Context, Result};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use prometheus::{Encoder, TextEncoder};
use serde::Deserialize;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

/// Kiosk server configuration
#[derive(Debug, Clone)]
pub struct KioskServerConfig {
    /// Port to bind the server to
    pub port: u16,
    /// Host to bind to (typically "0.0.0.0" for all interfaces)
    pub host: String,
}

impl Default for KioskServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            host: "0.0.0.0".to_string(),
        }
    }
}

/// Shared state for the kiosk server
#[derive(Clone)]
pub struct KioskServerState {
    pub app_state: Arc<AppState>,
}

/// HTTP server that provides the board and monitoring endpoints
pub struct KioskServer {
    config: KioskServerConfig,
    state: KioskServerState,
    shutdown_tx: broadcast::Sender<()>,
}

impl KioskServer {
    /// Create a new kiosk server
    pub fn new(config: KioskServerConfig, app_state: Arc<AppState>) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);

        Self {
            config,
            state: KioskServerState { app_state },
            shutdown_tx,
        }
    }

    /// Start the server
    pub async fn start(&self) -> Result<()> {
        let addr: SocketAddr = format!("{}:{}", self.config.host, self.config.port)
            .parse()
            .context("Invalid kiosk server address")?;

        let app = self.create_router();
        let listener = TcpListener::bind(addr).await?;

        info!("Kiosk server listening on http://{}", addr);

        let mut shutdown_rx = self.shutdown_tx.subscribe();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.recv().await;
                info!("Kiosk server shutdown signal received");
            })
            .await?;

        info!("Kiosk server stopped");
        Ok(())
    }

    /// Create the Axum router with all endpoints
    pub fn create_router(&self) -> Router {
        Router::new()
            .route("/", get(root_handler))
            .route("/board", get(board_handler))
            .route("/health", get(health_handler))
            .route("/ready", get(ready_handler))
            .route("/alive", get(alive_handler))
            .route("/metrics", get(metrics_handler))
            .with_state(self.state.clone())
    }

    /// Stop the server
    pub async fn stop(&self) -> Result<()> {
        info!("Stopping kiosk server...");

        if let Err(e) = self.shutdown_tx.send(()) {
            warn!("Failed to send shutdown signal to kiosk server: {}", e);
        }

        Ok(())
    }
}

/// Query parameters for the board endpoint
#[derive(Debug, Deserialize)]
struct BoardQuery {
    /// Optional `YYYY-MM-DD` date override
    date: Option<String>,
}

/// Root endpoint handler - shows service information
async fn root_handler() -> impl IntoResponse {
    let info = json!({
        "service": "clinic-kiosk",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": [
            "/board",
            "/health",
            "/ready",
            "/alive",
            "/metrics"
        ]
    });

    Json(info)
}

/// Appointment board endpoint handler
async fn board_handler(
    State(state): State<KioskServerState>,
    Query(query): Query<BoardQuery>,
) -> Response {
    debug!(date = ?query.date, "Board requested");

    if let Some(date) = &query.date {
        if crate::utils::parse_schedule_date(date).is_none() {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": "invalid date (expected YYYY-MM-DD)",
                    "date": date
                })),
            )
                .into_response();
        }
    }

    match state
        .app_state
        .board_service()
        .render_board(query.date.as_deref())
        .await
    {
        Ok(board) => (StatusCode::OK, Json(board)).into_response(),
        Err(e) => board_error_response(&e),
    }
}

/// Map a board failure to an HTTP response without leaking a partial board.
/// Response bodies carry fixed messages; the failure detail goes to the log.
fn board_error_response(error: &anyhow::Error) -> Response {
    let (status, message) = match error.downcast_ref::<KioskError>() {
        Some(KioskError::AuthenticationMissing { .. }) => (
            StatusCode::UNAUTHORIZED,
            "kiosk is not signed in; complete the OAuth setup",
        ),
        Some(KioskError::UpstreamFetchFailure { .. })
        | Some(KioskError::PatientNotFound { .. })
        | Some(KioskError::NoDoctorAvailable)
        | Some(KioskError::MalformedAppointmentRecord { .. }) => {
            warn!("Upstream failure while rendering board: {:#}", error);
            (
                StatusCode::BAD_GATEWAY,
                "upstream scheduling system request failed",
            )
        }
        _ => {
            error!("Board rendering failed: {:#}", error);
            (StatusCode::INTERNAL_SERVER_ERROR, "internal error")
        }
    };

    (status, Json(json!({ "error": message }))).into_response()
}

/// Lightweight health check endpoint handler
async fn health_handler(State(state): State<KioskServerState>) -> impl IntoResponse {
    debug!("Health check requested");

    match HealthCheck::check(state.app_state.clone()).await {
        Ok(health) => {
            let status = match health.status {
                HealthStatus::Healthy | HealthStatus::Degraded => StatusCode::OK,
                HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
            };
            (status, Json(health)).into_response()
        }
        Err(e) => {
            error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "unhealthy",
                    "service": "clinic-kiosk",
                    "error": e.to_string()
                })),
            )
                .into_response()
        }
    }
}

/// Readiness check endpoint handler
async fn ready_handler(State(state): State<KioskServerState>) -> impl IntoResponse {
    debug!("Readiness check requested");

    match HealthCheck::readiness_check(state.app_state.clone()).await {
        Ok(HealthStatus::Healthy) => (StatusCode::OK, "Ready"),
        Ok(HealthStatus::Degraded) => (StatusCode::OK, "Degraded but ready"),
        Ok(HealthStatus::Unhealthy) => (StatusCode::SERVICE_UNAVAILABLE, "Not ready"),
        Err(e) => {
            error!("Readiness check failed: {}", e);
            (StatusCode::SERVICE_UNAVAILABLE, "Not ready")
        }
    }
}

/// Liveness check endpoint handler
async fn alive_handler(State(state): State<KioskServerState>) -> impl IntoResponse {
    debug!("Liveness check requested");

    match HealthCheck::liveness_check(state.app_state.clone()).await {
        Ok(HealthStatus::Healthy) => (StatusCode::OK, "Alive"),
        _ => (StatusCode::SERVICE_UNAVAILABLE, "Not alive"),
    }
}

/// Prometheus metrics endpoint handler
async fn metrics_handler(State(state): State<KioskServerState>) -> impl IntoResponse {
    debug!("Metrics endpoint requested");

    let registry = state.app_state.metrics().registry();
    let metric_families = registry.gather();
    let encoder = TextEncoder::new();

    match encoder.encode_to_string(&metric_families) {
        Ok(metrics_output) => Response::builder()
            .status(StatusCode::OK)
            .header("content-type", encoder.format_type())
            .body(metrics_output)
            .unwrap()
            .into_response(),
        Err(e) => {
            error!("Failed to encode metrics: {}", e);
            Response::builder()
                .status(StatusCode::INTERNAL_SERVER_ERROR)
                .body("Failed to encode metrics".to_string())
                .unwrap()
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt; // for oneshot

    async fn test_router(with_token: bool) -> Router {
        let mut config = AppConfig::default();
        config.kiosk.schedule_date = Some("2026-02-06".to_string());
        if with_token {
            config.upstream.access_token = Some("tok".to_string());
        }

        let app_state = Arc::new(AppState::new(config).await.unwrap());
        let server = KioskServer::new(KioskServerConfig::default(), app_state);
        server.create_router()
    }

    #[tokio::test]
    async fn test_root_endpoint() {
        let app = test_router(true).await;

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_board_endpoint_renders_sample_day() {
        let app = test_router(true).await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/board")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let board: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(board["date"], "2026-02-06");
        assert_eq!(board["appointments"].as_array().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_board_without_credentials_is_unauthorized() {
        let app = test_router(false).await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/board")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_board_upstream_failure_is_bad_gateway() {
        // Token present but the upstream has no doctors: the board cannot
        // render and the failure maps to 502, not 500
        let mut config = AppConfig::default();
        config.upstream.access_token = Some("tok".to_string());
        config.upstream.use_sample_data = false;

        let app_state = Arc::new(AppState::new(config).await.unwrap());
        let server = KioskServer::new(KioskServerConfig::default(), app_state);
        let app = server.create_router();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/board")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        // The body carries the fixed message, not the upstream error detail
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let error: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(
            error["error"],
            "upstream scheduling system request failed"
        );
    }

    #[tokio::test]
    async fn test_unclassified_error_maps_to_internal_error() {
        let response = board_error_response(&anyhow::anyhow!("lock poisoned"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let error: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(error["error"], "internal error");
    }

    #[tokio::test]
    async fn test_board_rejects_malformed_date() {
        let app = test_router(true).await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/board?date=02/06/2026")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_metrics_endpoint() {
        let app = test_router(true).await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/metrics")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let content_type = response.headers().get("content-type").unwrap();
        assert!(content_type.to_str().unwrap().contains("text/plain"));
    }

    #[tokio::test]
    async fn test_probes_before_start_are_unavailable() {
        // AppState::start was never called, so the service is not running
        let app = test_router(true).await;

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/alive")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_404_handling() {
        let app = test_router(true).await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/nonexistent")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
