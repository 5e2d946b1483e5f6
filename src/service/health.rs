//! Health check functionality for the clinic-kiosk service
//!
//! Provides readiness and liveness probes plus a detailed component report
//! for the monitoring endpoints.

use crate::service::app::AppState;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Health check status
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HealthStatus::Healthy => write!(f, "healthy"),
            HealthStatus::Degraded => write!(f, "degraded"),
            HealthStatus::Unhealthy => write!(f, "unhealthy"),
        }
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheck {
    /// Overall service status
    pub status: HealthStatus,
    /// Service name
    pub service: String,
    /// Service version
    pub version: String,
    /// Current timestamp
    pub timestamp: chrono::DateTime<chrono::Utc>,
    /// Detailed component checks
    pub checks: Vec<ComponentCheck>,
    /// Service statistics
    pub stats: ServiceStats,
}

/// Individual component health check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentCheck {
    /// Component name
    pub name: String,
    /// Component status
    pub status: HealthStatus,
    /// Optional error message if unhealthy
    pub message: Option<String>,
    /// Check duration in milliseconds
    pub duration_ms: u64,
}

/// Service statistics for health reporting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceStats {
    /// Boards rendered since service start
    pub boards_rendered: u64,
    /// Board requests rejected for missing credentials
    pub auth_rejections: u64,
    /// Appointments on the most recently rendered board
    pub appointments_on_board: i64,
    /// Service uptime in seconds (from the metrics gauge)
    pub uptime_seconds: i64,
}

impl HealthCheck {
    /// Perform a comprehensive health check of the service
    pub async fn check(app_state: Arc<AppState>) -> Result<Self> {
        let mut checks = Vec::new();
        let mut overall_status = HealthStatus::Healthy;

        let service_check = Self::check_service_running(&app_state).await;
        if service_check.status != HealthStatus::Healthy {
            overall_status = HealthStatus::Unhealthy;
        }
        checks.push(service_check);

        // A kiosk without a stored credential still serves probes but cannot
        // render boards, so it reports degraded rather than unhealthy.
        let credential_check = Self::check_credentials(&app_state).await;
        if credential_check.status == HealthStatus::Degraded
            && overall_status == HealthStatus::Healthy
        {
            overall_status = HealthStatus::Degraded;
        }
        checks.push(credential_check);

        let upstream_check = Self::check_upstream(&app_state).await;
        if upstream_check.status == HealthStatus::Unhealthy {
            overall_status = HealthStatus::Unhealthy;
        } else if upstream_check.status == HealthStatus::Degraded
            && overall_status == HealthStatus::Healthy
        {
            overall_status = HealthStatus::Degraded;
        }
        checks.push(upstream_check);

        let stats = Self::gather_service_stats(&app_state);

        Ok(HealthCheck {
            status: overall_status,
            service: app_state.config().service.name.clone(),
            version: crate::VERSION.to_string(),
            timestamp: chrono::Utc::now(),
            checks,
            stats,
        })
    }

    /// Simple liveness check - just verify service is running
    pub async fn liveness_check(app_state: Arc<AppState>) -> Result<HealthStatus> {
        if app_state.is_running().await {
            Ok(HealthStatus::Healthy)
        } else {
            Ok(HealthStatus::Unhealthy)
        }
    }

    /// Readiness check - verify the board path can reach its collaborators
    pub async fn readiness_check(app_state: Arc<AppState>) -> Result<HealthStatus> {
        if !app_state.is_running().await {
            return Ok(HealthStatus::Unhealthy);
        }

        Ok(Self::check_upstream(&app_state).await.status)
    }

    /// Check if service is running
    async fn check_service_running(app_state: &Arc<AppState>) -> ComponentCheck {
        let start = std::time::Instant::now();

        let (status, message) = if app_state.is_running().await {
            (HealthStatus::Healthy, None)
        } else {
            (
                HealthStatus::Unhealthy,
                Some("Service is not running".to_string()),
            )
        };

        ComponentCheck {
            name: "service_running".to_string(),
            status,
            message,
            duration_ms: start.elapsed().as_millis() as u64,
        }
    }

    /// Check whether a credential is stored
    async fn check_credentials(app_state: &Arc<AppState>) -> ComponentCheck {
        let start = std::time::Instant::now();

        let (status, message) = if app_state.board_service().has_credential().await {
            (HealthStatus::Healthy, None)
        } else {
            (
                HealthStatus::Degraded,
                Some("No stored access token; kiosk sign-in required".to_string()),
            )
        };

        ComponentCheck {
            name: "credentials".to_string(),
            status,
            message,
            duration_ms: start.elapsed().as_millis() as u64,
        }
    }

    /// Check the upstream schedule capability
    async fn check_upstream(app_state: &Arc<AppState>) -> ComponentCheck {
        let start = std::time::Instant::now();

        let (status, message) = match app_state.board_service().probe_upstream().await {
            Ok(0) => (
                HealthStatus::Degraded,
                Some("Doctor listing is empty".to_string()),
            ),
            Ok(_) => (HealthStatus::Healthy, None),
            Err(e) => (
                HealthStatus::Unhealthy,
                Some(format!("Upstream probe failed: {}", e)),
            ),
        };

        ComponentCheck {
            name: "upstream_schedule".to_string(),
            status,
            message,
            duration_ms: start.elapsed().as_millis() as u64,
        }
    }

    /// Gather current service statistics from the metrics collector
    fn gather_service_stats(app_state: &Arc<AppState>) -> ServiceStats {
        let metrics = app_state.metrics();

        ServiceStats {
            boards_rendered: metrics.board().boards_rendered_total.get(),
            auth_rejections: metrics.board().auth_rejections_total.get(),
            appointments_on_board: metrics.board().appointments_on_board.get(),
            uptime_seconds: metrics.service().uptime_seconds.get(),
        }
    }

    /// Convert health check to JSON string
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| anyhow::anyhow!("Failed to serialize health check: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    fn sample_config(with_token: bool) -> AppConfig {
        let mut config = AppConfig::default();
        config.kiosk.schedule_date = Some("2026-02-06".to_string());
        if with_token {
            config.upstream.access_token = Some("tok".to_string());
        }
        config
    }

    #[tokio::test]
    async fn test_stopped_service_is_unhealthy() {
        let state = Arc::new(AppState::new(sample_config(true)).await.unwrap());

        let status = HealthCheck::liveness_check(state.clone()).await.unwrap();
        assert_eq!(status, HealthStatus::Unhealthy);

        let health = HealthCheck::check(state).await.unwrap();
        assert_eq!(health.status, HealthStatus::Unhealthy);
    }

    #[tokio::test]
    async fn test_missing_credential_reports_degraded_component() {
        let state = Arc::new(AppState::new(sample_config(false)).await.unwrap());

        let health = HealthCheck::check(state).await.unwrap();
        let credential_check = health
            .checks
            .iter()
            .find(|c| c.name == "credentials")
            .unwrap();
        assert_eq!(credential_check.status, HealthStatus::Degraded);
    }

    #[tokio::test]
    async fn test_health_check_serializes() {
        let state = Arc::new(AppState::new(sample_config(true)).await.unwrap());

        let health = HealthCheck::check(state).await.unwrap();
        let json = health.to_json().unwrap();
        assert!(json.contains("clinic-kiosk"));
        assert!(json.contains("upstream_schedule"));
    }
}
