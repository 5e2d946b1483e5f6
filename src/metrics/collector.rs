//! Metrics collection using Prometheus

use anyhow::Result;
use prometheus::{
    Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Main metrics collector for the kiosk service
#[derive(Clone)]
pub struct MetricsCollector {
    /// Prometheus registry
    registry: Arc<Registry>,

    /// Service-level metrics
    service_metrics: ServiceMetrics,

    /// Board rendering metrics
    board_metrics: BoardMetrics,

    /// Upstream fetch metrics
    upstream_metrics: UpstreamMetrics,
}

/// Service-level metrics
#[derive(Clone)]
pub struct ServiceMetrics {
    /// Service uptime in seconds
    pub uptime_seconds: IntGauge,

    /// Health check status (0=unhealthy, 1=degraded, 2=healthy)
    pub health_status: IntGauge,
}

/// Board rendering metrics
#[derive(Clone)]
pub struct BoardMetrics {
    /// Total boards successfully rendered
    pub boards_rendered_total: IntCounter,

    /// Total board requests rejected for missing credentials
    pub auth_rejections_total: IntCounter,

    /// Appointments on the most recently rendered board
    pub appointments_on_board: IntGauge,

    /// End-to-end board render duration
    pub render_duration_seconds: Histogram,
}

/// Upstream fetch metrics
#[derive(Clone)]
pub struct UpstreamMetrics {
    /// Total upstream fetches by resource
    pub fetches_total: IntCounterVec,

    /// Total upstream fetch errors by resource
    pub fetch_errors_total: IntCounterVec,
}

impl MetricsCollector {
    /// Create a new metrics collector with default registry
    pub fn new() -> Result<Self> {
        let registry = Arc::new(Registry::new());
        Self::with_registry(registry)
    }

    /// Create a new metrics collector with custom registry
    pub fn with_registry(registry: Arc<Registry>) -> Result<Self> {
        let service_metrics = ServiceMetrics::new(&registry)?;
        let board_metrics = BoardMetrics::new(&registry)?;
        let upstream_metrics = UpstreamMetrics::new(&registry)?;

        Ok(Self {
            registry,
            service_metrics,
            board_metrics,
            upstream_metrics,
        })
    }

    /// Get the Prometheus registry for scraping
    pub fn registry(&self) -> Arc<Registry> {
        self.registry.clone()
    }

    /// Get service metrics
    pub fn service(&self) -> &ServiceMetrics {
        &self.service_metrics
    }

    /// Get board metrics
    pub fn board(&self) -> &BoardMetrics {
        &self.board_metrics
    }

    /// Get upstream metrics
    pub fn upstream(&self) -> &UpstreamMetrics {
        &self.upstream_metrics
    }

    /// Record a successfully rendered board
    pub fn record_board_rendered(&self, appointment_count: usize, duration: Duration) {
        self.board_metrics.boards_rendered_total.inc();
        self.board_metrics
            .appointments_on_board
            .set(appointment_count as i64);
        self.board_metrics
            .render_duration_seconds
            .observe(duration.as_secs_f64());
    }

    /// Record a board request rejected for missing credentials
    pub fn record_auth_rejection(&self) {
        self.board_metrics.auth_rejections_total.inc();
    }

    /// Record one upstream fetch by resource name
    pub fn record_upstream_fetch(&self, resource: &str, success: bool) {
        self.upstream_metrics
            .fetches_total
            .with_label_values(&[resource])
            .inc();
        if !success {
            self.upstream_metrics
                .fetch_errors_total
                .with_label_values(&[resource])
                .inc();
        }
    }

    /// Update overall health status (0=unhealthy, 1=degraded, 2=healthy)
    pub fn update_health_status(&self, status: u8) {
        self.service_metrics.health_status.set(status as i64);
    }

    /// Start a timer for measuring durations
    pub fn start_timer(&self) -> MetricsTimer {
        MetricsTimer {
            start: Instant::now(),
        }
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new().expect("Failed to create default metrics collector")
    }
}

/// Simple timer for measuring operation durations
pub struct MetricsTimer {
    start: Instant,
}

impl MetricsTimer {
    /// Elapsed time since the timer started
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Stop the timer and return the elapsed duration
    pub fn stop(self) -> Duration {
        self.start.elapsed()
    }
}

impl ServiceMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let uptime_seconds =
            IntGauge::new("clinic_kiosk_uptime_seconds", "Service uptime in seconds")?;
        registry.register(Box::new(uptime_seconds.clone()))?;

        let health_status = IntGauge::new(
            "clinic_kiosk_health_status",
            "Health status (0=unhealthy, 1=degraded, 2=healthy)",
        )?;
        registry.register(Box::new(health_status.clone()))?;

        Ok(Self {
            uptime_seconds,
            health_status,
        })
    }
}

impl BoardMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let boards_rendered_total = IntCounter::new(
            "clinic_kiosk_boards_rendered_total",
            "Total appointment boards rendered",
        )?;
        registry.register(Box::new(boards_rendered_total.clone()))?;

        let auth_rejections_total = IntCounter::new(
            "clinic_kiosk_auth_rejections_total",
            "Total board requests rejected for missing credentials",
        )?;
        registry.register(Box::new(auth_rejections_total.clone()))?;

        let appointments_on_board = IntGauge::new(
            "clinic_kiosk_appointments_on_board",
            "Appointments on the most recently rendered board",
        )?;
        registry.register(Box::new(appointments_on_board.clone()))?;

        let render_duration_seconds = Histogram::with_opts(HistogramOpts::new(
            "clinic_kiosk_render_duration_seconds",
            "End-to-end board render duration",
        ))?;
        registry.register(Box::new(render_duration_seconds.clone()))?;

        Ok(Self {
            boards_rendered_total,
            auth_rejections_total,
            appointments_on_board,
            render_duration_seconds,
        })
    }
}

impl UpstreamMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let fetches_total = IntCounterVec::new(
            Opts::new("clinic_kiosk_upstream_fetches_total", "Total upstream fetches"),
            &["resource"],
        )?;
        registry.register(Box::new(fetches_total.clone()))?;

        let fetch_errors_total = IntCounterVec::new(
            Opts::new(
                "clinic_kiosk_upstream_fetch_errors_total",
                "Total upstream fetch errors",
            ),
            &["resource"],
        )?;
        registry.register(Box::new(fetch_errors_total.clone()))?;

        Ok(Self {
            fetches_total,
            fetch_errors_total,
        })
    }
}
