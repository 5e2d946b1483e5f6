//! Metrics and monitoring for the clinic-kiosk service
//!
//! This module provides Prometheus metrics collection for board rendering,
//! upstream fetches, and service health.

pub mod collector;

pub use collector::{BoardMetrics, MetricsCollector, ServiceMetrics, UpstreamMetrics};
