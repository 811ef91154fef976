//! Monitoring and observability
//!
//! Human-readable telemetry for the dashboard and Prometheus export for
//! scrapers.

mod format;
mod metrics;

pub use format::{format_bytes, format_last_seen};
pub use metrics::{export_prometheus, MetricType};
