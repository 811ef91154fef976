//! Metrics export
//!
//! This module renders roster and peer telemetry in Prometheus text format.

use crate::panel::ClientView;
use std::fmt::Write;

/// Metric type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricType {
    /// Clients in the roster
    ClientsTotal,
    /// Enabled clients
    ClientsEnabled,
    /// Clients past their expiry date
    ClientsExpired,
    /// Bytes received from a peer
    BytesReceived,
    /// Bytes sent to a peer
    BytesSent,
    /// Unix time of a peer's latest handshake
    LastHandshake,
}

impl std::fmt::Display for MetricType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ClientsTotal => write!(f, "wg_panel_clients_total"),
            Self::ClientsEnabled => write!(f, "wg_panel_clients_enabled"),
            Self::ClientsExpired => write!(f, "wg_panel_clients_expired"),
            Self::BytesReceived => write!(f, "wg_panel_peer_received_bytes_total"),
            Self::BytesSent => write!(f, "wg_panel_peer_sent_bytes_total"),
            Self::LastHandshake => write!(f, "wg_panel_peer_last_handshake_seconds"),
        }
    }
}

impl MetricType {
    /// Get metric help text
    pub fn help_text(&self) -> &'static str {
        match self {
            Self::ClientsTotal => "Number of clients in the roster",
            Self::ClientsEnabled => "Number of enabled clients",
            Self::ClientsExpired => "Number of clients past their expiry date",
            Self::BytesReceived => "Bytes received from the peer",
            Self::BytesSent => "Bytes sent to the peer",
            Self::LastHandshake => "Unix time of the latest handshake (0 if none)",
        }
    }

    /// Get metric type (counter, gauge)
    pub fn metric_kind(&self) -> &'static str {
        match self {
            Self::BytesReceived | Self::BytesSent => "counter",
            Self::ClientsTotal
            | Self::ClientsEnabled
            | Self::ClientsExpired
            | Self::LastHandshake => "gauge",
        }
    }

    fn header(&self, out: &mut String) {
        let _ = writeln!(out, "# HELP {} {}", self, self.help_text());
        let _ = writeln!(out, "# TYPE {} {}", self, self.metric_kind());
    }
}

/// Export roster metrics in Prometheus text format
pub fn export_prometheus(views: &[ClientView]) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# HELP wg_panel_info Panel information");
    let _ = writeln!(output, "# TYPE wg_panel_info gauge");
    let _ = writeln!(output, "wg_panel_info{{version=\"{}\"}} 1", crate::VERSION);

    let roster = [
        (MetricType::ClientsTotal, views.len()),
        (
            MetricType::ClientsEnabled,
            views.iter().filter(|v| v.client.enabled).count(),
        ),
        (
            MetricType::ClientsExpired,
            views.iter().filter(|v| v.expired).count(),
        ),
    ];
    for (metric, value) in roster {
        metric.header(&mut output);
        let _ = writeln!(output, "{} {}", metric, value);
    }

    let per_peer: [(MetricType, fn(&ClientView) -> u64); 3] = [
        (MetricType::BytesReceived, |v| v.telemetry.received),
        (MetricType::BytesSent, |v| v.telemetry.sent),
        (MetricType::LastHandshake, |v| v.telemetry.last_handshake),
    ];
    for (metric, value) in per_peer {
        metric.header(&mut output);
        for view in views {
            let _ = writeln!(
                output,
                "{}{{client=\"{}\",address=\"{}\"}} {}",
                metric,
                escape_label(&view.client.name),
                escape_label(&view.client.address),
                value(view)
            );
        }
    }

    output
}

fn escape_label(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}
