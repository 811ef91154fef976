//! Read models returned by the panel

use crate::monitoring::{format_bytes, format_last_seen};
use crate::roster::Client;
use crate::wireguard::PeerTelemetry;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Transfer counters, formatted and raw
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Bandwidth {
    /// Received, human readable
    pub received: String,
    /// Sent, human readable
    pub sent: String,
    /// Received bytes
    pub received_raw: u64,
    /// Sent bytes
    pub sent_raw: u64,
}

impl From<PeerTelemetry> for Bandwidth {
    fn from(telemetry: PeerTelemetry) -> Self {
        Self {
            received: format_bytes(telemetry.received),
            sent: format_bytes(telemetry.sent),
            received_raw: telemetry.received,
            sent_raw: telemetry.sent,
        }
    }
}

/// A client as shown on the dashboard
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientView {
    /// The stored record
    #[serde(flatten)]
    pub client: Client,
    /// Transfer counters
    pub bandwidth: Bandwidth,
    /// "Just now", "5 min ago", "Never", ...
    pub last_seen: String,
    /// Whether the expiry date has passed
    pub expired: bool,
    /// Raw telemetry behind `bandwidth` and `last_seen`
    #[serde(skip)]
    pub telemetry: PeerTelemetry,
}

impl ClientView {
    /// Combine a record with its telemetry as of `now`
    pub fn new(client: Client, telemetry: PeerTelemetry, now: DateTime<Utc>) -> Self {
        let now_secs = u64::try_from(now.timestamp()).unwrap_or(0);
        Self {
            expired: client.is_expired(now),
            last_seen: format_last_seen(telemetry.last_handshake, now_secs),
            bandwidth: telemetry.into(),
            telemetry,
            client,
        }
    }
}

/// Roster-wide totals
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    /// Number of clients in the roster
    pub total_clients: usize,
    /// Number of enabled clients
    pub active_clients: usize,
    /// Sum received, human readable
    pub total_received: String,
    /// Sum sent, human readable
    pub total_sent: String,
    /// Sum of both directions, human readable
    pub total_transfer: String,
}

impl Stats {
    /// Build totals from raw sums
    pub fn new(total_clients: usize, active_clients: usize, received: u64, sent: u64) -> Self {
        Self {
            total_clients,
            active_clients,
            total_received: format_bytes(received),
            total_sent: format_bytes(sent),
            total_transfer: format_bytes(received.saturating_add(sent)),
        }
    }
}
