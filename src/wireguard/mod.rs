//! WireGuard integration
//!
//! Key generation, peer registration and telemetry are delegated to the
//! external `wg` / `wg-quick` tools. [`WireGuardTool`] is the seam between
//! the panel and those tools; [`WgCommand`] is the real implementation.

mod client_config;
mod command;
mod dump;
mod keys;

pub use client_config::render_client_config;
pub use command::WgCommand;
pub use dump::{parse_dump, parse_public_key, PeerTelemetry, TelemetryMap};
pub use keys::{is_valid_key, parse_key, KeyMaterial, KEY_LEN};

use crate::error::Result;
use crate::roster::Client;
use async_trait::async_trait;
use tracing::warn;

/// Operations the panel needs from the WireGuard tooling
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WireGuardTool: Send + Sync {
    /// Generate a private key, its public key and a preshared key
    async fn generate_keys(&self) -> Result<KeyMaterial>;

    /// Public key of the server interface, empty if unknown
    async fn server_public_key(&self) -> Result<String>;

    /// Raw `wg show <iface> dump` output
    async fn dump(&self) -> Result<String>;

    /// Register a client as a peer and persist the peer table
    async fn add_peer(&self, client: &Client) -> Result<()>;

    /// Remove a peer and persist the peer table
    async fn remove_peer(&self, public_key: &str) -> Result<()>;
}

/// Current telemetry for all peers
///
/// A failing dump is logged and reads as "no telemetry", so every peer
/// reports zero counters.
pub async fn collect_telemetry(tool: &dyn WireGuardTool) -> TelemetryMap {
    match tool.dump().await {
        Ok(output) => parse_dump(&output),
        Err(e) => {
            warn!("Failed to read peer telemetry: {}", e);
            TelemetryMap::new()
        }
    }
}
