//! wg-panel: WireGuard peer administration
//!
//! This library manages the client peers of a single WireGuard interface.
//! Clients live in a JSON roster file; the kernel interface is driven
//! through the external `wg` and `wg-quick` tools.
//!
//! # Architecture
//!
//! The panel runs as an HTTP service next to the WireGuard interface it
//! manages. Every request loads the roster, applies one change, writes the
//! roster back and mirrors the change onto the interface. Telemetry comes
//! from `wg show <iface> dump`.
//!
//! # Modules
//!
//! - `config`: Configuration parsing and management
//! - `roster`: Client records, address allocation and the roster file
//! - `wireguard`: `wg` / `wg-quick` integration and config rendering
//! - `panel`: Peer operations (list, create, update, delete, toggle)
//! - `api`: HTTP API
//! - `security`: Privilege detection and roster permissions
//! - `monitoring`: Human-readable telemetry and Prometheus export
//! - `error`: Error types and handling

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod api;
pub mod config;
pub mod error;
pub mod monitoring;
pub mod panel;
pub mod roster;
pub mod security;
pub mod wireguard;

// Re-export commonly used types
pub use error::{PanelError, Result};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
