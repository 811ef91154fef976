//! Client records and the roster file
//!
//! The roster is a flat JSON array of [`Client`] records. It is read and
//! rewritten wholesale on every mutation.

mod allocation;
mod store;

pub use allocation::{next_address, MAX_HOST, MIN_HOST};
pub use store::RosterStore;

use crate::error::{PanelError, Result};
use crate::wireguard::KeyMaterial;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Maximum length of a client name
pub const MAX_NAME_LEN: usize = 64;

/// A WireGuard client peer as stored in the roster
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    /// Stable identifier (UUID v4)
    pub id: String,
    /// Display name, also used as the config download file name
    pub name: String,
    /// Client private key (base64)
    pub private_key: String,
    /// Client public key (base64), identifies the peer on the interface
    pub public_key: String,
    /// Preshared key (base64)
    pub preshared_key: String,
    /// Assigned tunnel address (e.g. "10.8.0.2/32")
    pub address: String,
    /// Whether the peer is registered on the interface
    pub enabled: bool,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Optional expiry time
    #[serde(default)]
    pub expiry_date: Option<DateTime<Utc>>,
    /// Free-form operator notes
    #[serde(default)]
    pub notes: String,
    /// Carried over from older rosters, not updated
    #[serde(default)]
    pub total_data_transfer: u64,
}

impl Client {
    /// Build a new, enabled client record
    pub fn new(
        name: String,
        keys: KeyMaterial,
        address: String,
        expiry_date: Option<DateTime<Utc>>,
        notes: String,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            private_key: keys.private_key,
            public_key: keys.public_key,
            preshared_key: keys.preshared_key,
            address,
            enabled: true,
            created_at: now,
            expiry_date,
            notes,
            total_data_transfer: 0,
        }
    }

    /// Whether the client's expiry date lies strictly before `now`
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expiry_date.map_or(false, |expiry| expiry < now)
    }
}

// Key material is never printed
impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("public_key", &self.public_key)
            .field("private_key", &"[REDACTED]")
            .field("preshared_key", &"[REDACTED]")
            .field("address", &self.address)
            .field("enabled", &self.enabled)
            .field("created_at", &self.created_at)
            .field("expiry_date", &self.expiry_date)
            .finish()
    }
}

/// Expiry timestamp `days` from `now`, or none for non-positive values
///
/// A positive count that does not fit a timestamp is rejected rather than
/// turning into "never expires".
pub fn expiry_from_days(days: i64, now: DateTime<Utc>) -> Result<Option<DateTime<Utc>>> {
    if days <= 0 {
        return Ok(None);
    }

    Duration::try_days(days)
        .and_then(|d| now.checked_add_signed(d))
        .map(Some)
        .ok_or_else(|| PanelError::Validation("expiryDays out of range".to_string()))
}

/// Validate and normalise a client name
///
/// The name ends up in a `Content-Disposition` file name, so quotes, path
/// separators and control characters are rejected.
pub fn validate_client_name(name: &str) -> Result<String> {
    let name = name.trim();

    if name.is_empty() {
        return Err(PanelError::Validation("Name is required".to_string()));
    }

    if name.chars().count() > MAX_NAME_LEN {
        return Err(PanelError::Validation(format!(
            "Name too long (max {} characters)",
            MAX_NAME_LEN
        )));
    }

    if name
        .chars()
        .any(|c| c.is_control() || c == '"' || c == '/' || c == '\\')
    {
        return Err(PanelError::Validation(format!(
            "Invalid name '{}': quotes, slashes and control characters are not allowed",
            name.escape_debug()
        )));
    }

    Ok(name.to_string())
}
