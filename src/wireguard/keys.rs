//! WireGuard key material
//!
//! Keys are produced by the `wg` tool; this module only holds them and
//! checks that what came back looks like a WireGuard key.

use crate::error::{PanelError, Result};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use std::fmt;

/// Length of a raw WireGuard key
pub const KEY_LEN: usize = 32;

/// Keys generated for a new client
#[derive(Clone, PartialEq, Eq)]
pub struct KeyMaterial {
    /// Client private key (base64)
    pub private_key: String,
    /// Client public key (base64)
    pub public_key: String,
    /// Preshared key shared with the server (base64)
    pub preshared_key: String,
}

impl KeyMaterial {
    /// Trim and validate the three keys
    pub fn new(private_key: &str, public_key: &str, preshared_key: &str) -> Result<Self> {
        Ok(Self {
            private_key: parse_key("private key", private_key)?,
            public_key: parse_key("public key", public_key)?,
            preshared_key: parse_key("preshared key", preshared_key)?,
        })
    }
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("private_key", &"[REDACTED]")
            .field("public_key", &self.public_key)
            .field("preshared_key", &"[REDACTED]")
            .finish()
    }
}

/// Trim `raw` and check it is base64 for exactly 32 bytes
///
/// The key itself is left out of error messages.
pub fn parse_key(what: &str, raw: &str) -> Result<String> {
    let key = raw.trim();

    let decoded = BASE64
        .decode(key)
        .map_err(|e| PanelError::InvalidOutput(format!("Invalid base64 {}: {}", what, e)))?;

    if decoded.len() != KEY_LEN {
        return Err(PanelError::InvalidOutput(format!(
            "Invalid {} length: expected {} bytes, got {}",
            what,
            KEY_LEN,
            decoded.len()
        )));
    }

    Ok(key.to_string())
}

/// Whether `key` is a well-formed WireGuard key
pub fn is_valid_key(key: &str) -> bool {
    parse_key("key", key).is_ok()
}
