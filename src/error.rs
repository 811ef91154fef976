//! Error types for wg-panel
//!
//! This module defines the error types used throughout the application.
//! We use `thiserror` for ergonomic error definitions and `anyhow` for
//! error propagation in the binary.

use thiserror::Error;

/// Main error type for wg-panel operations
#[derive(Error, Debug)]
pub enum PanelError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Roster file could not be read, parsed or written
    #[error("Roster error: {0}")]
    Roster(String),

    /// An invocation of `wg` or `wg-quick` failed
    #[error("WireGuard command failed: {0}")]
    Command(String),

    /// Output of an external tool was not what we expected
    #[error("Unexpected WireGuard output: {0}")]
    InvalidOutput(String),

    /// No free host address is left in the configured range
    #[error("No free address left in {0}")]
    AddressPoolExhausted(String),

    /// Client not found in the roster
    #[error("Client not found: {0}")]
    NotFound(String),

    /// Operation not allowed in the client's current state
    #[error("{0}")]
    InvalidState(String),

    /// Input validation errors
    #[error("{0}")]
    Validation(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type alias using PanelError
pub type Result<T> = std::result::Result<T, PanelError>;

impl From<serde_json::Error> for PanelError {
    fn from(err: serde_json::Error) -> Self {
        PanelError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for PanelError {
    fn from(err: toml::de::Error) -> Self {
        PanelError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_facing_messages_are_bare() {
        let err = PanelError::InvalidState("Cannot enable expired client".to_string());
        assert_eq!(err.to_string(), "Cannot enable expired client");

        let err = PanelError::Validation("Name is required".to_string());
        assert_eq!(err.to_string(), "Name is required");
    }

    #[test]
    fn test_toml_error_is_config() {
        let err: PanelError = toml::from_str::<toml::Value>("= nope").unwrap_err().into();
        assert!(matches!(err, PanelError::Config(_)));
    }
}
