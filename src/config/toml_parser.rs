//! TOML configuration file parser
//!
//! Every key in the file is optional; whatever is left out keeps its
//! built-in default. Environment variables are applied afterwards by
//! [`Config::apply_env`](crate::config::Config::apply_env).

use crate::config::{Config, ServerConfig, StorageConfig, WireGuardConfig};
use crate::error::{PanelError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// TOML configuration file structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    /// `[server]` section
    #[serde(default)]
    pub server: TomlServerConfig,

    /// `[wireguard]` section
    #[serde(default)]
    pub wireguard: TomlWireGuardConfig,

    /// `[storage]` section
    #[serde(default)]
    pub storage: TomlStorageConfig,
}

/// TOML HTTP listener configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlServerConfig {
    /// Bind address
    pub bind_address: Option<String>,

    /// Bind port
    pub port: Option<u16>,
}

/// TOML WireGuard configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlWireGuardConfig {
    /// Interface name
    pub interface: Option<String>,

    /// Public host clients connect to
    pub host: Option<String>,

    /// Public UDP port
    pub port: Option<u16>,

    /// Client address template ("10.8.0.x")
    pub default_address: Option<String>,

    /// DNS server for clients
    pub default_dns: Option<String>,

    /// AllowedIPs for clients
    pub allowed_ips: Option<String>,

    /// Keepalive for clients
    pub persistent_keepalive: Option<u16>,
}

/// TOML storage configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlStorageConfig {
    /// Data directory
    pub data_dir: Option<PathBuf>,
}

impl TomlConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| {
            PanelError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        Self::parse(&contents)
    }

    /// Parse configuration from a TOML string
    pub fn parse(toml: &str) -> Result<Self> {
        toml::from_str(toml)
            .map_err(|e| PanelError::Config(format!("Failed to parse TOML: {}", e)))
    }
}

// Convert TOML config to internal Config
impl From<TomlConfig> for Config {
    fn from(toml: TomlConfig) -> Self {
        Config {
            server: toml.server.into(),
            wireguard: toml.wireguard.into(),
            storage: toml.storage.into(),
        }
    }
}

impl From<TomlServerConfig> for ServerConfig {
    fn from(toml: TomlServerConfig) -> Self {
        let defaults = ServerConfig::default();
        ServerConfig {
            bind_address: toml.bind_address.unwrap_or(defaults.bind_address),
            port: toml.port.unwrap_or(defaults.port),
        }
    }
}

impl From<TomlWireGuardConfig> for WireGuardConfig {
    fn from(toml: TomlWireGuardConfig) -> Self {
        let defaults = WireGuardConfig::default();
        WireGuardConfig {
            interface: toml.interface.unwrap_or(defaults.interface),
            host: toml.host.unwrap_or(defaults.host),
            port: toml.port.unwrap_or(defaults.port),
            default_address: toml.default_address.unwrap_or(defaults.default_address),
            default_dns: toml.default_dns.unwrap_or(defaults.default_dns),
            allowed_ips: toml.allowed_ips.unwrap_or(defaults.allowed_ips),
            persistent_keepalive: toml
                .persistent_keepalive
                .unwrap_or(defaults.persistent_keepalive),
        }
    }
}

impl From<TomlStorageConfig> for StorageConfig {
    fn from(toml: TomlStorageConfig) -> Self {
        StorageConfig {
            data_dir: toml.data_dir.unwrap_or_else(|| StorageConfig::default().data_dir),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_toml() {
        let toml = r#"
            [server]
            bind_address = "127.0.0.1"
            port = 8443

            [wireguard]
            interface = "wg1"
            host = "vpn.example.com"
            port = 51000
            default_address = "10.20.0.x"
            default_dns = "9.9.9.9"
            allowed_ips = "10.20.0.0/24"
            persistent_keepalive = 25

            [storage]
            data_dir = "/var/lib/wg-panel"
        "#;

        let config: Config = TomlConfig::parse(toml).expect("Failed to parse TOML").into();
        assert_eq!(config.server.bind_address, "127.0.0.1");
        assert_eq!(config.server.port, 8443);
        assert_eq!(config.wireguard.interface, "wg1");
        assert_eq!(config.wireguard.host, "vpn.example.com");
        assert_eq!(config.wireguard.default_address, "10.20.0.x");
        assert_eq!(config.wireguard.persistent_keepalive, 25);
        assert_eq!(config.storage.data_dir, PathBuf::from("/var/lib/wg-panel"));
    }

    #[test]
    fn test_parse_with_defaults() {
        let toml = r#"
            [wireguard]
            host = "vpn.example.com"
        "#;

        let config: Config = TomlConfig::parse(toml).expect("Failed to parse TOML").into();

        // Check defaults
        assert_eq!(config.wireguard.host, "vpn.example.com");
        assert_eq!(config.wireguard.interface, "wg0");
        assert_eq!(config.wireguard.default_dns, "1.1.1.1");
        assert_eq!(config.server, ServerConfig::default());
        assert_eq!(config.storage, StorageConfig::default());
    }

    #[test]
    fn test_empty_file_is_default() {
        let config: Config = TomlConfig::parse("").unwrap().into();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_unknown_key_rejected() {
        let toml = r#"
            [wireguard]
            mtu = 1420
        "#;
        assert!(TomlConfig::parse(toml).is_err());
    }

    #[test]
    fn test_from_missing_file() {
        let err = TomlConfig::from_file("/nonexistent/wg-panel.toml").unwrap_err();
        assert!(matches!(err, PanelError::Config(_)));
    }
}
