//! Configuration management
//!
//! Configuration is layered: built-in defaults, then an optional TOML file,
//! then environment variables. The environment variable names are the ones
//! operators already use for containerised WireGuard panels (`WG_HOST`,
//! `WG_DEFAULT_ADDRESS`, ...).

mod toml_parser;
mod validation;

pub use toml_parser::TomlConfig;
pub use validation::{
    validate_address_template, validate_allowed_ips, validate_cidr, validate_interface_name,
    validate_dns_servers, validate_port,
};

use crate::error::{PanelError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

/// Name of the roster file inside the data directory
pub const CLIENTS_FILE_NAME: &str = "clients.json";

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    /// HTTP listener settings
    pub server: ServerConfig,
    /// WireGuard interface and client template settings
    pub wireguard: WireGuardConfig,
    /// Where the roster lives
    pub storage: StorageConfig,
}

/// HTTP listener settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address for the HTTP server
    pub bind_address: String,
    /// Bind port for the HTTP server
    pub port: u16,
}

/// WireGuard settings used for peer registration and client configs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireGuardConfig {
    /// Server interface name (e.g., "wg0")
    pub interface: String,
    /// Public host name or address clients connect to
    pub host: String,
    /// Public UDP port clients connect to
    pub port: u16,
    /// Client address template, last octet replaced by `x` (e.g., "10.8.0.x")
    pub default_address: String,
    /// DNS server written into client configs
    pub default_dns: String,
    /// AllowedIPs written into client configs
    pub allowed_ips: String,
    /// PersistentKeepalive written into client configs (0 disables)
    pub persistent_keepalive: u16,
}

/// Roster storage settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding `clients.json`
    pub data_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 51821,
        }
    }
}

impl Default for WireGuardConfig {
    fn default() -> Self {
        Self {
            interface: "wg0".to_string(),
            host: String::new(),
            port: 51820,
            default_address: "10.8.0.x".to_string(),
            default_dns: "1.1.1.1".to_string(),
            allowed_ips: "0.0.0.0/0, ::/0".to_string(),
            persistent_keepalive: 0,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
        }
    }
}

impl Config {
    /// Load configuration: defaults, optional TOML file, then environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file, filling gaps with defaults
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let toml_config = TomlConfig::from_file(path)?;
        Ok(toml_config.into())
    }

    /// Overlay values from the environment
    ///
    /// `lookup` returns the value of a variable, if set. Numeric values that
    /// do not parse are reported instead of being ignored.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("BIND_ADDRESS") {
            self.server.bind_address = v;
        }
        if let Some(v) = lookup("PORT") {
            self.server.port = parse_env("PORT", &v)?;
        }
        if let Some(v) = lookup("WG_INTERFACE") {
            self.wireguard.interface = v;
        }
        if let Some(v) = lookup("WG_HOST") {
            self.wireguard.host = v;
        }
        if let Some(v) = lookup("WG_PORT") {
            self.wireguard.port = parse_env("WG_PORT", &v)?;
        }
        if let Some(v) = lookup("WG_DEFAULT_ADDRESS") {
            self.wireguard.default_address = v;
        }
        if let Some(v) = lookup("WG_DEFAULT_DNS") {
            self.wireguard.default_dns = v;
        }
        if let Some(v) = lookup("WG_ALLOWED_IPS") {
            self.wireguard.allowed_ips = v;
        }
        if let Some(v) = lookup("WG_PERSISTENT_KEEPALIVE") {
            self.wireguard.persistent_keepalive = parse_env("WG_PERSISTENT_KEEPALIVE", &v)?;
        }
        if let Some(v) = lookup("DATA_DIR") {
            self.storage.data_dir = PathBuf::from(v);
        }
        Ok(())
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        validation::validate_interface_name(&self.wireguard.interface)?;
        validation::validate_port(self.server.port)?;
        validation::validate_port(self.wireguard.port)?;
        validation::validate_address_template(&self.wireguard.default_address)?;
        validation::validate_dns_servers(&self.wireguard.default_dns)?;
        validation::validate_allowed_ips(&self.wireguard.allowed_ips)?;

        if self.storage.data_dir.as_os_str().is_empty() {
            return Err(PanelError::Config(
                "Data directory cannot be empty".to_string(),
            ));
        }

        debug!("Configuration validated");
        Ok(())
    }

    /// Path of the roster file
    pub fn clients_file(&self) -> PathBuf {
        self.storage.data_dir.join(CLIENTS_FILE_NAME)
    }

    /// Address the HTTP server binds to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.bind_address, self.server.port)
    }

    /// Endpoint written into client configs
    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.wireguard.host, self.wireguard.port)
    }
}

fn parse_env<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| {
        PanelError::Config(format!("Invalid value for {}: '{}'", key, value))
    })
}
