//! Configuration validation functions
//!
//! This module provides validation for configuration fields: interface
//! names, ports, the client address template, DNS servers and the
//! AllowedIPs list handed out to clients.

use crate::error::{PanelError, Result};
use std::net::IpAddr;

/// Longest interface name the kernel accepts (IFNAMSIZ - 1)
const MAX_INTERFACE_LEN: usize = 15;

/// Validate an interface name the way wg-quick does: `[a-zA-Z0-9_=+.-]{1,15}`
pub fn validate_interface_name(name: &str) -> Result<()> {
    let allowed = |c: char| c.is_ascii_alphanumeric() || "_=+.-".contains(c);

    if name.is_empty() || name.len() > MAX_INTERFACE_LEN || !name.chars().all(allowed) {
        return Err(PanelError::Config(format!(
            "Invalid interface name '{}' (1-{} characters from [a-zA-Z0-9_=+.-])",
            name.escape_debug(),
            MAX_INTERFACE_LEN
        )));
    }

    Ok(())
}

/// Validate a port number (must not be 0)
pub fn validate_port(port: u16) -> Result<()> {
    if port == 0 {
        return Err(PanelError::Config("Port number cannot be 0".to_string()));
    }
    Ok(())
}

/// Validate the client address template ("a.b.c.x")
pub fn validate_address_template(template: &str) -> Result<()> {
    let base = template.strip_suffix(".x").ok_or_else(|| {
        PanelError::Config(format!(
            "Address template '{}' must end in '.x' (e.g. 10.8.0.x)",
            template
        ))
    })?;

    let octets: Vec<&str> = base.split('.').collect();
    if octets.len() != 3 || octets.iter().any(|o| o.parse::<u8>().is_err()) {
        return Err(PanelError::Config(format!(
            "Address template '{}' must have three numeric octets before '.x'",
            template
        )));
    }

    Ok(())
}

/// Validate the DNS line of client configs: one or more comma-separated IPs
pub fn validate_dns_servers(list: &str) -> Result<()> {
    let mut servers = list.split(',').map(str::trim).peekable();
    if servers.peek().map_or(true, |s| s.is_empty()) {
        return Err(PanelError::Config("DNS server list cannot be empty".to_string()));
    }

    for server in servers {
        server
            .parse::<IpAddr>()
            .map_err(|_| PanelError::Config(format!("Invalid DNS server address: '{}'", server)))?;
    }
    Ok(())
}

/// Validate CIDR notation (IP/prefix)
pub fn validate_cidr(cidr: &str) -> Result<()> {
    let (ip, prefix) = cidr.split_once('/').ok_or_else(|| {
        PanelError::Config(format!(
            "Invalid CIDR notation: {} (expected format: IP/prefix)",
            cidr
        ))
    })?;

    let ip: IpAddr = ip
        .parse()
        .map_err(|_| PanelError::Config(format!("Invalid IP address in CIDR: {}", cidr)))?;

    let prefix: u8 = prefix.parse().map_err(|_| {
        PanelError::Config(format!("Invalid prefix length in CIDR: {}", cidr))
    })?;

    let max_prefix = match ip {
        IpAddr::V4(_) => 32,
        IpAddr::V6(_) => 128,
    };

    if prefix > max_prefix {
        return Err(PanelError::Config(format!(
            "Prefix length {} exceeds maximum {} for IP address {}",
            prefix, max_prefix, ip
        )));
    }

    Ok(())
}

/// Validate a comma-separated AllowedIPs list ("0.0.0.0/0, ::/0")
pub fn validate_allowed_ips(list: &str) -> Result<()> {
    let entries: Vec<&str> = list
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    if entries.is_empty() {
        return Err(PanelError::Config(
            "AllowedIPs list cannot be empty".to_string(),
        ));
    }

    for entry in entries {
        validate_cidr(entry)?;
    }

    Ok(())
}
