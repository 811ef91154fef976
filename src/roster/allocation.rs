//! Tunnel address allocation
//!
//! Addresses come from a template such as `10.8.0.x`: the first three
//! octets are fixed and the lowest unused host number from 2 upwards is
//! taken (`.1` is the server).

use super::Client;
use crate::error::{PanelError, Result};
use std::collections::HashSet;

/// First host number handed to a client
pub const MIN_HOST: u16 = 2;

/// Last usable host number
pub const MAX_HOST: u16 = 254;

/// Next free client address for `template`, as `a.b.c.n/32`
pub fn next_address(template: &str, clients: &[Client]) -> Result<String> {
    let base = template.strip_suffix(".x").unwrap_or(template);

    let used: HashSet<u16> = clients
        .iter()
        .filter_map(|c| host_number(&c.address))
        .collect();

    (MIN_HOST..=MAX_HOST)
        .find(|n| !used.contains(n))
        .map(|n| format!("{}.{}/32", base, n))
        .ok_or_else(|| PanelError::AddressPoolExhausted(template.to_string()))
}

/// Last octet of an `a.b.c.n/prefix` address
fn host_number(address: &str) -> Option<u16> {
    let (ip, prefix) = address.rsplit_once('/')?;
    if prefix.is_empty() || !prefix.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let (_, last) = ip.rsplit_once('.')?;
    if last.is_empty() || !last.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    last.parse().ok()
}
