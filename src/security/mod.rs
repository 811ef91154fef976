//! Security checks
//!
//! This module provides:
//! - Privilege detection (the `wg` tool needs CAP_NET_ADMIN)
//! - Permission checks for the roster, which stores private keys

mod permissions;
mod privileges;

#[cfg(unix)]
pub use permissions::ROSTER_FILE_MODE;
pub use permissions::validate_private_file;
pub use privileges::PrivilegeLevel;

use std::path::Path;
use tracing::{info, warn};

/// Log warnings for an environment the panel will not work well in
///
/// Nothing here is fatal: the panel can still serve read-only views when
/// not privileged.
pub fn audit_environment(roster: &Path) {
    let level = PrivilegeLevel::detect();
    if level.can_manage_interfaces() {
        info!("Running as {}", level);
    } else {
        warn!(
            "Running as {}: wg/wg-quick need CAP_NET_ADMIN, peer changes will fail",
            level
        );
    }

    if roster.exists() {
        if let Err(e) = validate_private_file(roster) {
            warn!("{}", e);
        }
    }
}
