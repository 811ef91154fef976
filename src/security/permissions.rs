//! File permission checks for the roster
//!
//! The roster holds every client's private key, so it must not be readable
//! by group or others.

use crate::error::{PanelError, Result};
use std::path::Path;
use tracing::{debug, warn};

/// Mode the roster file is created with
#[cfg(unix)]
pub const ROSTER_FILE_MODE: u32 = 0o600;

/// Check that `path` is not accessible to group or others
#[cfg(unix)]
pub fn validate_private_file(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    debug!("Validating permissions for {:?}", path);

    let metadata = std::fs::metadata(path).map_err(|e| {
        PanelError::Roster(format!("Failed to read metadata for {:?}: {}", path, e))
    })?;

    let file_mode = metadata.permissions().mode() & 0o777;
    if file_mode & 0o077 != 0 {
        warn!(
            "File {:?} has insecure permissions: {:o} (max: {:o})",
            path, file_mode, ROSTER_FILE_MODE
        );
        return Err(PanelError::Roster(format!(
            "File {:?} has insecure permissions: {:o}, expected 0600 (owner read/write only)",
            path, file_mode
        )));
    }

    debug!("Permissions valid for {:?}: {:o}", path, file_mode);
    Ok(())
}

/// Validate file permissions (non-Unix stub)
#[cfg(not(unix))]
pub fn validate_private_file(path: &Path) -> Result<()> {
    debug!("Permission validation not implemented for this platform: {:?}", path);
    Ok(())
}
