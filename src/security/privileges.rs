//! Process privilege detection
//!
//! `wg set` and `wg-quick save` need CAP_NET_ADMIN. Root has it; on Linux a
//! service unit can also grant it to an unprivileged user.

use std::fmt;

/// Bit of CAP_NET_ADMIN in the capability sets
const CAP_NET_ADMIN: u32 = 12;

/// What the current process may do to network interfaces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrivilegeLevel {
    /// Effective uid 0
    Root,
    /// Unprivileged, but holding CAP_NET_ADMIN
    NetAdmin,
    /// No way to configure interfaces
    User,
    /// Platform without uid semantics
    Unknown,
}

impl PrivilegeLevel {
    /// Detect the privilege level of this process
    pub fn detect() -> Self {
        #[cfg(unix)]
        {
            // SAFETY: geteuid has no preconditions and cannot fail
            if unsafe { libc::geteuid() } == 0 {
                return Self::Root;
            }

            let status = std::fs::read_to_string("/proc/self/status").unwrap_or_default();
            if effective_caps(&status).is_some_and(|caps| caps & (1 << CAP_NET_ADMIN) != 0) {
                return Self::NetAdmin;
            }
            Self::User
        }

        #[cfg(not(unix))]
        {
            Self::Unknown
        }
    }

    /// Whether `wg set` can be expected to succeed
    pub fn can_manage_interfaces(&self) -> bool {
        matches!(self, Self::Root | Self::NetAdmin)
    }
}

impl fmt::Display for PrivilegeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Root => "root",
            Self::NetAdmin => "user with CAP_NET_ADMIN",
            Self::User => "unprivileged user",
            Self::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// `CapEff` mask from the contents of `/proc/<pid>/status`
fn effective_caps(status: &str) -> Option<u64> {
    status
        .lines()
        .find_map(|line| line.strip_prefix("CapEff:"))
        .and_then(|hex| u64::from_str_radix(hex.trim(), 16).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_caps() {
        let status = "Name:\twg-panel\nCapInh:\t0000000000000000\nCapEff:\t0000000000001000\n";
        assert_eq!(effective_caps(status), Some(0x1000));
        assert_eq!(effective_caps("Name:\tsh\n"), None);
    }

    #[test]
    fn test_net_admin_bit() {
        let caps = effective_caps("CapEff:\t000001ffffffffff").unwrap();
        assert_ne!(caps & (1 << CAP_NET_ADMIN), 0);

        let caps = effective_caps("CapEff:\t0000000000000000").unwrap();
        assert_eq!(caps & (1 << CAP_NET_ADMIN), 0);
    }

    #[test]
    fn test_can_manage_interfaces() {
        assert!(PrivilegeLevel::Root.can_manage_interfaces());
        assert!(PrivilegeLevel::NetAdmin.can_manage_interfaces());
        assert!(!PrivilegeLevel::User.can_manage_interfaces());
        assert!(!PrivilegeLevel::Unknown.can_manage_interfaces());
    }

    #[test]
    fn test_detect_is_consistent() {
        let level = PrivilegeLevel::detect();
        assert_eq!(level, PrivilegeLevel::detect());
        assert!(!level.to_string().is_empty());
    }
}
