//! Human-readable telemetry

const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
const STEP: u64 = 1024;

/// Format a byte count with a binary unit, e.g. `1536 -> "1.5 KB"`
///
/// Values are rounded to two decimals and printed without trailing zeros.
pub fn format_bytes(bytes: u64) -> String {
    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut unit = 0;
    let mut threshold = STEP;
    while unit < UNITS.len() - 1 && bytes >= threshold {
        unit += 1;
        threshold = threshold.saturating_mul(STEP);
    }

    let scaled = bytes as f64 / (STEP as f64).powi(unit as i32);
    let rounded = (scaled * 100.0).round() / 100.0;
    format!("{} {}", rounded, UNITS[unit])
}

/// Describe how long ago the latest handshake happened
///
/// Both arguments are unix seconds; a handshake of 0 means none yet.
pub fn format_last_seen(last_handshake: u64, now: u64) -> String {
    if last_handshake == 0 {
        return "Never".to_string();
    }

    let elapsed = now.saturating_sub(last_handshake);
    match elapsed {
        0..=119 => "Just now".to_string(),
        120..=3599 => format!("{} min ago", elapsed / 60),
        3600..=86399 => format!("{} hours ago", elapsed / 3600),
        _ => format!("{} days ago", elapsed / 86400),
    }
}
