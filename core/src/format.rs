/// Format a byte count with two decimal places: `format_bytes(1536)` is
/// `"1.5 KB"`.
pub fn format_bytes(bytes: u64) -> String {
    format_bytes_with(bytes, 2)
}

/// Format a byte count as a human-readable string, rounding to `decimals`
/// places and trimming trailing zeros.
///
/// Zero is special-cased to `"0 Bytes"`. Units step in powers of 1024 up
/// to petabytes.
pub fn format_bytes_with(bytes: u64, decimals: usize) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    const UNITS: [&str; 6] = ["Bytes", "KB", "MB", "GB", "TB", "PB"];
    let exp = (((bytes as f64).ln() / 1024_f64.ln()).floor() as usize).min(UNITS.len() - 1);
    let value = bytes as f64 / 1024_f64.powi(exp as i32);
    let rounded = format!("{value:.decimals$}");
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{trimmed} {}", UNITS[exp])
}

/// Render a minute count as days, hours and minutes, keeping only the
/// non-zero components: `90` is `"1h 30m"`, `1440` is `"1d"`.
pub fn format_interval(minutes: u64) -> String {
    if minutes == 0 {
        return "0m".to_string();
    }
    let days = minutes / 1440;
    let hours = (minutes % 1440) / 60;
    let mins = minutes % 60;

    let mut parts = Vec::new();
    if days > 0 {
        parts.push(format!("{days}d"));
    }
    if hours > 0 {
        parts.push(format!("{hours}h"));
    }
    if mins > 0 {
        parts.push(format!("{mins}m"));
    }
    parts.join(" ")
}
