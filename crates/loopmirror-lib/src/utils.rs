const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// Formats a byte count in the largest 1024-based unit that keeps the value
/// at or above one, with two decimals.
pub fn format_size(bytes: u64) -> String {
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.2}{}", UNITS[unit])
}
