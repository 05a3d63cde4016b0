//! Human-readable byte counts for progress and option labels.

const UNITS: [&str; 9] = ["Bytes", "KB", "MB", "GB", "TB", "PB", "EB", "ZB", "YB"];
const BASE: f64 = 1024.0;

/// Formats `bytes` with 1024-based units and at most two decimals.
///
/// - `format_bytes(0)` → `"0 Bytes"`
/// - `format_bytes(1536)` → `"1.5 KB"`
/// - `format_bytes(1048576)` → `"1 MB"`
pub fn format_bytes(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    // Integer log so exact powers of 1024 never land one unit low.
    let mut exp = 0usize;
    let mut rest = bytes;
    while rest >= 1024 && exp < UNITS.len() - 1 {
        rest /= 1024;
        exp += 1;
    }
    let scaled = bytes as f64 / BASE.powi(exp as i32);
    format!("{} {}", trim_decimals(scaled), UNITS[exp])
}

/// Round to two decimals and drop trailing zeros ("1.50" → "1.5", "1.00" → "1").
fn trim_decimals(v: f64) -> String {
    let s = format!("{:.2}", v);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    s.to_string()
}

/// Percent of `received` over `total`, or None when total is unknown or zero.
pub fn percent(received: u64, total: Option<u64>) -> Option<f64> {
    match total {
        Some(t) if t > 0 => Some(received as f64 / t as f64 * 100.0),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_literal() {
        assert_eq!(format_bytes(0), "0 Bytes");
    }

    #[test]
    fn whole_units() {
        assert_eq!(format_bytes(1), "1 Bytes");
        assert_eq!(format_bytes(1023), "1023 Bytes");
        assert_eq!(format_bytes(1024), "1 KB");
        assert_eq!(format_bytes(1_048_576), "1 MB");
        assert_eq!(format_bytes(1 << 30), "1 GB");
    }

    #[test]
    fn fractional_values() {
        assert_eq!(format_bytes(1536), "1.5 KB");
        assert_eq!(format_bytes(1_572_864), "1.5 MB");
        assert_eq!(format_bytes(1100), "1.07 KB");
    }

    #[test]
    fn largest_representable_stays_in_range() {
        assert!(format_bytes(u64::MAX).ends_with(" EB"));
    }

    #[test]
    fn percent_requires_positive_total() {
        assert_eq!(percent(50, Some(200)), Some(25.0));
        assert_eq!(percent(50, None), None);
        assert_eq!(percent(0, Some(0)), None);
    }
}
