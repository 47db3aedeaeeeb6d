//! Byte quantities as printed by yt-dlp.
//!
//! yt-dlp reports sizes and rates as a magnitude followed by a unit token,
//! e.g. `12.3MiB` or `2.00MiB/s`. Binary units (`KiB`, `MiB`, ...) are powers
//! of 1024, decimal units (`KB`, `MB`, ...) are powers of 1000.
//!
//! Unknown unit tokens resolve to a multiplier of 1. The tool's output format
//! is not a versioned contract, so an odd unit must never abort parsing.

use regex::Regex;
use std::sync::OnceLock;

const KIB: u64 = 1024;
const KB: u64 = 1000;

/// Returns the byte multiplier for a unit token.
///
/// # Examples
///
/// ```
/// use mediafetch::units::unit_multiplier;
///
/// assert_eq!(unit_multiplier("MiB"), 1024 * 1024);
/// assert_eq!(unit_multiplier("MB"), 1000 * 1000);
/// assert_eq!(unit_multiplier("bogus"), 1);
/// ```
pub fn unit_multiplier(unit: &str) -> u64 {
    match unit {
        "B" => 1,
        "KiB" => KIB,
        "MiB" => KIB.pow(2),
        "GiB" => KIB.pow(3),
        "TiB" => KIB.pow(4),
        "PiB" => KIB.pow(5),
        "KB" | "kB" => KB,
        "MB" => KB.pow(2),
        "GB" => KB.pow(3),
        "TB" => KB.pow(4),
        "PB" => KB.pow(5),
        _ => 1,
    }
}

/// Converts a magnitude and unit into a byte count, rounded to the nearest byte.
pub fn to_bytes(magnitude: f64, unit: &str) -> u64 {
    if !magnitude.is_finite() || magnitude <= 0.0 {
        return 0;
    }
    (magnitude * unit_multiplier(unit) as f64).round() as u64
}

fn quantity_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        // magnitude, optional whitespace, unit, optional "/s" rate suffix
        Regex::new(r"^\s*~?\s*(\d+(?:\.\d+)?)\s*([A-Za-z]+)(?:/s)?\s*$").unwrap()
    })
}

/// Parses a size or rate token such as `12.3MiB` or `2.00MiB/s`.
///
/// Returns `None` if the token has no numeric magnitude.
pub fn parse_quantity(token: &str) -> Option<u64> {
    let captures = quantity_pattern().captures(token)?;
    let magnitude: f64 = captures.get(1)?.as_str().parse().ok()?;
    Some(to_bytes(magnitude, captures.get(2)?.as_str()))
}

/// Formats a byte count for display (`1.5 MB`, `2.34 GB`).
///
/// Uses 1024-based steps. Values of 1000 MB and above are shown in GB so the
/// label never reads "1003.2 MB".
pub fn format_bytes(bytes: u64) -> String {
    const SIZES: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut index = 0;
    while index < SIZES.len() - 1 && bytes >= KIB.pow(index as u32 + 1) {
        index += 1;
    }

    if index == 2 && bytes >= 1000 * KIB.pow(2) {
        index = 3;
    }

    let scaled = bytes as f64 / KIB.pow(index as u32) as f64;
    let rounded = (scaled * 100.0).round() / 100.0;
    format!("{} {}", rounded, SIZES[index])
}
