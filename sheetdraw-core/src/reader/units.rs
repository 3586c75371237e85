//! Unit-suffixed number parsing shared by the style and page-layout passes

use regex::Regex;
use std::sync::OnceLock;

/// Inches per millimeter, as used for device conversion
pub const INCHES_PER_MM: f64 = 0.039370147;

fn length_regex() -> &'static Regex {
    static LENGTH: OnceLock<Regex> = OnceLock::new();
    LENGTH.get_or_init(|| {
        Regex::new(r"^\s*([+-]?(?:[0-9]+(?:\.[0-9]*)?|\.[0-9]+)(?:[eE][+-]?[0-9]+)?)\s*([A-Za-z%]*)\s*$")
            .unwrap()
    })
}

/// Split `"12.5mm"` into `(12.5, "mm")`. `None` when the number part is malformed.
pub fn split_number_unit(token: &str) -> Option<(f64, &str)> {
    let caps = length_regex().captures(token)?;
    let value = caps.get(1)?.as_str().parse::<f64>().ok()?;
    let unit = caps.get(2).map(|m| m.as_str()).unwrap_or("");
    Some((value, unit))
}

/// Millimeters per unit for the length units ODF writes
fn mm_per_unit(unit: &str) -> f64 {
    match unit.to_ascii_lowercase().as_str() {
        "cm" => 10.0,
        "in" | "inch" => 25.4,
        "pt" => 25.4 / 72.0,
        "pc" => 25.4 / 6.0,
        "px" => 25.4 / 96.0,
        // mm, unit-less and unknown units
        _ => 1.0,
    }
}

/// Parse a length token into millimeters.
///
/// `Err` carries the offending token so callers can report it.
pub fn parse_length_mm(token: &str) -> Result<f64, String> {
    match split_number_unit(token) {
        Some((value, unit)) => Ok(value * mm_per_unit(unit)),
        None => Err(token.to_string()),
    }
}

/// Strip the unit suffix and keep the number as written
pub fn parse_stripped(token: &str) -> Result<f64, String> {
    split_number_unit(token)
        .map(|(value, _)| value)
        .ok_or_else(|| token.to_string())
}

/// Parse a positive count attribute (repeats, spans). Anything else is 1.
pub fn parse_count(token: Option<&str>) -> u32 {
    token
        .and_then(|t| t.trim().parse::<i64>().ok())
        .filter(|&n| n >= 1)
        .map(|n| n.min(u32::MAX as i64) as u32)
        .unwrap_or(1)
}

/// Millimeters to device units at the given resolution
pub fn to_device_units(mm: f64, dpi: f64) -> f64 {
    mm * INCHES_PER_MM * dpi
}
