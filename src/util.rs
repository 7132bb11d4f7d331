// Utility helpers for parsing and basic statistics.
//
// All of the forgiving cell handling lives here so the loader and the
// aggregates can assume clean `Option<f64>` values.
use num_format::{Locale, ToFormattedString};

/// Outcome of reading one spreadsheet cell as millimetres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cell {
    Empty,
    Value(f64),
    /// Something was there but it is not a usable reading.
    Malformed,
}

impl Cell {
    pub fn value(self) -> Option<f64> {
        match self {
            Cell::Value(v) => Some(v),
            Cell::Empty | Cell::Malformed => None,
        }
    }
}

/// Parse a string-like value into `f64` while being forgiving about
/// formatting issues that are common in sheet exports (commas, spaces, text).
///
/// - Trims whitespace.
/// - Rejects values that contain alphabetic characters (this also rejects
///   `NaN` and `inf`).
/// - Strips thousands separators like `","` before parsing.
/// - Returns `None` for anything that cannot be safely parsed.
pub fn parse_f64_safe(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    if s.chars().any(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    let s = s.replace(",", "");
    s.parse::<f64>().ok()
}

/// Read a rainfall cell. Negative numbers are not valid readings.
pub fn parse_rainfall_cell(s: &str) -> Cell {
    if s.trim().is_empty() {
        return Cell::Empty;
    }
    match parse_f64_safe(Some(s)) {
        Some(v) if v.is_finite() && v >= 0.0 => Cell::Value(v),
        _ => Cell::Malformed,
    }
}

/// Arithmetic mean, `None` for an empty slice.
pub fn mean(v: &[f64]) -> Option<f64> {
    if v.is_empty() {
        return None;
    }
    let sum: f64 = v.iter().copied().sum();
    Some(sum / v.len() as f64)
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Format a floating-point value with:
    // - a fixed number of decimal places, and
    // - locale-aware thousands separators (e.g., `1,234.5`).
    let neg = n.is_sign_negative() && n != 0.0;
    let s = format!("{:.*}", decimals, n.abs());
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    let int_val: i64 = int_part.parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = frac_part {
        res.push('.');
        res.push_str(frac);
    }
    if neg {
        format!("-{}", res)
    } else {
        res
    }
}

/// Millimetres for display: one decimal, `"-"` when missing. Only used at
/// the edge; aggregates keep full precision.
pub fn format_mm(v: Option<f64>) -> String {
    match v {
        Some(v) => format_number(v, 1),
        None => "-".to_string(),
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en)
}
