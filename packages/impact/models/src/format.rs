//! Text rendering helpers shared by the report and description templates.
//!
//! Unknown values always render as a placeholder word, never as `0`.

/// Placeholder for an unknown value.
pub const UNKNOWN: &str = "Unknown";

/// Formats `value` with `places` decimals, or `placeholder` if unknown.
#[must_use]
pub fn decimal_or(value: Option<f64>, places: usize, placeholder: &str) -> String {
    value.map_or_else(|| placeholder.to_string(), |v| format!("{v:.places$}"))
}

/// Formats `value` with `places` decimals, or `"Unknown"`.
#[must_use]
pub fn decimal(value: Option<f64>, places: usize) -> String {
    decimal_or(value, places, UNKNOWN)
}

/// Formats a count with thousands separators, or `"Unknown"`.
#[must_use]
pub fn count(value: Option<f64>) -> String {
    value.map_or_else(|| UNKNOWN.to_string(), thousands)
}

/// Formats a text field, or `"Unknown"` when blank.
#[must_use]
pub fn text(value: Option<&str>) -> &str {
    value.filter(|v| !v.trim().is_empty()).unwrap_or(UNKNOWN)
}

/// Rounds to the nearest whole number and groups digits by thousands.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn thousands(value: f64) -> String {
    let rounded = value.round() as i64;
    let digits = rounded.unsigned_abs().to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if rounded < 0 {
        grouped.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}
