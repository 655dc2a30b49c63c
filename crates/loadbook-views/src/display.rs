//! Cell formatting shared by the table projections

use chrono::{DateTime, Utc};
use loadbook_core::types::format_display;

/// Placeholder for an empty cell
pub const EMPTY_CELL: &str = "-";

/// First eight characters of an identifier followed by `...`
#[must_use]
pub fn short_id(id: &str) -> String {
    let head: String = id.chars().take(8).collect();
    format!("{head}...")
}

/// Number with thousands separators, keeping the shortest decimal form
///
/// `12500.5` becomes `12,500.5`, `1000.0` becomes `1,000`.
#[must_use]
pub fn group_thousands(value: f64) -> String {
    let raw = value.to_string();
    let (sign, unsigned) = raw
        .strip_prefix('-')
        .map_or(("", raw.as_str()), |rest| ("-", rest));
    let (integer, fraction) = unsigned
        .split_once('.')
        .map_or((unsigned, None), |(int, frac)| (int, Some(frac)));

    let digits = integer.len();
    let mut grouped = String::with_capacity(digits + digits / 3);
    for (i, ch) in integer.chars().enumerate() {
        if i > 0 && (digits - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match fraction {
        Some(fraction) => format!("{sign}{grouped}.{fraction}"),
        None => format!("{sign}{grouped}"),
    }
}

/// Dollar amount as shown in the bookings table
#[must_use]
pub fn format_rate(rate: f64) -> String {
    format!("${}", group_thousands(rate))
}

/// `YYYY-MM-DD HH:mm`, or a dash when absent
#[must_use]
pub fn format_optional_time(value: Option<&DateTime<Utc>>) -> String {
    value.map_or_else(|| EMPTY_CELL.to_string(), format_display)
}
