//! Date decoding for sheet cells.
//!
//! Dates arrive either as spreadsheet serials (1900 date system) or as
//! text. All conversions are done in UTC so the result never depends on
//! the host time zone.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};

/// Serial of 1970-01-01 in the 1900 date system.
pub const SERIAL_UNIX_EPOCH: f64 = 25569.0;

const MS_PER_DAY: f64 = 86_400_000.0;

/// Largest timestamp magnitude chrono can represent, in ms (~262,000 years).
const MAX_ABS_MS: f64 = 8.2e15;

/// Formats tried, in order, for free-form date text.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%B %d, %Y", "%b %d, %Y", "%d %B %Y", "%d %b %Y"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

/// Convert a spreadsheet serial to its UTC calendar date.
///
/// The fractional (time-of-day) part is discarded after rounding to the
/// nearest millisecond.
pub fn from_serial(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() {
        return None;
    }
    let ms = ((serial - SERIAL_UNIX_EPOCH) * MS_PER_DAY).round();
    if ms.abs() > MAX_ABS_MS {
        return None;
    }
    DateTime::<Utc>::from_timestamp_millis(ms as i64).map(|dt| dt.date_naive())
}

/// Parse `DD/MM/YYYY`. Anything other than three integer components
/// forming a real calendar date is rejected.
pub fn parse_dmy(text: &str) -> Option<NaiveDate> {
    let parts: Vec<&str> = text.split('/').map(str::trim).collect();
    let [day, month, year] = parts.as_slice() else {
        return None;
    };
    let day: u32 = day.parse().ok()?;
    let month: u32 = month.parse().ok()?;
    let year: i32 = year.parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Best-effort parsing of free-form date text.
pub fn parse_generic(text: &str) -> Option<NaiveDate> {
    let text = text.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc).date_naive());
    }

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
                .map(|dt| dt.date())
        })
}

/// Decode date text: `DD/MM/YYYY` when it contains a slash, generic
/// parsing otherwise.
pub fn parse_text(text: &str) -> Option<NaiveDate> {
    if text.contains('/') {
        parse_dmy(text)
    } else {
        parse_generic(text)
    }
}

/// `DD/MM/YYYY`
pub fn format_dmy(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// ISO-8601 week identifier, e.g. `2024-W07`. Uses the ISO week-year,
/// so 2024-12-30 is `2025-W01`.
pub fn iso_week_id(date: NaiveDate) -> String {
    let week = date.iso_week();
    format!("{}-W{:02}", week.year(), week.week())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
