//! Normalization of the loosely formatted dates found in import queues.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime};

/// Day zero of the spreadsheet serial date system (1900 system with the
/// leap-year quirk folded in).
const SERIAL_EPOCH: (i32, u32, u32) = (1899, 12, 30);
/// 9999-12-31 expressed as a serial number.
const MAX_SERIAL: i64 = 2_958_465;

/// Layouts that lead with the year; only tried when the text starts with a
/// four-digit run, since `%Y` happily reads `6` as the year 6.
const YEAR_FIRST_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

/// Two-digit year layouts come before their four-digit twins.
const DATE_FORMATS: &[&str] = &[
    "%m/%d/%y",
    "%m/%d/%Y",
    "%m-%d-%y",
    "%m-%d-%Y",
    "%m.%d.%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%B %d %Y",
    "%b %d %Y",
    "%d-%b-%Y",
    "%d %B %Y",
    "%d %b %Y",
];

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"];

/// Parses `raw` into a calendar date, or `None` when no known shape fits.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let text = raw.trim();
    if text.is_empty() {
        return None;
    }
    if let Some(date) = parse_serial(text) {
        return Some(date);
    }
    if let Ok(stamp) = DateTime::parse_from_rfc3339(text) {
        return Some(stamp.date_naive());
    }
    for format in DATETIME_FORMATS {
        if let Ok(stamp) = NaiveDateTime::parse_from_str(text, format) {
            return Some(stamp.date());
        }
    }
    let formats = if leads_with_year(text) {
        YEAR_FIRST_FORMATS
    } else {
        DATE_FORMATS
    };
    formats
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
}

fn leads_with_year(text: &str) -> bool {
    text.chars().take_while(char::is_ascii_digit).count() == 4
}

/// Like [`parse_date`], falling back to `today` for blank or unreadable input.
pub fn normalize_date(raw: &str, today: NaiveDate) -> NaiveDate {
    match parse_date(raw) {
        Some(date) => date,
        None => {
            if !raw.trim().is_empty() {
                tracing::warn!(raw, %today, "unrecognised date; using today");
            }
            today
        }
    }
}

fn parse_serial(text: &str) -> Option<NaiveDate> {
    if !text.chars().all(|ch| ch.is_ascii_digit() || ch == '.') {
        return None;
    }
    let whole = text.split('.').next()?;
    if whole.is_empty() || whole.len() > 7 {
        return None;
    }
    let serial: i64 = whole.parse().ok()?;
    if !(1..=MAX_SERIAL).contains(&serial) {
        return None;
    }
    let (year, month, day) = SERIAL_EPOCH;
    let epoch = NaiveDate::from_ymd_opt(year, month, day)?;
    epoch.checked_add_signed(Duration::days(serial))
}
