//! Scalar cleaners shared by the converters and chart processors.
//!
//! Both cleaners are total: a value that cannot be cleaned yields `None`, never an error. Callers
//! decide whether a miss drops the cell, the row, or degrades to the raw value.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime};

use crate::types::Value;

/// Day zero of spreadsheet date serials.
const SERIAL_EPOCH: (i32, u32, u32) = (1899, 12, 30);

/// Bounds of representable timestamps for date serials (nanosecond-precision calendar range).
const MIN_SERIAL_DATE: (i32, u32, u32) = (1677, 9, 21);
const MAX_SERIAL_DATE: (i32, u32, u32) = (2262, 4, 11);

const CURRENCY_NOISE: [char; 4] = ['$', '€', '£', ','];

/// Date-only layouts, tried in order. Month-first wins over day-first for ambiguous input.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y.%m.%d",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%m-%d-%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%m/%d/%y",
    "%d/%m/%y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%b %d %Y",
    "%B %d %Y",
    "%d %b %Y",
    "%d %B %Y",
    "%d-%b-%Y",
    "%d-%b-%y",
    "%Y%m%d",
];

/// Month-and-year layouts; the text is suffixed with a day of `1` before parsing.
const MONTH_YEAR_FORMATS: &[&str] = &["%b %Y %d", "%B %Y %d"];

/// `%Y` also reads one to three digit years; anything below this came from a two-digit year.
const MIN_FULL_YEAR: i32 = 1000;

/// Date-time layouts, tried after the date-only ones. `%.f` accepts a missing fraction.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%m/%d/%y %H:%M:%S",
    "%m/%d/%y %H:%M",
];

/// Parse a raw amount into a float.
///
/// - numbers pass through unchanged
/// - text is trimmed, stripped of `$`, `€`, `£` and `,`, and `(x)` becomes `-x`
/// - anything else, or text that still does not parse, yields `None`
pub fn clean_amount(raw: &Value) -> Option<f64> {
    match raw {
        Value::Number(n) => Some(*n),
        Value::Text(s) => clean_amount_str(s),
        Value::Null | Value::DateTime(_) => None,
    }
}

fn clean_amount_str(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        log::debug!("empty amount string");
        return None;
    }

    let stripped: String = trimmed.chars().filter(|c| !CURRENCY_NOISE.contains(c)).collect();
    let stripped = stripped.trim();
    let normalized = match stripped.strip_prefix('(').and_then(|s| s.strip_suffix(')')) {
        Some(inner) => format!("-{}", inner.trim()),
        None => stripped.to_owned(),
    };

    match normalized.parse::<f64>() {
        Ok(n) => Some(n),
        Err(_) => {
            log::debug!("could not parse amount string {raw:?}");
            None
        }
    }
}

/// Clean a raw date into an ISO-8601 calendar date (`YYYY-MM-DD`).
///
/// Timestamps are truncated to their date, numbers are read as day serials counted from
/// 1899-12-30, and text goes through [`parse_date`].
pub fn clean_date(raw: &Value) -> Option<String> {
    let date = match raw {
        Value::DateTime(dt) => Some(dt.date()),
        Value::Number(n) => date_from_serial(*n),
        Value::Text(s) => parse_date(s),
        Value::Null => None,
    }?;
    Some(date.format("%Y-%m-%d").to_string())
}

/// Convert a spreadsheet day serial into a calendar date.
///
/// Fractional days are floored (the time-of-day part is discarded). Serials outside the
/// representable timestamp range yield `None`.
pub fn date_from_serial(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() {
        log::debug!("non-finite date serial {serial}");
        return None;
    }
    let days = serial.floor();
    if days.abs() > i32::MAX as f64 {
        return None;
    }

    let epoch = ymd(SERIAL_EPOCH)?;
    let date = epoch.checked_add_signed(Duration::try_days(days as i64)?)?;
    if date < ymd(MIN_SERIAL_DATE)? || date > ymd(MAX_SERIAL_DATE)? {
        log::debug!("date serial {serial} out of range");
        return None;
    }
    Some(date)
}

/// Parse free-form date text into a calendar date.
///
/// Accepts ISO dates and timestamps (with or without offset), RFC 2822, slash/dash/dot separated
/// numeric dates (month-first before day-first), compact `YYYYMMDD`, and English month names.
/// Two-digit years (`01/15/24`, `15-Jan-24`) land in 1969..=2068; month-year text (`Jan 2024`)
/// resolves to the first of the month.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    if let Some(date) = DATE_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(s, f).ok().filter(has_full_year))
    {
        return Some(date);
    }
    let first_of_month = format!("{s} 1");
    if let Some(date) = MONTH_YEAR_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(&first_of_month, f).ok().filter(has_full_year))
    {
        return Some(date);
    }
    if let Some(date) = DATETIME_FORMATS.iter().find_map(|f| {
        NaiveDateTime::parse_from_str(s, f)
            .ok()
            .map(|dt| dt.date())
            .filter(has_full_year)
    }) {
        return Some(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.date_naive());
    }

    log::debug!("could not parse date string {raw:?}");
    None
}

fn has_full_year(date: &NaiveDate) -> bool {
    date.year() >= MIN_FULL_YEAR
}

fn ymd((y, m, d): (i32, u32, u32)) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(y, m, d)
}

#[cfg(test)]
mod tests {
    use super::{clean_amount, clean_date, date_from_serial, parse_date};
    use crate::types::Value;
    use chrono::NaiveDate;

    #[test]
    fn amount_strips_currency_and_separators() {
        assert_eq!(clean_amount(&Value::text("€2,000")), Some(2000.0));
        assert_eq!(clean_amount(&Value::text("  £12.50 ")), Some(12.5));
        assert_eq!(clean_amount(&Value::text("$-7")), Some(-7.0));
    }

    #[test]
    fn amount_rejects_non_scalar_inputs() {
        assert_eq!(clean_amount(&Value::Null), None);
        let dt = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(clean_amount(&Value::DateTime(dt)), None);
        assert_eq!(clean_amount(&Value::text("   ")), None);
    }

    #[test]
    fn serial_floors_fractional_days() {
        assert_eq!(date_from_serial(45000.75), NaiveDate::from_ymd_opt(2023, 3, 15));
        assert_eq!(date_from_serial(-0.5), NaiveDate::from_ymd_opt(1899, 12, 29));
    }

    #[test]
    fn serial_out_of_range_is_none() {
        assert_eq!(date_from_serial(f64::NAN), None);
        assert_eq!(date_from_serial(1.0e9), None);
        assert_eq!(date_from_serial(-200_000.0), None);
    }

    #[test]
    fn parse_date_prefers_month_first_and_falls_back_to_day_first() {
        assert_eq!(parse_date("03/04/2024"), NaiveDate::from_ymd_opt(2024, 3, 4));
        assert_eq!(parse_date("25/12/2023"), NaiveDate::from_ymd_opt(2023, 12, 25));
    }

    #[test]
    fn parse_date_accepts_timestamps_and_month_names() {
        assert_eq!(
            parse_date("2024-01-15T10:30:00"),
            NaiveDate::from_ymd_opt(2024, 1, 15)
        );
        assert_eq!(
            parse_date("2024-01-15T23:30:00+02:00"),
            NaiveDate::from_ymd_opt(2024, 1, 15)
        );
        assert_eq!(parse_date("Jan 15, 2024"), NaiveDate::from_ymd_opt(2024, 1, 15));
        assert_eq!(parse_date("15 March 2024"), NaiveDate::from_ymd_opt(2024, 3, 15));
        assert_eq!(parse_date("20240115"), NaiveDate::from_ymd_opt(2024, 1, 15));
    }

    #[test]
    fn parse_date_reads_two_digit_years() {
        assert_eq!(parse_date("01/15/24"), NaiveDate::from_ymd_opt(2024, 1, 15));
        assert_eq!(parse_date("15/01/24"), NaiveDate::from_ymd_opt(2024, 1, 15));
        assert_eq!(parse_date("03/04/24"), NaiveDate::from_ymd_opt(2024, 3, 4));
        assert_eq!(parse_date("15-Jan-24"), NaiveDate::from_ymd_opt(2024, 1, 15));
        assert_eq!(parse_date("12/31/99"), NaiveDate::from_ymd_opt(1999, 12, 31));
    }

    #[test]
    fn parse_date_reads_month_and_year_as_the_first() {
        assert_eq!(parse_date("Jan 2024"), NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(parse_date("January 2024"), NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(parse_date("Jan 24"), None);
    }

    #[test]
    fn clean_date_truncates_timestamps() {
        let dt = NaiveDate::from_ymd_opt(2024, 2, 29)
            .unwrap()
            .and_hms_opt(18, 5, 0)
            .unwrap();
        assert_eq!(clean_date(&Value::DateTime(dt)).as_deref(), Some("2024-02-29"));
        assert_eq!(clean_date(&Value::Null), None);
    }
}
