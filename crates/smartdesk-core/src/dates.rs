//! Calendar helpers shared by filters, insights and the digest jobs
//!
//! Dates travel as `YYYY-MM-DD` strings because the datastore and the model
//! both hand back loosely formatted values. Everything that compares dates
//! goes through [`parse_date`] so a malformed value is treated as "no date"
//! rather than an error.

use chrono::{Datelike, Months, NaiveDate};

/// Wire format for calendar dates
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a calendar date, tolerating a trailing time component
/// (`2024-05-01T00:00:00Z` is read as `2024-05-01`).
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    let day = value.get(..10).unwrap_or(value);
    NaiveDate::parse_from_str(day, DATE_FORMAT).ok()
}

/// Format a date the way it is stored
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Today in server-local time
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Add calendar months, clamping to the end of shorter months
/// (Jan 31 + 1 month = Feb 28/29).
pub fn add_months(date: NaiveDate, months: u32) -> NaiveDate {
    date.checked_add_months(Months::new(months))
        .unwrap_or(NaiveDate::MAX)
}

/// First and last day of the month containing `date`
pub fn month_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let start = date.with_day(1).unwrap_or(date);
    let end = add_months(start, 1).pred_opt().unwrap_or(start);
    (start, end)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, DATE_FORMAT).unwrap()
    }

    #[test]
    fn test_parse_date_variants() {
        assert_eq!(parse_date("2024-05-01"), Some(d("2024-05-01")));
        assert_eq!(parse_date(" 2024-05-01T10:00:00Z"), Some(d("2024-05-01")));
        assert_eq!(parse_date("05/01/2024"), None);
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("Unknown"), None);
    }

    #[test]
    fn test_add_months_clamps() {
        assert_eq!(add_months(d("2024-01-31"), 1), d("2024-02-29"));
        assert_eq!(add_months(d("2023-01-31"), 1), d("2023-02-28"));
        assert_eq!(add_months(d("2024-03-15"), 8), d("2024-11-15"));
        assert_eq!(add_months(d("2024-03-15"), 0), d("2024-03-15"));
    }

    #[test]
    fn test_month_bounds() {
        assert_eq!(month_bounds(d("2024-02-10")), (d("2024-02-01"), d("2024-02-29")));
        assert_eq!(month_bounds(d("2024-12-31")), (d("2024-12-01"), d("2024-12-31")));
    }
}
