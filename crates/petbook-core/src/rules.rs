//! Care scheduling date rules.
//!
//! Pure functions used to gate the add-care form and to convert between
//! user-entered `(date, time)` pairs and the RFC 3339 instants the API
//! stores. Dates are handled as `YYYY-MM-DD` strings: the zero-padded
//! form makes lexicographic and chronological comparison coincide.

use chrono::{
    DateTime, Datelike, Local, LocalResult, NaiveDate, NaiveTime, TimeZone, Timelike, Utc, Weekday,
};
use thiserror::Error;

/// Input date format for forms and comparisons.
const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DateRuleError {
    #[error("invalid date: {0:?}")]
    InvalidDate(String),

    #[error("invalid time: {0:?}")]
    InvalidTime(String),

    #[error("local time does not exist: {0}")]
    NonexistentLocalTime(String),
}

/// Today's local calendar date as `YYYY-MM-DD`.
pub fn today_local() -> String {
    Local::now().format(DATE_FORMAT).to_string()
}

/// True iff `date_str` is non-empty and on or before `today`
/// (both `YYYY-MM-DD`, compared lexicographically).
pub fn is_past_or_today(date_str: &str, today: &str) -> bool {
    !date_str.is_empty() && date_str <= today
}

/// True iff `date_str` falls on a Sunday. Empty or unparseable input is
/// not a Sunday.
pub fn is_sunday(date_str: &str) -> bool {
    NaiveDate::parse_from_str(date_str, DATE_FORMAT)
        .map(|d| d.weekday() == Weekday::Sun)
        .unwrap_or(false)
}

/// Combine a `YYYY-MM-DD` date and an `HH:MM` time, interpreted as
/// local wall-clock time, into an absolute UTC instant.
///
/// A repeated local time (DST fall-back) resolves to the earlier
/// instant; a skipped one (spring-forward gap) is an error.
pub fn combine_to_timestamp(date_str: &str, time_str: &str) -> Result<DateTime<Utc>, DateRuleError> {
    let date = NaiveDate::parse_from_str(date_str, DATE_FORMAT)
        .map_err(|_| DateRuleError::InvalidDate(date_str.to_string()))?;
    let time = NaiveTime::parse_from_str(time_str, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(time_str, "%H:%M:%S"))
        .map_err(|_| DateRuleError::InvalidTime(time_str.to_string()))?;

    let naive = date.and_time(time);
    match Local.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Ok(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(earlier, _) => Ok(earlier.with_timezone(&Utc)),
        LocalResult::None => Err(DateRuleError::NonexistentLocalTime(naive.to_string())),
    }
}

/// Render a stored RFC 3339 timestamp for display, in local time.
///
/// Local midnight renders as the date alone: a 00:00 value usually
/// means no time was recorded, and a genuine midnight care is
/// indistinguishable from that. Anything else gets the 12-hour time
/// appended. Unparseable input falls back to its first ten characters.
pub fn format_for_display(timestamp: &str) -> String {
    match DateTime::parse_from_rfc3339(timestamp) {
        Ok(dt) => {
            let local = dt.with_timezone(&Local);
            let date_part = local.format(DATE_FORMAT).to_string();
            if local.hour() == 0 && local.minute() == 0 {
                date_part
            } else {
                format!("{}, hora {}", date_part, local.format("%I:%M %p"))
            }
        }
        Err(_) => timestamp.chars().take(10).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_past_or_today() {
        let today = "2025-06-10";
        assert!(is_past_or_today("2025-06-10", today));
        assert!(is_past_or_today("2025-06-09", today));
        assert!(is_past_or_today("2024-12-31", today));
        assert!(!is_past_or_today("2025-06-11", today));
        assert!(!is_past_or_today("", today));
    }

    #[test]
    fn test_is_sunday() {
        assert!(is_sunday("2025-06-15"));
        assert!(!is_sunday("2025-06-16"));
        assert!(!is_sunday("2025-06-14"));
        assert!(!is_sunday(""));
        assert!(!is_sunday("not-a-date"));
    }

    #[test]
    fn test_combine_then_display_round_trips_local_time() {
        let ts = combine_to_timestamp("2025-01-06", "09:30")
            .expect("Failed to combine date and time");
        assert_eq!(
            format_for_display(&ts.to_rfc3339()),
            "2025-01-06, hora 09:30 AM"
        );
    }

    #[test]
    fn test_combine_accepts_seconds() {
        let with_seconds = combine_to_timestamp("2025-01-06", "09:30:00")
            .expect("Failed to combine with seconds");
        let without = combine_to_timestamp("2025-01-06", "09:30")
            .expect("Failed to combine without seconds");
        assert_eq!(with_seconds, without);
    }

    #[test]
    fn test_midnight_displays_date_only() {
        let ts = combine_to_timestamp("2025-01-06", "00:00")
            .expect("Failed to combine midnight");
        assert_eq!(format_for_display(&ts.to_rfc3339()), "2025-01-06");
    }

    #[test]
    fn test_afternoon_displays_twelve_hour_clock() {
        let ts = combine_to_timestamp("2025-01-06", "17:05")
            .expect("Failed to combine date and time");
        assert_eq!(
            format_for_display(&ts.to_rfc3339()),
            "2025-01-06, hora 05:05 PM"
        );
    }

    #[test]
    fn test_combine_rejects_malformed_input() {
        assert_eq!(
            combine_to_timestamp("", "09:30"),
            Err(DateRuleError::InvalidDate(String::new()))
        );
        assert_eq!(
            combine_to_timestamp("2025-01-06", ""),
            Err(DateRuleError::InvalidTime(String::new()))
        );
        assert!(combine_to_timestamp("junk", "09:30").is_err());
        assert!(combine_to_timestamp("2025-01-06", "junk").is_err());
    }

    #[test]
    fn test_display_falls_back_on_unparseable_input() {
        assert_eq!(format_for_display("2025-01-06"), "2025-01-06");
        assert_eq!(format_for_display(""), "");
    }
}
