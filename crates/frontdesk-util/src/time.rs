//! Wall-clock utilities for frontdesk
//!
//! Everything here works in local wall-clock time: the board shows `HH:MM`
//! return times and the overdue scan compares local instants.
//!
//! # Mock Time for Development
//!
//! In debug builds, the `FRONTDESK_MOCK_TIME` environment variable can be set
//! to override the system time for all time-sensitive operations. Mock time
//! advances at the same rate as real time from the given starting point.
//!
//! Format: `YYYY-MM-DD HH:MM:SS` (e.g., `2025-12-25 14:30:00`)
//!
//! ```bash
//! FRONTDESK_MOCK_TIME="2025-12-25 16:55:00" frontdeskd
//! ```

use chrono::{DateTime, Local, NaiveDateTime, NaiveTime, TimeZone};
use std::sync::OnceLock;
use thiserror::Error;

/// Environment variable name for mock time (debug builds only)
pub const MOCK_TIME_ENV_VAR: &str = "FRONTDESK_MOCK_TIME";

const MOCK_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

static MOCK_TIME_OFFSET: OnceLock<Option<chrono::Duration>> = OnceLock::new();

#[allow(clippy::disallowed_methods)] // wraps Local::now()
fn get_mock_time_offset() -> Option<chrono::Duration> {
    *MOCK_TIME_OFFSET.get_or_init(|| {
        #[cfg(debug_assertions)]
        {
            let raw = std::env::var(MOCK_TIME_ENV_VAR).ok()?;
            let Ok(naive) = NaiveDateTime::parse_from_str(&raw, MOCK_TIME_FORMAT) else {
                tracing::warn!(
                    mock_time = %raw,
                    expected_format = MOCK_TIME_FORMAT,
                    "Invalid mock time format"
                );
                return None;
            };
            let Some(mock_dt) = Local.from_local_datetime(&naive).earliest() else {
                tracing::warn!(mock_time = %raw, "Mock time does not exist in local timezone");
                return None;
            };
            let offset = mock_dt.signed_duration_since(chrono::Local::now());
            tracing::info!(
                mock_time = %raw,
                offset_secs = offset.num_seconds(),
                "Mock time enabled"
            );
            Some(offset)
        }
        #[cfg(not(debug_assertions))]
        {
            None
        }
    })
}

/// Returns whether mock time is currently active.
pub fn is_mock_time_active() -> bool {
    get_mock_time_offset().is_some()
}

/// Current local time, respecting `FRONTDESK_MOCK_TIME` in debug builds.
#[allow(clippy::disallowed_methods)] // the one sanctioned Local::now() call
pub fn now() -> DateTime<Local> {
    let real_now = chrono::Local::now();
    match get_mock_time_offset() {
        Some(offset) => real_now + offset,
        None => real_now,
    }
}

/// Render an instant as the board's `HH:MM` clock value.
pub fn format_clock_time(dt: &DateTime<Local>) -> String {
    dt.format("%H:%M").to_string()
}

fn plural(count: u32, unit: &str) -> String {
    if count == 1 {
        format!("{count} {unit}")
    } else {
        format!("{count} {unit}s")
    }
}

/// Human-readable duration phrase for a whole number of minutes.
///
/// `45` -> `"45 minutes"`, `60` -> `"1 hour"`, `90` -> `"1 hour and 30 minutes"`.
pub fn format_duration(minutes: u32) -> String {
    let hours = minutes / 60;
    let rest = minutes % 60;

    match (hours, rest) {
        (0, m) => plural(m, "minute"),
        (h, 0) => plural(h, "hour"),
        (h, m) => format!("{} and {}", plural(h, "hour"), plural(m, "minute")),
    }
}

/// Sentence shown on a staff overdue alert.
pub fn overdue_message(elapsed_minutes: u32) -> String {
    format!(
        "Has been out of the office for {}.",
        plural(elapsed_minutes, "minute")
    )
}

/// Errors from parsing an `HH:MM` clock value
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClockParseError {
    #[error("expected HH:MM, got '{0}'")]
    Format(String),

    #[error("hour must be 0-23, got {0}")]
    Hour(u32),

    #[error("minute must be 0-59, got {0}")]
    Minute(u32),

    #[error("{0} does not exist on this day in the local timezone")]
    Nonexistent(String),

    #[error("{0} has already passed today")]
    AlreadyPassed(String),
}

fn parse_hh_mm(text: &str) -> Result<NaiveTime, ClockParseError> {
    let trimmed = text.trim();
    let (h, m) = trimmed
        .split_once(':')
        .ok_or_else(|| ClockParseError::Format(trimmed.to_string()))?;

    let hour: u32 = h
        .parse()
        .map_err(|_| ClockParseError::Format(trimmed.to_string()))?;
    let minute: u32 = m
        .parse()
        .map_err(|_| ClockParseError::Format(trimmed.to_string()))?;

    if hour >= 24 {
        return Err(ClockParseError::Hour(hour));
    }
    if minute >= 60 {
        return Err(ClockParseError::Minute(minute));
    }

    NaiveTime::from_hms_opt(hour, minute, 0)
        .ok_or_else(|| ClockParseError::Format(trimmed.to_string()))
}

/// Build the instant for an `HH:MM` clock value on `reference`'s calendar day.
///
/// The result never rolls over to the next day, even when it lies before
/// `reference`.
pub fn parse_clock_time(
    text: &str,
    reference: &DateTime<Local>,
) -> Result<DateTime<Local>, ClockParseError> {
    let time = parse_hh_mm(text)?;
    let naive = reference.date_naive().and_time(time);

    Local
        .from_local_datetime(&naive)
        .earliest()
        .ok_or_else(|| ClockParseError::Nonexistent(text.trim().to_string()))
}

/// Whole minutes from `now` until the `HH:MM` clock value later today.
///
/// Partial minutes round up so the resulting return time is never earlier
/// than the requested clock value.
pub fn minutes_until(text: &str, now: &DateTime<Local>) -> Result<u32, ClockParseError> {
    let target = parse_clock_time(text, now)?;
    let secs = target.signed_duration_since(*now).num_seconds();
    if secs <= 0 {
        return Err(ClockParseError::AlreadyPassed(text.trim().to_string()));
    }
    Ok(((secs + 59) / 60) as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_format_duration_minutes_only() {
        assert_eq!(format_duration(45), "45 minutes");
        assert_eq!(format_duration(1), "1 minute");
        assert_eq!(format_duration(0), "0 minutes");
        assert_eq!(format_duration(59), "59 minutes");
    }

    #[test]
    fn test_format_duration_hours() {
        assert_eq!(format_duration(60), "1 hour");
        assert_eq!(format_duration(90), "1 hour and 30 minutes");
        assert_eq!(format_duration(61), "1 hour and 1 minute");
        assert_eq!(format_duration(120), "2 hours");
        assert_eq!(format_duration(125), "2 hours and 5 minutes");
    }

    #[test]
    fn test_overdue_message() {
        assert_eq!(overdue_message(1), "Has been out of the office for 1 minute.");
        assert_eq!(overdue_message(12), "Has been out of the office for 12 minutes.");
    }

    #[test]
    fn test_format_clock_time() {
        let dt = Local.with_ymd_and_hms(2025, 12, 25, 9, 5, 45).unwrap();
        assert_eq!(format_clock_time(&dt), "09:05");
    }

    #[test]
    fn test_parse_clock_time_same_day() {
        let reference = Local.with_ymd_and_hms(2025, 12, 25, 14, 0, 0).unwrap();
        let parsed = parse_clock_time("16:45", &reference).unwrap();

        assert_eq!(parsed.date_naive(), reference.date_naive());
        assert_eq!(parsed.hour(), 16);
        assert_eq!(parsed.minute(), 45);
        assert_eq!(parsed.second(), 0);
    }

    #[test]
    fn test_parse_clock_time_does_not_roll_over() {
        let reference = Local.with_ymd_and_hms(2025, 12, 25, 23, 50, 0).unwrap();
        let parsed = parse_clock_time("00:10", &reference).unwrap();

        assert_eq!(parsed.day(), 25);
        assert!(parsed < reference);
    }

    #[test]
    fn test_parse_clock_time_rejects_bad_input() {
        let reference = Local.with_ymd_and_hms(2025, 12, 25, 12, 0, 0).unwrap();

        assert_eq!(
            parse_clock_time("24:00", &reference),
            Err(ClockParseError::Hour(24))
        );
        assert_eq!(
            parse_clock_time("12:60", &reference),
            Err(ClockParseError::Minute(60))
        );
        assert!(matches!(
            parse_clock_time("noon", &reference),
            Err(ClockParseError::Format(_))
        ));
        assert!(matches!(
            parse_clock_time("12-30", &reference),
            Err(ClockParseError::Format(_))
        ));
    }

    #[test]
    fn test_minutes_until_rounds_up() {
        let now = Local.with_ymd_and_hms(2025, 12, 25, 14, 0, 30).unwrap();
        assert_eq!(minutes_until("14:30", &now).unwrap(), 30);

        let now = Local.with_ymd_and_hms(2025, 12, 25, 14, 0, 0).unwrap();
        assert_eq!(minutes_until("15:15", &now).unwrap(), 75);
    }

    #[test]
    fn test_minutes_until_rejects_past_time() {
        let now = Local.with_ymd_and_hms(2025, 12, 25, 14, 0, 0).unwrap();
        assert!(matches!(
            minutes_until("13:59", &now),
            Err(ClockParseError::AlreadyPassed(_))
        ));
        assert!(matches!(
            minutes_until("14:00", &now),
            Err(ClockParseError::AlreadyPassed(_))
        ));
    }

    #[test]
    fn test_now_returns_reasonable_time() {
        let t = now();
        assert!(t.year() >= 2020);
        assert!(t.year() <= 2100);
    }

    #[test]
    fn test_mock_time_format_parses() {
        assert!(NaiveDateTime::parse_from_str("2025-12-25 14:30:00", MOCK_TIME_FORMAT).is_ok());
        assert!(NaiveDateTime::parse_from_str("2025-12-25T14:30:00", MOCK_TIME_FORMAT).is_err());
    }
}
