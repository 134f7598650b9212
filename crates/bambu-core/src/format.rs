//! Deterministic text renderings of merged values.

use chrono::{DateTime, Utc};
use std::fmt::Write;

/// Default `strftime` pattern for rendered timestamps.
pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Render a duration given in whole minutes.
///
/// Days are shown only when non-zero; hours (0-23) and minutes (0-59) are
/// always shown.
pub fn format_duration(total_minutes: u64) -> String {
    let days = total_minutes / (24 * 60);
    let hours = (total_minutes / 60) % 24;
    let minutes = total_minutes % 60;
    if days > 0 {
        format!("{days} day(s) {hours} hour(s) {minutes} minute(s)")
    } else {
        format!("{hours} hour(s) {minutes} minute(s)")
    }
}

pub fn format_temperature(celsius: f64) -> String {
    format!("{celsius:.2}ºC")
}

/// Render `at` with a `strftime` pattern. An invalid pattern falls back to
/// [`DEFAULT_TIMESTAMP_FORMAT`].
pub fn format_timestamp(at: &DateTime<Utc>, pattern: &str) -> String {
    let mut out = String::new();
    if write!(out, "{}", at.format(pattern)).is_err() {
        out.clear();
        let _ = write!(out, "{}", at.format(DEFAULT_TIMESTAMP_FORMAT));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_without_days() {
        assert_eq!(format_duration(90), "1 hour(s) 30 minute(s)");
    }

    #[test]
    fn duration_with_days() {
        assert_eq!(format_duration(1500), "1 day(s) 1 hour(s) 0 minute(s)");
    }

    #[test]
    fn duration_zero_shows_hours_and_minutes() {
        assert_eq!(format_duration(0), "0 hour(s) 0 minute(s)");
    }

    #[test]
    fn duration_exact_days() {
        assert_eq!(
            format_duration(2 * 24 * 60),
            "2 day(s) 0 hour(s) 0 minute(s)"
        );
    }

    #[test]
    fn temperature_two_decimals() {
        assert_eq!(format_temperature(215.0), "215.00ºC");
        assert_eq!(format_temperature(24.456), "24.46ºC");
    }

    #[test]
    fn timestamp_uses_pattern() {
        let at = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        assert_eq!(
            format_timestamp(&at, DEFAULT_TIMESTAMP_FORMAT),
            "2023-11-14 22:13:20"
        );
    }

    #[test]
    fn timestamp_invalid_pattern_falls_back() {
        let at = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        assert_eq!(format_timestamp(&at, "%Q"), "2023-11-14 22:13:20");
    }
}
