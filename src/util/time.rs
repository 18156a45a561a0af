//! Time and date helpers.

use crate::error::{Result, SyncError};
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};

/// Calendar-date format used in rendered task lines.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a `YYYY-MM-DD` date. Invalid calendar dates yield `None`.
#[must_use]
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).ok()
}

/// Render a date as `YYYY-MM-DD`.
#[must_use]
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Parse a timestamp given on the command line.
///
/// Supports:
/// - RFC3339: `2025-01-15T12:00:00Z`, `2025-01-15T12:00:00+02:00`
/// - Simple date: `2025-01-15` (midnight UTC)
///
/// # Errors
///
/// Returns a validation error naming `field_name` if neither form matches.
pub fn parse_timestamp(s: &str, field_name: &str) -> Result<DateTime<Utc>> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    if let Some(date) = parse_date(s) {
        return Ok(date.and_time(NaiveTime::MIN).and_utc());
    }

    Err(SyncError::validation(
        field_name,
        format!("expected RFC3339 or YYYY-MM-DD, got '{s}'"),
    ))
}

/// Start of an activity window of `days` ending at `now`.
///
/// Saturates at the earliest representable instant instead of overflowing.
#[must_use]
pub fn lookback_start(now: DateTime<Utc>, days: u32) -> DateTime<Utc> {
    Duration::try_days(i64::from(days))
        .and_then(|window| now.checked_sub_signed(window))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parse_date_rejects_impossible_dates() {
        assert_eq!(parse_date("2024-02-29"), NaiveDate::from_ymd_opt(2024, 2, 29));
        assert_eq!(parse_date("2023-02-29"), None);
        assert_eq!(parse_date("yesterday"), None);
    }

    #[test]
    fn format_date_is_zero_padded() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert_eq!(format_date(date), "2024-03-05");
    }

    #[test]
    fn parse_timestamp_accepts_rfc3339_and_dates() {
        let dt = parse_timestamp("2025-01-15T12:00:00+02:00", "now").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2025, 1, 15, 10, 0, 0).unwrap());

        let dt = parse_timestamp("2025-01-15", "now").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2025, 1, 15, 0, 0, 0).unwrap());

        let err = parse_timestamp("soon", "now").unwrap_err();
        assert!(err.to_string().contains("now"));
    }

    #[test]
    fn lookback_subtracts_whole_days() {
        let now = Utc.with_ymd_and_hms(2024, 3, 10, 8, 30, 0).unwrap();
        assert_eq!(
            lookback_start(now, 7),
            Utc.with_ymd_and_hms(2024, 3, 3, 8, 30, 0).unwrap()
        );
    }

    #[test]
    fn lookback_saturates_on_huge_windows() {
        let now = Utc.with_ymd_and_hms(2024, 3, 10, 8, 30, 0).unwrap();
        assert_eq!(lookback_start(now, u32::MAX), DateTime::<Utc>::MIN_UTC);
        assert_eq!(lookback_start(now, 4_000_000_000), DateTime::<Utc>::MIN_UTC);
        assert!(lookback_start(now, 36_500) < now);
    }
}
