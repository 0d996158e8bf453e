//! Calendar-day helpers for leave windows and attendance days.
//!
//! Leave requests and attendance records work at day granularity. Inputs may
//! arrive as plain dates (`2025-03-10`) or full RFC 3339 timestamps, in which
//! case the time of day is discarded.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Longest leave window a student may request, counted inclusively.
pub const MAX_LEAVE_DAYS: i64 = 30;

/// Parses `YYYY-MM-DD`, an RFC 3339 timestamp, or a naive `YYYY-MM-DDTHH:MM:SS`
/// into its calendar day.
pub fn parse_day(input: &str) -> Option<NaiveDate> {
    let input = input.trim();
    if let Ok(day) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return Some(day);
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(input) {
        return Some(ts.date_naive());
    }
    NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M:%S")
        .ok()
        .map(|ts| ts.date())
}

/// Number of calendar days in `[start, end]`, both ends included.
pub fn inclusive_day_count(start: NaiveDate, end: NaiveDate) -> i32 {
    let span = (end - start).num_days() + 1;
    i32::try_from(span).unwrap_or(i32::MAX)
}

/// Whether two inclusive ranges share at least one day. Touching ranges overlap.
pub fn ranges_overlap(
    a_start: NaiveDate,
    a_end: NaiveDate,
    b_start: NaiveDate,
    b_end: NaiveDate,
) -> bool {
    a_start <= b_end && b_start <= a_end
}

/// Why a requested leave window was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaveWindowError {
    EndBeforeStart,
    StartInPast,
    TooLong,
}

impl LeaveWindowError {
    /// The request field the failure is reported against.
    pub fn field(&self) -> &'static str {
        match self {
            Self::EndBeforeStart => "end_date",
            Self::StartInPast => "start_date",
            Self::TooLong => "end_date",
        }
    }

    pub fn message(&self) -> String {
        match self {
            Self::EndBeforeStart => "End date must be on or after start date".to_string(),
            Self::StartInPast => "Start date cannot be in the past".to_string(),
            Self::TooLong => format!("Leave cannot exceed {MAX_LEAVE_DAYS} days"),
        }
    }
}

/// Checks a leave window against `today` and returns its inclusive length.
pub fn validate_leave_window(
    start: NaiveDate,
    end: NaiveDate,
    today: NaiveDate,
) -> Result<i32, LeaveWindowError> {
    if end < start {
        return Err(LeaveWindowError::EndBeforeStart);
    }
    if start < today {
        return Err(LeaveWindowError::StartInPast);
    }
    let days = inclusive_day_count(start, end);
    if i64::from(days) > MAX_LEAVE_DAYS {
        return Err(LeaveWindowError::TooLong);
    }
    Ok(days)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_parse_day_accepts_plain_dates_and_timestamps() {
        assert_eq!(parse_day("2025-04-01"), Some(d("2025-04-01")));
        assert_eq!(parse_day("2025-04-01T15:30:00Z"), Some(d("2025-04-01")));
        assert_eq!(parse_day("2025-04-01T23:59:59+02:00"), Some(d("2025-04-01")));
        assert_eq!(parse_day("2025-04-01T08:00:00"), Some(d("2025-04-01")));
        assert_eq!(parse_day("01/04/2025"), None);
        assert_eq!(parse_day(""), None);
    }

    #[test]
    fn test_single_day_leave_counts_one() {
        assert_eq!(inclusive_day_count(d("2025-03-10"), d("2025-03-10")), 1);
        assert_eq!(inclusive_day_count(d("2025-03-10"), d("2025-03-12")), 3);
    }

    #[test]
    fn test_touching_ranges_overlap() {
        assert!(ranges_overlap(
            d("2025-03-10"),
            d("2025-03-12"),
            d("2025-03-12"),
            d("2025-03-14")
        ));
        assert!(!ranges_overlap(
            d("2025-03-10"),
            d("2025-03-12"),
            d("2025-03-13"),
            d("2025-03-14")
        ));
        assert!(ranges_overlap(
            d("2025-03-01"),
            d("2025-03-31"),
            d("2025-03-10"),
            d("2025-03-11")
        ));
    }

    #[test]
    fn test_leave_window_rules() {
        let today = d("2025-03-01");
        assert_eq!(validate_leave_window(today, today, today), Ok(1));
        assert_eq!(
            validate_leave_window(d("2025-03-05"), d("2025-03-04"), today),
            Err(LeaveWindowError::EndBeforeStart)
        );
        assert_eq!(
            validate_leave_window(d("2025-02-28"), d("2025-03-02"), today),
            Err(LeaveWindowError::StartInPast)
        );
        assert_eq!(
            validate_leave_window(d("2025-03-01"), d("2025-03-30"), today),
            Ok(30)
        );
        assert_eq!(
            validate_leave_window(d("2025-03-01"), d("2025-03-31"), today),
            Err(LeaveWindowError::TooLong)
        );
    }

    #[test]
    fn test_window_error_fields() {
        assert_eq!(LeaveWindowError::StartInPast.field(), "start_date");
        assert_eq!(LeaveWindowError::TooLong.message(), "Leave cannot exceed 30 days");
    }
}
