//! Simulated clock with minute granularity
//!
//! Wraps a calendar timestamp for the driver, plus the weekday, next-hour and
//! duration helpers the rule engine and event log use.

use chrono::{Datelike, Duration, NaiveDate, Timelike, Weekday};
use serde::{Deserialize, Serialize};

use crate::core::types::Timestamp;

/// Clock tracks simulated time; the driver moves it one minute per apply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimClock {
    now: Timestamp,
}

impl SimClock {
    pub fn new(start: Timestamp) -> Self {
        Self { now: start }
    }

    pub fn now(&self) -> Timestamp {
        self.now
    }

    pub fn set(&mut self, now: Timestamp) {
        self.now = now;
    }

    pub fn date(&self) -> NaiveDate {
        self.now.date()
    }

    /// True when the clock sits exactly on `hour`:00
    pub fn is_on_hour(&self, hour: u32) -> bool {
        self.now.hour() == hour && self.now.minute() == 0 && self.now.second() == 0
    }
}

pub fn is_weekend(at: Timestamp) -> bool {
    matches!(at.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Next instant strictly after `at` whose time of day is `hour`:00
pub fn next_hour_mark(at: Timestamp, hour: u32) -> Timestamp {
    let midnight = at.date().and_hms_opt(0, 0, 0).unwrap_or(at);
    let today = midnight + Duration::hours(i64::from(hour));
    if today > at {
        today
    } else {
        today + Duration::days(1)
    }
}

/// Render a duration as `"{h}h {m}m"`, `"{h}h"` or `"{m}m"`
///
/// Minutes are rounded to the nearest whole minute first.
pub fn format_duration(duration: Duration) -> String {
    let total = (duration.num_seconds() as f64 / 60.0).round().max(0.0) as i64;
    let (hours, minutes) = (total / 60, total % 60);
    match (hours, minutes) {
        (0, m) => format!("{}m", m),
        (h, 0) => format!("{}h", h),
        (h, m) => format!("{}h {}m", h, m),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(day: u32, hour: u32, minute: u32) -> Timestamp {
        NaiveDate::from_ymd_opt(2025, 1, day)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    #[test]
    fn test_clock_on_hour_and_date() {
        let mut clock = SimClock::new(at(1, 23, 59));
        assert!(!clock.is_on_hour(23));
        clock.set(at(2, 0, 0));
        assert_eq!(clock.date(), NaiveDate::from_ymd_opt(2025, 1, 2).unwrap());
        assert!(clock.is_on_hour(0));
    }

    #[test]
    fn test_weekend_detection() {
        // 2025-01-01 is a Wednesday
        assert!(!is_weekend(at(1, 12, 0)));
        assert!(is_weekend(at(4, 12, 0)));
        assert!(is_weekend(at(5, 12, 0)));
        assert!(!is_weekend(at(6, 12, 0)));
    }

    #[test]
    fn test_next_hour_mark() {
        assert_eq!(next_hour_mark(at(1, 23, 0), 7), at(2, 7, 0));
        assert_eq!(next_hour_mark(at(2, 1, 30), 7), at(2, 7, 0));
        assert_eq!(next_hour_mark(at(2, 7, 0), 7), at(3, 7, 0));
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::minutes(65)), "1h 5m");
        assert_eq!(format_duration(Duration::minutes(60)), "1h");
        assert_eq!(format_duration(Duration::minutes(5)), "5m");
        assert_eq!(format_duration(Duration::minutes(0)), "0m");
        assert_eq!(format_duration(Duration::seconds(89)), "1m");
        assert_eq!(format_duration(Duration::seconds(90)), "2m");
    }
}
