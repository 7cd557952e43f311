//! Week and month selection state.
//!
//! The cursor holds a single reference date; the displayed week is the
//! Monday-through-Sunday span containing it. Navigation shifts the
//! reference by whole weeks, preserving the time of day. The focus state
//! is kept in memory only and never persisted.

use chrono::{Datelike, Duration, Local, NaiveDate, NaiveDateTime};
use std::sync::{Arc, Mutex};

/// Monday of the week containing `date`
pub fn start_of_week(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

/// ISO week numbers touched by a month: starting from the first day,
/// step 7 days while still inside the month, collecting each step's week
/// number, deduplicated and ascending. Partial boundary weeks are
/// included.
pub fn month_to_weeks(year: i32, month: u32) -> Vec<u32> {
    let mut weeks = Vec::new();
    let mut day = match NaiveDate::from_ymd_opt(year, month, 1) {
        Some(d) => d,
        None => return weeks,
    };

    while day.month() == month && day.year() == year {
        let week = day.iso_week().week();
        if !weeks.contains(&week) {
            weeks.push(week);
        }
        day += Duration::days(7);
    }

    weeks.sort_unstable();
    weeks
}

/// The ordinal for a newly added ledger week: one past the highest
/// existing week number, or 1 when the month has none yet.
pub fn next_week_number(existing: &[u32]) -> u32 {
    existing.iter().max().map(|max| max + 1).unwrap_or(1)
}

/// Navigable "current week" selection
#[derive(Clone)]
pub struct WeekCursor {
    current: Arc<Mutex<NaiveDateTime>>,
}

impl WeekCursor {
    /// Create a cursor positioned on the current local date
    pub fn new() -> Self {
        Self::with_reference(Local::now().naive_local())
    }

    pub fn with_reference(reference: NaiveDateTime) -> Self {
        Self {
            current: Arc::new(Mutex::new(reference)),
        }
    }

    pub fn reference(&self) -> NaiveDateTime {
        *self.current.lock().unwrap()
    }

    pub fn set_reference(&self, reference: NaiveDateTime) {
        *self.current.lock().unwrap() = reference;
    }

    /// Monday of the selected week
    pub fn week_start(&self) -> NaiveDate {
        start_of_week(self.reference().date())
    }

    /// Sunday of the selected week
    pub fn week_end(&self) -> NaiveDate {
        self.week_start() + Duration::days(6)
    }

    /// Move forward exactly one week, preserving the time of day
    pub fn advance(&self) -> NaiveDateTime {
        let mut current = self.current.lock().unwrap();
        *current += Duration::days(7);
        *current
    }

    /// Move back exactly one week, preserving the time of day
    pub fn retreat(&self) -> NaiveDateTime {
        let mut current = self.current.lock().unwrap();
        *current -= Duration::days(7);
        *current
    }
}

impl Default for WeekCursor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    fn at(date: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(date, "%Y-%m-%dT%H:%M:%S").unwrap()
    }

    #[test]
    fn test_start_of_week_is_monday() {
        // 2024-03-06 is a Wednesday
        let wednesday = NaiveDate::from_ymd_opt(2024, 3, 6).unwrap();
        assert_eq!(start_of_week(wednesday), NaiveDate::from_ymd_opt(2024, 3, 4).unwrap());
        // A Monday maps to itself
        let monday = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        assert_eq!(start_of_week(monday), monday);
        // A Sunday belongs to the week begun the previous Monday
        let sunday = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        assert_eq!(start_of_week(sunday), monday);
    }

    #[test]
    fn test_week_bounds() {
        let cursor = WeekCursor::with_reference(at("2024-03-06T15:00:00"));
        assert_eq!(cursor.week_start(), NaiveDate::from_ymd_opt(2024, 3, 4).unwrap());
        assert_eq!(cursor.week_end(), NaiveDate::from_ymd_opt(2024, 3, 10).unwrap());
    }

    #[test]
    fn test_advance_and_retreat_preserve_time_of_day() {
        let cursor = WeekCursor::with_reference(at("2024-03-06T15:30:00"));

        let advanced = cursor.advance();
        assert_eq!(advanced.date(), NaiveDate::from_ymd_opt(2024, 3, 13).unwrap());
        assert_eq!(advanced.hour(), 15);
        assert_eq!(advanced.minute(), 30);

        cursor.retreat();
        let back = cursor.retreat();
        assert_eq!(back.date(), NaiveDate::from_ymd_opt(2024, 2, 28).unwrap());
        assert_eq!(back.hour(), 15);
    }

    #[test]
    fn test_advance_crosses_month_boundary() {
        let cursor = WeekCursor::with_reference(at("2024-03-28T09:00:00"));
        let advanced = cursor.advance();
        assert_eq!(advanced.date(), NaiveDate::from_ymd_opt(2024, 4, 4).unwrap());
    }

    #[test]
    fn test_month_to_weeks_march_2024() {
        // March 2024 starts on a Friday inside ISO week 9 and the 7-day
        // steps land in weeks 9 through 13
        assert_eq!(month_to_weeks(2024, 3), vec![9, 10, 11, 12, 13]);
    }

    #[test]
    fn test_month_to_weeks_january() {
        // January 2024 starts on a Monday: weeks 1 through 5
        assert_eq!(month_to_weeks(2024, 1), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_month_to_weeks_invalid_month() {
        assert!(month_to_weeks(2024, 13).is_empty());
    }

    #[test]
    fn test_next_week_number() {
        assert_eq!(next_week_number(&[]), 1);
        assert_eq!(next_week_number(&[1]), 2);
        assert_eq!(next_week_number(&[1, 3]), 4);
    }
}
