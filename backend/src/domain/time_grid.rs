//! Weekly time-grid placement.
//!
//! Maps a session start (date, hour, minute) to a half-hour-resolution
//! grid cell and to the pixel/percent rectangle the UI renders, and maps
//! a grid cell back to a concrete datetime. All functions are pure; the
//! grid itself holds no state.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Timelike};
use shared::{GridCell, GridRect};

use crate::domain::models::session::ClassSession;

/// First hour shown on the grid
pub const HOURS_START: u32 = 8;
/// First hour past the end of the grid
pub const HOURS_END: u32 = 20;
/// Pixel height of one half-hour cell
pub const CELL_HEIGHT: f64 = 30.0;
/// Days per displayed week, Monday through Sunday
pub const DAYS_PER_WEEK: u32 = 7;

const DAY_WIDTH_PCT: f64 = 100.0 / DAYS_PER_WEEK as f64;
const DAY_GUTTER_PCT: f64 = 0.5;

/// Grid cell for a start time.
///
/// The row counts half-hour steps from [`HOURS_START`]; the column is the
/// Monday-based weekday of `date`. A start outside the displayed hour
/// range produces an out-of-range row rather than an error.
pub fn cell_for(date: NaiveDate, hour: u32, minute: u32) -> GridCell {
    GridCell {
        row: (hour as i32 - HOURS_START as i32) * 2 + (minute / 30) as i32,
        col: date.weekday().num_days_from_monday() as i32,
    }
}

/// Rectangle for rendering a session in the given day column.
///
/// No clamping: a session outside `[HOURS_START, HOURS_END)` still gets
/// geometry and simply renders off-grid.
pub fn geometry_for(session: &ClassSession, day_index: u32) -> GridRect {
    let cell = cell_for(
        session.date.date(),
        session.date.hour(),
        session.date.minute(),
    );
    GridRect {
        top: cell.row as f64 * CELL_HEIGHT,
        height: session.duration_hours * 2.0 * CELL_HEIGHT,
        left_pct: day_index as f64 * DAY_WIDTH_PCT,
        width_pct: DAY_WIDTH_PCT - DAY_GUTTER_PCT,
    }
}

/// Inverse mapping: the concrete datetime a grid cell stands for.
///
/// Adds `day_index` days to the week's Monday and sets the time
/// component; seconds are always zeroed.
pub fn cell_to_datetime(
    week_start: NaiveDate,
    day_index: u32,
    hour: u32,
    minute: u32,
) -> NaiveDateTime {
    (week_start + Duration::days(day_index as i64))
        .and_hms_opt(hour, minute, 0)
        .unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::session::SessionKind;

    fn session_at(date: &str, duration_hours: f64) -> ClassSession {
        ClassSession {
            id: ClassSession::generate_id(),
            participants: vec!["student::1".to_string()],
            date: NaiveDateTime::parse_from_str(date, "%Y-%m-%dT%H:%M:%S").unwrap(),
            duration_hours,
            kind: SessionKind::Individual,
            rate: None,
            notes: None,
            owner_id: "user-1".to_string(),
        }
    }

    #[test]
    fn test_cell_for_first_slot() {
        // Monday 2024-03-04 at 08:00 is the grid origin
        let cell = cell_for(NaiveDate::from_ymd_opt(2024, 3, 4).unwrap(), 8, 0);
        assert_eq!(cell, GridCell { row: 0, col: 0 });
    }

    #[test]
    fn test_cell_for_half_hour_resolution() {
        let day = NaiveDate::from_ymd_opt(2024, 3, 6).unwrap(); // Wednesday
        assert_eq!(cell_for(day, 10, 0), GridCell { row: 4, col: 2 });
        assert_eq!(cell_for(day, 10, 30), GridCell { row: 5, col: 2 });
        // Minutes below 30 round down to the hour row
        assert_eq!(cell_for(day, 10, 29), GridCell { row: 4, col: 2 });
    }

    #[test]
    fn test_cell_for_sunday_is_last_column() {
        let cell = cell_for(NaiveDate::from_ymd_opt(2024, 3, 10).unwrap(), 8, 0);
        assert_eq!(cell.col, 6);
    }

    #[test]
    fn test_cell_for_out_of_range_hour_is_not_clamped() {
        let day = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        assert_eq!(cell_for(day, 7, 0).row, -2);
        assert_eq!(cell_for(day, 21, 30).row, 27);
    }

    #[test]
    fn test_geometry_height_is_duration_times_two_cells() {
        for duration in [0.5, 1.0, 1.5, 2.0, 3.5] {
            let session = session_at("2024-03-05T09:00:00", duration);
            let rect = geometry_for(&session, 1);
            assert_eq!(rect.height, duration * 2.0 * CELL_HEIGHT);
        }
    }

    #[test]
    fn test_geometry_for_position() {
        let session = session_at("2024-03-05T09:30:00", 1.0);
        let rect = geometry_for(&session, 1);
        assert_eq!(rect.top, 3.0 * CELL_HEIGHT);
        assert_eq!(rect.left_pct, 100.0 / 7.0);
        assert_eq!(rect.width_pct, 100.0 / 7.0 - 0.5);
    }

    #[test]
    fn test_geometry_for_out_of_range_session_still_computes() {
        let session = session_at("2024-03-05T21:00:00", 1.0);
        let rect = geometry_for(&session, 1);
        assert_eq!(rect.top, 26.0 * CELL_HEIGHT);
        assert_eq!(rect.height, 2.0 * CELL_HEIGHT);
    }

    #[test]
    fn test_cell_to_datetime() {
        let monday = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        let dt = cell_to_datetime(monday, 2, 14, 30);
        assert_eq!(
            dt,
            NaiveDateTime::parse_from_str("2024-03-06T14:30:00", "%Y-%m-%dT%H:%M:%S").unwrap()
        );
        assert_eq!(dt.second(), 0);
    }

    #[test]
    fn test_cell_roundtrip() {
        let monday = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        let dt = cell_to_datetime(monday, 4, 11, 30);
        let cell = cell_for(dt.date(), dt.hour(), dt.minute());
        assert_eq!(cell, GridCell { row: 7, col: 4 });
    }
}
