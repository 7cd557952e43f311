//! Month calendar generation for the monthly ledger view.
//!
//! Builds the padded day-cell sequence the UI renders, with each day
//! carrying the sessions that fall on it. Date parsing works on the wire
//! format strings so the generated month can be handed straight to the
//! frontend.

use chrono::{Datelike, NaiveDate};
use log::debug;
use shared::{CalendarDay, CalendarDayType, CalendarMonth, ClassSession};
use std::collections::HashMap;

/// Number of days in a month, accounting for leap years
pub fn days_in_month(month: u32, year: i32) -> u32 {
    match month {
        2 => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

pub fn is_leap_year(year: i32) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

/// Weekday of the first day of the month (0 = Monday .. 6 = Sunday)
pub fn first_day_of_month(month: u32, year: i32) -> u32 {
    match NaiveDate::from_ymd_opt(year, month, 1) {
        Some(date) => date.weekday().num_days_from_monday(),
        None => 0,
    }
}

/// Human-readable month name
pub fn month_name(month: u32) -> &'static str {
    match month {
        1 => "January",
        2 => "February",
        3 => "March",
        4 => "April",
        5 => "May",
        6 => "June",
        7 => "July",
        8 => "August",
        9 => "September",
        10 => "October",
        11 => "November",
        12 => "December",
        _ => "Invalid Month",
    }
}

/// Navigate to the previous month
pub fn previous_month(month: u32, year: i32) -> (u32, i32) {
    if month == 1 {
        (12, year - 1)
    } else {
        (month - 1, year)
    }
}

/// Navigate to the next month
pub fn next_month(month: u32, year: i32) -> (u32, i32) {
    if month == 12 {
        (1, year + 1)
    } else {
        (month + 1, year)
    }
}

/// Extract (year, month, day) from a wire-format session date
fn parse_session_day(date: &str) -> Option<(i32, u32, u32)> {
    let date_part = date.split('T').next()?;
    let parts: Vec<&str> = date_part.split('-').collect();
    if parts.len() != 3 {
        return None;
    }
    Some((
        parts[0].parse().ok()?,
        parts[1].parse().ok()?,
        parts[2].parse().ok()?,
    ))
}

/// Group sessions by day-of-month, dropping sessions outside the month
fn sessions_by_day(month: u32, year: i32, sessions: &[ClassSession]) -> HashMap<u32, Vec<ClassSession>> {
    let mut by_day: HashMap<u32, Vec<ClassSession>> = HashMap::new();
    for session in sessions {
        if let Some((s_year, s_month, s_day)) = parse_session_day(&session.date) {
            if s_month == month && s_year == year {
                by_day.entry(s_day).or_default().push(session.clone());
            }
        }
    }
    by_day
}

/// Generate the month view: leading padding cells up to the weekday of
/// day 1, then one cell per day with its sessions.
pub fn generate_month(month: u32, year: i32, sessions: Vec<ClassSession>) -> CalendarMonth {
    let total_days = days_in_month(month, year);
    let first_day = first_day_of_month(month, year);
    let mut by_day = sessions_by_day(month, year, &sessions);

    debug!(
        "Generating calendar for {}/{}: {} days, first weekday {}",
        month, year, total_days, first_day
    );

    let mut days = Vec::new();
    for _ in 0..first_day {
        days.push(CalendarDay {
            day: 0,
            sessions: Vec::new(),
            day_type: CalendarDayType::PaddingBefore,
        });
    }
    for day in 1..=total_days {
        days.push(CalendarDay {
            day,
            sessions: by_day.remove(&day).unwrap_or_default(),
            day_type: CalendarDayType::MonthDay,
        });
    }

    CalendarMonth {
        month,
        year,
        days,
        first_day_of_week: first_day,
    }
}
