//! Shared fixtures for repository and service tests.

use chrono::{NaiveDateTime, Utc};
use tempfile::TempDir;

use super::connection::CsvConnection;
use crate::domain::models::session::{ClassSession, SessionKind};
use crate::domain::models::student::Student;
use crate::domain::models::weekly_record::WeeklyRecord;

/// A connection over a fresh temporary directory. Keep the TempDir alive
/// for the duration of the test.
pub fn test_connection() -> (CsvConnection, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let connection = CsvConnection::new(temp_dir.path()).unwrap();
    (connection, temp_dir)
}

pub fn student(id: &str, name: &str, owner_id: &str) -> Student {
    let now = Utc::now();
    Student {
        id: id.to_string(),
        name: name.to_string(),
        owner_id: owner_id.to_string(),
        created_at: now,
        updated_at: now,
    }
}

pub fn individual_session(
    id: &str,
    student_id: &str,
    date: &str,
    duration_hours: f64,
    owner_id: &str,
) -> ClassSession {
    ClassSession {
        id: id.to_string(),
        participants: vec![student_id.to_string()],
        date: NaiveDateTime::parse_from_str(date, "%Y-%m-%dT%H:%M:%S").unwrap(),
        duration_hours,
        kind: SessionKind::Individual,
        rate: None,
        notes: None,
        owner_id: owner_id.to_string(),
    }
}

pub fn group_session(
    id: &str,
    student_ids: &[&str],
    date: &str,
    duration_hours: f64,
    owner_id: &str,
) -> ClassSession {
    ClassSession {
        id: id.to_string(),
        participants: student_ids.iter().map(|s| s.to_string()).collect(),
        date: NaiveDateTime::parse_from_str(date, "%Y-%m-%dT%H:%M:%S").unwrap(),
        duration_hours,
        kind: SessionKind::Group,
        rate: None,
        notes: None,
        owner_id: owner_id.to_string(),
    }
}

pub fn weekly_record(
    student_id: &str,
    owner_id: &str,
    week_number: u32,
    month: u32,
    year: i32,
) -> WeeklyRecord {
    WeeklyRecord {
        id: WeeklyRecord::generate_id(),
        student_id: student_id.to_string(),
        owner_id: owner_id.to_string(),
        week_number,
        month,
        year,
        individual_hours: 0.0,
        group_hours: 0.0,
        individual_rate: Some(14.0),
        group_rate: Some(10.0),
    }
}
