//! In-memory index over loaded class sessions.
//!
//! Services load the sessions of the relevant window from storage and
//! answer grid and ledger queries through this index. Week membership is
//! decided by calendar-day equality on the stored date; the time of day
//! only matters for grid placement.

use chrono::{Datelike, Duration, NaiveDate, Timelike};

use crate::domain::models::session::{ClassSession, SessionKind};

#[derive(Debug, Clone, Default)]
pub struct SessionIndex {
    sessions: Vec<ClassSession>,
}

impl SessionIndex {
    pub fn new(sessions: Vec<ClassSession>) -> Self {
        Self { sessions }
    }

    pub fn sessions(&self) -> &[ClassSession] {
        &self.sessions
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Add a session to the index. Overlap is never rejected here; two
    /// sessions may compete for the same slot at sub-hour precision and
    /// are only rendered in competing positions.
    pub fn insert(&mut self, session: ClassSession) {
        self.sessions.push(session);
    }

    /// Remove a session by id. Returns whether it was present.
    pub fn remove(&mut self, session_id: &str) -> bool {
        let before = self.sessions.len();
        self.sessions.retain(|s| s.id != session_id);
        self.sessions.len() != before
    }

    /// Sessions whose calendar day falls within the week starting at
    /// `week_start` (inclusive of both Monday and Sunday).
    pub fn sessions_in_week(&self, week_start: NaiveDate) -> Vec<&ClassSession> {
        let week_end = week_start + Duration::days(6);
        self.sessions
            .iter()
            .filter(|s| {
                let day = s.date.date();
                day >= week_start && day <= week_end
            })
            .collect()
    }

    /// At most one session starting exactly at `hour:00` on `day`.
    ///
    /// Sessions starting on the half hour are invisible to this lookup;
    /// it only supports whole-hour slots even though the grid places
    /// sessions at half-hour resolution.
    pub fn find_at(&self, day: NaiveDate, hour: u32) -> Option<&ClassSession> {
        self.sessions.iter().find(|s| {
            s.date.date() == day && s.date.hour() == hour && s.date.minute() == 0
        })
    }

    /// All sessions the given student takes part in
    pub fn sessions_for_student(&self, student_id: &str) -> Vec<&ClassSession> {
        self.sessions
            .iter()
            .filter(|s| s.involves_student(student_id))
            .collect()
    }

    pub fn sessions_of_kind(&self, kind: SessionKind) -> Vec<&ClassSession> {
        self.sessions.iter().filter(|s| s.kind == kind).collect()
    }

    /// Sessions with a calendar day inside `[start, end]`
    pub fn sessions_in_range(&self, start: NaiveDate, end: NaiveDate) -> Vec<&ClassSession> {
        self.sessions
            .iter()
            .filter(|s| {
                let day = s.date.date();
                day >= start && day <= end
            })
            .collect()
    }

    /// Sessions inside the given calendar month
    pub fn sessions_in_month(&self, month: u32, year: i32) -> Vec<&ClassSession> {
        self.sessions
            .iter()
            .filter(|s| s.date.month() == month && s.date.year() == year)
            .collect()
    }
}
