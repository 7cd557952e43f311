//! Domain model for a class session.
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionKind {
    Individual,
    Group,
}

/// A scheduled class session.
///
/// Participants are an explicit id sequence here; the comma-joined
/// `participant_ref` encoding exists only at the storage and DTO
/// boundaries. An Individual session carries exactly one participant,
/// a Group session one or more.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassSession {
    pub id: String,
    pub participants: Vec<String>,
    /// Local wall-clock start; seconds are always zero
    pub date: NaiveDateTime,
    /// Duration in hours, a positive multiple of 0.5
    pub duration_hours: f64,
    pub kind: SessionKind,
    /// Hourly rate stored with the session; None means "resolve via the
    /// fallback chain". An explicit 0 is a real rate.
    pub rate: Option<f64>,
    pub notes: Option<String>,
    pub owner_id: String,
}

impl ClassSession {
    /// Generate a unique session ID
    pub fn generate_id() -> String {
        format!("session::{}", Uuid::new_v4())
    }

    pub fn is_group(&self) -> bool {
        self.kind == SessionKind::Group
    }

    /// Whether the given student takes part in this session
    pub fn involves_student(&self, student_id: &str) -> bool {
        self.participants.iter().any(|p| p == student_id)
    }
}
