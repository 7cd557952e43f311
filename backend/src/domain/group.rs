//! Participant list encoding for group sessions.
//!
//! Group sessions are persisted with a single comma-joined participant
//! string. Inside the domain the list is an explicit id sequence; this
//! module is the only place the delimited form is produced or consumed.

use crate::domain::models::student::Student;

/// Display label for a participant id with no matching student.
/// Students may be deleted while their historical sessions remain, so a
/// dangling reference is never a hard error.
pub const UNKNOWN_STUDENT_LABEL: &str = "Aluno Desconhecido";

/// Join student ids into the stored participant reference, preserving
/// order.
pub fn encode(student_ids: &[String]) -> String {
    student_ids.join(",")
}

/// Split a stored participant reference into student ids, trimming
/// whitespace around each id. An empty reference decodes to an empty
/// sequence; the caller must treat that as "unknown participant" and
/// skip any lookup.
pub fn decode(participant_ref: &str) -> Vec<String> {
    if participant_ref.is_empty() {
        return Vec::new();
    }
    participant_ref
        .split(',')
        .map(|id| id.trim().to_string())
        .collect()
}

/// Resolve a participant reference to display names through the student
/// directory. Ids without a match resolve to [`UNKNOWN_STUDENT_LABEL`].
pub fn resolve_names(participant_ref: &str, directory: &[Student]) -> Vec<String> {
    decode(participant_ref)
        .iter()
        .map(|id| {
            directory
                .iter()
                .find(|s| &s.id == id)
                .map(|s| s.name.clone())
                .unwrap_or_else(|| UNKNOWN_STUDENT_LABEL.to_string())
        })
        .collect()
}
