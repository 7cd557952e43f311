//! Domain model for per-student rate overrides.
use serde::{Deserialize, Serialize};

use crate::domain::models::session::SessionKind;

/// Fallback hourly price for an individual session
pub const DEFAULT_INDIVIDUAL_RATE: f64 = 14.0;
/// Fallback hourly price for a group session
pub const DEFAULT_GROUP_RATE: f64 = 10.0;

/// Optional per-student rate override. At most one per student; a field
/// of None means "no override for that session kind".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentRate {
    pub student_id: String,
    pub individual_rate: Option<f64>,
    pub group_rate: Option<f64>,
}

impl StudentRate {
    /// The override for a session kind, if configured
    pub fn rate_for(&self, kind: SessionKind) -> Option<f64> {
        match kind {
            SessionKind::Individual => self.individual_rate,
            SessionKind::Group => self.group_rate,
        }
    }
}

/// The hardcoded default rate for a session kind
pub fn default_rate(kind: SessionKind) -> f64 {
    match kind {
        SessionKind::Individual => DEFAULT_INDIVIDUAL_RATE,
        SessionKind::Group => DEFAULT_GROUP_RATE,
    }
}
