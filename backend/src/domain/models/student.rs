use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Domain model representing a student taught by the current user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub id: String,
    pub name: String,
    pub owner_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Student {
    /// Generate a unique ID for a student
    pub fn generate_id(timestamp_millis: u64) -> String {
        format!("student::{}", timestamp_millis)
    }
}
