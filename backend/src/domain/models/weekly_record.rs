//! Domain model for an aggregate weekly ledger row.
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Hours and rates for one student in one week of a month.
///
/// At most one record exists per (student, week, month, year). Rates are
/// optional so that an explicit 0 survives the billing fallback chain;
/// only a missing rate falls through to the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyRecord {
    pub id: String,
    pub student_id: String,
    pub owner_id: String,
    pub week_number: u32,
    pub month: u32,
    pub year: i32,
    pub individual_hours: f64,
    pub group_hours: f64,
    pub individual_rate: Option<f64>,
    pub group_rate: Option<f64>,
}

impl WeeklyRecord {
    /// Generate a unique record ID
    pub fn generate_id() -> String {
        format!("record::{}", Uuid::new_v4())
    }

    /// The uniqueness key of this record
    pub fn key(&self) -> (&str, u32, u32, i32) {
        (self.student_id.as_str(), self.week_number, self.month, self.year)
    }
}
