use chrono::Datelike;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of class session. The two kinds are priced independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionKind {
    /// A session with exactly one participant
    Individual,
    /// A session with one or more participants, billed at the group rate
    Group,
}

impl SessionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionKind::Individual => "individual",
            SessionKind::Group => "group",
        }
    }
}

/// Student ID in format: "student::<epoch_millis>"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub id: String,
    pub name: String,
    /// ID of the user who owns this student record
    pub owner_id: String,
    /// RFC 3339 timestamp
    pub created_at: String,
    /// RFC 3339 timestamp
    pub updated_at: String,
}

/// A scheduled class session as exchanged with the frontend.
///
/// `participant_ref` carries the comma-joined participant id list; the
/// backend works with an explicit id sequence internally and only encodes
/// the delimited form at this boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassSession {
    pub id: String,
    /// Single student id (Individual) or comma-joined ids (Group)
    pub participant_ref: String,
    /// Local wall-clock start, "YYYY-MM-DDTHH:MM:SS"
    pub date: String,
    /// Duration in hours, any positive multiple of 0.5
    pub duration_hours: f64,
    pub kind: SessionKind,
    /// Hourly rate stored on the session; None falls back to the
    /// student override, then the default. An explicit 0 is preserved.
    pub rate: Option<f64>,
    pub notes: Option<String>,
    pub owner_id: String,
}

/// Aggregate ledger row for one student in one week of a month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyRecord {
    pub id: String,
    pub student_id: String,
    pub owner_id: String,
    /// Ordinal of the week within (month, year)
    pub week_number: u32,
    pub month: u32,
    pub year: i32,
    /// Hours of individual classes taught that week
    pub individual_hours: f64,
    /// Hours of group classes taught that week
    pub group_hours: f64,
    /// Hourly rate stored on the row; None falls back to the default.
    /// An explicit 0 is a real rate and is preserved.
    pub individual_rate: Option<f64>,
    pub group_rate: Option<f64>,
}

/// Per-student rate override. At most one per student.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentRate {
    pub student_id: String,
    pub individual_rate: Option<f64>,
    pub group_rate: Option<f64>,
}

/// Position of a session start on the half-hour weekly grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridCell {
    /// Half-hour row offset from the grid's first hour (may be negative
    /// for sessions outside the displayed range; no clamping)
    pub row: i32,
    /// Weekday column, 0 = Monday .. 6 = Sunday
    pub col: i32,
}

/// Rendered rectangle for a session on the weekly grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridRect {
    /// Pixels from the top of the grid
    pub top: f64,
    /// Pixels tall
    pub height: f64,
    /// Percent from the left edge
    pub left_pct: f64,
    /// Percent wide
    pub width_pct: f64,
}

/// Request for creating a new student
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreateStudentRequest {
    pub name: String,
}

/// Response after creating a student
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StudentResponse {
    pub student: Student,
    pub success_message: String,
}

/// Response containing all students for the current user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StudentListResponse {
    pub students: Vec<Student>,
}

/// Response after deleting a student (and its dependent rows)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeleteStudentResponse {
    pub success_message: String,
    /// Number of sessions removed by the cascade
    pub removed_sessions: usize,
    /// Number of weekly records removed by the cascade
    pub removed_records: usize,
}

/// Request for scheduling a session into a whole-hour grid slot (the
/// popover flow: the user clicked a grid cell). This path refuses a slot
/// that is already occupied.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScheduleSlotSessionRequest {
    /// Monday of the displayed week, "YYYY-MM-DD"
    pub week_start: String,
    /// Weekday column of the clicked cell, 0 = Monday .. 6 = Sunday
    pub day_index: u32,
    /// Target start hour (session starts at hour:00)
    pub hour: u32,
    pub participant_ids: Vec<String>,
    pub duration_hours: f64,
    pub kind: SessionKind,
    pub rate: Option<f64>,
    pub notes: Option<String>,
}

/// Request for scheduling a session at an arbitrary half-hour start.
/// This path never rejects overlap.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScheduleSessionRequest {
    /// Local start, "YYYY-MM-DDTHH:MM:SS"
    pub date: String,
    pub participant_ids: Vec<String>,
    pub duration_hours: f64,
    pub kind: SessionKind,
    pub rate: Option<f64>,
    pub notes: Option<String>,
}

/// Response after scheduling a session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionResponse {
    pub session: ClassSession,
    pub success_message: String,
}

/// Response after deleting a session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeleteSessionResponse {
    pub success_message: String,
}

/// Sessions of one displayed week together with its bounds
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeekSessionsResponse {
    /// Monday of the week, "YYYY-MM-DD"
    pub week_start: String,
    /// Sunday of the week, "YYYY-MM-DD"
    pub week_end: String,
    pub sessions: Vec<ClassSession>,
}

/// A session together with its computed grid rectangle
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PositionedSession {
    pub session: ClassSession,
    pub cell: GridCell,
    pub rect: GridRect,
    /// Participant names resolved for display; unknown ids carry the
    /// unknown-student label
    pub participant_names: Vec<String>,
}

/// The weekly grid: bounds plus positioned sessions
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeekGridResponse {
    pub week_start: String,
    pub week_end: String,
    pub sessions: Vec<PositionedSession>,
}

/// Request to create the next week of ledger rows for a month
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AddWeekRequest {
    pub month: u32,
    pub year: i32,
}

impl Default for AddWeekRequest {
    fn default() -> Self {
        let now = chrono::Local::now();
        Self {
            month: now.month(),
            year: now.year(),
        }
    }
}

/// Response after adding a week of ledger rows
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AddWeekResponse {
    pub records: Vec<WeeklyRecord>,
    pub week_number: u32,
    pub success_message: String,
}

/// Field edits for a weekly record. Values arrive as raw form input;
/// anything that does not parse as a number is stored as 0.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct UpdateWeeklyRecordRequest {
    pub individual_hours: Option<String>,
    pub group_hours: Option<String>,
    pub individual_rate: Option<String>,
    pub group_rate: Option<String>,
}

/// Response after updating a weekly record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeeklyRecordResponse {
    pub record: WeeklyRecord,
    pub success_message: String,
}

/// Monthly billing total for one student
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StudentMonthTotal {
    pub student_id: String,
    pub student_name: String,
    pub total: f64,
    /// Total rounded to 2 decimals for display
    pub formatted_total: String,
}

/// Billing total of a single weekly ledger row
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecordTotal {
    pub record_id: String,
    pub total: f64,
    pub formatted_total: String,
}

/// The monthly ledger: records plus billing totals
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonthLedgerResponse {
    pub month: u32,
    pub year: i32,
    pub records: Vec<WeeklyRecord>,
    /// Per-row totals, one entry per record
    pub record_totals: Vec<RecordTotal>,
    pub student_totals: Vec<StudentMonthTotal>,
    pub grand_total: f64,
    pub formatted_grand_total: String,
}

/// One student's monthly total computed from the session ledger
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StudentSessionTotalResponse {
    pub student_id: String,
    pub month: u32,
    pub year: i32,
    pub total: f64,
    pub formatted_total: String,
}

/// Request to set a per-student rate override
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SetStudentRateRequest {
    pub individual_rate: Option<f64>,
    pub group_rate: Option<f64>,
}

/// Response after setting or clearing a rate override
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StudentRateResponse {
    pub rate: Option<StudentRate>,
    pub success_message: String,
}

/// The signed-in user as reported by the auth provider
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserInfo {
    pub id: String,
    pub display_name: String,
}

/// Response containing the current user, if any
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CurrentUserResponse {
    pub user: Option<UserInfo>,
}

/// Request to sign a user in (the credential check itself is external;
/// this carries the opaque id the credential store returned)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SignInRequest {
    pub user_id: String,
    pub display_name: String,
}

/// Response after signing out
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SignOutResponse {
    pub success_message: String,
}

/// Current week selection state
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeekCursorResponse {
    /// The reference date, "YYYY-MM-DDTHH:MM:SS"
    pub reference_date: String,
    /// Monday of the selected week, "YYYY-MM-DD"
    pub week_start: String,
    /// Sunday of the selected week, "YYYY-MM-DD"
    pub week_end: String,
}

/// Week numbers present in a month, plus the next free ordinal
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonthWeeksResponse {
    pub year: i32,
    pub month: u32,
    pub week_numbers: Vec<u32>,
    pub next_week_number: u32,
}

/// Type of calendar day for explicit rendering logic
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum CalendarDayType {
    /// Empty padding day before the start of the month
    PaddingBefore,
    /// Actual day within the month
    MonthDay,
}

/// A single day in the month calendar view
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CalendarDay {
    pub day: u32,
    pub sessions: Vec<ClassSession>,
    pub day_type: CalendarDayType,
}

/// A month calendar with the sessions grouped per day
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CalendarMonth {
    pub month: u32,
    pub year: i32,
    pub days: Vec<CalendarDay>,
    /// Weekday of day 1, 0 = Monday .. 6 = Sunday
    pub first_day_of_week: u32,
}

/// Format a monetary amount for display. Internal sums keep full
/// precision; rounding to 2 decimals happens only here.
pub fn format_currency(amount: f64) -> String {
    format!("R$ {:.2}", amount)
}

impl Student {
    /// Generate a student ID based on timestamp
    pub fn generate_id(epoch_millis: u64) -> String {
        format!("student::{}", epoch_millis)
    }

    /// Parse a student ID to extract the timestamp
    pub fn parse_id(id: &str) -> Result<u64, StudentIdError> {
        let parts: Vec<&str> = id.split("::").collect();
        if parts.len() != 2 || parts[0] != "student" {
            return Err(StudentIdError::InvalidFormat);
        }

        parts[1]
            .parse::<u64>()
            .map_err(|_| StudentIdError::InvalidTimestamp)
    }

    /// Extract timestamp from a student ID for sorting
    pub fn extract_timestamp(&self) -> Result<u64, StudentIdError> {
        Self::parse_id(&self.id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StudentIdError {
    InvalidFormat,
    InvalidTimestamp,
}

impl fmt::Display for StudentIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StudentIdError::InvalidFormat => write!(f, "Invalid student ID format"),
            StudentIdError::InvalidTimestamp => write!(f, "Invalid timestamp in student ID"),
        }
    }
}

impl std::error::Error for StudentIdError {}
