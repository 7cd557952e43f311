//! Domain-level command and query types.
//!
//! These structs are used by services inside the domain layer and are
//! **not** exposed over the public API. The REST layer maps the public
//! DTOs defined in the `shared` crate to these internal types.

pub mod students {
    use crate::domain::models::student::Student;

    /// Input for creating a new student.
    #[derive(Debug, Clone)]
    pub struct CreateStudentCommand {
        pub owner_id: String,
        pub name: String,
    }

    /// Query for listing the owner's students.
    #[derive(Debug, Clone)]
    pub struct ListStudentsQuery {
        pub owner_id: String,
    }

    /// Command for deleting a student and its dependent rows.
    #[derive(Debug, Clone)]
    pub struct DeleteStudentCommand {
        pub owner_id: String,
        pub student_id: String,
    }

    /// Result of creating a student.
    #[derive(Debug, Clone)]
    pub struct CreateStudentResult {
        pub student: Student,
    }

    /// Result of listing students.
    #[derive(Debug, Clone)]
    pub struct ListStudentsResult {
        pub students: Vec<Student>,
    }

    /// Result of deleting a student.
    #[derive(Debug, Clone)]
    pub struct DeleteStudentResult {
        pub removed_sessions: usize,
        pub removed_records: usize,
        pub success_message: String,
    }
}

pub mod sessions {
    use chrono::{NaiveDate, NaiveDateTime};

    use crate::domain::models::session::{ClassSession, SessionKind};

    /// Input for the hour-guarded scheduling path (grid popover). The
    /// target slot must be free at whole-hour granularity.
    #[derive(Debug, Clone)]
    pub struct ScheduleSlotCommand {
        pub owner_id: String,
        /// Monday of the displayed week
        pub week_start: NaiveDate,
        /// Weekday column of the clicked cell, 0 = Monday .. 6 = Sunday
        pub day_index: u32,
        pub hour: u32,
        pub participant_ids: Vec<String>,
        pub duration_hours: f64,
        pub kind: SessionKind,
        pub rate: Option<f64>,
        pub notes: Option<String>,
    }

    /// Input for the fine-grained scheduling path (dialog). Overlap is
    /// never rejected here.
    #[derive(Debug, Clone)]
    pub struct ScheduleSessionCommand {
        pub owner_id: String,
        pub date: NaiveDateTime,
        pub participant_ids: Vec<String>,
        pub duration_hours: f64,
        pub kind: SessionKind,
        pub rate: Option<f64>,
        pub notes: Option<String>,
    }

    /// Query for the sessions of one week.
    #[derive(Debug, Clone)]
    pub struct WeekSessionsQuery {
        pub owner_id: String,
        pub week_start: NaiveDate,
    }

    /// Query for the sessions of one calendar month.
    #[derive(Debug, Clone)]
    pub struct MonthSessionsQuery {
        pub owner_id: String,
        pub month: u32,
        pub year: i32,
    }

    /// Command for deleting a session by id.
    #[derive(Debug, Clone)]
    pub struct DeleteSessionCommand {
        pub owner_id: String,
        pub session_id: String,
    }

    /// Result of scheduling a session.
    #[derive(Debug, Clone)]
    pub struct ScheduleSessionResult {
        pub session: ClassSession,
        pub success_message: String,
    }

    /// Result of listing sessions.
    #[derive(Debug, Clone)]
    pub struct SessionListResult {
        pub sessions: Vec<ClassSession>,
    }

    /// Result of deleting a session.
    #[derive(Debug, Clone)]
    pub struct DeleteSessionResult {
        pub success_message: String,
    }
}

pub mod ledger {
    use crate::domain::models::weekly_record::WeeklyRecord;

    /// Command to create the next week of ledger rows for a month.
    #[derive(Debug, Clone)]
    pub struct AddWeekCommand {
        pub owner_id: String,
        pub month: u32,
        pub year: i32,
    }

    /// Field edits for one record. Raw form input; values that do not
    /// parse as numbers are coerced to 0, never rejected.
    #[derive(Debug, Clone, Default)]
    pub struct UpdateRecordCommand {
        pub owner_id: String,
        pub record_id: String,
        pub individual_hours: Option<String>,
        pub group_hours: Option<String>,
        pub individual_rate: Option<String>,
        pub group_rate: Option<String>,
    }

    /// Query for the ledger rows of one month.
    #[derive(Debug, Clone)]
    pub struct MonthRecordsQuery {
        pub owner_id: String,
        pub month: u32,
        pub year: i32,
    }

    /// Result of adding a week.
    #[derive(Debug, Clone)]
    pub struct AddWeekResult {
        pub records: Vec<WeeklyRecord>,
        pub week_number: u32,
        pub success_message: String,
    }

    /// Result of updating a record.
    #[derive(Debug, Clone)]
    pub struct UpdateRecordResult {
        pub record: WeeklyRecord,
        pub success_message: String,
    }

    /// Result of listing a month's records.
    #[derive(Debug, Clone)]
    pub struct MonthRecordsResult {
        pub records: Vec<WeeklyRecord>,
    }
}

pub mod billing {
    use crate::domain::models::weekly_record::WeeklyRecord;

    /// Query for the full monthly ledger with billing totals.
    #[derive(Debug, Clone)]
    pub struct MonthLedgerQuery {
        pub owner_id: String,
        pub month: u32,
        pub year: i32,
    }

    /// One student's monthly total.
    #[derive(Debug, Clone)]
    pub struct StudentMonthTotal {
        pub student_id: String,
        pub student_name: String,
        pub total: f64,
    }

    /// Billing total of one weekly ledger row.
    #[derive(Debug, Clone)]
    pub struct RecordTotal {
        pub record_id: String,
        pub total: f64,
    }

    /// Result of the monthly ledger query.
    #[derive(Debug, Clone)]
    pub struct MonthLedgerResult {
        pub records: Vec<WeeklyRecord>,
        pub record_totals: Vec<RecordTotal>,
        pub student_totals: Vec<StudentMonthTotal>,
        pub grand_total: f64,
    }

    /// Query for one student's monthly total from the session ledger.
    #[derive(Debug, Clone)]
    pub struct StudentSessionTotalQuery {
        pub owner_id: String,
        pub student_id: String,
        pub month: u32,
        pub year: i32,
        pub kind: Option<crate::domain::models::session::SessionKind>,
    }

    /// Result of the session-ledger total query.
    #[derive(Debug, Clone)]
    pub struct StudentSessionTotalResult {
        pub total: f64,
    }
}

pub mod rates {
    use crate::domain::models::rate::StudentRate;

    /// Command to set a per-student rate override.
    #[derive(Debug, Clone)]
    pub struct SetRateCommand {
        pub owner_id: String,
        pub student_id: String,
        pub individual_rate: Option<f64>,
        pub group_rate: Option<f64>,
    }

    /// Query for a student's override.
    #[derive(Debug, Clone)]
    pub struct GetRateQuery {
        pub owner_id: String,
        pub student_id: String,
    }

    /// Command to clear a student's override.
    #[derive(Debug, Clone)]
    pub struct ClearRateCommand {
        pub owner_id: String,
        pub student_id: String,
    }

    /// Result of setting a rate override.
    #[derive(Debug, Clone)]
    pub struct SetRateResult {
        pub rate: StudentRate,
        pub success_message: String,
    }

    /// Result of fetching a rate override.
    #[derive(Debug, Clone)]
    pub struct GetRateResult {
        pub rate: Option<StudentRate>,
    }

    /// Result of clearing a rate override.
    #[derive(Debug, Clone)]
    pub struct ClearRateResult {
        pub removed: bool,
        pub success_message: String,
    }
}
