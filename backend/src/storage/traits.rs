//! # Storage Traits
//!
//! Storage abstraction traits that allow different backends to be used
//! interchangeably in the domain layer. Methods are synchronous; the
//! REST layer is the async boundary. Every operation is scoped by the
//! owning user id.

use anyhow::Result;
use chrono::NaiveDate;

use crate::domain::models::rate::StudentRate as DomainStudentRate;
use crate::domain::models::session::ClassSession as DomainClassSession;
use crate::domain::models::student::Student as DomainStudent;
use crate::domain::models::weekly_record::WeeklyRecord as DomainWeeklyRecord;

/// Interface for student storage operations
pub trait StudentStorage: Send + Sync {
    /// Store a new student
    fn store_student(&self, student: &DomainStudent) -> Result<()>;

    /// Retrieve a specific student by ID
    fn get_student(&self, owner_id: &str, student_id: &str) -> Result<Option<DomainStudent>>;

    /// List the owner's students ordered by name
    fn list_students(&self, owner_id: &str) -> Result<Vec<DomainStudent>>;

    /// Delete a student by ID.
    /// Returns true if the student was found and deleted.
    fn delete_student(&self, owner_id: &str, student_id: &str) -> Result<bool>;
}

/// Interface for class session storage operations
pub trait SessionStorage: Send + Sync {
    /// Store a new session
    fn store_session(&self, session: &DomainClassSession) -> Result<()>;

    /// Retrieve a specific session by ID
    fn get_session(&self, owner_id: &str, session_id: &str) -> Result<Option<DomainClassSession>>;

    /// List all of the owner's sessions ordered by date
    fn list_sessions(&self, owner_id: &str) -> Result<Vec<DomainClassSession>>;

    /// List sessions whose calendar day falls within [start, end]
    fn list_sessions_in_range(
        &self,
        owner_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DomainClassSession>>;

    /// Delete a single session.
    /// Returns true if the session was found and deleted.
    fn delete_session(&self, owner_id: &str, session_id: &str) -> Result<bool>;

    /// Delete multiple sessions.
    /// Returns the number of sessions actually deleted.
    fn delete_sessions(&self, owner_id: &str, session_ids: &[String]) -> Result<u32>;
}

/// Interface for weekly ledger record storage operations
pub trait WeeklyRecordStorage: Send + Sync {
    /// Store a new record
    fn store_record(&self, record: &DomainWeeklyRecord) -> Result<()>;

    /// Retrieve a specific record by ID
    fn get_record(&self, owner_id: &str, record_id: &str) -> Result<Option<DomainWeeklyRecord>>;

    /// List the records of one (month, year)
    fn list_records_for_month(
        &self,
        owner_id: &str,
        month: u32,
        year: i32,
    ) -> Result<Vec<DomainWeeklyRecord>>;

    /// List all records of one student
    fn list_records_for_student(
        &self,
        owner_id: &str,
        student_id: &str,
    ) -> Result<Vec<DomainWeeklyRecord>>;

    /// Update an existing record
    fn update_record(&self, record: &DomainWeeklyRecord) -> Result<()>;

    /// Delete all records of one student.
    /// Returns the number of records deleted.
    fn delete_records_for_student(&self, owner_id: &str, student_id: &str) -> Result<u32>;
}

/// Interface for per-student rate override storage operations
pub trait RateStorage: Send + Sync {
    /// Store or replace a student's rate override
    fn store_rate(&self, owner_id: &str, rate: &DomainStudentRate) -> Result<()>;

    /// Retrieve a student's rate override
    fn get_rate(&self, owner_id: &str, student_id: &str) -> Result<Option<DomainStudentRate>>;

    /// List all rate overrides for the owner
    fn list_rates(&self, owner_id: &str) -> Result<Vec<DomainStudentRate>>;

    /// Delete a student's rate override.
    /// Returns true if an override was present.
    fn delete_rate(&self, owner_id: &str, student_id: &str) -> Result<bool>;
}

/// Interface for storage connections.
///
/// Abstracts the connection type and provides factory methods for
/// repositories, so the domain layer works with any backend without
/// knowing the implementation.
pub trait Connection: Send + Sync + Clone {
    type StudentRepository: StudentStorage;
    type SessionRepository: SessionStorage;
    type WeeklyRecordRepository: WeeklyRecordStorage;
    type RateRepository: RateStorage;

    fn create_student_repository(&self) -> Self::StudentRepository;
    fn create_session_repository(&self) -> Self::SessionRepository;
    fn create_weekly_record_repository(&self) -> Self::WeeklyRecordRepository;
    fn create_rate_repository(&self) -> Self::RateRepository;
}
