//! # CSV Storage Module
//!
//! File-based storage backend. Each owner has a directory under the base
//! data directory with one CSV file per row kind, written atomically via
//! a temp file. The domain layer only sees the traits in
//! `storage::traits`, so this backend is interchangeable with any other.
//!
//! ## Layout
//!
//! ```text
//! <base>/global_config.yaml
//! <base>/<owner>/students.csv
//! <base>/<owner>/sessions.csv
//! <base>/<owner>/weekly_records.csv
//! <base>/<owner>/rates.csv
//! ```

pub mod connection;
pub mod rate_repository;
pub mod session_repository;
pub mod student_repository;
pub mod weekly_record_repository;

#[cfg(test)]
pub mod test_utils;

pub use connection::CsvConnection;
pub use rate_repository::RateRepository;
pub use session_repository::SessionRepository;
pub use student_repository::StudentRepository;
pub use weekly_record_repository::WeeklyRecordRepository;
