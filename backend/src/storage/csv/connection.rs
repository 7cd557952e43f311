use anyhow::Result;
use log::info;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::storage::traits::Connection;

/// CsvConnection manages file paths and ensures the CSV files exist for
/// each owner. Every owner gets a directory under the base directory
/// holding one file per row kind.
#[derive(Clone)]
pub struct CsvConnection {
    base_directory: Arc<Mutex<PathBuf>>,
}

pub const STUDENTS_FILE: &str = "students.csv";
pub const SESSIONS_FILE: &str = "sessions.csv";
pub const WEEKLY_RECORDS_FILE: &str = "weekly_records.csv";
pub const RATES_FILE: &str = "rates.csv";

pub const STUDENTS_HEADER: &[&str] = &["id", "name", "owner_id", "created_at", "updated_at"];
pub const SESSIONS_HEADER: &[&str] = &[
    "id",
    "participant_ref",
    "date",
    "duration_hours",
    "kind",
    "rate",
    "notes",
    "owner_id",
];
pub const WEEKLY_RECORDS_HEADER: &[&str] = &[
    "id",
    "student_id",
    "owner_id",
    "week_number",
    "month",
    "year",
    "individual_hours",
    "group_hours",
    "individual_rate",
    "group_rate",
];
pub const RATES_HEADER: &[&str] = &["student_id", "individual_rate", "group_rate"];

impl CsvConnection {
    /// Create a new CSV connection with a base directory
    pub fn new<P: AsRef<Path>>(base_directory: P) -> Result<Self> {
        let base_path = base_directory.as_ref().to_path_buf();

        if !base_path.exists() {
            fs::create_dir_all(&base_path)?;
        }

        Ok(Self {
            base_directory: Arc::new(Mutex::new(base_path)),
        })
    }

    /// Create a new CSV connection in the default data directory
    /// (~/Documents/Tutor Tracker)
    pub fn new_default() -> Result<Self> {
        let home_dir = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .map_err(|_| anyhow::anyhow!("Could not determine home directory"))?;

        let data_dir = PathBuf::from(home_dir)
            .join("Documents")
            .join("Tutor Tracker");

        info!("Using data directory: {}", data_dir.display());
        Self::new(data_dir)
    }

    /// Get the base directory path
    pub fn base_directory(&self) -> PathBuf {
        let base_dir = self.base_directory.lock().unwrap();
        base_dir.clone()
    }

    /// Path of the global YAML configuration file
    pub fn global_config_path(&self) -> PathBuf {
        self.base_directory().join("global_config.yaml")
    }

    /// Generate a safe filesystem identifier from an owner id.
    /// Ids are opaque strings and may carry separators ("user::42").
    pub fn safe_directory_name(owner_id: &str) -> String {
        let mut result = String::new();
        let mut last_was_underscore = false;
        for c in owner_id.chars() {
            let mapped = if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            };
            if mapped == '_' {
                if !last_was_underscore {
                    result.push('_');
                }
                last_was_underscore = true;
            } else {
                result.push(mapped);
                last_was_underscore = false;
            }
        }
        result.trim_matches('_').to_string()
    }

    /// Get the directory holding one owner's data
    pub fn owner_directory(&self, owner_id: &str) -> PathBuf {
        self.base_directory()
            .join(Self::safe_directory_name(owner_id))
    }

    /// Get the path of one of an owner's data files
    pub fn owner_file_path(&self, owner_id: &str, file_name: &str) -> PathBuf {
        self.owner_directory(owner_id).join(file_name)
    }

    /// Ensure an owner data file exists with its header row
    pub fn ensure_owner_file_exists(
        &self,
        owner_id: &str,
        file_name: &str,
        header: &[&str],
    ) -> Result<()> {
        let owner_dir = self.owner_directory(owner_id);
        if !owner_dir.exists() {
            fs::create_dir_all(&owner_dir)?;
            info!("Created owner data directory: {}", owner_dir.display());
        }

        let file_path = owner_dir.join(file_name);
        if !file_path.exists() {
            let mut line = header.join(",");
            line.push('\n');
            fs::write(&file_path, line)?;
        }

        Ok(())
    }

    /// Clean up test data (useful for tests)
    #[cfg(test)]
    pub fn cleanup(&self) -> Result<()> {
        let base_dir = self.base_directory.lock().unwrap();
        if base_dir.exists() {
            fs::remove_dir_all(&*base_dir)?;
        }
        Ok(())
    }
}

impl Connection for CsvConnection {
    type StudentRepository = super::student_repository::StudentRepository;
    type SessionRepository = super::session_repository::SessionRepository;
    type WeeklyRecordRepository = super::weekly_record_repository::WeeklyRecordRepository;
    type RateRepository = super::rate_repository::RateRepository;

    fn create_student_repository(&self) -> Self::StudentRepository {
        super::student_repository::StudentRepository::new(self.clone())
    }

    fn create_session_repository(&self) -> Self::SessionRepository {
        super::session_repository::SessionRepository::new(self.clone())
    }

    fn create_weekly_record_repository(&self) -> Self::WeeklyRecordRepository {
        super::weekly_record_repository::WeeklyRecordRepository::new(self.clone())
    }

    fn create_rate_repository(&self) -> Self::RateRepository {
        super::rate_repository::RateRepository::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_safe_directory_name() {
        assert_eq!(CsvConnection::safe_directory_name("user::42"), "user_42");
        assert_eq!(CsvConnection::safe_directory_name("User 42"), "user_42");
        assert_eq!(CsvConnection::safe_directory_name("abc-def"), "abc_def");
        assert_eq!(CsvConnection::safe_directory_name("__x__"), "x");
    }

    #[test]
    fn test_ensure_owner_file_exists_writes_header() {
        let temp_dir = TempDir::new().unwrap();
        let connection = CsvConnection::new(temp_dir.path()).unwrap();

        connection
            .ensure_owner_file_exists("user::1", STUDENTS_FILE, STUDENTS_HEADER)
            .unwrap();

        let path = connection.owner_file_path("user::1", STUDENTS_FILE);
        assert!(path.exists());
        let content = fs::read_to_string(path).unwrap();
        assert_eq!(content, "id,name,owner_id,created_at,updated_at\n");
    }

    #[test]
    fn test_owner_directories_are_isolated() {
        let temp_dir = TempDir::new().unwrap();
        let connection = CsvConnection::new(temp_dir.path()).unwrap();

        let a = connection.owner_directory("user::1");
        let b = connection.owner_directory("user::2");
        assert_ne!(a, b);
    }
}
