use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use csv::{Reader, Writer};
use log::info;
use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter};

use super::connection::{CsvConnection, SESSIONS_FILE, SESSIONS_HEADER};
use crate::domain::group;
use crate::domain::models::session::{ClassSession, SessionKind};
use crate::storage::traits::SessionStorage;

/// Wire format for the session start, local wall-clock time
pub const SESSION_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// CSV-based class session repository.
///
/// The participant list is held as an id sequence in the domain model;
/// this repository is where the comma-joined `participant_ref` encoding
/// is produced and consumed.
#[derive(Clone)]
pub struct SessionRepository {
    connection: CsvConnection,
}

impl SessionRepository {
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    fn read_sessions(&self, owner_id: &str) -> Result<Vec<ClassSession>> {
        self.connection
            .ensure_owner_file_exists(owner_id, SESSIONS_FILE, SESSIONS_HEADER)?;

        let file_path = self.connection.owner_file_path(owner_id, SESSIONS_FILE);
        let file = File::open(&file_path)?;
        let reader = BufReader::new(file);
        let mut csv_reader = Reader::from_reader(reader);

        let mut sessions = Vec::new();
        for result in csv_reader.records() {
            let record = result?;

            let date_str = record.get(2).unwrap_or("");
            let kind = match record.get(4).unwrap_or("") {
                "group" => SessionKind::Group,
                _ => SessionKind::Individual,
            };
            let rate = record
                .get(5)
                .filter(|v| !v.is_empty())
                .and_then(|v| v.parse::<f64>().ok());
            let notes = record
                .get(6)
                .filter(|v| !v.is_empty())
                .map(|v| v.to_string());

            let session = ClassSession {
                id: record.get(0).unwrap_or("").to_string(),
                participants: group::decode(record.get(1).unwrap_or("")),
                date: NaiveDateTime::parse_from_str(date_str, SESSION_DATE_FORMAT)
                    .with_context(|| format!("Invalid date in sessions.csv: {}", date_str))?,
                duration_hours: record.get(3).unwrap_or("0").parse::<f64>().unwrap_or(0.0),
                kind,
                rate,
                notes,
                owner_id: record.get(7).unwrap_or("").to_string(),
            };
            sessions.push(session);
        }

        Ok(sessions)
    }

    fn write_sessions(&self, owner_id: &str, sessions: &[ClassSession]) -> Result<()> {
        let file_path = self.connection.owner_file_path(owner_id, SESSIONS_FILE);
        let temp_path = file_path.with_extension("tmp");

        {
            let file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&temp_path)?;
            let writer = BufWriter::new(file);
            let mut csv_writer = Writer::from_writer(writer);

            csv_writer.write_record(SESSIONS_HEADER)?;
            for session in sessions {
                let kind = match session.kind {
                    SessionKind::Individual => "individual",
                    SessionKind::Group => "group",
                };
                let participant_ref = group::encode(&session.participants);
                let date = session.date.format(SESSION_DATE_FORMAT).to_string();
                let duration = session.duration_hours.to_string();
                let rate = session.rate.map(|r| r.to_string()).unwrap_or_default();
                csv_writer.write_record(&[
                    session.id.as_str(),
                    participant_ref.as_str(),
                    date.as_str(),
                    duration.as_str(),
                    kind,
                    rate.as_str(),
                    session.notes.as_deref().unwrap_or(""),
                    session.owner_id.as_str(),
                ])?;
            }
            csv_writer.flush()?;
        }

        std::fs::rename(&temp_path, &file_path)?;
        Ok(())
    }
}

impl SessionStorage for SessionRepository {
    fn store_session(&self, session: &ClassSession) -> Result<()> {
        let mut sessions = self.read_sessions(&session.owner_id)?;
        sessions.push(session.clone());

        // Keep chronological order on disk
        sessions.sort_by(|a, b| a.date.cmp(&b.date));
        self.write_sessions(&session.owner_id, &sessions)?;

        info!("Stored session {} at {}", session.id, session.date);
        Ok(())
    }

    fn get_session(&self, owner_id: &str, session_id: &str) -> Result<Option<ClassSession>> {
        let sessions = self.read_sessions(owner_id)?;
        Ok(sessions.into_iter().find(|s| s.id == session_id))
    }

    fn list_sessions(&self, owner_id: &str) -> Result<Vec<ClassSession>> {
        let mut sessions = self.read_sessions(owner_id)?;
        sessions.sort_by(|a, b| a.date.cmp(&b.date));
        Ok(sessions)
    }

    fn list_sessions_in_range(
        &self,
        owner_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ClassSession>> {
        let sessions = self.list_sessions(owner_id)?;
        Ok(sessions
            .into_iter()
            .filter(|s| {
                let day = s.date.date();
                day >= start && day <= end
            })
            .collect())
    }

    fn delete_session(&self, owner_id: &str, session_id: &str) -> Result<bool> {
        let mut sessions = self.read_sessions(owner_id)?;
        let before = sessions.len();
        sessions.retain(|s| s.id != session_id);

        if sessions.len() == before {
            return Ok(false);
        }

        self.write_sessions(owner_id, &sessions)?;
        info!("Deleted session {}", session_id);
        Ok(true)
    }

    fn delete_sessions(&self, owner_id: &str, session_ids: &[String]) -> Result<u32> {
        let mut sessions = self.read_sessions(owner_id)?;
        let before = sessions.len();
        sessions.retain(|s| !session_ids.contains(&s.id));
        let deleted = (before - sessions.len()) as u32;

        if deleted > 0 {
            self.write_sessions(owner_id, &sessions)?;
            info!("Deleted {} sessions", deleted);
        }
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::csv::test_utils;
    use tempfile::TempDir;

    fn setup() -> (SessionRepository, TempDir) {
        let (connection, temp_dir) = test_utils::test_connection();
        (SessionRepository::new(connection), temp_dir)
    }

    #[test]
    fn test_store_and_read_roundtrip() {
        let (repo, _dir) = setup();
        let session = test_utils::group_session(
            "session::1",
            &["student::1", "student::2"],
            "2024-03-05T10:00:00",
            1.5,
            "user::1",
        );

        repo.store_session(&session).unwrap();

        let loaded = repo.get_session("user::1", "session::1").unwrap().unwrap();
        assert_eq!(loaded.participants, vec!["student::1", "student::2"]);
        assert_eq!(loaded.date, session.date);
        assert_eq!(loaded.duration_hours, 1.5);
        assert_eq!(loaded.kind, SessionKind::Group);
        assert_eq!(loaded.rate, None);
    }

    #[test]
    fn test_stored_zero_rate_survives_roundtrip() {
        let (repo, _dir) = setup();
        let mut session = test_utils::individual_session(
            "session::1",
            "student::1",
            "2024-03-05T10:00:00",
            1.0,
            "user::1",
        );
        session.rate = Some(0.0);

        repo.store_session(&session).unwrap();

        let loaded = repo.get_session("user::1", "session::1").unwrap().unwrap();
        // 0 is a real rate, distinct from "no stored rate"
        assert_eq!(loaded.rate, Some(0.0));
    }

    #[test]
    fn test_list_sessions_chronological() {
        let (repo, _dir) = setup();
        repo.store_session(&test_utils::individual_session(
            "session::late",
            "student::1",
            "2024-03-07T09:00:00",
            1.0,
            "user::1",
        ))
        .unwrap();
        repo.store_session(&test_utils::individual_session(
            "session::early",
            "student::1",
            "2024-03-05T09:00:00",
            1.0,
            "user::1",
        ))
        .unwrap();

        let sessions = repo.list_sessions("user::1").unwrap();
        assert_eq!(sessions[0].id, "session::early");
        assert_eq!(sessions[1].id, "session::late");
    }

    #[test]
    fn test_list_sessions_in_range_inclusive() {
        let (repo, _dir) = setup();
        for (id, date) in [
            ("session::a", "2024-03-04T09:00:00"),
            ("session::b", "2024-03-10T09:00:00"),
            ("session::c", "2024-03-11T09:00:00"),
        ] {
            repo.store_session(&test_utils::individual_session(
                id,
                "student::1",
                date,
                1.0,
                "user::1",
            ))
            .unwrap();
        }

        let week = repo
            .list_sessions_in_range(
                "user::1",
                NaiveDate::from_ymd_opt(2024, 3, 4).unwrap(),
                NaiveDate::from_ymd_opt(2024, 3, 10).unwrap(),
            )
            .unwrap();
        let ids: Vec<&str> = week.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["session::a", "session::b"]);
    }

    #[test]
    fn test_delete_sessions_bulk() {
        let (repo, _dir) = setup();
        for id in ["session::a", "session::b", "session::c"] {
            repo.store_session(&test_utils::individual_session(
                id,
                "student::1",
                "2024-03-05T09:00:00",
                1.0,
                "user::1",
            ))
            .unwrap();
        }

        let deleted = repo
            .delete_sessions(
                "user::1",
                &["session::a".to_string(), "session::c".to_string(), "session::x".to_string()],
            )
            .unwrap();
        assert_eq!(deleted, 2);
        assert_eq!(repo.list_sessions("user::1").unwrap().len(), 1);
    }

    #[test]
    fn test_notes_with_commas_survive_roundtrip() {
        let (repo, _dir) = setup();
        let mut session = test_utils::individual_session(
            "session::1",
            "student::1",
            "2024-03-05T10:00:00",
            1.0,
            "user::1",
        );
        session.notes = Some("bring book, review unit 3".to_string());

        repo.store_session(&session).unwrap();

        let loaded = repo.get_session("user::1", "session::1").unwrap().unwrap();
        assert_eq!(loaded.notes.as_deref(), Some("bring book, review unit 3"));
    }
}
