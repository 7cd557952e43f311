use anyhow::Result;
use chrono::Utc;
use log::{info, warn};
use std::sync::Arc;

use crate::domain::commands::students::{
    CreateStudentCommand, CreateStudentResult, DeleteStudentCommand, DeleteStudentResult,
    ListStudentsQuery, ListStudentsResult,
};
use crate::domain::errors::DomainError;
use crate::domain::models::session::SessionKind;
use crate::domain::models::student::Student;
use crate::storage::traits::{
    Connection, RateStorage, SessionStorage, StudentStorage, WeeklyRecordStorage,
};

/// Service for managing the tutor's students
#[derive(Clone)]
pub struct StudentService<C: Connection> {
    student_repository: C::StudentRepository,
    session_repository: C::SessionRepository,
    record_repository: C::WeeklyRecordRepository,
    rate_repository: C::RateRepository,
}

impl<C: Connection> StudentService<C> {
    pub fn new(connection: Arc<C>) -> Self {
        Self {
            student_repository: connection.create_student_repository(),
            session_repository: connection.create_session_repository(),
            record_repository: connection.create_weekly_record_repository(),
            rate_repository: connection.create_rate_repository(),
        }
    }

    /// Create a new student
    pub fn create_student(&self, command: CreateStudentCommand) -> Result<CreateStudentResult> {
        info!("Creating student: name={}", command.name);

        self.validate_name(&command.name)?;

        let now = Utc::now();
        let student = Student {
            id: Student::generate_id(now.timestamp_millis() as u64),
            name: command.name.trim().to_string(),
            owner_id: command.owner_id,
            created_at: now,
            updated_at: now,
        };

        self.student_repository.store_student(&student)?;

        info!("Created student: {} with ID: {}", student.name, student.id);
        Ok(CreateStudentResult { student })
    }

    /// List the owner's students
    pub fn list_students(&self, query: ListStudentsQuery) -> Result<ListStudentsResult> {
        let students = self.student_repository.list_students(&query.owner_id)?;
        info!("Found {} students", students.len());
        Ok(ListStudentsResult { students })
    }

    /// Delete a student and cascade its dependent rows.
    ///
    /// Removes the student's individual sessions, weekly records and rate
    /// override. Group sessions the student took part in are kept; their
    /// dangling participant id resolves to the unknown-student label.
    pub fn delete_student(&self, command: DeleteStudentCommand) -> Result<DeleteStudentResult> {
        info!("Deleting student: {}", command.student_id);

        let student = self
            .student_repository
            .get_student(&command.owner_id, &command.student_id)?
            .ok_or_else(|| DomainError::not_found("student", command.student_id.clone()))?;

        let individual_session_ids: Vec<String> = self
            .session_repository
            .list_sessions(&command.owner_id)?
            .into_iter()
            .filter(|s| s.kind == SessionKind::Individual && s.involves_student(&student.id))
            .map(|s| s.id)
            .collect();

        let removed_sessions = self
            .session_repository
            .delete_sessions(&command.owner_id, &individual_session_ids)?
            as usize;
        let removed_records = self
            .record_repository
            .delete_records_for_student(&command.owner_id, &student.id)?
            as usize;
        if self
            .rate_repository
            .delete_rate(&command.owner_id, &student.id)?
        {
            info!("Removed rate override for student {}", student.id);
        }

        if !self
            .student_repository
            .delete_student(&command.owner_id, &student.id)?
        {
            warn!("Student disappeared during cascade delete: {}", student.id);
        }

        info!(
            "Deleted student {} ({} sessions, {} records removed)",
            student.id, removed_sessions, removed_records
        );

        Ok(DeleteStudentResult {
            removed_sessions,
            removed_records,
            success_message: format!("Student '{}' deleted successfully", student.name),
        })
    }

    /// Validate a student name
    fn validate_name(&self, name: &str) -> Result<()> {
        if name.trim().is_empty() {
            return Err(anyhow::anyhow!("Student name cannot be empty"));
        }
        if name.len() > 100 {
            return Err(anyhow::anyhow!("Student name cannot exceed 100 characters"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::commands::sessions::ScheduleSessionCommand;
    use crate::domain::session_service::SessionService;
    use crate::storage::csv::test_utils;
    use crate::storage::csv::CsvConnection;
    use chrono::NaiveDateTime;

    fn setup() -> (StudentService<CsvConnection>, SessionService<CsvConnection>, tempfile::TempDir)
    {
        let (connection, temp_dir) = test_utils::test_connection();
        let connection = Arc::new(connection);
        (
            StudentService::new(connection.clone()),
            SessionService::new(connection),
            temp_dir,
        )
    }

    fn create(service: &StudentService<CsvConnection>, name: &str) -> Student {
        service
            .create_student(CreateStudentCommand {
                owner_id: "user::1".to_string(),
                name: name.to_string(),
            })
            .unwrap()
            .student
    }

    #[test]
    fn test_create_student_trims_name() {
        let (service, _, _dir) = setup();
        let student = create(&service, "  Ana  ");
        assert_eq!(student.name, "Ana");
        assert!(student.id.starts_with("student::"));
    }

    #[test]
    fn test_create_student_validation() {
        let (service, _, _dir) = setup();

        let empty = CreateStudentCommand {
            owner_id: "user::1".to_string(),
            name: "   ".to_string(),
        };
        assert!(service.create_student(empty).is_err());

        let too_long = CreateStudentCommand {
            owner_id: "user::1".to_string(),
            name: "a".repeat(101),
        };
        assert!(service.create_student(too_long).is_err());
    }

    #[test]
    fn test_list_students() {
        let (service, _, _dir) = setup();
        create(&service, "Bruno");
        create(&service, "Ana");

        let result = service
            .list_students(ListStudentsQuery {
                owner_id: "user::1".to_string(),
            })
            .unwrap();
        let names: Vec<&str> = result.students.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Ana", "Bruno"]);
    }

    #[test]
    fn test_delete_nonexistent_student() {
        let (service, _, _dir) = setup();
        let result = service.delete_student(DeleteStudentCommand {
            owner_id: "user::1".to_string(),
            student_id: "student::404".to_string(),
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_delete_student_cascades_individual_sessions_and_keeps_group() {
        let (students, sessions, _dir) = setup();
        let ana = create(&students, "Ana");
        let bruno = create(&students, "Bruno");

        let schedule = |participants: Vec<String>, kind: SessionKind, date: &str| {
            sessions
                .schedule_session(ScheduleSessionCommand {
                    owner_id: "user::1".to_string(),
                    date: NaiveDateTime::parse_from_str(date, "%Y-%m-%dT%H:%M:%S").unwrap(),
                    participant_ids: participants,
                    duration_hours: 1.0,
                    kind,
                    rate: None,
                    notes: None,
                })
                .unwrap()
        };

        schedule(vec![ana.id.clone()], SessionKind::Individual, "2024-03-05T09:00:00");
        schedule(vec![ana.id.clone()], SessionKind::Individual, "2024-03-07T09:00:00");
        schedule(
            vec![ana.id.clone(), bruno.id.clone()],
            SessionKind::Group,
            "2024-03-08T10:00:00",
        );

        let result = students
            .delete_student(DeleteStudentCommand {
                owner_id: "user::1".to_string(),
                student_id: ana.id.clone(),
            })
            .unwrap();
        assert_eq!(result.removed_sessions, 2);

        // The group session survives with a dangling participant
        let remaining = sessions
            .list_month_sessions(crate::domain::commands::sessions::MonthSessionsQuery {
                owner_id: "user::1".to_string(),
                month: 3,
                year: 2024,
            })
            .unwrap();
        assert_eq!(remaining.sessions.len(), 1);
        assert!(remaining.sessions[0].involves_student(&ana.id));
    }
}
