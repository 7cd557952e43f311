use anyhow::Result;
use chrono::{Duration, NaiveDate, Timelike};
use log::info;
use std::sync::Arc;

use crate::domain::commands::sessions::{
    DeleteSessionCommand, DeleteSessionResult, MonthSessionsQuery, ScheduleSessionCommand,
    ScheduleSessionResult, ScheduleSlotCommand, SessionListResult, WeekSessionsQuery,
};
use crate::domain::errors::DomainError;
use crate::domain::models::session::{ClassSession, SessionKind};
use crate::domain::month_calendar;
use crate::domain::session_index::SessionIndex;
use crate::domain::time_grid;
use crate::storage::traits::{Connection, SessionStorage, StudentStorage};

/// Service for scheduling and querying class sessions.
///
/// Two creation paths exist on purpose. The grid popover targets a whole
/// hour and refuses an occupied slot; the dialog accepts any half-hour
/// start and never rejects overlap, so two sessions may compete for the
/// same slot at sub-hour precision and are only rendered in competing
/// positions.
#[derive(Clone)]
pub struct SessionService<C: Connection> {
    session_repository: C::SessionRepository,
    student_repository: C::StudentRepository,
}

impl<C: Connection> SessionService<C> {
    pub fn new(connection: Arc<C>) -> Self {
        Self {
            session_repository: connection.create_session_repository(),
            student_repository: connection.create_student_repository(),
        }
    }

    /// Schedule a session into a whole-hour grid slot.
    pub fn schedule_slot_session(
        &self,
        command: ScheduleSlotCommand,
    ) -> Result<ScheduleSessionResult> {
        info!(
            "Scheduling slot session: week_start={} day_index={} hour={} kind={:?}",
            command.week_start, command.day_index, command.hour, command.kind
        );

        if command.day_index >= time_grid::DAYS_PER_WEEK {
            return Err(anyhow::anyhow!("Invalid day index: {}", command.day_index));
        }
        if command.hour > 23 {
            return Err(anyhow::anyhow!("Invalid hour: {}", command.hour));
        }

        let date =
            time_grid::cell_to_datetime(command.week_start, command.day_index, command.hour, 0);
        let day = date.date();

        let occupied = SessionIndex::new(self.session_repository.list_sessions_in_range(
            &command.owner_id,
            day,
            day,
        )?);
        if occupied.find_at(day, command.hour).is_some() {
            return Err(DomainError::SlotOccupied {
                day: day.to_string(),
                hour: command.hour,
            }
            .into());
        }

        self.schedule_session(ScheduleSessionCommand {
            owner_id: command.owner_id,
            date,
            participant_ids: command.participant_ids,
            duration_hours: command.duration_hours,
            kind: command.kind,
            rate: command.rate,
            notes: command.notes,
        })
    }

    /// Schedule a session at an arbitrary half-hour start. Overlap is
    /// never rejected on this path.
    pub fn schedule_session(
        &self,
        command: ScheduleSessionCommand,
    ) -> Result<ScheduleSessionResult> {
        info!(
            "Scheduling session: date={} kind={:?} participants={}",
            command.date,
            command.kind,
            command.participant_ids.len()
        );

        self.validate_participants(command.kind, &command.participant_ids)?;
        self.validate_duration(command.duration_hours)?;

        // Participants must exist at creation time. They may be deleted
        // later; historical sessions then carry dangling ids.
        for participant_id in &command.participant_ids {
            self.student_repository
                .get_student(&command.owner_id, participant_id)?
                .ok_or_else(|| DomainError::not_found("student", participant_id.clone()))?;
        }

        let session = ClassSession {
            id: ClassSession::generate_id(),
            participants: command.participant_ids,
            date: command.date.with_second(0).unwrap(),
            duration_hours: command.duration_hours,
            kind: command.kind,
            rate: command.rate,
            notes: command.notes,
            owner_id: command.owner_id,
        };

        self.session_repository.store_session(&session)?;

        info!("Scheduled session {} at {}", session.id, session.date);
        Ok(ScheduleSessionResult {
            success_message: format!("Session scheduled for {}", session.date),
            session,
        })
    }

    /// Sessions of the week starting at the given Monday
    pub fn list_week_sessions(&self, query: WeekSessionsQuery) -> Result<SessionListResult> {
        let sessions = self.session_repository.list_sessions_in_range(
            &query.owner_id,
            query.week_start,
            query.week_start + Duration::days(6),
        )?;
        Ok(SessionListResult { sessions })
    }

    /// Sessions of one calendar month
    pub fn list_month_sessions(&self, query: MonthSessionsQuery) -> Result<SessionListResult> {
        let first = NaiveDate::from_ymd_opt(query.year, query.month, 1)
            .ok_or_else(|| anyhow::anyhow!("Invalid month: {}/{}", query.month, query.year))?;
        let last = NaiveDate::from_ymd_opt(
            query.year,
            query.month,
            month_calendar::days_in_month(query.month, query.year),
        )
        .ok_or_else(|| anyhow::anyhow!("Invalid month: {}/{}", query.month, query.year))?;

        let sessions =
            self.session_repository
                .list_sessions_in_range(&query.owner_id, first, last)?;
        Ok(SessionListResult { sessions })
    }

    /// Delete a session by id
    pub fn delete_session(&self, command: DeleteSessionCommand) -> Result<DeleteSessionResult> {
        info!("Deleting session: {}", command.session_id);

        if !self
            .session_repository
            .delete_session(&command.owner_id, &command.session_id)?
        {
            return Err(DomainError::not_found("session", command.session_id).into());
        }

        Ok(DeleteSessionResult {
            success_message: "Session deleted successfully".to_string(),
        })
    }

    fn validate_participants(&self, kind: SessionKind, participant_ids: &[String]) -> Result<()> {
        match kind {
            SessionKind::Individual => {
                if participant_ids.len() != 1 {
                    return Err(anyhow::anyhow!(
                        "An individual session takes exactly one participant, got {}",
                        participant_ids.len()
                    ));
                }
            }
            SessionKind::Group => {
                if participant_ids.is_empty() {
                    return Err(anyhow::anyhow!(
                        "A group session takes at least one participant"
                    ));
                }
            }
        }
        if participant_ids.iter().any(|id| id.trim().is_empty()) {
            return Err(anyhow::anyhow!("Participant ids cannot be empty"));
        }
        Ok(())
    }

    fn validate_duration(&self, duration_hours: f64) -> Result<()> {
        let is_half_hour_multiple = (duration_hours * 2.0).fract() == 0.0;
        if duration_hours <= 0.0 || !is_half_hour_multiple {
            return Err(anyhow::anyhow!(
                "Duration must be a positive multiple of 0.5 hours, got {}",
                duration_hours
            ));
        }
        Ok(())
    }
}
