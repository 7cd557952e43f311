use anyhow::Result;
use log::info;
use std::sync::Arc;

use crate::domain::billing::coerce_numeric_input;
use crate::domain::commands::ledger::{
    AddWeekCommand, AddWeekResult, MonthRecordsQuery, MonthRecordsResult, UpdateRecordCommand,
    UpdateRecordResult,
};
use crate::domain::errors::DomainError;
use crate::domain::models::rate::{DEFAULT_GROUP_RATE, DEFAULT_INDIVIDUAL_RATE};
use crate::domain::models::weekly_record::WeeklyRecord;
use crate::domain::week_cursor;
use crate::storage::traits::{Connection, StudentStorage, WeeklyRecordStorage};

/// Service for the weekly ledger rows of the monthly view.
#[derive(Clone)]
pub struct LedgerService<C: Connection> {
    record_repository: C::WeeklyRecordRepository,
    student_repository: C::StudentRepository,
}

impl<C: Connection> LedgerService<C> {
    pub fn new(connection: Arc<C>) -> Self {
        Self {
            record_repository: connection.create_weekly_record_repository(),
            student_repository: connection.create_student_repository(),
        }
    }

    /// Add the next week of ledger rows: one zero-hour row per existing
    /// student, carrying the default rates.
    pub fn add_week(&self, command: AddWeekCommand) -> Result<AddWeekResult> {
        info!("Adding ledger week for {}/{}", command.month, command.year);

        let existing =
            self.record_repository
                .list_records_for_month(&command.owner_id, command.month, command.year)?;
        let existing_weeks: Vec<u32> = existing.iter().map(|r| r.week_number).collect();
        let week_number = week_cursor::next_week_number(&existing_weeks);

        let students = self.student_repository.list_students(&command.owner_id)?;

        let mut records = Vec::new();
        for student in &students {
            let record = WeeklyRecord {
                id: WeeklyRecord::generate_id(),
                student_id: student.id.clone(),
                owner_id: command.owner_id.clone(),
                week_number,
                month: command.month,
                year: command.year,
                individual_hours: 0.0,
                group_hours: 0.0,
                individual_rate: Some(DEFAULT_INDIVIDUAL_RATE),
                group_rate: Some(DEFAULT_GROUP_RATE),
            };
            self.record_repository.store_record(&record)?;
            records.push(record);
        }

        info!(
            "Added week {} with {} rows for {}/{}",
            week_number,
            records.len(),
            command.month,
            command.year
        );

        Ok(AddWeekResult {
            success_message: format!("Week {} added with {} students", week_number, records.len()),
            records,
            week_number,
        })
    }

    /// Edit the hours or rates of one record. Raw input that does not
    /// parse as a number is stored as 0; bad input is never rejected.
    /// Last writer wins.
    pub fn update_record(&self, command: UpdateRecordCommand) -> Result<UpdateRecordResult> {
        info!("Updating weekly record: {}", command.record_id);

        let mut record = self
            .record_repository
            .get_record(&command.owner_id, &command.record_id)?
            .ok_or_else(|| DomainError::not_found("weekly record", command.record_id.clone()))?;

        if let Some(raw) = command.individual_hours {
            record.individual_hours = coerce_numeric_input(&raw);
        }
        if let Some(raw) = command.group_hours {
            record.group_hours = coerce_numeric_input(&raw);
        }
        if let Some(raw) = command.individual_rate {
            record.individual_rate = Some(coerce_numeric_input(&raw));
        }
        if let Some(raw) = command.group_rate {
            record.group_rate = Some(coerce_numeric_input(&raw));
        }

        self.record_repository.update_record(&record)?;

        Ok(UpdateRecordResult {
            success_message: "Record updated successfully".to_string(),
            record,
        })
    }

    /// The ledger rows of one month
    pub fn list_month_records(&self, query: MonthRecordsQuery) -> Result<MonthRecordsResult> {
        let records =
            self.record_repository
                .list_records_for_month(&query.owner_id, query.month, query.year)?;
        Ok(MonthRecordsResult { records })
    }

    /// The ledger week numbers already present in a month
    pub fn existing_week_numbers(&self, owner_id: &str, month: u32, year: i32) -> Result<Vec<u32>> {
        let records = self
            .record_repository
            .list_records_for_month(owner_id, month, year)?;
        let mut weeks: Vec<u32> = records.iter().map(|r| r.week_number).collect();
        weeks.sort_unstable();
        weeks.dedup();
        Ok(weeks)
    }
}
