use anyhow::Result;
use log::info;
use std::sync::Arc;

use crate::domain::commands::rates::{
    ClearRateCommand, ClearRateResult, GetRateQuery, GetRateResult, SetRateCommand, SetRateResult,
};
use crate::domain::errors::DomainError;
use crate::domain::models::rate::StudentRate;
use crate::storage::traits::{Connection, RateStorage, StudentStorage};

/// Service for per-student rate overrides
#[derive(Clone)]
pub struct RateService<C: Connection> {
    rate_repository: C::RateRepository,
    student_repository: C::StudentRepository,
}

impl<C: Connection> RateService<C> {
    pub fn new(connection: Arc<C>) -> Self {
        Self {
            rate_repository: connection.create_rate_repository(),
            student_repository: connection.create_student_repository(),
        }
    }

    /// Set (or replace) a student's rate override
    pub fn set_rate(&self, command: SetRateCommand) -> Result<SetRateResult> {
        info!("Setting rate override for student {}", command.student_id);

        let student = self
            .student_repository
            .get_student(&command.owner_id, &command.student_id)?
            .ok_or_else(|| DomainError::not_found("student", command.student_id.clone()))?;

        let rate = StudentRate {
            student_id: student.id.clone(),
            individual_rate: command.individual_rate,
            group_rate: command.group_rate,
        };
        self.rate_repository.store_rate(&command.owner_id, &rate)?;

        Ok(SetRateResult {
            success_message: format!("Rates updated for '{}'", student.name),
            rate,
        })
    }

    /// Get a student's rate override, if any
    pub fn get_rate(&self, query: GetRateQuery) -> Result<GetRateResult> {
        let rate = self
            .rate_repository
            .get_rate(&query.owner_id, &query.student_id)?;
        Ok(GetRateResult { rate })
    }

    /// Remove a student's rate override; billing falls back to row rates
    /// and defaults afterwards
    pub fn clear_rate(&self, command: ClearRateCommand) -> Result<ClearRateResult> {
        let removed = self
            .rate_repository
            .delete_rate(&command.owner_id, &command.student_id)?;

        if removed {
            info!("Cleared rate override for student {}", command.student_id);
        }

        Ok(ClearRateResult {
            removed,
            success_message: if removed {
                "Rate override removed".to_string()
            } else {
                "No rate override was set".to_string()
            },
        })
    }
}
