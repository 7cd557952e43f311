use anyhow::Result;
use chrono::NaiveDate;
use log::info;
use std::sync::Arc;

use crate::domain::billing::BillingAggregator;
use crate::domain::commands::billing::{
    MonthLedgerQuery, MonthLedgerResult, RecordTotal, StudentMonthTotal,
    StudentSessionTotalQuery, StudentSessionTotalResult,
};
use crate::domain::month_calendar;
use crate::domain::session_index::SessionIndex;
use crate::storage::traits::{
    Connection, RateStorage, SessionStorage, StudentStorage, WeeklyRecordStorage,
};

/// Read-side service for billing totals.
///
/// Loads the rows of the requested window and delegates every sum to the
/// [`BillingAggregator`], so the weekly-ledger view and the session-ledger
/// view share one rate-fallback implementation.
#[derive(Clone)]
pub struct BillingService<C: Connection> {
    student_repository: C::StudentRepository,
    session_repository: C::SessionRepository,
    record_repository: C::WeeklyRecordRepository,
    rate_repository: C::RateRepository,
}

impl<C: Connection> BillingService<C> {
    pub fn new(connection: Arc<C>) -> Self {
        Self {
            student_repository: connection.create_student_repository(),
            session_repository: connection.create_session_repository(),
            record_repository: connection.create_weekly_record_repository(),
            rate_repository: connection.create_rate_repository(),
        }
    }

    fn aggregator(&self, owner_id: &str) -> Result<BillingAggregator> {
        Ok(BillingAggregator::new(
            self.rate_repository.list_rates(owner_id)?,
        ))
    }

    /// The monthly ledger: every record of the month plus the per-student
    /// totals and the grand total over the owner's students.
    pub fn month_ledger(&self, query: MonthLedgerQuery) -> Result<MonthLedgerResult> {
        let records =
            self.record_repository
                .list_records_for_month(&query.owner_id, query.month, query.year)?;
        let students = self.student_repository.list_students(&query.owner_id)?;
        let billing = self.aggregator(&query.owner_id)?;

        let record_totals: Vec<RecordTotal> = records
            .iter()
            .map(|record| RecordTotal {
                record_id: record.id.clone(),
                total: billing.week_total(record),
            })
            .collect();

        let student_totals: Vec<StudentMonthTotal> = students
            .iter()
            .map(|student| StudentMonthTotal {
                student_id: student.id.clone(),
                student_name: student.name.clone(),
                total: billing.student_month_total_from_records(
                    &student.id,
                    query.month,
                    query.year,
                    &records,
                ),
            })
            .collect();

        let grand_total: f64 = student_totals.iter().map(|t| t.total).sum();

        info!(
            "Month ledger {}/{}: {} records, grand total {:.2}",
            query.month,
            query.year,
            records.len(),
            grand_total
        );

        Ok(MonthLedgerResult {
            records,
            record_totals,
            student_totals,
            grand_total,
        })
    }

    /// One student's monthly total computed from the session ledger,
    /// optionally restricted to one session kind.
    pub fn student_session_total(
        &self,
        query: StudentSessionTotalQuery,
    ) -> Result<StudentSessionTotalResult> {
        let first = NaiveDate::from_ymd_opt(query.year, query.month, 1)
            .ok_or_else(|| anyhow::anyhow!("Invalid month: {}/{}", query.month, query.year))?;
        let last = NaiveDate::from_ymd_opt(
            query.year,
            query.month,
            month_calendar::days_in_month(query.month, query.year),
        )
        .ok_or_else(|| anyhow::anyhow!("Invalid month: {}/{}", query.month, query.year))?;

        let index = SessionIndex::new(self.session_repository.list_sessions_in_range(
            &query.owner_id,
            first,
            last,
        )?);
        let billing = self.aggregator(&query.owner_id)?;

        let total = billing.student_month_total_from_sessions(
            &query.student_id,
            query.month,
            query.year,
            &index,
            query.kind,
        );

        Ok(StudentSessionTotalResult { total })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::commands::ledger::{AddWeekCommand, UpdateRecordCommand};
    use crate::domain::commands::rates::SetRateCommand;
    use crate::domain::commands::sessions::ScheduleSessionCommand;
    use crate::domain::commands::students::{CreateStudentCommand, DeleteStudentCommand};
    use crate::domain::ledger_service::LedgerService;
    use crate::domain::models::session::SessionKind;
    use crate::domain::rate_service::RateService;
    use crate::domain::session_service::SessionService;
    use crate::domain::student_service::StudentService;
    use crate::storage::csv::test_utils;
    use crate::storage::csv::CsvConnection;
    use chrono::NaiveDateTime;

    struct Services {
        students: StudentService<CsvConnection>,
        sessions: SessionService<CsvConnection>,
        ledger: LedgerService<CsvConnection>,
        billing: BillingService<CsvConnection>,
        rates: RateService<CsvConnection>,
    }

    fn setup() -> (Services, tempfile::TempDir) {
        let (connection, temp_dir) = test_utils::test_connection();
        let connection = Arc::new(connection);
        (
            Services {
                students: StudentService::new(connection.clone()),
                sessions: SessionService::new(connection.clone()),
                ledger: LedgerService::new(connection.clone()),
                billing: BillingService::new(connection.clone()),
                rates: RateService::new(connection),
            },
            temp_dir,
        )
    }

    fn create_student(services: &Services, name: &str) -> String {
        services
            .students
            .create_student(CreateStudentCommand {
                owner_id: "user::1".to_string(),
                name: name.to_string(),
            })
            .unwrap()
            .student
            .id
    }

    #[test]
    fn test_month_ledger_totals() {
        let (services, _dir) = setup();
        let ana = create_student(&services, "Ana");
        let _bruno = create_student(&services, "Bruno");

        let week = services
            .ledger
            .add_week(AddWeekCommand {
                owner_id: "user::1".to_string(),
                month: 3,
                year: 2024,
            })
            .unwrap();

        // Ana taught 2 individual hours at the stored default rate
        let ana_record = week
            .records
            .iter()
            .find(|r| r.student_id == ana)
            .unwrap()
            .clone();
        services
            .ledger
            .update_record(UpdateRecordCommand {
                owner_id: "user::1".to_string(),
                record_id: ana_record.id,
                individual_hours: Some("2".to_string()),
                ..Default::default()
            })
            .unwrap();

        let result = services
            .billing
            .month_ledger(MonthLedgerQuery {
                owner_id: "user::1".to_string(),
                month: 3,
                year: 2024,
            })
            .unwrap();

        assert_eq!(result.grand_total, 28.0);
        let ana_total = result
            .student_totals
            .iter()
            .find(|t| t.student_id == ana)
            .unwrap();
        assert_eq!(ana_total.total, 28.0);
    }

    #[test]
    fn test_month_ledger_respects_rate_override_and_zero_rate() {
        let (services, _dir) = setup();
        let ana = create_student(&services, "Ana");
        let bruno = create_student(&services, "Bruno");

        let week = services
            .ledger
            .add_week(AddWeekCommand {
                owner_id: "user::1".to_string(),
                month: 3,
                year: 2024,
            })
            .unwrap();

        for record in &week.records {
            services
                .ledger
                .update_record(UpdateRecordCommand {
                    owner_id: "user::1".to_string(),
                    record_id: record.id.clone(),
                    individual_hours: Some("1".to_string()),
                    ..Default::default()
                })
                .unwrap();
        }

        // Ana has an override; Bruno's stored rate is edited to 0 and
        // must be billed at 0, not fall through to the default
        services
            .rates
            .set_rate(SetRateCommand {
                owner_id: "user::1".to_string(),
                student_id: ana.clone(),
                individual_rate: Some(20.0),
                group_rate: None,
            })
            .unwrap();
        let bruno_record = week
            .records
            .iter()
            .find(|r| r.student_id == bruno)
            .unwrap();
        services
            .ledger
            .update_record(UpdateRecordCommand {
                owner_id: "user::1".to_string(),
                record_id: bruno_record.id.clone(),
                individual_rate: Some("0".to_string()),
                ..Default::default()
            })
            .unwrap();

        let result = services
            .billing
            .month_ledger(MonthLedgerQuery {
                owner_id: "user::1".to_string(),
                month: 3,
                year: 2024,
            })
            .unwrap();

        assert_eq!(result.grand_total, 20.0);
    }

    #[test]
    fn test_student_session_total_ana_scenario() {
        // Ana with individual override 20 and one 1.5h session with no
        // stored rate in March: total 30
        let (services, _dir) = setup();
        let ana = create_student(&services, "Ana");

        services
            .rates
            .set_rate(SetRateCommand {
                owner_id: "user::1".to_string(),
                student_id: ana.clone(),
                individual_rate: Some(20.0),
                group_rate: None,
            })
            .unwrap();
        services
            .sessions
            .schedule_session(ScheduleSessionCommand {
                owner_id: "user::1".to_string(),
                date: NaiveDateTime::parse_from_str("2024-03-12T09:00:00", "%Y-%m-%dT%H:%M:%S")
                    .unwrap(),
                participant_ids: vec![ana.clone()],
                duration_hours: 1.5,
                kind: SessionKind::Individual,
                rate: None,
                notes: None,
            })
            .unwrap();

        let result = services
            .billing
            .student_session_total(StudentSessionTotalQuery {
                owner_id: "user::1".to_string(),
                student_id: ana,
                month: 3,
                year: 2024,
                kind: Some(SessionKind::Individual),
            })
            .unwrap();
        assert_eq!(result.total, 30.0);
    }

    #[test]
    fn test_grand_total_recomputes_after_student_deletion() {
        let (services, _dir) = setup();
        let ana = create_student(&services, "Ana");
        let _bruno = create_student(&services, "Bruno");

        let week = services
            .ledger
            .add_week(AddWeekCommand {
                owner_id: "user::1".to_string(),
                month: 3,
                year: 2024,
            })
            .unwrap();
        for record in &week.records {
            services
                .ledger
                .update_record(UpdateRecordCommand {
                    owner_id: "user::1".to_string(),
                    record_id: record.id.clone(),
                    individual_hours: Some("1".to_string()),
                    ..Default::default()
                })
                .unwrap();
        }

        let before = services
            .billing
            .month_ledger(MonthLedgerQuery {
                owner_id: "user::1".to_string(),
                month: 3,
                year: 2024,
            })
            .unwrap();
        assert_eq!(before.grand_total, 28.0);

        services
            .students
            .delete_student(DeleteStudentCommand {
                owner_id: "user::1".to_string(),
                student_id: ana,
            })
            .unwrap();

        let after = services
            .billing
            .month_ledger(MonthLedgerQuery {
                owner_id: "user::1".to_string(),
                month: 3,
                year: 2024,
            })
            .unwrap();
        // Ana's weekly records are gone and the grand total dropped
        assert_eq!(after.grand_total, 14.0);
        assert_eq!(after.records.len(), 1);
    }
}
