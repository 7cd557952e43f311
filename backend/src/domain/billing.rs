//! Billing aggregation.
//!
//! One aggregator serves both billing views: the weekly-ledger view over
//! [`WeeklyRecord`] rows and the session-ledger view over
//! [`ClassSession`] rows. Both go through the same rate-resolution chain
//! so the views cannot drift apart:
//!
//! student override -> rate stored on the row being evaluated -> default.
//!
//! The fallback triggers only on a missing rate, never on the value 0; a
//! stored rate of 0 is billed as 0. Sums keep full precision; rounding to
//! 2 decimals happens only in display formatting.

use std::collections::HashMap;

use crate::domain::models::rate::{default_rate, StudentRate};
use crate::domain::models::session::{ClassSession, SessionKind};
use crate::domain::models::weekly_record::WeeklyRecord;
use crate::domain::session_index::SessionIndex;

#[derive(Debug, Clone, Default)]
pub struct BillingAggregator {
    overrides: HashMap<String, StudentRate>,
}

impl BillingAggregator {
    pub fn new(overrides: Vec<StudentRate>) -> Self {
        Self {
            overrides: overrides
                .into_iter()
                .map(|r| (r.student_id.clone(), r))
                .collect(),
        }
    }

    /// Resolve the hourly rate for (student, kind) given the rate stored
    /// on the row under evaluation.
    pub fn resolve_rate(
        &self,
        student_id: &str,
        kind: SessionKind,
        row_rate: Option<f64>,
    ) -> f64 {
        if let Some(override_rate) = self
            .overrides
            .get(student_id)
            .and_then(|r| r.rate_for(kind))
        {
            return override_rate;
        }
        if let Some(rate) = row_rate {
            return rate;
        }
        default_rate(kind)
    }

    /// What one session costs the given participant
    pub fn session_total_for_student(&self, session: &ClassSession, student_id: &str) -> f64 {
        let rate = self.resolve_rate(student_id, session.kind, session.rate);
        session.duration_hours * rate
    }

    /// What one session costs its (first) participant. For group sessions
    /// every participant is billed the group rate; use
    /// [`Self::session_total_for_student`] per participant.
    pub fn session_total(&self, session: &ClassSession) -> f64 {
        match session.participants.first() {
            Some(student_id) => self.session_total_for_student(session, student_id),
            None => 0.0,
        }
    }

    /// Monetary total of one weekly ledger row
    pub fn week_total(&self, record: &WeeklyRecord) -> f64 {
        let individual_rate = self.resolve_rate(
            &record.student_id,
            SessionKind::Individual,
            record.individual_rate,
        );
        let group_rate =
            self.resolve_rate(&record.student_id, SessionKind::Group, record.group_rate);
        record.individual_hours * individual_rate + record.group_hours * group_rate
    }

    /// Monthly total for one student from the weekly ledger rows
    pub fn student_month_total_from_records(
        &self,
        student_id: &str,
        month: u32,
        year: i32,
        records: &[WeeklyRecord],
    ) -> f64 {
        records
            .iter()
            .filter(|r| r.student_id == student_id && r.month == month && r.year == year)
            .map(|r| self.week_total(r))
            .sum()
    }

    /// Monthly total for one student from the session ledger, optionally
    /// restricted to one session kind.
    pub fn student_month_total_from_sessions(
        &self,
        student_id: &str,
        month: u32,
        year: i32,
        index: &SessionIndex,
        kind: Option<SessionKind>,
    ) -> f64 {
        index
            .sessions_in_month(month, year)
            .iter()
            .filter(|s| s.involves_student(student_id))
            .filter(|s| kind.map_or(true, |k| s.kind == k))
            .map(|s| self.session_total_for_student(s, student_id))
            .sum()
    }

    /// Grand total over all of the owner's students for a month
    pub fn month_grand_total(
        &self,
        student_ids: &[String],
        month: u32,
        year: i32,
        records: &[WeeklyRecord],
    ) -> f64 {
        student_ids
            .iter()
            .map(|id| self.student_month_total_from_records(id, month, year, records))
            .sum()
    }
}

/// Coerce raw user input for an hours or rate field.
///
/// Anything that does not parse as a finite number becomes 0 before
/// storage; bad input is never rejected with a validation error. This is
/// deliberate, to favor quick data entry.
pub fn coerce_numeric_input(raw: &str) -> f64 {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn record(
        student_id: &str,
        week: u32,
        individual_hours: f64,
        group_hours: f64,
        individual_rate: Option<f64>,
        group_rate: Option<f64>,
    ) -> WeeklyRecord {
        WeeklyRecord {
            id: WeeklyRecord::generate_id(),
            student_id: student_id.to_string(),
            owner_id: "user-1".to_string(),
            week_number: week,
            month: 3,
            year: 2024,
            individual_hours,
            group_hours,
            individual_rate,
            group_rate,
        }
    }

    fn session(
        student_ids: &[&str],
        date: &str,
        duration: f64,
        kind: SessionKind,
        rate: Option<f64>,
    ) -> ClassSession {
        ClassSession {
            id: ClassSession::generate_id(),
            participants: student_ids.iter().map(|s| s.to_string()).collect(),
            date: NaiveDateTime::parse_from_str(date, "%Y-%m-%dT%H:%M:%S").unwrap(),
            duration_hours: duration,
            kind,
            rate,
            notes: None,
            owner_id: "user-1".to_string(),
        }
    }

    fn override_rate(student_id: &str, individual: Option<f64>, group: Option<f64>) -> StudentRate {
        StudentRate {
            student_id: student_id.to_string(),
            individual_rate: individual,
            group_rate: group,
        }
    }

    #[test]
    fn test_fallback_chain_order() {
        let billing = BillingAggregator::new(vec![override_rate("s1", Some(20.0), None)]);

        // Override wins over the row rate
        assert_eq!(
            billing.resolve_rate("s1", SessionKind::Individual, Some(16.0)),
            20.0
        );
        // No override for group: the row rate applies
        assert_eq!(billing.resolve_rate("s1", SessionKind::Group, Some(12.0)), 12.0);
        // No override, no row rate: hardcoded default
        assert_eq!(billing.resolve_rate("s2", SessionKind::Individual, None), 14.0);
        assert_eq!(billing.resolve_rate("s2", SessionKind::Group, None), 10.0);
    }

    #[test]
    fn test_stored_zero_rate_is_preserved() {
        // A rate of 0 is a real rate; the fallback triggers only on None
        let billing = BillingAggregator::new(vec![]);
        assert_eq!(
            billing.resolve_rate("s1", SessionKind::Individual, Some(0.0)),
            0.0
        );

        let rec = record("s1", 1, 3.0, 0.0, Some(0.0), None);
        assert_eq!(billing.week_total(&rec), 0.0);
    }

    #[test]
    fn test_session_total_with_override() {
        // Ana: individual override 20, a 1.5h session with no stored rate
        let billing = BillingAggregator::new(vec![override_rate("ana", Some(20.0), None)]);
        let s = session(&["ana"], "2024-03-05T09:00:00", 1.5, SessionKind::Individual, None);
        assert_eq!(billing.session_total(&s), 30.0);
    }

    #[test]
    fn test_week_total_is_linear_per_bucket() {
        let billing = BillingAggregator::new(vec![]);
        let base = record("s1", 1, 2.0, 3.0, Some(14.0), Some(10.0));
        let doubled = record("s1", 1, 4.0, 3.0, Some(14.0), Some(10.0));

        let base_total = billing.week_total(&base);
        let doubled_total = billing.week_total(&doubled);
        // Doubling the individual hours doubles only that contribution
        assert_eq!(doubled_total - base_total, 2.0 * 14.0);
        assert_eq!(base_total, 2.0 * 14.0 + 3.0 * 10.0);
    }

    #[test]
    fn test_student_month_total_from_records_filters_by_month() {
        let billing = BillingAggregator::new(vec![]);
        let mut other_month = record("s1", 1, 5.0, 0.0, Some(14.0), None);
        other_month.month = 4;
        let records = vec![
            record("s1", 1, 1.0, 0.0, Some(14.0), None),
            record("s1", 2, 2.0, 0.0, Some(14.0), None),
            record("s2", 1, 9.0, 0.0, Some(14.0), None),
            other_month,
        ];
        assert_eq!(
            billing.student_month_total_from_records("s1", 3, 2024, &records),
            3.0 * 14.0
        );
    }

    #[test]
    fn test_student_month_total_from_sessions_matches_fallback_chain() {
        let billing = BillingAggregator::new(vec![override_rate("s1", Some(20.0), None)]);
        let index = SessionIndex::new(vec![
            // billed at the override
            session(&["s1"], "2024-03-05T09:00:00", 1.5, SessionKind::Individual, None),
            // stored rate wins over the group default
            session(&["s1", "s2"], "2024-03-07T10:00:00", 1.0, SessionKind::Group, Some(12.0)),
            // outside the month
            session(&["s1"], "2024-04-02T09:00:00", 1.0, SessionKind::Individual, None),
        ]);

        let total =
            billing.student_month_total_from_sessions("s1", 3, 2024, &index, None);
        assert_eq!(total, 1.5 * 20.0 + 1.0 * 12.0);

        let individual_only = billing.student_month_total_from_sessions(
            "s1",
            3,
            2024,
            &index,
            Some(SessionKind::Individual),
        );
        assert_eq!(individual_only, 30.0);

        // s2 shares the group session and is billed the stored group rate
        let s2_total = billing.student_month_total_from_sessions("s2", 3, 2024, &index, None);
        assert_eq!(s2_total, 12.0);
    }

    #[test]
    fn test_month_grand_total_drops_with_student() {
        let billing = BillingAggregator::new(vec![]);
        let records = vec![
            record("s1", 1, 2.0, 0.0, Some(14.0), None),
            record("s2", 1, 1.0, 2.0, Some(14.0), Some(10.0)),
        ];

        let all = vec!["s1".to_string(), "s2".to_string()];
        let total = billing.month_grand_total(&all, 3, 2024, &records);
        assert_eq!(total, 28.0 + 14.0 + 20.0);

        // After deleting s2 and its records, the grand total recomputes
        let remaining: Vec<WeeklyRecord> = records
            .into_iter()
            .filter(|r| r.student_id != "s2")
            .collect();
        let survivors = vec!["s1".to_string()];
        assert_eq!(
            billing.month_grand_total(&survivors, 3, 2024, &remaining),
            28.0
        );
    }

    #[test]
    fn test_coerce_numeric_input() {
        assert_eq!(coerce_numeric_input("1.5"), 1.5);
        assert_eq!(coerce_numeric_input(" 14 "), 14.0);
        assert_eq!(coerce_numeric_input("abc"), 0.0);
        assert_eq!(coerce_numeric_input(""), 0.0);
        assert_eq!(coerce_numeric_input("NaN"), 0.0);
        assert_eq!(coerce_numeric_input("inf"), 0.0);
    }

    #[test]
    fn test_internal_sums_keep_full_precision() {
        let billing = BillingAggregator::new(vec![]);
        let records = vec![
            record("s1", 1, 0.5, 0.0, Some(14.33), None),
            record("s1", 2, 0.5, 0.0, Some(14.33), None),
        ];
        let total = billing.student_month_total_from_records("s1", 3, 2024, &records);
        // Unrounded internally; only display formatting rounds
        assert_eq!(total, 14.33);
        assert_eq!(shared::format_currency(total), "R$ 14.33");
    }
}
