//! Re-checks every hard constraint's `validate` against persisted
//! assignments for a period and rolls the result up into compliance
//! metrics a caller can show on a dashboard or gate a publish step with.

use std::collections::HashMap;

use crate::constraints::{HardConstraint, Severity, Violation};
use crate::context::SchedulingContext;
use crate::error::SccResult;
use crate::ports::EntityStore;

#[derive(Debug, Clone, PartialEq)]
pub struct ComplianceMetrics {
    pub total_assignments: usize,
    pub total_violations: usize,
    pub violations_by_severity: HashMap<Severity, usize>,
    /// `1.0 - (weighted violation count / total_assignments)`, clamped to
    /// `[0, 1]`. Weighted so a `Critical` counts for more than an `Info`.
    pub compliance_rate: f64,
}

#[derive(Debug, Clone)]
pub struct ValidationReport {
    pub violations: Vec<Violation>,
    pub metrics: ComplianceMetrics,
}

pub struct Validator<'a> {
    pub store: &'a dyn EntityStore,
    pub hard_constraints: &'a [Box<dyn HardConstraint>],
}

impl<'a> Validator<'a> {
    pub async fn validate_period(
        &self,
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    ) -> SccResult<ValidationReport> {
        let snapshot = self.store.load_period(start, end).await?;
        let total_assignments = snapshot.assignments.len();
        let assignments = snapshot.assignments.clone();
        let ctx = SchedulingContext::build(snapshot);

        let mut violations = Vec::new();
        for constraint in self.hard_constraints {
            violations.extend(constraint.validate(&assignments, &ctx));
        }

        let metrics = compute_metrics(total_assignments, &violations);
        Ok(ValidationReport { violations, metrics })
    }
}

fn severity_weight(s: Severity) -> f64 {
    match s {
        Severity::Info => 0.1,
        Severity::Warning => 0.3,
        Severity::High => 0.6,
        Severity::Critical => 1.0,
    }
}

fn compute_metrics(total_assignments: usize, violations: &[Violation]) -> ComplianceMetrics {
    let mut violations_by_severity = HashMap::new();
    let mut weighted = 0.0;
    for v in violations {
        *violations_by_severity.entry(v.severity).or_insert(0) += 1;
        weighted += severity_weight(v.severity);
    }
    let compliance_rate = if total_assignments == 0 {
        1.0
    } else {
        (1.0 - weighted / total_assignments as f64).clamp(0.0, 1.0)
    };
    ComplianceMetrics {
        total_assignments,
        total_violations: violations.len(),
        violations_by_severity,
        compliance_rate,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::test_support::{make_block, make_resident};
    use crate::domain::{Assignment, AssignmentRole, AssignmentSource, TimeOfDay};
    use crate::ports::{MockEntityStore, PeriodSnapshot};
    use chrono::{NaiveDate, Utc};
    use uuid::Uuid;

    #[tokio::test]
    async fn flags_assignment_on_unavailable_block() {
        let resident = make_resident("R1", 1);
        let block = make_block(NaiveDate::from_ymd_opt(2026, 7, 1).unwrap(), TimeOfDay::Am, 0);

        let absence = crate::domain::Absence {
            id: Uuid::new_v4(),
            person_id: resident.id,
            start_date: block.date,
            end_date: block.date,
            absence_type: crate::domain::AbsenceType::Vacation,
            is_blocking: true,
        };

        let assignment = Assignment {
            id: Uuid::new_v4(),
            block_id: block.id,
            person_id: resident.id,
            rotation_template_id: None,
            role: AssignmentRole::Primary,
            activity_override: None,
            notes: None,
            override_reason: None,
            override_acknowledged_at: None,
            confidence: None,
            score: None,
            created_by: "test".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            source: AssignmentSource::Manual,
        };

        let mut snapshot = PeriodSnapshot::default();
        snapshot.persons.push(resident);
        snapshot.blocks.push(block);
        snapshot.absences.push(absence);
        snapshot.assignments.push(assignment);

        let mut store = MockEntityStore::new();
        store.expect_load_period().return_once(move |_, _| Ok(snapshot));

        let hard: Vec<Box<dyn HardConstraint>> = vec![Box::new(crate::constraints::AvailabilityConstraint)];
        let validator = Validator { store: &store, hard_constraints: &hard };

        let report = validator
            .validate_period(NaiveDate::from_ymd_opt(2026, 7, 1).unwrap(), NaiveDate::from_ymd_opt(2026, 7, 7).unwrap())
            .await
            .unwrap();

        assert_eq!(report.violations.len(), 1);
        assert_eq!(report.violations[0].severity, Severity::Critical);
        assert!(report.metrics.compliance_rate < 1.0);
    }

    #[test]
    fn clean_period_has_full_compliance() {
        let metrics = compute_metrics(10, &[]);
        assert_eq!(metrics.compliance_rate, 1.0);
        assert_eq!(metrics.total_violations, 0);
    }
}
