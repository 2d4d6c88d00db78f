use chrono::Duration;
use serde_json::json;
use std::collections::{HashMap, HashSet};

use super::{ConstraintExpr, ConstraintType, EncodedConstraint, HardConstraint, LinearTerm, Priority, Severity, VarRef, Violation};
use crate::context::SchedulingContext;
use crate::domain::{Assignment, PersonKind};
use crate::redact::person_ref;

/// For each resident, any 7 consecutive days must contain
/// `>= min_rest_days_per_week` days with zero assignments.
pub struct OneInSevenConstraint {
    pub min_rest_days_per_week: u32,
}

impl HardConstraint for OneInSevenConstraint {
    fn name(&self) -> &str {
        "OneInSeven"
    }

    fn constraint_type(&self) -> ConstraintType {
        ConstraintType::Regulatory
    }

    fn priority(&self) -> Priority {
        Priority::Critical
    }

    fn parameters(&self) -> serde_json::Value {
        json!({ "min_rest_days_per_week": self.min_rest_days_per_week })
    }

    fn encode(&self, ctx: &SchedulingContext) -> EncodedConstraint {
        // Encode via an auxiliary `day[r,d]` indicator per person per
        // calendar day: `x[r,b] <= day[r,d]` for every half-day block `b`
        // on day `d` forces the indicator to 1 whenever that person has
        // any assignment that day, then every 7-day window bounds
        // `sum(day[r,d]) <= 7 - min_rest_days_per_week`, guaranteeing that
        // many fully free days rather than merely bounding total half-day
        // slots (an AM-only-every-day resident uses just 7 of 14 half-days
        // but owes zero free days, which a half-day-count bound alone
        // cannot catch).
        let mut exprs = Vec::new();
        let dates = ctx.distinct_dates();

        for (p_idx, person) in ctx.persons.iter().enumerate() {
            if person.kind != PersonKind::Resident {
                continue;
            }
            for (d_idx, &date) in dates.iter().enumerate() {
                let day_var = VarRef::Day { person: p_idx, day: d_idx };
                for (b_idx, _) in ctx.blocks.iter().enumerate().filter(|(_, b)| b.date == date) {
                    exprs.push(ConstraintExpr::Le {
                        terms: vec![
                            LinearTerm { var: VarRef::X { person: p_idx, block: b_idx }, coef: 1.0 },
                            LinearTerm { var: day_var, coef: -1.0 },
                        ],
                        rhs: 0.0,
                    });
                }
            }

            for &anchor in &dates {
                let window_end = anchor + Duration::days(6);
                let terms: Vec<LinearTerm> = dates
                    .iter()
                    .enumerate()
                    .filter(|(_, d)| **d >= anchor && **d <= window_end)
                    .map(|(d_idx, _)| LinearTerm { var: VarRef::Day { person: p_idx, day: d_idx }, coef: 1.0 })
                    .collect();
                if terms.len() == 7 {
                    let rhs = (7 - self.min_rest_days_per_week.min(7)) as f64;
                    exprs.push(ConstraintExpr::Le { terms, rhs });
                }
            }
        }
        EncodedConstraint { source: self.name().to_string(), exprs }
    }

    fn validate(&self, assignments: &[Assignment], ctx: &SchedulingContext) -> Vec<Violation> {
        let mut by_person: HashMap<uuid::Uuid, HashSet<chrono::NaiveDate>> = HashMap::new();
        for a in assignments {
            let Some(person) = ctx.person(a.person_id) else { continue };
            if person.kind != PersonKind::Resident {
                continue;
            }
            if let Some(block) = ctx.block(a.block_id) {
                by_person.entry(a.person_id).or_default().insert(block.date);
            }
        }

        let all_dates = ctx.distinct_dates();

        let mut violations = Vec::new();
        for (person_id, assigned_dates) in by_person {
            let Some(person) = ctx.person(person_id) else { continue };
            for &anchor in &all_dates {
                let window_end = anchor + Duration::days(6);
                let window_dates: Vec<_> = all_dates
                    .iter()
                    .filter(|d| **d >= anchor && **d <= window_end)
                    .collect();
                if window_dates.len() < 7 {
                    continue;
                }
                let free_days = window_dates.iter().filter(|d| !assigned_dates.contains(*d)).count() as u32;
                if free_days < self.min_rest_days_per_week {
                    violations.push(Violation {
                        constraint_name: self.name().to_string(),
                        severity: Severity::Critical,
                        message: format!(
                            "only {free_days} day(s) off (need {}) in the 7-day window starting {anchor}",
                            self.min_rest_days_per_week
                        ),
                        affected_ref: person_ref(person),
                        block_id: None,
                        date_context: Some(anchor),
                        details: json!({ "window_start": anchor, "free_days": free_days }),
                        suggested_action: Some("free up at least one more day in the window".to_string()),
                    });
                }
            }
        }
        violations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::test_support::make_block;
    use crate::domain::test_support::make_resident;
    use crate::domain::TimeOfDay;
    use crate::ports::PeriodSnapshot;
    use crate::solver::{CpSatAdapter, SolveStatus, SolverAdapter};
    use chrono::NaiveDate;

    #[test]
    fn am_only_every_day_for_a_week_is_infeasible_despite_half_day_slack() {
        // Seven AM-only half-days use just 7 of the 14 half-day slots a
        // full week could hold, so the old half-day-count bound (<=12)
        // would have accepted this; the resident still never gets a day
        // off, which the per-day indicator encoding must reject.
        let resident = make_resident("R1", 2);
        let start = NaiveDate::from_ymd_opt(2026, 7, 1).unwrap();
        let blocks: Vec<_> =
            (0..7).map(|i| make_block(start + Duration::days(i), TimeOfDay::Am, 0)).collect();

        let mut snapshot = PeriodSnapshot::default();
        snapshot.persons.push(resident);
        snapshot.blocks.extend(blocks);
        let ctx = SchedulingContext::build(snapshot);

        let mut variables: Vec<VarRef> =
            (0..ctx.blocks.len()).map(|b_idx| VarRef::X { person: 0, block: b_idx }).collect();
        variables.extend((0..ctx.distinct_dates().len()).map(|d_idx| VarRef::Day { person: 0, day: d_idx }));

        let encoded = OneInSevenConstraint { min_rest_days_per_week: 1 }.encode(&ctx);
        let mut exprs = encoded.exprs;
        for b_idx in 0..ctx.blocks.len() {
            exprs.push(ConstraintExpr::FixOne(VarRef::X { person: 0, block: b_idx }));
        }
        let hard = vec![(encoded.source, exprs)];

        let adapter = CpSatAdapter::default();
        let result = adapter.solve(
            &hard,
            &HashMap::new(),
            &variables,
            std::time::Instant::now() + std::time::Duration::from_secs(5),
        );
        assert_eq!(result.status, SolveStatus::Infeasible);
    }
}
