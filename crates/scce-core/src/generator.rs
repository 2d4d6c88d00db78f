//! Turns a `SchedulingContext`, a constraint set, and a solver choice into
//! a batch of persisted `Assignment`s for one period.
//!
//! Pipeline: expand (enumerate every legal `(person, block, template)`
//! triple), encode every hard constraint and flatten every soft
//! constraint's objective, hand the result to the chosen `SolverAdapter`,
//! then either persist or report infeasibility with a minimal core.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tracing::{info, warn};
use uuid::Uuid;

use crate::constraints::{ConstraintExpr, HardConstraint, SoftConstraint, VarRef};
use crate::context::SchedulingContext;
use crate::domain::{Assignment, AssignmentRole, AssignmentSource};
use crate::error::{SccError, SccResult};
use crate::ports::{Clock, EntityStore, MetricEvent, MetricsSink};
use crate::solver::{SolveResult, SolveStatus, SolverAdapter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverChoice {
    CpSat,
    Linear,
    #[cfg(feature = "qubo")]
    Qubo,
}

pub struct GenerationRequest {
    pub start: chrono::NaiveDate,
    pub end: chrono::NaiveDate,
    pub solver: SolverChoice,
    pub timeout: Duration,
    pub created_by: String,
}

#[derive(Debug, Clone)]
pub struct GenerationReport {
    pub status: SolveStatus,
    pub assignments_created: usize,
    pub objective_value: f64,
    pub elapsed: Duration,
    pub minimal_core: Vec<String>,
    pub suggestions: Vec<String>,
}

/// Every `(person, block)` pair eligible for assignment, plus the
/// `(person, block, template)` triples legal before any hard constraint
/// fixes them off. Expansion alone is what gives the `x`/`t` variable
/// naming in [`crate::constraints::VarRef`] meaning.
fn expand_variables(ctx: &SchedulingContext) -> Vec<VarRef> {
    let mut vars = Vec::new();
    let day_count = ctx.distinct_dates().len();
    for p_idx in 0..ctx.persons.len() {
        for b_idx in 0..ctx.blocks.len() {
            vars.push(VarRef::X { person: p_idx, block: b_idx });
            for k_idx in 0..ctx.templates.len() {
                vars.push(VarRef::T { person: p_idx, block: b_idx, template: k_idx });
            }
        }
        for d_idx in 0..day_count {
            vars.push(VarRef::Day { person: p_idx, day: d_idx });
        }
    }
    vars
}

pub struct ScheduleGenerator<'a> {
    pub store: &'a dyn EntityStore,
    pub clock: &'a dyn Clock,
    pub metrics: &'a dyn MetricsSink,
    pub hard_constraints: Vec<Box<dyn HardConstraint>>,
    pub soft_constraints: Vec<Box<dyn SoftConstraint>>,
}

impl<'a> ScheduleGenerator<'a> {
    pub async fn generate(&self, request: GenerationRequest) -> SccResult<GenerationReport> {
        let start = Instant::now();
        let snapshot = self.store.load_period(request.start, request.end).await?;
        let ctx = SchedulingContext::build(snapshot);

        let variables = expand_variables(&ctx);
        let encoded: Vec<(String, Vec<ConstraintExpr>)> = self
            .hard_constraints
            .iter()
            .map(|c| {
                let enc = c.encode(&ctx);
                (enc.source, enc.exprs)
            })
            .collect();

        let mut objective: HashMap<VarRef, f64> = HashMap::new();
        for soft in &self.soft_constraints {
            for (var, reward) in soft.objective_terms(&ctx) {
                *objective.entry(var).or_insert(0.0) += reward * soft.weight();
            }
        }

        let deadline = Instant::now() + request.timeout;
        let result = self.run_solver(request.solver, &encoded, &objective, &variables, deadline);

        self.metrics.record(MetricEvent::Histogram { name: "scce_solve_duration", value: result.elapsed });

        match result.status {
            SolveStatus::Optimal | SolveStatus::Feasible => {
                let created = self.persist(&ctx, &result, &request).await?;
                self.metrics.record(MetricEvent::Counter { name: "scce_generations_succeeded", value: 1 });
                info!(count = created, status = ?result.status, "schedule generation completed");
                Ok(GenerationReport {
                    status: result.status,
                    assignments_created: created,
                    objective_value: result.objective_value,
                    elapsed: start.elapsed(),
                    minimal_core: Vec::new(),
                    suggestions: Vec::new(),
                })
            }
            SolveStatus::Infeasible => {
                self.metrics.record(MetricEvent::Counter { name: "scce_generations_infeasible", value: 1 });
                warn!(core = ?result.minimal_core, "schedule generation infeasible");
                let suggestions = suggest_relaxations(&result.minimal_core);
                Err(SccError::Infeasible {
                    reason: "no assignment satisfies every hard constraint".to_string(),
                    minimal_core: result.minimal_core,
                    suggestions,
                })
            }
            SolveStatus::Timeout => Err(SccError::Timeout { elapsed_ms: start.elapsed().as_millis() as u64 }),
            SolveStatus::Empty => Ok(GenerationReport {
                status: SolveStatus::Empty,
                assignments_created: 0,
                objective_value: 0.0,
                elapsed: start.elapsed(),
                minimal_core: Vec::new(),
                suggestions: Vec::new(),
            }),
        }
    }

    fn run_solver(
        &self,
        choice: SolverChoice,
        hard: &[(String, Vec<ConstraintExpr>)],
        objective: &HashMap<VarRef, f64>,
        variables: &[VarRef],
        deadline: Instant,
    ) -> SolveResult {
        match choice {
            SolverChoice::CpSat => crate::solver::CpSatAdapter::default().solve(hard, objective, variables, deadline),
            SolverChoice::Linear => crate::solver::LinearAdapter::default().solve(hard, objective, variables, deadline),
            #[cfg(feature = "qubo")]
            SolverChoice::Qubo => crate::solver::QuboAdapter::default().solve(hard, objective, variables, deadline),
        }
    }

    async fn persist(
        &self,
        ctx: &SchedulingContext,
        result: &SolveResult,
        request: &GenerationRequest,
    ) -> SccResult<usize> {
        let now = self.clock.now();
        let mut created = 0;
        for (p_idx, person) in ctx.persons.iter().enumerate() {
            for (b_idx, block) in ctx.blocks.iter().enumerate() {
                let chosen_template = ctx.templates.iter().enumerate().find_map(|(k_idx, t)| {
                    let var = VarRef::T { person: p_idx, block: b_idx, template: k_idx };
                    result.assignment.get(&var).copied().unwrap_or(false).then_some(t.id)
                });
                let Some(template_id) = chosen_template else { continue };
                let assignment = Assignment {
                    id: Uuid::new_v4(),
                    block_id: block.id,
                    person_id: person.id,
                    rotation_template_id: Some(template_id),
                    role: AssignmentRole::Primary,
                    activity_override: None,
                    notes: None,
                    override_reason: None,
                    override_acknowledged_at: None,
                    confidence: None,
                    score: Some(result.objective_value),
                    created_by: request.created_by.clone(),
                    created_at: now,
                    updated_at: now,
                    source: AssignmentSource::Solver,
                };
                self.store.save_assignment(&assignment).await?;
                created += 1;
            }
        }
        Ok(created)
    }
}

/// Cheap, human-facing relaxation hints derived from which named
/// constraints appear in the minimal core — not a re-solve, just pattern
/// matching on the core's constraint names so a caller gets a starting
/// point before re-running with different parameters.
fn suggest_relaxations(core: &[String]) -> Vec<String> {
    let mut suggestions = Vec::new();
    if core.iter().any(|c| c == "SupervisionRatio") {
        suggestions.push("add faculty coverage or reduce PGY-1 census for the affected blocks".to_string());
    }
    if core.iter().any(|c| c == "Capacity") {
        suggestions.push("raise max_residents on the saturated rotation template".to_string());
    }
    if core.iter().any(|c| c == "EightyHourRolling") {
        suggestions.push("redistribute call shifts across the rolling window".to_string());
    }
    if suggestions.is_empty() {
        suggestions.push("review the minimal core for the conflicting hard constraints".to_string());
    }
    suggestions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::test_support::{make_block, make_resident};
    use crate::domain::TimeOfDay;
    use crate::ports::{MockClock, MockEntityStore, MockMetricsSink, PeriodSnapshot};
    use chrono::{NaiveDate, Utc};

    #[tokio::test]
    async fn empty_period_reports_empty_status() {
        let mut store = MockEntityStore::new();
        store.expect_load_period().returning(|_, _| Ok(PeriodSnapshot::default()));
        let mut clock = MockClock::new();
        clock.expect_now().returning(Utc::now);
        let mut metrics = MockMetricsSink::new();
        metrics.expect_record().returning(|_| ());

        let generator = ScheduleGenerator {
            store: &store,
            clock: &clock,
            metrics: &metrics,
            hard_constraints: Vec::new(),
            soft_constraints: Vec::new(),
        };

        let report = generator
            .generate(GenerationRequest {
                start: NaiveDate::from_ymd_opt(2026, 7, 1).unwrap(),
                end: NaiveDate::from_ymd_opt(2026, 7, 7).unwrap(),
                solver: SolverChoice::CpSat,
                timeout: Duration::from_secs(1),
                created_by: "test".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(report.status, SolveStatus::Empty);
        assert_eq!(report.assignments_created, 0);
    }

    #[tokio::test]
    async fn single_resident_single_slot_assigns_via_availability() {
        use crate::domain::{ActivityType, RotationTemplate};
        use std::collections::BTreeSet;

        let resident = make_resident("R1", 2);
        let block = make_block(NaiveDate::from_ymd_opt(2026, 7, 2).unwrap(), TimeOfDay::Am, 1);
        let template = RotationTemplate {
            id: Uuid::new_v4(),
            name: "Continuity Clinic".to_string(),
            abbreviation: "C".to_string(),
            activity_type: ActivityType::Clinic,
            allowed_person_types: BTreeSet::from([crate::domain::PersonKind::Resident]),
            min_pgy_level: None,
            max_pgy_level: None,
            required_specialties: BTreeSet::new(),
            time_of_day: None,
            counts_toward_physical_capacity: true,
            max_residents: Some(6),
            call_shift_hours: None,
        };

        let mut trails = crate::constraints::PreferenceTrailMap::default();
        trails.reinforce(resident.id, "C", 0.8);

        let mut snapshot = PeriodSnapshot::default();
        snapshot.persons.push(resident.clone());
        snapshot.blocks.push(block.clone());
        snapshot.templates.push(template);

        let mut store = MockEntityStore::new();
        store.expect_load_period().return_once(move |_, _| Ok(snapshot));
        store.expect_save_assignment().returning(|_| Ok(()));
        let mut clock = MockClock::new();
        clock.expect_now().returning(Utc::now);
        let mut metrics = MockMetricsSink::new();
        metrics.expect_record().returning(|_| ());

        let generator = ScheduleGenerator {
            store: &store,
            clock: &clock,
            metrics: &metrics,
            hard_constraints: vec![
                Box::new(crate::constraints::AvailabilityConstraint),
                Box::new(crate::constraints::OnePerBlockConstraint),
            ],
            soft_constraints: vec![Box::new(crate::constraints::PreferenceTrailConstraint { weight: 1.0, trails })],
        };

        let report = generator
            .generate(GenerationRequest {
                start: NaiveDate::from_ymd_opt(2026, 7, 1).unwrap(),
                end: NaiveDate::from_ymd_opt(2026, 7, 7).unwrap(),
                solver: SolverChoice::CpSat,
                timeout: Duration::from_secs(1),
                created_by: "test".to_string(),
            })
            .await
            .unwrap();

        assert!(matches!(report.status, SolveStatus::Feasible | SolveStatus::Optimal));
        assert_eq!(report.assignments_created, 1);
    }
}
