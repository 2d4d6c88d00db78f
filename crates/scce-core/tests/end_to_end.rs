//! Scenario-level tests that exercise a full pipeline entry point
//! (validator, batch pipeline, solver, swap matcher, resilience analyzer)
//! against a hand-built period snapshot, rather than a single
//! constraint's `encode`/`validate` in isolation.

use std::collections::BTreeSet;
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use scce_core::batch::{AssignmentUpdate, BatchOptions, BatchPipeline};
use scce_core::constraints::{
    AvailabilityConstraint, HardConstraint, OnePerBlockConstraint, Severity, SupervisionRatioConstraint,
};
use scce_core::domain::test_support::{make_block, make_faculty, make_resident};
use scce_core::domain::{
    ActivityType, Assignment, AssignmentRole, AssignmentSource, PersonKind, RotationTemplate, TimeOfDay,
};
use scce_core::ports::{AssignmentPatch, MockClock, MockEntityStore, PeriodSnapshot};
use scce_core::solver::{CpSatAdapter, SolveStatus, SolverAdapter};
use scce_core::swap_matcher::SwapMatcher;
use scce_core::validator::Validator;

fn clinic_template() -> RotationTemplate {
    RotationTemplate {
        id: Uuid::new_v4(),
        name: "Continuity Clinic".to_string(),
        abbreviation: "C".to_string(),
        activity_type: ActivityType::Clinic,
        allowed_person_types: [PersonKind::Resident].into_iter().collect(),
        min_pgy_level: None,
        max_pgy_level: None,
        required_specialties: BTreeSet::new(),
        time_of_day: None,
        counts_toward_physical_capacity: true,
        max_residents: Some(6),
        call_shift_hours: None,
    }
}

fn supervision_template() -> RotationTemplate {
    RotationTemplate {
        id: Uuid::new_v4(),
        name: "Attending Supervision".to_string(),
        abbreviation: "SUP".to_string(),
        activity_type: ActivityType::Inpatient,
        allowed_person_types: [PersonKind::Faculty].into_iter().collect(),
        min_pgy_level: None,
        max_pgy_level: None,
        required_specialties: ["supervision".to_string()].into_iter().collect(),
        time_of_day: None,
        counts_toward_physical_capacity: false,
        max_residents: None,
        call_shift_hours: None,
    }
}

fn new_assignment(block_id: Uuid, person_id: Uuid, template_id: Option<Uuid>, role: AssignmentRole) -> Assignment {
    let now = Utc::now();
    Assignment {
        id: Uuid::new_v4(),
        block_id,
        person_id,
        rotation_template_id: template_id,
        role,
        activity_override: None,
        notes: None,
        override_reason: None,
        override_acknowledged_at: None,
        confidence: None,
        score: None,
        created_by: "test".to_string(),
        created_at: now,
        updated_at: now,
        source: AssignmentSource::Manual,
    }
}

/// A PGY-2 resident assigned to a clinic template on a Wednesday-AM block
/// is a hard violation: that half-day is reserved for PGY-1 continuity.
#[tokio::test]
async fn wednesday_am_clinic_conflict_is_flagged_on_validation() {
    let pgy2 = make_resident("R2", 2);
    let wed_am = make_block(NaiveDate::from_ymd_opt(2026, 7, 1).unwrap(), TimeOfDay::Am, 0);
    let clinic = clinic_template();
    let assignment = new_assignment(wed_am.id, pgy2.id, Some(clinic.id), AssignmentRole::Primary);

    let mut snapshot = PeriodSnapshot::default();
    snapshot.persons.push(pgy2);
    snapshot.blocks.push(wed_am);
    snapshot.templates.push(clinic);
    snapshot.assignments.push(assignment);

    let mut store = MockEntityStore::new();
    store.expect_load_period().return_once(move |_, _| Ok(snapshot));

    let hard: Vec<Box<dyn HardConstraint>> =
        vec![Box::new(scce_core::constraints::WednesdayAmInternOnlyConstraint)];
    let validator = Validator { store: &store, hard_constraints: &hard };

    let report = validator
        .validate_period(NaiveDate::from_ymd_opt(2026, 7, 1).unwrap(), NaiveDate::from_ymd_opt(2026, 7, 7).unwrap())
        .await
        .unwrap();

    assert_eq!(report.violations.len(), 1);
    assert_eq!(report.violations[0].constraint_name, "WednesdayAMInternOnly");
    assert_eq!(report.violations[0].severity, Severity::High);
}

/// A batch update racing a stale `expected_updated_at` loses that row to an
/// optimistic-lock conflict but does not abort the rest of the batch.
#[tokio::test]
async fn stale_batch_update_reports_optimistic_lock_conflict_for_that_row_only() {
    let stale_id = Uuid::new_v4();
    let fresh_id = Uuid::new_v4();
    let stale_expected = Utc::now() - chrono::Duration::hours(1);

    let mut store = MockEntityStore::new();
    store.expect_update_assignment().returning(move |id, _patch, expected| {
        if id == stale_id {
            Err(scce_core::error::SccError::Conflict(format!(
                "assignment {id} was updated after {expected}"
            )))
        } else {
            Ok(new_assignment(Uuid::new_v4(), Uuid::new_v4(), None, AssignmentRole::Primary))
        }
    });
    store.expect_begin_tx().returning(|| Ok(scce_core::ports::TxToken(Uuid::new_v4())));
    store.expect_commit().returning(|_| Ok(()));
    store.expect_rollback().returning(|_| Ok(()));

    let mut clock = MockClock::new();
    clock.expect_now().returning(Utc::now);
    let hard: Vec<Box<dyn HardConstraint>> = Vec::new();
    let pipeline = BatchPipeline { store: &store, clock: &clock, hard_constraints: &hard };

    let items = vec![
        AssignmentUpdate { id: stale_id, patch: AssignmentPatch::default(), expected_updated_at: stale_expected },
        AssignmentUpdate { id: fresh_id, patch: AssignmentPatch::default(), expected_updated_at: Utc::now() },
    ];

    let result = pipeline.batch_update(items, BatchOptions::default()).await.unwrap();

    assert!(!result.validation.valid);
    assert_eq!(result.applied_count, 1);
    assert_eq!(result.validation.item_errors.len(), 1);
    assert_eq!(result.validation.item_errors[0].index, 0);
    assert_eq!(result.validation.item_errors[0].code, "E_CONFLICT_OPTIMISTIC_LOCK");
}

/// Six PGY-1 residents need `ceil(12/4) = 3` supervising faculty; with only
/// one faculty member in the program there is no way to satisfy
/// `SupervisionRatio` no matter how the solver assigns that one person, so
/// the period is unconditionally infeasible.
#[test]
fn understaffed_supervision_ratio_is_unconditionally_infeasible() {
    let residents: Vec<_> = (1..=6).map(|i| make_resident(&format!("PGY1-{i}"), 1)).collect();
    let faculty = make_faculty("FAC-1");
    let block = make_block(NaiveDate::from_ymd_opt(2026, 7, 1).unwrap(), TimeOfDay::Am, 0);
    let sup = supervision_template();

    let mut snapshot = PeriodSnapshot::default();
    snapshot.persons.extend(residents);
    snapshot.persons.push(faculty);
    snapshot.blocks.push(block);
    snapshot.templates.push(sup);

    let ctx = scce_core::context::SchedulingContext::build(snapshot);
    let variables = {
        let mut vars = Vec::new();
        for p in 0..ctx.persons.len() {
            for b in 0..ctx.blocks.len() {
                vars.push(scce_core::constraints::VarRef::X { person: p, block: b });
                for k in 0..ctx.templates.len() {
                    vars.push(scce_core::constraints::VarRef::T { person: p, block: b, template: k });
                }
            }
        }
        vars
    };

    let hard: Vec<Box<dyn HardConstraint>> = vec![
        Box::new(AvailabilityConstraint),
        Box::new(OnePerBlockConstraint),
        Box::new(SupervisionRatioConstraint),
    ];
    let encoded: Vec<_> = hard.iter().map(|c| {
        let enc = c.encode(&ctx);
        (enc.source, enc.exprs)
    }).collect();

    let adapter = CpSatAdapter::default();
    let result = adapter.solve(
        &encoded,
        &std::collections::HashMap::new(),
        &variables,
        std::time::Instant::now() + Duration::from_secs(5),
    );

    assert_eq!(result.status, SolveStatus::Infeasible);
    assert!(result.minimal_core.iter().any(|c| c == "SupervisionRatio"));
}

/// The swap matcher surfaces the nearer-dated pending request ahead of one
/// more than two months out, the same ranking the unit-level scorer proves
/// in isolation, now exercised through `find_matches` end to end.
#[tokio::test]
async fn swap_matcher_ranks_nearer_pending_swap_first() {
    use scce_core::domain::{SwapRecord, SwapStatus, SwapType};

    let source_person = Uuid::new_v4();
    let week = NaiveDate::from_ymd_opt(2026, 7, 6).unwrap();
    let source_id = Uuid::new_v4();
    let near_id = Uuid::new_v4();
    let far_id = Uuid::new_v4();

    let make_swap = |id, person, w, status| SwapRecord {
        id,
        source_person_id: person,
        source_week_start: w,
        target_person_id: None,
        target_week_start: None,
        swap_type: SwapType::OneToOne,
        status,
        created_at: Utc::now(),
        faculty_preference_tags: Vec::new(),
    };

    let source = make_swap(source_id, source_person, week, SwapStatus::Pending);
    let near = make_swap(near_id, Uuid::new_v4(), week + chrono::Duration::days(5), SwapStatus::Pending);
    let far = make_swap(far_id, Uuid::new_v4(), week + chrono::Duration::days(200), SwapStatus::Pending);

    let mut repo = scce_core::ports::MockSwapRepository::new();
    repo.expect_find().return_once(move |_| Ok(Some(source)));
    repo.expect_list_other_pending().returning(move |_| Ok(vec![near.clone(), far.clone()]));

    let matcher = SwapMatcher {
        repository: &repo,
        weights: scce_core::config::SwapWeights::default(),
        max_date_distance_days: 60,
        min_preference_score: 0.6,
    };

    let ranked = matcher.find_matches(source_id, 5).await.unwrap();
    assert_eq!(ranked.len(), 1);
    assert_eq!(ranked[0].swap.id, near_id);
    assert!(ranked[0].score >= 0.9);
}

/// A deeper faculty pool survives a cascading attrition simulation at least
/// as often as a thin one, run through the same analyzer dispatch the CLI's
/// `resilience cascade` subcommand uses.
#[tokio::test]
async fn cascade_simulation_favors_the_deeper_faculty_pool() {
    use scce_core::config::CascadeConfig;
    use scce_core::resilience::{AnalysisParams, AnalysisResult, CascadeParams, ResilienceAnalyzer};

    let store = MockEntityStore::new();
    let analyzer = ResilienceAnalyzer { store: &store, cascade_config: CascadeConfig::default() };
    let any_date = NaiveDate::from_ymd_opt(2026, 7, 1).unwrap();

    let thin = analyzer
        .analyze_resilience(
            any_date,
            any_date,
            AnalysisParams::Cascade(CascadeParams { initial_faculty: 4, total_workload: 10.0, max_days: 365, runs: 200, seed: 42 }),
        )
        .await
        .unwrap();
    let healthy = analyzer
        .analyze_resilience(
            any_date,
            any_date,
            AnalysisParams::Cascade(CascadeParams { initial_faculty: 8, total_workload: 10.0, max_days: 365, runs: 200, seed: 42 }),
        )
        .await
        .unwrap();

    let (AnalysisResult::Cascade(thin), AnalysisResult::Cascade(healthy)) = (thin, healthy) else {
        panic!("expected cascade results");
    };
    assert!(healthy.survival_rate >= thin.survival_rate);
}
