//! Property-based invariants that must hold for arbitrary inputs, not just
//! the handful of cases the unit tests happen to construct.

use chrono::{Datelike, NaiveDate, Utc, Weekday};
use proptest::prelude::*;
use uuid::Uuid;

use scce_core::calendar::{block_dates, block_number_for_date, validate_alignment};
use scce_core::constraints::{
    AvailabilityConstraint, ConstraintKind, ConstraintType, HardConstraint, OnePerBlockConstraint, Priority,
};
use scce_core::context::SchedulingContext;
use scce_core::domain::test_support::{make_block, make_resident};
use scce_core::domain::{Absence, AbsenceType, Assignment, AssignmentRole, AssignmentSource, TimeOfDay};
use scce_core::ports::PeriodSnapshot;

fn required_faculty(pgy1: u32, pgy2_3: u32) -> u32 {
    (2 * pgy1 + pgy2_3).div_ceil(4)
}

fn bare_assignment(block_id: Uuid, person_id: Uuid, overridden: bool) -> Assignment {
    let now = Utc::now();
    Assignment {
        id: Uuid::new_v4(),
        block_id,
        person_id,
        rotation_template_id: None,
        role: AssignmentRole::Primary,
        activity_override: None,
        notes: None,
        override_reason: overridden.then(|| "documented override".to_string()),
        override_acknowledged_at: None,
        confidence: None,
        score: None,
        created_by: "test".to_string(),
        created_at: now,
        updated_at: now,
        source: AssignmentSource::Manual,
    }
}

proptest! {
    /// Every academic year's 14 blocks tile [July 1, June 30] with no gap
    /// or overlap, and every block 1..=12 is exactly 28 days running
    /// Thursday through Wednesday, for any year in a multi-century range.
    #[test]
    fn calendar_totality_holds_for_any_year(year in 1950i32..2150) {
        prop_assert!(validate_alignment(year).is_ok());
        for block in 1..=12u8 {
            let dates = block_dates(block, year).unwrap();
            prop_assert_eq!(dates.duration_days, 28);
            prop_assert_eq!(dates.start.weekday(), Weekday::Thu);
        }
    }

    /// Every date maps to exactly one `(block, academic_year)`, and asking
    /// for that block's start date maps back to the same date's own block
    /// (not necessarily the same date, since `block_number_for_date` of a
    /// block's start is that block by construction).
    #[test]
    fn block_number_for_date_is_stable_under_its_own_block_start(
        year in 2000i32..2100,
        block in 1u8..=12,
    ) {
        let dates = block_dates(block, year).unwrap();
        let (found_block, found_year) = block_number_for_date(dates.start);
        prop_assert_eq!(found_block, block);
        prop_assert_eq!(found_year, year);
    }

    /// No matter how many (block, person) pairs repeat, `OnePerBlockConstraint`
    /// flags exactly the assignments beyond the first for each pair.
    #[test]
    fn assignment_uniqueness_flags_exact_duplicate_count(
        pair_count in 1usize..6,
        repeats in prop::collection::vec(1usize..4, 1..6),
    ) {
        let block_ids: Vec<Uuid> = (0..pair_count).map(|_| Uuid::new_v4()).collect();
        let persons: Vec<_> = (0..pair_count).map(|i| make_resident(&format!("R{i}"), 2)).collect();

        let mut assignments = Vec::new();
        let mut expected_duplicates = 0usize;
        for i in 0..pair_count {
            let times = repeats.get(i).copied().unwrap_or(1);
            expected_duplicates += times.saturating_sub(1);
            for _ in 0..times {
                assignments.push(bare_assignment(block_ids[i], persons[i].id, false));
            }
        }

        let mut snapshot = PeriodSnapshot::default();
        snapshot.persons = persons;
        let ctx = SchedulingContext::build(snapshot);
        let violations = OnePerBlockConstraint.validate(&assignments, &ctx);
        prop_assert_eq!(violations.len(), expected_duplicates);
    }

    /// A non-override assignment on a blocked date is always flagged; the
    /// same assignment carrying a documented override is never flagged,
    /// regardless of how many other blocked/open days surround it.
    #[test]
    fn availability_violation_tracks_blocking_absence_and_override(
        is_blocked in any::<bool>(),
        is_override in any::<bool>(),
    ) {
        let resident = make_resident("R1", 2);
        let block = make_block(NaiveDate::from_ymd_opt(2026, 7, 1).unwrap(), TimeOfDay::Am, 0);

        let mut snapshot = PeriodSnapshot::default();
        snapshot.persons.push(resident.clone());
        snapshot.blocks.push(block.clone());
        if is_blocked {
            snapshot.absences.push(Absence {
                id: Uuid::new_v4(),
                person_id: resident.id,
                start_date: block.date,
                end_date: block.date,
                absence_type: AbsenceType::Vacation,
                is_blocking: true,
            });
        }

        let assignment = bare_assignment(block.id, resident.id, is_override);
        let ctx = SchedulingContext::build(snapshot);
        let violations = AvailabilityConstraint.validate(&[assignment], &ctx);

        let expect_violation = is_blocked && !is_override;
        prop_assert_eq!(violations.len(), if expect_violation { 1 } else { 0 });
    }

    /// `required_faculty` is non-decreasing in either census count and
    /// never exceeds what a single extra PGY-1 or PGY-2/3 could add.
    #[test]
    fn required_faculty_is_monotonic(
        pgy1 in 0u32..40,
        pgy2_3 in 0u32..40,
    ) {
        let base = required_faculty(pgy1, pgy2_3);
        prop_assert!(required_faculty(pgy1 + 1, pgy2_3) >= base);
        prop_assert!(required_faculty(pgy1, pgy2_3 + 1) >= base);
        prop_assert!(required_faculty(pgy1 + 1, pgy2_3) <= base + 1);
        prop_assert!(required_faculty(pgy1, pgy2_3 + 1) <= base + 1);
    }

    /// Any `ConstraintKind` built from arbitrary name/priority/weight
    /// survives a JSON round-trip byte-for-byte in its parsed form.
    #[test]
    fn constraint_kind_serialisation_round_trips(
        is_hard in any::<bool>(),
        name in "[A-Za-z]{3,12}",
        weight in 0.0f64..5.0,
    ) {
        let parameters = serde_json::json!({ "note": name.clone() });
        let built = if is_hard {
            ConstraintKind::Hard {
                name: name.clone(),
                constraint_type: ConstraintType::Supervision,
                priority: Priority::High,
                parameters,
            }
        } else {
            ConstraintKind::Soft {
                name: name.clone(),
                constraint_type: ConstraintType::Equity,
                weight,
                parameters,
            }
        };

        let json = built.to_json().unwrap();
        let parsed = ConstraintKind::from_json(json).unwrap();
        prop_assert_eq!(built, parsed);
    }
}

// The remaining invariants (Wednesday-PM LEC, PGY-1 Wed-AM continuity,
// night-float AM pattern, 80-hour rolling, 1-in-7, batch idempotence) are
// exercised as deterministic unit tests alongside their constraints rather
// than here, since each depends on fixed calendar geometry a property
// generator would spend most of its budget reproducing rather than varying.
