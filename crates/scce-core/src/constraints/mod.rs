//! Two shapes — `HardConstraint` (must hold) and `SoftConstraint`
//! (objective contribution) — both encode into a solver-agnostic
//! [`ConstraintExpr`] representation so the three solver adapters can
//! share one encoding path instead of each constraint knowing about
//! CP-SAT/LP/QUBO internals individually. This flattens a deep
//! inheritance hierarchy down to two flat capabilities plus composition.

mod availability;
mod back_to_back_call;
mod builder;
mod capacity;
mod equity;
mod gating;
mod hours80;
mod night_float;
mod one_in_seven;
mod one_per_block;
mod pgy1_continuity;
mod preference_trails;
mod registry;
mod supervision;
mod wednesday_am;
mod wednesday_call;
mod wednesday_pm_lec;

pub use availability::AvailabilityConstraint;
pub use back_to_back_call::AvoidBackToBackCallConstraint;
pub use builder::{ConstraintBuilder, ConstraintKind};
pub use capacity::CapacityConstraint;
pub use equity::EquityConstraint;
pub use gating::SpecialtyPgyGatingConstraint;
pub use hours80::EightyHourRollingConstraint;
pub use night_float::NightFloatAmPatternConstraint;
pub use one_in_seven::OneInSevenConstraint;
pub use one_per_block::OnePerBlockConstraint;
pub use pgy1_continuity::Pgy1WednesdayAmContinuityConstraint;
pub use preference_trails::{PreferenceTrailConstraint, PreferenceTrailMap};
pub use registry::ConstraintRegistry;
pub use supervision::SupervisionRatioConstraint;
pub use wednesday_am::WednesdayAmInternOnlyConstraint;
pub use wednesday_call::PreferWednesdayCallConstraint;
pub use wednesday_pm_lec::WednesdayPmLecConstraint;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::context::SchedulingContext;
use crate::domain::Assignment;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    // Derive order is declaration order; declare weakest-first so that
    // `Priority::Critical > Priority::Low` holds under `Ord`.
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Info,
    Warning,
    High,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintType {
    Availability,
    Capacity,
    Rotation,
    Equity,
    Preference,
    Supervision,
    Regulatory,
}

/// A single constraint failure, emitted by `validate` in "check existing
/// state" mode. Never an error — see `crate::error` module docs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Violation {
    pub constraint_name: String,
    pub severity: Severity,
    pub message: String,
    /// Anonymised ref, e.g. `RES-001` — never a real name.
    pub affected_ref: String,
    pub block_id: Option<Uuid>,
    pub date_context: Option<NaiveDate>,
    pub details: serde_json::Value,
    pub suggested_action: Option<String>,
}

/// Solver-agnostic decision variable reference. `x[r,b]` is "person r
/// assigned on block b"; `t[r,b,k]` is "person r doing template k on block
/// b"; `day[r,d]` is an auxiliary indicator for "person r has any
/// assignment on calendar day d" (see `SchedulingContext::distinct_dates`
/// for what `d` indexes), used by constraints that reason about whole
/// days rather than individual half-day blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VarRef {
    X { person: usize, block: usize },
    T { person: usize, block: usize, template: usize },
    Day { person: usize, day: usize },
}

#[derive(Debug, Clone, Copy)]
pub struct LinearTerm {
    pub var: VarRef,
    pub coef: f64,
}

/// A single linear constraint over decision variables, the shared encoding
/// target for CP-SAT and the linear adapter. The QUBO adapter lowers these
/// further into quadratic penalty terms.
#[derive(Debug, Clone)]
pub enum ConstraintExpr {
    /// `sum(terms) == rhs`
    Eq { terms: Vec<LinearTerm>, rhs: f64 },
    /// `sum(terms) <= rhs`
    Le { terms: Vec<LinearTerm>, rhs: f64 },
    /// `sum(terms) >= rhs`
    Ge { terms: Vec<LinearTerm>, rhs: f64 },
    FixZero(VarRef),
    FixOne(VarRef),
}

#[derive(Debug, Clone)]
pub struct EncodedConstraint {
    pub source: String,
    pub exprs: Vec<ConstraintExpr>,
}

pub trait HardConstraint: Send + Sync {
    fn name(&self) -> &str;
    fn constraint_type(&self) -> ConstraintType;
    fn priority(&self) -> Priority;
    fn parameters(&self) -> serde_json::Value {
        serde_json::Value::Object(Default::default())
    }
    /// Encode into the shared linear representation for the solver.
    fn encode(&self, ctx: &SchedulingContext) -> EncodedConstraint;
    /// Re-evaluate against persisted assignments ("check existing" mode).
    fn validate(&self, assignments: &[Assignment], ctx: &SchedulingContext) -> Vec<Violation>;
}

/// Objective-contributing constraint. `weight` scales the per-term reward
/// (preference trails, equity) or penalty (back-to-back call) fed to the
/// solver's objective.
pub trait SoftConstraint: Send + Sync {
    fn name(&self) -> &str;
    fn weight(&self) -> f64;
    fn parameters(&self) -> serde_json::Value {
        serde_json::Value::Object(Default::default())
    }
    /// Objective terms: `(variable, per-unit reward)`. A positive reward
    /// means the solver is incentivised to set that variable to 1.
    fn objective_terms(&self, ctx: &SchedulingContext) -> Vec<(VarRef, f64)>;
}

/// Priority precedence comparator for diagnostics:
/// CRITICAL > HIGH > MEDIUM > LOW, tie-break alphabetical by name.
pub fn constraint_precedence_key(priority: Priority, name: &str) -> (std::cmp::Reverse<Priority>, String) {
    (std::cmp::Reverse(priority), name.to_string())
}
