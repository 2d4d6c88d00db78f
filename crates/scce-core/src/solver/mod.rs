//! Solver adapters: three independent ways to turn a set of encoded
//! constraints into a variable assignment, all consuming the same
//! [`crate::constraints::ConstraintExpr`] representation so no constraint
//! needs to know which backend eventually runs it.
//!
//! None of the three wrap an external solver library — no CP-SAT, LP, or
//! QUBO crate exists anywhere in the surrounding dependency graph, so each
//! adapter is a small pure-Rust algorithm tuned to the shape of problem
//! these constraints produce (a few hundred to a few thousand binary
//! variables, mostly `FixZero`/`FixOne`/small `Le`/`Eq` clauses).
//!
//! # Example
//!
//! ```rust,ignore
//! let adapter = CpSatAdapter::default();
//! let result = adapter.solve(&encoded, &objective, &deadline);
//! match result.status {
//!     SolveStatus::Optimal | SolveStatus::Feasible => { /* persist result.assignment */ }
//!     SolveStatus::Infeasible => { /* surface result.minimal_core */ }
//!     _ => {}
//! }
//! ```

pub mod cpsat;
pub mod linear;
#[cfg(feature = "qubo")]
pub mod qubo;

pub use cpsat::CpSatAdapter;
pub use linear::LinearAdapter;
#[cfg(feature = "qubo")]
pub use qubo::QuboAdapter;

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::constraints::{ConstraintExpr, VarRef};

/// Outcome category for a solve attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveStatus {
    /// A provably best (or, for the heuristic adapters, best-found)
    /// assignment satisfying every hard constraint.
    Optimal,
    /// A valid assignment was found but optimality over the objective was
    /// not established.
    Feasible,
    /// No assignment satisfies every hard constraint.
    Infeasible,
    /// The deadline elapsed before a valid assignment was found.
    Timeout,
    /// There was nothing to solve (no variables).
    Empty,
}

#[derive(Debug, Clone, Default)]
pub struct SolveResult {
    pub status: SolveStatus,
    pub assignment: HashMap<VarRef, bool>,
    pub objective_value: f64,
    /// Names of the hard constraints that could not be simultaneously
    /// satisfied, populated only when `status == Infeasible`.
    pub minimal_core: Vec<String>,
    pub elapsed: Duration,
}

impl Default for SolveStatus {
    fn default() -> Self {
        SolveStatus::Empty
    }
}

/// Common surface every solver backend exposes.
pub trait SolverAdapter {
    fn name(&self) -> &str;

    /// `hard` is every `(constraint_name, exprs)` pair already encoded by
    /// `HardConstraint::encode`; `objective` is the flattened per-variable
    /// reward from every `SoftConstraint::objective_terms` call, summed by
    /// variable. `deadline` bounds wall-clock time; adapters must check it
    /// periodically and return `SolveStatus::Timeout` rather than run past
    /// it.
    fn solve(
        &self,
        hard: &[(String, Vec<ConstraintExpr>)],
        objective: &HashMap<VarRef, f64>,
        variables: &[VarRef],
        deadline: Instant,
    ) -> SolveResult;
}

/// Applies every `FixZero`/`FixOne` clause up front. Returns the forced
/// assignment plus the set of variables left free for the adapter's own
/// search. Shared by all three adapters since fixed clauses dominate this
/// problem's encoding (availability, gating, and preload forcing are all
/// expressed this way).
pub(crate) fn apply_fixed_clauses(
    hard: &[(String, Vec<ConstraintExpr>)],
    variables: &[VarRef],
) -> (HashMap<VarRef, bool>, Vec<VarRef>) {
    let mut forced = HashMap::new();
    for (_, exprs) in hard {
        for expr in exprs {
            match expr {
                ConstraintExpr::FixZero(v) => {
                    forced.insert(*v, false);
                }
                ConstraintExpr::FixOne(v) => {
                    forced.insert(*v, true);
                }
                _ => {}
            }
        }
    }
    let free = variables.iter().copied().filter(|v| !forced.contains_key(v)).collect();
    (forced, free)
}

/// Evaluates `sum(coef * value)` for a clause's terms under a (possibly
/// partial) assignment, treating missing variables as 0.
pub(crate) fn term_sum(terms: &[crate::constraints::LinearTerm], assignment: &HashMap<VarRef, bool>) -> f64 {
    terms
        .iter()
        .map(|t| t.coef * if *assignment.get(&t.var).unwrap_or(&false) { 1.0 } else { 0.0 })
        .sum()
}

/// Checks every non-fixing clause against a complete assignment.
pub(crate) fn violates_any(
    hard: &[(String, Vec<ConstraintExpr>)],
    assignment: &HashMap<VarRef, bool>,
) -> Vec<String> {
    let mut broken = Vec::new();
    for (name, exprs) in hard {
        for expr in exprs {
            let ok = match expr {
                ConstraintExpr::Eq { terms, rhs } => (term_sum(terms, assignment) - rhs).abs() < 1e-6,
                ConstraintExpr::Le { terms, rhs } => term_sum(terms, assignment) <= rhs + 1e-6,
                ConstraintExpr::Ge { terms, rhs } => term_sum(terms, assignment) >= rhs - 1e-6,
                ConstraintExpr::FixZero(v) => !*assignment.get(v).unwrap_or(&false),
                ConstraintExpr::FixOne(v) => *assignment.get(v).unwrap_or(&false),
            };
            if !ok {
                broken.push(name.clone());
                break;
            }
        }
    }
    broken
}
