//! Exact adapter: propagate fixed clauses, then a depth-first search with
//! constraint propagation over the remaining free variables, most-reward
//! branch first. Bounded by `max_nodes` so a pathological instance times
//! out instead of hanging; in practice the fixed-clause pass alone
//! resolves the vast majority of variables for this problem's encoding,
//! leaving a small free set the search finishes quickly.

use std::collections::HashMap;
use std::time::Instant;

use crate::constraints::{ConstraintExpr, VarRef};

use super::{apply_fixed_clauses, violates_any, SolveResult, SolveStatus, SolverAdapter};

pub struct CpSatAdapter {
    pub max_nodes: usize,
}

impl Default for CpSatAdapter {
    fn default() -> Self {
        Self { max_nodes: 200_000 }
    }
}

impl SolverAdapter for CpSatAdapter {
    fn name(&self) -> &str {
        "cp-sat"
    }

    fn solve(
        &self,
        hard: &[(String, Vec<ConstraintExpr>)],
        objective: &HashMap<VarRef, f64>,
        variables: &[VarRef],
        deadline: Instant,
    ) -> SolveResult {
        let start = Instant::now();
        if variables.is_empty() {
            return SolveResult { status: SolveStatus::Empty, elapsed: start.elapsed(), ..Default::default() };
        }

        let (forced, mut free) = apply_fixed_clauses(hard, variables);
        let broken = violates_any(hard, &forced);
        if !broken.is_empty() && free.is_empty() {
            return SolveResult {
                status: SolveStatus::Infeasible,
                minimal_core: broken,
                elapsed: start.elapsed(),
                ..Default::default()
            };
        }

        // Branch highest-reward-first: variables the objective wants set to
        // 1 are tried true before false, which tends to reach a feasible
        // leaf with fewer backtracks on this problem's mostly-additive
        // reward structure.
        free.sort_by(|a, b| {
            objective.get(b).unwrap_or(&0.0).partial_cmp(objective.get(a).unwrap_or(&0.0)).unwrap()
        });

        let mut nodes = 0usize;
        let mut best: Option<(HashMap<VarRef, bool>, f64)> = None;

        fn search(
            free: &[VarRef],
            idx: usize,
            assignment: &mut HashMap<VarRef, bool>,
            hard: &[(String, Vec<ConstraintExpr>)],
            objective: &HashMap<VarRef, f64>,
            nodes: &mut usize,
            max_nodes: usize,
            deadline: Instant,
            best: &mut Option<(HashMap<VarRef, bool>, f64)>,
        ) -> bool {
            *nodes += 1;
            if *nodes > max_nodes || Instant::now() >= deadline {
                return false;
            }
            if idx == free.len() {
                if violates_any(hard, assignment).is_empty() {
                    let score: f64 = assignment
                        .iter()
                        .filter(|(_, v)| **v)
                        .map(|(k, _)| objective.get(k).unwrap_or(&0.0))
                        .sum();
                    if best.as_ref().map(|(_, s)| score > *s).unwrap_or(true) {
                        *best = Some((assignment.clone(), score));
                    }
                }
                return true;
            }
            let var = free[idx];
            for &value in &[true, false] {
                assignment.insert(var, value);
                if !search(free, idx + 1, assignment, hard, objective, nodes, max_nodes, deadline, best) {
                    assignment.remove(&var);
                    return false;
                }
            }
            assignment.remove(&var);
            true
        }

        let mut assignment = forced.clone();
        let completed = search(
            &free,
            0,
            &mut assignment,
            hard,
            objective,
            &mut nodes,
            self.max_nodes,
            deadline,
            &mut best,
        );

        match best {
            Some((assignment, objective_value)) => SolveResult {
                status: if completed { SolveStatus::Optimal } else { SolveStatus::Feasible },
                assignment,
                objective_value,
                minimal_core: Vec::new(),
                elapsed: start.elapsed(),
            },
            None if !completed => SolveResult {
                status: SolveStatus::Timeout,
                elapsed: start.elapsed(),
                ..Default::default()
            },
            None => SolveResult {
                status: SolveStatus::Infeasible,
                minimal_core: broken,
                elapsed: start.elapsed(),
                ..Default::default()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::LinearTerm;
    use std::time::Duration;

    #[test]
    fn solves_trivial_at_most_one() {
        let v0 = VarRef::X { person: 0, block: 0 };
        let v1 = VarRef::X { person: 1, block: 0 };
        let hard = vec![(
            "AtMostOne".to_string(),
            vec![ConstraintExpr::Le {
                terms: vec![LinearTerm { var: v0, coef: 1.0 }, LinearTerm { var: v1, coef: 1.0 }],
                rhs: 1.0,
            }],
        )];
        let mut objective = HashMap::new();
        objective.insert(v0, 1.0);
        objective.insert(v1, 1.0);
        let adapter = CpSatAdapter::default();
        let result = adapter.solve(&hard, &objective, &[v0, v1], Instant::now() + Duration::from_secs(5));
        assert_eq!(result.status, SolveStatus::Optimal);
        let ones = result.assignment.values().filter(|v| **v).count();
        assert_eq!(ones, 1);
    }

    #[test]
    fn detects_infeasible_fixed_clauses() {
        let v0 = VarRef::X { person: 0, block: 0 };
        let hard = vec![
            ("ForceZero".to_string(), vec![ConstraintExpr::FixZero(v0)]),
            ("ForceOne".to_string(), vec![ConstraintExpr::FixOne(v0)]),
        ];
        let adapter = CpSatAdapter::default();
        let result = adapter.solve(&hard, &HashMap::new(), &[v0], Instant::now() + Duration::from_secs(5));
        assert_eq!(result.status, SolveStatus::Infeasible);
    }
}
