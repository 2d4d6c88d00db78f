//! Simulated-annealing adapter standing in for a QUBO (quadratic
//! unconstrained binary optimization) solver: hard clauses are lowered into
//! quadratic penalty terms added to the objective, and the resulting
//! unconstrained landscape is searched by single-bit-flip annealing. Useful
//! when the hard-constraint graph is too entangled for the repair pass in
//! [`super::linear`] to converge quickly, at the cost of a fixed iteration
//! budget rather than a correctness guarantee.

use std::collections::HashMap;
use std::time::Instant;

use rand::Rng;
use rand_distr::{Distribution, Uniform};

use crate::constraints::{ConstraintExpr, VarRef};

use super::{apply_fixed_clauses, term_sum, violates_any, SolveResult, SolveStatus, SolverAdapter};

/// Penalty weight applied per violated unit of slack in a lowered hard
/// clause. Large enough that the anneal always prefers feasibility over
/// objective value once temperature has cooled.
const PENALTY_WEIGHT: f64 = 1_000.0;

pub struct QuboAdapter {
    pub iterations: usize,
    pub initial_temperature: f64,
    pub cooling_rate: f64,
}

impl Default for QuboAdapter {
    fn default() -> Self {
        Self { iterations: 20_000, initial_temperature: 10.0, cooling_rate: 0.999 }
    }
}

impl QuboAdapter {
    fn energy(
        &self,
        hard: &[(String, Vec<ConstraintExpr>)],
        objective: &HashMap<VarRef, f64>,
        assignment: &HashMap<VarRef, bool>,
    ) -> f64 {
        let reward: f64 = assignment
            .iter()
            .filter(|(_, v)| **v)
            .map(|(k, _)| objective.get(k).unwrap_or(&0.0))
            .sum();
        let mut penalty = 0.0;
        for (_, exprs) in hard {
            for expr in exprs {
                penalty += match expr {
                    ConstraintExpr::Eq { terms, rhs } => (term_sum(terms, assignment) - rhs).powi(2),
                    ConstraintExpr::Le { terms, rhs } => (term_sum(terms, assignment) - rhs).max(0.0).powi(2),
                    ConstraintExpr::Ge { terms, rhs } => (rhs - term_sum(terms, assignment)).max(0.0).powi(2),
                    ConstraintExpr::FixZero(v) => {
                        if *assignment.get(v).unwrap_or(&false) {
                            1.0
                        } else {
                            0.0
                        }
                    }
                    ConstraintExpr::FixOne(v) => {
                        if *assignment.get(v).unwrap_or(&false) {
                            0.0
                        } else {
                            1.0
                        }
                    }
                };
            }
        }
        reward - PENALTY_WEIGHT * penalty
    }
}

impl SolverAdapter for QuboAdapter {
    fn name(&self) -> &str {
        "qubo"
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

        let (forced, free) = apply_fixed_clauses(hard, variables);
        let mut assignment = forced;
        for var in &free {
            assignment.insert(*var, false);
        }

        if free.is_empty() {
            let broken = violates_any(hard, &assignment);
            return if broken.is_empty() {
                SolveResult { status: SolveStatus::Optimal, assignment, elapsed: start.elapsed(), ..Default::default() }
            } else {
                SolveResult { status: SolveStatus::Infeasible, minimal_core: broken, elapsed: start.elapsed(), ..Default::default() }
            };
        }

        let mut rng = rand::thread_rng();
        let pick = Uniform::new(0, free.len());
        let mut temperature = self.initial_temperature;
        let mut current_energy = self.energy(hard, objective, &assignment);
        let mut best = assignment.clone();
        let mut best_energy = current_energy;

        for step in 0..self.iterations {
            if step % 256 == 0 && Instant::now() >= deadline {
                break;
            }
            let var = free[pick.sample(&mut rng)];
            let current = *assignment.get(&var).unwrap_or(&false);
            assignment.insert(var, !current);
            let candidate_energy = self.energy(hard, objective, &assignment);
            let delta = candidate_energy - current_energy;
            let accept = delta >= 0.0 || rng.gen::<f64>() < (delta / temperature.max(1e-9)).exp();
            if accept {
                current_energy = candidate_energy;
                if current_energy > best_energy {
                    best_energy = current_energy;
                    best = assignment.clone();
                }
            } else {
                assignment.insert(var, current);
            }
            temperature *= self.cooling_rate;
        }

        let broken = violates_any(hard, &best);
        let timed_out = Instant::now() >= deadline;
        if !broken.is_empty() {
            return SolveResult {
                status: if timed_out { SolveStatus::Timeout } else { SolveStatus::Infeasible },
                minimal_core: broken,
                elapsed: start.elapsed(),
                ..Default::default()
            };
        }

        let objective_value: f64 =
            best.iter().filter(|(_, v)| **v).map(|(k, _)| objective.get(k).unwrap_or(&0.0)).sum();

        SolveResult {
            status: SolveStatus::Feasible,
            assignment: best,
            objective_value,
            minimal_core: Vec::new(),
            elapsed: start.elapsed(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::LinearTerm;
    use std::time::Duration;

    #[test]
    fn anneals_to_a_feasible_at_most_one() {
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
        let adapter = QuboAdapter { iterations: 2_000, ..Default::default() };
        let result = adapter.solve(&hard, &objective, &[v0, v1], Instant::now() + Duration::from_secs(5));
        assert!(matches!(result.status, SolveStatus::Feasible | SolveStatus::Optimal));
        assert!(result.assignment.values().filter(|v| **v).count() <= 1);
    }
}
