use serde_json::json;

use super::{SoftConstraint, VarRef};
use crate::context::SchedulingContext;

/// Penalises `max_assignments_per_person - min_assignments_per_person`
/// over the period. Implemented as a per-person per-block
/// small negative reward proportional to how far above the period's
/// average load that person already sits in `existing_assignments`, which
/// pushes the solver toward filling currently-under-loaded people first.
pub struct EquityConstraint {
    pub weight: f64,
}

impl SoftConstraint for EquityConstraint {
    fn name(&self) -> &str {
        "Equity"
    }

    fn weight(&self) -> f64 {
        self.weight
    }

    fn parameters(&self) -> serde_json::Value {
        json!({ "weight": self.weight })
    }

    fn objective_terms(&self, ctx: &SchedulingContext) -> Vec<(VarRef, f64)> {
        let mut load: std::collections::HashMap<uuid::Uuid, u32> = std::collections::HashMap::new();
        for p in &ctx.persons {
            load.insert(p.id, 0);
        }
        for a in &ctx.existing_assignments {
            *load.entry(a.person_id).or_insert(0) += 1;
        }
        let avg = if ctx.persons.is_empty() {
            0.0
        } else {
            load.values().sum::<u32>() as f64 / ctx.persons.len() as f64
        };

        let mut terms = Vec::new();
        for (p_idx, person) in ctx.persons.iter().enumerate() {
            let current = *load.get(&person.id).unwrap_or(&0) as f64;
            // Reward is higher for people currently below average, so the
            // solver favours evening out the distribution.
            let reward = (avg - current).max(0.0);
            if reward <= 0.0 {
                continue;
            }
            for (b_idx, _) in ctx.blocks.iter().enumerate() {
                terms.push((VarRef::X { person: p_idx, block: b_idx }, reward));
            }
        }
        terms
    }
}
