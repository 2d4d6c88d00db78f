use serde_json::json;
use std::collections::HashMap;

use super::{SoftConstraint, VarRef};
use crate::context::SchedulingContext;

/// Stigmergy-style accumulator: `(person, slot_type) -> trail strength in
/// [0,1]`, evaporating over time. The solver only ever reads the current
/// strength as a per-assignment reward; trails are updated out-of-band
/// by [`PreferenceTrailMap::reinforce`] /
/// [`PreferenceTrailMap::evaporate`], never by the solver itself.
#[derive(Debug, Clone, Default)]
pub struct PreferenceTrailMap {
    trails: HashMap<(uuid::Uuid, String), f64>,
}

impl PreferenceTrailMap {
    pub fn strength(&self, person_id: uuid::Uuid, slot_type: &str) -> f64 {
        self.trails.get(&(person_id, slot_type.to_string())).copied().unwrap_or(0.0)
    }

    pub fn reinforce(&mut self, person_id: uuid::Uuid, slot_type: &str, amount: f64) {
        let entry = self.trails.entry((person_id, slot_type.to_string())).or_insert(0.0);
        *entry = (*entry + amount).min(1.0);
    }

    pub fn evaporate(&mut self, rate: f64) {
        for v in self.trails.values_mut() {
            *v = (*v * (1.0 - rate)).max(0.0);
        }
    }
}

pub struct PreferenceTrailConstraint {
    pub weight: f64,
    pub trails: PreferenceTrailMap,
}

impl SoftConstraint for PreferenceTrailConstraint {
    fn name(&self) -> &str {
        "PreferenceTrail"
    }

    fn weight(&self) -> f64 {
        self.weight
    }

    fn parameters(&self) -> serde_json::Value {
        json!({ "weight": self.weight })
    }

    fn objective_terms(&self, ctx: &SchedulingContext) -> Vec<(VarRef, f64)> {
        let mut terms = Vec::new();
        for (p_idx, person) in ctx.persons.iter().enumerate() {
            for (b_idx, _) in ctx.blocks.iter().enumerate() {
                for (k_idx, template) in ctx.templates.iter().enumerate() {
                    let strength = self.trails.strength(person.id, &template.abbreviation);
                    if strength > 0.0 {
                        terms.push((
                            VarRef::T { person: p_idx, block: b_idx, template: k_idx },
                            strength,
                        ));
                    }
                }
            }
        }
        terms
    }
}
