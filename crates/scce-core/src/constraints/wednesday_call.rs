use serde_json::json;

use super::{SoftConstraint, VarRef};
use crate::context::SchedulingContext;
use crate::domain::ActivityType;

/// Rewards placing a faculty member flagged `prefers_wednesday_call` onto a
/// call template on a Wednesday.
pub struct PreferWednesdayCallConstraint {
    pub weight: f64,
}

impl SoftConstraint for PreferWednesdayCallConstraint {
    fn name(&self) -> &str {
        "PreferWednesdayCall"
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
            if !person.prefers_wednesday_call {
                continue;
            }
            for (b_idx, block) in ctx.blocks.iter().enumerate() {
                if !block.is_wednesday() {
                    continue;
                }
                for (k_idx, template) in ctx.templates.iter().enumerate() {
                    if template.activity_type == ActivityType::Call {
                        terms.push((VarRef::T { person: p_idx, block: b_idx, template: k_idx }, 1.0));
                    }
                }
            }
        }
        terms
    }
}
