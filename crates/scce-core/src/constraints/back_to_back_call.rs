use serde_json::json;

use super::{SoftConstraint, VarRef};
use crate::context::SchedulingContext;
use crate::domain::ActivityType;

/// Penalises placing the same resident on call on two consecutive dates.
pub struct AvoidBackToBackCallConstraint {
    pub weight: f64,
}

impl SoftConstraint for AvoidBackToBackCallConstraint {
    fn name(&self) -> &str {
        "AvoidBackToBackCall"
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
            let call_dates: Vec<_> = ctx
                .existing_assignments
                .iter()
                .filter(|a| a.person_id == person.id)
                .filter_map(|a| {
                    let template = a.rotation_template_id.and_then(|id| ctx.template(id))?;
                    (template.activity_type == ActivityType::Call)
                        .then(|| ctx.block(a.block_id).map(|b| b.date))
                        .flatten()
                })
                .collect();

            for (b_idx, block) in ctx.blocks.iter().enumerate() {
                let adjacent_to_existing_call = call_dates
                    .iter()
                    .any(|d| (*d - block.date).num_days().abs() == 1);
                if !adjacent_to_existing_call {
                    continue;
                }
                for (k_idx, template) in ctx.templates.iter().enumerate() {
                    if template.activity_type == ActivityType::Call {
                        terms.push((VarRef::T { person: p_idx, block: b_idx, template: k_idx }, -1.0));
                    }
                }
            }
        }
        terms
    }
}
