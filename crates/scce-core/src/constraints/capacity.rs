use super::{ConstraintExpr, ConstraintType, EncodedConstraint, HardConstraint, LinearTerm, Priority, Severity, VarRef, Violation};
use crate::context::SchedulingContext;
use crate::domain::Assignment;
use serde_json::json;
use std::collections::HashMap;

/// For each `(b, k)` with `counts_toward_physical_capacity`,
/// `sum_r t[r,b,k] <= max_residents` (default 6).
pub struct CapacityConstraint {
    pub default_max_residents: u32,
}

impl HardConstraint for CapacityConstraint {
    fn name(&self) -> &str {
        "Capacity"
    }

    fn constraint_type(&self) -> ConstraintType {
        ConstraintType::Capacity
    }

    fn priority(&self) -> Priority {
        Priority::High
    }

    fn parameters(&self) -> serde_json::Value {
        json!({ "default_max_residents": self.default_max_residents })
    }

    fn encode(&self, ctx: &SchedulingContext) -> EncodedConstraint {
        let mut exprs = Vec::new();
        for (b_idx, _) in ctx.blocks.iter().enumerate() {
            for (k_idx, template) in ctx.templates.iter().enumerate() {
                if !template.counts_toward_physical_capacity {
                    continue;
                }
                let max = template.max_residents.unwrap_or(self.default_max_residents) as f64;
                let terms: Vec<LinearTerm> = (0..ctx.persons.len())
                    .map(|p_idx| LinearTerm {
                        var: VarRef::T { person: p_idx, block: b_idx, template: k_idx },
                        coef: 1.0,
                    })
                    .collect();
                exprs.push(ConstraintExpr::Le { terms, rhs: max });
            }
        }
        EncodedConstraint { source: self.name().to_string(), exprs }
    }

    fn validate(&self, assignments: &[Assignment], ctx: &SchedulingContext) -> Vec<Violation> {
        let mut counts: HashMap<(uuid::Uuid, uuid::Uuid), u32> = HashMap::new();
        for a in assignments {
            if let Some(rt) = a.rotation_template_id {
                *counts.entry((a.block_id, rt)).or_insert(0) += 1;
            }
        }
        let mut violations = Vec::new();
        for ((block_id, template_id), count) in counts {
            let Some(template) = ctx.template(template_id) else { continue };
            if !template.counts_toward_physical_capacity {
                continue;
            }
            let max = template.max_residents.unwrap_or(self.default_max_residents);
            if count > max {
                let block = ctx.block(block_id);
                violations.push(Violation {
                    constraint_name: self.name().to_string(),
                    severity: Severity::High,
                    message: format!(
                        "{} residents assigned to {} (max {})",
                        count, template.abbreviation, max
                    ),
                    affected_ref: template.abbreviation.clone(),
                    block_id: Some(block_id),
                    date_context: block.map(|b| b.date),
                    details: json!({ "count": count, "max": max }),
                    suggested_action: Some("reduce assigned count or raise max_residents".to_string()),
                });
            }
        }
        violations
    }
}
