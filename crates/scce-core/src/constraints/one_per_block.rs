use super::{ConstraintExpr, ConstraintType, EncodedConstraint, HardConstraint, LinearTerm, Priority, Severity, VarRef, Violation};
use crate::context::SchedulingContext;
use crate::domain::Assignment;
use crate::redact::person_ref;
use serde_json::json;
use std::collections::HashSet;

/// `sum_k t[r,b,k] <= 1` for each `(r,b)`; and `x[r,b] = sum_k t[r,b,k]`.
pub struct OnePerBlockConstraint;

impl HardConstraint for OnePerBlockConstraint {
    fn name(&self) -> &str {
        "OnePerBlock"
    }

    fn constraint_type(&self) -> ConstraintType {
        ConstraintType::Rotation
    }

    fn priority(&self) -> Priority {
        Priority::Critical
    }

    fn encode(&self, ctx: &SchedulingContext) -> EncodedConstraint {
        let mut exprs = Vec::new();
        for (p_idx, _) in ctx.persons.iter().enumerate() {
            for (b_idx, _) in ctx.blocks.iter().enumerate() {
                let t_terms: Vec<LinearTerm> = (0..ctx.templates.len())
                    .map(|k_idx| LinearTerm {
                        var: VarRef::T { person: p_idx, block: b_idx, template: k_idx },
                        coef: 1.0,
                    })
                    .collect();
                exprs.push(ConstraintExpr::Le { terms: t_terms.clone(), rhs: 1.0 });

                let mut link_terms = t_terms;
                link_terms.push(LinearTerm { var: VarRef::X { person: p_idx, block: b_idx }, coef: -1.0 });
                exprs.push(ConstraintExpr::Eq { terms: link_terms, rhs: 0.0 });
            }
        }
        EncodedConstraint { source: self.name().to_string(), exprs }
    }

    fn validate(&self, assignments: &[Assignment], ctx: &SchedulingContext) -> Vec<Violation> {
        let mut seen = HashSet::new();
        let mut violations = Vec::new();
        for a in assignments {
            if !seen.insert((a.block_id, a.person_id)) {
                let Some(person) = ctx.person(a.person_id) else { continue };
                let block = ctx.block(a.block_id);
                violations.push(Violation {
                    constraint_name: self.name().to_string(),
                    severity: Severity::Critical,
                    message: "duplicate assignment for the same person and block".to_string(),
                    affected_ref: person_ref(person),
                    block_id: Some(a.block_id),
                    date_context: block.map(|b| b.date),
                    details: json!({ "assignment_id": a.id }),
                    suggested_action: Some("delete the duplicate row".to_string()),
                });
            }
        }
        violations
    }
}
