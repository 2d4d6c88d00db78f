use serde_json::json;

use super::{ConstraintExpr, ConstraintType, EncodedConstraint, HardConstraint, Priority, Severity, VarRef, Violation};
use crate::context::SchedulingContext;
use crate::domain::Assignment;
use crate::redact::person_ref;

/// For all `(r, b)` where `availability[r][b] == false`, fix `x[r,b] = 0`.
pub struct AvailabilityConstraint;

impl HardConstraint for AvailabilityConstraint {
    fn name(&self) -> &str {
        "Availability"
    }

    fn constraint_type(&self) -> ConstraintType {
        ConstraintType::Availability
    }

    fn priority(&self) -> Priority {
        Priority::Critical
    }

    fn encode(&self, ctx: &SchedulingContext) -> EncodedConstraint {
        let mut exprs = Vec::new();
        for (p_idx, person) in ctx.persons.iter().enumerate() {
            for (b_idx, block) in ctx.blocks.iter().enumerate() {
                if !ctx.is_available(person.id, block.id) {
                    exprs.push(ConstraintExpr::FixZero(VarRef::X { person: p_idx, block: b_idx }));
                }
            }
        }
        EncodedConstraint { source: self.name().to_string(), exprs }
    }

    fn validate(&self, assignments: &[Assignment], ctx: &SchedulingContext) -> Vec<Violation> {
        let mut violations = Vec::new();
        for a in assignments {
            if a.is_override() {
                continue;
            }
            if !ctx.is_available(a.person_id, a.block_id) {
                let Some(person) = ctx.person(a.person_id) else { continue };
                let block = ctx.block(a.block_id);
                violations.push(Violation {
                    constraint_name: self.name().to_string(),
                    severity: Severity::Critical,
                    message: "assignment placed on an unavailable block".to_string(),
                    affected_ref: person_ref(person),
                    block_id: Some(a.block_id),
                    date_context: block.map(|b| b.date),
                    details: json!({ "assignment_id": a.id }),
                    suggested_action: Some("remove or override with a documented reason".to_string()),
                });
            }
        }
        violations
    }
}
