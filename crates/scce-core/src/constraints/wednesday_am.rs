use serde_json::json;

use super::{ConstraintExpr, ConstraintType, EncodedConstraint, HardConstraint, Priority, Severity, VarRef, Violation};
use crate::context::SchedulingContext;
use crate::domain::{ActivityType, Assignment};
use crate::redact::person_ref;

/// On Wednesday-AM blocks, for every non-PGY-1 resident and every clinic
/// template `k`: `t[r,b,k] = 0`.
pub struct WednesdayAmInternOnlyConstraint;

impl HardConstraint for WednesdayAmInternOnlyConstraint {
    fn name(&self) -> &str {
        "WednesdayAMInternOnly"
    }

    fn constraint_type(&self) -> ConstraintType {
        ConstraintType::Rotation
    }

    fn priority(&self) -> Priority {
        Priority::High
    }

    fn encode(&self, ctx: &SchedulingContext) -> EncodedConstraint {
        let mut exprs = Vec::new();
        for (p_idx, person) in ctx.persons.iter().enumerate() {
            if person.is_pgy1() {
                continue;
            }
            for (b_idx, block) in ctx.blocks.iter().enumerate() {
                if !block.is_wednesday_am() {
                    continue;
                }
                for (k_idx, template) in ctx.templates.iter().enumerate() {
                    if template.activity_type == ActivityType::Clinic {
                        exprs.push(ConstraintExpr::FixZero(VarRef::T {
                            person: p_idx,
                            block: b_idx,
                            template: k_idx,
                        }));
                    }
                }
            }
        }
        EncodedConstraint { source: self.name().to_string(), exprs }
    }

    fn validate(&self, assignments: &[Assignment], ctx: &SchedulingContext) -> Vec<Violation> {
        let mut violations = Vec::new();
        for a in assignments {
            let Some(block) = ctx.block(a.block_id) else { continue };
            if !block.is_wednesday_am() {
                continue;
            }
            let Some(person) = ctx.person(a.person_id) else { continue };
            if person.is_pgy1() {
                continue;
            }
            let Some(template) = a.rotation_template_id.and_then(|id| ctx.template(id)) else { continue };
            if template.activity_type == ActivityType::Clinic {
                violations.push(Violation {
                    constraint_name: self.name().to_string(),
                    severity: Severity::High,
                    message: "non-PGY-1 resident assigned to Wednesday-AM clinic".to_string(),
                    affected_ref: person_ref(person),
                    block_id: Some(a.block_id),
                    date_context: Some(block.date),
                    details: json!({ "template": template.abbreviation }),
                    suggested_action: Some("reassign to a PGY-1 or move off clinic".to_string()),
                });
            }
        }
        violations
    }
}
