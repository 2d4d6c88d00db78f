use serde_json::json;

use super::{ConstraintExpr, ConstraintType, EncodedConstraint, HardConstraint, Priority, Severity, VarRef, Violation};
use crate::context::SchedulingContext;
use crate::domain::Assignment;
use crate::redact::person_ref;

/// For every `t[r,b,k]`: `r.kind` in `template.allowed_person_types`; PGY
/// gates; required specialties; and `time_of_day` match when the template
/// fixes one.
pub struct SpecialtyPgyGatingConstraint;

impl HardConstraint for SpecialtyPgyGatingConstraint {
    fn name(&self) -> &str {
        "SpecialtyAndPGYGating"
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
            for (b_idx, block) in ctx.blocks.iter().enumerate() {
                for (k_idx, template) in ctx.templates.iter().enumerate() {
                    let ok = template.allows(person.kind)
                        && template.pgy_allowed(person.pgy_level)
                        && template.specialties_satisfied(&person.specialties)
                        && template.time_of_day_matches(block.time_of_day);
                    if !ok {
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
            let Some(person) = ctx.person(a.person_id) else { continue };
            let Some(block) = ctx.block(a.block_id) else { continue };
            let Some(template) = a.rotation_template_id.and_then(|id| ctx.template(id)) else { continue };

            let mut reasons = Vec::new();
            if !template.allows(person.kind) {
                reasons.push("person type not allowed");
            }
            if !template.pgy_allowed(person.pgy_level) {
                reasons.push("PGY level out of range");
            }
            if !template.specialties_satisfied(&person.specialties) {
                reasons.push("required specialty missing");
            }
            if !template.time_of_day_matches(block.time_of_day) {
                reasons.push("time-of-day mismatch");
            }
            if !reasons.is_empty() {
                violations.push(Violation {
                    constraint_name: self.name().to_string(),
                    severity: Severity::High,
                    message: reasons.join("; "),
                    affected_ref: person_ref(person),
                    block_id: Some(a.block_id),
                    date_context: Some(block.date),
                    details: json!({ "template": template.abbreviation, "reasons": reasons }),
                    suggested_action: Some("reassign to a compatible template".to_string()),
                });
            }
        }
        violations
    }
}
