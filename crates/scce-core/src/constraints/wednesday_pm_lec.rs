use serde_json::json;

use super::{ConstraintExpr, ConstraintType, EncodedConstraint, HardConstraint, LinearTerm, Priority, Severity, VarRef, Violation};
use crate::context::SchedulingContext;
use crate::domain::{Assignment, PersonKind, WEDNESDAY_PM_LECTURE_ABBREVIATION};
use crate::redact::person_ref;

/// On Wednesday-PM blocks, every resident whose block rotation is not in
/// `LEC_EXEMPT` must have template `LEC-PM`. Primarily enforced by
/// generation-time expansion; this is the belt-and-suspenders encode/validate.
pub struct WednesdayPmLecConstraint;

impl HardConstraint for WednesdayPmLecConstraint {
    fn name(&self) -> &str {
        "WednesdayPMLEC"
    }

    fn constraint_type(&self) -> ConstraintType {
        ConstraintType::Rotation
    }

    fn priority(&self) -> Priority {
        Priority::High
    }

    fn encode(&self, ctx: &SchedulingContext) -> EncodedConstraint {
        let mut exprs = Vec::new();
        let Some(lec_idx) = ctx
            .templates
            .iter()
            .position(|t| t.abbreviation == WEDNESDAY_PM_LECTURE_ABBREVIATION)
        else {
            return EncodedConstraint { source: self.name().to_string(), exprs };
        };

        for (p_idx, person) in ctx.persons.iter().enumerate() {
            if person.kind != PersonKind::Resident {
                continue;
            }
            for (b_idx, block) in ctx.blocks.iter().enumerate() {
                if !block.is_wednesday_pm() || !ctx.is_available(person.id, block.id) {
                    continue;
                }
                let on_exempt_rotation = ctx.existing_assignments.iter().any(|a| {
                    a.person_id == person.id
                        && a.block_id == block.id
                        && a.rotation_template_id
                            .and_then(|id| ctx.template(id))
                            .map(|t| t.is_lec_exempt())
                            .unwrap_or(false)
                });
                if on_exempt_rotation {
                    continue;
                }
                exprs.push(ConstraintExpr::FixOne(VarRef::T {
                    person: p_idx,
                    block: b_idx,
                    template: lec_idx,
                }));
            }
        }
        EncodedConstraint { source: self.name().to_string(), exprs }
    }

    fn validate(&self, assignments: &[Assignment], ctx: &SchedulingContext) -> Vec<Violation> {
        let mut violations = Vec::new();
        for person in ctx.residents() {
            for block in ctx.blocks.iter().filter(|b| b.is_wednesday_pm()) {
                if !ctx.is_available(person.id, block.id) {
                    continue;
                }
                let assignment = assignments
                    .iter()
                    .find(|a| a.person_id == person.id && a.block_id == block.id);
                let Some(template) = assignment
                    .and_then(|a| a.rotation_template_id)
                    .and_then(|id| ctx.template(id))
                else {
                    continue;
                };
                if template.is_lec_exempt() {
                    continue;
                }
                if template.abbreviation != WEDNESDAY_PM_LECTURE_ABBREVIATION {
                    violations.push(Violation {
                        constraint_name: self.name().to_string(),
                        severity: Severity::High,
                        message: format!(
                            "expected LEC-PM on Wednesday PM, found {}",
                            template.abbreviation
                        ),
                        affected_ref: person_ref(person),
                        block_id: Some(block.id),
                        date_context: Some(block.date),
                        details: json!({ "found": template.abbreviation }),
                        suggested_action: Some("reassign to LEC-PM".to_string()),
                    });
                }
            }
        }
        violations
    }
}
