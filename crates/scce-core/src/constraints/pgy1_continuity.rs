use serde_json::json;

use super::{ConstraintExpr, ConstraintType, EncodedConstraint, HardConstraint, LinearTerm, Priority, Severity, VarRef, Violation};
use crate::context::SchedulingContext;
use crate::domain::Assignment;
use crate::redact::person_ref;

/// On Wednesday-AM blocks, every PGY-1 must be assigned a continuity-clinic
/// template (abbreviation in {C, CONT, CONTINUITY}).
pub struct Pgy1WednesdayAmContinuityConstraint;

impl HardConstraint for Pgy1WednesdayAmContinuityConstraint {
    fn name(&self) -> &str {
        "PGY1WednesdayAMContinuity"
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
            if !person.is_pgy1() {
                continue;
            }
            for (b_idx, block) in ctx.blocks.iter().enumerate() {
                if !block.is_wednesday_am() {
                    continue;
                }
                if !ctx.is_available(person.id, block.id) {
                    continue;
                }
                let terms: Vec<LinearTerm> = ctx
                    .templates
                    .iter()
                    .enumerate()
                    .filter(|(_, t)| t.is_continuity_clinic())
                    .map(|(k_idx, _)| LinearTerm {
                        var: VarRef::T { person: p_idx, block: b_idx, template: k_idx },
                        coef: 1.0,
                    })
                    .collect();
                if !terms.is_empty() {
                    exprs.push(ConstraintExpr::Eq { terms, rhs: 1.0 });
                }
            }
        }
        EncodedConstraint { source: self.name().to_string(), exprs }
    }

    fn validate(&self, assignments: &[Assignment], ctx: &SchedulingContext) -> Vec<Violation> {
        let mut violations = Vec::new();
        for person in ctx.residents().filter(|p| p.is_pgy1()) {
            for block in ctx.blocks.iter().filter(|b| b.is_wednesday_am()) {
                if !ctx.is_available(person.id, block.id) {
                    continue;
                }
                let assignment = assignments
                    .iter()
                    .find(|a| a.person_id == person.id && a.block_id == block.id);
                let ok = assignment
                    .and_then(|a| a.rotation_template_id)
                    .and_then(|id| ctx.template(id))
                    .map(|t| t.is_continuity_clinic())
                    .unwrap_or(false);
                if !ok {
                    violations.push(Violation {
                        constraint_name: self.name().to_string(),
                        severity: Severity::High,
                        message: "PGY-1 missing continuity-clinic assignment on Wednesday AM".to_string(),
                        affected_ref: person_ref(person),
                        block_id: Some(block.id),
                        date_context: Some(block.date),
                        details: json!({}),
                        suggested_action: Some("assign the PGY-1 to continuity clinic".to_string()),
                    });
                }
            }
        }
        violations
    }
}
