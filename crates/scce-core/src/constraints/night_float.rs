use serde_json::json;

use super::{ConstraintExpr, ConstraintType, EncodedConstraint, HardConstraint, Priority, Severity, VarRef, Violation};
use crate::context::SchedulingContext;
use crate::domain::{night_float_am_mapping, Assignment};
use crate::redact::person_ref;

/// If a resident is on a night-float PM rotation, the same-day AM template
/// must match the fixed mapping.
pub struct NightFloatAmPatternConstraint;

impl HardConstraint for NightFloatAmPatternConstraint {
    fn name(&self) -> &str {
        "NightFloatAMPattern"
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
            for pm_assignment in ctx
                .existing_assignments
                .iter()
                .filter(|a| a.person_id == person.id)
            {
                let Some(pm_block) = ctx.block(pm_assignment.block_id) else { continue };
                if pm_block.time_of_day != crate::domain::TimeOfDay::Pm {
                    continue;
                }
                let Some(pm_template) = pm_assignment.rotation_template_id.and_then(|id| ctx.template(id)) else { continue };
                if !pm_template.is_night_float() {
                    continue;
                }
                let Some(required_am) = night_float_am_mapping(&pm_template.abbreviation) else { continue };
                let Some((am_idx, _)) = ctx
                    .blocks
                    .iter()
                    .enumerate()
                    .find(|(_, b)| b.date == pm_block.date && b.time_of_day == crate::domain::TimeOfDay::Am)
                else {
                    continue;
                };
                if let Some(am_template_idx) = ctx.templates.iter().position(|t| t.abbreviation == required_am) {
                    exprs.push(ConstraintExpr::FixOne(VarRef::T {
                        person: p_idx,
                        block: am_idx,
                        template: am_template_idx,
                    }));
                }
            }
        }
        EncodedConstraint { source: self.name().to_string(), exprs }
    }

    fn validate(&self, assignments: &[Assignment], ctx: &SchedulingContext) -> Vec<Violation> {
        let mut violations = Vec::new();
        for pm_assignment in assignments {
            let Some(pm_block) = ctx.block(pm_assignment.block_id) else { continue };
            if pm_block.time_of_day != crate::domain::TimeOfDay::Pm {
                continue;
            }
            let Some(pm_template) = pm_assignment.rotation_template_id.and_then(|id| ctx.template(id)) else { continue };
            if !pm_template.is_night_float() {
                continue;
            }
            let Some(required_am) = night_float_am_mapping(&pm_template.abbreviation) else { continue };
            let Some(person) = ctx.person(pm_assignment.person_id) else { continue };

            let am_match = assignments.iter().any(|a| {
                a.person_id == pm_assignment.person_id
                    && ctx.block(a.block_id).map(|b| b.date) == Some(pm_block.date)
                    && ctx.block(a.block_id).map(|b| b.time_of_day) == Some(crate::domain::TimeOfDay::Am)
                    && a.rotation_template_id
                        .and_then(|id| ctx.template(id))
                        .map(|t| t.abbreviation == required_am)
                        .unwrap_or(false)
            });
            if !am_match {
                violations.push(Violation {
                    constraint_name: self.name().to_string(),
                    severity: Severity::High,
                    message: format!(
                        "night-float {} requires AM pattern {} on {}",
                        pm_template.abbreviation, required_am, pm_block.date
                    ),
                    affected_ref: person_ref(person),
                    block_id: Some(pm_assignment.block_id),
                    date_context: Some(pm_block.date),
                    details: json!({ "required_am": required_am }),
                    suggested_action: Some(format!("set AM template to {required_am}")),
                });
            }
        }
        violations
    }
}
