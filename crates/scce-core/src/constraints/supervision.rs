use serde_json::json;

use super::{ConstraintExpr, ConstraintType, EncodedConstraint, HardConstraint, LinearTerm, Priority, Severity, VarRef, Violation};
use crate::context::SchedulingContext;
use crate::domain::{ActivityType, Assignment, AssignmentRole, PersonKind};
use crate::redact::person_ref;

/// `required_faculty = ceil((2*pgy1_count + pgy2_3_count) / 4)`; assigned
/// supervising faculty must be `>= required_faculty`.
///
/// A faculty `Assignment` counts as a supervisor when either
/// `role == Supervising`, or `role == Primary` **and** the assignment's
/// rotation template is explicitly tagged with the required specialty
/// `"supervision"` — faculty assigned as primary on a supervision-tagged
/// activity double as the covering supervisor. `role == Backup` never
/// counts.
pub struct SupervisionRatioConstraint;

fn required_faculty(pgy1_count: u32, pgy2_3_count: u32) -> u32 {
    (2 * pgy1_count + pgy2_3_count).div_ceil(4)
}

fn counts_as_supervisor(a: &Assignment, ctx: &SchedulingContext) -> bool {
    if a.role == AssignmentRole::Supervising {
        return true;
    }
    if a.role == AssignmentRole::Primary {
        if let Some(template) = a.rotation_template_id.and_then(|id| ctx.template(id)) {
            return template.required_specialties.contains("supervision");
        }
    }
    false
}

impl HardConstraint for SupervisionRatioConstraint {
    fn name(&self) -> &str {
        "SupervisionRatio"
    }

    fn constraint_type(&self) -> ConstraintType {
        ConstraintType::Supervision
    }

    fn priority(&self) -> Priority {
        Priority::Critical
    }

    fn encode(&self, ctx: &SchedulingContext) -> EncodedConstraint {
        let mut exprs = Vec::new();
        for (b_idx, block) in ctx.blocks.iter().enumerate() {
            let pgy1_count = ctx
                .residents()
                .filter(|p| p.is_pgy1() && ctx.is_available(p.id, block.id))
                .count() as u32;
            let pgy2_3_count = ctx
                .residents()
                .filter(|p| !p.is_pgy1() && ctx.is_available(p.id, block.id))
                .count() as u32;
            let required = required_faculty(pgy1_count, pgy2_3_count);
            if required == 0 {
                continue;
            }
            let terms: Vec<LinearTerm> = ctx
                .faculty()
                .enumerate()
                .flat_map(|(_, f)| {
                    ctx.person_idx.get(&f.id).into_iter().flat_map(|&p_idx| {
                        ctx.templates.iter().enumerate().filter_map(move |(k_idx, t)| {
                            (t.activity_type == ActivityType::Admin
                                || t.required_specialties.contains("supervision"))
                            .then_some(LinearTerm {
                                var: VarRef::T { person: p_idx, block: b_idx, template: k_idx },
                                coef: 1.0,
                            })
                        })
                    })
                })
                .collect();
            if !terms.is_empty() {
                exprs.push(ConstraintExpr::Ge { terms, rhs: required as f64 });
            }
        }
        EncodedConstraint { source: self.name().to_string(), exprs }
    }

    fn validate(&self, assignments: &[Assignment], ctx: &SchedulingContext) -> Vec<Violation> {
        let mut violations = Vec::new();
        for block in &ctx.blocks {
            let pgy1_count = assignments
                .iter()
                .filter(|a| {
                    a.block_id == block.id
                        && ctx.person(a.person_id).map(|p| p.is_pgy1()).unwrap_or(false)
                })
                .count() as u32;
            let pgy2_3_count = assignments
                .iter()
                .filter(|a| {
                    a.block_id == block.id
                        && ctx
                            .person(a.person_id)
                            .map(|p| p.kind == PersonKind::Resident && !p.is_pgy1())
                            .unwrap_or(false)
                })
                .count() as u32;
            let required = required_faculty(pgy1_count, pgy2_3_count);
            if required == 0 {
                continue;
            }
            let assigned = assignments
                .iter()
                .filter(|a| a.block_id == block.id && counts_as_supervisor(a, ctx))
                .count() as u32;
            if assigned < required {
                let deficit = required - assigned;
                violations.push(Violation {
                    constraint_name: self.name().to_string(),
                    severity: if deficit >= 2 { Severity::Critical } else { Severity::High },
                    message: format!(
                        "{} faculty assigned, {} required ({} PGY-1, {} PGY-2/3)",
                        assigned, required, pgy1_count, pgy2_3_count
                    ),
                    affected_ref: "FAC-PD".to_string(),
                    block_id: Some(block.id),
                    date_context: Some(block.date),
                    details: json!({ "assigned": assigned, "required": required }),
                    suggested_action: Some(format!(
                        "add >= {} faculty on {} {:?}",
                        deficit, block.date, block.time_of_day
                    )),
                });
            }
        }
        violations
    }
}
