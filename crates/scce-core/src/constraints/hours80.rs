use chrono::Duration;
use serde_json::json;
use std::collections::HashMap;

use super::{ConstraintExpr, ConstraintType, EncodedConstraint, HardConstraint, LinearTerm, Priority, Severity, VarRef, Violation};
use crate::context::SchedulingContext;
use crate::domain::{Assignment, PersonKind};
use crate::redact::person_ref;

/// Sum of hours within any trailing 7-day window per resident must be
/// `<= max_hours` (default 80). Hours = 4 per half-day assignment; call
/// assignments contribute the template's shift length.
pub struct EightyHourRollingConstraint {
    pub max_hours: u32,
}

fn hours_for(template: Option<&crate::domain::RotationTemplate>, block: &crate::domain::Block) -> u32 {
    template
        .and_then(|t| t.call_shift_hours)
        .unwrap_or_else(|| block.default_hours())
}

impl HardConstraint for EightyHourRollingConstraint {
    fn name(&self) -> &str {
        "EightyHourRolling"
    }

    fn constraint_type(&self) -> ConstraintType {
        ConstraintType::Regulatory
    }

    fn priority(&self) -> Priority {
        Priority::Critical
    }

    fn parameters(&self) -> serde_json::Value {
        json!({ "max_hours": self.max_hours })
    }

    fn encode(&self, ctx: &SchedulingContext) -> EncodedConstraint {
        let mut exprs = Vec::new();
        for (p_idx, person) in ctx.persons.iter().enumerate() {
            if person.kind != PersonKind::Resident {
                continue;
            }
            // Anchor on every block's start date; window = that date .. +6 days.
            let mut seen_anchors = std::collections::HashSet::new();
            for block in &ctx.blocks {
                if !seen_anchors.insert(block.date) {
                    continue;
                }
                let window_end = block.date + Duration::days(6);
                let mut terms = Vec::new();
                for (b_idx, b) in ctx.blocks.iter().enumerate() {
                    if b.date < block.date || b.date > window_end {
                        continue;
                    }
                    for (k_idx, template) in ctx.templates.iter().enumerate() {
                        let hours = hours_for(Some(template), b) as f64;
                        terms.push(LinearTerm {
                            var: VarRef::T { person: p_idx, block: b_idx, template: k_idx },
                            coef: hours,
                        });
                    }
                }
                if !terms.is_empty() {
                    exprs.push(ConstraintExpr::Le { terms, rhs: self.max_hours as f64 });
                }
            }
        }
        EncodedConstraint { source: self.name().to_string(), exprs }
    }

    fn validate(&self, assignments: &[Assignment], ctx: &SchedulingContext) -> Vec<Violation> {
        let mut by_person: HashMap<uuid::Uuid, Vec<(chrono::NaiveDate, u32)>> = HashMap::new();
        for a in assignments {
            let Some(person) = ctx.person(a.person_id) else { continue };
            if person.kind != PersonKind::Resident {
                continue;
            }
            let Some(block) = ctx.block(a.block_id) else { continue };
            let template = a.rotation_template_id.and_then(|id| ctx.template(id));
            let hours = hours_for(template, block);
            by_person.entry(a.person_id).or_default().push((block.date, hours));
        }

        let mut violations = Vec::new();
        for (person_id, mut entries) in by_person {
            entries.sort_by_key(|(d, _)| *d);
            let Some(person) = ctx.person(person_id) else { continue };
            let anchors: Vec<_> = entries.iter().map(|(d, _)| *d).collect();
            for anchor in anchors {
                let window_end = anchor + Duration::days(6);
                let total: u32 = entries
                    .iter()
                    .filter(|(d, _)| *d >= anchor && *d <= window_end)
                    .map(|(_, h)| *h)
                    .sum();
                if total > self.max_hours {
                    violations.push(Violation {
                        constraint_name: self.name().to_string(),
                        severity: Severity::Critical,
                        message: format!(
                            "{} hours in the 7-day window starting {} exceeds the {}-hour limit",
                            total, anchor, self.max_hours
                        ),
                        affected_ref: person_ref(person),
                        block_id: None,
                        date_context: Some(anchor),
                        details: json!({ "window_start": anchor, "total_hours": total }),
                        suggested_action: Some("redistribute hours within the window".to_string()),
                    });
                }
            }
        }
        violations
    }
}
