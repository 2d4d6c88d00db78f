//! Turns a degraded resilience reading into a prioritised recovery plan.
//! Defense-in-depth: several independent steps rather than one silver
//! bullet, with a fallback list in case the plan itself doesn't hold.

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DefenseLevel {
    Green,
    Yellow,
    Orange,
    Red,
    Black,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryAction {
    ReduceLoad,
    AddCapacity,
    ActivateBackup,
    RedistributeWork,
    ImplementRestrictions,
    EmergencyProtocol,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecoveryStep {
    pub action: RecoveryAction,
    pub priority: u8,
    pub description: String,
    pub estimated_hours: f64,
    pub success_criteria: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecoveryPlan {
    pub current_level: DefenseLevel,
    pub target_level: DefenseLevel,
    pub steps: Vec<RecoveryStep>,
    pub estimated_total_hours: f64,
    pub success_probability: f64,
    pub contingency_actions: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecoveryInputs {
    pub current_level: DefenseLevel,
    pub utilization: f64,
    pub n1_failures: u32,
    pub n2_failures: u32,
    pub coverage_gaps: u32,
    pub burnout_cases: u32,
}

pub fn plan_recovery(inputs: RecoveryInputs) -> RecoveryPlan {
    let mut steps = Vec::new();

    steps.extend(match inputs.current_level {
        DefenseLevel::Black => black_steps(),
        DefenseLevel::Red => red_steps(),
        DefenseLevel::Orange => orange_steps(),
        DefenseLevel::Yellow => yellow_steps(),
        DefenseLevel::Green => Vec::new(),
    });

    if inputs.utilization > 0.95 {
        steps.push(RecoveryStep {
            action: RecoveryAction::AddCapacity,
            priority: 1,
            description: format!("urgent: add capacity immediately (current {:.0}%)", inputs.utilization * 100.0),
            estimated_hours: 2.0,
            success_criteria: "utilization < 90%".to_string(),
        });
    }

    if inputs.coverage_gaps > 0 {
        steps.push(RecoveryStep {
            action: RecoveryAction::ActivateBackup,
            priority: 1,
            description: format!("fill {} coverage gaps with backup personnel", inputs.coverage_gaps),
            estimated_hours: inputs.coverage_gaps as f64 * 0.5,
            success_criteria: "zero coverage gaps".to_string(),
        });
    }

    if inputs.burnout_cases > 0 {
        steps.push(RecoveryStep {
            action: RecoveryAction::ReduceLoad,
            priority: 2,
            description: format!("reduce workload for {} affected residents", inputs.burnout_cases),
            estimated_hours: 24.0,
            success_criteria: "burnout reproduction rate < 1.0".to_string(),
        });
    }

    if inputs.n1_failures > 0 {
        steps.push(RecoveryStep {
            action: RecoveryAction::ActivateBackup,
            priority: 2,
            description: format!("cross-train backups for {} single-point-of-failure role(s)", inputs.n1_failures),
            estimated_hours: inputs.n1_failures as f64 * 16.0,
            success_criteria: "every role has a qualified backup".to_string(),
        });
    }

    if inputs.n2_failures > 0 {
        steps.push(RecoveryStep {
            action: RecoveryAction::AddCapacity,
            priority: 3,
            description: format!("add redundancy to address {} N-2 vulnerabilities", inputs.n2_failures),
            estimated_hours: 48.0,
            success_criteria: "N-2 failures < 5".to_string(),
        });
    }

    steps.sort_by_key(|s| s.priority);
    let estimated_total_hours = steps.iter().map(|s| s.estimated_hours).sum();
    let success_probability = estimate_success_probability(inputs.current_level, steps.len());
    let contingency_actions = contingencies(inputs.current_level);

    RecoveryPlan {
        current_level: inputs.current_level,
        target_level: DefenseLevel::Green,
        steps,
        estimated_total_hours,
        success_probability,
        contingency_actions,
    }
}

fn black_steps() -> Vec<RecoveryStep> {
    vec![
        RecoveryStep {
            action: RecoveryAction::EmergencyProtocol,
            priority: 1,
            description: "activate emergency response plan immediately".to_string(),
            estimated_hours: 0.5,
            success_criteria: "emergency protocols active".to_string(),
        },
        RecoveryStep {
            action: RecoveryAction::ActivateBackup,
            priority: 1,
            description: "activate all backup coverage immediately".to_string(),
            estimated_hours: 1.0,
            success_criteria: "all backup personnel deployed".to_string(),
        },
        RecoveryStep {
            action: RecoveryAction::ImplementRestrictions,
            priority: 1,
            description: "suspend non-critical operations".to_string(),
            estimated_hours: 0.5,
            success_criteria: "non-critical services suspended".to_string(),
        },
    ]
}

fn red_steps() -> Vec<RecoveryStep> {
    vec![
        RecoveryStep {
            action: RecoveryAction::ActivateBackup,
            priority: 1,
            description: "activate backup coverage".to_string(),
            estimated_hours: 2.0,
            success_criteria: "backup coverage operational".to_string(),
        },
        RecoveryStep {
            action: RecoveryAction::ReduceLoad,
            priority: 2,
            description: "defer elective and non-urgent assignments".to_string(),
            estimated_hours: 1.0,
            success_criteria: "utilization below 90%".to_string(),
        },
    ]
}

fn orange_steps() -> Vec<RecoveryStep> {
    vec![
        RecoveryStep {
            action: RecoveryAction::RedistributeWork,
            priority: 2,
            description: "redistribute workload to balance utilization".to_string(),
            estimated_hours: 4.0,
            success_criteria: "utilization balanced across all residents".to_string(),
        },
        RecoveryStep {
            action: RecoveryAction::ReduceLoad,
            priority: 3,
            description: "gradually reduce non-essential assignments".to_string(),
            estimated_hours: 8.0,
            success_criteria: "utilization below 85%".to_string(),
        },
    ]
}

fn yellow_steps() -> Vec<RecoveryStep> {
    vec![RecoveryStep {
        action: RecoveryAction::RedistributeWork,
        priority: 3,
        description: "optimize schedule to reduce peaks".to_string(),
        estimated_hours: 12.0,
        success_criteria: "peak utilization below 85%".to_string(),
    }]
}

fn estimate_success_probability(level: DefenseLevel, num_steps: usize) -> f64 {
    let base = match level {
        DefenseLevel::Green => 1.0,
        DefenseLevel::Yellow => 0.9,
        DefenseLevel::Orange => 0.7,
        DefenseLevel::Red => 0.5,
        DefenseLevel::Black => 0.3,
    };
    let complexity_penalty = 0.05 * num_steps.saturating_sub(1) as f64;
    (base - complexity_penalty).max(0.1)
}

fn contingencies(level: DefenseLevel) -> Vec<String> {
    match level {
        DefenseLevel::Black => vec![
            "request mutual aid from other residency programs".to_string(),
            "activate GME emergency protocols".to_string(),
            "notify ACGME of the emergency".to_string(),
            "consider temporary service reductions".to_string(),
        ],
        DefenseLevel::Red => vec![
            "escalate to program leadership".to_string(),
            "request external assistance".to_string(),
            "prepare for emergency staffing".to_string(),
        ],
        _ => vec![
            "monitor closely and escalate if deteriorating".to_string(),
            "prepare backup plans".to_string(),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn black_level_prioritises_emergency_protocol_first() {
        let plan = plan_recovery(RecoveryInputs {
            current_level: DefenseLevel::Black,
            utilization: 0.99,
            n1_failures: 0,
            n2_failures: 0,
            coverage_gaps: 0,
            burnout_cases: 0,
        });
        assert_eq!(plan.steps[0].action, RecoveryAction::EmergencyProtocol);
        assert_eq!(plan.target_level, DefenseLevel::Green);
    }

    #[test]
    fn green_level_with_no_problems_has_no_steps() {
        let plan = plan_recovery(RecoveryInputs {
            current_level: DefenseLevel::Green,
            utilization: 0.5,
            n1_failures: 0,
            n2_failures: 0,
            coverage_gaps: 0,
            burnout_cases: 0,
        });
        assert!(plan.steps.is_empty());
        assert_eq!(plan.success_probability, 1.0);
    }

    #[test]
    fn more_steps_reduce_success_probability() {
        let plan = plan_recovery(RecoveryInputs {
            current_level: DefenseLevel::Red,
            utilization: 0.96,
            n1_failures: 1,
            n2_failures: 2,
            coverage_gaps: 3,
            burnout_cases: 1,
        });
        assert!(plan.success_probability < 0.5);
    }

    #[test]
    fn n1_failures_trigger_a_cross_training_step() {
        let plan = plan_recovery(RecoveryInputs {
            current_level: DefenseLevel::Yellow,
            utilization: 0.8,
            n1_failures: 2,
            n2_failures: 0,
            coverage_gaps: 0,
            burnout_cases: 0,
        });
        assert!(plan.steps.iter().any(|s| s.action == RecoveryAction::ActivateBackup
            && s.description.contains("cross-train")));
    }
}
