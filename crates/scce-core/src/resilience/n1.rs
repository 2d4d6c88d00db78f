//! N-1 contingency analysis: can the schedule survive losing any single
//! person or specialty? Modelled on power-grid contingency analysis, where
//! a system must stay stable after any single component failure.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentKind {
    Person,
    Specialty,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FailureScenario {
    pub component_id: String,
    pub component_kind: ComponentKind,
    pub affected_slots: usize,
    pub cascade_potential: f64,
    pub recovery_time_hours: f64,
    pub criticality_score: f64,
    pub backup_available: bool,
    pub backup_ids: Vec<String>,
    pub mitigation_strategy: String,
}

#[derive(Debug, Default)]
pub struct N1Analyzer {
    pub scenarios: Vec<FailureScenario>,
}

impl N1Analyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn analyze_person_failure(
        &mut self,
        person_id: &str,
        affected_slots: usize,
        available_backups: &[String],
        backup_capacity: &std::collections::HashMap<String, u32>,
    ) -> FailureScenario {
        let viable_backups: Vec<String> = available_backups
            .iter()
            .filter(|id| backup_capacity.get(*id).copied().unwrap_or(0) as usize >= affected_slots)
            .cloned()
            .collect();
        let backup_available = !viable_backups.is_empty();

        let criticality_score = if affected_slots == 0 {
            0.0
        } else if backup_available {
            (affected_slots as f64 / 20.0).min(0.5)
        } else {
            (0.5 + affected_slots as f64 / 10.0).min(1.0)
        };

        let recovery_time_hours =
            if backup_available { 2.0 } else { affected_slots as f64 * 4.0 };

        let cascade_potential =
            if backup_available { 0.0 } else { (affected_slots as f64 / 15.0).min(0.8) };

        let mitigation_strategy = if backup_available {
            format!("activate backup: {}", viable_backups[0])
        } else if affected_slots < 5 {
            "distribute shifts among existing staff".to_string()
        } else {
            "activate emergency staffing protocol".to_string()
        };

        let scenario = FailureScenario {
            component_id: person_id.to_string(),
            component_kind: ComponentKind::Person,
            affected_slots,
            cascade_potential,
            recovery_time_hours,
            criticality_score,
            backup_available,
            backup_ids: viable_backups,
            mitigation_strategy,
        };
        self.scenarios.push(scenario.clone());
        scenario
    }

    pub fn analyze_specialty_failure(
        &mut self,
        specialty: &str,
        required_slots: usize,
        specialist_count: usize,
        cross_trained: &[String],
    ) -> FailureScenario {
        let backup_available = specialist_count > 1 || !cross_trained.is_empty();

        let (criticality_score, cascade_potential) = match specialist_count {
            0 | 1 => (0.9, 0.7),
            2 => (0.6, 0.4),
            _ => (0.3, 0.1),
        };

        let recovery_time_hours =
            if backup_available { required_slots as f64 * 2.0 } else { required_slots as f64 * 8.0 };

        let mitigation_strategy = if backup_available {
            format!("activate cross-trained personnel: {}", cross_trained.join(", "))
        } else {
            "request external coverage from other programs".to_string()
        };

        let scenario = FailureScenario {
            component_id: specialty.to_string(),
            component_kind: ComponentKind::Specialty,
            affected_slots: required_slots,
            cascade_potential,
            recovery_time_hours,
            criticality_score,
            backup_available,
            backup_ids: cross_trained.to_vec(),
            mitigation_strategy,
        };
        self.scenarios.push(scenario.clone());
        scenario
    }

    pub fn find_single_points_of_failure(&self, min_criticality: f64) -> Vec<&FailureScenario> {
        self.scenarios.iter().filter(|s| s.criticality_score >= min_criticality).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_backup_scales_with_affected_slots() {
        let mut analyzer = N1Analyzer::new();
        let scenario = analyzer.analyze_person_failure("R1", 8, &[], &Default::default());
        assert!(!scenario.backup_available);
        assert_eq!(scenario.criticality_score, 0.5 + 8.0 / 10.0);
        assert_eq!(scenario.recovery_time_hours, 32.0);
    }

    #[test]
    fn viable_backup_caps_criticality_at_half() {
        let mut analyzer = N1Analyzer::new();
        let mut capacity = std::collections::HashMap::new();
        capacity.insert("R2".to_string(), 20);
        let scenario =
            analyzer.analyze_person_failure("R1", 6, &["R2".to_string()], &capacity);
        assert!(scenario.backup_available);
        assert!(scenario.criticality_score <= 0.5);
    }

    #[test]
    fn spof_requires_high_criticality_and_no_backup() {
        let mut analyzer = N1Analyzer::new();
        analyzer.analyze_person_failure("R1", 12, &[], &Default::default());
        analyzer.analyze_person_failure("R2", 1, &["R3".to_string()], &{
            let mut m = std::collections::HashMap::new();
            m.insert("R3".to_string(), 5);
            m
        });
        let spofs = analyzer.find_single_points_of_failure(0.7);
        assert_eq!(spofs.len(), 1);
        assert_eq!(spofs[0].component_id, "R1");
    }
}
