//! N-2 contingency analysis: the same question as N-1 but for the
//! simultaneous loss of two people. Thresholds are stricter than N-1 since
//! two coincident absences erode redundancy faster than the sum of the
//! parts — used to drive cross-training recommendations rather than
//! day-to-day coverage decisions.

#[derive(Debug, Clone, PartialEq)]
pub struct PairFailureScenario {
    pub component_a: String,
    pub component_b: String,
    pub combined_affected_slots: usize,
    pub criticality_score: f64,
    pub backup_available: bool,
    pub cross_training_recommended: bool,
}

#[derive(Debug, Default)]
pub struct N2Analyzer {
    pub scenarios: Vec<PairFailureScenario>,
}

impl N2Analyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn analyze_pair_failure(
        &mut self,
        a_id: &str,
        a_slots: usize,
        b_id: &str,
        b_slots: usize,
        available_backups: &[String],
        backup_capacity: &std::collections::HashMap<String, u32>,
    ) -> PairFailureScenario {
        let combined = a_slots + b_slots;

        let viable_backups = available_backups
            .iter()
            .filter(|id| backup_capacity.get(*id).copied().unwrap_or(0) as usize >= combined)
            .count();
        // Losing two people at once needs at least two independent backups.
        let backup_available = viable_backups >= 2;

        let criticality_score = if combined == 0 {
            0.0
        } else if backup_available {
            (combined as f64 / 15.0).min(0.5)
        } else {
            (0.7 + combined as f64 / 10.0).min(1.0)
        };

        let cross_training_recommended = criticality_score >= 0.6;

        let scenario = PairFailureScenario {
            component_a: a_id.to_string(),
            component_b: b_id.to_string(),
            combined_affected_slots: combined,
            criticality_score,
            backup_available,
            cross_training_recommended,
        };
        self.scenarios.push(scenario.clone());
        scenario
    }

    pub fn candidates_for_cross_training(&self) -> Vec<&PairFailureScenario> {
        self.scenarios.iter().filter(|s| s.cross_training_recommended).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stricter_than_n1_without_backup() {
        let mut analyzer = N2Analyzer::new();
        let scenario = analyzer.analyze_pair_failure("R1", 4, "R2", 4, &[], &Default::default());
        assert!(!scenario.backup_available);
        assert_eq!(scenario.criticality_score, 0.7 + 8.0 / 10.0);
        assert!(scenario.cross_training_recommended);
    }

    #[test]
    fn two_independent_backups_cover_the_pair() {
        let mut analyzer = N2Analyzer::new();
        let mut capacity = std::collections::HashMap::new();
        capacity.insert("B1".to_string(), 10);
        capacity.insert("B2".to_string(), 10);
        let scenario = analyzer.analyze_pair_failure(
            "R1",
            3,
            "R2",
            3,
            &["B1".to_string(), "B2".to_string()],
            &capacity,
        );
        assert!(scenario.backup_available);
        assert!(scenario.criticality_score <= 0.5);
    }
}
