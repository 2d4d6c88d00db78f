//! Solver defaults and thresholds, held in one place rather than as global
//! mutable state.

use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SccConfig {
    pub solver_timeout: Duration,
    pub default_physical_capacity: u32,
    pub max_weekly_hours: u32,
    pub min_rest_days_per_week: u32,
    pub swap_max_date_distance_days: i64,
    pub swap_min_preference_score: f64,
    pub swap_weights: SwapWeights,
    pub cascade: CascadeConfig,
    pub batch_max_items: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SwapWeights {
    pub date_proximity: f64,
    pub type_compat: f64,
    pub faculty_preference: f64,
}

impl Default for SwapWeights {
    fn default() -> Self {
        Self { date_proximity: 0.5, type_compat: 0.2, faculty_preference: 0.3 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CascadeConfig {
    pub burnout_threshold: f64,
    pub burnout_multiplier: f64,
    pub hire_delay_days: u32,
    pub minimum_viable_faculty: u32,
    pub critical_threshold: f64,
    /// Baseline daily per-person departure probability before any
    /// burnout multiplier is applied.
    pub base_departure_rate: f64,
    /// Survival rate below which a cascade run is labelled `Critical`.
    pub survival_rate_critical_threshold: f64,
    /// Samn-Perelli level (1-7) at which a faculty member's own departure
    /// probability is escalated on top of the pool-wide workload multiplier.
    pub critical_fatigue_level: u8,
    /// Extra departure-rate multiplier applied to a faculty member at or
    /// above `critical_fatigue_level`.
    pub fatigue_departure_multiplier: f64,
}

impl Default for CascadeConfig {
    fn default() -> Self {
        Self {
            burnout_threshold: 1.5,
            burnout_multiplier: 5.0,
            hire_delay_days: 45,
            minimum_viable_faculty: 3,
            critical_threshold: 2.0,
            base_departure_rate: 0.01,
            survival_rate_critical_threshold: 0.5,
            critical_fatigue_level: 6,
            fatigue_departure_multiplier: 1.5,
        }
    }
}

impl Default for SccConfig {
    fn default() -> Self {
        Self {
            solver_timeout: Duration::from_secs(30),
            default_physical_capacity: 6,
            max_weekly_hours: 80,
            min_rest_days_per_week: 1,
            swap_max_date_distance_days: 60,
            swap_min_preference_score: 0.0,
            swap_weights: SwapWeights::default(),
            cascade: CascadeConfig::default(),
            batch_max_items: 1000,
        }
    }
}
