//! Named map `{name -> constructor}` used for deserialisation. Populated
//! once at start-up, never mutated afterwards.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use super::{HardConstraint, SoftConstraint};

type HardCtor = Arc<dyn Fn(&Value) -> Result<Box<dyn HardConstraint>, String> + Send + Sync>;
type SoftCtor = Arc<dyn Fn(&Value) -> Result<Box<dyn SoftConstraint>, String> + Send + Sync>;

#[derive(Default, Clone)]
pub struct ConstraintRegistry {
    hard: HashMap<String, HardCtor>,
    soft: HashMap<String, SoftCtor>,
}

impl ConstraintRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_hard(
        &mut self,
        name: impl Into<String>,
        ctor: impl Fn(&Value) -> Result<Box<dyn HardConstraint>, String> + Send + Sync + 'static,
    ) {
        self.hard.insert(name.into(), Arc::new(ctor));
    }

    pub fn register_soft(
        &mut self,
        name: impl Into<String>,
        ctor: impl Fn(&Value) -> Result<Box<dyn SoftConstraint>, String> + Send + Sync + 'static,
    ) {
        self.soft.insert(name.into(), Arc::new(ctor));
    }

    pub fn build_hard(&self, name: &str, parameters: &Value) -> Result<Box<dyn HardConstraint>, String> {
        let ctor = self.hard.get(name).ok_or_else(|| format!("unknown hard constraint: {name}"))?;
        ctor(parameters)
    }

    pub fn build_soft(&self, name: &str, parameters: &Value) -> Result<Box<dyn SoftConstraint>, String> {
        let ctor = self.soft.get(name).ok_or_else(|| format!("unknown soft constraint: {name}"))?;
        ctor(parameters)
    }

    /// The default registry: every constraint in the library, registered
    /// under its canonical name.
    pub fn with_defaults() -> Self {
        let mut reg = Self::new();
        reg.register_hard("Availability", |_| Ok(Box::new(super::AvailabilityConstraint)));
        reg.register_hard("OnePerBlock", |_| Ok(Box::new(super::OnePerBlockConstraint)));
        reg.register_hard("Capacity", |params| {
            let default_max = params
                .get("default_max_residents")
                .and_then(Value::as_u64)
                .unwrap_or(6) as u32;
            Ok(Box::new(super::CapacityConstraint { default_max_residents: default_max }))
        });
        reg.register_hard("EightyHourRolling", |params| {
            let max_hours = params.get("max_hours").and_then(Value::as_u64).unwrap_or(80) as u32;
            Ok(Box::new(super::EightyHourRollingConstraint { max_hours }))
        });
        reg.register_hard("OneInSeven", |params| {
            let min_rest_days_per_week =
                params.get("min_rest_days_per_week").and_then(Value::as_u64).unwrap_or(1) as u32;
            Ok(Box::new(super::OneInSevenConstraint { min_rest_days_per_week }))
        });
        reg.register_hard("WednesdayAMInternOnly", |_| {
            Ok(Box::new(super::WednesdayAmInternOnlyConstraint))
        });
        reg.register_hard("WednesdayPMLEC", |_| Ok(Box::new(super::WednesdayPmLecConstraint)));
        reg.register_hard("PGY1WednesdayAMContinuity", |_| {
            Ok(Box::new(super::Pgy1WednesdayAmContinuityConstraint))
        });
        reg.register_hard("NightFloatAMPattern", |_| {
            Ok(Box::new(super::NightFloatAmPatternConstraint))
        });
        reg.register_hard("SupervisionRatio", |_| Ok(Box::new(super::SupervisionRatioConstraint)));
        reg.register_hard("SpecialtyAndPGYGating", |_| {
            Ok(Box::new(super::SpecialtyPgyGatingConstraint))
        });

        reg.register_soft("Equity", |params| {
            let weight = params.get("weight").and_then(Value::as_f64).unwrap_or(1.0);
            Ok(Box::new(super::EquityConstraint { weight }))
        });
        reg.register_soft("PreferenceTrail", |params| {
            let weight = params.get("weight").and_then(Value::as_f64).unwrap_or(1.0);
            Ok(Box::new(super::PreferenceTrailConstraint { weight, trails: Default::default() }))
        });
        reg.register_soft("PreferWednesdayCall", |params| {
            let weight = params.get("weight").and_then(Value::as_f64).unwrap_or(1.0);
            Ok(Box::new(super::PreferWednesdayCallConstraint { weight }))
        });
        reg.register_soft("AvoidBackToBackCall", |params| {
            let weight = params.get("weight").and_then(Value::as_f64).unwrap_or(1.0);
            Ok(Box::new(super::AvoidBackToBackCallConstraint { weight }))
        });
        reg
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_registry_knows_availability() {
        let reg = ConstraintRegistry::with_defaults();
        let c = reg.build_hard("Availability", &Value::Null).unwrap();
        assert_eq!(c.name(), "Availability");
    }

    #[test]
    fn unknown_name_errors() {
        let reg = ConstraintRegistry::with_defaults();
        assert!(reg.build_hard("DoesNotExist", &Value::Null).is_err());
    }
}
