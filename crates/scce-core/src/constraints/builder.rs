//! Fluent construction plus a JSON round-trip schema for constraint
//! definitions:
//! ```json
//! { "type": "hard"|"soft", "name": "...", "constraint_type": "...",
//!   "priority": "CRITICAL"|..., "weight": <number, soft only>,
//!   "parameters": { ... } }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{ConstraintType, Priority};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ConstraintKind {
    Hard {
        name: String,
        constraint_type: ConstraintType,
        priority: Priority,
        parameters: Value,
    },
    Soft {
        name: String,
        constraint_type: ConstraintType,
        weight: f64,
        parameters: Value,
    },
}

impl ConstraintKind {
    pub fn name(&self) -> &str {
        match self {
            ConstraintKind::Hard { name, .. } => name,
            ConstraintKind::Soft { name, .. } => name,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }

    pub fn from_json(value: Value) -> serde_json::Result<Self> {
        serde_json::from_value(value)
    }
}

/// Fluent builder: `ConstraintBuilder::new().hard().name(..).type_(..)
/// .priority(..).with_parameter(k, v).build()`.
#[derive(Debug, Clone, Default)]
pub struct ConstraintBuilder {
    is_hard: bool,
    name: Option<String>,
    constraint_type: Option<ConstraintType>,
    priority: Priority,
    weight: f64,
    parameters: serde_json::Map<String, Value>,
}

impl ConstraintBuilder {
    pub fn new() -> Self {
        Self { priority: Priority::Medium, weight: 1.0, ..Default::default() }
    }

    pub fn hard(mut self) -> Self {
        self.is_hard = true;
        self
    }

    pub fn soft(mut self) -> Self {
        self.is_hard = false;
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn of_type(mut self, constraint_type: ConstraintType) -> Self {
        self.constraint_type = Some(constraint_type);
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    pub fn build(self) -> Result<ConstraintKind, String> {
        let name = self.name.ok_or("constraint name is required")?;
        let constraint_type = self.constraint_type.ok_or("constraint_type is required")?;
        let parameters = Value::Object(self.parameters);
        Ok(if self.is_hard {
            ConstraintKind::Hard { name, constraint_type, priority: self.priority, parameters }
        } else {
            ConstraintKind::Soft { name, constraint_type, weight: self.weight, parameters }
        })
    }
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Medium
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_json() {
        let built = ConstraintBuilder::new()
            .hard()
            .name("Availability")
            .of_type(ConstraintType::Availability)
            .priority(Priority::Critical)
            .build()
            .unwrap();
        let json = built.to_json().unwrap();
        let parsed = ConstraintKind::from_json(json).unwrap();
        assert_eq!(built, parsed);
    }

    #[test]
    fn soft_constraint_carries_weight() {
        let built = ConstraintBuilder::new()
            .soft()
            .name("Equity")
            .of_type(ConstraintType::Equity)
            .weight(0.4)
            .with_parameter("max_variance", 2)
            .build()
            .unwrap();
        match built {
            ConstraintKind::Soft { weight, .. } => assert_eq!(weight, 0.4),
            _ => panic!("expected soft"),
        }
    }
}
