use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentRole {
    Primary,
    Supervising,
    Backup,
}

/// A value type: updates never mutate an `Assignment` in place, they produce
/// a new one and persist it via `EntityStore`.
///
/// Invariant: `(block_id, person_id)` is unique within a period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub id: Uuid,
    pub block_id: Uuid,
    pub person_id: Uuid,
    pub rotation_template_id: Option<Uuid>,
    pub role: AssignmentRole,
    pub activity_override: Option<String>,
    pub notes: Option<String>,
    pub override_reason: Option<String>,
    pub override_acknowledged_at: Option<DateTime<Utc>>,
    pub confidence: Option<f64>,
    pub score: Option<f64>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub source: AssignmentSource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentSource {
    Preload,
    Manual,
    Solver,
    Template,
}

impl Assignment {
    pub fn is_override(&self) -> bool {
        self.override_reason.is_some()
    }
}
