use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::assignment::AssignmentSource;
use super::block::TimeOfDay;

/// Persisted view, materialised by `EntityStore` implementations from
/// `Assignment` rows for fast (person, date, time_of_day) lookups.
///
/// Invariant: unique on `(person_id, date, time_of_day)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HalfDayAssignment {
    pub person_id: Uuid,
    pub date: NaiveDate,
    pub time_of_day: TimeOfDay,
    pub activity_id: Uuid,
    pub source: AssignmentSource,
    pub is_override: bool,
}
