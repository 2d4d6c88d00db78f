use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SwapType {
    OneToOne,
    Absorb,
}

/// Lifecycle: `Pending -> (Approved | Rejected) -> Completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SwapStatus {
    Pending,
    Approved,
    Rejected,
    Completed,
}

impl SwapStatus {
    pub fn can_transition_to(self, next: SwapStatus) -> bool {
        matches!(
            (self, next),
            (SwapStatus::Pending, SwapStatus::Approved)
                | (SwapStatus::Pending, SwapStatus::Rejected)
                | (SwapStatus::Approved, SwapStatus::Completed)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwapRecord {
    pub id: Uuid,
    pub source_person_id: Uuid,
    pub source_week_start: NaiveDate,
    pub target_person_id: Option<Uuid>,
    pub target_week_start: Option<NaiveDate>,
    pub swap_type: SwapType,
    pub status: SwapStatus,
    pub created_at: DateTime<Utc>,
    pub faculty_preference_tags: Vec<String>,
}
