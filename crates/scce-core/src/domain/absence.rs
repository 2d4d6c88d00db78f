use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AbsenceType {
    Vacation,
    Deployment,
    Tdy,
    Medical,
}

/// Invariant: `end_date >= start_date`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Absence {
    pub id: Uuid,
    pub person_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub absence_type: AbsenceType,
    /// If true, assignments during the interval are forbidden (hard). If
    /// false, only the validator warns.
    pub is_blocking: bool,
}

impl Absence {
    pub fn is_valid(&self) -> bool {
        self.end_date >= self.start_date
    }

    pub fn covers(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }
}
