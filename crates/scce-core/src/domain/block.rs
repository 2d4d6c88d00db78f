use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TimeOfDay {
    Am,
    Pm,
}

/// A half-day scheduling unit.
///
/// Invariant: `(date, time_of_day)` is unique within a single `EntityStore`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub id: Uuid,
    pub date: NaiveDate,
    pub time_of_day: TimeOfDay,
    /// Academic-calendar block number, 0..=13 (see `crate::calendar`).
    pub block_number: u8,
    pub is_weekend: bool,
    pub is_holiday: bool,
    pub holiday_name: Option<String>,
}

impl Block {
    pub fn is_wednesday(&self) -> bool {
        self.date.format("%a").to_string() == "Wed"
    }

    pub fn is_wednesday_am(&self) -> bool {
        self.is_wednesday() && self.time_of_day == TimeOfDay::Am
    }

    pub fn is_wednesday_pm(&self) -> bool {
        self.is_wednesday() && self.time_of_day == TimeOfDay::Pm
    }

    /// Hours contributed by a half-day assignment on this block, absent a
    /// call-specific override.
    pub fn default_hours(&self) -> u32 {
        4
    }
}
