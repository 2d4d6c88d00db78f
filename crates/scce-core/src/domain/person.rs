use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PersonKind {
    Resident,
    Faculty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdminType {
    Gme,
    Dfm,
    Sm,
}

/// A resident or faculty member.
///
/// Invariant: `pgy_level` is `None` iff `kind == Faculty`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub id: Uuid,
    pub name: String,
    pub kind: PersonKind,
    pub pgy_level: Option<u8>,
    pub email: Option<String>,
    pub specialties: BTreeSet<String>,
    pub faculty_role: Option<String>,
    /// Distinguished program-director flag; drives the `FAC-PD` log ref.
    pub is_program_director: bool,
    pub min_clinic_halfdays_per_week: u8,
    pub max_clinic_halfdays_per_week: u8,
    pub admin_type: AdminType,
    pub sunday_call_count: u32,
    pub weekday_call_count: u32,
    pub fmit_weeks_count: u32,
    /// Soft-constraint preference flag.
    pub prefers_wednesday_call: bool,
}

impl Person {
    pub fn is_valid(&self) -> bool {
        match self.kind {
            PersonKind::Faculty => self.pgy_level.is_none(),
            PersonKind::Resident => self.pgy_level.is_some(),
        }
    }

    /// Supervision ratio owed *by* this resident: 1:2 for PGY-1, else 1:4.
    /// Returns `None` for faculty.
    pub fn supervision_denominator(&self) -> Option<u8> {
        match (self.kind, self.pgy_level) {
            (PersonKind::Resident, Some(1)) => Some(2),
            (PersonKind::Resident, Some(_)) => Some(4),
            _ => None,
        }
    }

    pub fn is_pgy1(&self) -> bool {
        matches!(self.kind, PersonKind::Resident) && self.pgy_level == Some(1)
    }
}
