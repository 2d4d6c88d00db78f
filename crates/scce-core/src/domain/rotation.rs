use super::block::TimeOfDay;
use super::person::PersonKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ActivityType {
    Clinic,
    Inpatient,
    Procedure,
    Lecture,
    Call,
    Admin,
}

/// Rotation template, a.k.a. Activity.
///
/// `time_of_day` absent means the template matches either half-day,
/// resolved explicitly here rather than left to call-site assumption.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RotationTemplate {
    pub id: Uuid,
    pub name: String,
    /// Upper-case canonical abbreviation, e.g. "C", "LEC-PM", "NF".
    pub abbreviation: String,
    pub activity_type: ActivityType,
    pub allowed_person_types: BTreeSet<PersonKind>,
    pub min_pgy_level: Option<u8>,
    pub max_pgy_level: Option<u8>,
    pub required_specialties: BTreeSet<String>,
    pub time_of_day: Option<TimeOfDay>,
    pub counts_toward_physical_capacity: bool,
    pub max_residents: Option<u32>,
    /// Shift length in hours for `activity_type == Call`; overrides the
    /// block's default 4-hour half-day contribution to the 80-hour rolling
    /// total.
    pub call_shift_hours: Option<u32>,
}

/// Wednesday-PM lecture exemption set.
pub const LEC_EXEMPT: &[&str] = &[
    "NF", "NF-PM", "NF-ENDO", "NEURO-NF", "PNF", "LDNF", "KAPI-LD", "HILO", "TDY",
];

/// Night-float rotations whose PM assignment forces a fixed AM pattern.
pub const NIGHT_FLOAT_ROTATIONS: &[&str] =
    &["NF", "NF-PM", "NF-ENDO", "NEURO-NF", "PNF", "LDNF", "KAPI-LD"];

/// Fixed AM-off mapping for night-float PM rotations.
pub fn night_float_am_mapping(pm_abbreviation: &str) -> Option<&'static str> {
    match pm_abbreviation {
        "NF" => Some("OFF-AM"),
        "NF-PM" => Some("OFF-AM"),
        "NF-ENDO" => Some("OFF-AM"),
        "NEURO-NF" => Some("NEURO"),
        "PNF" => Some("OFF-AM"),
        "LDNF" => Some("L&D"),
        "KAPI-LD" => Some("KAP"),
        _ => None,
    }
}

pub const CONTINUITY_CLINIC_ABBREVIATIONS: &[&str] = &["C", "CONT", "CONTINUITY"];
pub const WEDNESDAY_PM_LECTURE_ABBREVIATION: &str = "LEC-PM";

impl RotationTemplate {
    pub fn allows(&self, kind: PersonKind) -> bool {
        self.allowed_person_types.contains(&kind)
    }

    pub fn pgy_allowed(&self, pgy_level: Option<u8>) -> bool {
        match pgy_level {
            None => true,
            Some(p) => {
                self.min_pgy_level.map(|min| p >= min).unwrap_or(true)
                    && self.max_pgy_level.map(|max| p <= max).unwrap_or(true)
            }
        }
    }

    pub fn specialties_satisfied(&self, person_specialties: &BTreeSet<String>) -> bool {
        self.required_specialties.is_subset(person_specialties)
    }

    pub fn time_of_day_matches(&self, block_tod: TimeOfDay) -> bool {
        self.time_of_day.map(|t| t == block_tod).unwrap_or(true)
    }

    pub fn is_lec_exempt(&self) -> bool {
        LEC_EXEMPT.contains(&self.abbreviation.as_str())
    }

    pub fn is_night_float(&self) -> bool {
        NIGHT_FLOAT_ROTATIONS.contains(&self.abbreviation.as_str())
    }

    pub fn is_continuity_clinic(&self) -> bool {
        CONTINUITY_CLINIC_ABBREVIATIONS.contains(&self.abbreviation.as_str())
    }
}
