use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Inpatient rotation codes whose spelling is preserved for compatibility
/// with existing persisted schedules (spec GLOSSARY).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum InpatientRotationType {
    Fmit,
    Nf,
    PedW,
    PedNf,
    Kap,
    Im,
    Ldnf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InpatientPreload {
    pub id: Uuid,
    pub person_id: Uuid,
    pub rotation_type: InpatientRotationType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Required when `rotation_type == Fmit`.
    pub fmit_week: Option<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Hash)]
#[serde(rename_all = "snake_case")]
pub enum CallType {
    Ld24Hr,
    NfCoverage,
    Weekend,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallPreload {
    pub id: Uuid,
    pub person_id: Uuid,
    pub call_date: NaiveDate,
    pub call_type: CallType,
}
