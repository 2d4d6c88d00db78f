//! Centralises the "no real names in logs" rule.
//!
//! Every log/metric field that could otherwise carry a resident or faculty
//! name must go through [`person_ref`] instead of interpolating
//! `person.name` directly.

use crate::domain::{Person, PersonKind};

/// Anonymised reference for a person, e.g. `RES-001`, `FAC-003`, or the
/// distinguished `FAC-PD` for the designated program director when flagged.
pub fn person_ref(person: &Person) -> String {
    let prefix = match person.kind {
        PersonKind::Resident => "RES",
        PersonKind::Faculty if person.is_program_director => "FAC-PD",
        PersonKind::Faculty => "FAC",
    };
    if prefix == "FAC-PD" {
        return prefix.to_string();
    }
    format!("{prefix}-{:03}", short_ordinal(&person.id))
}

/// Deterministic small ordinal derived from a UUID, used only to keep
/// anonymised refs short and stable across a single load of the entity
/// store; it is not guaranteed globally unique across periods.
fn short_ordinal(id: &uuid::Uuid) -> u16 {
    let bytes = id.as_bytes();
    (u16::from(bytes[0]) << 8 | u16::from(bytes[1])) % 1000
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::test_support::make_resident;

    #[test]
    fn redacts_resident_name() {
        let p = make_resident("Dr. Jane Doe", 1);
        let r = person_ref(&p);
        assert!(r.starts_with("RES-"));
        assert!(!r.contains("Jane"));
    }
}
