//! The SCCE data model. Entities are plain value types; the
//! Entity Store (`crate::ports::EntityStore`) is their sole owner and all
//! mutation flows through it — nothing here mutates in place.

mod absence;
mod assignment;
mod block;
mod half_day;
mod person;
mod preload;
mod rotation;
mod swap;

pub use absence::{Absence, AbsenceType};
pub use assignment::{Assignment, AssignmentRole, AssignmentSource};
pub use block::{Block, TimeOfDay};
pub use half_day::HalfDayAssignment;
pub use person::{AdminType, Person, PersonKind};
pub use preload::{CallPreload, CallType, InpatientPreload, InpatientRotationType};
pub use rotation::{
    ActivityType, RotationTemplate, CONTINUITY_CLINIC_ABBREVIATIONS, LEC_EXEMPT,
    NIGHT_FLOAT_ROTATIONS, WEDNESDAY_PM_LECTURE_ABBREVIATION,
};
pub use rotation::night_float_am_mapping;
pub use swap::{SwapRecord, SwapStatus, SwapType};

#[cfg(any(test, feature = "testing"))]
pub mod test_support {
    use super::*;
    use chrono::NaiveDate;
    use uuid::Uuid;

    pub fn make_resident(name: &str, pgy_level: u8) -> Person {
        Person {
            id: Uuid::new_v4(),
            name: name.to_string(),
            kind: PersonKind::Resident,
            pgy_level: Some(pgy_level),
            email: None,
            specialties: Default::default(),
            faculty_role: None,
            is_program_director: false,
            min_clinic_halfdays_per_week: 2,
            max_clinic_halfdays_per_week: 6,
            admin_type: AdminType::Gme,
            sunday_call_count: 0,
            weekday_call_count: 0,
            fmit_weeks_count: 0,
            prefers_wednesday_call: false,
        }
    }

    pub fn make_faculty(name: &str) -> Person {
        Person {
            id: Uuid::new_v4(),
            name: name.to_string(),
            kind: PersonKind::Faculty,
            pgy_level: None,
            email: None,
            specialties: Default::default(),
            faculty_role: Some("supervising".to_string()),
            is_program_director: false,
            min_clinic_halfdays_per_week: 0,
            max_clinic_halfdays_per_week: 10,
            admin_type: AdminType::Dfm,
            sunday_call_count: 0,
            weekday_call_count: 0,
            fmit_weeks_count: 0,
            prefers_wednesday_call: false,
        }
    }

    pub fn make_block(date: NaiveDate, tod: TimeOfDay, block_number: u8) -> Block {
        Block {
            id: Uuid::new_v4(),
            date,
            time_of_day: tod,
            block_number,
            is_weekend: matches!(
                date.format("%a").to_string().as_str(),
                "Sat" | "Sun"
            ),
            is_holiday: false,
            holiday_name: None,
        }
    }
}
