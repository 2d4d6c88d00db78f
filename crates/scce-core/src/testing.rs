//! Reusable fixtures for unit and end-to-end tests, so the generator,
//! validator, and resilience suites all exercise the same scenario shape
//! instead of inventing ad-hoc data each time.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::domain::test_support::{make_block, make_faculty, make_resident};
use crate::domain::{ActivityType, Block, Person, RotationTemplate, TimeOfDay};
use crate::ports::PeriodSnapshot;

/// A 28-day block, 10 PGY-1 residents, 3 supervising faculty, and a small
/// set of rotation templates (continuity clinic, an inpatient service, and
/// a Wednesday-PM lecture slot) covering every weekday half-day.
pub struct SmallProgramScenario {
    pub block_start: NaiveDate,
    pub residents: Vec<Person>,
    pub faculty: Vec<Person>,
    pub blocks: Vec<Block>,
    pub templates: Vec<RotationTemplate>,
}

impl SmallProgramScenario {
    pub fn build(block_start: NaiveDate) -> Self {
        let residents: Vec<Person> =
            (1..=10).map(|i| make_resident(&format!("PGY1-{i:02}"), 1)).collect();
        let faculty: Vec<Person> = (1..=3).map(|i| make_faculty(&format!("FAC-{i}"))).collect();

        let mut blocks = Vec::new();
        for day in 0..28 {
            let date = block_start + chrono::Duration::days(day);
            if is_weekday(date) {
                blocks.push(make_block(date, TimeOfDay::Am, (day / 7) as u8));
                blocks.push(make_block(date, TimeOfDay::Pm, (day / 7) as u8));
            }
        }

        let templates = vec![
            continuity_clinic_template(),
            inpatient_template(),
            wednesday_pm_lecture_template(),
        ];

        Self { block_start, residents, faculty, blocks, templates }
    }

    pub fn snapshot(&self) -> PeriodSnapshot {
        let mut snapshot = PeriodSnapshot::default();
        snapshot.persons.extend(self.residents.iter().cloned());
        snapshot.persons.extend(self.faculty.iter().cloned());
        snapshot.blocks = self.blocks.clone();
        snapshot.templates = self.templates.clone();
        snapshot
    }
}

fn is_weekday(date: NaiveDate) -> bool {
    !matches!(date.format("%a").to_string().as_str(), "Sat" | "Sun")
}

fn continuity_clinic_template() -> RotationTemplate {
    RotationTemplate {
        id: Uuid::new_v4(),
        name: "Continuity Clinic".to_string(),
        abbreviation: "C".to_string(),
        activity_type: ActivityType::Clinic,
        allowed_person_types: [crate::domain::PersonKind::Resident].into_iter().collect(),
        min_pgy_level: None,
        max_pgy_level: None,
        required_specialties: BTreeSet::new(),
        time_of_day: None,
        counts_toward_physical_capacity: true,
        max_residents: Some(4),
        call_shift_hours: None,
    }
}

fn inpatient_template() -> RotationTemplate {
    RotationTemplate {
        id: Uuid::new_v4(),
        name: "Inpatient Medicine".to_string(),
        abbreviation: "IP".to_string(),
        activity_type: ActivityType::Inpatient,
        allowed_person_types: [crate::domain::PersonKind::Resident].into_iter().collect(),
        min_pgy_level: None,
        max_pgy_level: None,
        required_specialties: BTreeSet::new(),
        time_of_day: None,
        counts_toward_physical_capacity: true,
        max_residents: Some(6),
        call_shift_hours: None,
    }
}

fn wednesday_pm_lecture_template() -> RotationTemplate {
    RotationTemplate {
        id: Uuid::new_v4(),
        name: "Wednesday PM Lecture".to_string(),
        abbreviation: "LEC-PM".to_string(),
        activity_type: ActivityType::Lecture,
        allowed_person_types: [crate::domain::PersonKind::Resident, crate::domain::PersonKind::Faculty]
            .into_iter()
            .collect(),
        min_pgy_level: None,
        max_pgy_level: None,
        required_specialties: BTreeSet::new(),
        time_of_day: Some(TimeOfDay::Pm),
        counts_toward_physical_capacity: false,
        max_residents: None,
        call_shift_hours: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_ten_residents_and_three_faculty() {
        let scenario = SmallProgramScenario::build(NaiveDate::from_ymd_opt(2026, 7, 1).unwrap());
        assert_eq!(scenario.residents.len(), 10);
        assert_eq!(scenario.faculty.len(), 3);
        assert_eq!(scenario.templates.len(), 3);
        assert!(!scenario.blocks.is_empty());
    }
}
