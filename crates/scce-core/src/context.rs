//! A read-only snapshot assembled once per solver invocation or
//! validation call.

use std::collections::HashMap;

use uuid::Uuid;

use crate::domain::{Absence, Assignment, Block, CallPreload, InpatientPreload, Person, RotationTemplate};
use crate::ports::PeriodSnapshot;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Availability {
    pub available: bool,
    pub reason: Option<String>,
    /// Present when a preload fixes the person to a specific template on
    /// this block.
    pub forced_template_id: Option<Uuid>,
}

impl Availability {
    fn available() -> Self {
        Self { available: true, reason: None, forced_template_id: None }
    }

    fn blocked(reason: impl Into<String>) -> Self {
        Self { available: false, reason: Some(reason.into()), forced_template_id: None }
    }

    fn forced(template_id: Uuid) -> Self {
        Self { available: true, reason: None, forced_template_id: Some(template_id) }
    }
}

pub struct SchedulingContext {
    pub persons: Vec<Person>,
    pub blocks: Vec<Block>,
    pub templates: Vec<RotationTemplate>,
    pub existing_assignments: Vec<Assignment>,
    pub absences: Vec<Absence>,

    pub person_idx: HashMap<Uuid, usize>,
    pub block_idx: HashMap<Uuid, usize>,
    pub template_idx: HashMap<Uuid, usize>,

    /// `availability[person_id][block_id]`.
    pub availability: HashMap<Uuid, HashMap<Uuid, Availability>>,
}

impl SchedulingContext {
    pub fn build(snapshot: PeriodSnapshot) -> Self {
        let person_idx = snapshot
            .persons
            .iter()
            .enumerate()
            .map(|(i, p)| (p.id, i))
            .collect();
        let block_idx = snapshot
            .blocks
            .iter()
            .enumerate()
            .map(|(i, b)| (b.id, i))
            .collect();
        let template_idx = snapshot
            .templates
            .iter()
            .enumerate()
            .map(|(i, t)| (t.id, i))
            .collect();

        let mut availability: HashMap<Uuid, HashMap<Uuid, Availability>> = HashMap::new();
        for person in &snapshot.persons {
            let mut per_block = HashMap::new();
            for block in &snapshot.blocks {
                per_block.insert(block.id, Availability::available());
            }
            availability.insert(person.id, per_block);
        }

        // Absences: blocking absences forbid assignment for their date span.
        for absence in &snapshot.absences {
            if let Some(per_block) = availability.get_mut(&absence.person_id) {
                for block in &snapshot.blocks {
                    if absence.covers(block.date) {
                        let slot = per_block.entry(block.id).or_insert_with(Availability::available);
                        if absence.is_blocking {
                            *slot = Availability::blocked(format!(
                                "{:?} absence {}..{}",
                                absence.absence_type, absence.start_date, absence.end_date
                            ));
                        }
                    }
                }
            }
        }

        // Inpatient preloads: restrict availability to the preload's
        // rotation, materialised as a forced-template override when a
        // matching template abbreviation exists.
        for preload in &snapshot.inpatient_preloads {
            let abbrev = inpatient_abbreviation(preload.rotation_type);
            let template_id = snapshot
                .templates
                .iter()
                .find(|t| t.abbreviation == abbrev)
                .map(|t| t.id);
            if let (Some(per_block), Some(template_id)) =
                (availability.get_mut(&preload.person_id), template_id)
            {
                for block in &snapshot.blocks {
                    if block.date >= preload.start_date && block.date <= preload.end_date {
                        per_block.insert(block.id, Availability::forced(template_id));
                    }
                }
            }
        }

        // Resident-call preloads: force the matching "CALL" template on the
        // call date, if the store carries one; otherwise the preload is
        // still visible to callers via `existing_assignments`/preload lists
        // but does not change availability.
        for preload in &snapshot.call_preloads {
            let template_id = snapshot
                .templates
                .iter()
                .find(|t| t.activity_type == crate::domain::ActivityType::Call)
                .map(|t| t.id);
            if let (Some(per_block), Some(template_id)) =
                (availability.get_mut(&preload.person_id), template_id)
            {
                for block in &snapshot.blocks {
                    if block.date == preload.call_date {
                        per_block.insert(block.id, Availability::forced(template_id));
                    }
                }
            }
        }

        Self {
            persons: snapshot.persons,
            blocks: snapshot.blocks,
            templates: snapshot.templates,
            existing_assignments: snapshot.assignments,
            absences: snapshot.absences,
            person_idx,
            block_idx,
            template_idx,
            availability,
        }
    }

    pub fn is_available(&self, person_id: Uuid, block_id: Uuid) -> bool {
        self.availability
            .get(&person_id)
            .and_then(|m| m.get(&block_id))
            .map(|a| a.available)
            .unwrap_or(true)
    }

    pub fn person(&self, id: Uuid) -> Option<&Person> {
        self.person_idx.get(&id).map(|&i| &self.persons[i])
    }

    pub fn block(&self, id: Uuid) -> Option<&Block> {
        self.block_idx.get(&id).map(|&i| &self.blocks[i])
    }

    pub fn template(&self, id: Uuid) -> Option<&RotationTemplate> {
        self.template_idx.get(&id).map(|&i| &self.templates[i])
    }

    pub fn residents(&self) -> impl Iterator<Item = &Person> {
        self.persons.iter().filter(|p| p.kind == crate::domain::PersonKind::Resident)
    }

    pub fn faculty(&self) -> impl Iterator<Item = &Person> {
        self.persons.iter().filter(|p| p.kind == crate::domain::PersonKind::Faculty)
    }

    /// Every calendar date covered by `blocks`, sorted and deduplicated.
    /// The index into this vector is what `VarRef::Day { day, .. }` refers
    /// to, so callers that build or consume those variables must derive
    /// the index from this method rather than recomputing their own order.
    pub fn distinct_dates(&self) -> Vec<chrono::NaiveDate> {
        let mut dates: Vec<_> = self.blocks.iter().map(|b| b.date).collect();
        dates.sort();
        dates.dedup();
        dates
    }
}

fn inpatient_abbreviation(rt: crate::domain::InpatientRotationType) -> &'static str {
    use crate::domain::InpatientRotationType::*;
    match rt {
        Fmit => "FMIT",
        Nf => "NF",
        PedW => "PedW",
        PedNf => "PedNF",
        Kap => "KAP",
        Im => "IM",
        Ldnf => "LDNF",
    }
}
