//! Single-process `EntityStore` + `SwapRepository` used by tests, the
//! CLI's `--no-db` mode, and any context without a real Postgres instance.
//! Transactions are snapshot/restore rather than true isolation — sufficient
//! for a store that only ever sees one writer at a time.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use scce_core::domain::{Absence, Assignment, Block, CallPreload, InpatientPreload, Person, RotationTemplate, SwapRecord, SwapStatus};
use scce_core::error::{SccError, SccResult};
use scce_core::ports::{AssignmentPatch, EntityStore, PeriodSnapshot, SwapRepository, TxToken};

#[derive(Debug, Clone, Default)]
struct State {
    persons: Vec<Person>,
    blocks: Vec<Block>,
    templates: Vec<RotationTemplate>,
    assignments: Vec<Assignment>,
    absences: Vec<Absence>,
    inpatient_preloads: Vec<InpatientPreload>,
    call_preloads: Vec<CallPreload>,
    swaps: Vec<SwapRecord>,
}

pub struct InMemoryStore {
    state: RwLock<State>,
    snapshots: RwLock<HashMap<Uuid, State>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self { state: RwLock::new(State::default()), snapshots: RwLock::new(HashMap::new()) }
    }

    pub async fn seed(&self, snapshot: PeriodSnapshot) {
        let mut state = self.state.write().await;
        state.persons = snapshot.persons;
        state.blocks = snapshot.blocks;
        state.templates = snapshot.templates;
        state.assignments = snapshot.assignments;
        state.absences = snapshot.absences;
        state.inpatient_preloads = snapshot.inpatient_preloads;
        state.call_preloads = snapshot.call_preloads;
    }

    pub async fn seed_swaps(&self, swaps: Vec<SwapRecord>) {
        self.state.write().await.swaps = swaps;
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EntityStore for InMemoryStore {
    async fn load_period(&self, start: NaiveDate, end: NaiveDate) -> SccResult<PeriodSnapshot> {
        let state = self.state.read().await;
        let in_range = |date: NaiveDate| date >= start && date <= end;
        Ok(PeriodSnapshot {
            persons: state.persons.clone(),
            blocks: state.blocks.iter().filter(|b| in_range(b.date)).cloned().collect(),
            templates: state.templates.clone(),
            assignments: state
                .assignments
                .iter()
                .filter(|a| state.blocks.iter().any(|b| b.id == a.block_id && in_range(b.date)))
                .cloned()
                .collect(),
            absences: state
                .absences
                .iter()
                .filter(|a| a.start_date <= end && a.end_date >= start)
                .cloned()
                .collect(),
            inpatient_preloads: state
                .inpatient_preloads
                .iter()
                .filter(|p| p.start_date <= end && p.end_date >= start)
                .cloned()
                .collect(),
            call_preloads: state.call_preloads.iter().filter(|p| in_range(p.call_date)).cloned().collect(),
        })
    }

    async fn save_assignment(&self, assignment: &Assignment) -> SccResult<()> {
        let mut state = self.state.write().await;
        if state
            .assignments
            .iter()
            .any(|a| a.block_id == assignment.block_id && a.person_id == assignment.person_id)
        {
            return Err(SccError::Conflict(format!(
                "assignment already exists for block {} person {}",
                assignment.block_id, assignment.person_id
            )));
        }
        state.assignments.push(assignment.clone());
        Ok(())
    }

    async fn update_assignment(
        &self,
        id: Uuid,
        patch: AssignmentPatch,
        expected_updated_at: DateTime<Utc>,
    ) -> SccResult<Assignment> {
        let mut state = self.state.write().await;
        let assignment = state
            .assignments
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| SccError::NotFound(format!("assignment {id}")))?;

        if assignment.updated_at != expected_updated_at {
            return Err(SccError::Conflict(format!("assignment {id} was modified concurrently")));
        }

        if let Some(v) = patch.rotation_template_id {
            assignment.rotation_template_id = v;
        }
        if let Some(v) = patch.role {
            assignment.role = v;
        }
        if let Some(v) = patch.activity_override {
            assignment.activity_override = v;
        }
        if let Some(v) = patch.notes {
            assignment.notes = v;
        }
        if let Some(v) = patch.override_reason {
            assignment.override_reason = v;
        }
        if let Some(v) = patch.override_acknowledged_at {
            assignment.override_acknowledged_at = v;
        }
        assignment.updated_at = Utc::now();
        Ok(assignment.clone())
    }

    async fn delete_assignment(&self, id: Uuid) -> SccResult<()> {
        let mut state = self.state.write().await;
        let before = state.assignments.len();
        state.assignments.retain(|a| a.id != id);
        if state.assignments.len() == before {
            return Err(SccError::NotFound(format!("assignment {id}")));
        }
        Ok(())
    }

    async fn find_assignment(&self, id: Uuid) -> SccResult<Option<Assignment>> {
        let state = self.state.read().await;
        Ok(state.assignments.iter().find(|a| a.id == id).cloned())
    }

    async fn find_assignment_by_block_person(&self, block_id: Uuid, person_id: Uuid) -> SccResult<Option<Assignment>> {
        let state = self.state.read().await;
        Ok(state.assignments.iter().find(|a| a.block_id == block_id && a.person_id == person_id).cloned())
    }

    async fn find_person(&self, id: Uuid) -> SccResult<Option<Person>> {
        let state = self.state.read().await;
        Ok(state.persons.iter().find(|p| p.id == id).cloned())
    }

    async fn find_block(&self, id: Uuid) -> SccResult<Option<Block>> {
        let state = self.state.read().await;
        Ok(state.blocks.iter().find(|b| b.id == id).cloned())
    }

    async fn begin_tx(&self) -> SccResult<TxToken> {
        let token = Uuid::new_v4();
        let snapshot = self.state.read().await.clone();
        self.snapshots.write().await.insert(token, snapshot);
        Ok(TxToken(token))
    }

    async fn commit(&self, tx: TxToken) -> SccResult<()> {
        self.snapshots.write().await.remove(&tx.0);
        Ok(())
    }

    async fn rollback(&self, tx: TxToken) -> SccResult<()> {
        if let Some(snapshot) = self.snapshots.write().await.remove(&tx.0) {
            *self.state.write().await = snapshot;
        }
        Ok(())
    }
}

#[async_trait]
impl SwapRepository for InMemoryStore {
    async fn find(&self, id: Uuid) -> SccResult<Option<SwapRecord>> {
        let state = self.state.read().await;
        Ok(state.swaps.iter().find(|s| s.id == id).cloned())
    }

    async fn list_other_pending(&self, exclude_person_id: Uuid) -> SccResult<Vec<SwapRecord>> {
        let state = self.state.read().await;
        Ok(state
            .swaps
            .iter()
            .filter(|s| s.status == SwapStatus::Pending && s.source_person_id != exclude_person_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scce_core::domain::test_support::{make_block, make_resident};
    use scce_core::domain::{AssignmentRole, AssignmentSource, TimeOfDay};

    fn assignment_for(block_id: Uuid, person_id: Uuid) -> Assignment {
        Assignment {
            id: Uuid::new_v4(),
            block_id,
            person_id,
            rotation_template_id: None,
            role: AssignmentRole::Primary,
            activity_override: None,
            notes: None,
            override_reason: None,
            override_acknowledged_at: None,
            confidence: None,
            score: None,
            created_by: "test".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            source: AssignmentSource::Manual,
        }
    }

    #[tokio::test]
    async fn saving_a_duplicate_block_person_pair_conflicts() {
        let store = InMemoryStore::new();
        let block = make_block(NaiveDate::from_ymd_opt(2026, 7, 1).unwrap(), TimeOfDay::Am, 0);
        let resident = make_resident("R1", 1);
        let a = assignment_for(block.id, resident.id);
        store.save_assignment(&a).await.unwrap();

        let b = assignment_for(block.id, resident.id);
        let err = store.save_assignment(&b).await.unwrap_err();
        assert_eq!(err.code(), "E_CONFLICT_OPTIMISTIC_LOCK");
    }

    #[tokio::test]
    async fn rollback_restores_pre_transaction_state() {
        let store = InMemoryStore::new();
        let block = make_block(NaiveDate::from_ymd_opt(2026, 7, 1).unwrap(), TimeOfDay::Am, 0);
        let resident = make_resident("R1", 1);

        let tx = store.begin_tx().await.unwrap();
        store.save_assignment(&assignment_for(block.id, resident.id)).await.unwrap();
        store.rollback(tx).await.unwrap();

        let found = store.find_assignment_by_block_person(block.id, resident.id).await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn optimistic_lock_rejects_a_stale_update() {
        let store = InMemoryStore::new();
        let block = make_block(NaiveDate::from_ymd_opt(2026, 7, 1).unwrap(), TimeOfDay::Am, 0);
        let resident = make_resident("R1", 1);
        let a = assignment_for(block.id, resident.id);
        let id = a.id;
        let stale_timestamp = a.updated_at - chrono::Duration::seconds(5);
        store.save_assignment(&a).await.unwrap();

        let err = store.update_assignment(id, AssignmentPatch::default(), stale_timestamp).await.unwrap_err();
        assert_eq!(err.code(), "E_CONFLICT_OPTIMISTIC_LOCK");
    }
}
