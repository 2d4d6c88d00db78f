//! Persistence port the core depends on but never implements directly.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::domain::{Absence, Assignment, Block, CallPreload, InpatientPreload, Person, RotationTemplate};
use crate::error::SccResult;

/// Everything `SchedulingContext` needs to assemble for one period.
#[derive(Debug, Clone, Default)]
pub struct PeriodSnapshot {
    pub persons: Vec<Person>,
    pub blocks: Vec<Block>,
    pub templates: Vec<RotationTemplate>,
    pub assignments: Vec<Assignment>,
    pub absences: Vec<Absence>,
    pub inpatient_preloads: Vec<InpatientPreload>,
    pub call_preloads: Vec<CallPreload>,
}

/// Patch for `EntityStore::update_assignment`; `None` fields are left
/// unchanged.
#[derive(Debug, Clone, Default)]
pub struct AssignmentPatch {
    pub rotation_template_id: Option<Option<Uuid>>,
    pub role: Option<crate::domain::AssignmentRole>,
    pub activity_override: Option<Option<String>>,
    pub notes: Option<Option<String>>,
    pub override_reason: Option<Option<String>>,
    pub override_acknowledged_at: Option<Option<DateTime<Utc>>>,
}

#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait EntityStore: Send + Sync {
    async fn load_period(&self, start: NaiveDate, end: NaiveDate) -> SccResult<PeriodSnapshot>;

    async fn save_assignment(&self, assignment: &Assignment) -> SccResult<()>;

    /// Returns `Conflict` if `expected_updated_at` does not match the
    /// stored value.
    async fn update_assignment(
        &self,
        id: Uuid,
        patch: AssignmentPatch,
        expected_updated_at: DateTime<Utc>,
    ) -> SccResult<Assignment>;

    async fn delete_assignment(&self, id: Uuid) -> SccResult<()>;

    async fn find_assignment(&self, id: Uuid) -> SccResult<Option<Assignment>>;

    async fn find_assignment_by_block_person(
        &self,
        block_id: Uuid,
        person_id: Uuid,
    ) -> SccResult<Option<Assignment>>;

    async fn find_person(&self, id: Uuid) -> SccResult<Option<Person>>;

    async fn find_block(&self, id: Uuid) -> SccResult<Option<Block>>;

    /// Begins a transaction scope. Implementations that are not
    /// transactional (e.g. a single-threaded in-memory store used only in
    /// tests) may treat this as a no-op returning a token that `commit`
    /// accepts unconditionally.
    async fn begin_tx(&self) -> SccResult<TxToken>;

    async fn commit(&self, tx: TxToken) -> SccResult<()>;

    async fn rollback(&self, tx: TxToken) -> SccResult<()>;
}

/// Opaque transaction handle. Implementations assign their own meaning to
/// the id; the core never inspects it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxToken(pub Uuid);
