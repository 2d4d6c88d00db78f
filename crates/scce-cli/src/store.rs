//! Opens either a seeded in-memory demo program or a Postgres-backed store,
//! depending on whether `--database-url` was supplied, and hides the choice
//! behind a single [`Store`] that implements both ports the core needs.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use scce_core::domain::{Assignment, Block, Person, SwapRecord};
use scce_core::error::SccResult;
use scce_core::ports::{AssignmentPatch, EntityStore, PeriodSnapshot, SwapRepository, TxToken};
use scce_core::testing::SmallProgramScenario;
use scce_storage::InMemoryStore;

pub enum Store {
    InMemory(InMemoryStore),
    #[cfg(feature = "postgres")]
    Postgres(scce_storage::PgStore),
}

impl Store {
    pub async fn open(database_url: &Option<String>) -> anyhow::Result<Self> {
        match database_url {
            #[cfg(feature = "postgres")]
            Some(url) => {
                let pool = scce_storage::connect(url).await?;
                Ok(Store::Postgres(scce_storage::PgStore::new(pool)))
            }
            #[cfg(not(feature = "postgres"))]
            Some(_) => {
                anyhow::bail!("built without the `postgres` feature; rebuild with --features postgres")
            }
            None => {
                let store = InMemoryStore::new();
                let scenario = SmallProgramScenario::build(NaiveDate::from_ymd_opt(2026, 7, 1).unwrap());
                store.seed(scenario.snapshot()).await;
                tracing::info!(
                    "no --database-url given, seeded a 10-resident demo program starting 2026-07-01"
                );
                Ok(Store::InMemory(store))
            }
        }
    }
}

#[async_trait]
impl EntityStore for Store {
    async fn load_period(&self, start: NaiveDate, end: NaiveDate) -> SccResult<PeriodSnapshot> {
        match self {
            Store::InMemory(s) => s.load_period(start, end).await,
            #[cfg(feature = "postgres")]
            Store::Postgres(s) => s.load_period(start, end).await,
        }
    }

    async fn save_assignment(&self, assignment: &Assignment) -> SccResult<()> {
        match self {
            Store::InMemory(s) => s.save_assignment(assignment).await,
            #[cfg(feature = "postgres")]
            Store::Postgres(s) => s.save_assignment(assignment).await,
        }
    }

    async fn update_assignment(
        &self,
        id: Uuid,
        patch: AssignmentPatch,
        expected_updated_at: DateTime<Utc>,
    ) -> SccResult<Assignment> {
        match self {
            Store::InMemory(s) => s.update_assignment(id, patch, expected_updated_at).await,
            #[cfg(feature = "postgres")]
            Store::Postgres(s) => s.update_assignment(id, patch, expected_updated_at).await,
        }
    }

    async fn delete_assignment(&self, id: Uuid) -> SccResult<()> {
        match self {
            Store::InMemory(s) => s.delete_assignment(id).await,
            #[cfg(feature = "postgres")]
            Store::Postgres(s) => s.delete_assignment(id).await,
        }
    }

    async fn find_assignment(&self, id: Uuid) -> SccResult<Option<Assignment>> {
        match self {
            Store::InMemory(s) => s.find_assignment(id).await,
            #[cfg(feature = "postgres")]
            Store::Postgres(s) => s.find_assignment(id).await,
        }
    }

    async fn find_assignment_by_block_person(&self, block_id: Uuid, person_id: Uuid) -> SccResult<Option<Assignment>> {
        match self {
            Store::InMemory(s) => s.find_assignment_by_block_person(block_id, person_id).await,
            #[cfg(feature = "postgres")]
            Store::Postgres(s) => s.find_assignment_by_block_person(block_id, person_id).await,
        }
    }

    async fn find_person(&self, id: Uuid) -> SccResult<Option<Person>> {
        match self {
            Store::InMemory(s) => s.find_person(id).await,
            #[cfg(feature = "postgres")]
            Store::Postgres(s) => s.find_person(id).await,
        }
    }

    async fn find_block(&self, id: Uuid) -> SccResult<Option<Block>> {
        match self {
            Store::InMemory(s) => s.find_block(id).await,
            #[cfg(feature = "postgres")]
            Store::Postgres(s) => s.find_block(id).await,
        }
    }

    async fn begin_tx(&self) -> SccResult<TxToken> {
        match self {
            Store::InMemory(s) => s.begin_tx().await,
            #[cfg(feature = "postgres")]
            Store::Postgres(s) => s.begin_tx().await,
        }
    }

    async fn commit(&self, tx: TxToken) -> SccResult<()> {
        match self {
            Store::InMemory(s) => s.commit(tx).await,
            #[cfg(feature = "postgres")]
            Store::Postgres(s) => s.commit(tx).await,
        }
    }

    async fn rollback(&self, tx: TxToken) -> SccResult<()> {
        match self {
            Store::InMemory(s) => s.rollback(tx).await,
            #[cfg(feature = "postgres")]
            Store::Postgres(s) => s.rollback(tx).await,
        }
    }
}

#[async_trait]
impl SwapRepository for Store {
    async fn find(&self, id: Uuid) -> SccResult<Option<SwapRecord>> {
        match self {
            Store::InMemory(s) => s.find(id).await,
            #[cfg(feature = "postgres")]
            Store::Postgres(s) => s.find(id).await,
        }
    }

    async fn list_other_pending(&self, exclude_person_id: Uuid) -> SccResult<Vec<SwapRecord>> {
        match self {
            Store::InMemory(s) => s.list_other_pending(exclude_person_id).await,
            #[cfg(feature = "postgres")]
            Store::Postgres(s) => s.list_other_pending(exclude_person_id).await,
        }
    }
}
