use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::SwapRecord;
use crate::error::SccResult;

#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait SwapRepository: Send + Sync {
    async fn find(&self, id: Uuid) -> SccResult<Option<SwapRecord>>;

    /// Every other `PENDING` swap, excluding ones raised by `exclude_person_id`.
    async fn list_other_pending(&self, exclude_person_id: Uuid) -> SccResult<Vec<SwapRecord>>;
}
