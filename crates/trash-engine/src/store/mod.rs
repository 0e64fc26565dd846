//! Persistence seam for the trash engine.
//!
//! A [`TreeStore`] is the shared, pooled handle; every mutating engine
//! operation opens exactly one [`TreeTransaction`] from it and either commits
//! or drops it. Dropping an uncommitted transaction rolls it back, so an
//! early return through `?` never leaves a partial cascade behind.

mod memory;
mod postgres;

pub use memory::{MemoryTreeStore, MemoryTreeTransaction};
pub use postgres::{PgTreeStore, PgTreeTransaction};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use trash_shared::{Page, TrashItem};
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait TreeStore: Send + Sync {
    type Tx: TreeTransaction;

    /// Opens a transactional scope.
    async fn begin(&self) -> StoreResult<Self::Tx>;

    /// Deletion roots of a space, newest deletion first, ties by id.
    ///
    /// A deletion root is a deleted page whose parent is absent, missing, or
    /// live. Implementations return at most `limit` rows starting at `offset`.
    async fn list_deletion_roots(
        &self,
        space_id: Uuid,
        offset: u64,
        limit: u64,
    ) -> StoreResult<Vec<TrashItem>>;
}

#[async_trait]
pub trait TreeTransaction: Send {
    /// Point lookup. With `lock` the row stays locked until the transaction ends.
    async fn find_by_id(&mut self, id: Uuid, lock: bool) -> StoreResult<Option<Page>>;

    /// Every page whose parent is one of `parent_ids`, whatever its deletion state.
    ///
    /// The returned rows stay locked until the transaction ends, so a
    /// traversal waits for concurrent writers and then sees their result.
    async fn find_children(&mut self, parent_ids: &[Uuid]) -> StoreResult<Vec<Page>>;

    /// Marks the pages of `ids` that are still live and returns the ids it
    /// changed, in no particular order. Already deleted pages keep their
    /// original markers.
    async fn mark_deleted(
        &mut self,
        ids: &[Uuid],
        deleted_by_id: Uuid,
        at: DateTime<Utc>,
    ) -> StoreResult<Vec<Uuid>>;

    async fn clear_deleted(&mut self, ids: &[Uuid], at: DateTime<Utc>) -> StoreResult<u64>;

    async fn detach_from_parent(&mut self, id: Uuid, at: DateTime<Utc>) -> StoreResult<()>;

    async fn delete_pages(&mut self, ids: &[Uuid]) -> StoreResult<u64>;

    async fn commit(self) -> StoreResult<()>;
}
