//! The trash engine: soft delete, restore, purge and trash listing over a
//! page tree.
//!
//! Every mutating operation runs lookup, traversal and bulk write inside a
//! single store transaction. The transaction is committed only when all of
//! them succeed; on any error it is dropped, which rolls it back.

mod purge;
mod restore;
mod soft_delete;
mod trash;

use trash_shared::api::{DeleteOutcome, DeletePageRequest};
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::error::TrashResult;
use crate::store::{TreeStore, TreeTransaction};

/// Stateless between calls; holds only the injected store handle and the
/// traversal limits, so it can be shared freely across tasks.
#[derive(Debug, Clone)]
pub struct TrashEngine<S> {
    store: S,
    limits: EngineConfig,
}

impl<S: TreeStore> TrashEngine<S> {
    pub fn new(store: S, limits: EngineConfig) -> Self {
        Self { store, limits }
    }

    /// Moves the subtree to the trash, or purges it when `force_delete` is set.
    pub async fn delete_page(
        &self,
        req: DeletePageRequest,
        actor_id: Uuid,
    ) -> TrashResult<DeleteOutcome> {
        if req.force_delete {
            Ok(DeleteOutcome::Purged(self.purge(req.page_id).await?))
        } else {
            Ok(DeleteOutcome::Trashed(
                self.soft_delete(req.page_id, actor_id).await?,
            ))
        }
    }
}

/// Commits on success; otherwise drops the transaction so it rolls back.
async fn finish<T: TreeTransaction, R>(
    tx: T,
    outcome: TrashResult<R>,
    operation: &'static str,
) -> TrashResult<R> {
    match outcome {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(err) => {
            tracing::debug!(operation, error = %err, "Rolling back transaction");
            drop(tx);
            Err(err)
        }
    }
}
