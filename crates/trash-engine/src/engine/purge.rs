use trash_shared::api::PurgeResult;
use uuid::Uuid;

use super::{finish, TrashEngine};
use crate::config::EngineConfig;
use crate::error::TrashResult;
use crate::store::{TreeStore, TreeTransaction};
use crate::tree::{collect_subtree, SubtreeFilter};

impl<S: TreeStore> TrashEngine<S> {
    /// Permanently removes the page and every descendant, live or deleted.
    ///
    /// Purging a page that does not exist returns an empty result.
    pub async fn purge(&self, page_id: Uuid) -> TrashResult<PurgeResult> {
        let mut tx = self.store.begin().await?;
        let outcome = purge_subtree(&mut tx, page_id, &self.limits).await;
        let removed_ids = finish(tx, outcome, "purge").await?;

        if !removed_ids.is_empty() {
            tracing::info!(%page_id, count = removed_ids.len(), "Purged page subtree");
        }

        Ok(PurgeResult { removed_ids })
    }
}

async fn purge_subtree<T: TreeTransaction>(
    tx: &mut T,
    page_id: Uuid,
    limits: &EngineConfig,
) -> TrashResult<Vec<Uuid>> {
    let Some(root) = tx.find_by_id(page_id, true).await? else {
        tracing::debug!(%page_id, "Purge of missing page is a no-op");
        return Ok(Vec::new());
    };

    let ids = collect_subtree(tx, &root, SubtreeFilter::Any, true, limits).await?;
    tx.delete_pages(&ids).await?;
    Ok(ids)
}
