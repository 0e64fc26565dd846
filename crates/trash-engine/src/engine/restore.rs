use chrono::Utc;
use trash_shared::api::RestoreResult;
use trash_shared::Page;
use uuid::Uuid;

use super::{finish, TrashEngine};
use crate::config::EngineConfig;
use crate::error::{TrashError, TrashResult};
use crate::store::{TreeStore, TreeTransaction};
use crate::tree::{collect_subtree, SubtreeFilter};

impl<S: TreeStore> TrashEngine<S> {
    /// Brings the page and its deleted descendants back.
    ///
    /// If the parent is still in the trash, or no longer exists, the page is
    /// restored as a root of its space and `detached` is reported.
    pub async fn restore(&self, page_id: Uuid) -> TrashResult<RestoreResult> {
        let mut tx = self.store.begin().await?;
        let outcome = restore_subtree(&mut tx, page_id, &self.limits).await;
        let result = finish(tx, outcome, "restore").await?;

        tracing::info!(
            %page_id,
            detached = result.detached,
            count = result.restored_ids.len(),
            "Restored page subtree"
        );

        Ok(result)
    }
}

async fn restore_subtree<T: TreeTransaction>(
    tx: &mut T,
    page_id: Uuid,
    limits: &EngineConfig,
) -> TrashResult<RestoreResult> {
    // Locks go parent first, the order a cascade from the parent takes them
    // in, so a racing soft delete of the parent serializes with this restore.
    let seen_parent_id = tx
        .find_by_id(page_id, false)
        .await?
        .ok_or(TrashError::NotFound(page_id))?
        .parent_page_id;
    let mut parent = lock_page(tx, seen_parent_id).await?;

    // Locked so a concurrent purge cannot remove it between lookup and cascade.
    let page = tx
        .find_by_id(page_id, true)
        .await?
        .ok_or(TrashError::NotFound(page_id))?;
    if page.parent_page_id != seen_parent_id {
        parent = lock_page(tx, page.parent_page_id).await?;
    }

    let now = Utc::now();
    let mut detached = false;

    if page.parent_page_id.is_some() && parent.map_or(true, |p| p.is_deleted()) {
        tx.detach_from_parent(page_id, now).await?;
        detached = true;
    }

    let restored_ids = collect_subtree(tx, &page, SubtreeFilter::Deleted, true, limits).await?;
    tx.clear_deleted(&restored_ids, now).await?;

    Ok(RestoreResult {
        detached,
        restored_ids,
    })
}

async fn lock_page<T: TreeTransaction>(tx: &mut T, id: Option<Uuid>) -> TrashResult<Option<Page>> {
    match id {
        Some(id) => Ok(tx.find_by_id(id, true).await?),
        None => Ok(None),
    }
}
