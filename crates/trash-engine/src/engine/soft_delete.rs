use std::collections::HashSet;

use chrono::Utc;
use trash_shared::api::SoftDeleteResult;
use uuid::Uuid;

use super::{finish, TrashEngine};
use crate::config::EngineConfig;
use crate::error::TrashResult;
use crate::store::{TreeStore, TreeTransaction};
use crate::tree::{collect_subtree, SubtreeFilter};

impl<S: TreeStore> TrashEngine<S> {
    /// Marks the page and its live descendants as deleted by `actor_id`.
    ///
    /// A missing page or an already fully deleted subtree yields an empty
    /// result, so retries are harmless.
    pub async fn soft_delete(&self, page_id: Uuid, actor_id: Uuid) -> TrashResult<SoftDeleteResult> {
        let mut tx = self.store.begin().await?;
        let outcome = soft_delete_subtree(&mut tx, page_id, actor_id, &self.limits).await;
        let affected_ids = finish(tx, outcome, "soft_delete").await?;

        if !affected_ids.is_empty() {
            tracing::info!(
                %page_id,
                %actor_id,
                count = affected_ids.len(),
                "Moved page subtree to trash"
            );
        }

        Ok(SoftDeleteResult { affected_ids })
    }
}

async fn soft_delete_subtree<T: TreeTransaction>(
    tx: &mut T,
    page_id: Uuid,
    actor_id: Uuid,
    limits: &EngineConfig,
) -> TrashResult<Vec<Uuid>> {
    let Some(root) = tx.find_by_id(page_id, true).await? else {
        tracing::debug!(%page_id, "Soft delete of missing page is a no-op");
        return Ok(Vec::new());
    };

    // An already deleted root still has its live descendants swept up.
    let ids = collect_subtree(tx, &root, SubtreeFilter::Live, root.is_live(), limits).await?;
    if ids.is_empty() {
        return Ok(ids);
    }

    let marked: HashSet<Uuid> = tx
        .mark_deleted(&ids, actor_id, Utc::now())
        .await?
        .into_iter()
        .collect();

    // Traversal order, minus pages another transaction trashed first.
    Ok(ids.into_iter().filter(|id| marked.contains(id)).collect())
}
