//! Engine-side subtree traversal.
//!
//! The walk is breadth-first over `parent_page_id` edges with one
//! `find_children` call per level, so it runs against any store that can
//! answer point and child lookups. It stays inside the root's space and
//! fails with [`TrashError::InconsistentTree`] on cycles or when the
//! configured bounds are exceeded.

use std::collections::HashSet;

use trash_shared::Page;
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::error::{TrashError, TrashResult};
use crate::store::TreeTransaction;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubtreeFilter {
    Live,
    Deleted,
    Any,
}

impl SubtreeFilter {
    pub fn admits(self, page: &Page) -> bool {
        match self {
            Self::Live => page.is_live(),
            Self::Deleted => page.is_deleted(),
            Self::Any => true,
        }
    }
}

/// Collects `root` and the descendants reachable through pages admitted by
/// `filter`.
///
/// A child rejected by the filter is pruned together with everything below
/// it. The root is always expanded; it only appears in the result when
/// `include_root` is set, and then it comes first. The rest follows in
/// level order.
pub async fn collect_subtree<T: TreeTransaction>(
    tx: &mut T,
    root: &Page,
    filter: SubtreeFilter,
    include_root: bool,
    limits: &EngineConfig,
) -> TrashResult<Vec<Uuid>> {
    let mut visited = HashSet::from([root.id]);
    let mut ids = Vec::new();
    if include_root {
        ids.push(root.id);
    }

    let mut frontier = vec![root.id];
    let mut depth = 0;

    while !frontier.is_empty() {
        let children = tx.find_children(&frontier).await?;
        let mut next = Vec::with_capacity(children.len());

        for child in children {
            if !visited.insert(child.id) {
                return Err(TrashError::inconsistent(
                    child.id,
                    "parent chain revisits an ancestor",
                ));
            }
            if child.space_id != root.space_id {
                tracing::warn!(
                    page_id = %child.id,
                    space_id = %child.space_id,
                    root_space_id = %root.space_id,
                    "Skipping child page that belongs to another space"
                );
                continue;
            }
            if filter.admits(&child) {
                next.push(child.id);
            }
        }

        if next.is_empty() {
            break;
        }

        depth += 1;
        if depth > limits.max_tree_depth {
            return Err(TrashError::inconsistent(
                root.id,
                format!("subtree deeper than {} levels", limits.max_tree_depth),
            ));
        }
        if ids.len() + next.len() > limits.max_subtree_size {
            return Err(TrashError::inconsistent(
                root.id,
                format!("subtree larger than {} pages", limits.max_subtree_size),
            ));
        }

        ids.extend_from_slice(&next);
        frontier = next;
    }

    tracing::debug!(
        root_id = %root.id,
        ?filter,
        depth,
        count = ids.len(),
        "Collected subtree"
    );

    Ok(ids)
}
