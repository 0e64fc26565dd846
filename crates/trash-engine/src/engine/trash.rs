use trash_shared::api::{Paginated, PaginationOptions};
use trash_shared::TrashItem;
use uuid::Uuid;

use super::TrashEngine;
use crate::error::TrashResult;
use crate::pagination::PageCursor;
use crate::store::TreeStore;

impl<S: TreeStore> TrashEngine<S> {
    /// Deletion roots of a space, most recently deleted first.
    ///
    /// Pages deleted as part of a larger subtree are represented by the root
    /// of that subtree only.
    pub async fn list_trash(
        &self,
        space_id: Uuid,
        pagination: PaginationOptions,
    ) -> TrashResult<Paginated<TrashItem>> {
        let cursor = PageCursor::from(pagination);
        let rows = self
            .store
            .list_deletion_roots(space_id, cursor.offset(), cursor.fetch_limit())
            .await?;

        Ok(cursor.paginate(rows))
    }
}
