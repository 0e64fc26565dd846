use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Postgres, Transaction};
use trash_shared::{ActorSummary, Page, SpaceSummary, TrashItem};
use uuid::Uuid;

use super::{StoreResult, TreeStore, TreeTransaction};
use crate::db::DbPool;

const PAGE_COLUMNS: &str = "id, slug_id, title, icon, position, parent_page_id, space_id, \
     workspace_id, creator_id, created_at, updated_at, deleted_at, deleted_by_id";

#[derive(Debug, Clone)]
pub struct PgTreeStore {
    db: DbPool,
}

impl PgTreeStore {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }
}

pub struct PgTreeTransaction {
    tx: Transaction<'static, Postgres>,
}

type TrashRow = (
    Uuid,                  // id
    String,                // slug_id
    Option<String>,        // title
    Option<String>,        // icon
    Uuid,                  // space_id
    DateTime<Utc>,         // deleted_at
    Option<Uuid>,          // deleted_by_id
    Option<Uuid>,          // users.id
    Option<String>,        // users.name
    Option<String>,        // users.avatar_url
    Option<Uuid>,          // spaces.id
    Option<String>,        // spaces.name
    Option<String>,        // spaces.slug
);

fn row_to_trash_item(row: TrashRow) -> TrashItem {
    let deleted_by = match (row.7, row.8) {
        (Some(id), Some(name)) => Some(ActorSummary {
            id,
            name,
            avatar_url: row.9,
        }),
        _ => None,
    };
    let space = match (row.10, row.11, row.12) {
        (Some(id), Some(name), Some(slug)) => Some(SpaceSummary { id, name, slug }),
        _ => None,
    };

    TrashItem {
        id: row.0,
        slug_id: row.1,
        title: row.2,
        icon: row.3,
        space_id: row.4,
        deleted_at: row.5,
        deleted_by_id: row.6,
        deleted_by,
        space,
    }
}

#[async_trait]
impl TreeStore for PgTreeStore {
    type Tx = PgTreeTransaction;

    async fn begin(&self) -> StoreResult<PgTreeTransaction> {
        let tx = self.db.begin().await?;
        Ok(PgTreeTransaction { tx })
    }

    async fn list_deletion_roots(
        &self,
        space_id: Uuid,
        offset: u64,
        limit: u64,
    ) -> StoreResult<Vec<TrashItem>> {
        // A parent row that no longer exists joins as NULL and counts as live.
        let rows: Vec<TrashRow> = sqlx::query_as(
            r#"
            SELECT p.id, p.slug_id, p.title, p.icon, p.space_id, p.deleted_at, p.deleted_by_id,
                   u.id, u.name, u.avatar_url,
                   s.id, s.name, s.slug
            FROM pages p
            LEFT JOIN pages parent ON parent.id = p.parent_page_id
            LEFT JOIN users u ON u.id = p.deleted_by_id
            LEFT JOIN spaces s ON s.id = p.space_id
            WHERE p.space_id = $1
              AND p.deleted_at IS NOT NULL
              AND (p.parent_page_id IS NULL OR parent.deleted_at IS NULL)
            ORDER BY p.deleted_at DESC, p.id ASC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(space_id)
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .bind(i64::try_from(offset).unwrap_or(i64::MAX))
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(row_to_trash_item).collect())
    }
}

#[async_trait]
impl TreeTransaction for PgTreeTransaction {
    async fn find_by_id(&mut self, id: Uuid, lock: bool) -> StoreResult<Option<Page>> {
        let query = format!(
            "SELECT {} FROM pages WHERE id = $1{}",
            PAGE_COLUMNS,
            if lock { " FOR UPDATE" } else { "" }
        );

        let page: Option<Page> = sqlx::query_as(&query)
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?;

        Ok(page)
    }

    async fn find_children(&mut self, parent_ids: &[Uuid]) -> StoreResult<Vec<Page>> {
        if parent_ids.is_empty() {
            return Ok(Vec::new());
        }

        let query = format!(
            "SELECT {} FROM pages WHERE parent_page_id = ANY($1) \
             ORDER BY position NULLS LAST, id FOR UPDATE",
            PAGE_COLUMNS
        );

        let pages: Vec<Page> = sqlx::query_as(&query)
            .bind(parent_ids)
            .fetch_all(&mut *self.tx)
            .await?;

        Ok(pages)
    }

    async fn mark_deleted(
        &mut self,
        ids: &[Uuid],
        deleted_by_id: Uuid,
        at: DateTime<Utc>,
    ) -> StoreResult<Vec<Uuid>> {
        let marked: Vec<Uuid> = sqlx::query_scalar(
            r#"
            UPDATE pages
            SET deleted_at = $1,
                deleted_by_id = $2,
                updated_at = $1
            WHERE id = ANY($3)
              AND deleted_at IS NULL
            RETURNING id
            "#,
        )
        .bind(at)
        .bind(deleted_by_id)
        .bind(ids)
        .fetch_all(&mut *self.tx)
        .await?;

        Ok(marked)
    }

    async fn clear_deleted(&mut self, ids: &[Uuid], at: DateTime<Utc>) -> StoreResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE pages
            SET deleted_at = NULL,
                deleted_by_id = NULL,
                updated_at = $1
            WHERE id = ANY($2)
            "#,
        )
        .bind(at)
        .bind(ids)
        .execute(&mut *self.tx)
        .await?;

        Ok(result.rows_affected())
    }

    async fn detach_from_parent(&mut self, id: Uuid, at: DateTime<Utc>) -> StoreResult<()> {
        sqlx::query("UPDATE pages SET parent_page_id = NULL, updated_at = $1 WHERE id = $2")
            .bind(at)
            .bind(id)
            .execute(&mut *self.tx)
            .await?;

        Ok(())
    }

    async fn delete_pages(&mut self, ids: &[Uuid]) -> StoreResult<u64> {
        // Rows referencing these pages are cleaned up by their own FK actions.
        let result = sqlx::query("DELETE FROM pages WHERE id = ANY($1)")
            .bind(ids)
            .execute(&mut *self.tx)
            .await?;

        Ok(result.rows_affected())
    }

    async fn commit(self) -> StoreResult<()> {
        self.tx.commit().await?;
        Ok(())
    }
}
