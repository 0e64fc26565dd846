use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, OwnedMutexGuard};
use trash_shared::{ActorSummary, Page, SpaceSummary, TrashItem};
use uuid::Uuid;

use super::{StoreError, StoreResult, TreeStore, TreeTransaction};

#[derive(Debug, Default)]
struct MemoryState {
    pages: HashMap<Uuid, Page>,
    actors: HashMap<Uuid, ActorSummary>,
    spaces: HashMap<Uuid, SpaceSummary>,
}

#[derive(Debug, Default)]
struct Faults {
    begin: AtomicBool,
    write: AtomicBool,
    commit: AtomicBool,
}

impl Faults {
    fn trip(flag: &AtomicBool, what: &str) -> StoreResult<()> {
        if flag.swap(false, Ordering::SeqCst) {
            return Err(StoreError::Unavailable(format!("injected {} failure", what)));
        }
        Ok(())
    }
}

/// In-process store with real transaction semantics.
///
/// A transaction holds the store lock for its whole lifetime and writes to a
/// private copy of the pages, which replaces the shared copy on commit.
/// Transactions are therefore fully serialized.
#[derive(Debug, Clone, Default)]
pub struct MemoryTreeStore {
    state: Arc<Mutex<MemoryState>>,
    faults: Arc<Faults>,
}

impl MemoryTreeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_page(&self, page: Page) {
        self.state.lock().await.pages.insert(page.id, page);
    }

    pub async fn insert_actor(&self, actor: ActorSummary) {
        self.state.lock().await.actors.insert(actor.id, actor);
    }

    pub async fn insert_space(&self, space: SpaceSummary) {
        self.state.lock().await.spaces.insert(space.id, space);
    }

    /// Committed state of a page, outside any transaction.
    pub async fn get_page(&self, id: Uuid) -> Option<Page> {
        self.state.lock().await.pages.get(&id).cloned()
    }

    pub async fn page_count(&self) -> usize {
        self.state.lock().await.pages.len()
    }

    /// Makes the next `begin` fail with [`StoreError::Unavailable`].
    pub fn fail_next_begin(&self) {
        self.faults.begin.store(true, Ordering::SeqCst);
    }

    /// Makes the next bulk write or detach fail.
    pub fn fail_next_write(&self) {
        self.faults.write.store(true, Ordering::SeqCst);
    }

    pub fn fail_next_commit(&self) {
        self.faults.commit.store(true, Ordering::SeqCst);
    }
}

pub struct MemoryTreeTransaction {
    guard: OwnedMutexGuard<MemoryState>,
    pages: HashMap<Uuid, Page>,
    faults: Arc<Faults>,
}

#[async_trait]
impl TreeStore for MemoryTreeStore {
    type Tx = MemoryTreeTransaction;

    async fn begin(&self) -> StoreResult<MemoryTreeTransaction> {
        Faults::trip(&self.faults.begin, "begin")?;
        let guard = self.state.clone().lock_owned().await;
        let pages = guard.pages.clone();
        Ok(MemoryTreeTransaction {
            guard,
            pages,
            faults: self.faults.clone(),
        })
    }

    async fn list_deletion_roots(
        &self,
        space_id: Uuid,
        offset: u64,
        limit: u64,
    ) -> StoreResult<Vec<TrashItem>> {
        let state = self.state.lock().await;

        let mut roots: Vec<&Page> = state
            .pages
            .values()
            .filter(|p| p.space_id == space_id && p.is_deleted())
            .filter(|p| match p.parent_page_id {
                None => true,
                Some(parent_id) => state
                    .pages
                    .get(&parent_id)
                    .map_or(true, |parent| parent.is_live()),
            })
            .collect();

        roots.sort_by(|a, b| b.deleted_at.cmp(&a.deleted_at).then(a.id.cmp(&b.id)));

        let offset = usize::try_from(offset).unwrap_or(usize::MAX);
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);

        Ok(roots
            .into_iter()
            .skip(offset)
            .take(limit)
            .filter_map(|p| {
                Some(TrashItem {
                    id: p.id,
                    slug_id: p.slug_id.clone(),
                    title: p.title.clone(),
                    icon: p.icon.clone(),
                    space_id: p.space_id,
                    deleted_at: p.deleted_at?,
                    deleted_by_id: p.deleted_by_id,
                    deleted_by: p
                        .deleted_by_id
                        .and_then(|id| state.actors.get(&id).cloned()),
                    space: state.spaces.get(&p.space_id).cloned(),
                })
            })
            .collect())
    }
}

#[async_trait]
impl TreeTransaction for MemoryTreeTransaction {
    async fn find_by_id(&mut self, id: Uuid, _lock: bool) -> StoreResult<Option<Page>> {
        Ok(self.pages.get(&id).cloned())
    }

    async fn find_children(&mut self, parent_ids: &[Uuid]) -> StoreResult<Vec<Page>> {
        let mut children: Vec<Page> = self
            .pages
            .values()
            .filter(|p| p.parent_page_id.is_some_and(|id| parent_ids.contains(&id)))
            .cloned()
            .collect();

        // Same order as the Postgres adapter: position (unset last), then id.
        children.sort_by(|a, b| {
            (a.position.is_none(), &a.position, a.id).cmp(&(b.position.is_none(), &b.position, b.id))
        });

        Ok(children)
    }

    async fn mark_deleted(
        &mut self,
        ids: &[Uuid],
        deleted_by_id: Uuid,
        at: DateTime<Utc>,
    ) -> StoreResult<Vec<Uuid>> {
        Faults::trip(&self.faults.write, "write")?;
        let mut marked = Vec::new();
        for id in ids {
            if let Some(page) = self.pages.get_mut(id).filter(|p| p.is_live()) {
                page.deleted_at = Some(at);
                page.deleted_by_id = Some(deleted_by_id);
                page.updated_at = at;
                marked.push(*id);
            }
        }
        Ok(marked)
    }

    async fn clear_deleted(&mut self, ids: &[Uuid], at: DateTime<Utc>) -> StoreResult<u64> {
        Faults::trip(&self.faults.write, "write")?;
        let mut rows = 0;
        for id in ids {
            if let Some(page) = self.pages.get_mut(id) {
                page.deleted_at = None;
                page.deleted_by_id = None;
                page.updated_at = at;
                rows += 1;
            }
        }
        Ok(rows)
    }

    async fn detach_from_parent(&mut self, id: Uuid, at: DateTime<Utc>) -> StoreResult<()> {
        Faults::trip(&self.faults.write, "write")?;
        if let Some(page) = self.pages.get_mut(&id) {
            page.parent_page_id = None;
            page.updated_at = at;
        }
        Ok(())
    }

    async fn delete_pages(&mut self, ids: &[Uuid]) -> StoreResult<u64> {
        Faults::trip(&self.faults.write, "write")?;
        let mut rows = 0;
        for id in ids {
            if self.pages.remove(id).is_some() {
                rows += 1;
            }
        }
        // Mirrors ON DELETE SET NULL for pages left pointing at a removed parent.
        for page in self.pages.values_mut() {
            if page.parent_page_id.is_some_and(|parent| ids.contains(&parent)) {
                page.parent_page_id = None;
            }
        }
        Ok(rows)
    }

    async fn commit(self) -> StoreResult<()> {
        Faults::trip(&self.faults.commit, "commit")?;
        let MemoryTreeTransaction {
            mut guard, pages, ..
        } = self;
        guard.pages = pages;
        Ok(())
    }
}
