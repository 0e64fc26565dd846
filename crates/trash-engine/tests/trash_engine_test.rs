//! End-to-end behavior of the trash engine against the in-memory store.

use chrono::{Duration, Utc};
use trash_engine::{EngineConfig, MemoryTreeStore, TrashEngine, TrashError};
use trash_shared::api::{DeleteOutcome, DeletePageRequest, PaginationOptions};
use trash_shared::{ActorSummary, Page, SpaceSummary};
use uuid::Uuid;

struct Harness {
    store: MemoryTreeStore,
    engine: TrashEngine<MemoryTreeStore>,
    space: Uuid,
    actor: Uuid,
}

impl Harness {
    fn new() -> Self {
        let store = MemoryTreeStore::new();
        Self {
            engine: TrashEngine::new(store.clone(), EngineConfig::default()),
            store,
            space: Uuid::new_v4(),
            actor: Uuid::new_v4(),
        }
    }

    async fn page(&self, title: &str, parent: Option<&Page>) -> Page {
        let page = Page::new(self.space, Uuid::nil(), parent.map(|p| p.id)).with_title(title);
        self.store.insert_page(page.clone()).await;
        page
    }

    async fn get(&self, page: &Page) -> Option<Page> {
        self.store.get_page(page.id).await
    }

    async fn trash_ids(&self) -> Vec<Uuid> {
        self.engine
            .list_trash(self.space, PaginationOptions::new(1, 100))
            .await
            .unwrap()
            .items
            .into_iter()
            .map(|item| item.id)
            .collect()
    }
}

#[tokio::test]
async fn soft_delete_of_fully_deleted_subtree_is_a_no_op() {
    let h = Harness::new();
    let a = h.page("A", None).await;
    let b = h.page("B", Some(&a)).await;
    h.engine.soft_delete(a.id, h.actor).await.unwrap();
    let before_a = h.get(&a).await.unwrap();
    let before_b = h.get(&b).await.unwrap();

    let result = h.engine.soft_delete(a.id, Uuid::new_v4()).await.unwrap();

    assert!(result.affected_ids.is_empty());
    assert_eq!(h.get(&a).await.unwrap(), before_a);
    assert_eq!(h.get(&b).await.unwrap(), before_b);
}

#[tokio::test]
async fn soft_delete_of_missing_page_is_a_no_op() {
    let h = Harness::new();
    let result = h.engine.soft_delete(Uuid::new_v4(), h.actor).await.unwrap();
    assert!(result.affected_ids.is_empty());
}

#[tokio::test]
async fn soft_delete_cascades_to_every_live_descendant() {
    let h = Harness::new();
    let a = h.page("A", None).await;
    let b = h.page("B", Some(&a)).await;
    let c = h.page("C", Some(&b)).await;

    let result = h.engine.soft_delete(a.id, h.actor).await.unwrap();

    assert_eq!(result.affected_ids, vec![a.id, b.id, c.id]);
    for page in [&a, &b, &c] {
        let stored = h.get(page).await.unwrap();
        assert!(stored.is_deleted());
        assert_eq!(stored.deleted_by_id, Some(h.actor));
        assert_eq!(stored.updated_at, stored.deleted_at.unwrap());
    }
}

#[tokio::test]
async fn listing_shows_only_the_deletion_root() {
    let h = Harness::new();
    let a = h.page("A", None).await;
    let b = h.page("B", Some(&a)).await;

    h.engine.soft_delete(b.id, h.actor).await.unwrap();
    assert_eq!(h.trash_ids().await, vec![b.id]);

    h.engine.soft_delete(a.id, h.actor).await.unwrap();
    assert_eq!(h.trash_ids().await, vec![a.id]);
}

#[tokio::test]
async fn restoring_under_a_deleted_parent_detaches() {
    let h = Harness::new();
    let a = h.page("A", None).await;
    let b = h.page("B", Some(&a)).await;
    h.engine.soft_delete(a.id, h.actor).await.unwrap();

    let result = h.engine.restore(b.id).await.unwrap();

    assert!(result.detached);
    assert_eq!(result.restored_ids, vec![b.id]);
    let b_after = h.get(&b).await.unwrap();
    assert!(b_after.is_live());
    assert!(b_after.parent_page_id.is_none());
    assert!(h.get(&a).await.unwrap().is_deleted());
    assert_eq!(h.trash_ids().await, vec![a.id]);
}

#[tokio::test]
async fn restore_leaves_live_descendants_alone() {
    let h = Harness::new();
    let a = h.page("A", None).await;
    let b = h.page("B", Some(&a)).await;
    h.engine.soft_delete(a.id, h.actor).await.unwrap();
    let c = h.page("C", Some(&b)).await;
    let c_before = h.get(&c).await.unwrap();

    let result = h.engine.restore(a.id).await.unwrap();

    assert!(!result.detached);
    assert_eq!(result.restored_ids, vec![a.id, b.id]);
    assert_eq!(h.get(&c).await.unwrap(), c_before);
    assert!(h.get(&a).await.unwrap().is_live());
    assert!(h.get(&b).await.unwrap().is_live());
}

#[tokio::test]
async fn restore_of_missing_page_is_not_found() {
    let h = Harness::new();
    let missing = Uuid::new_v4();
    let err = h.engine.restore(missing).await.unwrap_err();
    assert!(matches!(err, TrashError::NotFound(id) if id == missing));
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn purge_removes_whole_subtree_deleted_or_live() {
    let h = Harness::new();
    let a = h.page("A", None).await;
    let b = h.page("B", Some(&a)).await;
    let c = h.page("C", Some(&b)).await;
    let d = h.page("D", Some(&a)).await;
    let sibling = h.page("Sibling", None).await;
    h.engine.soft_delete(b.id, h.actor).await.unwrap();

    let result = h.engine.purge(a.id).await.unwrap();

    assert_eq!(result.removed_ids.len(), 4);
    assert_eq!(result.removed_ids[0], a.id);
    for page in [&a, &b, &c, &d] {
        assert!(result.removed_ids.contains(&page.id));
        assert!(h.get(page).await.is_none());
    }
    assert!(h.get(&sibling).await.is_some());
    assert!(h.engine.restore(b.id).await.is_err());
}

#[tokio::test]
async fn pagination_walks_every_root_exactly_once() {
    let h = Harness::new();
    let base = Utc::now();
    let mut expected = Vec::new();
    for i in 0..5 {
        let mut page = Page::new(h.space, Uuid::nil(), None);
        page.deleted_at = Some(base - Duration::minutes(i));
        page.deleted_by_id = Some(h.actor);
        h.store.insert_page(page.clone()).await;
        expected.push(page.id);
    }

    let mut seen = Vec::new();
    for (page_no, has_next) in [(1, true), (2, true), (3, false)] {
        let page = h
            .engine
            .list_trash(h.space, PaginationOptions::new(page_no, 2))
            .await
            .unwrap();
        assert_eq!(page.items.len(), if has_next { 2 } else { 1 });
        assert_eq!(page.meta.has_next_page, has_next);
        assert_eq!(page.meta.has_prev_page, page_no > 1);
        seen.extend(page.items.into_iter().map(|item| item.id));
    }

    assert_eq!(seen, expected);
}

#[tokio::test]
async fn equal_deletion_times_are_ordered_by_id() {
    let h = Harness::new();
    let at = Utc::now();
    let mut ids = Vec::new();
    for _ in 0..3 {
        let mut page = Page::new(h.space, Uuid::nil(), None);
        page.deleted_at = Some(at);
        page.deleted_by_id = Some(h.actor);
        h.store.insert_page(page.clone()).await;
        ids.push(page.id);
    }
    ids.sort();

    assert_eq!(h.trash_ids().await, ids);
}

#[tokio::test]
async fn listing_is_scoped_to_the_space_and_carries_summaries() {
    let h = Harness::new();
    h.store
        .insert_actor(ActorSummary {
            id: h.actor,
            name: "Ada".into(),
            avatar_url: None,
        })
        .await;
    h.store
        .insert_space(SpaceSummary {
            id: h.space,
            name: "Engineering".into(),
            slug: "engineering".into(),
        })
        .await;
    let page = h.page("Roadmap", None).await;
    let elsewhere = Page::new(Uuid::new_v4(), Uuid::nil(), None);
    h.store.insert_page(elsewhere.clone()).await;

    h.engine.soft_delete(page.id, h.actor).await.unwrap();
    h.engine.soft_delete(elsewhere.id, h.actor).await.unwrap();

    let listing = h
        .engine
        .list_trash(h.space, PaginationOptions::default())
        .await
        .unwrap();

    assert_eq!(listing.items.len(), 1);
    let item = &listing.items[0];
    assert_eq!(item.id, page.id);
    assert_eq!(item.title.as_deref(), Some("Roadmap"));
    assert_eq!(item.deleted_by.as_ref().map(|a| a.name.as_str()), Some("Ada"));
    assert_eq!(item.space.as_ref().map(|s| s.slug.as_str()), Some("engineering"));
    assert_eq!(listing.meta.limit, 20);
}

#[tokio::test]
async fn delete_then_restore_round_trip_keeps_the_tree() {
    let h = Harness::new();
    let p1 = h.page("P1", None).await;
    let p2 = h.page("P2", Some(&p1)).await;
    let p3 = h.page("P3", Some(&p2)).await;

    let deleted = h.engine.soft_delete(p2.id, h.actor).await.unwrap();
    assert_eq!(deleted.affected_ids, vec![p2.id, p3.id]);
    assert_eq!(h.trash_ids().await, vec![p2.id]);

    let restored = h.engine.restore(p2.id).await.unwrap();
    assert!(!restored.detached);
    assert_eq!(restored.restored_ids, vec![p2.id, p3.id]);
    assert!(h.trash_ids().await.is_empty());

    let p2_after = h.get(&p2).await.unwrap();
    let p3_after = h.get(&p3).await.unwrap();
    assert_eq!(p2_after.parent_page_id, Some(p1.id));
    assert_eq!(p3_after.parent_page_id, Some(p2.id));
    assert!(p2_after.is_live() && p3_after.is_live());
    assert!(p2_after.deleted_by_id.is_none());
}

#[tokio::test]
async fn force_delete_purges_instead_of_trashing() {
    let h = Harness::new();
    let a = h.page("A", None).await;
    let b = h.page("B", Some(&a)).await;

    let outcome = h
        .engine
        .delete_page(
            DeletePageRequest {
                page_id: a.id,
                force_delete: true,
            },
            h.actor,
        )
        .await
        .unwrap();

    assert!(matches!(outcome, DeleteOutcome::Purged(_)));
    assert_eq!(outcome.page_ids(), &[a.id, b.id]);
    assert_eq!(h.store.page_count().await, 0);
    assert!(h.trash_ids().await.is_empty());
}

#[tokio::test]
async fn plain_delete_moves_to_trash() {
    let h = Harness::new();
    let a = h.page("A", None).await;

    let outcome = h
        .engine
        .delete_page(
            DeletePageRequest {
                page_id: a.id,
                force_delete: false,
            },
            h.actor,
        )
        .await
        .unwrap();

    assert!(matches!(outcome, DeleteOutcome::Trashed(_)));
    assert_eq!(h.trash_ids().await, vec![a.id]);
}

#[tokio::test]
async fn unavailable_store_is_surfaced() {
    let h = Harness::new();
    let a = h.page("A", None).await;

    h.store.fail_next_begin();
    let err = h.engine.soft_delete(a.id, h.actor).await.unwrap_err();
    assert!(matches!(err, TrashError::StoreUnavailable(_)));

    h.store.fail_next_commit();
    assert!(h.engine.purge(a.id).await.unwrap_err().is_retryable());
    assert!(h.get(&a).await.unwrap().is_live());
}

#[tokio::test]
async fn cyclic_parents_fail_without_writing() {
    let h = Harness::new();
    let mut a = Page::new(h.space, Uuid::nil(), None);
    let b = Page::new(h.space, Uuid::nil(), Some(a.id));
    a.parent_page_id = Some(b.id);
    h.store.insert_page(a.clone()).await;
    h.store.insert_page(b.clone()).await;

    let err = h.engine.soft_delete(a.id, h.actor).await.unwrap_err();

    assert!(matches!(err, TrashError::InconsistentTree { .. }));
    assert!(h.get(&a).await.unwrap().is_live());
    assert!(h.get(&b).await.unwrap().is_live());
}

#[tokio::test]
async fn racing_restore_and_purge_settle_in_one_valid_state() {
    let h = Harness::new();
    let a = h.page("A", None).await;
    let b = h.page("B", Some(&a)).await;
    h.engine.soft_delete(a.id, h.actor).await.unwrap();

    let (restored, purged) = tokio::join!(h.engine.restore(a.id), h.engine.purge(a.id));
    let purged = purged.unwrap();

    let a_after = h.get(&a).await;
    let b_after = h.get(&b).await;
    match restored {
        // Restore ran first, then purge removed everything.
        Ok(_) => {
            assert_eq!(purged.removed_ids.len(), 2);
            assert!(a_after.is_none() && b_after.is_none());
        }
        // Purge ran first; restore found nothing.
        Err(TrashError::NotFound(_)) => {
            assert!(a_after.is_none() && b_after.is_none());
        }
        Err(other) => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn racing_soft_deletes_cascade_once() {
    let h = Harness::new();
    let a = h.page("A", None).await;
    h.page("B", Some(&a)).await;

    let (first, second) = tokio::join!(
        h.engine.soft_delete(a.id, h.actor),
        h.engine.soft_delete(a.id, Uuid::new_v4())
    );
    let mut counts = [
        first.unwrap().affected_ids.len(),
        second.unwrap().affected_ids.len(),
    ];
    counts.sort();

    assert_eq!(counts, [0, 2]);
    assert_eq!(h.trash_ids().await, vec![a.id]);
}
