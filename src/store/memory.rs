use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{EmbeddingStore, SessionStore};
use crate::core::error::{Result, SweeperError};
use crate::core::models::{Item, ItemStatus, ReviewSession, StatusCounts};

struct SessionItems {
    next_id: u64,
    items: Vec<Item>,
}

impl SessionItems {
    fn new() -> Self {
        Self {
            next_id: 1,
            items: Vec::new(),
        }
    }
}

#[derive(Default)]
struct Inner {
    sessions: HashMap<String, ReviewSession>,
    /// Tokens in creation order, for stable owner listings.
    order: Vec<String>,
    items: HashMap<String, SessionItems>,
}

/// In-memory backend implementing both [`SessionStore`] and
/// [`EmbeddingStore`]. All mutations of one store go through a single
/// write lock, so a status change and the neighbor query that follows it
/// never see torn state, and session removal cascades atomically.
pub struct MemoryStore {
    embedding_dim: usize,
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new(embedding_dim: usize) -> Self {
        Self {
            embedding_dim,
            inner: RwLock::new(Inner::default()),
        }
    }

    pub fn embedding_dim(&self) -> usize {
        self.embedding_dim
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn create_session(&self, owner: &str) -> Result<ReviewSession> {
        let now = Utc::now();
        let session = ReviewSession {
            token: Uuid::new_v4().simple().to_string(),
            owner: owner.to_string(),
            created_at: now,
            last_active_at: now,
        };

        let mut inner = self.inner.write();
        inner.order.push(session.token.clone());
        inner.items.insert(session.token.clone(), SessionItems::new());
        inner
            .sessions
            .insert(session.token.clone(), session.clone());

        info!("Session {} created for owner {}", session.token, owner);
        Ok(session)
    }

    async fn get_session(&self, token: &str) -> Result<ReviewSession> {
        let inner = self.inner.read();
        inner
            .sessions
            .get(token)
            .cloned()
            .ok_or_else(|| SweeperError::InvalidSession(token.to_string()))
    }

    async fn sessions_for_owner(&self, owner: &str) -> Result<Vec<ReviewSession>> {
        let inner = self.inner.read();
        Ok(inner
            .order
            .iter()
            .filter_map(|token| inner.sessions.get(token))
            .filter(|session| session.owner == owner)
            .cloned()
            .collect())
    }

    async fn touch_session(&self, token: &str) -> Result<()> {
        let mut inner = self.inner.write();
        let session = inner
            .sessions
            .get_mut(token)
            .ok_or_else(|| SweeperError::InvalidSession(token.to_string()))?;
        session.last_active_at = Utc::now();
        Ok(())
    }

    async fn remove_session(&self, token: &str) -> Result<()> {
        let mut inner = self.inner.write();
        if !inner.sessions.contains_key(token) {
            return Err(SweeperError::InvalidSession(token.to_string()));
        }

        let removed_items = inner
            .items
            .remove(token)
            .map(|entry| entry.items.len())
            .unwrap_or(0);
        inner.sessions.remove(token);
        inner.order.retain(|t| t != token);

        info!("Session {} removed ({} items cascaded)", token, removed_items);
        Ok(())
    }
}

#[async_trait]
impl EmbeddingStore for MemoryStore {
    async fn insert(
        &self,
        session: &str,
        display_ref: &str,
        export_ref: &str,
        embedding: Vec<f32>,
    ) -> Result<Item> {
        if embedding.len() != self.embedding_dim {
            return Err(SweeperError::DimensionMismatch {
                expected: self.embedding_dim,
                actual: embedding.len(),
            });
        }

        let mut inner = self.inner.write();
        let entry = inner
            .items
            .get_mut(session)
            .ok_or_else(|| SweeperError::InvalidSession(session.to_string()))?;

        let item = Item {
            id: entry.next_id,
            display_ref: display_ref.to_string(),
            export_ref: export_ref.to_string(),
            embedding,
            status: ItemStatus::Unreviewed,
        };
        entry.next_id += 1;
        entry.items.push(item.clone());

        debug!("Item {} ({}) inserted into session {}", item.id, display_ref, session);
        Ok(item)
    }

    async fn get(&self, session: &str, item_id: u64) -> Result<Item> {
        let inner = self.inner.read();
        let entry = inner
            .items
            .get(session)
            .ok_or_else(|| SweeperError::InvalidSession(session.to_string()))?;
        entry
            .items
            .iter()
            .find(|item| item.id == item_id)
            .cloned()
            .ok_or_else(|| SweeperError::NotFound(format!("item {item_id}")))
    }

    async fn find_by_display_ref(&self, session: &str, display_ref: &str) -> Result<Item> {
        let inner = self.inner.read();
        let entry = inner
            .items
            .get(session)
            .ok_or_else(|| SweeperError::InvalidSession(session.to_string()))?;
        entry
            .items
            .iter()
            .find(|item| item.display_ref == display_ref)
            .cloned()
            .ok_or_else(|| SweeperError::NotFound(display_ref.to_string()))
    }

    async fn set_status(&self, session: &str, item_id: u64, status: ItemStatus) -> Result<()> {
        let mut inner = self.inner.write();
        let entry = inner
            .items
            .get_mut(session)
            .ok_or_else(|| SweeperError::InvalidSession(session.to_string()))?;
        let item = entry
            .items
            .iter_mut()
            .find(|item| item.id == item_id)
            .ok_or_else(|| SweeperError::NotFound(format!("item {item_id}")))?;

        if item.status == status {
            debug!("Item {} already {:?}, no-op", item_id, status);
            return Ok(());
        }
        // First transition out of Unreviewed wins; a conflicting later
        // decision (e.g. a raced duplicate) is ignored.
        if item.status != ItemStatus::Unreviewed {
            warn!(
                "Item {} is already {:?}, ignoring transition to {:?}",
                item_id, item.status, status
            );
            return Ok(());
        }

        item.status = status;
        debug!("Item {} marked {:?} in session {}", item_id, status, session);
        Ok(())
    }

    async fn list_unreviewed(&self, session: &str) -> Result<Vec<Item>> {
        let inner = self.inner.read();
        let entry = inner
            .items
            .get(session)
            .ok_or_else(|| SweeperError::InvalidSession(session.to_string()))?;
        Ok(entry
            .items
            .iter()
            .filter(|item| item.status == ItemStatus::Unreviewed)
            .cloned()
            .collect())
    }

    async fn count_by_status(&self, session: &str) -> Result<StatusCounts> {
        let inner = self.inner.read();
        let entry = inner
            .items
            .get(session)
            .ok_or_else(|| SweeperError::InvalidSession(session.to_string()))?;
        let mut counts = StatusCounts::default();
        for item in &entry.items {
            match item.status {
                ItemStatus::Unreviewed => counts.unreviewed += 1,
                ItemStatus::Kept => counts.kept += 1,
                ItemStatus::Discarded => counts.discarded += 1,
            }
        }
        Ok(counts)
    }

    async fn list_kept(&self, session: &str) -> Result<Vec<String>> {
        let inner = self.inner.read();
        let entry = inner
            .items
            .get(session)
            .ok_or_else(|| SweeperError::InvalidSession(session.to_string()))?;
        Ok(entry
            .items
            .iter()
            .filter(|item| item.status == ItemStatus::Kept)
            .map(|item| item.export_ref.clone())
            .collect())
    }

    async fn preview(&self, session: &str, limit: usize) -> Result<Vec<String>> {
        let inner = self.inner.read();
        let entry = inner
            .items
            .get(session)
            .ok_or_else(|| SweeperError::InvalidSession(session.to_string()))?;
        Ok(entry
            .items
            .iter()
            .take(limit)
            .map(|item| item.display_ref.clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn embedding(fill: f32) -> Vec<f32> {
        vec![fill; 4]
    }

    #[tokio::test]
    async fn test_insert_requires_session() {
        let store = MemoryStore::new(4);
        let err = store
            .insert("missing", "a.jpg", "a.dng", embedding(0.0))
            .await
            .unwrap_err();
        assert!(matches!(err, SweeperError::InvalidSession(_)));
    }

    #[tokio::test]
    async fn test_insert_rejects_wrong_dimension() {
        let store = MemoryStore::new(4);
        let session = store.create_session("tester").await.unwrap();
        let err = store
            .insert(&session.token, "a.jpg", "a.dng", vec![1.0; 3])
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SweeperError::DimensionMismatch {
                expected: 4,
                actual: 3
            }
        ));
    }

    #[tokio::test]
    async fn test_ids_are_session_scoped_and_sequential() {
        let store = MemoryStore::new(4);
        let first = store.create_session("tester").await.unwrap();
        let second = store.create_session("tester").await.unwrap();

        let a = store
            .insert(&first.token, "a.jpg", "a.dng", embedding(0.1))
            .await
            .unwrap();
        let b = store
            .insert(&first.token, "b.jpg", "b.dng", embedding(0.2))
            .await
            .unwrap();
        let c = store
            .insert(&second.token, "c.jpg", "c.dng", embedding(0.3))
            .await
            .unwrap();

        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
        assert_eq!(c.id, 1);
    }

    #[tokio::test]
    async fn test_find_by_display_ref() {
        let store = MemoryStore::new(4);
        let session = store.create_session("tester").await.unwrap();
        let inserted = store
            .insert(&session.token, "a.jpg", "a.dng", embedding(0.5))
            .await
            .unwrap();

        let found = store
            .find_by_display_ref(&session.token, "a.jpg")
            .await
            .unwrap();
        assert_eq!(found.id, inserted.id);
        assert_eq!(found.export_ref, "a.dng");

        let err = store
            .find_by_display_ref(&session.token, "nope.jpg")
            .await
            .unwrap_err();
        assert!(matches!(err, SweeperError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_set_status_idempotent_and_first_wins() {
        let store = MemoryStore::new(4);
        let session = store.create_session("tester").await.unwrap();
        let item = store
            .insert(&session.token, "a.jpg", "a.dng", embedding(0.5))
            .await
            .unwrap();

        store
            .set_status(&session.token, item.id, ItemStatus::Discarded)
            .await
            .unwrap();
        // repeated identical transition is a no-op
        store
            .set_status(&session.token, item.id, ItemStatus::Discarded)
            .await
            .unwrap();
        // conflicting transition after review is ignored
        store
            .set_status(&session.token, item.id, ItemStatus::Kept)
            .await
            .unwrap();

        let current = store.get(&session.token, item.id).await.unwrap();
        assert_eq!(current.status, ItemStatus::Discarded);
    }

    #[tokio::test]
    async fn test_counts_partition_items() {
        let store = MemoryStore::new(4);
        let session = store.create_session("tester").await.unwrap();
        for i in 0..5 {
            store
                .insert(
                    &session.token,
                    &format!("{i}.jpg"),
                    &format!("{i}.dng"),
                    embedding(i as f32),
                )
                .await
                .unwrap();
        }
        store
            .set_status(&session.token, 1, ItemStatus::Kept)
            .await
            .unwrap();
        store
            .set_status(&session.token, 2, ItemStatus::Discarded)
            .await
            .unwrap();

        let counts = store.count_by_status(&session.token).await.unwrap();
        assert_eq!(counts.kept, 1);
        assert_eq!(counts.discarded, 1);
        assert_eq!(counts.unreviewed, 3);
        assert_eq!(counts.total(), 5);
    }

    #[tokio::test]
    async fn test_list_kept_returns_export_refs_in_id_order() {
        let store = MemoryStore::new(4);
        let session = store.create_session("tester").await.unwrap();
        for i in 0..3 {
            store
                .insert(
                    &session.token,
                    &format!("{i}.jpg"),
                    &format!("{i}.dng"),
                    embedding(i as f32),
                )
                .await
                .unwrap();
        }
        store
            .set_status(&session.token, 3, ItemStatus::Kept)
            .await
            .unwrap();
        store
            .set_status(&session.token, 1, ItemStatus::Kept)
            .await
            .unwrap();

        let kept = store.list_kept(&session.token).await.unwrap();
        assert_eq!(kept, vec!["0.dng".to_string(), "2.dng".to_string()]);
    }

    #[tokio::test]
    async fn test_remove_session_cascades() {
        let store = MemoryStore::new(4);
        let session = store.create_session("tester").await.unwrap();
        store
            .insert(&session.token, "a.jpg", "a.dng", embedding(0.5))
            .await
            .unwrap();

        store.remove_session(&session.token).await.unwrap();

        let err = store.count_by_status(&session.token).await.unwrap_err();
        assert!(matches!(err, SweeperError::InvalidSession(_)));
        let err = store.get_session(&session.token).await.unwrap_err();
        assert!(matches!(err, SweeperError::InvalidSession(_)));
    }

    #[tokio::test]
    async fn test_sessions_for_owner_creation_order() {
        let store = MemoryStore::new(4);
        let first = store.create_session("alice").await.unwrap();
        let _other = store.create_session("bob").await.unwrap();
        let second = store.create_session("alice").await.unwrap();

        let sessions = store.sessions_for_owner("alice").await.unwrap();
        let tokens: Vec<_> = sessions.iter().map(|s| s.token.clone()).collect();
        assert_eq!(tokens, vec![first.token, second.token]);
    }
}
