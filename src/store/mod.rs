use async_trait::async_trait;

use crate::core::error::Result;
use crate::core::models::{Item, ItemStatus, ReviewSession, StatusCounts};

pub mod memory;

pub use memory::MemoryStore;

/// Session lifecycle storage. Kept separate from [`EmbeddingStore`] so a
/// backend can implement either side independently.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn create_session(&self, owner: &str) -> Result<ReviewSession>;

    /// Fails with `InvalidSession` for an unknown token.
    async fn get_session(&self, token: &str) -> Result<ReviewSession>;

    /// Sessions of one owner, in creation order.
    async fn sessions_for_owner(&self, owner: &str) -> Result<Vec<ReviewSession>>;

    /// Bump `last_active_at`. Called on every review decision.
    async fn touch_session(&self, token: &str) -> Result<()>;

    /// Remove the session and cascade-delete all its items. The cascade is
    /// all-or-nothing: a half-deleted session is never observable.
    async fn remove_session(&self, token: &str) -> Result<()>;
}

/// Per-session embedding records and their review statuses.
#[async_trait]
pub trait EmbeddingStore: Send + Sync {
    /// Fails with `InvalidSession` if the session does not exist and
    /// `DimensionMismatch` if the embedding has the wrong length.
    async fn insert(
        &self,
        session: &str,
        display_ref: &str,
        export_ref: &str,
        embedding: Vec<f32>,
    ) -> Result<Item>;

    async fn get(&self, session: &str, item_id: u64) -> Result<Item>;

    /// Resolve a user-facing display ref back to its item.
    async fn find_by_display_ref(&self, session: &str, display_ref: &str) -> Result<Item>;

    /// Idempotent when the status is unchanged. The first transition out of
    /// `Unreviewed` wins; a later conflicting transition is ignored.
    async fn set_status(&self, session: &str, item_id: u64, status: ItemStatus) -> Result<()>;

    /// Unreviewed items of the session, ordered by id.
    async fn list_unreviewed(&self, session: &str) -> Result<Vec<Item>>;

    async fn count_by_status(&self, session: &str) -> Result<StatusCounts>;

    /// Export refs of kept items, in item-id order. Consumed by the
    /// external archiver.
    async fn list_kept(&self, session: &str) -> Result<Vec<String>>;

    /// First `limit` display refs of the session, for overview previews.
    async fn preview(&self, session: &str, limit: usize) -> Result<Vec<String>>;
}
