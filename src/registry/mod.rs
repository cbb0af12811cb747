use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::{info, warn};

use crate::core::error::{Result, SweeperError};
use crate::core::models::{ReviewSession, SessionSummary};
use crate::store::{EmbeddingStore, SessionStore};

/// External identity collaborator. The registry only needs to know whether
/// an opaque owner id resolves; authentication happens elsewhere.
#[async_trait]
pub trait OwnerDirectory: Send + Sync {
    async fn resolve(&self, owner: &str) -> bool;
}

/// In-process directory backed by a plain set of known owner ids.
#[derive(Default)]
pub struct StaticOwnerDirectory {
    owners: RwLock<HashSet<String>>,
}

impl StaticOwnerDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, owner: &str) {
        self.owners.write().insert(owner.to_string());
    }
}

#[async_trait]
impl OwnerDirectory for StaticOwnerDirectory {
    async fn resolve(&self, owner: &str) -> bool {
        self.owners.read().contains(owner)
    }
}

/// Owner-facing session lifecycle: create, list, delete (with cascading
/// item removal) and aggregate progress.
pub struct SessionRegistry {
    owners: Arc<dyn OwnerDirectory>,
    sessions: Arc<dyn SessionStore>,
    store: Arc<dyn EmbeddingStore>,
    preview_limit: usize,
}

impl SessionRegistry {
    pub fn new(
        owners: Arc<dyn OwnerDirectory>,
        sessions: Arc<dyn SessionStore>,
        store: Arc<dyn EmbeddingStore>,
        preview_limit: usize,
    ) -> Self {
        Self {
            owners,
            sessions,
            store,
            preview_limit,
        }
    }

    pub async fn create(&self, owner: &str) -> Result<ReviewSession> {
        if !self.owners.resolve(owner).await {
            warn!("Refusing session creation for unknown owner {}", owner);
            return Err(SweeperError::UnknownOwner(owner.to_string()));
        }
        self.sessions.create_session(owner).await
    }

    /// Sessions of `owner` in creation order.
    pub async fn list(&self, owner: &str) -> Result<Vec<ReviewSession>> {
        if !self.owners.resolve(owner).await {
            return Err(SweeperError::UnknownOwner(owner.to_string()));
        }
        self.sessions.sessions_for_owner(owner).await
    }

    /// Delete `token` and everything under it. Fails with `Forbidden` when
    /// the session belongs to someone else; the cascade itself is delegated
    /// to the store and is all-or-nothing.
    pub async fn delete(&self, owner: &str, token: &str) -> Result<()> {
        let session = self.sessions.get_session(token).await?;
        if session.owner != owner {
            warn!(
                "Owner {} attempted to delete session {} owned by {}",
                owner, token, session.owner
            );
            return Err(SweeperError::Forbidden(token.to_string()));
        }
        self.sessions.remove_session(token).await?;
        info!("Owner {} deleted session {}", owner, token);
        Ok(())
    }

    /// Percentage of reviewed items, 0 for an empty session.
    pub async fn progress(&self, token: &str) -> Result<f64> {
        self.sessions.get_session(token).await?;
        Ok(self.store.count_by_status(token).await?.progress())
    }

    /// Bounded overview of one session for listing pages.
    pub async fn summary(&self, token: &str) -> Result<SessionSummary> {
        let session = self.sessions.get_session(token).await?;
        let preview = self.store.preview(token, self.preview_limit).await?;
        let progress = self.store.count_by_status(token).await?.progress();
        Ok(SessionSummary {
            token: session.token,
            preview,
            progress,
        })
    }
}
