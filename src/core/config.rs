use serde::{Deserialize, Serialize};

use crate::{DEFAULT_EMBEDDING_DIM, DEFAULT_PREVIEW_LIMIT};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweeperConfig {
    /// Expected length of every embedding vector in a store.
    pub embedding_dim: usize,
    /// How many display refs a session summary previews.
    pub preview_limit: usize,
}

impl SweeperConfig {
    pub fn new(embedding_dim: usize) -> Self {
        Self {
            embedding_dim,
            preview_limit: DEFAULT_PREVIEW_LIMIT,
        }
    }

    pub fn from_env() -> Self {
        let mut config = Self::new(
            std::env::var("SWEEPER_EMBEDDING_DIM")
                .ok()
                .and_then(|d| d.parse().ok())
                .unwrap_or(DEFAULT_EMBEDDING_DIM),
        );

        if let Some(limit) = std::env::var("SWEEPER_PREVIEW_LIMIT")
            .ok()
            .and_then(|l| l.parse().ok())
        {
            config.preview_limit = limit;
        }

        config
    }
}

impl Default for SweeperConfig {
    fn default() -> Self {
        Self::new(DEFAULT_EMBEDDING_DIM)
    }
}
