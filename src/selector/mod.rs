use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::core::error::Result;
use crate::core::models::Item;
use crate::store::EmbeddingStore;

/// Chooses the next comparison candidate for a query item. The contract is
/// exact L2 over the session's unreviewed items; an indexed or approximate
/// implementation may replace [`LinearScanSelector`] behind this trait, but
/// must document the deviation.
#[async_trait]
pub trait NeighborSelector: Send + Sync {
    /// Closest unreviewed item to `query` within `session`, excluding
    /// `query` itself. `None` means the session has no other unreviewed
    /// item left - the end-of-line condition, not an error.
    async fn nearest_unreviewed(&self, session: &str, query: &Item) -> Result<Option<Item>>;
}

/// Squared L2 distance. Only the argmin matters to callers, so the square
/// root is skipped.
pub fn l2_squared(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

/// Exact full-scan selector. Ties are broken by smallest item id so the
/// choice is reproducible for a fixed unreviewed set.
pub struct LinearScanSelector {
    store: Arc<dyn EmbeddingStore>,
}

impl LinearScanSelector {
    pub fn new(store: Arc<dyn EmbeddingStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl NeighborSelector for LinearScanSelector {
    async fn nearest_unreviewed(&self, session: &str, query: &Item) -> Result<Option<Item>> {
        let candidates = self.store.list_unreviewed(session).await?;

        let mut best: Option<(f32, Item)> = None;
        for candidate in candidates {
            if candidate.id == query.id {
                continue;
            }
            let distance = l2_squared(&query.embedding, &candidate.embedding);
            let closer = match &best {
                None => true,
                Some((best_distance, best_item)) => {
                    distance < *best_distance
                        || (distance == *best_distance && candidate.id < best_item.id)
                }
            };
            if closer {
                best = Some((distance, candidate));
            }
        }

        match &best {
            Some((distance, item)) => debug!(
                "Nearest unreviewed to item {} in session {}: item {} (d^2 = {})",
                query.id, session, item.id, distance
            ),
            None => debug!(
                "No unreviewed neighbor left for item {} in session {}",
                query.id, session
            ),
        }
        Ok(best.map(|(_, item)| item))
    }
}
