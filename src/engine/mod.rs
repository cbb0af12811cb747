use std::sync::Arc;

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::core::error::Result;
use crate::core::models::ItemStatus;
use crate::selector::NeighborSelector;
use crate::store::{EmbeddingStore, SessionStore};

/// One slot of a displayed pair: a real item's display ref, or the
/// terminal marker signalling that no further candidate exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "display_ref", rename_all = "snake_case")]
pub enum ItemRef {
    Item(String),
    Terminal,
}

impl ItemRef {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ItemRef::Terminal)
    }
}

/// Which side of the pair the survivor occupied. Preserved across
/// decisions so the UI stays stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Left,
    Right,
}

/// The pair currently offered to the user. Both slots terminal means the
/// session is done.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairView {
    pub left: ItemRef,
    pub right: ItemRef,
}

impl PairView {
    pub fn terminal() -> Self {
        Self {
            left: ItemRef::Terminal,
            right: ItemRef::Terminal,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.left.is_terminal() && self.right.is_terminal()
    }

    fn with_survivor(side: Side, survivor: String, other: ItemRef) -> Self {
        match side {
            Side::Left => Self {
                left: ItemRef::Item(survivor),
                right: other,
            },
            Side::Right => Self {
                left: other,
                right: ItemRef::Item(survivor),
            },
        }
    }
}

/// What happens to the non-clicked item of the pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionMode {
    /// The other item loses the comparison and is discarded.
    DiscardLoser,
    /// The other item is explicitly accepted as well ("continue").
    KeepLoserToo,
}

/// A user decision on the currently displayed pair.
#[derive(Debug, Clone)]
pub struct Decision {
    /// Display ref of the clicked item.
    pub survivor: String,
    /// The other displayed slot; terminal when the user was asked to keep
    /// or discard the very last item.
    pub loser: ItemRef,
    pub survivor_side: Side,
    pub mode: DecisionMode,
}

/// Online nearest-neighbor elimination tournament. Every decision reviews
/// exactly one item, so a session of N items reaches the terminal pair in
/// at most N decisions.
pub struct ReviewEngine {
    sessions: Arc<dyn SessionStore>,
    store: Arc<dyn EmbeddingStore>,
    selector: Arc<dyn NeighborSelector>,
    rng: Mutex<StdRng>,
}

impl ReviewEngine {
    pub fn new(
        sessions: Arc<dyn SessionStore>,
        store: Arc<dyn EmbeddingStore>,
        selector: Arc<dyn NeighborSelector>,
    ) -> Self {
        Self {
            sessions,
            store,
            selector,
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Engine with a fixed seed draw order, for reproducible runs.
    pub fn with_seed(
        sessions: Arc<dyn SessionStore>,
        store: Arc<dyn EmbeddingStore>,
        selector: Arc<dyn NeighborSelector>,
        seed: u64,
    ) -> Self {
        Self {
            sessions,
            store,
            selector,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Start a fresh comparison chain: draw a random unreviewed item and
    /// pair it with its nearest unreviewed neighbor. Returns the terminal
    /// pair when nothing is left to review.
    pub async fn seed(&self, session: &str) -> Result<PairView> {
        self.sessions.get_session(session).await?;

        let unreviewed = self.store.list_unreviewed(session).await?;
        if unreviewed.is_empty() {
            info!("Session {} has no unreviewed items, presenting terminal pair", session);
            return Ok(PairView::terminal());
        }

        let index = self.rng.lock().gen_range(0..unreviewed.len());
        let seed = &unreviewed[index];
        debug!("Session {} seeded with item {}", session, seed.id);

        match self.selector.nearest_unreviewed(session, seed).await? {
            Some(neighbor) => Ok(PairView {
                left: ItemRef::Item(seed.display_ref.clone()),
                right: ItemRef::Item(neighbor.display_ref),
            }),
            // the seed is the only unreviewed item left
            None => Ok(PairView {
                left: ItemRef::Item(seed.display_ref.clone()),
                right: ItemRef::Terminal,
            }),
        }
    }

    /// Apply one decision and return the next pair to display.
    ///
    /// The loser is reviewed according to the decision mode, then the
    /// survivor is paired with its next nearest unreviewed neighbor. A
    /// survivor with no neighbor left is promoted to kept and a brand-new
    /// chain is seeded; the terminal pair is returned once no unreviewed
    /// item remains at all.
    pub async fn decide(&self, session: &str, decision: Decision) -> Result<PairView> {
        self.sessions.touch_session(session).await?;

        let loser_status = match decision.mode {
            DecisionMode::DiscardLoser => ItemStatus::Discarded,
            DecisionMode::KeepLoserToo => ItemStatus::Kept,
        };

        match &decision.loser {
            ItemRef::Item(loser_ref) => {
                let loser = self.store.find_by_display_ref(session, loser_ref).await?;
                self.store.set_status(session, loser.id, loser_status).await?;
            }
            ItemRef::Terminal => {
                // "keep or discard the very last one": the survivor is kept
                // and the session is done
                let survivor = self
                    .store
                    .find_by_display_ref(session, &decision.survivor)
                    .await?;
                self.store
                    .set_status(session, survivor.id, ItemStatus::Kept)
                    .await?;
                info!("Session {} finished, last item {} kept", session, survivor.id);
                return Ok(PairView::terminal());
            }
        }

        let survivor = self
            .store
            .find_by_display_ref(session, &decision.survivor)
            .await?;

        match self.selector.nearest_unreviewed(session, &survivor).await? {
            Some(neighbor) => Ok(PairView::with_survivor(
                decision.survivor_side,
                survivor.display_ref,
                ItemRef::Item(neighbor.display_ref),
            )),
            None => {
                // chain exhausted: the survivor outlasted every neighbor
                self.store
                    .set_status(session, survivor.id, ItemStatus::Kept)
                    .await?;
                debug!(
                    "Item {} promoted to kept in session {}, reseeding",
                    survivor.id, session
                );
                self.seed(session).await
            }
        }
    }
}
