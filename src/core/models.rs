use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{EnumString, IntoStaticStr};

/// Review status of a single item. Transitions are monotonic: an item
/// leaves `Unreviewed` exactly once and never flips between the two
/// reviewed states.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, IntoStaticStr,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    Unreviewed,
    Kept,
    Discarded,
}

/// One embedding record inside a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    /// Session-scoped id, assigned on insertion.
    pub id: u64,
    /// Locator used to present the item to the user.
    pub display_ref: String,
    /// Locator used when the item is exported; may differ from
    /// `display_ref` (e.g. converted preview vs. raw original).
    pub export_ref: String,
    pub embedding: Vec<f32>,
    pub status: ItemStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewSession {
    pub token: String,
    pub owner: String,
    pub created_at: DateTime<Utc>,
    pub last_active_at: DateTime<Utc>,
}

/// Per-status item counts of a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub unreviewed: usize,
    pub kept: usize,
    pub discarded: usize,
}

impl StatusCounts {
    pub fn total(&self) -> usize {
        self.unreviewed + self.kept + self.discarded
    }

    pub fn reviewed(&self) -> usize {
        self.kept + self.discarded
    }

    /// Percentage of items reviewed, in [0, 100]. An empty session
    /// reports 0 rather than dividing by zero.
    pub fn progress(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        100.0 * self.reviewed() as f64 / total as f64
    }
}

/// Bounded overview of a session for listing pages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    pub token: String,
    pub preview: Vec<String>,
    pub progress: f64,
}
