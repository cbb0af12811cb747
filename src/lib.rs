pub mod core;
pub mod engine;
pub mod registry;
pub mod selector;
pub mod store;

pub use crate::core::config::SweeperConfig;
pub use crate::core::error::{Result, SweeperError};
pub use crate::core::models::{Item, ItemStatus, ReviewSession, SessionSummary, StatusCounts};
pub use crate::engine::{Decision, DecisionMode, ItemRef, PairView, ReviewEngine, Side};
pub use crate::registry::{OwnerDirectory, SessionRegistry, StaticOwnerDirectory};
pub use crate::selector::{LinearScanSelector, NeighborSelector};
pub use crate::store::{EmbeddingStore, MemoryStore, SessionStore};

/// Embedding length every store expects unless configured otherwise.
pub const DEFAULT_EMBEDDING_DIM: usize = 384;

/// Display refs shown per session in overview summaries.
pub const DEFAULT_PREVIEW_LIMIT: usize = 3;
