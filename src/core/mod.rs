pub mod config;
pub mod error;
pub mod models;

pub use config::SweeperConfig;
pub use error::{Result, SweeperError};
pub use models::{Item, ItemStatus, ReviewSession, SessionSummary, StatusCounts};
