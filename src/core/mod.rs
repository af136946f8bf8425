pub mod cache;
pub mod config;
pub mod error;
pub mod search_modes;

pub use cache::{CacheStats, ResponseCache};
pub use self::config::SearchConfig;
pub use error::{Result, SearchError};
pub use search_modes::{RetrievalMode, RetrievalModeDefaults};
