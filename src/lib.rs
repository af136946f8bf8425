pub mod brands;
pub mod core;
pub mod db;
pub mod ingest;
pub mod search;
pub mod text;
pub mod utils;

pub use utils::{safe_truncate, safe_truncate_ellipsis};


pub use brands::{BrandCatalog, BrandDetector, CatalogRegistry, TrustPolicy};
pub use crate::core::config::SearchConfig;
pub use crate::core::error::{Result, SearchError};
pub use db::{HttpIndexClient, IndexError, SearchHit, SearchIndex};
pub use search::{QueryClassification, QueryClassifier, QueryKind, QueryPlanner, RetrievalPlan, SearchService};
pub use text::normalize;


pub const DEFAULT_INDEX_URL: &str = "http://localhost:9200";


pub const DEFAULT_INDEX_NAME: &str = "products";


pub const DEFAULT_CATALOG_PATH: &str = "manufacturer.txt";


pub const DEFAULT_CACHE_SIZE: usize = 1000;


pub const DEFAULT_CACHE_TTL: u64 = 300;
