pub mod fallback;
pub mod planner;
pub mod query_processor;
pub mod service;

pub use fallback::{Execution, FallbackExecutor};
pub use planner::{QueryClause, QueryPlanner, RetrievalPlan};
pub use query_processor::{QueryClassification, QueryClassifier, QueryKind};
pub use service::{SearchResponse, SearchService};
