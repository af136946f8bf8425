pub mod builder;
pub mod detector;
pub mod models;
pub mod registry;
pub mod vocabulary;

pub use builder::{build, collect_candidates, select_trusted, CandidateSet, CatalogAssembler, LabelCandidate};
pub use detector::{BrandDetector, Detection, FuzzyPolicy, MatchKind};
pub use models::{Brand, BrandCatalog, TokenStats, TrustPolicy};
pub use registry::{load_catalog_lines, CatalogRegistry};
