pub mod models;
pub mod patterns;
pub mod processor;

pub use models::{QueryClassification, QueryKind};
pub use processor::QueryClassifier;
