use std::sync::Arc;

use tracing::debug;

use super::models::{QueryClassification, QueryKind};
use super::patterns::{is_article_query, parse_url, url_tokens};
use crate::brands::{BrandCatalog, BrandDetector, FuzzyPolicy};
use crate::core::SearchConfig;
use crate::text::normalize_code;
use crate::utils::safe_truncate;


pub struct QueryClassifier {
    detector: BrandDetector,
    article_min_digit_ratio: f64,
}

impl QueryClassifier {
    pub fn new(catalog: Arc<BrandCatalog>, article_min_digit_ratio: f64) -> Self {
        Self {
            detector: BrandDetector::new(catalog),
            article_min_digit_ratio,
        }
    }

    pub fn from_config(catalog: Arc<BrandCatalog>, config: &SearchConfig) -> Self {
        Self {
            detector: BrandDetector::with_policy(catalog, FuzzyPolicy::from_config(config)),
            article_min_digit_ratio: config.article_min_digit_ratio,
        }
    }

    pub fn detector(&self) -> &BrandDetector {
        &self.detector
    }


    pub fn classify(&self, raw_query: &str) -> QueryClassification {
        let query = raw_query.trim();
        if query.is_empty() {
            return QueryClassification::empty(raw_query);
        }

        let classification = if let Some(url) = parse_url(query) {
            QueryClassification {
                kind: QueryKind::Url,
                url_tokens: Some(url_tokens(&url)),
                ..QueryClassification::empty(query)
            }
        } else if is_article_query(query, self.article_min_digit_ratio) {
            QueryClassification {
                kind: QueryKind::Article,
                normalized_code: Some(normalize_code(query)).filter(|code| !code.is_empty()),
                ..QueryClassification::empty(query)
            }
        } else {
            QueryClassification::from_detection(query, self.detector.detect(query))
        };

        debug!(
            "Classified '{}' as {} (brands: {:?})",
            safe_truncate(query, 80),
            classification.kind.as_str(),
            classification.brand_ids
        );
        classification
    }
}
