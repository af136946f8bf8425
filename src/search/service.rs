use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::fallback::FallbackExecutor;
use super::planner::{QueryPlanner, RetrievalPlan};
use super::query_processor::{QueryClassification, QueryClassifier};
use crate::brands::{BrandCatalog, CatalogRegistry};
use crate::core::{CacheStats, ResponseCache, Result, SearchConfig, SearchError};
use crate::db::{SearchHit, SearchIndex};
use crate::utils::safe_truncate;


#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchResponse {
    pub query: String,
    pub classification: QueryClassification,
    pub results: Vec<SearchHit>,
    pub took_ms: f64,
    pub used_fallback: bool,
    pub plans: Vec<RetrievalPlan>,
}


pub struct SearchService {
    config: SearchConfig,
    registry: Arc<CatalogRegistry>,
    executor: FallbackExecutor,
    cache: Option<ResponseCache<SearchResponse>>,
}

impl SearchService {
    pub fn new(config: SearchConfig, registry: Arc<CatalogRegistry>, index: Arc<dyn SearchIndex>) -> Self {
        let cache = config
            .cache_enabled
            .then(|| ResponseCache::new(config.cache_capacity, config.cache_ttl_secs));
        let executor = FallbackExecutor::new(index, QueryPlanner::from_config(&config));
        Self {
            config,
            registry,
            executor,
            cache,
        }
    }

    pub fn registry(&self) -> &Arc<CatalogRegistry> {
        &self.registry
    }

    pub fn classify(&self, raw_query: &str) -> QueryClassification {
        self.classify_with(self.registry.snapshot(), raw_query)
    }

    pub fn plan(&self, raw_query: &str) -> (QueryClassification, RetrievalPlan) {
        self.plan_with(self.registry.snapshot(), raw_query)
    }

    fn classify_with(&self, catalog: Arc<BrandCatalog>, raw_query: &str) -> QueryClassification {
        QueryClassifier::from_config(catalog, &self.config).classify(raw_query)
    }

    fn plan_with(&self, catalog: Arc<BrandCatalog>, raw_query: &str) -> (QueryClassification, RetrievalPlan) {
        let classification = self.classify_with(catalog, raw_query);
        let plan = self.executor.planner().plan(&classification);
        (classification, plan)
    }


    pub async fn search(&self, raw_query: &str) -> Result<SearchResponse> {
        if raw_query.trim().is_empty() {
            return Err(SearchError::validation("query must not be empty"));
        }

        let (generation, catalog) = self.registry.versioned_snapshot();
        let cache_key = ResponseCache::<SearchResponse>::make_key(generation, raw_query);
        if let Some(cached) = self.cache.as_ref().and_then(|c| c.get(&cache_key)) {
            debug!("Cache hit for query '{}'", safe_truncate(raw_query, 80));
            return Ok(cached);
        }

        let (classification, plan) = self.plan_with(catalog, raw_query);

        let start = Instant::now();
        let execution = self.executor.execute(plan).await?;
        let took_ms = start.elapsed().as_secs_f64() * 1000.0;

        info!(
            "Search '{}': kind={}, hits={}, fallback={}, took={:.1}ms",
            safe_truncate(raw_query, 80),
            classification.kind.as_str(),
            execution.hits.len(),
            execution.used_fallback,
            took_ms
        );

        let response = SearchResponse {
            query: raw_query.to_string(),
            classification,
            results: execution.hits,
            took_ms,
            used_fallback: execution.used_fallback,
            plans: execution.plans,
        };

        if let Some(cache) = &self.cache {
            cache.set(&cache_key, response.clone());
        }
        Ok(response)
    }

    pub fn cache_stats(&self) -> Option<CacheStats> {
        self.cache.as_ref().map(ResponseCache::stats)
    }

    pub fn fallback_count(&self) -> usize {
        self.executor.fallback_count()
    }
}
