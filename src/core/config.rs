use serde::{Deserialize, Serialize};

use super::error::{Result, SearchError};


#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {

    pub index_url: String,
    pub index_name: String,
    pub request_timeout_secs: u64,
    pub page_size: usize,


    pub catalog_path: String,
    pub catalog_source_url: Option<String>,


    pub cache_enabled: bool,
    pub cache_capacity: usize,
    pub cache_ttl_secs: u64,


    pub brand_only_min_hits: usize,
    pub brand_with_generic_min_hits: usize,


    pub article_min_digit_ratio: f64,
    pub fuzzy_max_distance: usize,
    pub fuzzy_min_similarity: f64,
    pub trust_min_solo: u32,
    pub trust_min_uppercase_ratio: f64,
    pub phonetic_enabled: bool,

    pub log_level: String,
}

impl SearchConfig {

    pub fn new(index_url: &str, index_name: &str) -> Self {
        Self {
            index_url: index_url.trim_end_matches('/').to_string(),
            index_name: index_name.to_string(),
            request_timeout_secs: 10,
            page_size: 50,

            catalog_path: crate::DEFAULT_CATALOG_PATH.to_string(),
            catalog_source_url: None,

            cache_enabled: true,
            cache_capacity: crate::DEFAULT_CACHE_SIZE,
            cache_ttl_secs: crate::DEFAULT_CACHE_TTL,

            brand_only_min_hits: 1,
            brand_with_generic_min_hits: 3,

            article_min_digit_ratio: 0.3,
            fuzzy_max_distance: 2,
            fuzzy_min_similarity: 0.6,
            trust_min_solo: 0,
            trust_min_uppercase_ratio: 0.5,
            phonetic_enabled: true,

            log_level: "info".to_string(),
        }
    }


    pub fn search_url(&self) -> String {
        format!("{}/{}/_search", self.index_url, self.index_name)
    }


    pub fn from_env() -> Self {
        let mut config = Self::new(
            &std::env::var("BRANDSEARCH_INDEX_URL")
                .unwrap_or_else(|_| crate::DEFAULT_INDEX_URL.to_string()),
            &std::env::var("BRANDSEARCH_INDEX_NAME")
                .unwrap_or_else(|_| crate::DEFAULT_INDEX_NAME.to_string()),
        );

        if let Ok(path) = std::env::var("BRANDSEARCH_CATALOG_PATH") {
            config.catalog_path = path;
        }
        if let Ok(url) = std::env::var("BRANDSEARCH_CATALOG_SOURCE_URL") {
            if !url.trim().is_empty() {
                config.catalog_source_url = Some(url);
            }
        }
        if let Some(size) = env_parse("BRANDSEARCH_PAGE_SIZE") {
            config.page_size = size;
        }
        if let Some(timeout) = env_parse("BRANDSEARCH_REQUEST_TIMEOUT_SECS") {
            config.request_timeout_secs = timeout;
        }
        if let Some(enabled) = env_parse("BRANDSEARCH_CACHE_ENABLED") {
            config.cache_enabled = enabled;
        }
        if let Some(ttl) = env_parse("BRANDSEARCH_CACHE_TTL_SECS") {
            config.cache_ttl_secs = ttl;
        }
        if let Some(hits) = env_parse("BRANDSEARCH_BRAND_WITH_GENERIC_MIN_HITS") {
            config.brand_with_generic_min_hits = hits;
        }
        if let Ok(level) = std::env::var("BRANDSEARCH_LOG_LEVEL") {
            config.log_level = level;
        }

        config
    }


    pub fn load(path: Option<&str>) -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }
        let config: Self = builder
            .add_source(config::Environment::with_prefix("BRANDSEARCH"))
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(SearchError::Config("page_size must be positive".into()));
        }
        if self.cache_enabled && self.cache_capacity == 0 {
            return Err(SearchError::Config("cache_capacity must be positive".into()));
        }
        for (name, value) in [
            ("article_min_digit_ratio", self.article_min_digit_ratio),
            ("fuzzy_min_similarity", self.fuzzy_min_similarity),
            ("trust_min_uppercase_ratio", self.trust_min_uppercase_ratio),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(SearchError::Config(format!("{name} must be within [0, 1]")));
            }
        }
        Ok(())
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self::new(crate::DEFAULT_INDEX_URL, crate::DEFAULT_INDEX_NAME)
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.trim().parse().ok())
}
