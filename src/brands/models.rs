use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::builder::CatalogAssembler;


#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Brand {

    pub id: String,

    pub labels: Vec<String>,

    pub tokens: BTreeSet<String>,
}

impl Brand {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            labels: Vec::new(),
            tokens: BTreeSet::new(),
        }
    }

    pub(crate) fn add_label(&mut self, label: &str) {
        let label = label.trim();
        if !label.is_empty() && !self.labels.iter().any(|l| l == label) {
            self.labels.push(label.to_string());
        }
    }
}

/// Immutable brand registry: canonical id -> brand, normalized token -> id.
///
/// Both maps are ordered so that every traversal, including fuzzy matching,
/// is independent of hashing.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BrandCatalog {
    pub(crate) brands: BTreeMap<String, Brand>,
    pub(crate) token_index: BTreeMap<String, String>,
}

impl BrandCatalog {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn builder() -> CatalogAssembler {
        CatalogAssembler::new()
    }

    pub fn get(&self, id: &str) -> Option<&Brand> {
        self.brands.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.brands.contains_key(id)
    }

    pub fn lookup(&self, normalized_token: &str) -> Option<&str> {
        self.token_index.get(normalized_token).map(String::as_str)
    }

    pub fn brand_ids(&self) -> Vec<String> {
        self.brands.keys().cloned().collect()
    }

    pub fn brands(&self) -> impl Iterator<Item = &Brand> {
        self.brands.values()
    }

    pub fn tokens(&self) -> impl Iterator<Item = (&str, &str)> {
        self.token_index.iter().map(|(t, id)| (t.as_str(), id.as_str()))
    }

    pub fn len(&self) -> usize {
        self.brands.len()
    }

    pub fn token_count(&self) -> usize {
        self.token_index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.brands.is_empty()
    }
}


#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenStats {
    pub occurrences: u32,
    pub solo_occurrences: u32,
    pub uppercase_occurrences: u32,
    pub hyphen_occurrences: u32,
    pub cyrillic: bool,
    pub latin: bool,
}

impl TokenStats {
    pub fn uppercase_ratio(&self) -> f64 {
        if self.occurrences == 0 {
            0.0
        } else {
            f64::from(self.uppercase_occurrences) / f64::from(self.occurrences)
        }
    }
}


#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrustPolicy {
    pub min_solo: u32,
    pub min_uppercase_ratio: f64,
}

impl TrustPolicy {
    pub fn from_config(config: &crate::core::SearchConfig) -> Self {
        Self {
            min_solo: config.trust_min_solo,
            min_uppercase_ratio: config.trust_min_uppercase_ratio,
        }
    }

    /// Proper-name behaviour: seen alone often enough, or mostly in capitals.
    /// Vocabulary exclusion happens before this is consulted.
    #[must_use]
    pub fn is_trusted(&self, stats: &TokenStats) -> bool {
        stats.solo_occurrences > self.min_solo
            || stats.uppercase_ratio() > self.min_uppercase_ratio
    }
}

impl Default for TrustPolicy {
    fn default() -> Self {
        Self {
            min_solo: 0,
            min_uppercase_ratio: 0.5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(occurrences: u32, solo: u32, upper: u32) -> TokenStats {
        TokenStats {
            occurrences,
            solo_occurrences: solo,
            uppercase_occurrences: upper,
            ..Default::default()
        }
    }

    #[test]
    fn test_solo_token_is_trusted() {
        assert!(TrustPolicy::default().is_trusted(&stats(3, 1, 0)));
    }

    #[test]
    fn test_capitalized_token_is_trusted() {
        assert!(TrustPolicy::default().is_trusted(&stats(4, 0, 3)));
        assert!(!TrustPolicy::default().is_trusted(&stats(4, 0, 2)));
    }

    #[test]
    fn test_descriptive_token_is_not_trusted() {
        assert!(!TrustPolicy::default().is_trusted(&stats(40, 0, 0)));
        assert!(!TrustPolicy::default().is_trusted(&TokenStats::default()));
    }

    #[test]
    fn test_stricter_policy() {
        let policy = TrustPolicy { min_solo: 2, min_uppercase_ratio: 0.9 };
        assert!(!policy.is_trusted(&stats(5, 2, 4)));
        assert!(policy.is_trusted(&stats(5, 3, 0)));
    }

    #[test]
    fn test_empty_catalog() {
        let catalog = BrandCatalog::empty();
        assert!(catalog.is_empty());
        assert_eq!(catalog.token_count(), 0);
        assert!(catalog.lookup("toyota").is_none());
    }
}
