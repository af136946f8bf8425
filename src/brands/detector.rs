use std::sync::Arc;

use serde::{Deserialize, Serialize};
use strum::IntoStaticStr;
use tracing::debug;

use super::models::BrandCatalog;
use super::vocabulary::{brand_alias, is_generic_token, is_stopword};
use crate::text::{normalize_token, tokenize, transliterate, Direction};

const FUZZY_MIN_LEN: usize = 4;
const FUZZY_MAX_LEN_DIFF: usize = 2;


#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FuzzyPolicy {
    pub max_distance: usize,
    pub min_similarity: f64,
    pub min_len: usize,
    pub max_len_diff: usize,
}

impl FuzzyPolicy {
    pub fn from_config(config: &crate::core::SearchConfig) -> Self {
        Self {
            max_distance: config.fuzzy_max_distance,
            min_similarity: config.fuzzy_min_similarity,
            ..Self::default()
        }
    }

    fn radius(&self, token_len: usize) -> usize {
        self.max_distance.min((token_len / 3).max(1))
    }
}

impl Default for FuzzyPolicy {
    fn default() -> Self {
        Self {
            max_distance: 2,
            min_similarity: 0.6,
            min_len: FUZZY_MIN_LEN,
            max_len_diff: FUZZY_MAX_LEN_DIFF,
        }
    }
}


#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum MatchKind {
    Alias,
    Exact,
    CrossScript,
    Fuzzy,
}


#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Detection {

    pub brand_ids: Vec<String>,

    pub generic_tokens_normalized: Vec<String>,

    pub generic_tokens_raw: Vec<String>,

    pub brand_tokens_raw: Vec<String>,
}

impl Detection {
    pub fn has_brands(&self) -> bool {
        !self.brand_ids.is_empty()
    }

    pub fn has_generic(&self) -> bool {
        !self.generic_tokens_normalized.is_empty()
    }

    fn push_brand(&mut self, id: &str, raw: &str) {
        if !self.brand_ids.iter().any(|b| b == id) {
            self.brand_ids.push(id.to_string());
        }
        self.brand_tokens_raw.push(raw.to_string());
    }

    fn push_generic(&mut self, normalized: String, raw: &str) {
        self.generic_tokens_normalized.push(normalized);
        self.generic_tokens_raw.push(raw.to_string());
    }
}


/// Resolves brand mentions in free text against one catalog snapshot.
pub struct BrandDetector {
    catalog: Arc<BrandCatalog>,
    fuzzy: FuzzyPolicy,
}

impl BrandDetector {
    pub fn new(catalog: Arc<BrandCatalog>) -> Self {
        Self::with_policy(catalog, FuzzyPolicy::default())
    }

    pub fn with_policy(catalog: Arc<BrandCatalog>, fuzzy: FuzzyPolicy) -> Self {
        Self { catalog, fuzzy }
    }

    pub fn catalog(&self) -> &BrandCatalog {
        &self.catalog
    }


    pub fn detect(&self, text: &str) -> Detection {
        let mut detection = Detection::default();

        for raw in tokenize(text) {
            let Some(normalized) = normalize_token(raw) else {
                continue;
            };
            if normalized.chars().count() < 2 || is_stopword(&normalized) {
                continue;
            }

            if is_generic_token(&normalized) {
                detection.push_generic(normalized, raw);
                continue;
            }

            match self.resolve_token(&normalized) {
                Some((id, kind)) => {
                    debug!(
                        "Token '{}' -> brand '{}' ({})",
                        raw,
                        id,
                        <&'static str>::from(kind)
                    );
                    detection.push_brand(id, raw);
                }
                None => detection.push_generic(normalized, raw),
            }
        }

        detection
    }

    pub fn extract_brand_ids(&self, text: &str) -> Vec<String> {
        self.detect(text).brand_ids
    }


    pub fn resolve_token(&self, normalized: &str) -> Option<(&str, MatchKind)> {
        if self.catalog.is_empty() || normalized.is_empty() {
            return None;
        }

        if let Some(id) = brand_alias(normalized).and_then(|target| self.catalog_id(target)) {
            return Some((id, MatchKind::Alias));
        }

        if let Some(id) = self.catalog.lookup(normalized) {
            return Some((id, MatchKind::Exact));
        }

        for direction in [Direction::ToLatin, Direction::ToCyrillic] {
            let Some(rendered) = normalize_token(&transliterate(normalized, direction)) else {
                continue;
            };
            if rendered == normalized {
                continue;
            }
            if let Some(id) = self.catalog.lookup(&rendered) {
                return Some((id, MatchKind::CrossScript));
            }
        }

        self.fuzzy_match(normalized).map(|id| (id, MatchKind::Fuzzy))
    }

    fn catalog_id(&self, target: &str) -> Option<&str> {
        match self.catalog.get(target) {
            Some(brand) => Some(brand.id.as_str()),
            None => self.catalog.lookup(target),
        }
    }

    // Ties between different brands at the best distance yield no match.
    fn fuzzy_match(&self, token: &str) -> Option<&str> {
        let token_len = token.chars().count();
        if token_len < self.fuzzy.min_len {
            return None;
        }
        let first = token.chars().next()?;
        let radius = self.fuzzy.radius(token_len);

        let mut best: Option<(usize, &str)> = None;
        let mut tied = false;

        for (candidate, id) in self.catalog.tokens() {
            let candidate_len = candidate.chars().count();
            if candidate_len < self.fuzzy.min_len
                || candidate.chars().next() != Some(first)
                || candidate_len.abs_diff(token_len) > self.fuzzy.max_len_diff
            {
                continue;
            }

            let distance = strsim::osa_distance(token, candidate);
            if distance == 0 || distance > radius {
                continue;
            }
            let similarity = 1.0 - distance as f64 / token_len.max(candidate_len) as f64;
            if similarity < self.fuzzy.min_similarity {
                continue;
            }

            match best {
                Some((best_distance, _)) if distance > best_distance => {}
                Some((best_distance, best_id)) if distance == best_distance => {
                    if best_id != id {
                        tied = true;
                    }
                }
                _ => {
                    best = Some((distance, id));
                    tied = false;
                }
            }
        }

        match best {
            Some((_, id)) if !tied => Some(id),
            Some(_) => {
                debug!("Fuzzy match for '{}' is ambiguous, ignoring", token);
                None
            }
            None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brands::builder::build;
    use crate::brands::models::TrustPolicy;

    fn sample_catalog() -> Arc<BrandCatalog> {
        Arc::new(
            BrandCatalog::builder()
                .brand("toyota", ["TOYOTA"])
                .brand("lexus", ["LEXUS"])
                .brand("caterpillar", ["CATERPILLAR"])
                .brand("lukoil", ["ЛУКОЙЛ", "LUKOIL"])
                .brand("kamaz", ["КАМАЗ", "KAMAZ", "комз"])
                .brand("bmw", ["BMW"])
                .finish(),
        )
    }

    #[test]
    fn test_multi_brand_line_detects_both_in_order() {
        let catalog = Arc::new(build(&["TOYOTA-LEXUS"], &TrustPolicy::default()));
        let detector = BrandDetector::new(catalog);

        let detection = detector.detect("TOYOTA-LEXUS");
        assert_eq!(detection.brand_ids, vec!["toyota", "lexus"]);
        assert!(detection.generic_tokens_normalized.is_empty());
        assert_eq!(detection.brand_tokens_raw, vec!["TOYOTA", "LEXUS"]);
    }

    #[test]
    fn test_typo_variants_resolve_to_canonical_id() {
        let detector = BrandDetector::new(sample_catalog());
        for (typo, expected) in [
            ("тоёта", "toyota"),
            ("Тойота", "toyota"),
            ("leksus", "lexus"),
            ("кэт", "caterpillar"),
            ("caterpilar", "caterpillar"),
            ("лукойл", "lukoil"),
        ] {
            assert_eq!(detector.extract_brand_ids(typo), vec![expected.to_string()], "{typo}");
        }
    }

    #[test]
    fn test_cross_script_and_alias() {
        let detector = BrandDetector::new(sample_catalog());
        assert_eq!(detector.extract_brand_ids("тойота камаз"), vec!["toyota", "kamaz"]);
        assert_eq!(detector.extract_brand_ids("БМВ"), vec!["bmw"]);

        let (_, kind) = detector.resolve_token("лукоил").unwrap();
        assert_eq!(kind, MatchKind::CrossScript);
    }

    #[test]
    fn test_alias_requires_brand_in_catalog() {
        let detector = BrandDetector::new(sample_catalog());
        let detection = detector.detect("мерс");
        assert!(detection.brand_ids.is_empty());
        assert_eq!(detection.generic_tokens_raw, vec!["мерс"]);
    }

    #[test]
    fn test_fuzzy_single_typo() {
        let detector = BrandDetector::new(sample_catalog());
        let (id, kind) = detector.resolve_token("kamas").unwrap();
        assert_eq!(id, "kamaz");
        assert_eq!(kind, MatchKind::Fuzzy);

        assert!(detector.resolve_token("kam").is_none());
        assert!(detector.resolve_token("xamaz").is_none());
    }

    #[test]
    fn test_fuzzy_tie_is_no_match() {
        let catalog = Arc::new(
            BrandCatalog::builder()
                .brand("scania", ["scania"])
                .brand("scanix", ["scanix"])
                .finish(),
        );
        let detector = BrandDetector::new(catalog);
        assert!(detector.resolve_token("scanio").is_none());
        assert_eq!(detector.resolve_token("scaniaa").map(|(id, _)| id), Some("scania"));
    }

    #[test]
    fn test_generic_tokens_keep_positions() {
        let detector = BrandDetector::new(sample_catalog());
        let detection = detector.detect("Масло ЛУКОЙЛ 5w-40");
        assert_eq!(detection.brand_ids, vec!["lukoil"]);
        assert_eq!(detection.generic_tokens_raw, vec!["Масло", "5w", "40"]);
        assert_eq!(detection.generic_tokens_normalized, vec!["масло", "5w", "40"]);
    }

    #[test]
    fn test_stopwords_and_single_chars_are_not_generic() {
        let detector = BrandDetector::new(sample_catalog());
        for query in ["для камаз", "toyota for", "масло и лукойл"] {
            let detection = detector.detect(query);
            assert!(detection.has_brands(), "{query}");
            assert!(!detection.generic_tokens_normalized.iter().any(|t| is_stopword(t)), "{query}");
        }
        assert!(!detector.detect("для камаз").has_generic());
        assert!(!detector.detect("bmw x 5").generic_tokens_raw.iter().any(|t| t.chars().count() < 2));
    }

    #[test]
    fn test_detection_is_deterministic() {
        let detector = BrandDetector::new(sample_catalog());
        let query = "фильтр камаз тоёта kamas scania bosch";
        assert_eq!(detector.detect(query), detector.detect(query));
    }

    #[test]
    fn test_empty_catalog_detects_nothing() {
        let detector = BrandDetector::new(Arc::new(BrandCatalog::empty()));
        let detection = detector.detect("тоёта кэт");
        assert!(!detection.has_brands());
        assert_eq!(detection.generic_tokens_normalized, vec!["toyota", "caterpillar"]);
    }

    #[test]
    fn test_kamaz_alias_catalog_built_from_lines() {
        let catalog = Arc::new(build(&["КАМАЗ", "KAMAZ", "КОМЗ"], &TrustPolicy::default()));
        let detector = BrandDetector::new(catalog);
        let detection = detector.detect("комз");
        assert!(detection.has_brands());
        assert!(!detection.has_generic());
    }
}
