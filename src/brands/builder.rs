use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, info};

use super::models::{Brand, BrandCatalog, TokenStats, TrustPolicy};
use super::vocabulary::{is_generic_token, is_noise_line, looks_like_article_code};
use crate::text::{
    detect_script, latin_key, normalize, normalize_token, spelling_key, tokenize, transliterate, Direction, Script,
};

const MIN_TOKEN_CHARS: usize = 3;
const SEGMENT_SEPARATORS: &[char] = &[',', '/', '|', '(', ')'];


#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelCandidate {

    pub text: String,

    pub tokens: Vec<String>,
    /// Raw spelling of each token, same order as `tokens`.
    pub spellings: Vec<String>,

    pub hyphenated: bool,
}


#[derive(Debug, Clone, Default)]
pub struct CandidateSet {
    pub candidates: Vec<LabelCandidate>,
    pub stats: BTreeMap<String, TokenStats>,
    pub skipped_lines: usize,
}


pub fn collect_candidates<S: AsRef<str>>(lines: &[S]) -> CandidateSet {
    let mut set = CandidateSet::default();

    for line in lines {
        let line = line.as_ref().trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if is_noise_line(line) {
            set.skipped_lines += 1;
            continue;
        }

        for (segment, hyphenated) in split_segments(line) {
            let Some(candidate) = candidate_from_segment(&segment, hyphenated, &mut set.stats) else {
                continue;
            };
            set.candidates.push(candidate);
        }
    }

    set
}

fn candidate_from_segment(
    segment: &str,
    hyphenated: bool,
    stats: &mut BTreeMap<String, TokenStats>,
) -> Option<LabelCandidate> {
    let mut tokens: Vec<(String, &str)> = Vec::new();
    for raw in tokenize(segment) {
        if looks_like_article_code(raw) {
            continue;
        }
        let Some(normalized) = normalize_token(raw) else {
            continue;
        };
        if normalized.chars().count() < MIN_TOKEN_CHARS || is_generic_token(&normalized) {
            continue;
        }
        if !tokens.iter().any(|(t, _)| *t == normalized) {
            tokens.push((normalized, raw));
        }
    }
    if tokens.is_empty() {
        return None;
    }

    let solo = tokens.len() == 1;
    for (token, raw) in &tokens {
        let stat = stats.entry(token.clone()).or_default();
        stat.occurrences += 1;
        if solo {
            stat.solo_occurrences += 1;
        }
        if is_all_caps(raw) {
            stat.uppercase_occurrences += 1;
        }
        if hyphenated {
            stat.hyphen_occurrences += 1;
        }
        match detect_script(raw) {
            Script::Cyrillic => stat.cyrillic = true,
            Script::Latin => stat.latin = true,
            Script::Mixed => {
                stat.cyrillic = true;
                stat.latin = true;
            }
            Script::None => {}
        }
    }

    let (tokens, spellings) = tokens.into_iter().map(|(t, raw)| (t, raw.to_string())).unzip();
    Some(LabelCandidate {
        text: segment.trim().to_string(),
        tokens,
        spellings,
        hyphenated,
    })
}


pub fn select_trusted(stats: &BTreeMap<String, TokenStats>, policy: &TrustPolicy) -> BTreeSet<String> {
    stats
        .iter()
        .filter(|(token, _)| !is_generic_token(token))
        .filter(|(_, stat)| policy.is_trusted(stat))
        .map(|(token, _)| token.clone())
        .collect()
}


pub fn build<S: AsRef<str>>(lines: &[S], policy: &TrustPolicy) -> BrandCatalog {
    let set = collect_candidates(lines);
    let trusted = select_trusted(&set.stats, policy);

    let mut assembler = CatalogAssembler::new();
    for candidate in &set.candidates {
        let kept: Vec<(&str, &str)> = candidate
            .tokens
            .iter()
            .zip(&candidate.spellings)
            .filter(|(token, _)| trusted.contains(*token))
            .map(|(token, spelling)| (token.as_str(), spelling.as_str()))
            .collect();
        let tokens: Vec<&str> = kept.iter().map(|(token, _)| *token).collect();

        // A bound token pulls the segment into its brand; otherwise the id
        // comes from the spelling as written.
        let id = tokens
            .iter()
            .find_map(|token| assembler.binding(token))
            .map(str::to_string)
            .or_else(|| kept.iter().filter_map(|(_, spelling)| spelling_key(spelling)).min());
        assembler.register(&candidate.text, &tokens, id.as_deref());
    }
    let catalog = assembler.finish();

    info!(
        "Brand catalog built: {} brands, {} tokens, {} candidates, {} trusted, {} noise lines skipped",
        catalog.len(),
        catalog.token_count(),
        set.candidates.len(),
        trusted.len(),
        set.skipped_lines
    );
    catalog
}


fn split_segments(line: &str) -> Vec<(String, bool)> {
    let mut segments = Vec::new();
    for part in line.split(SEGMENT_SEPARATORS) {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        if should_split_hyphen(part) {
            segments.extend(
                part.split('-')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(|s| (s.to_string(), true)),
            );
        } else {
            segments.push((part.to_string(), false));
        }
    }
    segments
}

fn should_split_hyphen(value: &str) -> bool {
    if !value.contains('-') {
        return false;
    }
    let parts: Vec<&str> = value.split('-').map(str::trim).filter(|p| !p.is_empty()).collect();
    if parts.len() < 2 {
        return false;
    }
    let every_part_has_word = parts
        .iter()
        .all(|p| tokenize(p).any(|t| t.chars().any(char::is_alphabetic)));
    if !every_part_has_word {
        return false;
    }
    if is_all_caps(value) {
        return true;
    }
    parts.iter().all(|p| {
        let normalized = normalize(p);
        normalized.chars().count() >= MIN_TOKEN_CHARS && normalized.chars().all(char::is_alphabetic)
    })
}

fn is_all_caps(text: &str) -> bool {
    let mut letters = text.chars().filter(|c| c.is_alphabetic()).peekable();
    letters.peek().is_some() && letters.all(char::is_uppercase)
}


fn script_variants(token: &str) -> Vec<String> {
    let mut variants = vec![token.to_string()];
    for direction in [Direction::ToLatin, Direction::ToCyrillic] {
        let rendered = normalize(&transliterate(token, direction));
        if rendered.chars().count() >= MIN_TOKEN_CHARS
            && !rendered.contains(' ')
            && !variants.contains(&rendered)
        {
            variants.push(rendered);
        }
    }
    variants
}


/// Accumulates brands under the first-binding-wins rule.
#[derive(Debug, Default)]
pub struct CatalogAssembler {
    brands: BTreeMap<String, Brand>,
    token_index: BTreeMap<String, String>,
}

impl CatalogAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn brand<I, S>(mut self, id: &str, spellings: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let id = id.trim().to_lowercase();
        for spelling in spellings {
            let spelling = spelling.as_ref();
            let tokens: Vec<String> = tokenize(spelling).filter_map(normalize_token).collect();
            let refs: Vec<&str> = tokens.iter().map(String::as_str).collect();
            self.register(spelling, &refs, Some(id.as_str()));
        }
        self
    }


    pub fn binding(&self, token: &str) -> Option<&str> {
        self.token_index.get(token).map(String::as_str)
    }

    pub fn register(&mut self, label: &str, tokens: &[&str], explicit_id: Option<&str>) -> Option<String> {
        if tokens.is_empty() {
            return None;
        }

        let id = match explicit_id {
            Some(id) => id.to_string(),
            None => match tokens.iter().find_map(|t| self.token_index.get(*t)) {
                Some(existing) => existing.clone(),
                None => tokens.iter().map(|t| latin_key(t)).min()?,
            },
        };

        let brand = self.brands.entry(id.clone()).or_insert_with(|| Brand::new(id.clone()));
        brand.add_label(label);

        for token in tokens {
            for variant in script_variants(token) {
                match self.token_index.get(&variant) {
                    Some(owner) if *owner != id => {
                        debug!("Token '{}' stays with '{}', not rebound to '{}'", variant, owner, id);
                    }
                    Some(_) => {
                        brand.tokens.insert(variant);
                    }
                    None => {
                        self.token_index.insert(variant.clone(), id.clone());
                        brand.tokens.insert(variant);
                    }
                }
            }
        }

        Some(id)
    }

    pub fn finish(self) -> BrandCatalog {
        BrandCatalog {
            brands: self.brands,
            token_index: self.token_index,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_lines() -> Vec<&'static str> {
        vec![
            "# manufacturers",
            "",
            "TOYOTA-LEXUS",
            "TOYOTA",
            "LEXUS",
            "КАМАЗ",
            "ЛУКОЙЛ",
            "Caterpillar",
            "CATERPILLAR (USA)",
            "МАСЛО",
            "МАСЛО МОТОРНОЕ",
            "FILTER",
            "1R0750 фильтр топливный CAT",
            "Bosch Rexroth",
        ]
    }

    #[test]
    fn test_split_segments_on_separators() {
        let segments = split_segments("TOYOTA-LEXUS/Hino");
        let texts: Vec<&str> = segments.iter().map(|(s, _)| s.as_str()).collect();
        assert_eq!(texts, vec!["TOYOTA", "LEXUS", "Hino"]);
        assert!(segments[0].1);
        assert!(!segments[2].1);
    }

    #[test]
    fn test_mixed_case_hyphen_kept_when_part_is_short() {
        let segments = split_segments("Mo-Bil");
        assert_eq!(segments.len(), 1);
    }

    #[test]
    fn test_collect_skips_noise_and_comments() {
        let set = collect_candidates(&sample_lines());
        assert_eq!(set.skipped_lines, 3);
        assert!(set.stats.contains_key("toyota"));
        assert!(!set.stats.contains_key("масло"));
        let toyota = &set.stats["toyota"];
        assert_eq!(toyota.solo_occurrences, 2);
        assert_eq!(toyota.hyphen_occurrences, 1);
        assert!(toyota.latin);
        assert!(!toyota.cyrillic);
    }

    #[test]
    fn test_select_trusted_drops_descriptive_tokens() {
        let mut stats = BTreeMap::new();
        stats.insert(
            "масло".to_string(),
            TokenStats { occurrences: 50, solo_occurrences: 20, uppercase_occurrences: 50, ..Default::default() },
        );
        stats.insert(
            "kamaz".to_string(),
            TokenStats { occurrences: 1, solo_occurrences: 1, ..Default::default() },
        );
        stats.insert(
            "hydraulic".to_string(),
            TokenStats { occurrences: 9, ..Default::default() },
        );
        let trusted = select_trusted(&stats, &TrustPolicy::default());
        assert_eq!(trusted.into_iter().collect::<Vec<_>>(), vec!["kamaz".to_string()]);
    }

    #[test]
    fn test_build_catalog() {
        let catalog = build(&sample_lines(), &TrustPolicy::default());

        assert!(catalog.contains("toyota"));
        assert!(catalog.contains("lexus"));
        assert!(catalog.contains("kamaz"));
        assert!(catalog.contains("lukoil"));
        assert!(catalog.contains("caterpillar"));
        assert!(!catalog.brand_ids().iter().any(|id| id.contains("maslo")));
        assert!(catalog.lookup("масло").is_none());
        assert!(catalog.lookup("filter").is_none());

        assert_eq!(catalog.lookup("камаз"), Some("kamaz"));
        assert_eq!(catalog.lookup("kamaz"), Some("kamaz"));

        let caterpillar = catalog.get("caterpillar").unwrap();
        assert!(caterpillar.labels.contains(&"Caterpillar".to_string()));
        assert!(caterpillar.labels.contains(&"CATERPILLAR".to_string()));
    }

    #[test]
    fn test_token_index_invariant() {
        let catalog = build(&sample_lines(), &TrustPolicy::default());
        for (token, id) in catalog.tokens() {
            let brand = catalog.get(id).unwrap();
            assert!(brand.tokens.contains(token), "{token} missing from {id}");
        }
    }

    #[test]
    fn test_first_binding_wins() {
        let mut assembler = CatalogAssembler::new();
        assembler.register("KAMAZ", &["kamaz"], None);
        let id = assembler.register("KAMAZ MASTER", &["kamaz", "master"], None);
        assert_eq!(id.as_deref(), Some("kamaz"));

        let hijack = assembler.register("Noise", &["kamaz"], Some("noise"));
        assert_eq!(hijack.as_deref(), Some("noise"));

        let catalog = assembler.finish();
        assert_eq!(catalog.lookup("kamaz"), Some("kamaz"));
        assert!(!catalog.get("noise").unwrap().tokens.contains("kamaz"));
    }

    #[test]
    fn test_brand_id_follows_written_spelling() {
        let catalog = build(&["Bosch", "BOSCH", "Shell", "ЖИГУЛИ"], &TrustPolicy::default());
        assert!(catalog.contains("bosch"));
        assert!(!catalog.contains("bosh"));
        assert!(catalog.contains("shell"));
        assert!(catalog.contains("zhiguli"));
        assert_eq!(catalog.lookup(&normalize("bosch")), Some("bosch"));
        assert_eq!(catalog.lookup(&normalize("бош")), Some("bosch"));
    }

    #[test]
    fn test_collect_keeps_raw_spellings() {
        let set = collect_candidates(&["Bosch Rexroth"]);
        assert_eq!(set.candidates[0].spellings, vec!["Bosch", "Rexroth"]);
        assert_eq!(set.candidates[0].tokens.len(), set.candidates[0].spellings.len());
    }

    #[test]
    fn test_zero_trusted_tokens_is_empty_catalog() {
        let catalog = build(&["масло моторное", "фильтр воздушный", "# comment"], &TrustPolicy::default());
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_explicit_builder_registers_all_spellings() {
        let catalog = BrandCatalog::builder()
            .brand("kamaz", ["КАМАЗ", "KAMAZ", "комз"])
            .finish();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.lookup("комз"), Some("kamaz"));
        assert_eq!(catalog.lookup("kamaz"), Some("kamaz"));
        assert_eq!(catalog.get("kamaz").unwrap().labels.len(), 3);
    }
}
