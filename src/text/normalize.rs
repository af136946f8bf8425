//! Token canonicalization shared by catalog building and query detection.
//!
//! `normalize` is pure and idempotent. Every token goes through the same
//! pipeline: lowercase, `ё/й` folding, Latin digraph folding into the
//! Cyrillic phoneme class, collapse of letter runs longer than two, and a
//! fixed override table for frequent misspellings.

use std::collections::HashMap;

use lazy_static::lazy_static;

use super::translit::{transliterate, Direction};

const DIGRAPHS: &[(&str, &str)] = &[("sch", "ш"), ("sh", "ш"), ("zh", "ж"), ("ch", "ч")];

// Misspelling -> canonical spelling. Targets are single tokens.
const TYPO_OVERRIDES: &[(&str, &str)] = &[
    ("тойота", "toyota"),
    ("тайота", "toyota"),
    ("тоёта", "toyota"),
    ("таёта", "toyota"),
    ("тойёта", "toyota"),
    ("тойета", "toyota"),
    ("тойтоа", "toyota"),
    ("таиота", "toyota"),
    ("таета", "toyota"),
    ("toiota", "toyota"),
    ("toeta", "toyota"),
    ("tayota", "toyota"),
    ("toyeta", "toyota"),
    ("toyata", "toyota"),
    ("toitoa", "toyota"),
    ("taiota", "toyota"),
    ("лексус", "lexus"),
    ("лэксус", "lexus"),
    ("лехсус", "lexus"),
    ("лехус", "lexus"),
    ("lexsus", "lexus"),
    ("leksus", "lexus"),
    ("lecsus", "lexus"),
    ("leksis", "lexus"),
    ("лукойл", "lukoil"),
    ("лукоел", "lukoil"),
    ("lukoyl", "lukoil"),
    ("кэт", "caterpillar"),
    ("кат", "caterpillar"),
    ("caterpilar", "caterpillar"),
    ("katerpillar", "caterpillar"),
    ("котерепилор", "caterpillar"),
    ("котерпилор", "caterpillar"),
    ("котерпиллар", "caterpillar"),
    ("котерьпилор", "caterpillar"),
    ("катерпилер", "caterpillar"),
    ("катерпиллар", "caterpillar"),
    ("hundai", "hyundai"),
    ("хендай", "hyundai"),
    ("хундай", "hyundai"),
    ("comatsu", "komatsu"),
    ("pegeot", "peugeot"),
];

lazy_static! {
    // Keys are stored in processed form so either spelling hits.
    static ref OVERRIDES: HashMap<String, String> = {
        let mut m = HashMap::new();
        for (typo, canonical) in TYPO_OVERRIDES {
            let target = process_token(canonical);
            m.insert((*typo).to_string(), target.clone());
            m.insert(process_token(typo), target);
        }
        m
    };
}


pub fn tokenize(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
}


#[must_use]
pub fn normalize(text: &str) -> String {
    let tokens: Vec<String> = tokenize(text).filter_map(normalize_token).collect();
    tokens.join(" ")
}


#[must_use]
pub fn normalize_token(raw: &str) -> Option<String> {
    let lowered = raw.to_lowercase();
    if let Some(target) = OVERRIDES.get(&lowered) {
        return Some(target.clone());
    }

    let processed = process_token(&lowered);
    if processed.is_empty() {
        return None;
    }
    match OVERRIDES.get(&processed) {
        Some(target) => Some(target.clone()),
        None => Some(processed),
    }
}

fn process_token(token: &str) -> String {
    let folded: String = token
        .to_lowercase()
        .chars()
        .filter_map(|c| match c {
            'ё' => Some('е'),
            'й' => Some('и'),
            c if c.is_alphanumeric() => Some(c),
            _ => None,
        })
        .collect();

    let mut harmonized = folded;
    for (digraph, phoneme) in DIGRAPHS {
        if harmonized.contains(digraph) {
            harmonized = harmonized.replace(digraph, phoneme);
        }
    }

    collapse_repeats(&harmonized)
}

fn collapse_repeats(token: &str) -> String {
    let mut out = String::with_capacity(token.len());
    let mut prev: Option<char> = None;
    let mut run = 0usize;
    for c in token.chars() {
        if Some(c) == prev {
            run += 1;
        } else {
            prev = Some(c);
            run = 1;
        }
        if run <= 2 || !c.is_alphabetic() {
            out.push(c);
        }
    }
    out
}


#[must_use]
pub fn latin_key(normalized_token: &str) -> String {
    transliterate(normalized_token, Direction::ToLatin)
}


/// Latin brand id for one raw spelling. Follows the override table when it
/// applies, otherwise transliterates the spelling as written (`Bosch` stays
/// `bosch`, `БОШ` becomes `bosh`).
#[must_use]
pub fn spelling_key(raw: &str) -> Option<String> {
    let normalized = normalize_token(raw)?;
    let lowered: String = raw
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric())
        .collect();
    if process_token(&lowered) != normalized {
        return Some(latin_key(&normalized));
    }
    Some(collapse_repeats(&transliterate(&lowered, Direction::ToLatin)))
}


#[must_use]
pub fn normalize_code(code: &str) -> String {
    code.chars()
        .filter(char::is_ascii_alphanumeric)
        .collect::<String>()
        .to_ascii_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_basic() {
        assert_eq!(normalize("  TOYOTA-Lexus!! "), "toyota lexus");
        assert_eq!(normalize("Ёлка, йод"), "елка иод");
        assert_eq!(normalize("масло   5W-40"), "масло 5w 40");
    }

    #[test]
    fn test_collapse_only_long_letter_runs() {
        assert_eq!(normalize("зооопарк"), "зоопарк");
        assert_eq!(normalize("ааааа"), "аа");
        assert_eq!(normalize("1000"), "1000");
    }

    #[test]
    fn test_digraph_folding_aligns_scripts() {
        assert_eq!(normalize("bosch"), normalize("bosh"));
        assert_eq!(normalize("shantui"), "шantui");
        assert_eq!(normalize("zhiguli"), "жiguli");
        assert_eq!(normalize("chery"), "чery");
    }

    #[test]
    fn test_overrides() {
        assert_eq!(normalize("Тойота"), "toyota");
        assert_eq!(normalize("тоёта"), "toyota");
        assert_eq!(normalize("LEKSUS"), "lexus");
        assert_eq!(normalize("лукойл"), "lukoil");
        assert_eq!(normalize("кэт"), "caterpillar");
        assert_eq!(normalize("caterpilar"), "caterpillar");
    }

    #[test]
    fn test_spelling_key_keeps_written_digraphs() {
        assert_eq!(spelling_key("Bosch").as_deref(), Some("bosch"));
        assert_eq!(spelling_key("Shell").as_deref(), Some("shell"));
        assert_eq!(spelling_key("БОШ").as_deref(), Some("bosh"));
        assert_eq!(spelling_key("ЖИГУЛИ").as_deref(), Some("zhiguli"));
        assert_eq!(spelling_key("Тойота").as_deref(), Some("toyota"));
        assert_eq!(spelling_key("LEKSUS").as_deref(), Some("lexus"));
        assert_eq!(spelling_key("ЛУКОЙЛ").as_deref(), Some("lukoil"));
        assert_eq!(spelling_key("--"), None);
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let samples = [
            "TOYOTA-LEXUS",
            "шшшsh ssssh",
            "Тойота Королла 2010г.",
            "bosch SCHAEFFLER zhejiang chery",
            "ǅemal İstanbul ẞtraße",
            "масло лукойл 5w-40",
            "",
            "---",
            "кэт caterpilar леккксус",
        ];
        for sample in samples {
            let once = normalize(sample);
            assert_eq!(normalize(&once), once, "not idempotent for {sample:?}");
        }
    }

    #[test]
    fn test_override_targets_are_fixed_points() {
        for (_, canonical) in TYPO_OVERRIDES {
            let once = normalize(canonical);
            assert_eq!(normalize(&once), once);
        }
    }

    #[test]
    fn test_tokenize_keeps_positions() {
        let tokens: Vec<&str> = tokenize("Масло, LUKOIL/5w-40").collect();
        assert_eq!(tokens, vec!["Масло", "LUKOIL", "5w", "40"]);
    }

    #[test]
    fn test_normalize_code() {
        assert_eq!(normalize_code("1r-0750 "), "1R0750");
        assert_eq!(normalize_code("W 712/75"), "W71275");
    }
}
