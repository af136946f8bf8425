use lazy_static::lazy_static;
use regex::Regex;
use url::Url;

use crate::brands::vocabulary::looks_like_article_code;
use crate::text::tokenize;

const URL_FILE_EXTENSIONS: &[&str] = &["html", "htm", "php", "aspx", "asp", "jsp"];

const ARTICLE_MAX_WORDS: usize = 3;
const ARTICLE_MIN_ALNUM: usize = 4;

lazy_static! {
    static ref URL_PREFIX_RE: Regex =
        Regex::new(r"(?i)^(?:https?://|www\.)\S+$").expect("url prefix pattern");
}


pub fn parse_url(query: &str) -> Option<Url> {
    let query = query.trim();
    if !URL_PREFIX_RE.is_match(query) {
        return None;
    }

    let parsed = if query.to_ascii_lowercase().starts_with("www.") {
        Url::parse(&format!("http://{query}"))
    } else {
        Url::parse(query)
    };
    parsed.ok().filter(|url| url.host_str().is_some())
}


pub fn url_tokens(url: &Url) -> Vec<String> {
    let mut parts: Vec<String> = url
        .path_segments()
        .map(|segments| segments.map(str::to_string).collect())
        .unwrap_or_default();
    parts.extend(url.query_pairs().map(|(_, value)| value.into_owned()));

    let mut tokens = Vec::new();
    for part in &parts {
        for token in tokenize(part) {
            let token = token.to_lowercase();
            if URL_FILE_EXTENSIONS.contains(&token.as_str()) {
                continue;
            }
            if token.chars().all(|c| c.is_ascii_digit()) && token.len() < 3 {
                continue;
            }
            tokens.push(token);
        }
    }
    tokens
}


pub fn is_article_query(query: &str, min_digit_ratio: f64) -> bool {
    let words: Vec<&str> = query.split_whitespace().collect();
    if words.is_empty() {
        return false;
    }

    // A separate recognizable word (kamaz 740) keeps the query out of ARTICLE.
    let every_word_is_code = words.iter().all(|word| {
        word.chars().any(|c| c.is_ascii_digit())
            || word.chars().filter(|c| c.is_alphabetic()).count() <= 2
    });
    if words.len() > 1 && !every_word_is_code {
        return false;
    }

    let compact: String = words.concat();
    if looks_like_article_code(&compact) {
        return true;
    }
    if words.len() > ARTICLE_MAX_WORDS || !every_word_is_code {
        return false;
    }

    let alnum = compact.chars().filter(|c| c.is_alphanumeric()).count();
    let digits = compact.chars().filter(|c| c.is_ascii_digit()).count();
    alnum >= ARTICLE_MIN_ALNUM && digits as f64 / alnum as f64 >= min_digit_ratio
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_url() {
        assert!(parse_url("https://shop.example.ru/catalog/kamaz-filter.html").is_some());
        assert!(parse_url("www.example.com/oil").is_some());
        assert!(parse_url("масло лукойл").is_none());
        assert!(parse_url("https://").is_none());
        assert!(parse_url("see https://example.com").is_none());
    }

    #[test]
    fn test_url_tokens() {
        let url = parse_url("https://shop.ru/catalog/12/kamaz-filter.html?q=Масло&page=2").unwrap();
        assert_eq!(url_tokens(&url), vec!["catalog", "kamaz", "filter", "масло"]);
    }

    #[test]
    fn test_article_queries() {
        assert!(is_article_query("1R0750", 0.3));
        assert!(is_article_query("OC 90123", 0.3));
        assert!(is_article_query("W 712/75", 0.3));
        assert!(is_article_query("21011012005", 0.3));
    }

    #[test]
    fn test_non_article_queries() {
        assert!(!is_article_query("масло 5w-40", 0.3));
        assert!(!is_article_query("камаз 740", 0.3));
        assert!(!is_article_query("BMW X5", 0.3));
        assert!(!is_article_query("toyota", 0.3));
        assert!(!is_article_query("   ", 0.3));
        assert!(!is_article_query("a1", 0.3));
    }

    #[test]
    fn test_brand_and_model_number_is_not_article() {
        for query in ["kamaz 740", "volvo 940", "toyota 2010", "камаз 740", "KAMAZ 5320"] {
            assert!(!is_article_query(query, 0.3), "{query}");
        }
        assert!(is_article_query("OC 90123", 0.3));
    }
}
