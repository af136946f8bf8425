use serde::{Deserialize, Serialize};
use strum::{EnumString, IntoStaticStr};

use crate::brands::Detection;


#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, EnumString, IntoStaticStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum QueryKind {
    Url,
    Article,
    BrandOnly,
    BrandWithGeneric,
    GenericOnly,
}

impl QueryKind {
    pub fn as_str(&self) -> &'static str {
        self.into()
    }
}


#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QueryClassification {

    pub query: String,

    pub kind: QueryKind,

    pub brand_ids: Vec<String>,

    pub normalized_generic_tokens: Vec<String>,

    pub raw_generic_tokens: Vec<String>,

    pub brand_tokens_raw: Vec<String>,

    pub normalized_code: Option<String>,

    pub url_tokens: Option<Vec<String>>,
}

impl QueryClassification {

    pub fn empty(query: &str) -> Self {
        Self {
            query: query.to_string(),
            kind: QueryKind::GenericOnly,
            brand_ids: Vec::new(),
            normalized_generic_tokens: Vec::new(),
            raw_generic_tokens: Vec::new(),
            brand_tokens_raw: Vec::new(),
            normalized_code: None,
            url_tokens: None,
        }
    }

    pub(crate) fn from_detection(query: &str, detection: Detection) -> Self {
        let kind = match (detection.has_brands(), detection.has_generic()) {
            (true, false) => QueryKind::BrandOnly,
            (true, true) => QueryKind::BrandWithGeneric,
            (false, _) => QueryKind::GenericOnly,
        };
        Self {
            query: query.to_string(),
            kind,
            brand_ids: detection.brand_ids,
            normalized_generic_tokens: detection.generic_tokens_normalized,
            raw_generic_tokens: detection.generic_tokens_raw,
            brand_tokens_raw: detection.brand_tokens_raw,
            normalized_code: None,
            url_tokens: None,
        }
    }

    pub fn has_brands(&self) -> bool {
        !self.brand_ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_kind_names() {
        assert_eq!(QueryKind::BrandWithGeneric.as_str(), "BRAND_WITH_GENERIC");
        assert_eq!(QueryKind::from_str("brand_only").unwrap(), QueryKind::BrandOnly);
        assert_eq!(
            serde_json::to_string(&QueryKind::GenericOnly).unwrap(),
            "\"GENERIC_ONLY\""
        );
    }

    #[test]
    fn test_kind_from_detection() {
        let detection = Detection {
            brand_ids: vec!["lukoil".into()],
            generic_tokens_normalized: vec!["масло".into()],
            generic_tokens_raw: vec!["масло".into()],
            brand_tokens_raw: vec!["лукойл".into()],
        };
        let classification = QueryClassification::from_detection("масло лукойл", detection);
        assert_eq!(classification.kind, QueryKind::BrandWithGeneric);

        let empty = QueryClassification::from_detection("", Detection::default());
        assert_eq!(empty.kind, QueryKind::GenericOnly);
        assert_eq!(empty, QueryClassification::empty(""));
    }
}
