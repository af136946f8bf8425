use serde::{Deserialize, Serialize};
use strum::{EnumString, IntoStaticStr};


#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, EnumString, IntoStaticStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum RetrievalMode {
    Article,
    Url,
    BrandStrict,
    BrandBoosted,
    Generic,
}

impl RetrievalMode {

    #[must_use]
    pub fn get_defaults(&self) -> RetrievalModeDefaults {
        match self {
            Self::Article => RetrievalModeDefaults {
                code_boost: 5.0,
                code_match_boost: 3.0,
                text_boost: 2.0,
                ..RetrievalModeDefaults::base()
            },
            Self::Url => RetrievalModeDefaults {
                text_boost: 1.0,
                cross_script_boost: 1.0,
                ..RetrievalModeDefaults::base()
            },
            Self::BrandStrict => RetrievalModeDefaults {
                brand_boost: 5.0,
                label_boost: 2.0,
                text_boost: 0.8,
                phonetic_boost: 0.5,
                cross_script_boost: 0.8,
                may_fall_back: true,
                ..RetrievalModeDefaults::base()
            },
            Self::BrandBoosted => RetrievalModeDefaults {
                brand_boost: 4.0,
                label_boost: 1.5,
                text_boost: 1.2,
                phonetic_boost: 0.8,
                cross_script_boost: 0.8,
                may_fall_back: true,
                ..RetrievalModeDefaults::base()
            },
            Self::Generic => RetrievalModeDefaults {
                text_boost: 1.0,
                phonetic_boost: 0.7,
                cross_script_boost: 0.8,
                ..RetrievalModeDefaults::base()
            },
        }
    }

    pub fn is_brand_filtered(&self) -> bool {
        self.get_defaults().may_fall_back
    }

    pub fn as_str(&self) -> &'static str {
        self.into()
    }
}


#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetrievalModeDefaults {

    pub code_boost: f64,

    pub code_match_boost: f64,

    pub brand_boost: f64,

    pub label_boost: f64,

    pub text_boost: f64,

    pub phonetic_boost: f64,

    pub cross_script_boost: f64,

    pub may_fall_back: bool,
}

impl RetrievalModeDefaults {
    fn base() -> Self {
        Self {
            code_boost: 0.0,
            code_match_boost: 0.0,
            brand_boost: 0.0,
            label_boost: 0.0,
            text_boost: 0.0,
            phonetic_boost: 0.0,
            cross_script_boost: 0.0,
            may_fall_back: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_mode_from_str() {
        assert_eq!(RetrievalMode::from_str("BRAND_STRICT").unwrap(), RetrievalMode::BrandStrict);
        assert_eq!(RetrievalMode::from_str("generic").unwrap(), RetrievalMode::Generic);
        assert!(RetrievalMode::from_str("unknown").is_err());
        assert_eq!(RetrievalMode::BrandBoosted.as_str(), "BRAND_BOOSTED");
    }

    #[test]
    fn test_only_brand_modes_fall_back() {
        assert!(RetrievalMode::BrandStrict.is_brand_filtered());
        assert!(RetrievalMode::BrandBoosted.is_brand_filtered());
        assert!(!RetrievalMode::Article.is_brand_filtered());
        assert!(!RetrievalMode::Url.is_brand_filtered());
        assert!(!RetrievalMode::Generic.is_brand_filtered());
    }

    #[test]
    fn test_strict_brand_boost_dominates() {
        let strict = RetrievalMode::BrandStrict.get_defaults();
        let boosted = RetrievalMode::BrandBoosted.get_defaults();
        assert!(strict.brand_boost > boosted.brand_boost);
        assert!(boosted.text_boost > strict.text_boost);
    }
}
