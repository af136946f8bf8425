use serde::{Deserialize, Serialize};
use tracing::debug;

use super::query_processor::{QueryClassification, QueryKind};
use crate::brands::vocabulary::is_stopword;
use crate::core::{RetrievalMode, SearchConfig};
use crate::text::{detect_script, normalize_code, phonetic_key, tokenize, transliterate, Direction, Script};

pub const FIELD_SEARCH_TEXT: &str = "search_text";
pub const FIELD_SEARCH_TEXT_TR: &str = "search_text_tr";
pub const FIELD_PRODUCT_CODE: &str = "product_code";
pub const FIELD_PRODUCT_CODE_NORMALIZED: &str = "product_code_normalized";
pub const FIELD_MANUFACTURER: &str = "manufacturer";
pub const FIELD_MANUFACTURER_NORMALIZED: &str = "manufacturer_normalized";
pub const FIELD_MANUFACTURER_PHONETIC: &str = "manufacturer.phonetic";
pub const FIELD_TITLE: &str = "title";
pub const FIELD_PHONETIC: &str = "phonetic";


#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QueryClause {
    Term {
        field: String,
        value: String,
        boost: f64,
    },
    Text {
        query: String,
        fields: Vec<String>,
        fuzzy: bool,
        required: bool,
        boost: f64,
    },
    Phonetic {
        query: String,
        fields: Vec<String>,
        boost: f64,
    },
}

impl QueryClause {
    fn term(field: &str, value: &str, boost: f64) -> Self {
        Self::Term {
            field: field.to_string(),
            value: value.to_string(),
            boost,
        }
    }

    fn text(query: &str, fields: &[&str], boost: f64) -> Self {
        Self::Text {
            query: query.to_string(),
            fields: fields.iter().map(|f| f.to_string()).collect(),
            fuzzy: true,
            required: false,
            boost,
        }
    }

    fn required_text(query: &str, fields: &[&str], boost: f64) -> Self {
        Self::Text {
            query: query.to_string(),
            fields: fields.iter().map(|f| f.to_string()).collect(),
            fuzzy: true,
            required: true,
            boost,
        }
    }

    fn phonetic(query: &str, fields: &[&str], boost: f64) -> Self {
        Self::Phonetic {
            query: query.to_string(),
            fields: fields.iter().map(|f| f.to_string()).collect(),
            boost,
        }
    }

    pub fn is_required(&self) -> bool {
        matches!(self, Self::Text { required: true, .. })
    }
}


/// Abstract retrieval request. A retry builds a new plan instead of
/// editing this one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetrievalPlan {

    pub mode: RetrievalMode,

    pub filter_brand_ids: Option<Vec<String>>,

    pub boost_brand_ids: Option<Vec<String>>,

    pub text_terms: Vec<String>,

    pub code: Option<String>,

    pub clauses: Vec<QueryClause>,

    pub size: usize,

    pub relaxed: bool,
}

impl RetrievalPlan {
    fn new(mode: RetrievalMode, size: usize) -> Self {
        Self {
            mode,
            filter_brand_ids: None,
            boost_brand_ids: None,
            text_terms: Vec::new(),
            code: None,
            clauses: Vec::new(),
            size,
            relaxed: false,
        }
    }

    pub fn is_filtered(&self) -> bool {
        self.filter_brand_ids.as_ref().is_some_and(|ids| !ids.is_empty())
    }

    pub fn text_query(&self) -> String {
        self.text_terms.join(" ")
    }
}


#[derive(Debug, Clone)]
pub struct QueryPlanner {
    page_size: usize,
    phonetic_enabled: bool,
    brand_only_min_hits: usize,
    brand_with_generic_min_hits: usize,
}

impl QueryPlanner {
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size,
            phonetic_enabled: true,
            brand_only_min_hits: 1,
            brand_with_generic_min_hits: 3,
        }
    }

    pub fn from_config(config: &SearchConfig) -> Self {
        Self {
            page_size: config.page_size,
            phonetic_enabled: config.phonetic_enabled,
            brand_only_min_hits: config.brand_only_min_hits,
            brand_with_generic_min_hits: config.brand_with_generic_min_hits,
        }
    }


    pub fn plan(&self, classification: &QueryClassification) -> RetrievalPlan {
        let plan = match classification.kind {
            QueryKind::Article => self.plan_article(classification),
            QueryKind::Url => self.plan_url(classification),
            QueryKind::BrandOnly => self.plan_brand_only(classification),
            QueryKind::BrandWithGeneric => self.plan_brand_with_generic(classification),
            QueryKind::GenericOnly => self.plan_generic(classification),
        };
        debug!(
            "Planned {} with {} clauses, filter={:?}",
            plan.mode.as_str(),
            plan.clauses.len(),
            plan.filter_brand_ids
        );
        plan
    }

    /// Filter-free copy of a brand plan, boost kept. `None` for plans that
    /// never fall back or were already relaxed.
    pub fn fallback_plan(&self, plan: &RetrievalPlan) -> Option<RetrievalPlan> {
        if !plan.mode.is_brand_filtered() || plan.relaxed || !plan.is_filtered() {
            return None;
        }
        Some(RetrievalPlan {
            filter_brand_ids: None,
            relaxed: true,
            ..plan.clone()
        })
    }

    pub fn min_hits(&self, mode: RetrievalMode) -> Option<usize> {
        match mode {
            RetrievalMode::BrandStrict => Some(self.brand_only_min_hits),
            RetrievalMode::BrandBoosted => Some(self.brand_with_generic_min_hits),
            RetrievalMode::Article | RetrievalMode::Url | RetrievalMode::Generic => None,
        }
    }

    pub fn needs_fallback(&self, plan: &RetrievalPlan, hit_count: usize) -> bool {
        !plan.relaxed
            && plan.is_filtered()
            && self.min_hits(plan.mode).is_some_and(|min| hit_count < min)
    }


    fn plan_article(&self, classification: &QueryClassification) -> RetrievalPlan {
        let weights = RetrievalMode::Article.get_defaults();
        let query = classification.query.trim();
        let code = classification
            .normalized_code
            .clone()
            .unwrap_or_else(|| normalize_code(query));

        let mut plan = RetrievalPlan::new(RetrievalMode::Article, self.page_size);
        if !code.is_empty() {
            plan.clauses.push(QueryClause::term(FIELD_PRODUCT_CODE_NORMALIZED, &code, weights.code_boost));
            plan.code = Some(code);
        }
        plan.clauses.push(QueryClause::text(query, &[FIELD_PRODUCT_CODE], weights.code_match_boost));
        plan.clauses.push(QueryClause::text(query, &[FIELD_SEARCH_TEXT], weights.text_boost));
        plan.text_terms = vec![query.to_string()];
        plan
    }

    fn plan_url(&self, classification: &QueryClassification) -> RetrievalPlan {
        let weights = RetrievalMode::Url.get_defaults();
        let mut plan = RetrievalPlan::new(RetrievalMode::Url, self.page_size);

        match classification.url_tokens.as_deref() {
            Some(tokens) if !tokens.is_empty() => {
                plan.text_terms = tokens.to_vec();
                let text = plan.text_query();
                plan.clauses.push(QueryClause::text(
                    &text,
                    &[FIELD_SEARCH_TEXT, FIELD_SEARCH_TEXT_TR],
                    weights.text_boost,
                ));
            }
            _ => {
                let query = classification.query.trim();
                plan.text_terms = vec![query.to_string()];
                plan.clauses.push(QueryClause::text(query, &[FIELD_SEARCH_TEXT], weights.text_boost));
            }
        }
        plan
    }

    fn plan_brand_only(&self, classification: &QueryClassification) -> RetrievalPlan {
        let weights = RetrievalMode::BrandStrict.get_defaults();
        let mut plan = self.brand_plan(RetrievalMode::BrandStrict, classification);

        let query = classification.query.trim();
        self.push_text_clauses(&mut plan, query, weights.text_boost, weights.phonetic_boost);
        self.push_cross_script(&mut plan, query, weights.cross_script_boost);
        plan
    }

    fn plan_brand_with_generic(&self, classification: &QueryClassification) -> RetrievalPlan {
        let weights = RetrievalMode::BrandBoosted.get_defaults();
        let mut plan = self.brand_plan(RetrievalMode::BrandBoosted, classification);

        let query = classification.query.trim();
        self.push_text_clauses(&mut plan, query, weights.text_boost, weights.phonetic_boost);

        plan.text_terms = generic_terms(classification);
        let generic = plan.text_query();
        if !generic.is_empty() {
            plan.clauses.push(QueryClause::required_text(
                &generic,
                &[FIELD_TITLE, FIELD_SEARCH_TEXT, FIELD_SEARCH_TEXT_TR],
                1.0,
            ));
        }
        self.push_cross_script(&mut plan, query, weights.cross_script_boost);
        plan
    }

    fn plan_generic(&self, classification: &QueryClassification) -> RetrievalPlan {
        let weights = RetrievalMode::Generic.get_defaults();
        let mut plan = RetrievalPlan::new(RetrievalMode::Generic, self.page_size);

        plan.text_terms = generic_terms(classification);
        if plan.text_terms.is_empty() {
            plan.text_terms = classification.raw_generic_tokens.clone();
        }
        if plan.text_terms.is_empty() && !classification.query.trim().is_empty() {
            plan.text_terms = vec![classification.query.trim().to_string()];
        }

        let text = plan.text_query();
        if !text.is_empty() {
            self.push_text_clauses(&mut plan, &text, weights.text_boost, weights.phonetic_boost);
            self.push_cross_script(&mut plan, &text, weights.cross_script_boost);
        }
        plan
    }

    fn brand_plan(&self, mode: RetrievalMode, classification: &QueryClassification) -> RetrievalPlan {
        let weights = mode.get_defaults();
        let mut plan = RetrievalPlan::new(mode, self.page_size);
        plan.filter_brand_ids = Some(classification.brand_ids.clone());
        plan.boost_brand_ids = Some(classification.brand_ids.clone());

        for id in &classification.brand_ids {
            plan.clauses.push(QueryClause::term(FIELD_MANUFACTURER_NORMALIZED, id, weights.brand_boost));
        }

        let labels = if classification.brand_tokens_raw.is_empty() {
            classification.query.trim().to_string()
        } else {
            classification.brand_tokens_raw.join(" ")
        };
        plan.clauses.push(QueryClause::Text {
            query: labels,
            fields: vec![format!("{FIELD_MANUFACTURER}^3"), format!("{FIELD_MANUFACTURER_PHONETIC}^2")],
            fuzzy: true,
            required: false,
            boost: weights.label_boost,
        });
        plan
    }

    fn push_text_clauses(&self, plan: &mut RetrievalPlan, text: &str, boost: f64, phonetic_boost: f64) {
        if text.is_empty() {
            return;
        }
        plan.clauses.push(QueryClause::text(
            text,
            &["title^3", FIELD_SEARCH_TEXT, FIELD_MANUFACTURER],
            boost,
        ));
        if self.phonetic_enabled && phonetic_boost > 0.0 {
            let key = phonetic_key(text);
            if !key.is_empty() {
                plan.clauses.push(QueryClause::phonetic(&key, &[FIELD_PHONETIC], phonetic_boost));
            }
        }
    }

    fn push_cross_script(&self, plan: &mut RetrievalPlan, text: &str, boost: f64) {
        if let Some(rendered) = cross_script(text) {
            plan.clauses.push(QueryClause::text(
                &rendered,
                &[FIELD_SEARCH_TEXT_TR, FIELD_SEARCH_TEXT],
                boost,
            ));
        }
    }
}


// Raw spellings win over normalized ones; stopwords are dropped.
fn generic_terms(classification: &QueryClassification) -> Vec<String> {
    classification
        .raw_generic_tokens
        .iter()
        .zip(&classification.normalized_generic_tokens)
        .filter(|(_, normalized)| !is_stopword(normalized))
        .map(|(raw, normalized)| if raw.is_empty() { normalized.clone() } else { raw.clone() })
        .collect()
}


/// Lowercased rendering in the other script. No digraph folding, so the
/// output stays in a single script for Cyrillic and Latin input.
pub fn cross_script(text: &str) -> Option<String> {
    let direction = match detect_script(text) {
        Script::Cyrillic | Script::Mixed => Direction::ToLatin,
        Script::Latin => Direction::ToCyrillic,
        Script::None => return None,
    };
    let lowered = text.to_lowercase();
    let rendered = join_tokens(&transliterate(&lowered, direction));
    (!rendered.is_empty() && rendered != join_tokens(&lowered)).then_some(rendered)
}

fn join_tokens(text: &str) -> String {
    tokenize(text).collect::<Vec<_>>().join(" ")
}
