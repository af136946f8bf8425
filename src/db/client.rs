use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::core::SearchConfig;
use crate::search::planner::{QueryClause, RetrievalPlan, FIELD_MANUFACTURER_NORMALIZED};
use crate::utils::safe_truncate_ellipsis;


#[derive(Debug, Error)]
pub enum IndexError {
    #[error("Index transport failed: {0}")]
    Transport(String),
    #[error("Index returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Index response could not be decoded: {0}")]
    Decode(String),
    #[error("Index request timed out after {0}s")]
    Timeout(u64),
}


#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchHit {
    pub id: Option<String>,
    pub manufacturer: Option<String>,
    pub product_code: Option<String>,
    pub title: Option<String>,
    pub score: Option<f64>,
}

impl SearchHit {
    fn from_source(doc_id: Option<String>, score: Option<f64>, source: &Map<String, Value>) -> Self {
        let text = |key: &str| match source.get(key) {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        };
        Self {
            id: text("id").or(doc_id),
            manufacturer: text("manufacturer"),
            product_code: text("product_code"),
            title: text("title"),
            score,
        }
    }
}


#[async_trait]
pub trait SearchIndex: Send + Sync {

    async fn search(&self, plan: &RetrievalPlan) -> Result<Vec<SearchHit>, IndexError>;

    fn name(&self) -> &str;
}


#[derive(Debug, Deserialize)]
struct IndexResponse {
    #[serde(default)]
    hits: IndexHits,
}

#[derive(Debug, Default, Deserialize)]
struct IndexHits {
    #[serde(default)]
    hits: Vec<IndexHit>,
}

#[derive(Debug, Deserialize)]
struct IndexHit {
    #[serde(rename = "_id")]
    id: Option<String>,
    #[serde(rename = "_score")]
    score: Option<f64>,
    #[serde(rename = "_source", default)]
    source: Map<String, Value>,
}


pub struct HttpIndexClient {
    client: Client,
    search_url: String,
    timeout_secs: u64,
}

impl HttpIndexClient {
    pub fn new(search_url: impl Into<String>, timeout_secs: u64) -> Result<Self, IndexError> {
        let search_url = search_url.into();
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| IndexError::Transport(e.to_string()))?;

        info!("HttpIndexClient created for {}", search_url);
        Ok(Self {
            client,
            search_url,
            timeout_secs,
        })
    }

    pub fn from_config(config: &SearchConfig) -> Result<Self, IndexError> {
        Self::new(config.search_url(), config.request_timeout_secs)
    }

    pub fn search_url(&self) -> &str {
        &self.search_url
    }
}

#[async_trait]
impl SearchIndex for HttpIndexClient {
    async fn search(&self, plan: &RetrievalPlan) -> Result<Vec<SearchHit>, IndexError> {
        let body = render_plan(plan);
        debug!("POST {} {}", self.search_url, safe_truncate_ellipsis(&body.to_string(), 400));

        let response = self
            .client
            .post(&self.search_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    IndexError::Timeout(self.timeout_secs)
                } else {
                    IndexError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Index returned {} for {} plan", status, plan.mode.as_str());
            return Err(IndexError::Status {
                status: status.as_u16(),
                body: safe_truncate_ellipsis(&body, 500),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| IndexError::Transport(e.to_string()))?;
        parse_hits(&bytes)
    }

    fn name(&self) -> &str {
        "http"
    }
}


pub fn parse_hits(bytes: &[u8]) -> Result<Vec<SearchHit>, IndexError> {
    let parsed: IndexResponse =
        serde_json::from_slice(bytes).map_err(|e| IndexError::Decode(e.to_string()))?;
    Ok(parsed
        .hits
        .hits
        .into_iter()
        .map(|hit| SearchHit::from_source(hit.id, hit.score, &hit.source))
        .collect())
}


/// Elasticsearch-flavoured request body for a plan.
pub fn render_plan(plan: &RetrievalPlan) -> Value {
    let mut must = Vec::new();
    let mut should = Vec::new();
    for clause in &plan.clauses {
        if clause.is_required() {
            must.push(render_clause(clause));
        } else {
            should.push(render_clause(clause));
        }
    }

    let mut bool_query = Map::new();
    if let Some(ids) = plan.filter_brand_ids.as_ref().filter(|ids| !ids.is_empty()) {
        bool_query.insert(
            "filter".into(),
            json!([{ "terms": { FIELD_MANUFACTURER_NORMALIZED: ids } }]),
        );
    }
    if !must.is_empty() {
        bool_query.insert("must".into(), Value::Array(must));
    }
    if !should.is_empty() {
        bool_query.insert("should".into(), Value::Array(should));
        if !bool_query.contains_key("must") {
            bool_query.insert("minimum_should_match".into(), json!(1));
        }
    }

    json!({
        "size": plan.size,
        "query": { "bool": bool_query },
    })
}

fn render_clause(clause: &QueryClause) -> Value {
    match clause {
        QueryClause::Term { field, value, boost } => {
            json!({ "term": { field.as_str(): { "value": value, "boost": boost } } })
        }
        QueryClause::Text { query, fields, fuzzy, boost, .. } => {
            let mut body = json!({ "query": query, "boost": boost });
            if *fuzzy {
                body["fuzziness"] = json!("AUTO");
            }
            match fields.as_slice() {
                [field] => json!({ "match": { field.as_str(): body } }),
                _ => {
                    body["fields"] = json!(fields);
                    json!({ "multi_match": body })
                }
            }
        }
        QueryClause::Phonetic { query, fields, boost } => json!({
            "multi_match": {
                "query": query,
                "fields": fields,
                "type": "most_fields",
                "boost": boost,
            }
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::planner::QueryPlanner;
    use crate::search::query_processor::{QueryClassification, QueryKind};

    fn brand_plan() -> RetrievalPlan {
        QueryPlanner::new(10).plan(&QueryClassification {
            kind: QueryKind::BrandWithGeneric,
            brand_ids: vec!["lukoil".into()],
            normalized_generic_tokens: vec!["масло".into()],
            raw_generic_tokens: vec!["масло".into()],
            brand_tokens_raw: vec!["лукойл".into()],
            ..QueryClassification::empty("масло лукойл")
        })
    }

    #[test]
    fn test_render_strict_plan() {
        let body = render_plan(&brand_plan());
        assert_eq!(body["size"], 10);
        assert_eq!(
            body["query"]["bool"]["filter"][0]["terms"]["manufacturer_normalized"][0],
            "lukoil"
        );
        assert_eq!(body["query"]["bool"]["must"].as_array().unwrap().len(), 1);
        assert!(body["query"]["bool"].get("minimum_should_match").is_none());
        assert_eq!(
            body["query"]["bool"]["should"][0]["term"]["manufacturer_normalized"]["value"],
            "lukoil"
        );
    }

    #[test]
    fn test_render_relaxed_plan_has_no_filter() {
        let planner = QueryPlanner::new(10);
        let relaxed = planner.fallback_plan(&brand_plan()).unwrap();
        let body = render_plan(&relaxed);
        assert!(body["query"]["bool"].get("filter").is_none());
        assert!(body["query"]["bool"]["should"].as_array().unwrap().len() > 1);
    }

    #[test]
    fn test_render_single_field_match() {
        let body = render_clause(&QueryClause::Text {
            query: "1R0750".into(),
            fields: vec!["product_code".into()],
            fuzzy: true,
            required: false,
            boost: 3.0,
        });
        assert_eq!(body["match"]["product_code"]["query"], "1R0750");
        assert_eq!(body["match"]["product_code"]["fuzziness"], "AUTO");
    }

    #[test]
    fn test_parse_hits() {
        let raw = r#"{
            "took": 3,
            "hits": {
                "total": {"value": 2},
                "hits": [
                    {"_id": "a1", "_score": 7.5, "_source": {"id": 42, "manufacturer": "LUKOIL", "title": "Масло"}},
                    {"_id": "b2", "_score": 1.0, "_source": {"product_code": "1R0750"}}
                ]
            }
        }"#;
        let hits = parse_hits(raw.as_bytes()).unwrap();
        assert_eq!(hits[0].title.as_deref(), Some("Масло"));
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].id.as_deref(), Some("42"));
        assert_eq!(hits[0].manufacturer.as_deref(), Some("LUKOIL"));
        assert_eq!(hits[1].id.as_deref(), Some("b2"));
        assert_eq!(hits[1].score, Some(1.0));
    }

    #[test]
    fn test_parse_hits_rejects_garbage() {
        assert!(matches!(parse_hits(b"not json"), Err(IndexError::Decode(_))));
        assert!(parse_hits(b"{}").unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_index_is_transport_error() {
        let client = HttpIndexClient::new("http://127.0.0.1:9/products/_search", 2).unwrap();
        let result = client.search(&brand_plan()).await;
        assert!(matches!(
            result,
            Err(IndexError::Transport(_)) | Err(IndexError::Timeout(_))
        ));
    }
}
