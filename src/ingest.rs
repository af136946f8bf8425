use serde::{Deserialize, Serialize};

use crate::brands::BrandDetector;
use crate::search::planner::cross_script;
use crate::text::{normalize_code, phonetic_key};


#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Offer {
    pub id: String,
    #[serde(default)]
    pub manufacturer: String,
    #[serde(default)]
    pub product_code: String,
    #[serde(default)]
    pub title: String,
}


#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProductDocument {
    pub id: String,
    pub manufacturer: String,
    pub product_code: String,
    pub title: String,
    pub search_text: String,
    pub search_text_tr: String,
    pub product_code_normalized: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manufacturer_normalized: Option<String>,
    pub phonetic: String,
}

impl ProductDocument {
    pub fn prepare(offer: &Offer, detector: &BrandDetector) -> Self {
        let search_text = [&offer.manufacturer, &offer.product_code, &offer.title]
            .iter()
            .map(|part| part.trim())
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        let search_text_tr = cross_script(&search_text).unwrap_or_else(|| search_text.clone());
        let manufacturer_normalized = detector
            .extract_brand_ids(&offer.manufacturer)
            .into_iter()
            .next();

        Self {
            id: offer.id.clone(),
            manufacturer: offer.manufacturer.clone(),
            product_code: offer.product_code.clone(),
            title: offer.title.clone(),
            phonetic: phonetic_key(&search_text),
            search_text,
            search_text_tr,
            product_code_normalized: normalize_code(&offer.product_code),
            manufacturer_normalized,
        }
    }
}
