//! Shared types for estimation service communication

use serde::{Deserialize, Serialize};

/// Search criteria sent to every estimation endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    pub min_price: f64,
    pub max_price: f64,
    pub area: String,
    pub bedrooms: u32,
    pub min_sqft: f64,
    pub max_sqft: f64,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            min_price: 200_000.0,
            max_price: 500_000.0,
            area: String::new(),
            bedrooms: 2,
            min_sqft: 600.0,
            max_sqft: 1500.0,
        }
    }
}

/// A sample listing returned by the full evaluation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyResult {
    /// Advisory only, the service does not guarantee uniqueness
    #[serde(default)]
    pub id: String,
    pub address: String,
    pub price: f64,
    pub bedrooms: u32,
    pub sqft: f64,
    pub estimated_rent: f64,
    /// Fraction, 0.08 = 8%
    pub gross_yield: f64,
    #[serde(default)]
    pub url: String,
}

impl PropertyResult {
    /// Listing link, if the service supplied one
    pub fn listing_url(&self) -> Option<&str> {
        let url = self.url.trim();
        (!url.is_empty()).then_some(url)
    }
}

/// Response of `/api/evaluate`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationResponse {
    pub average_rent: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub properties: Vec<PropertyResult>,
}

/// Response of `/api/estimate-rent`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RentOnlyResponse {
    pub average_rent: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
    /// One-line market summary, empty when the service has none
    #[serde(default)]
    pub analysis: String,
}

/// Body of `/api/parse-query`
#[derive(Debug, Clone, Serialize)]
pub struct QueryRequest {
    pub query: String,
}

fn default_currency() -> String {
    String::from("USD")
}
