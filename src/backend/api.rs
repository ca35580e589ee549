//! HTTP client for the rent estimation service

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use super::types::{EvaluationResponse, QueryRequest, RentOnlyResponse, SearchParams};

/// Logical endpoint names, used in logs and error messages
pub const ESTIMATE_RENT: Endpoint = Endpoint {
    name: "estimate-rent",
    path: "/api/estimate-rent",
};
pub const EVALUATE: Endpoint = Endpoint {
    name: "evaluate",
    path: "/api/evaluate",
};
pub const PARSE_QUERY: Endpoint = Endpoint {
    name: "parse-query",
    path: "/api/parse-query",
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint {
    pub name: &'static str,
    pub path: &'static str,
}

#[derive(Debug, Error)]
pub enum ApiError {
    /// Non-2xx response; `body` falls back to the status reason phrase
    #[error("{endpoint} failed: {} {body}", .status.as_u16())]
    Status {
        endpoint: &'static str,
        status: StatusCode,
        body: String,
    },
    #[error("{endpoint} request failed: {source}")]
    Network {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("{endpoint} returned an unreadable response: {source}")]
    Decode {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },
}

#[cfg(test)]
impl ApiError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Client for the estimation service. Holds no per-request state, so clones
/// and repeated calls never interfere with each other.
#[derive(Debug, Clone)]
pub struct BackendClient {
    client: Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Quick average-rent estimate
    pub async fn estimate_rent(&self, params: &SearchParams) -> Result<RentOnlyResponse, ApiError> {
        self.post(ESTIMATE_RENT, params).await
    }

    /// Full evaluation: refined average rent plus sample properties
    pub async fn evaluate(&self, params: &SearchParams) -> Result<EvaluationResponse, ApiError> {
        self.post(EVALUATE, params).await
    }

    /// Turn a free-text description into search criteria
    pub async fn parse_query(&self, query: &str) -> Result<SearchParams, ApiError> {
        let request = QueryRequest {
            query: query.trim().to_string(),
        };
        self.post(PARSE_QUERY, &request).await
    }

    async fn post<B, T>(&self, endpoint: Endpoint, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, endpoint.path);
        tracing::debug!(endpoint = endpoint.name, %url, "sending request");

        // `.json()` sets `Content-Type: application/json`
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|source| ApiError::Network {
                endpoint: endpoint.name,
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let body = if text.trim().is_empty() {
                status.canonical_reason().unwrap_or_default().to_string()
            } else {
                text
            };
            tracing::warn!(endpoint = endpoint.name, status = status.as_u16(), "request rejected");
            return Err(ApiError::Status {
                endpoint: endpoint.name,
                status,
                body,
            });
        }

        response.json().await.map_err(|source| ApiError::Decode {
            endpoint: endpoint.name,
            source,
        })
    }
}
