//! HTTP client for a Graphiti-style extraction service.
//!
//! - `GET  {base}/healthcheck` when connecting
//! - `POST {base}/episodes` to submit an episode
//! - `POST {base}/search` for ranked facts

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

use super::{EngineConnector, EngineError, GraphEngine};
use crate::config::GraphConfig;
use crate::models::{Episode, ExtractionResult, SearchHit};

#[derive(Debug, Serialize)]
struct EpisodeRequest<'a> {
    name: &'a str,
    episode_body: &'a str,
    source_description: &'a str,
    reference_time: String,
    source: &'static str,
}

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
    num_results: usize,
}

#[derive(Debug)]
pub struct GraphitiClient {
    base_url: String,
    api_key: Option<String>,
    client: Client,
    closed: AtomicBool,
}

impl GraphitiClient {
    /// Create a client without contacting the engine.
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            client: Client::new(),
            closed: AtomicBool::new(false),
        }
    }

    /// Create a client and verify the engine answers its healthcheck.
    pub async fn connect(config: &GraphConfig) -> Result<Self, EngineError> {
        let client = Self::new(&config.url, config.api_key.clone());
        let response = client
            .request(reqwest::Method::GET, "/healthcheck")
            .send()
            .await
            .map_err(|e| EngineError::Unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(EngineError::Unavailable(format!(
                "healthcheck returned {}",
                response.status()
            )));
        }

        tracing::info!("Connected to graph engine at {}", client.base_url);
        Ok(client)
    }

    /// Build a request with optional auth header.
    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let mut req = self.client.request(method, &url);
        if let Some(ref key) = self.api_key {
            req = req.bearer_auth(key);
        }
        req
    }

    fn ensure_open(&self) -> Result<(), EngineError> {
        if self.closed.load(Ordering::SeqCst) {
            Err(EngineError::Closed)
        } else {
            Ok(())
        }
    }

    /// Send a request. Only a failure to reach the engine at all is
    /// `Unavailable`; any reply the engine sends back, including gateway and
    /// overload statuses, is a failure of this one request and goes through
    /// `reject`.
    async fn send(
        &self,
        req: reqwest::RequestBuilder,
        reject: fn(String) -> EngineError,
    ) -> Result<reqwest::Response, EngineError> {
        let response = req.send().await.map_err(|e| {
            if e.is_connect() {
                EngineError::Unavailable(e.to_string())
            } else {
                reject(e.to_string())
            }
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(reject(format!("{}: {}", status, body)))
    }
}

#[async_trait]
impl GraphEngine for GraphitiClient {
    async fn submit(&self, episode: &Episode) -> Result<ExtractionResult, EngineError> {
        self.ensure_open()?;

        let body = EpisodeRequest {
            name: &episode.name,
            episode_body: &episode.body,
            source_description: &episode.source_label,
            reference_time: episode.reference_time.to_rfc3339(),
            source: "text",
        };
        let req = self.request(reqwest::Method::POST, "/episodes").json(&body);
        let response = self.send(req, EngineError::Extraction).await?;

        response
            .json()
            .await
            .map_err(|e| EngineError::Extraction(e.to_string()))
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>, EngineError> {
        self.ensure_open()?;

        let body = SearchRequest {
            query,
            num_results: limit,
        };
        let req = self.request(reqwest::Method::POST, "/search").json(&body);
        let response = self.send(req, EngineError::Search).await?;

        let payload: Value = response
            .json()
            .await
            .map_err(|e| EngineError::Search(e.to_string()))?;
        hits_from(payload)
    }

    async fn close(&self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            tracing::info!("Graph engine connection closed");
        }
    }
}

/// Accept either a bare array of hits or an object wrapping one under
/// `results` or `facts`.
fn hits_from(payload: Value) -> Result<Vec<SearchHit>, EngineError> {
    let items = match payload {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("results").or_else(|| map.remove("facts")) {
            Some(Value::Array(items)) => items,
            _ => {
                return Err(EngineError::Search(
                    "response has no results array".to_string(),
                ))
            }
        },
        other => {
            return Err(EngineError::Search(format!(
                "unexpected search response: {}",
                other
            )))
        }
    };
    Ok(items.into_iter().map(SearchHit).collect())
}

#[async_trait]
impl EngineConnector for GraphConfig {
    async fn connect(&self) -> Result<Arc<dyn GraphEngine>, EngineError> {
        let client = GraphitiClient::connect(self).await?;
        Ok(Arc::new(client))
    }
}
