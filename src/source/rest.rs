//! PostgREST-style HTTP record source.
//!
//! Reads `GET {url}/rest/v1/{table}?select=*`, authenticating with the
//! service key both as `apikey` header and bearer token.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use super::{RecordSource, SourceError};
use crate::models::{Record, RecordKind};

#[derive(Debug, Clone)]
pub struct RestSource {
    base_url: String,
    api_key: String,
    client: Client,
}

impl RestSource {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client: Client::new(),
        }
    }

    fn table_url(&self, kind: RecordKind) -> String {
        format!("{}/rest/v1/{}", self.base_url, kind.table())
    }

    async fn select_all(&self, kind: RecordKind) -> Result<Vec<Record>, String> {
        let response = self
            .client
            .get(self.table_url(kind))
            .query(&[("select", "*")])
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(format!("{}: {}", status, body));
        }

        let rows: Vec<Value> = response.json().await.map_err(|e| e.to_string())?;
        rows.into_iter()
            .map(|row| Record::try_from(row).map_err(|v| format!("row is not an object: {}", v)))
            .collect()
    }
}

#[async_trait]
impl RecordSource for RestSource {
    async fn fetch(&self, kind: RecordKind) -> Result<Vec<Record>, SourceError> {
        let records = self
            .select_all(kind)
            .await
            .map_err(|reason| SourceError::fetch(kind, reason))?;
        tracing::debug!("Fetched {} rows from {}", records.len(), kind);
        Ok(records)
    }
}
