//! Record source adapters for the system of record.
//!
//! Every fetch is a full-table read returned in store order. There is no
//! pagination, filtering or incremental fetch; each sync pass re-reads
//! everything.

mod rest;
mod schema;
mod sqlite;

pub use rest::RestSource;
pub use sqlite::SqliteSource;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{Record, RecordKind};

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Failed to fetch {table}: {reason}")]
    FetchFailed { table: &'static str, reason: String },

    #[error("Source misconfigured: {0}")]
    Config(String),
}

impl SourceError {
    pub fn fetch(kind: RecordKind, reason: impl std::fmt::Display) -> Self {
        Self::FetchFailed {
            table: kind.table(),
            reason: reason.to_string(),
        }
    }
}

/// Read access to the relational collections.
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Read every row of one collection.
    async fn fetch(&self, kind: RecordKind) -> Result<Vec<Record>, SourceError>;

    async fn fetch_tasks(&self) -> Result<Vec<Record>, SourceError> {
        self.fetch(RecordKind::Tasks).await
    }

    async fn fetch_projects(&self) -> Result<Vec<Record>, SourceError> {
        self.fetch(RecordKind::Projects).await
    }

    async fn fetch_business_projects(&self) -> Result<Vec<Record>, SourceError> {
        self.fetch(RecordKind::BusinessProjects).await
    }

    async fn fetch_phases(&self) -> Result<Vec<Record>, SourceError> {
        self.fetch(RecordKind::Phases).await
    }

    async fn fetch_content(&self) -> Result<Vec<Record>, SourceError> {
        self.fetch(RecordKind::Content).await
    }

    async fn fetch_finance_records(&self) -> Result<Vec<Record>, SourceError> {
        self.fetch(RecordKind::FinanceRecords).await
    }

    async fn fetch_time_entries(&self) -> Result<Vec<Record>, SourceError> {
        self.fetch(RecordKind::TimeEntries).await
    }
}

/// Fetch a collection, degrading any failure to an empty list.
///
/// An empty result is ambiguous between "no rows" and "fetch failed"; use
/// [`RecordSource::fetch`] directly when the difference matters.
pub async fn fetch_or_empty(source: &dyn RecordSource, kind: RecordKind) -> Vec<Record> {
    match source.fetch(kind).await {
        Ok(records) => records,
        Err(e) => {
            tracing::error!("Error fetching {}: {}", kind, e);
            Vec::new()
        }
    }
}
