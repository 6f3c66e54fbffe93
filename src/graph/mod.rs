//! Graph-extraction engine access.
//!
//! The engine turns episode text into entities and edges and serves ranked
//! text search over the resulting graph. Its full-text indexes are assumed to
//! be provisioned already.

mod client;

pub use client::GraphitiClient;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{Episode, ExtractionResult, SearchHit};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Graph engine unavailable: {0}")]
    Unavailable(String),

    #[error("Extraction failed: {0}")]
    Extraction(String),

    #[error("Search failed: {0}")]
    Search(String),

    #[error("Graph engine connection is closed")]
    Closed,
}

impl EngineError {
    /// Whether the session itself is unusable, as opposed to one request
    /// having been rejected.
    pub fn is_connection(&self) -> bool {
        matches!(self, Self::Unavailable(_) | Self::Closed)
    }
}

/// A session with the graph engine.
///
/// Calls are not retried here; a submission is at-least-once and any retry
/// policy belongs to the caller.
#[async_trait]
pub trait GraphEngine: Send + Sync {
    /// Submit one episode for extraction.
    async fn submit(&self, episode: &Episode) -> Result<ExtractionResult, EngineError>;

    /// Ranked text search. Engine failures are errors, never an empty list.
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>, EngineError>;

    /// Release the session. Safe to call more than once.
    async fn close(&self);
}

/// Opens engine sessions.
#[async_trait]
pub trait EngineConnector: Send + Sync {
    async fn connect(&self) -> Result<Arc<dyn GraphEngine>, EngineError>;
}
