//! In-memory record source and graph engine for integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use dashboard_graph::graph::{EngineConnector, EngineError, GraphEngine};
use dashboard_graph::models::{Episode, ExtractionResult, Record, RecordKind, SearchHit};
use dashboard_graph::source::{RecordSource, SourceError};
use serde_json::Value;

pub fn record(value: Value) -> Record {
    Record::try_from(value).expect("record must be a JSON object")
}

pub fn task(id: &str, title: &str) -> Record {
    record(serde_json::json!({
        "id": id,
        "title": title,
        "status": "todo",
        "created_at": "2024-01-01T00:00:00",
    }))
}

/// Serve a router on an ephemeral local port and return its base URL.
pub async fn spawn_stub(router: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind stub listener");
    let addr = listener.local_addr().expect("Stub has no local address");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("Stub server failed");
    });
    format!("http://{}", addr)
}

// ============================================================
// Record source
// ============================================================

#[derive(Default)]
pub struct MockSource {
    collections: HashMap<RecordKind, Vec<Record>>,
    failing: HashSet<RecordKind>,
    fetched: Mutex<Vec<RecordKind>>,
}

impl MockSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, kind: RecordKind, records: Vec<Record>) -> Self {
        self.collections.insert(kind, records);
        self
    }

    pub fn failing(mut self, kind: RecordKind) -> Self {
        self.failing.insert(kind);
        self
    }

    pub fn fetched(&self) -> Vec<RecordKind> {
        self.fetched.lock().unwrap().clone()
    }
}

#[async_trait]
impl RecordSource for MockSource {
    async fn fetch(&self, kind: RecordKind) -> Result<Vec<Record>, SourceError> {
        self.fetched.lock().unwrap().push(kind);
        if self.failing.contains(&kind) {
            return Err(SourceError::fetch(kind, "connection reset"));
        }
        Ok(self.collections.get(&kind).cloned().unwrap_or_default())
    }
}

// ============================================================
// Graph engine
// ============================================================

#[derive(Default)]
pub struct MockEngine {
    submitted: Mutex<Vec<Episode>>,
    reject: HashSet<String>,
    drop_connection_on: Option<String>,
    hits: Vec<SearchHit>,
    search_fails: bool,
    searches: Mutex<Vec<(String, usize)>>,
    closes: AtomicUsize,
    /// Submission delay keyed by episode name.
    delays: HashMap<String, Duration>,
}

impl MockEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject extraction for the episode with this name.
    pub fn rejecting(mut self, episode_name: &str) -> Self {
        self.reject.insert(episode_name.to_string());
        self
    }

    /// Report the engine unavailable when this episode is submitted.
    pub fn dropping_connection_on(mut self, episode_name: &str) -> Self {
        self.drop_connection_on = Some(episode_name.to_string());
        self
    }

    pub fn with_hits(mut self, hits: Vec<SearchHit>) -> Self {
        self.hits = hits;
        self
    }

    pub fn failing_search(mut self) -> Self {
        self.search_fails = true;
        self
    }

    pub fn delaying(mut self, episode_name: &str, millis: u64) -> Self {
        self.delays
            .insert(episode_name.to_string(), Duration::from_millis(millis));
        self
    }

    pub fn submitted(&self) -> Vec<Episode> {
        self.submitted.lock().unwrap().clone()
    }

    pub fn submitted_names(&self) -> Vec<String> {
        self.submitted().into_iter().map(|e| e.name).collect()
    }

    pub fn searches(&self) -> Vec<(String, usize)> {
        self.searches.lock().unwrap().clone()
    }

    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GraphEngine for MockEngine {
    async fn submit(&self, episode: &Episode) -> Result<ExtractionResult, EngineError> {
        if let Some(delay) = self.delays.get(&episode.name) {
            tokio::time::sleep(*delay).await;
        }
        if self.drop_connection_on.as_deref() == Some(episode.name.as_str()) {
            return Err(EngineError::Unavailable("connection refused".into()));
        }
        if self.reject.contains(&episode.name) {
            return Err(EngineError::Extraction("model returned malformed output".into()));
        }
        self.submitted.lock().unwrap().push(episode.clone());
        Ok(ExtractionResult::default())
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>, EngineError> {
        self.searches.lock().unwrap().push((query.to_string(), limit));
        if self.search_fails {
            return Err(EngineError::Search("index missing".into()));
        }
        Ok(self.hits.iter().take(limit).cloned().collect())
    }

    async fn close(&self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}

/// Hands out the same engine on every connect, or refuses when offline.
pub struct MockConnector {
    pub engine: Arc<MockEngine>,
    pub online: bool,
}

impl MockConnector {
    pub fn online(engine: Arc<MockEngine>) -> Self {
        Self {
            engine,
            online: true,
        }
    }

    pub fn offline() -> Self {
        Self {
            engine: Arc::new(MockEngine::new()),
            online: false,
        }
    }
}

#[async_trait]
impl EngineConnector for MockConnector {
    async fn connect(&self) -> Result<Arc<dyn GraphEngine>, EngineError> {
        if !self.online {
            return Err(EngineError::Unavailable("connection refused".into()));
        }
        Ok(self.engine.clone())
    }
}
