//! Service assembly and lifecycle.
//!
//! [`AppState`] owns the record source, the engine connector and, once
//! [`AppState::init`] has run, the long-lived answer engine. The HTTP and MCP
//! surfaces share one `AppState`; neither owns any component directly.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::RwLock;

use crate::answer::{AnswerEngine, QueryError};
use crate::config::{Config, SourceConfig};
use crate::graph::{EngineConnector, EngineError};
use crate::models::{Answer, EpisodeKind, SyncOutcome, SyncReport};
use crate::source::{RecordSource, RestSource, SqliteSource};
use crate::sync::{SyncError, SyncOptions, Syncer};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Expert agent not initialized")]
    NotInitialized,

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    Sync(#[from] SyncError),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

impl ServiceError {
    /// Whether the failure means the graph side is not usable right now.
    pub fn is_unavailable(&self) -> bool {
        match self {
            Self::NotInitialized | Self::Query(QueryError::Unavailable(_)) => true,
            Self::Engine(e) => e.is_connection(),
            _ => false,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    inner: Arc<Inner>,
}

struct Inner {
    source: Arc<dyn RecordSource>,
    connector: Arc<dyn EngineConnector>,
    sync_options: SyncOptions,
    answers: RwLock<Option<Arc<AnswerEngine>>>,
}

impl AppState {
    pub fn new(
        source: Arc<dyn RecordSource>,
        connector: Arc<dyn EngineConnector>,
        sync_options: SyncOptions,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                source,
                connector,
                sync_options,
                answers: RwLock::new(None),
            }),
        }
    }

    /// Assemble the service from configuration. Does not contact the engine.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let source = build_source(&config.source)?;
        Ok(Self::new(
            source,
            Arc::new(config.graph.clone()),
            config.sync.clone(),
        ))
    }

    pub fn source(&self) -> Arc<dyn RecordSource> {
        self.inner.source.clone()
    }

    pub fn sync_options(&self) -> &SyncOptions {
        &self.inner.sync_options
    }

    /// Open the long-lived engine session used for answering questions.
    pub async fn init(&self) -> Result<(), EngineError> {
        let engine = self.inner.connector.connect().await?;
        let previous = self
            .inner
            .answers
            .write()
            .await
            .replace(Arc::new(AnswerEngine::new(engine)));
        if let Some(previous) = previous {
            previous.close().await;
        }
        tracing::info!("Expert agent initialized with knowledge graph access");
        Ok(())
    }

    /// Close the answer engine's session. Safe to call when not initialized.
    pub async fn shutdown(&self) {
        let answers = self.inner.answers.write().await.take();
        if let Some(answers) = answers {
            answers.close().await;
            tracing::info!("Expert agent closed");
        }
    }

    pub async fn is_ready(&self) -> bool {
        self.inner.answers.read().await.is_some()
    }

    pub async fn answers(&self) -> Result<Arc<AnswerEngine>, ServiceError> {
        self.inner
            .answers
            .read()
            .await
            .clone()
            .ok_or(ServiceError::NotInitialized)
    }

    pub async fn query(&self, question: &str) -> Result<Answer, ServiceError> {
        Ok(self.answers().await?.answer(question).await?)
    }

    pub async fn task_insights(&self) -> Result<Answer, ServiceError> {
        Ok(self.answers().await?.task_insights().await?)
    }

    pub async fn project_overview(&self) -> Result<Answer, ServiceError> {
        Ok(self.answers().await?.project_overview().await?)
    }

    pub async fn relationships_for(&self, entity: &str) -> Result<Answer, ServiceError> {
        Ok(self.answers().await?.relationships_for(entity).await?)
    }

    /// Run a full sync pass on a fresh engine session.
    pub async fn sync_all(&self) -> Result<SyncReport, ServiceError> {
        let syncer = self.syncer().await?;
        Ok(syncer.sync_all().await?)
    }

    /// Sync one collection on a fresh engine session, released afterwards.
    pub async fn sync_collection(&self, kind: EpisodeKind) -> Result<SyncOutcome, ServiceError> {
        let engine = self.inner.connector.connect().await?;
        let syncer = Syncer::new(
            self.inner.source.clone(),
            engine.clone(),
            self.inner.sync_options.clone(),
        );
        let outcome = syncer.sync_collection(kind).await;
        engine.close().await;
        Ok(outcome?)
    }

    async fn syncer(&self) -> Result<Syncer, ServiceError> {
        let engine = self.inner.connector.connect().await?;
        Ok(Syncer::new(
            self.inner.source.clone(),
            engine,
            self.inner.sync_options.clone(),
        ))
    }
}

/// Build the configured record source.
pub fn build_source(config: &SourceConfig) -> anyhow::Result<Arc<dyn RecordSource>> {
    let source: Arc<dyn RecordSource> = match config {
        SourceConfig::Rest { url, api_key } => {
            tracing::info!("Reading records from {}", url);
            Arc::new(RestSource::new(url.clone(), api_key.clone()))
        }
        SourceConfig::Sqlite { path } => {
            let source = match path {
                Some(path) => SqliteSource::open(path.clone())?,
                None => SqliteSource::open_default()?,
            };
            source.migrate()?;
            Arc::new(source)
        }
    };
    Ok(source)
}
