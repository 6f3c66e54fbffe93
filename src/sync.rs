//! Sync orchestration: source records → episodes → graph engine.
//!
//! A pass walks one or more collections. Within a collection records are
//! submitted in fetch order and each record's failure is recorded against
//! that record only; the pass carries on and reports a tally at the end.
//! Only a lost engine session stops a pass early.

use std::sync::{Arc, Mutex};

use futures_util::stream::{self, StreamExt, TryStreamExt};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::episode;
use crate::graph::{EngineError, GraphEngine};
use crate::models::{BatchResult, EpisodeKind, Record, SyncOutcome, SyncReport};
use crate::source::{RecordSource, SourceError};

#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Fetch(#[from] SourceError),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// What to do when a collection cannot be fetched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FetchFailurePolicy {
    /// Log the failure and sync the collection as if it were empty.
    #[default]
    TreatAsEmpty,
    /// Stop the pass with [`SyncError::Fetch`].
    Abort,
}

impl FetchFailurePolicy {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "empty" | "continue" => Some(Self::TreatAsEmpty),
            "abort" => Some(Self::Abort),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOptions {
    /// Records in flight at once within a collection. 1 is strictly serial.
    pub concurrency: usize,
    /// Only sync the first N records of each collection.
    pub limit: Option<usize>,
    pub fetch_policy: FetchFailurePolicy,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            concurrency: 1,
            limit: None,
            fetch_policy: FetchFailurePolicy::default(),
        }
    }
}

/// Where a pass currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    Idle,
    Fetching(EpisodeKind),
    Submitting(EpisodeKind),
    Failed,
}

pub struct Syncer {
    source: Arc<dyn RecordSource>,
    engine: Arc<dyn GraphEngine>,
    options: SyncOptions,
    phase: Mutex<SyncPhase>,
}

impl Syncer {
    pub fn new(
        source: Arc<dyn RecordSource>,
        engine: Arc<dyn GraphEngine>,
        options: SyncOptions,
    ) -> Self {
        Self {
            source,
            engine,
            options,
            phase: Mutex::new(SyncPhase::Idle),
        }
    }

    pub fn phase(&self) -> SyncPhase {
        self.phase
            .lock()
            .map(|p| *p)
            .unwrap_or(SyncPhase::Failed)
    }

    fn set_phase(&self, phase: SyncPhase) {
        debug!("Sync phase: {:?}", phase);
        if let Ok(mut current) = self.phase.lock() {
            *current = phase;
        }
    }

    /// Sync one collection and return how many records were submitted.
    pub async fn sync_one_collection(&self, kind: EpisodeKind) -> Result<usize, SyncError> {
        self.sync_collection(kind).await.map(|o| o.succeeded)
    }

    /// Sync one collection and return attempted vs. succeeded counts.
    pub async fn sync_collection(&self, kind: EpisodeKind) -> Result<SyncOutcome, SyncError> {
        info!("Syncing {}...", kind);
        self.set_phase(SyncPhase::Fetching(kind));

        let records = match self.source.fetch(kind.record_kind()).await {
            Ok(records) => records,
            Err(e) if self.options.fetch_policy == FetchFailurePolicy::TreatAsEmpty => {
                error!("{}; treating {} as empty", e, kind);
                Vec::new()
            }
            Err(e) => {
                self.set_phase(SyncPhase::Failed);
                return Err(e.into());
            }
        };

        let records: Vec<Record> = match self.options.limit {
            Some(n) => records.into_iter().take(n).collect(),
            None => records,
        };

        if records.is_empty() {
            warn!("No {} found in source", kind);
            self.set_phase(SyncPhase::Idle);
            return Ok(SyncOutcome::empty(kind));
        }

        let batch = self.sync_records(kind, records).await?;
        info!(
            "Synced {}/{} {}",
            batch.succeeded_count(),
            batch.attempted(),
            kind
        );

        Ok(SyncOutcome {
            kind,
            attempted: batch.attempted(),
            succeeded: batch.succeeded_count(),
        })
    }

    /// Format and submit a batch of records of one kind.
    ///
    /// Items are keyed by record id (or episode name when the record has no
    /// id). A format or extraction failure lands in `failed`; an engine
    /// connection failure ends the batch with an error.
    pub async fn sync_records(
        &self,
        kind: EpisodeKind,
        records: Vec<Record>,
    ) -> Result<BatchResult<String>, SyncError> {
        self.set_phase(SyncPhase::Submitting(kind));
        let total = records.len();
        let engine = self.engine.clone();

        let batch = stream::iter(records.into_iter().enumerate())
            .map(move |(i, record)| submit_record(engine.clone(), kind, record, i + 1, total))
            .buffered(self.options.concurrency.max(1))
            .try_fold(BatchResult::default(), |batch, (item, outcome)| async move {
                Ok::<_, EngineError>(match outcome {
                    Ok(()) => batch.push_ok(item),
                    Err(reason) => batch.push_err(item, reason),
                })
            })
            .await;

        match batch {
            Ok(batch) => {
                self.set_phase(SyncPhase::Idle);
                Ok(batch)
            }
            Err(e) => {
                error!("Graph engine lost while syncing {}: {}", kind, e);
                self.set_phase(SyncPhase::Failed);
                Err(e.into())
            }
        }
    }

    /// Sync tasks, then projects, then content, and release the engine
    /// session whether or not the pass succeeded.
    pub async fn sync_all(&self) -> Result<SyncReport, SyncError> {
        info!("Starting full sync");

        let result = self.sync_kinds(&EpisodeKind::SYNC_ORDER).await;
        self.engine.close().await;

        match &result {
            Ok(report) => info!(
                "Sync complete: {}/{} total items synced",
                report.total(),
                report.attempted()
            ),
            Err(e) => error!("Sync aborted: {}", e),
        }
        result
    }

    async fn sync_kinds(&self, kinds: &[EpisodeKind]) -> Result<SyncReport, SyncError> {
        let mut report = SyncReport::default();
        for &kind in kinds {
            report.outcomes.push(self.sync_collection(kind).await?);
        }
        Ok(report)
    }
}

/// Format and submit one record.
///
/// The outer error is a lost engine session; the inner one is this record's
/// own failure.
async fn submit_record(
    engine: Arc<dyn GraphEngine>,
    kind: EpisodeKind,
    record: Record,
    position: usize,
    total: usize,
) -> Result<(String, Result<(), String>), EngineError> {
    let item = record.id().unwrap_or_else(|| episode::name(kind, &record));

    let episode = match episode::format(kind, &record) {
        Ok(episode) => episode,
        Err(e) => {
            error!("[{}/{}] Failed to sync {} {}: {}", position, total, kind, item, e);
            return Ok((item, Err(e.to_string())));
        }
    };

    match engine.submit(&episode).await {
        Ok(extraction) => {
            info!(
                "[{}/{}] Synced {} ({} entities, {} edges)",
                position,
                total,
                episode.name,
                extraction.entities.len(),
                extraction.edges.len()
            );
            Ok((item, Ok(())))
        }
        Err(e) if e.is_connection() => Err(e),
        Err(e) => {
            error!("[{}/{}] Failed to sync {} {}: {}", position, total, kind, item, e);
            Ok((item, Err(e.to_string())))
        }
    }
}
