use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::models::{Answer, EpisodeKind};
use crate::service::{AppState, ServiceError};

// ============================================================
// Request / Response Types
// ============================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRequest {
    pub question: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResult {
    pub content: String,
    /// Hits are pre-ranked by the engine; every returned hit is relevant.
    pub relevance: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResponse {
    pub answer: String,
    pub results: Vec<QueryResult>,
    pub confidence: String,
}

impl From<Answer> for QueryResponse {
    fn from(answer: Answer) -> Self {
        Self {
            answer: answer.text,
            results: answer
                .supporting_facts
                .iter()
                .map(|hit| QueryResult {
                    content: hit.content(),
                    relevance: "high".to_string(),
                })
                .collect(),
            confidence: answer.confidence.as_str().to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncResponse {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub synced_count: usize,
}

// ============================================================
// Error Handling
// ============================================================

/// Map a service failure to a status code.
///
/// An uninitialized or unreachable engine is a 503; anything else is a 500
/// carrying the error message under the given context.
fn service_error(context: &str, e: ServiceError) -> (StatusCode, String) {
    if e.is_unavailable() {
        tracing::warn!("{}: {}", context, e);
        return (StatusCode::SERVICE_UNAVAILABLE, e.to_string());
    }

    tracing::error!("{}: {}", context, e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        format!("{}: {}", context, e),
    )
}

type AnswerResult = Result<Json<QueryResponse>, (StatusCode, String)>;

// ============================================================
// Health
// ============================================================

pub async fn root() -> impl IntoResponse {
    Json(serde_json::json!({
        "service": "dashboard-graph",
        "status": "running",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "ready": state.is_ready().await,
    }))
}

// ============================================================
// Questions
// ============================================================

pub async fn query(State(state): State<AppState>, Json(req): Json<QueryRequest>) -> AnswerResult {
    state
        .query(&req.question)
        .await
        .map(|a| Json(a.into()))
        .map_err(|e| service_error("Query failed", e))
}

pub async fn task_insights(State(state): State<AppState>) -> AnswerResult {
    state
        .task_insights()
        .await
        .map(|a| Json(a.into()))
        .map_err(|e| service_error("Failed to get insights", e))
}

pub async fn project_overview(State(state): State<AppState>) -> AnswerResult {
    state
        .project_overview()
        .await
        .map(|a| Json(a.into()))
        .map_err(|e| service_error("Failed to get overview", e))
}

pub async fn relationships(
    State(state): State<AppState>,
    Path(entity): Path<String>,
) -> AnswerResult {
    state
        .relationships_for(&entity)
        .await
        .map(|a| Json(a.into()))
        .map_err(|e| service_error("Failed to get relationships", e))
}

// ============================================================
// Sync
// ============================================================

pub async fn sync_all(
    State(state): State<AppState>,
) -> Result<Json<SyncResponse>, (StatusCode, String)> {
    let report = state
        .sync_all()
        .await
        .map_err(|e| service_error("Sync failed", e))?;

    Ok(Json(SyncResponse {
        status: "success".to_string(),
        message: Some("Full sync completed".to_string()),
        synced_count: report.total(),
    }))
}

async fn sync_one(
    state: AppState,
    kind: EpisodeKind,
) -> Result<Json<SyncResponse>, (StatusCode, String)> {
    let outcome = state
        .sync_collection(kind)
        .await
        .map_err(|e| service_error(&format!("{} sync failed", kind.label()), e))?;

    Ok(Json(SyncResponse {
        status: "success".to_string(),
        message: None,
        synced_count: outcome.succeeded,
    }))
}

pub async fn sync_tasks(
    State(state): State<AppState>,
) -> Result<Json<SyncResponse>, (StatusCode, String)> {
    sync_one(state, EpisodeKind::Task).await
}

pub async fn sync_projects(
    State(state): State<AppState>,
) -> Result<Json<SyncResponse>, (StatusCode, String)> {
    sync_one(state, EpisodeKind::Project).await
}

pub async fn sync_content(
    State(state): State<AppState>,
) -> Result<Json<SyncResponse>, (StatusCode, String)> {
    sync_one(state, EpisodeKind::Content).await
}
