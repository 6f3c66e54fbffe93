mod handlers;

pub use handlers::{QueryRequest, QueryResponse, QueryResult, SyncResponse};

use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::service::AppState;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        // Questions
        .route("/query", post(handlers::query))
        .route("/insights/tasks", get(handlers::task_insights))
        .route("/insights/projects", get(handlers::project_overview))
        .route("/relationships/{entity}", get(handlers::relationships))
        // Sync
        .route("/sync/all", post(handlers::sync_all))
        .route("/sync/tasks", post(handlers::sync_tasks))
        .route("/sync/projects", post(handlers::sync_projects))
        .route("/sync/content", post(handlers::sync_content))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
