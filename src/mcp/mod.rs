//! MCP server giving AI agents access to the knowledge graph.

mod types;

pub use types::*;

use rmcp::{
    handler::server::{tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, Content, ServerInfo},
    tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler, ServiceExt,
};
use serde::Serialize;

use crate::api::QueryResponse;
use crate::models::{Answer, EpisodeKind, SyncOutcome, SyncReport};
use crate::service::{AppState, ServiceError};

#[derive(Clone)]
pub struct McpServer {
    state: AppState,
    tool_router: ToolRouter<Self>,
}

fn to_mcp_error(e: ServiceError) -> McpError {
    McpError::internal_error(e.to_string(), None)
}

fn json_result(value: &impl Serialize) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| McpError::internal_error(e.to_string(), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

impl McpServer {
    pub fn new(state: AppState) -> Self {
        Self {
            state,
            tool_router: Self::tool_router(),
        }
    }

    fn answer_response(result: Result<Answer, ServiceError>) -> Result<QueryResponse, McpError> {
        result.map(QueryResponse::from).map_err(to_mcp_error)
    }

    // ============================================================
    // Tool logic, exposed for tests
    // ============================================================

    pub async fn query_graph_response(&self, question: &str) -> Result<QueryResponse, McpError> {
        Self::answer_response(self.state.query(question).await)
    }

    pub async fn relationships_response(&self, entity: &str) -> Result<QueryResponse, McpError> {
        Self::answer_response(self.state.relationships_for(entity).await)
    }

    pub async fn sync_summary(&self, kind: &str) -> Result<SyncSummary, McpError> {
        let report = if kind == "all" {
            self.state.sync_all().await.map_err(to_mcp_error)?
        } else {
            let kind = EpisodeKind::from_str(kind).ok_or_else(|| {
                McpError::invalid_params(
                    format!("Unknown kind '{}'; use tasks, projects, content or all", kind),
                    None,
                )
            })?;
            let outcome = self
                .state
                .sync_collection(kind)
                .await
                .map_err(to_mcp_error)?;
            SyncReport {
                outcomes: vec![outcome],
            }
        };

        Ok(SyncSummary {
            synced_count: report.total(),
            collections: report.outcomes.iter().map(collection_summary).collect(),
        })
    }
}

fn collection_summary(outcome: &SyncOutcome) -> CollectionSummary {
    CollectionSummary {
        kind: outcome.kind.as_str().to_string(),
        attempted: outcome.attempted,
        succeeded: outcome.succeeded,
    }
}

#[tool_router]
impl McpServer {
    #[tool(
        description = "Ask a natural-language question about dashboard tasks, projects and content. Returns a short answer, the supporting graph facts (best first) and a confidence of 'low' when nothing relevant was found."
    )]
    async fn query_graph(
        &self,
        params: Parameters<QueryGraphRequest>,
    ) -> Result<CallToolResult, McpError> {
        let response = self.query_graph_response(&params.0.question).await?;
        json_result(&response)
    }

    #[tool(description = "Summarize which tasks are in progress and their priorities.")]
    async fn task_insights(&self) -> Result<CallToolResult, McpError> {
        let response = Self::answer_response(self.state.task_insights().await)?;
        json_result(&response)
    }

    #[tool(description = "Summarize which projects exist and their status.")]
    async fn project_overview(&self) -> Result<CallToolResult, McpError> {
        let response = Self::answer_response(self.state.project_overview().await)?;
        json_result(&response)
    }

    #[tool(description = "Find what is connected to a named entity in the knowledge graph.")]
    async fn get_relationships(
        &self,
        params: Parameters<GetRelationshipsRequest>,
    ) -> Result<CallToolResult, McpError> {
        let response = self.relationships_response(&params.0.entity).await?;
        json_result(&response)
    }

    #[tool(
        description = "Re-sync records from the dashboard into the knowledge graph. Slow: every record is re-extracted. Side effect: submits one episode per record to the graph engine."
    )]
    async fn sync_collection(
        &self,
        params: Parameters<SyncCollectionRequest>,
    ) -> Result<CallToolResult, McpError> {
        let summary = self.sync_summary(&params.0.kind).await?;
        json_result(&summary)
    }
}

#[tool_handler]
impl ServerHandler for McpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: rmcp::model::Implementation {
                name: "dashboard-graph".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                title: None,
                icons: None,
                website_url: None,
            },
            capabilities: rmcp::model::ServerCapabilities::builder()
                .enable_tools()
                .build(),
            instructions: Some(
                r#"dashboard-graph answers questions from a knowledge graph built from dashboard records (tasks, projects, content library).

- query_graph: ask anything; check `confidence` - 'low' means the graph had nothing relevant
- task_insights / project_overview: canned summaries
- get_relationships: connections around one entity
- sync_collection: refresh the graph from the dashboard (slow, use sparingly)"#
                    .into(),
            ),
            ..Default::default()
        }
    }
}

pub async fn run_stdio_server(state: AppState) -> anyhow::Result<()> {
    use tokio::io::{stdin, stdout};

    tracing::info!("Starting MCP server via stdio");

    let service = McpServer::new(state);
    let server = service.serve((stdin(), stdout())).await?;

    let quit_reason = server.waiting().await?;
    tracing::info!("MCP server stopped: {:?}", quit_reason);

    Ok(())
}
