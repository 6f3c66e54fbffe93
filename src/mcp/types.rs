//! Request and response types for MCP tools.

use rmcp::schemars::JsonSchema;
use serde::{Deserialize, Serialize};

// ============================================================
// Request Types
// ============================================================

#[derive(Debug, Deserialize, JsonSchema)]
pub struct QueryGraphRequest {
    #[schemars(
        description = "Natural-language question about tasks, projects, content or how they relate"
    )]
    pub question: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct GetRelationshipsRequest {
    #[schemars(
        description = "Name of the entity to find connections for, e.g. a project or person"
    )]
    pub entity: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct SyncCollectionRequest {
    #[schemars(description = "Which records to sync: 'tasks', 'projects', 'content' or 'all'")]
    pub kind: String,
}

// ============================================================
// Response Types
// ============================================================

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct SyncSummary {
    /// Collections synced, in sync order
    pub collections: Vec<CollectionSummary>,
    /// Records submitted successfully across all collections
    pub synced_count: usize,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct CollectionSummary {
    pub kind: String,
    pub attempted: usize,
    pub succeeded: usize,
}
