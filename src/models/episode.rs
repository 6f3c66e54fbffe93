use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A text document submitted to the graph engine for extraction.
///
/// The body is a pure function of the source record, so re-syncing an
/// unchanged record submits byte-identical text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Episode {
    /// `"<Kind>: <title>"`.
    pub name: String,
    pub body: String,
    /// Identifies the originating system and record kind.
    pub source_label: String,
    pub reference_time: DateTime<Utc>,
}

/// Entities and edges the engine derived from one episode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    #[serde(default)]
    pub entities: Vec<EntityNode>,
    #[serde(default)]
    pub edges: Vec<EntityEdge>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityNode {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityEdge {
    pub fact: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// One ranked item from the engine's search.
///
/// The payload is opaque; callers only ever render it as text. Ranking is
/// the engine's, and order is preserved as returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SearchHit(pub Value);

impl SearchHit {
    pub fn text(s: impl Into<String>) -> Self {
        Self(Value::String(s.into()))
    }

    /// Text form of the hit: the string itself, an edge's `fact`, or the
    /// compact JSON of anything else.
    pub fn content(&self) -> String {
        match &self.0 {
            Value::String(s) => s.clone(),
            Value::Object(map) => match map.get("fact") {
                Some(Value::String(fact)) => fact.clone(),
                _ => self.0.to_string(),
            },
            other => other.to_string(),
        }
    }
}

impl std::fmt::Display for SearchHit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.content())
    }
}
