//! Question answering over the knowledge graph.
//!
//! A question goes straight to the engine's search; the ranked hits are
//! trusted as-is and the top three are enumerated into a short summary.

use std::sync::Arc;

use thiserror::Error;

use crate::graph::{EngineError, GraphEngine};
use crate::models::{Answer, Confidence, SearchHit};

/// Hits requested from the engine per question.
pub const SEARCH_LIMIT: usize = 5;

/// Hits enumerated in the answer text.
pub const SUMMARY_HITS: usize = 3;

pub const NOT_ENOUGH_INFORMATION: &str =
    "I don't have enough information in the knowledge graph to answer that question yet.";

const TASK_INSIGHTS_QUESTION: &str = "What tasks are in progress? What are the priorities?";
const PROJECT_OVERVIEW_QUESTION: &str = "What projects exist? What is their status?";

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("Graph engine unavailable: {0}")]
    Unavailable(String),

    #[error("Search failed: {0}")]
    Search(String),
}

impl From<EngineError> for QueryError {
    fn from(e: EngineError) -> Self {
        match e {
            EngineError::Unavailable(msg) => Self::Unavailable(msg),
            EngineError::Closed => Self::Unavailable(EngineError::Closed.to_string()),
            EngineError::Search(msg) | EngineError::Extraction(msg) => Self::Search(msg),
        }
    }
}

pub struct AnswerEngine {
    engine: Arc<dyn GraphEngine>,
}

impl AnswerEngine {
    pub fn new(engine: Arc<dyn GraphEngine>) -> Self {
        Self { engine }
    }

    /// Answer a natural-language question from the graph.
    ///
    /// "Nothing found" is a low-confidence answer; a failed search is an
    /// error.
    pub async fn answer(&self, question: &str) -> Result<Answer, QueryError> {
        tracing::info!("Processing query: {}", question);

        if question.trim().is_empty() {
            return Ok(not_enough_information());
        }

        let hits = self.engine.search(question, SEARCH_LIMIT).await?;
        tracing::debug!("Search returned {} hit(s)", hits.len());

        if hits.is_empty() {
            return Ok(not_enough_information());
        }

        Ok(Answer {
            text: summarize(&hits),
            supporting_facts: hits,
            confidence: Confidence::High,
        })
    }

    pub async fn task_insights(&self) -> Result<Answer, QueryError> {
        self.answer(TASK_INSIGHTS_QUESTION).await
    }

    pub async fn project_overview(&self) -> Result<Answer, QueryError> {
        self.answer(PROJECT_OVERVIEW_QUESTION).await
    }

    pub async fn relationships_for(&self, entity: &str) -> Result<Answer, QueryError> {
        self.answer(&relationships_question(entity)).await
    }

    /// Release the underlying engine session.
    pub async fn close(&self) {
        self.engine.close().await;
    }
}

pub fn relationships_question(entity: &str) -> String {
    format!("What is related to {}? What are the connections?", entity)
}

fn not_enough_information() -> Answer {
    Answer {
        text: NOT_ENOUGH_INFORMATION.to_string(),
        supporting_facts: Vec::new(),
        confidence: Confidence::Low,
    }
}

fn summarize(hits: &[SearchHit]) -> String {
    let mut text = format!(
        "Based on the knowledge graph, I found {} relevant item(s):\n\n",
        hits.len()
    );
    for (i, hit) in hits.iter().take(SUMMARY_HITS).enumerate() {
        text.push_str(&format!("{}. {}\n", i + 1, hit.content()));
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_enumerates_at_most_three() {
        let hits: Vec<SearchHit> = (1..=5)
            .map(|i| SearchHit::text(format!("fact {}", i)))
            .collect();
        let text = summarize(&hits);

        assert!(text.starts_with("Based on the knowledge graph, I found 5 relevant item(s):\n\n"));
        assert!(text.ends_with("1. fact 1\n2. fact 2\n3. fact 3\n"));
        assert!(!text.contains("fact 4"));
    }

    #[test]
    fn closed_engine_maps_to_unavailable() {
        assert!(matches!(
            QueryError::from(EngineError::Closed),
            QueryError::Unavailable(_)
        ));
        assert!(matches!(
            QueryError::from(EngineError::Search("boom".into())),
            QueryError::Search(_)
        ));
    }
}
