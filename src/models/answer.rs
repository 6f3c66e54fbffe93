use serde::{Deserialize, Serialize};

use super::SearchHit;

/// Coarse trust label attached to a synthesized answer.
///
/// `Low` means the graph returned nothing; any hit yields `High`. `Medium`
/// is part of the vocabulary but no current rule produces it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Confidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

/// A natural-language answer with the graph facts behind it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub text: String,
    /// Hits in engine ranking order.
    pub supporting_facts: Vec<SearchHit>,
    pub confidence: Confidence,
}
