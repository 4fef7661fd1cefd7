//! Retrieval engine module
//!
//! Provides:
//! - Keyword-boost re-ranking over raw index scores
//! - Single-stage slide and deck retrieval
//! - Cascading deck-to-slide retrieval

mod orchestrator;
mod rerank;

pub use orchestrator::{Retriever, RetrieverConfig};
pub use rerank::{rerank, RankedRecord};

use serde::{Deserialize, Serialize};

/// Retrieval mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    /// Fine-grained slide-level retrieval with keyword boosting
    Slides,

    /// Coarse deck-level retrieval, index order
    Decks,

    /// Two-stage: deck search narrows the candidate set, slide search runs
    /// restricted to it
    Cascade,
}

impl std::str::FromStr for SearchMode {
    type Err = crate::error::DeckFindError;

    fn from_str(s: &str) -> crate::error::Result<Self> {
        match s.to_lowercase().as_str() {
            "slides" => Ok(SearchMode::Slides),
            "decks" => Ok(SearchMode::Decks),
            "cascade" => Ok(SearchMode::Cascade),
            other => Err(crate::error::DeckFindError::InvalidInput(format!(
                "unknown search mode: {} (expected slides, decks, or cascade)",
                other
            ))),
        }
    }
}
