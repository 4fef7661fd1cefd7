//! LLM trait definitions

use crate::error::Result;
use crate::vocab::KnownVocabulary;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Embedding generation trait
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Generate embedding for single text
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embeddings for batch of texts
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Get embedding dimensions
    fn dimensions(&self) -> usize;

    /// Get model name
    fn model_name(&self) -> &str;
}

/// Query enhancement trait
///
/// Contract: `matched_keywords` in the returned value must be verified
/// members of the supplied vocabulary. Implementations filter model output
/// accordingly; the upstream call is the unverified boundary.
#[async_trait]
pub trait QueryEnhancer: Send + Sync {
    /// Improve a free-text query and extract vocabulary-exact entities
    async fn enhance(&self, query: &str, vocabulary: &KnownVocabulary)
        -> Result<EnhancedQuery>;

    /// Get model name
    fn model_name(&self) -> &str;
}

/// Enhancement output
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnhancedQuery {
    /// Reformulated query text used for embedding
    pub improved_query: String,

    /// Vocabulary-verified keywords for boost re-ranking
    #[serde(default)]
    pub matched_keywords: Vec<String>,

    /// Industry the query targets, if recognized
    #[serde(default)]
    pub target_industry: Option<String>,

    /// Company the query targets, if recognized
    #[serde(default)]
    pub target_company: Option<String>,
}

impl EnhancedQuery {
    /// Pass-through result used when enhancement is skipped or fails:
    /// raw query, no matched keywords, so re-ranking degenerates to a
    /// truncation by original score.
    pub fn unenhanced(query: &str) -> Self {
        Self {
            improved_query: query.to_string(),
            ..Default::default()
        }
    }
}
