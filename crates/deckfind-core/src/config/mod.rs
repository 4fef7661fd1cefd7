//! Configuration management

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// LLM service configuration (chat completions + embeddings)
    #[serde(default)]
    pub llm_service: LlmServiceConfig,

    /// Vector index configuration
    #[serde(default)]
    pub index: IndexConfig,

    /// Retrieval tuning knobs
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// Path to the known-vocabulary snapshot (companies, industries, keywords)
    #[serde(default)]
    pub vocabulary_path: Option<PathBuf>,
}

/// LLM service configuration for external inference
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmServiceConfig {
    /// Base URL of the LLM service for chat/completions
    pub url: String,

    /// Model name for chat completions (query enhancement)
    #[serde(default = "default_chat_model")]
    pub model: String,

    /// Base URL for embeddings service (can be different from LLM URL)
    #[serde(default)]
    pub embedding_url: Option<String>,

    /// Model name for embeddings
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    /// Embedding dimensions
    #[serde(default = "default_embedding_dimensions")]
    pub embedding_dimensions: usize,

    /// API key (optional, for authenticated services)
    #[serde(default)]
    pub api_key: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl LlmServiceConfig {
    /// Get the embeddings URL (falls back to main URL if not specified)
    pub fn embeddings_url(&self) -> &str {
        self.embedding_url.as_deref().unwrap_or(&self.url)
    }
}

impl Default for LlmServiceConfig {
    fn default() -> Self {
        Self {
            url: std::env::var("DECKFIND_LLM_URL")
                .unwrap_or_else(|_| "http://localhost:8000".to_string()),
            model: default_chat_model(),
            embedding_url: std::env::var("DECKFIND_EMBEDDING_URL").ok(),
            embedding_model: default_embedding_model(),
            embedding_dimensions: std::env::var("DECKFIND_EMBEDDING_DIMS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or_else(default_embedding_dimensions),
            api_key: std::env::var("DECKFIND_LLM_API_KEY").ok(),
            timeout_secs: default_timeout(),
        }
    }
}

/// Vector index connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Base URL of the index host
    pub url: String,

    /// API key for the index service
    #[serde(default)]
    pub api_key: Option<String>,

    /// Namespace holding deck-level summary records
    #[serde(default = "default_deck_namespace")]
    pub deck_namespace: String,

    /// Namespace holding slide-level records
    #[serde(default = "default_slide_namespace")]
    pub slide_namespace: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            url: std::env::var("DECKFIND_INDEX_URL")
                .unwrap_or_else(|_| "http://localhost:5080".to_string()),
            api_key: std::env::var("DECKFIND_INDEX_API_KEY").ok(),
            deck_namespace: default_deck_namespace(),
            slide_namespace: default_slide_namespace(),
            timeout_secs: default_timeout(),
        }
    }
}

/// Retrieval tuning knobs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Candidates fetched for a slide-level search before re-ranking
    #[serde(default = "default_slide_top_k")]
    pub slide_top_k: usize,

    /// Candidates fetched for a deck-level search
    #[serde(default = "default_deck_top_k")]
    pub deck_top_k: usize,

    /// Decks fetched by cascade stage 1 to narrow the slide search
    #[serde(default = "default_cascade_deck_top_k")]
    pub cascade_deck_top_k: usize,

    /// Final result count returned to the caller
    #[serde(default = "default_final_count")]
    pub final_count: usize,

    /// Additive score boost per distinct matched keyword
    #[serde(default = "default_boost_per_match")]
    pub boost_per_match: f64,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            slide_top_k: default_slide_top_k(),
            deck_top_k: default_deck_top_k(),
            cascade_deck_top_k: default_cascade_deck_top_k(),
            final_count: default_final_count(),
            boost_per_match: default_boost_per_match(),
        }
    }
}

fn default_chat_model() -> String {
    std::env::var("DECKFIND_LLM_MODEL")
        .unwrap_or_else(|_| "meta-llama/Llama-3.1-8B-Instruct".to_string())
}

fn default_embedding_model() -> String {
    std::env::var("DECKFIND_EMBEDDING_MODEL")
        .unwrap_or_else(|_| "multilingual-e5-large".to_string())
}

fn default_embedding_dimensions() -> usize {
    1024
}

fn default_timeout() -> u64 {
    30
}

fn default_deck_namespace() -> String {
    "decks".to_string()
}

fn default_slide_namespace() -> String {
    "slides".to_string()
}

fn default_slide_top_k() -> usize {
    20
}

fn default_deck_top_k() -> usize {
    10
}

fn default_cascade_deck_top_k() -> usize {
    3
}

fn default_final_count() -> usize {
    5
}

fn default_boost_per_match() -> f64 {
    0.15
}

impl Config {
    /// Load config from default path
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::default_path())
    }

    /// Load config from an explicit path, falling back to env-based defaults
    /// if the file does not exist
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = serde_yaml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Save config to default path
    pub fn save(&self) -> Result<()> {
        let path = Self::default_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get default config path
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(crate::CONFIG_DIR_NAME)
            .join("config.yml")
    }
}
