//! Deckfind Core Library
//!
//! Retrieval core for a pitch-deck RAG system.
//!
//! # Features
//! - Metadata filter construction over a namespaced vector index
//! - LLM query enhancement with vocabulary-validated keyword extraction
//! - Keyword-boosted re-ranking with a stable, explainable score trail
//! - Cascading deck-to-slide retrieval for higher precision
//! - Ingestion-side transformation of extracted deck metadata into records

pub mod config;
pub mod error;
pub mod filter;
pub mod index;
pub mod ingest;
pub mod llm;
pub mod search;
pub mod vocab;

pub use config::{Config, IndexConfig, LlmServiceConfig, RetrievalConfig};
pub use error::{DeckFindError, Error, Result};
pub use filter::{build_filter, IndexFilter, RetrievalFilter};
pub use index::{
    IndexRecord, IndexStats, PineconeIndex, RecordKind, ScoredRecord, VectorIndex,
};
pub use ingest::{build_records, DeckDocument, IngestReport, Ingestor};
pub use llm::{
    ChatMessage, Embedder, EnhancedQuery, HttpEmbedder, HttpQueryEnhancer, LlmClient,
    MetricsSnapshot, OpenAiClient, QueryEnhancer,
};
pub use search::{rerank, RankedRecord, Retriever, RetrieverConfig, SearchMode};
pub use vocab::KnownVocabulary;

/// Default config directory name
pub const CONFIG_DIR_NAME: &str = "deckfind";
