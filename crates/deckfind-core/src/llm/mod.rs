//! LLM integration
//!
//! Provides traits and implementations for:
//! - Embedding generation via external services (vLLM, OpenAI, etc.)
//! - Query enhancement with vocabulary-validated entity extraction

mod client;
mod http_embedder;
mod http_enhancer;
mod traits;

pub use client::{ApiMetrics, ChatMessage, LlmClient, MetricsSnapshot, OpenAiClient};
pub use http_embedder::HttpEmbedder;
pub use http_enhancer::HttpQueryEnhancer;
pub use traits::{Embedder, EnhancedQuery, QueryEnhancer};
