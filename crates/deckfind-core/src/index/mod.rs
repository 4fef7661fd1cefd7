//! Vector index integration
//!
//! Defines the record model shared by retrieval and ingestion, the
//! `VectorIndex` collaborator trait, and the HTTP client implementation.

mod pinecone;

pub use pinecone::PineconeIndex;

use crate::error::Result;
use crate::filter::IndexFilter;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Metadata field names used in the index
pub mod fields {
    pub const KIND: &str = "type";
    pub const COMPANY: &str = "company";
    pub const INDUSTRY: &str = "industry";
    pub const KEYWORDS: &str = "keywords";
    pub const YEAR: &str = "year";
    pub const DECK_ID: &str = "deck_id";
    pub const SLIDE_NUMBER: &str = "slide_number";
    pub const PREVIEW: &str = "preview";
}

/// Granularity of an indexed record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordKind {
    /// Summary-level record for a whole presentation
    #[serde(rename = "deck_metadata")]
    Deck,

    /// One page/unit of a deck, linked via `deck_id`
    #[serde(rename = "slide")]
    Slide,
}

impl RecordKind {
    /// Wire name stored in the index `type` field
    pub fn wire_name(&self) -> &'static str {
        match self {
            RecordKind::Deck => "deck_metadata",
            RecordKind::Slide => "slide",
        }
    }
}

/// One retrieved item with its raw similarity score
///
/// The ranking logic only depends on the typed subset below; anything else
/// the index returns lands in `extra` and is carried for display only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredRecord {
    /// Index-assigned identifier, stable across queries
    pub id: String,

    /// Similarity score in [0,1]; mutated only by re-ranking
    pub score: f64,

    #[serde(rename = "type")]
    pub kind: RecordKind,

    /// Descriptive tags attached at indexing time
    #[serde(default)]
    pub keywords: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,

    /// Parent-document reference (set on slide records)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deck_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slide_number: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview: Option<String>,

    /// Display-only payload fields the core never interprets
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Record prepared for upsert: embeddable text plus metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexRecord {
    pub id: String,
    pub kind: RecordKind,

    /// Text sent to the embedding model
    pub text: String,

    pub keywords: Vec<String>,
    pub company: Option<String>,
    pub industry: Option<String>,
    pub deck_id: Option<String>,
    pub slide_number: Option<u32>,
    pub year: Option<i64>,
    pub preview: Option<String>,
    pub image_url: Option<String>,
}

/// Per-namespace and total record counts
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndexStats {
    pub total_records: u64,
    pub namespaces: HashMap<String, u64>,
    pub dimension: Option<usize>,
}

/// Namespaced, metadata-filterable nearest-neighbor index
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Top-k nearest-neighbor query against one namespace, ordered by the
    /// index's native similarity score descending. Zero matches is an empty
    /// vec, not an error.
    async fn query(
        &self,
        namespace: &str,
        vector: &[f32],
        top_k: usize,
        filter: Option<&IndexFilter>,
    ) -> Result<Vec<ScoredRecord>>;

    /// Upsert pre-embedded records into a namespace. Returns the number of
    /// records written.
    async fn upsert(
        &self,
        namespace: &str,
        records: &[(IndexRecord, Vec<f32>)],
    ) -> Result<usize>;

    /// Index-wide statistics
    async fn stats(&self) -> Result<IndexStats>;
}
