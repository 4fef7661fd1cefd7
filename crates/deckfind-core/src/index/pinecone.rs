//! Pinecone REST client for the vector index
//!
//! Speaks the index's HTTP API: `/query` for filtered nearest-neighbor
//! search, `/vectors/upsert` for ingestion, `/describe_index_stats` for
//! namespace counts. Transport failures surface as retrieval errors; retry
//! policy, if any, belongs here rather than in the orchestrator, and none
//! is applied.

use super::{IndexRecord, IndexStats, ScoredRecord, VectorIndex};
use crate::config::IndexConfig;
use crate::error::{DeckFindError, Result};
use crate::filter::IndexFilter;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::time::Duration;

/// Maximum vectors per upsert request, matching the index service limit
const UPSERT_BATCH_SIZE: usize = 96;

pub struct PineconeIndex {
    http_client: reqwest::Client,
    config: IndexConfig,
}

impl PineconeIndex {
    /// Create new index client from configuration
    pub fn new(config: IndexConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(DeckFindError::Http)?;

        Ok(Self {
            http_client,
            config,
        })
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        Self::new(IndexConfig::default())
    }

    async fn post(&self, path: &str, body: Value) -> Result<Value> {
        let url = format!("{}{}", self.config.url, path);

        let mut req = self.http_client.post(&url).json(&body);
        if let Some(ref api_key) = self.config.api_key {
            req = req.header("Api-Key", api_key);
        }

        let response = req
            .send()
            .await
            .map_err(|e| DeckFindError::Retrieval(format!("index request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(DeckFindError::Retrieval(format!(
                "index error (HTTP {}): {}",
                status, body
            )));
        }

        response
            .json()
            .await
            .map_err(|e| DeckFindError::Retrieval(format!("malformed index response: {}", e)))
    }
}

#[async_trait]
impl VectorIndex for PineconeIndex {
    async fn query(
        &self,
        namespace: &str,
        vector: &[f32],
        top_k: usize,
        filter: Option<&IndexFilter>,
    ) -> Result<Vec<ScoredRecord>> {
        let mut body = json!({
            "namespace": namespace,
            "vector": vector,
            "topK": top_k,
            "includeMetadata": true,
        });
        if let Some(f) = filter {
            body["filter"] = f.to_value();
        }

        let response = self.post("/query", body).await?;

        #[derive(Deserialize)]
        struct QueryResponse {
            #[serde(default)]
            matches: Vec<QueryMatch>,
        }

        #[derive(Deserialize)]
        struct QueryMatch {
            id: String,
            score: f64,
            #[serde(default)]
            metadata: serde_json::Map<String, Value>,
        }

        let parsed: QueryResponse = serde_json::from_value(response)
            .map_err(|e| DeckFindError::Retrieval(format!("malformed query response: {}", e)))?;

        let mut records = Vec::with_capacity(parsed.matches.len());
        for m in parsed.matches {
            let mut merged = m.metadata;
            merged.insert("id".to_string(), Value::String(m.id.clone()));
            merged.insert("score".to_string(), json!(m.score));

            match serde_json::from_value::<ScoredRecord>(Value::Object(merged)) {
                Ok(record) => records.push(record),
                Err(e) => {
                    tracing::warn!("Skipping malformed record {}: {}", m.id, e);
                }
            }
        }

        tracing::debug!(
            "Index query: namespace={} topK={} -> {} records",
            namespace,
            top_k,
            records.len()
        );

        Ok(records)
    }

    async fn upsert(
        &self,
        namespace: &str,
        records: &[(IndexRecord, Vec<f32>)],
    ) -> Result<usize> {
        let mut written = 0;

        for batch in records.chunks(UPSERT_BATCH_SIZE) {
            let vectors: Vec<Value> = batch
                .iter()
                .map(|(record, values)| {
                    json!({
                        "id": record.id,
                        "values": values,
                        "metadata": record_metadata(record),
                    })
                })
                .collect();

            let body = json!({
                "namespace": namespace,
                "vectors": vectors,
            });

            let response = self.post("/vectors/upsert", body).await?;
            written += response["upsertedCount"]
                .as_u64()
                .unwrap_or(batch.len() as u64) as usize;

            tracing::debug!(
                "Upserted batch of {} records to namespace {}",
                batch.len(),
                namespace
            );
        }

        Ok(written)
    }

    async fn stats(&self) -> Result<IndexStats> {
        let response = self.post("/describe_index_stats", json!({})).await?;

        #[derive(Deserialize)]
        struct StatsResponse {
            #[serde(default)]
            namespaces: HashMap<String, NamespaceStats>,
            #[serde(rename = "totalVectorCount", default)]
            total_vector_count: u64,
            #[serde(default)]
            dimension: Option<usize>,
        }

        #[derive(Deserialize)]
        struct NamespaceStats {
            #[serde(rename = "vectorCount", default)]
            vector_count: u64,
        }

        let parsed: StatsResponse = serde_json::from_value(response)
            .map_err(|e| DeckFindError::Retrieval(format!("malformed stats response: {}", e)))?;

        Ok(IndexStats {
            total_records: parsed.total_vector_count,
            namespaces: parsed
                .namespaces
                .into_iter()
                .map(|(name, ns)| (name, ns.vector_count))
                .collect(),
            dimension: parsed.dimension,
        })
    }
}

/// Metadata payload stored with an upserted record; absent fields omitted
fn record_metadata(record: &IndexRecord) -> Value {
    let mut metadata = serde_json::Map::new();
    metadata.insert(
        super::fields::KIND.to_string(),
        Value::String(record.kind.wire_name().to_string()),
    );
    if !record.keywords.is_empty() {
        metadata.insert(super::fields::KEYWORDS.to_string(), json!(record.keywords));
    }
    if let Some(ref company) = record.company {
        metadata.insert(super::fields::COMPANY.to_string(), json!(company));
    }
    if let Some(ref industry) = record.industry {
        metadata.insert(super::fields::INDUSTRY.to_string(), json!(industry));
    }
    if let Some(ref deck_id) = record.deck_id {
        metadata.insert(super::fields::DECK_ID.to_string(), json!(deck_id));
    }
    if let Some(slide_number) = record.slide_number {
        metadata.insert(super::fields::SLIDE_NUMBER.to_string(), json!(slide_number));
    }
    if let Some(year) = record.year {
        metadata.insert(super::fields::YEAR.to_string(), json!(year));
    }
    if let Some(ref preview) = record.preview {
        metadata.insert(super::fields::PREVIEW.to_string(), json!(preview));
    }
    if let Some(ref image_url) = record.image_url {
        metadata.insert("image_url".to_string(), json!(image_url));
    }
    Value::Object(metadata)
}
