//! Ingestion-side record transformation
//!
//! Turns extracted deck metadata JSON (one file per PDF, produced by the
//! upstream extraction pipeline) into index records: one deck-level summary
//! record plus one record per slide, then embeds and upserts them. Per-file
//! failures are logged and skipped so one malformed document does not abort
//! a bulk run.

use crate::error::{DeckFindError, Result};
use crate::index::{IndexRecord, RecordKind, VectorIndex};
use crate::llm::Embedder;
use crate::vocab::KnownVocabulary;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Texts embedded per request during ingestion
const EMBED_BATCH_SIZE: usize = 32;

/// Maximum preview length stored with a record
const PREVIEW_MAX_CHARS: usize = 200;

/// Parsed `*_metadata.json` document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeckDocument {
    pub deck_metadata: DeckMetadata,

    #[serde(default)]
    pub slide_data: Vec<SlideData>,
}

/// Deck-level fields from the extraction pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeckMetadata {
    pub filename: String,

    #[serde(default)]
    pub company_name: Option<String>,

    #[serde(default)]
    pub deck_industry: Option<String>,

    #[serde(default)]
    pub executive_summary: Option<String>,

    #[serde(default)]
    pub total_pages: Option<u32>,

    #[serde(default)]
    pub created_date: Option<String>,
}

/// Per-slide fields from the extraction pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlideData {
    pub slide_number: u32,

    #[serde(default)]
    pub slide_content: Option<String>,

    #[serde(default)]
    pub slide_summary: Option<String>,

    #[serde(default)]
    pub keywords: Vec<String>,

    #[serde(default)]
    pub slide_layout: Option<String>,

    #[serde(default)]
    pub image_url: Option<String>,
}

impl DeckDocument {
    /// Load from a metadata JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let doc: DeckDocument = serde_json::from_str(&content)?;
        Ok(doc)
    }

    /// Document identifier derived from the filename stem
    pub fn doc_id(&self) -> String {
        sanitize_id(&self.deck_metadata.filename)
    }
}

/// Derive an ASCII-safe document id from a filename. Non-alphanumeric runs
/// collapse to a single underscore; a filename with no ASCII content falls
/// back to a timestamped id.
pub fn sanitize_id(filename: &str) -> String {
    let stem = filename
        .rsplit('/')
        .next()
        .unwrap_or(filename)
        .trim_end_matches(".pdf")
        .trim_end_matches(".PDF");

    let mut id = String::with_capacity(stem.len());
    let mut last_was_sep = true;
    for c in stem.chars() {
        if c.is_ascii_alphanumeric() {
            id.push(c.to_ascii_lowercase());
            last_was_sep = false;
        } else if !last_was_sep {
            id.push('_');
            last_was_sep = true;
        }
    }
    let id = id.trim_matches('_').to_string();

    if id.is_empty() {
        let generated = format!("doc_{}", chrono::Utc::now().format("%Y%m%d_%H%M%S"));
        tracing::warn!(
            "Filename {:?} contains no ASCII characters, using generated id {}",
            filename,
            generated
        );
        generated
    } else {
        id
    }
}

/// Creation year parsed from the extraction pipeline's `created_date`
/// string. The format varies, so this scans for the first plausible
/// four-digit year.
pub fn parse_year(created_date: &str) -> Option<i64> {
    let digits: Vec<char> = created_date.chars().collect();
    for window in digits.windows(4) {
        if window.iter().all(|c| c.is_ascii_digit()) {
            let year: i64 = window.iter().collect::<String>().parse().ok()?;
            if (1990..=2100).contains(&year) {
                return Some(year);
            }
        }
    }
    None
}

/// Build index records for a document: one deck summary record plus one
/// record per slide.
pub fn build_records(doc: &DeckDocument) -> Vec<IndexRecord> {
    let doc_id = doc.doc_id();
    let meta = &doc.deck_metadata;
    let year = meta.created_date.as_deref().and_then(parse_year);

    let mut records = Vec::with_capacity(doc.slide_data.len() + 1);

    records.push(IndexRecord {
        id: format!("{}_meta", doc_id),
        kind: RecordKind::Deck,
        text: deck_text(meta),
        keywords: vec![],
        company: meta.company_name.clone(),
        industry: meta.deck_industry.clone(),
        deck_id: Some(doc_id.clone()),
        slide_number: None,
        year,
        preview: meta.executive_summary.as_deref().map(preview),
        image_url: None,
    });

    for slide in &doc.slide_data {
        records.push(IndexRecord {
            id: format!("{}_slide_{:03}", doc_id, slide.slide_number),
            kind: RecordKind::Slide,
            text: slide_text(slide),
            keywords: slide.keywords.clone(),
            company: meta.company_name.clone(),
            industry: meta.deck_industry.clone(),
            deck_id: Some(doc_id.clone()),
            slide_number: Some(slide.slide_number),
            year,
            preview: slide
                .slide_summary
                .as_deref()
                .or(slide.slide_content.as_deref())
                .map(preview),
            image_url: slide.image_url.clone(),
        });
    }

    records
}

/// Searchable text for the deck summary record
fn deck_text(meta: &DeckMetadata) -> String {
    let mut parts = vec![format!("Filename: {}", meta.filename)];
    if let Some(ref industry) = meta.deck_industry {
        parts.push(format!("Industry: {}", industry));
    }
    if let Some(ref company) = meta.company_name {
        parts.push(format!("Company: {}", company));
    }
    if let Some(ref summary) = meta.executive_summary {
        parts.push(format!("Summary: {}", summary));
    }
    parts.join("\n")
}

/// Searchable text for a slide record
fn slide_text(slide: &SlideData) -> String {
    let mut parts = Vec::new();
    if let Some(ref content) = slide.slide_content {
        parts.push(format!("Content: {}", content));
    }
    if let Some(ref summary) = slide.slide_summary {
        parts.push(format!("Summary: {}", summary));
    }
    if !slide.keywords.is_empty() {
        parts.push(format!("Keywords: {}", slide.keywords.join(", ")));
    }
    if parts.is_empty() {
        format!("Slide {}", slide.slide_number)
    } else {
        parts.join("\n")
    }
}

fn preview(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.chars().count() <= PREVIEW_MAX_CHARS {
        trimmed.to_string()
    } else {
        let cut: String = trimmed.chars().take(PREVIEW_MAX_CHARS).collect();
        format!("{}...", cut)
    }
}

/// Outcome of a bulk ingest run
#[derive(Debug, Default)]
pub struct IngestReport {
    /// Document ids successfully written
    pub ingested: Vec<String>,

    /// Files that failed, with the failure reason
    pub failed: Vec<(PathBuf, String)>,

    /// Total records upserted
    pub records_written: usize,
}

/// Embeds and upserts deck documents
pub struct Ingestor {
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn VectorIndex>,
    deck_namespace: String,
    slide_namespace: String,
}

impl Ingestor {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        index: Arc<dyn VectorIndex>,
        deck_namespace: impl Into<String>,
        slide_namespace: impl Into<String>,
    ) -> Self {
        Self {
            embedder,
            index,
            deck_namespace: deck_namespace.into(),
            slide_namespace: slide_namespace.into(),
        }
    }

    /// Ingest a single document: build records, embed in batches, upsert
    /// deck and slide records into their namespaces. Returns the number of
    /// records written.
    pub async fn ingest_document(&self, doc: &DeckDocument) -> Result<usize> {
        let records = build_records(doc);
        tracing::info!(
            "Ingesting {} ({} records)",
            doc.doc_id(),
            records.len()
        );

        let mut embedded = Vec::with_capacity(records.len());
        for chunk in records.chunks(EMBED_BATCH_SIZE) {
            let texts: Vec<String> = chunk.iter().map(|r| r.text.clone()).collect();
            let vectors = self.embedder.embed_batch(&texts).await?;
            embedded.extend(chunk.iter().cloned().zip(vectors));
        }

        let (decks, slides): (Vec<_>, Vec<_>) = embedded
            .into_iter()
            .partition(|(record, _)| record.kind == RecordKind::Deck);

        let mut written = 0;
        if !decks.is_empty() {
            written += self.index.upsert(&self.deck_namespace, &decks).await?;
        }
        if !slides.is_empty() {
            written += self.index.upsert(&self.slide_namespace, &slides).await?;
        }

        Ok(written)
    }

    /// Ingest a metadata file or every `*_metadata.json` in a directory.
    /// Individual failures are recorded in the report and the run
    /// continues.
    pub async fn ingest_path(&self, path: &Path) -> Result<IngestReport> {
        let files = metadata_files(path)?;
        if files.is_empty() {
            return Err(DeckFindError::DocumentNotFound(format!(
                "no metadata JSON files under {}",
                path.display()
            )));
        }

        let mut report = IngestReport::default();
        for file in files {
            match DeckDocument::load(&file) {
                Ok(doc) => match self.ingest_document(&doc).await {
                    Ok(written) => {
                        report.records_written += written;
                        report.ingested.push(doc.doc_id());
                    }
                    Err(e) => {
                        tracing::warn!("Failed to ingest {}: {}", file.display(), e);
                        report.failed.push((file, e.to_string()));
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to parse {}: {}", file.display(), e);
                    report.failed.push((file, e.to_string()));
                }
            }
        }

        tracing::info!(
            "Ingest complete: {} documents, {} records, {} failures",
            report.ingested.len(),
            report.records_written,
            report.failed.len()
        );

        Ok(report)
    }
}

/// Derive a vocabulary snapshot from the companies, industries, and slide
/// keywords observed in a document corpus.
pub fn vocabulary_from_documents(path: &Path) -> Result<KnownVocabulary> {
    let files = metadata_files(path)?;
    let mut vocab = KnownVocabulary::default();

    for file in files {
        match DeckDocument::load(&file) {
            Ok(doc) => {
                let meta = &doc.deck_metadata;
                vocab.absorb(meta.company_name.as_deref(), meta.deck_industry.as_deref(), &[]);
                for slide in &doc.slide_data {
                    vocab.absorb(None, None, &slide.keywords);
                }
            }
            Err(e) => {
                tracing::warn!("Skipping {}: {}", file.display(), e);
            }
        }
    }

    Ok(vocab)
}

/// A single metadata file, or every `*_metadata.json` directly under a
/// directory.
fn metadata_files(path: &Path) -> Result<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }

    let mut files: Vec<PathBuf> = std::fs::read_dir(path)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .map(|n| n.ends_with("_metadata.json"))
                .unwrap_or(false)
        })
        .collect();
    files.sort();
    Ok(files)
}
