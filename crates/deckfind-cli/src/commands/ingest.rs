//! Ingest command

use crate::app::IngestArgs;
use anyhow::Result;
use deckfind_core::{Config, HttpEmbedder, Ingestor, OpenAiClient, PineconeIndex};
use std::sync::Arc;

pub async fn run(args: IngestArgs, config: &Config) -> Result<()> {
    let llm_client = Arc::new(OpenAiClient::new(config.llm_service.clone())?);
    let embedder = Arc::new(HttpEmbedder::new(llm_client));
    let index = Arc::new(PineconeIndex::new(config.index.clone())?);

    let ingestor = Ingestor::new(
        embedder,
        index,
        config.index.deck_namespace.clone(),
        config.index.slide_namespace.clone(),
    );

    let report = ingestor.ingest_path(&args.path).await?;

    println!(
        "Ingested {} document{}, {} records written",
        report.ingested.len(),
        if report.ingested.len() == 1 { "" } else { "s" },
        report.records_written
    );
    for doc_id in &report.ingested {
        println!("  {}", doc_id);
    }

    if !report.failed.is_empty() {
        eprintln!("{} file(s) failed:", report.failed.len());
        for (path, reason) in &report.failed {
            eprintln!("  {}: {}", path.display(), reason);
        }
        anyhow::bail!("{} file(s) failed to ingest", report.failed.len());
    }

    Ok(())
}
