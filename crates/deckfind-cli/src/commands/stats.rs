//! Stats command

use crate::app::OutputFormat;
use anyhow::Result;
use deckfind_core::{Config, PineconeIndex, VectorIndex};

pub async fn run(config: &Config, format: OutputFormat) -> Result<()> {
    let index = PineconeIndex::new(config.index.clone())?;
    let stats = index.stats().await?;

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "total_records": stats.total_records,
                "dimension": stats.dimension,
                "namespaces": stats.namespaces,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Cli => {
            println!("Total records: {}", stats.total_records);
            if let Some(dim) = stats.dimension {
                println!("Dimension:     {}", dim);
            }
            let mut namespaces: Vec<_> = stats.namespaces.iter().collect();
            namespaces.sort();
            for (name, count) in namespaces {
                println!("  {:<12} {}", name, count);
            }
        }
    }

    Ok(())
}
