//! Vocabulary command

use crate::app::VocabArgs;
use anyhow::Result;
use deckfind_core::ingest::vocabulary_from_documents;

pub async fn run(args: VocabArgs) -> Result<()> {
    let vocab = vocabulary_from_documents(&args.path)?;
    vocab.save(&args.output)?;

    println!(
        "Wrote {} companies, {} industries, {} keywords to {}",
        vocab.companies.len(),
        vocab.industries.len(),
        vocab.keywords.len(),
        args.output.display()
    );

    Ok(())
}
