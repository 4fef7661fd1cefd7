//! Search command

use crate::app::{OutputFormat, SearchArgs};
use crate::output::format_results;
use anyhow::Result;
use deckfind_core::{
    Config, HttpEmbedder, HttpQueryEnhancer, KnownVocabulary, OpenAiClient, PineconeIndex,
    QueryEnhancer, RetrievalFilter, Retriever, RetrieverConfig,
};
use std::sync::Arc;

pub async fn run(args: SearchArgs, config: &Config, format: OutputFormat) -> Result<()> {
    let query = args.query.join(" ");

    let filter = RetrievalFilter {
        industry: args.industry.clone(),
        company: args.company.clone(),
        keywords: if args.keywords.is_empty() {
            None
        } else {
            Some(args.keywords.clone())
        },
        year_from: args.year_from,
        year_to: args.year_to,
        deck_ids: None,
    };

    let mut retriever_config = RetrieverConfig::from(config);
    if let Some(limit) = args.limit {
        retriever_config.final_count = limit;
    }

    let vocabulary = load_vocabulary(config);

    let llm_client = Arc::new(OpenAiClient::new(config.llm_service.clone())?);
    let embedder = Arc::new(HttpEmbedder::new(llm_client.clone()));
    let index = Arc::new(PineconeIndex::new(config.index.clone())?);

    let enhancer: Option<Arc<dyn QueryEnhancer>> = if args.no_enhance {
        None
    } else {
        Some(Arc::new(HttpQueryEnhancer::new(llm_client)))
    };

    let retriever = Retriever::new(embedder, index, enhancer, vocabulary, retriever_config);

    let results = retriever.search(&query, &filter, args.mode.into()).await?;

    if results.is_empty() {
        match format {
            OutputFormat::Cli => println!("No results."),
            OutputFormat::Json => println!("[]"),
        }
        return Ok(());
    }

    print!("{}", format_results(&results, format));
    Ok(())
}

fn load_vocabulary(config: &Config) -> Arc<KnownVocabulary> {
    let Some(ref path) = config.vocabulary_path else {
        return Arc::new(KnownVocabulary::default());
    };

    match KnownVocabulary::load(path) {
        Ok(vocab) => Arc::new(vocab),
        Err(e) => {
            tracing::warn!(
                "Could not load vocabulary from {}: {}; enhancement output will not \
                 match any known keywords",
                path.display(),
                e
            );
            Arc::new(KnownVocabulary::default())
        }
    }
}
