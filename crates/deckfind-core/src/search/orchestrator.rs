//! Retrieval orchestration
//!
//! Composes the filter builder, embedding provider, vector index, and
//! keyword re-ranker into the three retrieval modes. The orchestrator is
//! request-scoped: each call builds its working set (enhanced query,
//! embedding, filter, results) and discards it; the vocabulary snapshot is
//! the only longer-lived reference data, read-only after load. No retry or
//! caching lives here; timeouts belong to the HTTP clients.

use super::rerank::{rerank, RankedRecord};
use super::SearchMode;
use crate::config::Config;
use crate::error::Result;
use crate::filter::{build_filter, RetrievalFilter};
use crate::index::{RecordKind, ScoredRecord, VectorIndex};
use crate::llm::{Embedder, EnhancedQuery, QueryEnhancer};
use crate::vocab::KnownVocabulary;
use std::sync::Arc;

/// Namespace and tuning parameters for a retriever instance
#[derive(Debug, Clone)]
pub struct RetrieverConfig {
    pub deck_namespace: String,
    pub slide_namespace: String,
    pub slide_top_k: usize,
    pub deck_top_k: usize,
    pub cascade_deck_top_k: usize,
    pub final_count: usize,
    pub boost_per_match: f64,
}

impl From<&Config> for RetrieverConfig {
    fn from(config: &Config) -> Self {
        Self {
            deck_namespace: config.index.deck_namespace.clone(),
            slide_namespace: config.index.slide_namespace.clone(),
            slide_top_k: config.retrieval.slide_top_k,
            deck_top_k: config.retrieval.deck_top_k,
            cascade_deck_top_k: config.retrieval.cascade_deck_top_k,
            final_count: config.retrieval.final_count,
            boost_per_match: config.retrieval.boost_per_match,
        }
    }
}

/// Retrieval orchestrator
///
/// Collaborators are injected at construction and owned by the caller;
/// construct once and reuse across requests (the HTTP clients are
/// stateless). The enhancer is optional: without one, queries embed as-is
/// and re-ranking degenerates to truncation by raw score.
pub struct Retriever {
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn VectorIndex>,
    enhancer: Option<Arc<dyn QueryEnhancer>>,
    vocabulary: Arc<KnownVocabulary>,
    config: RetrieverConfig,
}

impl Retriever {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        index: Arc<dyn VectorIndex>,
        enhancer: Option<Arc<dyn QueryEnhancer>>,
        vocabulary: Arc<KnownVocabulary>,
        config: RetrieverConfig,
    ) -> Self {
        Self {
            embedder,
            index,
            enhancer,
            vocabulary,
            config,
        }
    }

    /// Run retrieval in the given mode.
    ///
    /// Deck-mode results are wrapped with a zero match count so every mode
    /// returns the same shape; only slide results are keyword-boosted.
    pub async fn search(
        &self,
        query: &str,
        filter: &RetrievalFilter,
        mode: SearchMode,
    ) -> Result<Vec<RankedRecord>> {
        match mode {
            SearchMode::Slides => self.search_slides(query, filter).await,
            SearchMode::Decks => {
                let decks = self.search_decks(query, filter).await?;
                Ok(decks.into_iter().map(unranked).collect())
            }
            SearchMode::Cascade => self.search_cascade(query, filter).await,
        }
    }

    /// Slides mode: embed, search the slide namespace, keyword-boost.
    pub async fn search_slides(
        &self,
        query: &str,
        filter: &RetrievalFilter,
    ) -> Result<Vec<RankedRecord>> {
        let enhanced = self.enhance_or_fallback(query).await;
        let filter = self.effective_filter(filter, &enhanced);
        let vector = self.embedder.embed(&enhanced.improved_query).await?;

        self.slide_stage(&vector, &enhanced, &filter, self.config.slide_top_k)
            .await
    }

    /// Decks mode: embed, search the deck namespace, return index order.
    ///
    /// Deck records are coarse summaries, so keyword boosting is not
    /// applied to them.
    pub async fn search_decks(
        &self,
        query: &str,
        filter: &RetrievalFilter,
    ) -> Result<Vec<ScoredRecord>> {
        let enhanced = self.enhance_or_fallback(query).await;
        let filter = self.effective_filter(filter, &enhanced);
        let vector = self.embedder.embed(&enhanced.improved_query).await?;

        self.deck_stage(&vector, &filter, self.config.deck_top_k).await
    }

    /// Cascade mode: a small deck search narrows the candidate documents,
    /// then the slide search runs restricted to them. Zero decks at stage 1
    /// short-circuits to an empty result; there is no fallback to an
    /// unscoped slide search.
    pub async fn search_cascade(
        &self,
        query: &str,
        filter: &RetrievalFilter,
    ) -> Result<Vec<RankedRecord>> {
        let enhanced = self.enhance_or_fallback(query).await;
        let filter = self.effective_filter(filter, &enhanced);

        // Both stages embed the same improved query, so embed once and
        // reuse the vector.
        let vector = self.embedder.embed(&enhanced.improved_query).await?;

        // deck_ids only ever restricts the slide stage; stage 1 searches
        // all decks and its output replaces any caller-supplied set.
        let mut deck_filter = filter.clone();
        deck_filter.deck_ids = None;

        let decks = self
            .deck_stage(&vector, &deck_filter, self.config.cascade_deck_top_k)
            .await?;

        if decks.is_empty() {
            tracing::debug!("Cascade stage 1 found no decks, short-circuiting");
            return Ok(vec![]);
        }

        let deck_ids: Vec<String> = decks.iter().map(deck_identifier).collect();
        tracing::debug!("Cascade narrowed to decks: {:?}", deck_ids);

        // Stage 2 always derives its deck restriction from stage 1;
        // caller-supplied deck_ids are replaced, not intersected.
        let mut slide_filter = filter.clone();
        slide_filter.deck_ids = Some(deck_ids);

        self.slide_stage(&vector, &enhanced, &slide_filter, self.config.slide_top_k)
            .await
    }

    async fn deck_stage(
        &self,
        vector: &[f32],
        filter: &RetrievalFilter,
        top_k: usize,
    ) -> Result<Vec<ScoredRecord>> {
        let predicate = build_filter(filter, RecordKind::Deck);
        self.index
            .query(
                &self.config.deck_namespace,
                vector,
                top_k,
                predicate.as_ref(),
            )
            .await
    }

    async fn slide_stage(
        &self,
        vector: &[f32],
        enhanced: &EnhancedQuery,
        filter: &RetrievalFilter,
        top_k: usize,
    ) -> Result<Vec<RankedRecord>> {
        let predicate = build_filter(filter, RecordKind::Slide);
        let results = self
            .index
            .query(
                &self.config.slide_namespace,
                vector,
                top_k,
                predicate.as_ref(),
            )
            .await?;

        Ok(rerank(
            results,
            &enhanced.matched_keywords,
            self.config.boost_per_match,
            self.config.final_count,
        ))
    }

    /// Enhance the query if an enhancer is configured; degrade to the raw
    /// query with no matched keywords when enhancement fails. The
    /// degradation is logged, never silent.
    async fn enhance_or_fallback(&self, query: &str) -> EnhancedQuery {
        let Some(ref enhancer) = self.enhancer else {
            return EnhancedQuery::unenhanced(query);
        };

        match enhancer.enhance(query, &self.vocabulary).await {
            Ok(enhanced) => {
                tracing::debug!(
                    "Enhanced query: {:?} ({} matched keywords)",
                    enhanced.improved_query,
                    enhanced.matched_keywords.len()
                );
                enhanced
            }
            Err(e) => {
                tracing::warn!("Query enhancement failed, using raw query: {}", e);
                EnhancedQuery::unenhanced(query)
            }
        }
    }

    /// Caller filter, with industry/company defaulted from the enhancement
    /// targets when the caller left them open. Explicit caller fields win.
    fn effective_filter(
        &self,
        filter: &RetrievalFilter,
        enhanced: &EnhancedQuery,
    ) -> RetrievalFilter {
        let mut effective = filter.clone();
        if effective.industry.is_none() {
            effective.industry = enhanced.target_industry.clone();
        }
        if effective.company.is_none() {
            effective.company = enhanced.target_company.clone();
        }
        effective
    }
}

/// Parent-document identifier of a deck record. Deck records carry their
/// own document id in `deck_id`; older records fall back to stripping the
/// `_meta` suffix from the record id.
fn deck_identifier(deck: &ScoredRecord) -> String {
    deck.deck_id
        .clone()
        .unwrap_or_else(|| deck.id.trim_end_matches("_meta").to_string())
}

fn unranked(record: ScoredRecord) -> RankedRecord {
    let original_score = record.score;
    RankedRecord {
        record,
        original_score,
        match_count: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::RecordKind;

    fn deck(id: &str, deck_id: Option<&str>) -> ScoredRecord {
        ScoredRecord {
            id: id.to_string(),
            score: 0.9,
            kind: RecordKind::Deck,
            keywords: vec![],
            company: None,
            industry: None,
            deck_id: deck_id.map(|d| d.to_string()),
            slide_number: None,
            year: None,
            preview: None,
            extra: serde_json::Map::new(),
        }
    }

    #[test]
    fn test_deck_identifier_prefers_metadata_field() {
        assert_eq!(deck_identifier(&deck("acme_meta", Some("acme"))), "acme");
    }

    #[test]
    fn test_deck_identifier_falls_back_to_id_suffix() {
        assert_eq!(deck_identifier(&deck("acme_meta", None)), "acme");
        assert_eq!(deck_identifier(&deck("acme", None)), "acme");
    }
}
