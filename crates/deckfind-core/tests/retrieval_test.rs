//! Integration tests for the retrieval orchestrator
//!
//! Drives the full slides/decks/cascade pipelines against in-memory mock
//! collaborators. The mock index records every query it receives so the
//! cascade short-circuit can be asserted structurally (the slide query is
//! never issued), not just by the empty result.

use async_trait::async_trait;
use deckfind_core::{
    DeckFindError, Embedder, EnhancedQuery, IndexFilter, IndexRecord, IndexStats,
    KnownVocabulary, QueryEnhancer, RecordKind, Result, RetrievalFilter, Retriever,
    RetrieverConfig, ScoredRecord, SearchMode, VectorIndex,
};
use std::sync::{Arc, Mutex};

// ---------------------------------------------------------------------------
// Mock collaborators
// ---------------------------------------------------------------------------

struct MockEmbedder;

#[async_trait]
impl Embedder for MockEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        Ok(vec![0.1, 0.2, 0.3])
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|_| vec![0.1, 0.2, 0.3]).collect())
    }

    fn dimensions(&self) -> usize {
        3
    }

    fn model_name(&self) -> &str {
        "mock-embedder"
    }
}

#[derive(Debug, Clone)]
struct QueryCall {
    namespace: String,
    top_k: usize,
    filter: Option<IndexFilter>,
}

#[derive(Default)]
struct MockIndex {
    decks: Vec<ScoredRecord>,
    slides: Vec<ScoredRecord>,
    calls: Mutex<Vec<QueryCall>>,
}

impl MockIndex {
    fn calls(&self) -> Vec<QueryCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl VectorIndex for MockIndex {
    async fn query(
        &self,
        namespace: &str,
        _vector: &[f32],
        top_k: usize,
        filter: Option<&IndexFilter>,
    ) -> Result<Vec<ScoredRecord>> {
        self.calls.lock().unwrap().push(QueryCall {
            namespace: namespace.to_string(),
            top_k,
            filter: filter.cloned(),
        });

        let population = match namespace {
            "decks" => &self.decks,
            "slides" => &self.slides,
            other => {
                return Err(DeckFindError::Retrieval(format!(
                    "unknown namespace {}",
                    other
                )))
            }
        };

        let mut matched: Vec<ScoredRecord> = population
            .iter()
            .filter(|r| filter.map(|f| matches_filter(r, f)).unwrap_or(true))
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap());
        matched.truncate(top_k);
        Ok(matched)
    }

    async fn upsert(
        &self,
        _namespace: &str,
        records: &[(IndexRecord, Vec<f32>)],
    ) -> Result<usize> {
        Ok(records.len())
    }

    async fn stats(&self) -> Result<IndexStats> {
        Ok(IndexStats::default())
    }
}

/// Evaluate an index predicate against a record, mirroring the index
/// service's filter grammar semantics.
fn matches_filter(record: &ScoredRecord, filter: &IndexFilter) -> bool {
    match filter {
        IndexFilter::Eq(field, value) => {
            field_values(record, field).iter().any(|v| v == value)
        }
        IndexFilter::In(field, values) => field_values(record, field)
            .iter()
            .any(|v| values.contains(v)),
        IndexFilter::Gte(field, bound) => field_values(record, field)
            .iter()
            .any(|v| v.as_i64().map(|n| n >= *bound).unwrap_or(false)),
        IndexFilter::Lte(field, bound) => field_values(record, field)
            .iter()
            .any(|v| v.as_i64().map(|n| n <= *bound).unwrap_or(false)),
        IndexFilter::And(clauses) => clauses.iter().all(|c| matches_filter(record, c)),
    }
}

fn field_values(record: &ScoredRecord, field: &str) -> Vec<serde_json::Value> {
    use serde_json::json;
    match field {
        "type" => vec![json!(record.kind.wire_name())],
        "company" => record.company.iter().map(|v| json!(v)).collect(),
        "industry" => record.industry.iter().map(|v| json!(v)).collect(),
        "deck_id" => record.deck_id.iter().map(|v| json!(v)).collect(),
        "year" => record.year.iter().map(|v| json!(v)).collect(),
        "keywords" => record.keywords.iter().map(|v| json!(v)).collect(),
        _ => vec![],
    }
}

enum MockEnhancer {
    Fixed(EnhancedQuery),
    Failing,
}

#[async_trait]
impl QueryEnhancer for MockEnhancer {
    async fn enhance(
        &self,
        _query: &str,
        _vocabulary: &KnownVocabulary,
    ) -> Result<EnhancedQuery> {
        match self {
            MockEnhancer::Fixed(enhanced) => Ok(enhanced.clone()),
            MockEnhancer::Failing => Err(DeckFindError::QueryEnhancement(
                "model returned prose instead of JSON".to_string(),
            )),
        }
    }

    fn model_name(&self) -> &str {
        "mock-enhancer"
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

fn deck(id: &str, doc_id: &str, score: f64, industry: &str) -> ScoredRecord {
    ScoredRecord {
        id: id.to_string(),
        score,
        kind: RecordKind::Deck,
        keywords: vec![],
        company: None,
        industry: Some(industry.to_string()),
        deck_id: Some(doc_id.to_string()),
        slide_number: None,
        year: Some(2024),
        preview: None,
        extra: serde_json::Map::new(),
    }
}

fn slide(id: &str, doc_id: &str, score: f64, keywords: &[&str]) -> ScoredRecord {
    ScoredRecord {
        id: id.to_string(),
        score,
        kind: RecordKind::Slide,
        keywords: keywords.iter().map(|k| k.to_string()).collect(),
        company: None,
        industry: None,
        deck_id: Some(doc_id.to_string()),
        slide_number: Some(1),
        year: Some(2024),
        preview: None,
        extra: serde_json::Map::new(),
    }
}

fn config() -> RetrieverConfig {
    RetrieverConfig {
        deck_namespace: "decks".to_string(),
        slide_namespace: "slides".to_string(),
        slide_top_k: 20,
        deck_top_k: 10,
        cascade_deck_top_k: 3,
        final_count: 5,
        boost_per_match: 0.15,
    }
}

fn retriever(index: Arc<MockIndex>, enhancer: Option<MockEnhancer>) -> Retriever {
    Retriever::new(
        Arc::new(MockEmbedder),
        index,
        enhancer.map(|e| Arc::new(e) as Arc<dyn QueryEnhancer>),
        Arc::new(KnownVocabulary::default()),
        config(),
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn slides_mode_boosts_matched_keywords() {
    let index = Arc::new(MockIndex {
        slides: vec![
            slide("d1_slide_001", "d1", 0.80, &["Pricing"]),
            slide("d2_slide_001", "d2", 0.70, &["AI", "Growth"]),
        ],
        ..Default::default()
    });

    let enhancer = MockEnhancer::Fixed(EnhancedQuery {
        improved_query: "ai growth strategy".to_string(),
        matched_keywords: vec!["AI".to_string(), "Growth".to_string()],
        target_industry: None,
        target_company: None,
    });

    let results = retriever(index.clone(), Some(enhancer))
        .search("ai growth", &RetrievalFilter::default(), SearchMode::Slides)
        .await
        .unwrap();

    // 0.70 + 2 * 0.15 = 1.0 overtakes 0.80
    assert_eq!(results[0].record.id, "d2_slide_001");
    assert_eq!(results[0].match_count, 2);
    assert_eq!(results[0].record.score, 1.0);
    assert!((results[0].original_score - 0.70).abs() < 1e-9);
    assert_eq!(results[1].record.id, "d1_slide_001");

    // The slide query carried the implicit kind predicate
    let calls = index.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].namespace, "slides");
    assert_eq!(
        calls[0].filter,
        Some(IndexFilter::eq("type", "slide"))
    );
}

#[tokio::test]
async fn slides_mode_without_enhancer_is_unboosted() {
    let index = Arc::new(MockIndex {
        slides: vec![
            slide("a", "d1", 0.9, &["AI"]),
            slide("b", "d1", 0.8, &["Growth"]),
        ],
        ..Default::default()
    });

    let results = retriever(index, None)
        .search("anything", &RetrievalFilter::default(), SearchMode::Slides)
        .await
        .unwrap();

    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|r| r.match_count == 0));
    assert_eq!(results[0].record.id, "a");
}

#[tokio::test]
async fn enhancement_failure_falls_back_to_raw_query() {
    let index = Arc::new(MockIndex {
        slides: vec![slide("a", "d1", 0.9, &["AI"])],
        ..Default::default()
    });

    // Failing enhancer must not abort retrieval
    let results = retriever(index, Some(MockEnhancer::Failing))
        .search("raw query", &RetrievalFilter::default(), SearchMode::Slides)
        .await
        .unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].match_count, 0);
    assert!((results[0].record.score - 0.9).abs() < 1e-9);
}

#[tokio::test]
async fn decks_mode_returns_index_order_without_boosting() {
    let index = Arc::new(MockIndex {
        decks: vec![
            deck("d1_meta", "d1", 0.9, "Insurance"),
            deck("d2_meta", "d2", 0.7, "Healthcare"),
        ],
        ..Default::default()
    });

    let enhancer = MockEnhancer::Fixed(EnhancedQuery {
        improved_query: "insurance decks".to_string(),
        matched_keywords: vec!["Insurance".to_string()],
        target_industry: None,
        target_company: None,
    });

    let results = retriever(index.clone(), Some(enhancer))
        .search("insurance", &RetrievalFilter::default(), SearchMode::Decks)
        .await
        .unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].record.id, "d1_meta");
    // No keyword boosting applied to decks
    assert!(results.iter().all(|r| r.match_count == 0));
    assert!(results
        .iter()
        .all(|r| (r.record.score - r.original_score).abs() < 1e-9));

    // Open deck filter excludes nothing
    let calls = index.calls();
    assert_eq!(calls[0].filter, None);
}

#[tokio::test]
async fn deck_filter_applies_caller_fields() {
    let index = Arc::new(MockIndex {
        decks: vec![
            deck("d1_meta", "d1", 0.9, "Insurance"),
            deck("d2_meta", "d2", 0.8, "Healthcare"),
        ],
        ..Default::default()
    });

    let filter = RetrievalFilter {
        industry: Some("Healthcare".to_string()),
        ..Default::default()
    };

    let results = retriever(index, None)
        .search("query", &filter, SearchMode::Decks)
        .await
        .unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].record.id, "d2_meta");
}

#[tokio::test]
async fn cascade_short_circuits_without_slide_query() {
    let index = Arc::new(MockIndex::default()); // no decks at all

    let results = retriever(index.clone(), None)
        .search("query", &RetrievalFilter::default(), SearchMode::Cascade)
        .await
        .unwrap();

    assert!(results.is_empty());

    // Exactly one query issued, to the deck namespace; the slide stage
    // never ran.
    let calls = index.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].namespace, "decks");
    assert_eq!(calls[0].top_k, 3);
}

#[tokio::test]
async fn cascade_restricts_slides_to_stage_one_decks() {
    let index = Arc::new(MockIndex {
        decks: vec![
            deck("d1_meta", "d1", 0.95, "Insurance"),
            deck("d2_meta", "d2", 0.90, "Insurance"),
            deck("d3_meta", "d3", 0.40, "Insurance"),
            deck("d4_meta", "d4", 0.30, "Insurance"),
        ],
        slides: vec![
            slide("d1_slide_001", "d1", 0.85, &["AI"]),
            slide("d2_slide_001", "d2", 0.80, &[]),
            // Belongs to a deck outside the narrowed set; must not surface
            // even with a high score
            slide("d9_slide_001", "d9", 0.99, &["AI"]),
        ],
        ..Default::default()
    });

    let results = retriever(index.clone(), None)
        .search("query", &RetrievalFilter::default(), SearchMode::Cascade)
        .await
        .unwrap();

    // Cascade narrowing: every result's parent is a stage-1 deck
    assert!(!results.is_empty());
    let stage1_ids = ["d1", "d2", "d3"]; // cascade_deck_top_k = 3
    for r in &results {
        assert!(stage1_ids.contains(&r.record.deck_id.as_deref().unwrap()));
    }
    assert!(results.iter().all(|r| r.record.id != "d9_slide_001"));

    // The slide-stage predicate carried the derived deck_id restriction
    let calls = index.calls();
    assert_eq!(calls.len(), 2);
    let slide_filter = calls[1].filter.as_ref().unwrap();
    assert!(matches!(slide_filter, IndexFilter::And(_)));
}

#[tokio::test]
async fn cascade_overrides_caller_deck_ids() {
    let index = Arc::new(MockIndex {
        decks: vec![deck("d1_meta", "d1", 0.9, "Insurance")],
        slides: vec![
            slide("d1_slide_001", "d1", 0.8, &[]),
            slide("d7_slide_001", "d7", 0.9, &[]),
        ],
        ..Default::default()
    });

    // Caller asks for deck d7; cascade replaces that with stage-1 output
    let filter = RetrievalFilter {
        deck_ids: Some(vec!["d7".to_string()]),
        ..Default::default()
    };

    let results = retriever(index.clone(), None)
        .search("query", &filter, SearchMode::Cascade)
        .await
        .unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].record.deck_id.as_deref(), Some("d1"));

    // Stage 1 must search all decks: the caller's deck_ids do not reach
    // the deck query, otherwise an unsatisfiable set would short-circuit
    // the whole cascade.
    let calls = index.calls();
    assert_eq!(calls[0].namespace, "decks");
    assert_eq!(calls[0].filter, None);
}

#[tokio::test]
async fn enhancement_targets_fill_open_filter_fields() {
    let index = Arc::new(MockIndex {
        decks: vec![
            deck("d1_meta", "d1", 0.9, "Insurance"),
            deck("d2_meta", "d2", 0.8, "Healthcare"),
        ],
        ..Default::default()
    });

    let enhancer = MockEnhancer::Fixed(EnhancedQuery {
        improved_query: "healthcare pitch decks".to_string(),
        matched_keywords: vec![],
        target_industry: Some("Healthcare".to_string()),
        target_company: None,
    });

    let results = retriever(index, Some(enhancer))
        .search("healthcare decks", &RetrievalFilter::default(), SearchMode::Decks)
        .await
        .unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].record.id, "d2_meta");
}

#[tokio::test]
async fn explicit_caller_filter_wins_over_enhancement_target() {
    let index = Arc::new(MockIndex {
        decks: vec![
            deck("d1_meta", "d1", 0.9, "Insurance"),
            deck("d2_meta", "d2", 0.8, "Healthcare"),
        ],
        ..Default::default()
    });

    let enhancer = MockEnhancer::Fixed(EnhancedQuery {
        improved_query: "decks".to_string(),
        matched_keywords: vec![],
        target_industry: Some("Healthcare".to_string()),
        target_company: None,
    });

    let filter = RetrievalFilter {
        industry: Some("Insurance".to_string()),
        ..Default::default()
    };

    let results = retriever(index, Some(enhancer))
        .search("decks", &filter, SearchMode::Decks)
        .await
        .unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].record.id, "d1_meta");
}

#[tokio::test]
async fn year_range_filter_narrows_results() {
    let mut old_deck = deck("d1_meta", "d1", 0.9, "Insurance");
    old_deck.year = Some(2019);
    let index = Arc::new(MockIndex {
        decks: vec![old_deck, deck("d2_meta", "d2", 0.8, "Insurance")],
        ..Default::default()
    });

    let filter = RetrievalFilter {
        year_from: Some(2023),
        ..Default::default()
    };

    let results = retriever(index, None)
        .search("query", &filter, SearchMode::Decks)
        .await
        .unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].record.id, "d2_meta");
}

#[tokio::test]
async fn empty_results_are_success_not_error() {
    let index = Arc::new(MockIndex::default());

    for mode in [SearchMode::Slides, SearchMode::Decks, SearchMode::Cascade] {
        let results = retriever(Arc::clone(&index), None)
            .search("nothing matches", &RetrievalFilter::default(), mode)
            .await
            .unwrap();
        assert!(results.is_empty());
    }
}

#[tokio::test]
async fn index_failure_propagates_as_error() {
    // Namespace mismatch makes the mock fail, standing in for a transport
    // error; this must surface as Err, never as an empty Ok.
    let index = Arc::new(MockIndex::default());
    let mut cfg = config();
    cfg.deck_namespace = "wrong".to_string();

    let retriever = Retriever::new(
        Arc::new(MockEmbedder),
        index,
        None,
        Arc::new(KnownVocabulary::default()),
        cfg,
    );

    let err = retriever
        .search("query", &RetrievalFilter::default(), SearchMode::Decks)
        .await
        .unwrap_err();
    assert!(matches!(err, DeckFindError::Retrieval(_)));
}
