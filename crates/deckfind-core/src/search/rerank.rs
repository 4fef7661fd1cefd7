//! Keyword-boost re-ranking
//!
//! Rescales raw similarity scores by counting overlap between a record's
//! tags and the vocabulary-verified keywords extracted from the query, then
//! re-sorts. The overlap test is case-insensitive bidirectional substring
//! containment, so short keywords match loosely ("AI" matches "AI-driven"
//! but also "AIR").

use crate::index::ScoredRecord;
use std::collections::BTreeSet;

/// Re-ranked result retaining the explainability trail
#[derive(Debug, Clone)]
pub struct RankedRecord {
    /// Record with its boosted score
    pub record: ScoredRecord,

    /// Raw similarity score before boosting
    pub original_score: f64,

    /// Distinct record tags that overlapped a matched keyword
    pub match_count: usize,
}

impl RankedRecord {
    pub fn score(&self) -> f64 {
        self.record.score
    }
}

/// Boost, stable-sort descending, and truncate.
///
/// With an empty `matched_keywords` set every match count is zero and the
/// output is the input order truncated to `final_count`. Ties in boosted
/// score keep their input order (stable sort), so equal-boost records stay
/// reproducible across runs.
pub fn rerank(
    results: Vec<ScoredRecord>,
    matched_keywords: &[String],
    boost_per_match: f64,
    final_count: usize,
) -> Vec<RankedRecord> {
    let mut ranked: Vec<RankedRecord> = results
        .into_iter()
        .map(|mut record| {
            let match_count = count_matches(&record.keywords, matched_keywords);
            let original_score = record.score;
            record.score =
                (original_score + match_count as f64 * boost_per_match).min(1.0);
            RankedRecord {
                record,
                original_score,
                match_count,
            }
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.score()
            .partial_cmp(&a.score())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    ranked.truncate(final_count);
    ranked
}

/// Count distinct record tags that overlap any matched keyword.
/// Duplicate tags (case-insensitively) count once.
fn count_matches(tags: &[String], matched_keywords: &[String]) -> usize {
    if tags.is_empty() || matched_keywords.is_empty() {
        return 0;
    }

    let distinct_tags: BTreeSet<String> = tags
        .iter()
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect();

    distinct_tags
        .iter()
        .filter(|tag| {
            matched_keywords.iter().any(|kw| {
                let kw = kw.trim().to_lowercase();
                !kw.is_empty() && (tag.contains(&kw) || kw.contains(tag.as_str()))
            })
        })
        .count()
}
