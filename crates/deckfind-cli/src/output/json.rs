//! JSON output formatter

use deckfind_core::RankedRecord;

pub fn format_results(results: &[RankedRecord]) -> String {
    let output: Vec<serde_json::Value> = results
        .iter()
        .map(|r| {
            serde_json::json!({
                "id": r.record.id,
                "score": r.score(),
                "original_score": r.original_score,
                "match_count": r.match_count,
                "type": r.record.kind,
                "company": r.record.company,
                "industry": r.record.industry,
                "deck_id": r.record.deck_id,
                "slide_number": r.record.slide_number,
                "year": r.record.year,
                "preview": r.record.preview,
            })
        })
        .collect();

    serde_json::to_string_pretty(&output).unwrap_or_else(|_| "[]".to_string()) + "\n"
}
