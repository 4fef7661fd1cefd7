//! Terminal output formatter

use deckfind_core::{RankedRecord, RecordKind};

pub fn format_results(results: &[RankedRecord]) -> String {
    if results.is_empty() {
        return String::new();
    }

    let mut output = String::new();

    for (i, result) in results.iter().enumerate() {
        let record = &result.record;
        let score_pct = (result.score() * 100.0) as u32;

        let label = match record.kind {
            RecordKind::Deck => record
                .company
                .clone()
                .unwrap_or_else(|| record.id.clone()),
            RecordKind::Slide => {
                let company = record.company.as_deref().unwrap_or("?");
                match record.slide_number {
                    Some(n) => format!("{} slide {}", company, n),
                    None => company.to_string(),
                }
            }
        };

        output.push_str(&format!("{:>2}. {:>3}% {} #{}\n", i + 1, score_pct, label, record.id));

        if result.match_count > 0 {
            output.push_str(&format!(
                "         {} keyword match{} (base {:.2})\n",
                result.match_count,
                if result.match_count == 1 { "" } else { "es" },
                result.original_score,
            ));
        }
        if let Some(ref industry) = record.industry {
            output.push_str(&format!("         industry: {}\n", industry));
        }
        if let Some(ref preview) = record.preview {
            output.push_str(&format!("         {}\n", preview));
        }
    }

    output
}
