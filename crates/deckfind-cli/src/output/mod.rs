//! Output formatters

pub mod json;
pub mod terminal;

use crate::app::OutputFormat;
use deckfind_core::RankedRecord;

/// Format ranked results for display.
pub fn format_results(results: &[RankedRecord], format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => json::format_results(results),
        OutputFormat::Cli => terminal::format_results(results),
    }
}
