//! CLI command implementations

pub mod ingest;
pub mod search;
pub mod stats;
pub mod vocab;
