//! Known-vocabulary snapshot
//!
//! The fixed sets of valid company, industry, and keyword values. Loaded
//! once at startup and shared read-only for the process lifetime; the query
//! enhancer validates model output against it. Values are stored trimmed
//! and lowercased, so membership checks are direct set lookups.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

/// Static reference snapshot of valid entity values, lowercased
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KnownVocabulary {
    #[serde(default)]
    pub companies: BTreeSet<String>,

    #[serde(default)]
    pub industries: BTreeSet<String>,

    #[serde(default)]
    pub keywords: BTreeSet<String>,
}

impl KnownVocabulary {
    /// Load a vocabulary snapshot from a JSON file. Entries are normalized
    /// on load, so a hand-edited snapshot with mixed case still satisfies
    /// the lowercase invariant.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let vocab: KnownVocabulary = serde_json::from_str(&content)?;
        Ok(vocab.normalized())
    }

    /// Save the snapshot as pretty-printed JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Case-insensitive keyword membership check
    pub fn contains_keyword(&self, keyword: &str) -> bool {
        self.keywords.contains(&normalize(keyword))
    }

    /// Case-insensitive industry membership check
    pub fn contains_industry(&self, industry: &str) -> bool {
        self.industries.contains(&normalize(industry))
    }

    /// Case-insensitive company membership check
    pub fn contains_company(&self, company: &str) -> bool {
        self.companies.contains(&normalize(company))
    }

    pub fn is_empty(&self) -> bool {
        self.companies.is_empty() && self.industries.is_empty() && self.keywords.is_empty()
    }

    /// Merge distinct values observed in an ingested document into the
    /// snapshot (used when deriving a vocabulary from a document corpus)
    pub fn absorb(
        &mut self,
        company: Option<&str>,
        industry: Option<&str>,
        keywords: &[String],
    ) {
        if let Some(c) = company.map(normalize).filter(|c| !c.is_empty()) {
            self.companies.insert(c);
        }
        if let Some(i) = industry.map(normalize).filter(|i| !i.is_empty()) {
            self.industries.insert(i);
        }
        for kw in keywords {
            let kw = normalize(kw);
            if !kw.is_empty() {
                self.keywords.insert(kw);
            }
        }
    }

    fn normalized(self) -> Self {
        let lower = |set: BTreeSet<String>| {
            set.iter()
                .map(|v| normalize(v))
                .filter(|v| !v.is_empty())
                .collect()
        };
        Self {
            companies: lower(self.companies),
            industries: lower(self.industries),
            keywords: lower(self.keywords),
        }
    }
}

fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}
