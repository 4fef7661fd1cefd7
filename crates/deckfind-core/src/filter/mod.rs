//! Metadata filter construction
//!
//! Turns a partially-populated [`RetrievalFilter`] into the predicate tree
//! the vector index understands. Absence of a field imposes no constraint;
//! every present field is ANDed with the rest. The builder has no failure
//! modes: any combination of absent fields is a valid (possibly empty)
//! predicate, and a contradictory year range just matches nothing.

use crate::index::{fields, RecordKind};
use serde_json::{json, Value};

/// User-supplied retrieval constraints, each field independently optional
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RetrievalFilter {
    /// Exact-match industry category
    #[serde(default)]
    pub industry: Option<String>,

    /// Exact-match company name
    #[serde(default)]
    pub company: Option<String>,

    /// A record matches if any of its tags overlaps this set
    #[serde(default)]
    pub keywords: Option<Vec<String>>,

    /// Inclusive lower bound on the record's creation year
    #[serde(default)]
    pub year_from: Option<i64>,

    /// Inclusive upper bound on the record's creation year
    #[serde(default)]
    pub year_to: Option<i64>,

    /// Restrict results to these parent documents (cascade stage 2)
    #[serde(default)]
    pub deck_ids: Option<Vec<String>>,
}

impl RetrievalFilter {
    pub fn is_open(&self) -> bool {
        *self == RetrievalFilter::default()
    }
}

/// Predicate tree in the index's filter grammar
#[derive(Debug, Clone, PartialEq)]
pub enum IndexFilter {
    /// Field equals value
    Eq(String, Value),

    /// Field value is (or overlaps, for list-valued fields) one of the set
    In(String, Vec<Value>),

    /// Field >= bound
    Gte(String, i64),

    /// Field <= bound
    Lte(String, i64),

    /// All sub-predicates hold
    And(Vec<IndexFilter>),
}

impl IndexFilter {
    pub fn eq(field: &str, value: impl Into<String>) -> Self {
        IndexFilter::Eq(field.to_string(), Value::String(value.into()))
    }

    pub fn any_of<I, S>(field: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        IndexFilter::In(
            field.to_string(),
            values.into_iter().map(|v| Value::String(v.into())).collect(),
        )
    }

    pub fn gte(field: &str, bound: i64) -> Self {
        IndexFilter::Gte(field.to_string(), bound)
    }

    pub fn lte(field: &str, bound: i64) -> Self {
        IndexFilter::Lte(field.to_string(), bound)
    }

    /// Serialize to the index's JSON filter grammar
    pub fn to_value(&self) -> Value {
        match self {
            IndexFilter::Eq(field, value) => json!({ field: { "$eq": value } }),
            IndexFilter::In(field, values) => json!({ field: { "$in": values } }),
            IndexFilter::Gte(field, bound) => json!({ field: { "$gte": bound } }),
            IndexFilter::Lte(field, bound) => json!({ field: { "$lte": bound } }),
            IndexFilter::And(clauses) => json!({
                "$and": clauses.iter().map(|c| c.to_value()).collect::<Vec<_>>()
            }),
        }
    }
}

/// Clause constructors, one per filter field, iterated once per build.
/// Empty keyword/deck-id lists impose no constraint, same as absence.
const CLAUSES: &[fn(&RetrievalFilter) -> Option<IndexFilter>] = &[
    |f| f.industry.clone().map(|v| IndexFilter::eq(fields::INDUSTRY, v)),
    |f| f.company.clone().map(|v| IndexFilter::eq(fields::COMPANY, v)),
    |f| {
        f.keywords
            .as_ref()
            .filter(|k| !k.is_empty())
            .map(|k| IndexFilter::any_of(fields::KEYWORDS, k.iter().cloned()))
    },
    |f| f.year_from.map(|y| IndexFilter::gte(fields::YEAR, y)),
    |f| f.year_to.map(|y| IndexFilter::lte(fields::YEAR, y)),
    |f| {
        f.deck_ids
            .as_ref()
            .filter(|d| !d.is_empty())
            .map(|d| IndexFilter::any_of(fields::DECK_ID, d.iter().cloned()))
    },
];

/// Build the index predicate for a filter request and target record kind.
///
/// Slide-kind queries always constrain `type == slide`, even for an
/// otherwise open request, because slides and decks may share a physical
/// namespace. Deck-kind queries add no implicit clause. A single clause is
/// returned unwrapped; zero clauses is `None` (matches everything).
pub fn build_filter(filter: &RetrievalFilter, kind: RecordKind) -> Option<IndexFilter> {
    let mut clauses = Vec::new();

    if kind == RecordKind::Slide {
        clauses.push(IndexFilter::eq(fields::KIND, RecordKind::Slide.wire_name()));
    }

    clauses.extend(CLAUSES.iter().filter_map(|build| build(filter)));

    match clauses.len() {
        0 => None,
        1 => clauses.pop(),
        _ => Some(IndexFilter::And(clauses)),
    }
}
