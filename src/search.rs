//! Approximate search over the catalog's searchable fields.
//!
//! The index is derived, read-only state: built once per catalog
//! generation, never patched incrementally. Ranking classifies each record
//! by its best match quality (exact, then substring, then fuzzy) with ties
//! broken by original catalog order so results are stable.

use std::cmp::Ordering;

use tracing::debug;

use crate::catalog::Catalog;
use crate::schema::AliasTable;

/// How a query matched a searchable value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MatchKind {
    /// Edit-distance match at or above the similarity threshold.
    Fuzzy,
    /// Query appears inside the value.
    Substring,
    /// Query equals the value.
    Exact,
}

/// One matching record position with its ranking metadata.
#[derive(Debug, Clone)]
pub struct RankedMatch {
    /// Position of the record in the catalog.
    pub position: usize,
    /// Match quality class.
    pub kind: MatchKind,
    /// Similarity estimate in 0.0–1.0.
    pub similarity: f64,
}

/// Searchable-value index over one catalog generation.
#[derive(Debug)]
pub struct SearchIndex {
    entries: Vec<IndexEntry>,
    generation: u64,
    threshold: f64,
}

#[derive(Debug)]
struct IndexEntry {
    position: usize,
    values: Vec<String>,
}

impl SearchIndex {
    /// Builds the index from a catalog snapshot.
    ///
    /// Each configured field is read through the alias table, so a catalog
    /// built from either header schema revision indexes identically.
    /// Cost is proportional to catalog size × searchable-field count.
    #[must_use]
    pub fn build(
        catalog: &Catalog,
        aliases: &AliasTable,
        fields: &[String],
        threshold: f64,
    ) -> Self {
        let entries = catalog
            .records()
            .iter()
            .enumerate()
            .map(|(position, record)| {
                let values = fields
                    .iter()
                    .filter_map(|field| {
                        let value = record.resolve(aliases, field);
                        (!value.is_empty()).then(|| normalize_text(value))
                    })
                    .collect();
                IndexEntry { position, values }
            })
            .collect();
        debug!(
            generation = catalog.generation(),
            records = catalog.len(),
            "search index built"
        );
        Self {
            entries,
            generation: catalog.generation(),
            threshold,
        }
    }

    /// The catalog generation this index was built from.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Ranks catalog positions by match quality for a query.
    ///
    /// Best first: match kind, then similarity, then original catalog
    /// position. A blank query returns no matches here; the query layer
    /// bypasses ranking entirely for blank queries and serves the whole
    /// catalog in order.
    #[must_use]
    pub fn rank(&self, query: &str) -> Vec<RankedMatch> {
        let query_norm = normalize_text(query);
        if query_norm.is_empty() {
            return Vec::new();
        }

        let mut ranked: Vec<RankedMatch> = self
            .entries
            .iter()
            .filter_map(|entry| {
                let mut best: Option<(MatchKind, f64)> = None;
                for value in &entry.values {
                    let Some(scored) = classify_match(&query_norm, value, self.threshold) else {
                        continue;
                    };
                    let is_better = best.is_none_or(|current| scored > current);
                    if is_better {
                        best = Some(scored);
                    }
                }
                best.map(|(kind, similarity)| RankedMatch {
                    position: entry.position,
                    kind,
                    similarity,
                })
            })
            .collect();

        ranked.sort_by(compare_matches);
        ranked
    }
}

/// Compares two ranked matches for sort order (best first).
fn compare_matches(left: &RankedMatch, right: &RankedMatch) -> Ordering {
    right
        .kind
        .cmp(&left.kind)
        .then_with(|| {
            right
                .similarity
                .partial_cmp(&left.similarity)
                .unwrap_or(Ordering::Equal)
        })
        .then_with(|| left.position.cmp(&right.position))
}

/// Classifies how the normalized query matches one normalized value.
fn classify_match(query_norm: &str, value_norm: &str, threshold: f64) -> Option<(MatchKind, f64)> {
    if value_norm.is_empty() {
        return None;
    }

    if value_norm == query_norm {
        return Some((MatchKind::Exact, 1.0));
    }

    if value_norm.contains(query_norm) {
        let similarity = (query_norm.chars().count() as f64 / value_norm.chars().count() as f64)
            .clamp(0.0, 1.0);
        return Some((MatchKind::Substring, similarity));
    }

    let similarity = fuzzy_similarity(query_norm, value_norm);
    if similarity >= threshold {
        return Some((MatchKind::Fuzzy, similarity));
    }

    None
}

/// Best fuzzy similarity between the query and the value or any of its
/// tokens of at least three characters.
fn fuzzy_similarity(query_norm: &str, value_norm: &str) -> f64 {
    let mut best = strsim::normalized_levenshtein(query_norm, value_norm);

    for token in value_norm.split(|ch: char| !ch.is_alphanumeric()) {
        if token.chars().count() < 3 {
            continue;
        }
        best = best.max(strsim::normalized_levenshtein(query_norm, token));
    }

    best
}

/// Normalizes text for matching: collapse whitespace and lowercase.
#[must_use]
pub fn normalize_text(value: &str) -> String {
    value
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
