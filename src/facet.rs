//! Facet enumeration and exact-match narrowing.

use std::collections::HashSet;

use crate::catalog::{Catalog, Record};
use crate::schema::AliasTable;

/// The "no filter" sentinel. Consumers prepend it to the value list
/// themselves; [`distinct_values`] never includes it, and
/// [`filter_by_facet`] treats it as a no-op.
pub const FACET_ALL: &str = "all";

/// Distinct non-empty values of one field across the catalog.
///
/// Values differing only by case are one facet value (filtering is
/// case-insensitive, so splitting them would yield duplicate filters); the
/// first-seen casing is kept. Ordering is lexicographic on the case-folded
/// value, with the exact value as tiebreak, so the list is deterministic.
#[must_use]
pub fn distinct_values(catalog: &Catalog, aliases: &AliasTable, field: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut values = Vec::new();
    for record in catalog.records() {
        let value = record.resolve(aliases, field);
        if value.is_empty() {
            continue;
        }
        if seen.insert(value.to_lowercase()) {
            values.push(value.to_string());
        }
    }
    values.sort_by(|a, b| {
        a.to_lowercase()
            .cmp(&b.to_lowercase())
            .then_with(|| a.cmp(b))
    });
    values
}

/// Retains records whose resolved field value equals the selection,
/// case-insensitively, preserving input order. [`FACET_ALL`] returns the
/// input unchanged.
#[must_use]
pub fn filter_by_facet<'a>(
    records: Vec<&'a Record>,
    aliases: &AliasTable,
    field: &str,
    selected: &str,
) -> Vec<&'a Record> {
    if selected == FACET_ALL {
        return records;
    }
    let selected = selected.to_lowercase();
    records
        .into_iter()
        .filter(|record| record.resolve(aliases, field).to_lowercase() == selected)
        .collect()
}
