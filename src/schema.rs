//! Canonical field keys and alias resolution across header revisions.
//!
//! The data source renames its columns between revisions ("Official Website"
//! one month, "Website URL" the next). Every field read goes through
//! [`AliasTable::resolve`] so callers never need to know which revision a
//! catalog was built from.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::ConfigError;

/// Normalizes a raw header into its canonical key form.
///
/// Lowercases, trims surrounding whitespace, and collapses internal
/// whitespace runs to a single underscore. Total over any input
/// (empty/whitespace-only input normalizes to the empty string) and
/// idempotent: `normalize_key(normalize_key(h)) == normalize_key(h)`.
///
/// Punctuation is preserved (`"Region/Country"` → `"region/country"`);
/// mapping variant spellings onto one key is the [`AliasTable`]'s job.
#[must_use]
pub fn normalize_key(header: &str) -> String {
    let mut key = String::with_capacity(header.len());
    let mut pending_gap = false;
    for ch in header.trim().chars() {
        if ch.is_whitespace() {
            pending_gap = true;
        } else {
            if pending_gap && !key.is_empty() {
                key.push('_');
            }
            pending_gap = false;
            for lower in ch.to_lowercase() {
                key.push(lower);
            }
        }
    }
    key
}

/// One alias declaration: a legacy/variant header name and the canonical
/// key it resolves to. Both sides are normalized on table construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasEntry {
    /// Legacy or variant header name as the source labeled it.
    pub from: String,
    /// Canonical key the legacy name maps to.
    pub to: String,
}

impl AliasEntry {
    /// Creates a new alias entry.
    #[must_use]
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

/// Ordered table of legacy-key → canonical-key mappings.
///
/// Construction normalizes both sides, rejects duplicate legacy keys, and
/// flags targets shared by several legacy keys: a row carrying more than one
/// of those headers resolves to the first declared entry, which silently
/// shadows the others. Resolution order is always the declared entry order,
/// so the outcome is at least deterministic.
#[derive(Debug, Clone, Default)]
pub struct AliasTable {
    entries: Vec<AliasEntry>,
    forward: HashMap<String, String>,
}

impl AliasTable {
    /// Builds a validated table from declared entries.
    ///
    /// Entries with an empty side (after normalization) or mapping a key to
    /// itself are dropped; they cannot affect resolution.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::DuplicateAlias`] when two entries normalize to
    /// the same legacy key.
    pub fn new(entries: &[AliasEntry]) -> Result<Self, ConfigError> {
        let mut normalized = Vec::with_capacity(entries.len());
        let mut forward = HashMap::with_capacity(entries.len());

        for entry in entries {
            let from = normalize_key(&entry.from);
            let to = normalize_key(&entry.to);
            if from.is_empty() || to.is_empty() || from == to {
                debug!(from = %entry.from, to = %entry.to, "dropping no-op alias entry");
                continue;
            }
            if forward.insert(from.clone(), to.clone()).is_some() {
                return Err(ConfigError::DuplicateAlias { key: from });
            }
            normalized.push(AliasEntry { from, to });
        }

        let mut shared: Vec<String> = Vec::new();
        let mut by_target: HashMap<&str, Vec<&str>> = HashMap::new();
        for entry in &normalized {
            by_target.entry(&entry.to).or_default().push(&entry.from);
        }
        for (target, sources) in &by_target {
            if sources.len() > 1 {
                shared.push(format!("{target} <- [{}]", sources.join(", ")));
            }
        }
        if !shared.is_empty() {
            shared.sort();
            warn!(
                targets = %shared.join("; "),
                "multiple aliases share a target; a row carrying more than one of \
                 these headers resolves to the first declared entry"
            );
        }

        Ok(Self {
            entries: normalized,
            forward,
        })
    }

    /// Number of live (non-dropped) entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when the table has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolves a field by any of its names against a record's fields.
    ///
    /// Lookup order:
    /// 1. `normalize_key(name)` is present in the record → its value.
    /// 2. The table maps `normalize_key(name)` to a canonical key present in
    ///    the record → that value (caller used a legacy name, record uses
    ///    the canonical schema).
    /// 3. A legacy key mapping to `normalize_key(name)` is present in the
    ///    record → that value, first matching entry in declared order
    ///    (caller used the canonical name, record was built from a legacy
    ///    schema revision).
    /// 4. Otherwise `""`.
    #[must_use]
    pub fn resolve<'a>(&self, fields: &'a HashMap<String, String>, name: &str) -> &'a str {
        let key = normalize_key(name);
        if let Some(value) = fields.get(&key) {
            return value;
        }
        if let Some(target) = self.forward.get(&key)
            && let Some(value) = fields.get(target)
        {
            return value;
        }
        for entry in &self.entries {
            if entry.to == key
                && let Some(value) = fields.get(&entry.from)
            {
                return value;
            }
        }
        ""
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn fields(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_normalize_key_lowercases_and_collapses_whitespace() {
        assert_eq!(normalize_key("Brand Name"), "brand_name");
        assert_eq!(normalize_key("  Opening   Hours \t(Mon-Sun) "), "opening_hours_(mon-sun)");
        assert_eq!(normalize_key("Region/Country"), "region/country");
    }

    #[test]
    fn test_normalize_key_total_over_degenerate_input() {
        assert_eq!(normalize_key(""), "");
        assert_eq!(normalize_key("   \t \n "), "");
    }

    #[test]
    fn test_normalize_key_is_idempotent() {
        for header in ["Brand Name", "  WEBSITE url ", "area/City", "", "a  b   c"] {
            let once = normalize_key(header);
            assert_eq!(
                normalize_key(&once),
                once,
                "normalize_key must be idempotent for {header:?}"
            );
        }
    }

    #[test]
    fn test_alias_table_rejects_duplicate_legacy_keys() {
        let entries = vec![
            AliasEntry::new("Official Website", "website_url"),
            AliasEntry::new("official  website", "homepage"),
        ];
        let result = AliasTable::new(&entries);
        match result {
            Err(ConfigError::DuplicateAlias { key }) => assert_eq!(key, "official_website"),
            other => panic!("expected DuplicateAlias, got: {other:?}"),
        }
    }

    #[test]
    fn test_alias_table_drops_no_op_entries() {
        let entries = vec![
            AliasEntry::new("brand_name", "brand_name"),
            AliasEntry::new("  ", "region"),
            AliasEntry::new("city", "area"),
        ];
        let table = AliasTable::new(&entries).unwrap();
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_resolve_prefers_exact_key() {
        let table = AliasTable::new(&[AliasEntry::new("official website", "website_url")]).unwrap();
        let record = fields(&[
            ("website_url", "https://canonical.example"),
            ("official_website", "https://legacy.example"),
        ]);
        assert_eq!(
            table.resolve(&record, "Website URL"),
            "https://canonical.example"
        );
    }

    #[test]
    fn test_resolve_legacy_name_finds_canonical_value() {
        let table = AliasTable::new(&[AliasEntry::new("official website", "website_url")]).unwrap();
        let record = fields(&[("website_url", "https://example.com")]);
        assert_eq!(
            table.resolve(&record, "Official Website"),
            "https://example.com"
        );
    }

    #[test]
    fn test_resolve_canonical_name_finds_legacy_value() {
        let table = AliasTable::new(&[AliasEntry::new("official website", "website_url")]).unwrap();
        let record = fields(&[("official_website", "https://example.com")]);
        assert_eq!(
            table.resolve(&record, "website_url"),
            "https://example.com"
        );
    }

    #[test]
    fn test_resolve_shared_target_uses_declared_order() {
        let table = AliasTable::new(&[
            AliasEntry::new("area/city", "area"),
            AliasEntry::new("city", "area"),
        ])
        .unwrap();
        let record = fields(&[("city", "Lyon"), ("area/city", "Paris")]);
        assert_eq!(table.resolve(&record, "area"), "Paris");
    }

    #[test]
    fn test_resolve_unknown_field_returns_empty() {
        let table = AliasTable::default();
        let record = fields(&[("brand_name", "Acme")]);
        assert_eq!(table.resolve(&record, "cuisine"), "");
    }
}
