//! The query surface consumed by presentation.
//!
//! A [`QueryEngine`] binds one catalog snapshot to the search index built
//! from it, so the index generation always equals the catalog generation
//! and stale-index queries are impossible by construction. All operations
//! are synchronous and pure: no I/O, no mutation.

use std::sync::Arc;

use crate::catalog::{Catalog, Record};
use crate::config::{CatalogConfig, ConfigError};
use crate::facet;
use crate::schema::AliasTable;
use crate::search::{SearchIndex, normalize_text};

/// Search, facet, and field-resolution operations over one catalog
/// generation. Rebuild the engine whenever a newer catalog replaces the
/// snapshot it was built from.
#[derive(Debug)]
pub struct QueryEngine {
    catalog: Arc<Catalog>,
    index: SearchIndex,
    aliases: AliasTable,
}

impl QueryEngine {
    /// Builds an engine (and its search index) for a catalog snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::DuplicateAlias`] when the configuration's
    /// alias declarations do not form a valid table.
    pub fn new(catalog: Arc<Catalog>, config: &CatalogConfig) -> Result<Self, ConfigError> {
        let aliases = config.alias_table()?;
        let index = SearchIndex::build(
            &catalog,
            &aliases,
            &config.search_fields,
            config.fuzzy_threshold,
        );
        Ok(Self {
            catalog,
            index,
            aliases,
        })
    }

    /// The catalog snapshot this engine serves.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// The load generation this engine serves.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.catalog.generation()
    }

    /// Resolves a field of a record by any of its names; `""` when absent.
    #[must_use]
    pub fn resolve<'a>(&self, record: &'a Record, name: &str) -> &'a str {
        record.resolve(&self.aliases, name)
    }

    /// Ranked approximate search over the configured searchable fields.
    ///
    /// A blank query bypasses scoring and returns the whole catalog in
    /// original order. A query matching nothing returns an empty list.
    #[must_use]
    pub fn search(&self, query: &str) -> Vec<&Record> {
        if normalize_text(query).is_empty() {
            return self.catalog.records().iter().collect();
        }
        self.index
            .rank(query)
            .into_iter()
            .filter_map(|matched| self.catalog.records().get(matched.position))
            .collect()
    }

    /// Distinct non-empty values of a field, deterministically ordered.
    /// The caller prepends the [`facet::FACET_ALL`] option itself.
    #[must_use]
    pub fn list_facet_values(&self, field: &str) -> Vec<String> {
        facet::distinct_values(&self.catalog, &self.aliases, field)
    }

    /// Narrows records to those whose field equals the selection
    /// (case-insensitive), preserving the input order.
    #[must_use]
    pub fn filter_by_facet<'a>(
        &self,
        records: Vec<&'a Record>,
        field: &str,
        selected: &str,
    ) -> Vec<&'a Record> {
        facet::filter_by_facet(records, &self.aliases, field, selected)
    }

    /// Search, then facet-narrow the survivors.
    ///
    /// The search step's relative ranking is preserved through the filter:
    /// intersection, not re-ranking.
    #[must_use]
    pub fn query(&self, text: &str, facet_field: &str, facet_value: &str) -> Vec<&Record> {
        self.filter_by_facet(self.search(text), facet_field, facet_value)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    use crate::facet::FACET_ALL;

    fn engine_of(rows: &[&[(&str, &str)]]) -> QueryEngine {
        let records = rows
            .iter()
            .map(|pairs| Record::from_pairs(pairs.iter().copied()))
            .collect();
        let catalog = Arc::new(Catalog::new(records, 1));
        QueryEngine::new(catalog, &CatalogConfig::default()).unwrap()
    }

    #[test]
    fn test_blank_search_returns_full_catalog_in_order() {
        let engine = engine_of(&[
            &[("brand_name", "Zeta")],
            &[("brand_name", "Acme")],
            &[("brand_name", "Mid")],
        ]);
        let all = engine.search("   ");
        assert_eq!(all.len(), 3);
        assert_eq!(engine.resolve(all[0], "brand_name"), "Zeta");
        assert_eq!(engine.resolve(all[2], "brand_name"), "Mid");
    }

    #[test]
    fn test_search_no_match_returns_empty() {
        let engine = engine_of(&[&[("brand_name", "Acme")]]);
        assert!(engine.search("nothing like this").is_empty());
    }

    #[test]
    fn test_query_composes_search_then_filter_preserving_order() {
        let engine = engine_of(&[
            &[("brand_name", "Acme Bistro"), ("region", "Paris")],
            &[("brand_name", "Acme"), ("region", "Lyon")],
            &[("brand_name", "Acme Diner"), ("region", "Paris")],
        ]);

        let searched = engine.search("acme");
        let filtered = engine.query("acme", "region", "Paris");

        // Filtering must keep the search ranking among survivors.
        let searched_paris: Vec<&Record> = searched
            .into_iter()
            .filter(|r| engine.resolve(r, "region") == "Paris")
            .collect();
        assert_eq!(filtered, searched_paris);
        assert_eq!(filtered.len(), 2);
    }

    #[test]
    fn test_query_all_facet_is_search_alone() {
        let engine = engine_of(&[
            &[("brand_name", "Acme"), ("region", "Paris")],
            &[("brand_name", "Acme Two"), ("region", "Lyon")],
        ]);
        assert_eq!(
            engine.query("acme", "region", FACET_ALL),
            engine.search("acme")
        );
    }

    #[test]
    fn test_list_facet_values_is_deterministic() {
        let engine = engine_of(&[
            &[("region", "Paris")],
            &[("region", "Lyon")],
            &[("region", "paris")],
        ]);
        assert_eq!(engine.list_facet_values("region"), vec!["Lyon", "Paris"]);
    }

    #[test]
    fn test_engine_reports_catalog_generation() {
        let catalog = Arc::new(Catalog::new(Vec::new(), 7));
        let engine = QueryEngine::new(catalog, &CatalogConfig::default()).unwrap();
        assert_eq!(engine.generation(), 7);
    }

    #[test]
    fn test_resolve_spans_schema_revisions() {
        // One record per header revision; both resolve through the
        // canonical name.
        let engine = engine_of(&[
            &[("Official Website", "https://old.example")],
            &[("Website URL", "https://new.example")],
        ]);
        let records = engine.search("");
        assert_eq!(
            engine.resolve(records[0], "website_url"),
            "https://old.example"
        );
        assert_eq!(
            engine.resolve(records[1], "website_url"),
            "https://new.example"
        );
    }
}
