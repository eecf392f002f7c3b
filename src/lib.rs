//! Venue Catalog Core Library
//!
//! This library turns a loosely-structured, externally-hosted tabular data
//! source (evolving column headers, free-text values, occasional error
//! sentinels) into a clean, queryable in-memory catalog with fuzzy text
//! search and exact facet filtering.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`fetch`] - Resilient payload acquisition over an ordered endpoint chain
//! - [`parse`] - Total header-row parsing of character-separated text
//! - [`schema`] - Canonical keys and alias resolution across header revisions
//! - [`sanitize`] - Sentinel-token cleanup of raw cell values
//! - [`catalog`] - The in-memory catalog and its generation-tagged load lifecycle
//! - [`search`] - Approximate search index over configured fields
//! - [`facet`] - Facet enumeration and exact-match narrowing
//! - [`query`] - The combined query surface consumed by presentation
//! - [`config`] - One explicit configuration value for all of the above
//!
//! Data flows one way: endpoint → fetch → parse → normalize + sanitize →
//! [`catalog::Catalog`] → [`search::SearchIndex`] / [`facet`] →
//! [`query::QueryEngine`]. Catalogs are replace-only snapshots; queries are
//! synchronous and pure.

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod catalog;
pub mod config;
pub mod facet;
pub mod fetch;
pub mod parse;
pub mod query;
pub mod sanitize;
pub mod schema;
pub mod search;

#[cfg(test)]
mod test_support;

// Re-export commonly used types
pub use catalog::{Catalog, CatalogLoader, Generations, LoadOutcome, Record};
pub use config::{CatalogConfig, ConfigError, DEFAULT_FUZZY_THRESHOLD};
pub use facet::{FACET_ALL, distinct_values, filter_by_facet};
pub use fetch::{FetchError, Fetcher, RewriteRule};
pub use parse::{RawRow, parse_rows};
pub use query::QueryEngine;
pub use sanitize::Sanitizer;
pub use schema::{AliasEntry, AliasTable, normalize_key};
pub use search::{MatchKind, RankedMatch, SearchIndex};
