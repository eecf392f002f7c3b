//! The in-memory catalog and its load lifecycle.
//!
//! [`CatalogLoader`] is the sole writer: one async `load` composes the
//! fetcher, parser, key normalizer, alias table, and sanitizer into a fresh
//! generation-tagged [`Catalog`]. Catalogs are replace-only: a successful
//! load supersedes the previous catalog wholesale, and a load that has
//! itself been superseded discards its result instead of committing it.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::config::{CatalogConfig, ConfigError};
use crate::fetch::{FetchError, Fetcher};
use crate::parse::{RawRow, parse_rows};
use crate::sanitize::Sanitizer;
use crate::schema::{AliasTable, normalize_key};

/// One catalog entry: canonical key → cleaned value.
///
/// Every value is either a non-empty trimmed string or `""` meaning "field
/// absent"; sentinel tokens never survive into a record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Record {
    fields: HashMap<String, String>,
}

impl Record {
    /// Creates an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a record from key/value pairs, normalizing keys and trimming
    /// values. For duplicate keys the first pair wins.
    #[must_use]
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut record = Self::new();
        for (key, value) in pairs {
            record.insert_first(normalize_key(key), value.trim().to_string());
        }
        record
    }

    /// Inserts a value unless the key is already present.
    pub(crate) fn insert_first(&mut self, key: String, value: String) {
        self.fields.entry(key).or_insert(value);
    }

    /// Direct lookup by canonical key, without alias fallback.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// Resolves a field by any of its names through the alias table.
    /// Returns `""` when the field is absent under every known name.
    #[must_use]
    pub fn resolve<'a>(&'a self, aliases: &AliasTable, name: &str) -> &'a str {
        aliases.resolve(&self.fields, name)
    }

    /// Number of fields present (including empty-valued ones).
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true when the record has no fields at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// The full ordered collection of records for one load generation.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Catalog {
    records: Vec<Record>,
    generation: u64,
}

impl Catalog {
    /// Creates a catalog from records, tagged with its load generation.
    #[must_use]
    pub fn new(records: Vec<Record>, generation: u64) -> Self {
        Self {
            records,
            generation,
        }
    }

    /// Records in source row order.
    #[must_use]
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// The load generation that produced this catalog.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true when the catalog holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Monotonically increasing load-generation counter.
///
/// Each load begins a new generation; a load commits its catalog only if
/// its generation is still the latest at completion time. This replaces
/// flag-based cancellation: superseded loads run to completion and their
/// results are silently discarded.
#[derive(Debug, Default)]
pub struct Generations {
    issued: AtomicU64,
}

impl Generations {
    /// Begins a new generation and returns its tag.
    pub fn begin(&self) -> u64 {
        self.issued.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Returns true while no later generation has begun.
    #[must_use]
    pub fn is_current(&self, generation: u64) -> bool {
        self.issued.load(Ordering::SeqCst) == generation
    }
}

/// Outcome of one load attempt.
#[derive(Debug)]
pub enum LoadOutcome {
    /// The load completed as the latest generation; this catalog replaces
    /// any prior one.
    Loaded(Catalog),
    /// A newer load began before this one completed; the result was
    /// discarded.
    Superseded {
        /// The superseded load's generation tag.
        generation: u64,
    },
}

impl LoadOutcome {
    /// The committed catalog, if this load was not superseded.
    #[must_use]
    pub fn into_catalog(self) -> Option<Catalog> {
        match self {
            Self::Loaded(catalog) => Some(catalog),
            Self::Superseded { .. } => None,
        }
    }
}

/// Owns the load lifecycle: fetch, parse, normalize, sanitize, commit.
#[derive(Debug)]
pub struct CatalogLoader {
    config: CatalogConfig,
    fetcher: Fetcher,
    aliases: AliasTable,
    sanitizer: Sanitizer,
    generations: Generations,
}

impl CatalogLoader {
    /// Creates a loader from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when the configuration does not validate.
    pub fn new(config: CatalogConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let aliases = config.alias_table()?;
        let sanitizer = Sanitizer::new(&config.empty_tokens);
        let fetcher =
            Fetcher::new_with_timeouts(config.connect_timeout_secs, config.read_timeout_secs);
        Ok(Self {
            config,
            fetcher,
            aliases,
            sanitizer,
            generations: Generations::default(),
        })
    }

    /// The loader's configuration.
    #[must_use]
    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    /// The loader's validated alias table.
    #[must_use]
    pub fn aliases(&self) -> &AliasTable {
        &self.aliases
    }

    /// Loads a fresh catalog from the configured endpoint chain.
    ///
    /// Fetching is the only fallible stage; parsing and sanitization are
    /// total. If a newer load began while this one was in flight, the
    /// result (catalog or fetch error alike) is discarded and
    /// [`LoadOutcome::Superseded`] is returned instead.
    ///
    /// # Errors
    ///
    /// Returns the last attempt's [`FetchError`] when every endpoint in the
    /// chain failed and this load is still the latest generation.
    #[instrument(skip(self), fields(endpoint = %self.config.endpoint))]
    pub async fn load(&self) -> Result<LoadOutcome, FetchError> {
        let generation = self.generations.begin();
        debug!(generation, "load started");

        let fetched = self
            .fetcher
            .fetch_text(&self.config.endpoint, &self.config.rewrites)
            .await;

        if !self.generations.is_current(generation) {
            debug!(generation, "load superseded; discarding result");
            return Ok(LoadOutcome::Superseded { generation });
        }

        let text = fetched?;
        let rows = parse_rows(&text, self.config.delimiter);
        let records = self.build_records(rows);
        info!(generation, records = records.len(), "catalog loaded");
        Ok(LoadOutcome::Loaded(Catalog::new(records, generation)))
    }

    /// Normalizes and sanitizes raw rows into records.
    ///
    /// Raw headers normalize to canonical keys; headers normalizing to the
    /// empty key are dropped, and when two columns normalize to the same
    /// key the leftmost wins.
    fn build_records(&self, rows: Vec<RawRow>) -> Vec<Record> {
        rows.into_iter()
            .map(|row| {
                let mut record = Record::new();
                for (raw_header, raw_value) in row {
                    let key = normalize_key(&raw_header);
                    if key.is_empty() {
                        continue;
                    }
                    record.insert_first(key, self.sanitizer.clean(&raw_value));
                }
                record
            })
            .collect()
    }
}
