//! Catalog configuration: one explicit value instead of scattered constants.
//!
//! Everything the load and query pipeline can vary on (endpoint, proxy
//! rewrites, delimiter, sentinel blacklist, alias table, searchable fields,
//! fuzzy threshold, HTTP timeouts) lives in [`CatalogConfig`], passed into
//! [`CatalogLoader::new`] and [`QueryEngine::new`] at construction time so
//! tests can substitute any of it.
//!
//! [`CatalogLoader::new`]: crate::catalog::CatalogLoader::new
//! [`QueryEngine::new`]: crate::query::QueryEngine::new

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::fetch::{DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_READ_TIMEOUT_SECS, RewriteRule};
use crate::schema::{AliasEntry, AliasTable};

/// Default fuzzy-match similarity threshold (0.0–1.0); matches at or above
/// this are included.
pub const DEFAULT_FUZZY_THRESHOLD: f64 = 0.86;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No endpoint URL was configured.
    #[error("endpoint URL is not configured")]
    MissingEndpoint,

    /// The configured endpoint does not parse as a URL.
    #[error("invalid endpoint URL: {endpoint}")]
    InvalidEndpoint {
        /// The offending endpoint string.
        endpoint: String,
    },

    /// The fuzzy threshold is outside the valid similarity range.
    #[error("fuzzy threshold {value} outside 0.0..=1.0")]
    InvalidThreshold {
        /// The offending threshold.
        value: f64,
    },

    /// Two alias entries normalize to the same legacy key.
    #[error("duplicate alias for normalized key \"{key}\"")]
    DuplicateAlias {
        /// The duplicated normalized legacy key.
        key: String,
    },
}

/// Complete configuration for loading and querying one catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Primary endpoint URL of the published tabular document.
    pub endpoint: String,

    /// Ordered endpoint rewrites tried after the primary fails.
    pub rewrites: Vec<RewriteRule>,

    /// Field delimiter of the payload.
    pub delimiter: char,

    /// Cell values treated as "field absent", matched case-insensitively
    /// after trimming.
    pub empty_tokens: Vec<String>,

    /// Legacy-header → canonical-key alias declarations.
    pub aliases: Vec<AliasEntry>,

    /// Canonical fields participating in fuzzy search.
    pub search_fields: Vec<String>,

    /// Minimum fuzzy similarity for a match (0.0–1.0).
    pub fuzzy_threshold: f64,

    /// HTTP connect timeout in seconds.
    pub connect_timeout_secs: u64,

    /// HTTP read timeout in seconds.
    pub read_timeout_secs: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            rewrites: default_rewrites(),
            delimiter: ',',
            empty_tokens: default_empty_tokens(),
            aliases: default_aliases(),
            search_fields: default_search_fields(),
            fuzzy_threshold: DEFAULT_FUZZY_THRESHOLD,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            read_timeout_secs: DEFAULT_READ_TIMEOUT_SECS,
        }
    }
}

impl CatalogConfig {
    /// Default configuration pointed at the given endpoint.
    #[must_use]
    pub fn for_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Self::default()
        }
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when the endpoint is missing or malformed,
    /// the fuzzy threshold is out of range, or the alias declarations do
    /// not form a valid table.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.endpoint.trim().is_empty() {
            return Err(ConfigError::MissingEndpoint);
        }
        if Url::parse(&self.endpoint).is_err() {
            return Err(ConfigError::InvalidEndpoint {
                endpoint: self.endpoint.clone(),
            });
        }
        if !(0.0..=1.0).contains(&self.fuzzy_threshold) {
            return Err(ConfigError::InvalidThreshold {
                value: self.fuzzy_threshold,
            });
        }
        AliasTable::new(&self.aliases)?;
        Ok(())
    }

    /// Builds the validated alias table declared by this configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::DuplicateAlias`] when two entries normalize to
    /// the same legacy key.
    pub fn alias_table(&self) -> Result<AliasTable, ConfigError> {
        AliasTable::new(&self.aliases)
    }
}

/// Default proxy rewrites: two public read-through proxy shapes.
#[must_use]
pub fn default_rewrites() -> Vec<RewriteRule> {
    vec![
        RewriteRule::prefix_encoded("https://corsproxy.io/?url="),
        RewriteRule::template("https://api.allorigins.win/raw?url={url}"),
    ]
}

/// Default sentinel blacklist: spreadsheet formula-error markers and
/// explicit null spellings.
#[must_use]
pub fn default_empty_tokens() -> Vec<String> {
    [
        "#n/a", "#ref!", "#value!", "#error!", "#div/0!", "#name?", "#null!", "n/a", "na",
        "null", "none", "nil", "undefined",
    ]
    .iter()
    .map(ToString::to_string)
    .collect()
}

/// Default alias table covering the header revisions seen so far.
#[must_use]
pub fn default_aliases() -> Vec<AliasEntry> {
    vec![
        AliasEntry::new("brand", "brand_name"),
        AliasEntry::new("official website", "website_url"),
        AliasEntry::new("website", "website_url"),
        AliasEntry::new("region/country", "region"),
        AliasEntry::new("country", "region"),
        AliasEntry::new("area/city", "area"),
        AliasEntry::new("city", "area"),
        AliasEntry::new("phone number", "phone"),
        AliasEntry::new("opening hours (mon-sun)", "opening_hours"),
        AliasEntry::new("hours", "opening_hours"),
        AliasEntry::new("cuisine type", "cuisine"),
    ]
}

/// Default searchable canonical fields.
#[must_use]
pub fn default_search_fields() -> Vec<String> {
    [
        "brand_name",
        "area",
        "address",
        "website_url",
        "tags",
        "cuisine",
        "opening_hours",
        "region",
    ]
    .iter()
    .map(ToString::to_string)
    .collect()
}
