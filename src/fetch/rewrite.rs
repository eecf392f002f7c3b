//! Endpoint rewrite strategies for fallback fetching.
//!
//! A rewrite is a pure transform of the primary endpoint URL into an
//! alternate URL, typically a public read-through proxy that relays the
//! same document when the primary is unreachable from the client's network.

use serde::{Deserialize, Serialize};

/// A pure endpoint → alternate-URL transform, applied in declared order
/// after the primary endpoint fails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RewriteRule {
    /// Prefix followed by the URL-encoded original endpoint
    /// (`https://proxy.example/?url=` + encoded target).
    PrefixEncoded {
        /// Proxy URL prefix the encoded endpoint is appended to.
        prefix: String,
    },
    /// Template with a `{url}` placeholder replaced by the URL-encoded
    /// original endpoint.
    Template {
        /// Template containing exactly one `{url}` placeholder.
        template: String,
    },
}

impl RewriteRule {
    /// Creates a prefix-encoded proxy rule.
    #[must_use]
    pub fn prefix_encoded(prefix: impl Into<String>) -> Self {
        Self::PrefixEncoded {
            prefix: prefix.into(),
        }
    }

    /// Creates a template proxy rule.
    #[must_use]
    pub fn template(template: impl Into<String>) -> Self {
        Self::Template {
            template: template.into(),
        }
    }

    /// Applies the rewrite to the primary endpoint.
    #[must_use]
    pub fn apply(&self, endpoint: &str) -> String {
        let encoded = urlencoding::encode(endpoint);
        match self {
            Self::PrefixEncoded { prefix } => format!("{prefix}{encoded}"),
            Self::Template { template } => template.replace("{url}", &encoded),
        }
    }

    /// Short label for attempt logging.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::PrefixEncoded { prefix } => prefix,
            Self::Template { template } => template,
        }
    }
}
