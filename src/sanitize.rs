//! Cell-value sanitization: garbage in, empty string out.
//!
//! Published spreadsheets leak formula error markers (`#N/A`, `#REF!`) and
//! explicit null spellings into exported cells. Every cell passes through
//! [`Sanitizer::clean`] during catalog construction, so downstream consumers
//! only ever see a trimmed value or `""` for "field absent", never a
//! sentinel token.

use std::collections::HashSet;

/// Maps raw cell values to cleaned values.
#[derive(Debug, Clone, Default)]
pub struct Sanitizer {
    tokens: HashSet<String>,
}

impl Sanitizer {
    /// Creates a sanitizer from a blacklist of sentinel tokens.
    ///
    /// Tokens are matched case-insensitively against the trimmed cell value.
    #[must_use]
    pub fn new<I, T>(tokens: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        Self {
            tokens: tokens
                .into_iter()
                .map(|token| token.as_ref().trim().to_lowercase())
                .filter(|token| !token.is_empty())
                .collect(),
        }
    }

    /// Cleans one raw cell value.
    ///
    /// Trims the input; a trimmed value matching a blacklisted token under
    /// case folding becomes `""`, anything else passes through trimmed and
    /// otherwise unchanged. Total: never fails, never returns a sentinel.
    #[must_use]
    pub fn clean(&self, raw: &str) -> String {
        let trimmed = raw.trim();
        if trimmed.is_empty() || self.tokens.contains(&trimmed.to_lowercase()) {
            String::new()
        } else {
            trimmed.to_string()
        }
    }
}
