//! Embedded query extraction.
//!
//! Recovers the literal data-source query (usually SQL) embedded as a string
//! argument inside a Power Query (M) expression. The extractor only locates
//! text; it never validates or runs it.
//!
//! # Algorithm
//!
//! ```text
//! expression
//!    │
//!    ▼ ordered matchers (first accepted literal wins)
//! ┌────────────────────────────────────────────────────────────┐
//! │ native_query_call → query_assignment → connection_call →   │
//! │ any_literal                                                │
//! └────────────────────────────────────────────────────────────┘
//!    │ literal: unescape, then
//!    │   unquoted ';' found          → text up to it
//!    │   starts with a keyword       → whole text
//!    │   keyword somewhere inside    → from it, truncated
//!    ▼ nothing accepted
//! ┌────────────────────────────────────────────────────────────┐
//! │ concatenation: literal pieces of the call's 2nd argument   │
//! └────────────────────────────────────────────────────────────┘
//!    │
//!    ▼ empty string when nothing matched
//! ```
//!
//! # Example
//!
//! ```
//! use vertiscope::extract::extract_native_query;
//!
//! let m = r#"let Source = Value.NativeQuery(Db, "SELECT a FROM t; Refresh()") in Source"#;
//! assert_eq!(extract_native_query(m), "SELECT a FROM t;");
//! assert_eq!(extract_native_query("Table.SelectRows(t, each [Key] = 1)"), "");
//! ```

mod matchers;
mod scan;

pub use matchers::MatchSource;
pub use scan::truncate_to_first_statement;

use regex::Regex;
use serde::Serialize;
use std::sync::{Arc, LazyLock};
use tracing::trace;

use crate::config::{ExtractorSettings, SettingsError};
use matchers::{build_matchers, literal_pieces, LiteralMatcher};
use scan::{call_arguments, first_statement, split_arguments};

static DEFAULT_EXTRACTOR: LazyLock<Arc<QueryExtractor>> = LazyLock::new(|| {
    Arc::new(
        QueryExtractor::new(&ExtractorSettings::default())
            .expect("default extractor settings are valid"),
    )
});

/// Shared extractor built from the default settings.
pub fn default_extractor() -> Arc<QueryExtractor> {
    Arc::clone(&DEFAULT_EXTRACTOR)
}

/// Extract the literal query embedded in `expression` with the default
/// settings. Returns an empty string when the expression embeds none.
pub fn extract_native_query(expression: &str) -> String {
    DEFAULT_EXTRACTOR.extract_text(expression)
}

/// A recovered query and the matcher that found it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryExtraction {
    pub text: String,
    pub source: MatchSource,
}

/// Configured embedded-query extractor. Stateless once built.
#[derive(Debug, Clone)]
pub struct QueryExtractor {
    matchers: Vec<LiteralMatcher>,
    /// Lowercased function names searched by the concatenation fallback
    concat_functions: Vec<String>,
    keyword_prefix: Regex,
    keyword_anywhere: Regex,
}

impl QueryExtractor {
    pub fn new(settings: &ExtractorSettings) -> Result<Self, SettingsError> {
        settings.validate()?;

        let invalid = |e: regex::Error| SettingsError::InvalidConfig(e.to_string());
        let matchers = build_matchers(
            &settings.native_query_functions,
            &settings.connection_functions,
        )
        .map_err(invalid)?;

        let keywords = settings
            .statement_keywords
            .iter()
            .map(|k| regex::escape(k.trim()))
            .collect::<Vec<_>>()
            .join("|");
        let keyword_prefix = Regex::new(&format!(r"(?i)^\s*(?:{keywords})\b")).map_err(invalid)?;
        let keyword_anywhere =
            Regex::new(&format!(r"(?is)\b(?:{keywords})\b.")).map_err(invalid)?;

        let concat_functions = settings
            .native_query_functions
            .iter()
            .chain(&settings.connection_functions)
            .map(|name| name.trim().to_ascii_lowercase())
            .filter(|name| !name.is_empty())
            .collect();

        Ok(Self {
            matchers,
            concat_functions,
            keyword_prefix,
            keyword_anywhere,
        })
    }

    /// Extract the embedded query, or `None` when the expression embeds none.
    pub fn extract(&self, expression: &str) -> Option<QueryExtraction> {
        if expression.trim().is_empty() {
            return None;
        }

        for matcher in &self.matchers {
            let Some(literal) = matcher.find(expression) else {
                continue;
            };
            if literal.is_empty() {
                continue;
            }
            if let Some(text) = self.accept_literal(&literal.unescape()) {
                trace!(source = %matcher.source(), "embedded query matched");
                return Some(QueryExtraction {
                    text,
                    source: matcher.source(),
                });
            }
        }

        let joined = self.reconstruct_concatenation(expression)?;
        let statement = first_statement(&joined);
        if statement.is_terminated() || self.starts_with_keyword(statement.as_str()) {
            return Some(QueryExtraction {
                text: statement.as_str().to_string(),
                source: MatchSource::Concatenation,
            });
        }
        None
    }

    /// Like [`extract`](Self::extract) but yields an empty string for "no query".
    pub fn extract_text(&self, expression: &str) -> String {
        self.extract(expression)
            .map(|extraction| extraction.text)
            .unwrap_or_default()
    }

    /// Decide whether an unescaped literal holds a query.
    ///
    /// An unquoted semicolon always terminates the statement, even when the
    /// text before it does not start with a keyword.
    fn accept_literal(&self, content: &str) -> Option<String> {
        let statement = first_statement(content);
        if statement.is_terminated() || self.starts_with_keyword(statement.as_str()) {
            return Some(statement.as_str().to_string());
        }

        let found = self.keyword_anywhere.find(content)?;
        let tail = content[found.start()..]
            .trim_start_matches(['\r', '\n', '\t', ' ', ';'])
            .trim();
        Some(truncate_to_first_statement(tail).to_string())
    }

    fn starts_with_keyword(&self, text: &str) -> bool {
        self.keyword_prefix.is_match(text)
    }

    /// Approximate a query assembled at runtime from literal pieces.
    ///
    /// Takes the second argument of the first recognised call and joins its
    /// quoted pieces with single spaces, in order.
    fn reconstruct_concatenation(&self, expression: &str) -> Option<String> {
        // ASCII lowercasing keeps byte offsets aligned with `expression`
        let lower = expression.to_ascii_lowercase();
        for name in &self.concat_functions {
            let Some(at) = lower.find(name.as_str()) else {
                continue;
            };
            let Some(open) = expression[at..].find('(').map(|p| at + p) else {
                continue;
            };
            let args = split_arguments(call_arguments(expression, open));
            let Some(second) = args.get(1) else {
                continue;
            };
            let pieces = literal_pieces(second);
            if !pieces.is_empty() {
                return Some(pieces.join(" "));
            }
        }
        None
    }
}
