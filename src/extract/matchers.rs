//! Ordered literal matchers.
//!
//! Each matcher locates one quoted literal in an expression and reports which
//! pattern found it. The extractor tries them in order; the first literal that
//! yields a query wins.

use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::LazyLock;

/// A double- or single-quoted literal where a doubled delimiter is an escape.
const QUOTED_LITERAL: &str = r#"(?:"((?:[^"]|"")*)"|'((?:[^']|'')*)')"#;

static LITERAL_PIECE: LazyLock<Regex> = LazyLock::new(|| Regex::new(QUOTED_LITERAL).unwrap());

/// Which matcher produced an extracted query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchSource {
    /// Literal passed as the second argument of a native-query call
    NativeQueryCall,
    /// `Query = "<literal>"` option
    QueryAssignment,
    /// Literal anywhere in the arguments of a database-connection call
    ConnectionCall,
    /// First quoted literal of the expression
    AnyLiteral,
    /// Literal pieces of a concatenated second argument, joined
    Concatenation,
}

impl MatchSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchSource::NativeQueryCall => "native_query_call",
            MatchSource::QueryAssignment => "query_assignment",
            MatchSource::ConnectionCall => "connection_call",
            MatchSource::AnyLiteral => "any_literal",
            MatchSource::Concatenation => "concatenation",
        }
    }
}

impl fmt::Display for MatchSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Quote {
    Double,
    Single,
}

impl Quote {
    fn doubled(self) -> &'static str {
        match self {
            Quote::Double => "\"\"",
            Quote::Single => "''",
        }
    }

    fn single(self) -> &'static str {
        match self {
            Quote::Double => "\"",
            Quote::Single => "'",
        }
    }
}

/// The raw (still escaped) body of a quoted literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Literal<'a> {
    pub raw: &'a str,
    pub quote: Quote,
}

impl Literal<'_> {
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Collapse doubled delimiters into single quote characters. The other
    /// quote character is left as written, so `''` inside a double-quoted
    /// literal stays doubled.
    pub fn unescape(&self) -> String {
        self.raw.replace(self.quote.doubled(), self.quote.single())
    }

    fn from_captures<'a>(caps: &regex::Captures<'a>) -> Option<Literal<'a>> {
        if let Some(m) = caps.get(1) {
            return Some(Literal {
                raw: m.as_str(),
                quote: Quote::Double,
            });
        }
        caps.get(2).map(|m| Literal {
            raw: m.as_str(),
            quote: Quote::Single,
        })
    }
}

#[derive(Debug, Clone)]
pub(crate) struct LiteralMatcher {
    source: MatchSource,
    pattern: Regex,
}

impl LiteralMatcher {
    pub fn source(&self) -> MatchSource {
        self.source
    }

    pub fn find<'a>(&self, text: &'a str) -> Option<Literal<'a>> {
        let caps = self.pattern.captures(text)?;
        Literal::from_captures(&caps)
    }
}

/// Build the matchers in priority order.
///
/// A call matcher is left out when its function list is empty.
pub(crate) fn build_matchers(
    native_query_functions: &[String],
    connection_functions: &[String],
) -> Result<Vec<LiteralMatcher>, regex::Error> {
    let mut patterns = Vec::new();

    if let Some(names) = alternation(native_query_functions) {
        patterns.push((
            MatchSource::NativeQueryCall,
            format!(r"(?i)(?:{names})\([^,]*,\s*{QUOTED_LITERAL}"),
        ));
    }
    patterns.push((
        MatchSource::QueryAssignment,
        format!(r"(?i)Query\s*=\s*{QUOTED_LITERAL}"),
    ));
    if let Some(names) = alternation(connection_functions) {
        patterns.push((
            MatchSource::ConnectionCall,
            format!(r"(?i)(?:{names})\([^)]*{QUOTED_LITERAL}"),
        ));
    }
    patterns.push((MatchSource::AnyLiteral, QUOTED_LITERAL.to_string()));

    patterns
        .into_iter()
        .map(|(source, pattern)| {
            Ok(LiteralMatcher {
                source,
                pattern: Regex::new(&pattern)?,
            })
        })
        .collect()
}

/// Every quoted literal of `text`, unescaped, in order. Unquoted tokens such
/// as variable references are skipped.
pub(crate) fn literal_pieces(text: &str) -> Vec<String> {
    LITERAL_PIECE
        .captures_iter(text)
        .filter_map(|caps| Literal::from_captures(&caps).map(|lit| lit.unescape()))
        .collect()
}

fn alternation(names: &[String]) -> Option<String> {
    let names: Vec<String> = names
        .iter()
        .map(|n| n.trim())
        .filter(|n| !n.is_empty())
        .map(regex::escape)
        .collect();
    if names.is_empty() {
        None
    } else {
        Some(names.join("|"))
    }
}
