//! Semantic column types and the backend type mappings.

use serde::Serialize;
use std::fmt;

/// Normalized data type assigned to a column, independent of the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SemanticType {
    Text,
    Integer,
    Float,
    DateTime,
    Bool,
    /// Unrecognized, variant or empty source types
    Opaque,
}

impl SemanticType {
    /// Map a key-column data type as declared in a dimension fragment.
    pub fn from_fragment_type(name: &str) -> Self {
        match name.trim() {
            "WChar" => SemanticType::Text,
            "Integer" | "BigInt" => SemanticType::Integer,
            "Double" | "Currency" => SemanticType::Float,
            "Date" => SemanticType::DateTime,
            "Boolean" => SemanticType::Bool,
            _ => SemanticType::Opaque,
        }
    }

    /// Map an `ExplicitDataType` code from the relational metadata store.
    pub fn from_store_code(code: i64) -> Self {
        match code {
            2 => SemanticType::Text,
            6 => SemanticType::Integer,
            8 | 10 => SemanticType::Float,
            9 => SemanticType::DateTime,
            11 => SemanticType::Bool,
            _ => SemanticType::Opaque,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SemanticType::Text => "text",
            SemanticType::Integer => "integer",
            SemanticType::Float => "float",
            SemanticType::DateTime => "datetime",
            SemanticType::Bool => "bool",
            SemanticType::Opaque => "opaque",
        }
    }
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
