//! Relationships between tables.

use serde::Serialize;

/// One side of a relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Multiplicity {
    One,
    Many,
}

impl Multiplicity {
    /// Parse a fragment multiplicity (`One` / `Many`, case-insensitive).
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.eq_ignore_ascii_case("one") {
            Some(Multiplicity::One)
        } else if value.eq_ignore_ascii_case("many") {
            Some(Multiplicity::Many)
        } else {
            None
        }
    }

    /// Map a relational store cardinality code (1 = one, 2 = many).
    pub fn from_store_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(Multiplicity::One),
            2 => Some(Multiplicity::Many),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Cardinality {
    #[serde(rename = "one-to-one")]
    OneToOne,
    #[serde(rename = "one-to-many")]
    OneToMany,
    #[serde(rename = "many-to-one")]
    ManyToOne,
    #[serde(rename = "many-to-many")]
    ManyToMany,
}

impl Cardinality {
    /// Derive the cardinality from the declared endpoint multiplicities.
    ///
    /// Anything not fully specified falls back to many-to-one.
    pub fn from_multiplicities(from: Option<Multiplicity>, to: Option<Multiplicity>) -> Self {
        use Multiplicity::*;
        match (from, to) {
            (Some(Many), Some(One)) => Cardinality::ManyToOne,
            (Some(One), Some(Many)) => Cardinality::OneToMany,
            (Some(One), Some(One)) => Cardinality::OneToOne,
            (Some(Many), Some(Many)) => Cardinality::ManyToMany,
            _ => Cardinality::ManyToOne,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Cardinality::OneToOne => "one-to-one",
            Cardinality::OneToMany => "one-to-many",
            Cardinality::ManyToOne => "many-to-one",
            Cardinality::ManyToMany => "many-to-many",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CrossFilter {
    #[default]
    Single,
    Both,
}

impl CrossFilter {
    /// Map a relational store code (2 = both directions, anything else single).
    pub fn from_store_code(code: i64) -> Self {
        if code == 2 {
            CrossFilter::Both
        } else {
            CrossFilter::Single
        }
    }
}

/// A relationship between two columns.
///
/// Endpoint names that could not be resolved are empty strings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Relationship {
    pub from_table: String,
    pub from_column: String,
    pub to_table: String,
    pub to_column: String,
    pub is_active: bool,
    pub cardinality: Cardinality,
    pub cross_filter: CrossFilter,
    pub rely_on_referential_integrity: bool,
    /// 0 when unknown
    pub from_key_count: i64,
    /// 0 when unknown
    pub to_key_count: i64,
}
