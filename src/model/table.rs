// src/model/table.rs
use crate::model::types::SemanticType;
use serde::Serialize;

/// A table of the semantic model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    pub name: String,
    pub visible: bool,
    /// Identifier the table was reconciled from (dimension id or store row id)
    pub source_id: String,
    /// Column names in storage order; each names one entry of the model's columns
    pub columns: Vec<String>,
}

impl Table {
    pub fn new(name: impl Into<String>, source_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            visible: true,
            source_id: source_id.into(),
            columns: Vec::new(),
        }
    }
}

/// How a column gets its values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    /// Loaded from the data source
    Data,
    /// Computed from a DAX expression
    Calculated,
    /// Any other store-specific column type code
    Other(i64),
}

impl ColumnKind {
    /// Map the relational store's `Column.Type` code.
    pub fn from_store_code(code: i64) -> Self {
        match code {
            1 => ColumnKind::Data,
            2 => ColumnKind::Calculated,
            other => ColumnKind::Other(other),
        }
    }
}

/// Physical storage artifacts of a column. Any role may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StorageFiles {
    pub dictionary: Option<String>,
    pub hierarchy_index: Option<String>,
    pub data_file: Option<String>,
}

impl StorageFiles {
    pub fn is_empty(&self) -> bool {
        self.dictionary.is_none() && self.hierarchy_index.is_none() && self.data_file.is_none()
    }
}

/// Encoding and compression statistics of a column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnStats {
    /// Distinct value count
    pub cardinality: i64,
    pub base_id: i64,
    pub magnitude: f64,
    pub is_nullable: bool,
    pub has_nulls: bool,
    pub min_data_id: i64,
    pub max_data_id: i64,
    pub rle_runs: i64,
    pub compression_type: i64,
}

impl Default for ColumnStats {
    fn default() -> Self {
        Self {
            cardinality: 0,
            base_id: 0,
            magnitude: 0.0,
            is_nullable: true,
            has_nulls: false,
            min_data_id: 0,
            max_data_id: 0,
            rle_runs: 0,
            compression_type: 0,
        }
    }
}

/// A column, keyed by (table name, column name).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    pub table_name: String,
    pub name: String,
    pub data_type: SemanticType,
    pub kind: ColumnKind,
    /// DAX expression of a calculated column, empty otherwise
    pub expression: String,
    pub storage: StorageFiles,
    pub stats: ColumnStats,
    pub modified_time: String,
    pub structure_modified_time: String,
}

impl Column {
    pub fn new(
        table_name: impl Into<String>,
        name: impl Into<String>,
        data_type: SemanticType,
    ) -> Self {
        Self {
            table_name: table_name.into(),
            name: name.into(),
            data_type,
            kind: ColumnKind::Data,
            expression: String::new(),
            storage: StorageFiles::default(),
            stats: ColumnStats::default(),
            modified_time: String::new(),
            structure_modified_time: String::new(),
        }
    }

    pub fn is_calculated(&self) -> bool {
        self.kind == ColumnKind::Calculated
    }
}
