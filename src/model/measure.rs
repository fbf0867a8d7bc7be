// src/model/measure.rs
use serde::Serialize;

/// A DAX measure. Optional fields are empty strings when the backend has no value.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Measure {
    pub table_name: String,
    pub name: String,
    pub expression: String,
    pub display_folder: String,
    pub description: String,
}

/// A table defined by a DAX expression.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct CalculatedTable {
    pub table_name: String,
    pub expression: String,
}

/// A named Power Query (M) parameter expression.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Parameter {
    pub name: String,
    pub description: String,
    pub expression: String,
    pub modified_time: String,
}

/// A model-level annotation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Annotation {
    pub name: String,
    pub value: String,
}
