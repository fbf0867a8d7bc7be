//! Canonical semantic model.
//!
//! Both metadata adapters produce this same value. Every collection is always
//! present (possibly empty) so downstream consumers get one uniform contract.
//! The model is assembled through [`ModelBuilder`] by exactly one writer and is
//! read-only once built.

pub mod measure;
pub mod partition;
pub mod relationship;
pub mod security;
pub mod table;
pub mod types;

pub use measure::{Annotation, CalculatedTable, Measure, Parameter};
pub use partition::Partition;
pub use relationship::{Cardinality, CrossFilter, Multiplicity, Relationship};
pub use security::SecurityRule;
pub use table::{Column, ColumnKind, ColumnStats, StorageFiles, Table};
pub use types::SemanticType;

use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// The unified view of a loaded tabular model.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SemanticModel {
    tables: Vec<Table>,
    columns: Vec<Column>,
    relationships: Vec<Relationship>,
    measures: Vec<Measure>,
    partitions: Vec<Partition>,
    calculated_tables: Vec<CalculatedTable>,
    parameters: Vec<Parameter>,
    annotations: Vec<Annotation>,
    security_rules: Vec<SecurityRule>,
}

impl SemanticModel {
    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn relationships(&self) -> &[Relationship] {
        &self.relationships
    }

    pub fn measures(&self) -> &[Measure] {
        &self.measures
    }

    pub fn partitions(&self) -> &[Partition] {
        &self.partitions
    }

    pub fn calculated_tables(&self) -> &[CalculatedTable] {
        &self.calculated_tables
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    pub fn security_rules(&self) -> &[SecurityRule] {
        &self.security_rules
    }

    /// Look up a table by name.
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name == name)
    }

    /// Columns owned by `table`, in storage order.
    pub fn columns_of<'a>(&'a self, table: &'a str) -> impl Iterator<Item = &'a Column> + 'a {
        self.columns.iter().filter(move |c| c.table_name == table)
    }

    pub fn calculated_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| c.is_calculated())
    }

    /// `(table name, extracted query)` for every partition that embeds one.
    pub fn native_queries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.partitions
            .iter()
            .map(|p| (p.table_name.as_str(), p.native_query()))
            .filter(|(_, query)| !query.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
            && self.columns.is_empty()
            && self.relationships.is_empty()
            && self.measures.is_empty()
            && self.partitions.is_empty()
    }
}

/// Error returned when a column would break the (table, column) uniqueness.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("duplicate column {table}.{column}")]
pub struct DuplicateColumn {
    pub table: String,
    pub column: String,
}

/// Single-writer assembler for a [`SemanticModel`].
#[derive(Debug, Default)]
pub struct ModelBuilder {
    model: SemanticModel,
    table_index: HashMap<String, usize>,
    column_keys: HashSet<(String, String)>,
}

impl ModelBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a table. A later table with the same name replaces the earlier
    /// definition but keeps the columns already attached to it.
    pub fn add_table(&mut self, table: Table) {
        match self.table_index.get(&table.name) {
            Some(&idx) => {
                let existing = &mut self.model.tables[idx];
                let columns = std::mem::take(&mut existing.columns);
                *existing = table;
                for column in columns {
                    if !existing.columns.contains(&column) {
                        existing.columns.push(column);
                    }
                }
            }
            None => {
                self.table_index
                    .insert(table.name.clone(), self.model.tables.len());
                self.model.tables.push(table);
            }
        }
    }

    /// Add a column and attach it to its owning table, creating a visible
    /// table when none was added yet.
    pub fn add_column(&mut self, column: Column) -> Result<(), DuplicateColumn> {
        let key = (column.table_name.clone(), column.name.clone());
        if self.column_keys.contains(&key) {
            return Err(DuplicateColumn {
                table: key.0,
                column: key.1,
            });
        }

        let idx = match self.table_index.get(&column.table_name) {
            Some(&idx) => idx,
            None => {
                self.add_table(Table::new(column.table_name.clone(), ""));
                self.model.tables.len() - 1
            }
        };
        let table = &mut self.model.tables[idx];
        if !table.columns.contains(&column.name) {
            table.columns.push(column.name.clone());
        }

        self.column_keys.insert(key);
        self.model.columns.push(column);
        Ok(())
    }

    pub fn add_relationship(&mut self, relationship: Relationship) {
        self.model.relationships.push(relationship);
    }

    pub fn add_measure(&mut self, measure: Measure) {
        self.model.measures.push(measure);
    }

    pub fn add_partition(&mut self, partition: Partition) {
        self.model.partitions.push(partition);
    }

    pub fn add_calculated_table(&mut self, table: CalculatedTable) {
        self.model.calculated_tables.push(table);
    }

    pub fn add_parameter(&mut self, parameter: Parameter) {
        self.model.parameters.push(parameter);
    }

    pub fn add_annotation(&mut self, annotation: Annotation) {
        self.model.annotations.push(annotation);
    }

    pub fn add_security_rule(&mut self, rule: SecurityRule) {
        self.model.security_rules.push(rule);
    }

    pub fn build(self) -> SemanticModel {
        self.model
    }
}
