//! Relational metadata adapter.
//!
//! Newer models keep their metadata in a SQLite store (`metadata.sqlitedb`).
//! The adapter runs the fixed [`templates`] through a [`QueryHandler`] and
//! maps each result set onto one collection of the canonical model.
//!
//! A template that fails leaves its collection empty and is recorded in the
//! [`LoadReport`]; the handler is closed after the last template either way.

mod handler;
pub mod templates;

pub use handler::{Cell, HandlerError, HandlerResult, QueryHandler, ResultSet, RowRef, SqliteHandler};
pub use templates::{QueryTemplate, CATALOG, TEMPLATE_VERSION};

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::extract::QueryExtractor;
use crate::model::{
    Annotation, CalculatedTable, Cardinality, Column, ColumnKind, ColumnStats, CrossFilter,
    Measure, ModelBuilder, Multiplicity, Parameter, Partition, Relationship, SecurityRule,
    SemanticModel, SemanticType, StorageFiles, Table,
};
use crate::report::{LoadIssue, LoadReport};

/// Produces a canonical model from a relational metadata store.
#[derive(Debug, Clone)]
pub struct RelationalAdapter {
    extractor: Arc<QueryExtractor>,
}

impl RelationalAdapter {
    pub fn new(extractor: Arc<QueryExtractor>) -> Self {
        Self { extractor }
    }

    /// Run every template and assemble the model. Closes `handler`.
    pub fn populate<H>(&self, handler: &mut H, report: &mut LoadReport) -> SemanticModel
    where
        H: QueryHandler + ?Sized,
    {
        let mut builder = ModelBuilder::new();
        debug!(version = TEMPLATE_VERSION, templates = CATALOG.len(), "running template catalog");

        if let Some(rows) = run(handler, &templates::TABLES, report) {
            for row in rows.rows() {
                builder.add_table(table_from_row(row));
            }
        }
        if let Some(rows) = run(handler, &templates::COLUMNS, report) {
            for row in rows.rows() {
                if let Err(dup) = builder.add_column(column_from_row(row)) {
                    report.issue(LoadIssue::DuplicateColumn {
                        table: dup.table,
                        column: dup.column,
                    });
                }
            }
        }
        if let Some(rows) = run(handler, &templates::M_PARTITIONS, report) {
            for row in rows.rows() {
                builder.add_partition(Partition::with_extractor(
                    row.text("TableName"),
                    row.text("Expression"),
                    Arc::clone(&self.extractor),
                ));
            }
        }
        if let Some(rows) = run(handler, &templates::CALCULATED_TABLES, report) {
            for row in rows.rows() {
                builder.add_calculated_table(CalculatedTable {
                    table_name: row.text("TableName"),
                    expression: row.text("Expression"),
                });
            }
        }
        if let Some(rows) = run(handler, &templates::MEASURES, report) {
            for row in rows.rows() {
                builder.add_measure(Measure {
                    table_name: row.text("TableName"),
                    name: row.text("Name"),
                    expression: row.text("Expression"),
                    display_folder: row.text("DisplayFolder"),
                    description: row.text("Description"),
                });
            }
        }
        if let Some(rows) = run(handler, &templates::RELATIONSHIPS, report) {
            for row in rows.rows() {
                builder.add_relationship(relationship_from_row(row));
            }
        }
        if let Some(rows) = run(handler, &templates::ANNOTATIONS, report) {
            for row in rows.rows() {
                builder.add_annotation(Annotation {
                    name: row.text("Name"),
                    value: row.text("Value"),
                });
            }
        }
        if let Some(rows) = run(handler, &templates::PARAMETERS, report) {
            for row in rows.rows() {
                builder.add_parameter(Parameter {
                    name: row.text("ParameterName"),
                    description: row.text("Description"),
                    expression: row.text("Expression"),
                    modified_time: row.text("ModifiedTime"),
                });
            }
        }
        if let Some(rows) = run(handler, &templates::SECURITY_RULES, report) {
            for row in rows.rows() {
                builder.add_security_rule(SecurityRule {
                    table_name: row.text("TableName"),
                    role_name: row.text("RoleName"),
                    role_description: row.text("RoleDescription"),
                    filter_expression: row.text("FilterExpression"),
                    state: row.int("State"),
                    metadata_permission: row.int("MetadataPermission"),
                });
            }
        }

        if let Err(e) = handler.close() {
            warn!(error = %e, "failed to close metadata store");
        }

        let model = builder.build();
        info!(
            tables = model.tables().len(),
            columns = model.columns().len(),
            relationships = model.relationships().len(),
            measures = model.measures().len(),
            partitions = model.partitions().len(),
            "relational model loaded"
        );
        model
    }
}

fn run<H>(handler: &mut H, template: &QueryTemplate, report: &mut LoadReport) -> Option<ResultSet>
where
    H: QueryHandler + ?Sized,
{
    match handler.execute(template.sql) {
        Ok(rows) => {
            debug!(template = template.name, rows = rows.rows.len(), "template executed");
            Some(rows)
        }
        Err(e) => {
            report.issue(LoadIssue::QueryFailed {
                template: template.name.to_string(),
                reason: e.to_string(),
            });
            None
        }
    }
}

fn table_from_row(row: RowRef<'_>) -> Table {
    let mut table = Table::new(row.text("TableName"), row.text("TableID"));
    table.visible = !row.flag("IsHidden");
    table
}

fn column_from_row(row: RowRef<'_>) -> Column {
    let mut column = Column::new(
        row.text("TableName"),
        row.text("ColumnName"),
        SemanticType::from_store_code(row.int("DataType")),
    );
    column.kind = ColumnKind::from_store_code(row.int("ColumnType"));
    column.expression = row.text("Expression");
    column.storage = StorageFiles {
        dictionary: non_empty(row.opt_text("Dictionary")),
        hierarchy_index: non_empty(row.opt_text("HIDX")),
        data_file: non_empty(row.opt_text("IDF")),
    };
    column.stats = ColumnStats {
        cardinality: row.int("Cardinality"),
        base_id: row.int("BaseId"),
        magnitude: row.float("Magnitude"),
        is_nullable: row.opt_text("IsNullable").is_none() || row.flag("IsNullable"),
        ..ColumnStats::default()
    };
    column.modified_time = row.text("ModifiedTime");
    column.structure_modified_time = row.text("StructureModifiedTime");
    column
}

fn relationship_from_row(row: RowRef<'_>) -> Relationship {
    Relationship {
        from_table: row.text("FromTableName"),
        from_column: row.text("FromColumnName"),
        to_table: row.text("ToTableName"),
        to_column: row.text("ToColumnName"),
        is_active: row.flag("IsActive"),
        cardinality: Cardinality::from_multiplicities(
            Multiplicity::from_store_code(row.int("FromCardinality")),
            Multiplicity::from_store_code(row.int("ToCardinality")),
        ),
        cross_filter: CrossFilter::from_store_code(row.int("CrossFilteringBehavior")),
        rely_on_referential_integrity: row.flag("RelyOnReferentialIntegrity"),
        from_key_count: row.int("FromKeyCount"),
        to_key_count: row.int("ToKeyCount"),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
