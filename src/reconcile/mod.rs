//! Metadata reconciler.
//!
//! Builds the canonical model from a [`FragmentSet`]: fragments name each
//! other only by opaque identifiers (cube dimension -> dimension fragment,
//! relationship endpoint -> attribute), and the storage manifest names
//! physical files only by table and column name.
//!
//! Resolution is ordered and never fails. Anything that cannot be resolved is
//! omitted or left empty and recorded in the [`LoadReport`].

mod measures;
mod relationships;
mod schema;
mod storage;

pub use measures::{resolve_measures, resolve_partitions};
pub use relationships::resolve_relationships;
pub use schema::{column_stats, resolve_table_schema, TableSchema};
pub use storage::locate_storage_files;

use std::sync::Arc;
use tracing::info;

use crate::extract::QueryExtractor;
use crate::fragments::FragmentSet;
use crate::model::{ModelBuilder, SemanticModel};
use crate::report::{LoadIssue, LoadReport};

/// Run every resolution step and assemble the model.
pub fn reconcile(
    fragments: &FragmentSet,
    extractor: &Arc<QueryExtractor>,
    report: &mut LoadReport,
) -> SemanticModel {
    let mut builder = ModelBuilder::new();

    let schema = resolve_table_schema(fragments, fragments.manifest(), report);
    for mut table in schema.tables {
        // Columns re-attach themselves as they are added
        table.columns.clear();
        builder.add_table(table);
    }
    for column in schema.columns {
        if let Err(dup) = builder.add_column(column) {
            report.issue(LoadIssue::DuplicateColumn {
                table: dup.table,
                column: dup.column,
            });
        }
    }

    for relationship in resolve_relationships(fragments, report) {
        builder.add_relationship(relationship);
    }
    for measure in resolve_measures(fragments) {
        builder.add_measure(measure);
    }
    for partition in resolve_partitions(fragments, extractor) {
        builder.add_partition(partition);
    }

    let model = builder.build();
    info!(
        tables = model.tables().len(),
        columns = model.columns().len(),
        relationships = model.relationships().len(),
        measures = model.measures().len(),
        partitions = model.partitions().len(),
        "fragment model reconciled"
    );
    model
}
