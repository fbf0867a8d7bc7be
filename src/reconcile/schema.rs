//! Tables and columns from the cube and dimension fragments.

use tracing::debug;

use super::storage::locate_storage_files;
use crate::fragments::documents::{Attribute, XmObject};
use crate::fragments::{FragmentSet, ManifestEntry};
use crate::model::{Column, ColumnStats, SemanticType, Table};
use crate::report::{LoadIssue, LoadReport};

/// Tables and their columns, in cube order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableSchema {
    pub tables: Vec<Table>,
    pub columns: Vec<Column>,
}

/// Build one table per cube dimension that has a dimension fragment, and one
/// column per attribute of that fragment.
///
/// Cube dimensions without a fragment are omitted and reported. Missing
/// storage statistics leave the column with default statistics.
pub fn resolve_table_schema(
    fragments: &FragmentSet,
    manifest: &[ManifestEntry],
    report: &mut LoadReport,
) -> TableSchema {
    let mut schema = TableSchema::default();

    for cube_dim in &fragments.cube().dimensions.items {
        let dimension_id = cube_dim.target_id();
        let Some(dimension) = fragments.dimension(dimension_id) else {
            report.issue(LoadIssue::MissingDimension {
                dimension_id: dimension_id.to_string(),
            });
            continue;
        };

        let table_name = fragments.table_name(dimension_id).to_string();
        let mut table = Table::new(table_name.clone(), dimension_id);
        table.visible = cube_dim.visible.unwrap_or(true);

        let stats_doc = fragments.table_stats(dimension_id);
        for attribute in &dimension.attributes.items {
            let mut column = Column::new(
                table_name.clone(),
                attribute.name.clone(),
                semantic_type(attribute),
            );
            column.storage = locate_storage_files(dimension_id, &attribute.name, manifest);
            column.stats = stats_doc
                .map(|doc| column_stats(doc, &attribute.name))
                .unwrap_or_default();
            column.modified_time = dimension.last_processed.clone().unwrap_or_default();
            column.structure_modified_time =
                dimension.last_schema_update.clone().unwrap_or_default();

            table.columns.push(column.name.clone());
            schema.columns.push(column);
        }

        debug!(table = %table.name, columns = table.columns.len(), "table resolved");
        schema.tables.push(table);
    }

    schema
}

fn semantic_type(attribute: &Attribute) -> SemanticType {
    attribute
        .declared_type()
        .map(SemanticType::from_fragment_type)
        .unwrap_or(SemanticType::Opaque)
}

/// Statistics of one raw column in a table's storage object tree.
pub fn column_stats(table: &XmObject, column: &str) -> ColumnStats {
    let mut stats = ColumnStats::default();
    let Some(raw) = table.raw_column(column) else {
        return stats;
    };

    if let Some(hierarchy) = raw.member_properties("IntrinsicHierarchy") {
        if let Some(distinct) = hierarchy.distinct_data_ids {
            stats.cardinality = distinct;
        }
    }

    if let Some(props) = raw.member_properties("ColumnStats") {
        stats.min_data_id = props.min_data_id.unwrap_or(stats.min_data_id);
        stats.max_data_id = props.max_data_id.unwrap_or(stats.max_data_id);
        stats.has_nulls = props.has_nulls.unwrap_or(stats.has_nulls);
        stats.rle_runs = props.rle_runs.unwrap_or(stats.rle_runs);
        stats.compression_type = props.compression_type.unwrap_or(stats.compression_type);
    }

    // Value encoding parameters live on the column's dictionary member
    for props in std::iter::once(&raw.properties).chain(raw.all_member_properties()) {
        if let Some(base_id) = props.base_id {
            stats.base_id = base_id;
        }
        if let Some(magnitude) = props.magnitude {
            stats.magnitude = magnitude;
        }
        if let Some(nullable) = props.is_nullable {
            stats.is_nullable = nullable;
        }
    }

    stats
}
