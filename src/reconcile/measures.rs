use std::sync::Arc;

use crate::extract::QueryExtractor;
use crate::fragments::FragmentSet;
use crate::model::{Measure, Partition};

/// One measure per definition in each measure group. The owning table is the
/// dimension with the measure group's identifier.
pub fn resolve_measures(fragments: &FragmentSet) -> Vec<Measure> {
    let mut measures = Vec::new();
    for (id, group) in fragments.measure_groups().iter() {
        let table_name = fragments.table_name(id);
        for definition in &group.measures.items {
            measures.push(Measure {
                table_name: table_name.to_string(),
                name: definition.name.clone(),
                expression: definition.expression.clone().unwrap_or_default(),
                display_folder: definition.display_folder.clone().unwrap_or_default(),
                description: definition.description.clone().unwrap_or_default(),
            });
        }
    }
    measures
}

/// One partition per partition fragment with a data-source expression.
pub fn resolve_partitions(
    fragments: &FragmentSet,
    extractor: &Arc<QueryExtractor>,
) -> Vec<Partition> {
    fragments
        .partitions()
        .iter()
        .filter_map(|(id, partition)| {
            let expression = partition.source.as_ref()?.expression()?;
            Some(Partition::with_extractor(
                fragments.table_name(id),
                expression,
                Arc::clone(extractor),
            ))
        })
        .collect()
}
