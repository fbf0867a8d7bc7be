use crate::fragments::documents::RelationshipEnd;
use crate::fragments::FragmentSet;
use crate::model::{Cardinality, CrossFilter, Multiplicity, Relationship};
use crate::report::{Endpoint, LoadIssue, LoadReport};

/// Resolve every relationship nested under a dimension fragment.
///
/// Endpoint tables resolve through the dimension lookup and fall back to the
/// raw dimension identifier. Endpoint columns resolve through the endpoint
/// dimension's attribute list; when that fails the column is left empty and
/// the endpoint is reported.
pub fn resolve_relationships(fragments: &FragmentSet, report: &mut LoadReport) -> Vec<Relationship> {
    let mut relationships = Vec::new();

    for (_, dimension) in fragments.dimensions().iter() {
        for relationship in &dimension.relationships.items {
            let (Some(from), Some(to)) = (&relationship.from_end, &relationship.to_end) else {
                continue;
            };

            let from_column = resolve_column(fragments, from);
            let to_column = resolve_column(fragments, to);
            for (endpoint, end, column) in [
                (Endpoint::From, from, &from_column),
                (Endpoint::To, to, &to_column),
            ] {
                if column.is_empty() {
                    report.issue(LoadIssue::UnresolvedEndpoint {
                        relationship: relationship.id.clone(),
                        endpoint,
                        dimension_id: end.dimension_id.clone(),
                        attribute_id: end.attribute_id().unwrap_or_default().to_string(),
                    });
                }
            }

            relationships.push(Relationship {
                from_table: fragments.table_name(&from.dimension_id).to_string(),
                from_column,
                to_table: fragments.table_name(&to.dimension_id).to_string(),
                to_column,
                is_active: relationship.visible.unwrap_or(true),
                cardinality: Cardinality::from_multiplicities(
                    multiplicity(from),
                    multiplicity(to),
                ),
                cross_filter: CrossFilter::Single,
                rely_on_referential_integrity: false,
                from_key_count: 0,
                to_key_count: 0,
            });
        }
    }

    relationships
}

fn multiplicity(end: &RelationshipEnd) -> Option<Multiplicity> {
    end.multiplicity.as_deref().and_then(Multiplicity::parse)
}

/// Name of the endpoint's first attribute, found by a linear scan of the
/// endpoint dimension. Empty when the dimension or attribute is unknown.
fn resolve_column(fragments: &FragmentSet, end: &RelationshipEnd) -> String {
    end.attribute_id()
        .and_then(|id| {
            fragments
                .dimension(&end.dimension_id)
                .and_then(|d| d.attribute_name(id))
        })
        .unwrap_or_default()
        .to_string()
}
