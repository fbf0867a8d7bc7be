//! Storage file role classification against realistic manifests.

use vertiscope::fragments::ManifestEntry;
use vertiscope::reconcile::locate_storage_files;

fn manifest(names: &[&str]) -> Vec<ManifestEntry> {
    names.iter().map(|n| ManifestEntry::new(*n)).collect()
}

#[test]
fn test_dictionary_only() {
    let files = manifest(&["Customer.CustomerKey.0.idf.dictionary"]);
    let storage = locate_storage_files("Customer", "CustomerKey", &files);

    assert_eq!(
        storage.dictionary.as_deref(),
        Some("Customer.CustomerKey.0.idf.dictionary")
    );
    assert_eq!(storage.hierarchy_index, None);
    assert_eq!(storage.data_file, None);
}

#[test]
fn test_hierarchy_variant_of_table_id() {
    let files = manifest(&[
        "Sales (7).tbl/H$Sales (7)$Amount.POS_TO_ID.0.idf.hidx",
        "Sales (7).tbl/H$Sales (7)$Amount.hidx",
    ]);
    let storage = locate_storage_files("Sales (7)", "Amount", &files);
    // The position index marker is the longer, more specific one
    assert_eq!(
        storage.hierarchy_index.as_deref(),
        Some("Sales (7).tbl/H$Sales (7)$Amount.POS_TO_ID.0.idf.hidx")
    );
}

#[test]
fn test_columns_of_same_table_do_not_collide() {
    let files = manifest(&[
        "Sales (7).tbl/Sales (7).Amount.0.idf.dictionary",
        "Sales (7).tbl/1.Sales (7).Amount.0.idf",
        "Sales (7).tbl/Sales (7).Quantity.0.idf.dictionary",
        "Sales (7).tbl/1.Sales (7).Quantity.0.idf",
    ]);

    let amount = locate_storage_files("Sales (7)", "Amount", &files);
    let quantity = locate_storage_files("Sales (7)", "Quantity", &files);

    assert_eq!(
        amount.data_file.as_deref(),
        Some("Sales (7).tbl/1.Sales (7).Amount.0.idf")
    );
    assert_eq!(
        quantity.dictionary.as_deref(),
        Some("Sales (7).tbl/Sales (7).Quantity.0.idf.dictionary")
    );
}

#[test]
fn test_position_maps_never_fill_a_role() {
    let files = manifest(&[
        "Sales.Amount.ID_TO_POS.0.idf",
        "Sales.Amount.POS_TO_ID.0.idf",
        "Sales.Amount.ID_TO_POS.dictionary",
    ]);
    assert!(locate_storage_files("Sales", "Amount", &files).is_empty());
}

#[test]
fn test_unrelated_files_leave_roles_empty() {
    let files = manifest(&["Model.1.cub.xml", "Sales.3.dim.xml", "metadata.sqlitedb"]);
    assert!(locate_storage_files("Sales", "Amount", &files).is_empty());
}

#[test]
fn test_metadata_sidecar_is_not_a_data_file() {
    let files = manifest(&[
        "Sales (3).tbl/1.Sales (3).Amount.0.idfmeta",
        "Sales (3).tbl/1.Sales (3).Amount.0.idf",
    ]);
    let storage = locate_storage_files("Sales (3)", "Amount", &files);
    assert_eq!(
        storage.data_file.as_deref(),
        Some("Sales (3).tbl/1.Sales (3).Amount.0.idf")
    );

    let sidecar_only = manifest(&["Sales (3).tbl/1.Sales (3).Amount.0.idfmeta"]);
    assert!(locate_storage_files("Sales (3)", "Amount", &sidecar_only).is_empty());
}
