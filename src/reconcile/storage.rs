//! Storage file role classification.
//!
//! Column storage artifacts are named after their table and column, e.g.
//!
//! ```text
//! Customer (12).tbl\Customer (12).CustomerKey.0.idf.dictionary   dictionary
//! Customer (12).tbl\H$Customer (12)$CustomerKey.hidx              hierarchy index
//! Customer (12).tbl\1.Customer (12).CustomerKey.0.idf             data file
//! ```
//!
//! Position-index files (`.ID_TO_POS.`, `.POS_TO_ID.`) share the same
//! suffixes and are told apart by those secondary markers.

use crate::fragments::ManifestEntry;
use crate::model::StorageFiles;

const POSITION_MARKERS: [&str; 2] = [".ID_TO_POS.", ".POS_TO_ID."];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Dictionary,
    HierarchyIndex,
    DataFile,
}

/// Role of `file` for `column` and the length of the marker that matched.
///
/// Markers must end the file name, so sidecars such as `.idfmeta` never
/// claim a role. Longer markers are more specific.
fn classify_role(file: &str, column: &str) -> Option<(Role, usize)> {
    let is_position_index = POSITION_MARKERS.iter().any(|m| file.contains(m));

    let (role, markers) = if file.contains(".dictionary") {
        if is_position_index {
            return None;
        }
        (
            Role::Dictionary,
            vec![
                format!(".{column}.0.idf.dictionary"),
                format!(".{column}.dictionary"),
            ],
        )
    } else if file.contains(".hidx") {
        (
            Role::HierarchyIndex,
            vec![
                format!("${column}.POS_TO_ID.0.idf.hidx"),
                format!("${column}.hidx"),
            ],
        )
    } else if file.contains(".idf") {
        if is_position_index {
            return None;
        }
        (Role::DataFile, vec![format!(".{column}.0.idf")])
    } else {
        return None;
    };

    markers
        .iter()
        .find(|m| file.ends_with(m.as_str()))
        .map(|m| (role, m.len()))
}

/// Find the dictionary, hierarchy index and data file of one column.
///
/// Only entries naming both the table (or its `H$` hierarchy variant) and the
/// column are considered. When several files claim a role the one with the
/// most specific marker wins, and the earliest manifest entry breaks ties.
/// A role nobody claims stays empty.
pub fn locate_storage_files(
    table_id: &str,
    column_name: &str,
    manifest: &[ManifestEntry],
) -> StorageFiles {
    let mut best: [Option<(usize, &str)>; 3] = [None, None, None];

    if table_id.is_empty() || column_name.is_empty() {
        return StorageFiles::default();
    }

    for entry in manifest {
        let file = entry.file_name.as_str();
        // `H$<table>` contains `<table>`, so one check covers both spellings
        if !file.contains(table_id) || !file.contains(column_name) {
            continue;
        }
        let Some((role, specificity)) = classify_role(file, column_name) else {
            continue;
        };
        let slot = &mut best[role as usize];
        if slot.map_or(true, |(current, _)| specificity > current) {
            *slot = Some((specificity, file));
        }
    }

    let [dictionary, hierarchy_index, data_file] =
        best.map(|slot| slot.map(|(_, file)| file.to_string()));
    StorageFiles {
        dictionary,
        hierarchy_index,
        data_file,
    }
}
