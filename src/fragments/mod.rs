//! Metadata fragments of the XML backend.
//!
//! A model saved by older engine versions has no relational metadata store.
//! Its metadata is split over many small XML documents, one per object, named
//! `<id>.<version>.<kind>.xml` and cross-referenced by identifier:
//!
//! | File                  | Kind                                   |
//! |-----------------------|----------------------------------------|
//! | `Model.<n>.cub.xml`   | root cube, lists every table (required)|
//! | `<id>.<n>.dim.xml`    | dimension: columns and relationships   |
//! | `<id>.<n>.prt.xml`    | partition: data-source expression      |
//! | `<id>.<n>.det.xml`    | measure group: measures of a table     |
//! | `<id>.<n>.tbl.xml`    | storage statistics of a table          |
//!
//! [`FragmentStore`] supplies the manifest and the bytes, [`FragmentLoader`]
//! turns bytes into typed documents, and [`FragmentSet`] holds the decoded
//! documents keyed by identifier.

pub mod documents;
mod loader;
mod set;
mod store;

pub use documents::{Cube, Dimension, MeasureGroup, Partition, XmObject};
pub use loader::{FragmentLoader, XmlFragmentLoader};
pub use set::{FragmentSet, Keyed};
pub use store::{DirectoryStore, FragmentStore, ManifestEntry, MemoryStore};

use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::LazyLock;
use thiserror::Error;

/// Errors decoding one fragment. Always recoverable except for the root cube.
#[derive(Debug, Error)]
pub enum FragmentError {
    #[error("Failed to read {file}: {source}")]
    Read {
        file: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed {file}: {message}")]
    Decode { file: String, message: String },

    #[error("{file} is not valid UTF-8")]
    Utf8 { file: String },
}

pub type FragmentResult<T> = Result<T, FragmentError>;

/// Document kind, derived from the file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FragmentKind {
    Cube,
    Dimension,
    Partition,
    MeasureGroup,
    TableStats,
}

impl FragmentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FragmentKind::Cube => "cube",
            FragmentKind::Dimension => "dimension",
            FragmentKind::Partition => "partition",
            FragmentKind::MeasureGroup => "measure_group",
            FragmentKind::TableStats => "table_stats",
        }
    }
}

impl fmt::Display for FragmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pattern of the root cube file name, used in error messages.
pub const CUBE_FILE_PATTERN: &str = r"Model.<n>.cub.xml";

static FILE_PATTERNS: LazyLock<Vec<(FragmentKind, Regex)>> = LazyLock::new(|| {
    [
        (FragmentKind::Cube, r"^(Model)\.\d+\.cub\.xml$"),
        (FragmentKind::Dimension, r"^(.+)\.\d+\.dim\.xml$"),
        (FragmentKind::Partition, r"^(.+)\.\d+\.prt\.xml$"),
        (FragmentKind::MeasureGroup, r"^(.+)\.\d+\.det\.xml$"),
        (FragmentKind::TableStats, r"^(.+)\.\d+\.tbl\.xml$"),
    ]
    .into_iter()
    .map(|(kind, pattern)| (kind, Regex::new(pattern).unwrap()))
    .collect()
});

/// Classify a manifest file name and return its kind and identifier.
///
/// Only the last path segment is considered. Storage statistics of
/// hierarchy (`H$`) and relationship (`R$`) tables, or of any identifier
/// containing `$`, are not fragments of interest.
pub fn classify(file_name: &str) -> Option<(FragmentKind, &str)> {
    let base = file_name.rsplit(['/', '\\']).next().unwrap_or(file_name);
    let (kind, id) = FILE_PATTERNS.iter().find_map(|(kind, pattern)| {
        pattern
            .captures(base)
            .and_then(|caps| caps.get(1))
            .map(|m| (*kind, m.as_str()))
    })?;

    if kind == FragmentKind::TableStats && id.contains('$') {
        return None;
    }
    Some((kind, id))
}

/// One decoded fragment document.
#[derive(Debug, Clone, PartialEq)]
pub enum Fragment {
    Cube(Cube),
    Dimension(Dimension),
    Partition(Partition),
    MeasureGroup(MeasureGroup),
    TableStats(XmObject),
}

impl Fragment {
    pub fn kind(&self) -> FragmentKind {
        match self {
            Fragment::Cube(_) => FragmentKind::Cube,
            Fragment::Dimension(_) => FragmentKind::Dimension,
            Fragment::Partition(_) => FragmentKind::Partition,
            Fragment::MeasureGroup(_) => FragmentKind::MeasureGroup,
            Fragment::TableStats(_) => FragmentKind::TableStats,
        }
    }
}
