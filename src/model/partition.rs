//! Data-source partitions and their embedded queries.

use serde::ser::{Serialize, SerializeStruct, Serializer};
use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::extract::{default_extractor, QueryExtractor};

/// A table partition backed by a data-source expression.
///
/// The literal query embedded in the expression is extracted on first access
/// and cached for the lifetime of the partition.
#[derive(Clone)]
pub struct Partition {
    pub table_name: String,
    /// Raw data-source expression (usually Power Query M)
    pub expression: String,
    extractor: Arc<QueryExtractor>,
    native_query: OnceLock<String>,
}

impl Partition {
    /// Create a partition whose query is extracted with the default extractor.
    pub fn new(table_name: impl Into<String>, expression: impl Into<String>) -> Self {
        Self::with_extractor(table_name, expression, default_extractor())
    }

    pub fn with_extractor(
        table_name: impl Into<String>,
        expression: impl Into<String>,
        extractor: Arc<QueryExtractor>,
    ) -> Self {
        Self {
            table_name: table_name.into(),
            expression: expression.into(),
            extractor,
            native_query: OnceLock::new(),
        }
    }

    /// The literal query embedded in the expression, empty when there is none.
    pub fn native_query(&self) -> &str {
        self.native_query
            .get_or_init(|| self.extractor.extract_text(&self.expression))
    }
}

impl fmt::Debug for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Partition")
            .field("table_name", &self.table_name)
            .field("expression", &self.expression)
            .field("native_query", &self.native_query.get())
            .finish()
    }
}

impl PartialEq for Partition {
    fn eq(&self, other: &Self) -> bool {
        self.table_name == other.table_name && self.expression == other.expression
    }
}

impl Serialize for Partition {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Partition", 3)?;
        state.serialize_field("table_name", &self.table_name)?;
        state.serialize_field("expression", &self.expression)?;
        state.serialize_field("native_query", self.native_query())?;
        state.end()
    }
}
