// src/model/security.rs
use serde::Serialize;

/// A row-level-security filter of one role on one table.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct SecurityRule {
    pub table_name: String,
    pub role_name: String,
    pub role_description: String,
    /// DAX row filter, empty when the role has no filter on the table
    pub filter_expression: String,
    /// Store enablement state code
    pub state: i64,
    /// Store metadata permission level code
    pub metadata_permission: i64,
}
