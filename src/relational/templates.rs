//! Fixed query templates for the relational metadata store.
//!
//! Each template selects one collection. Column aliases are part of the
//! contract with the row mappers in the parent module; codes are returned raw
//! and mapped in Rust.

/// Version of the template catalog. Bump when an alias or filter changes.
pub const TEMPLATE_VERSION: u32 = 2;

/// A named query template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryTemplate {
    pub name: &'static str,
    pub sql: &'static str,
}

pub const TABLES: QueryTemplate = QueryTemplate {
    name: "tables",
    sql: "
        SELECT
            t.ID AS TableID,
            t.Name AS TableName,
            t.IsHidden
        FROM [Table] t
        WHERE t.SystemFlags = 0
        ORDER BY t.ID
    ",
};

/// Columns with their storage files and dictionary statistics. Row-number
/// columns (`Type = 3`) and columns of system tables are internal and
/// excluded.
pub const COLUMNS: QueryTemplate = QueryTemplate {
    name: "columns",
    sql: "
        SELECT
            t.Name AS TableName,
            c.ExplicitName AS ColumnName,
            c.Type AS ColumnType,
            c.ExplicitDataType AS DataType,
            c.Expression,
            sfd.FileName AS Dictionary,
            sfh.FileName AS HIDX,
            (
                SELECT sfi.FileName
                FROM ColumnPartitionStorage cps
                JOIN StorageFile sfi ON sfi.ID = cps.StorageFileID
                WHERE cps.ColumnStorageID = cs.ID
                ORDER BY cps.ID
                LIMIT 1
            ) AS IDF,
            cs.Statistics_DistinctStates AS Cardinality,
            ds.BaseId,
            ds.Magnitude,
            ds.IsNullable,
            c.ModifiedTime,
            c.StructureModifiedTime
        FROM [Column] c
        JOIN [Table] t ON c.TableID = t.ID
        LEFT JOIN ColumnStorage cs ON c.ColumnStorageID = cs.ID
        LEFT JOIN AttributeHierarchy ah ON ah.ColumnID = c.ID
        LEFT JOIN AttributeHierarchyStorage ahs ON ah.AttributeHierarchyStorageID = ahs.ID
        LEFT JOIN StorageFile sfh ON sfh.ID = ahs.StorageFileID
        LEFT JOIN DictionaryStorage ds ON ds.ID = cs.DictionaryStorageID
        LEFT JOIN StorageFile sfd ON sfd.ID = ds.StorageFileID
        WHERE c.Type <> 3 AND t.SystemFlags = 0
        ORDER BY t.Name, cs.StoragePosition
    ",
};

/// Power Query (M) partitions.
pub const M_PARTITIONS: QueryTemplate = QueryTemplate {
    name: "m_partitions",
    sql: "
        SELECT
            t.Name AS TableName,
            p.QueryDefinition AS Expression
        FROM Partition p
        JOIN [Table] t ON t.ID = p.TableID
        WHERE p.Type = 4 AND t.SystemFlags = 0
    ",
};

/// Calculated (DAX) table partitions.
pub const CALCULATED_TABLES: QueryTemplate = QueryTemplate {
    name: "calculated_tables",
    sql: "
        SELECT
            t.Name AS TableName,
            p.QueryDefinition AS Expression
        FROM Partition p
        JOIN [Table] t ON t.ID = p.TableID
        WHERE p.Type = 2 AND t.SystemFlags = 0
    ",
};

pub const MEASURES: QueryTemplate = QueryTemplate {
    name: "measures",
    sql: "
        SELECT
            t.Name AS TableName,
            m.Name,
            m.Expression,
            m.DisplayFolder,
            m.Description
        FROM Measure m
        JOIN [Table] t ON m.TableID = t.ID
        WHERE t.SystemFlags = 0
    ",
};

/// Relationships with raw cardinality and cross-filter codes.
pub const RELATIONSHIPS: QueryTemplate = QueryTemplate {
    name: "relationships",
    sql: "
        SELECT
            ft.Name AS FromTableName,
            fc.ExplicitName AS FromColumnName,
            tt.Name AS ToTableName,
            tc.ExplicitName AS ToColumnName,
            rel.IsActive,
            rel.FromCardinality,
            rel.ToCardinality,
            rel.CrossFilteringBehavior,
            rel.RelyOnReferentialIntegrity,
            rid.RecordCount AS FromKeyCount,
            rid2.RecordCount AS ToKeyCount
        FROM Relationship rel
        LEFT JOIN [Table] ft ON rel.FromTableID = ft.ID
        LEFT JOIN [Column] fc ON rel.FromColumnID = fc.ID
        LEFT JOIN [Table] tt ON rel.ToTableID = tt.ID AND tt.SystemFlags = 0
        LEFT JOIN [Column] tc ON rel.ToColumnID = tc.ID
        LEFT JOIN RelationshipStorage rs ON rs.ID = rel.RelationshipStorageID
        LEFT JOIN RelationshipIndexStorage rid ON rs.RelationshipIndexStorageID = rid.ID
        LEFT JOIN RelationshipStorage rs2 ON rs2.ID = rel.RelationshipStorage2ID
        LEFT JOIN RelationshipIndexStorage rid2 ON rs2.RelationshipIndexStorageID = rid2.ID
    ",
};

/// Model-level annotations (`ObjectType = 1`).
pub const ANNOTATIONS: QueryTemplate = QueryTemplate {
    name: "annotations",
    sql: "
        SELECT Name, Value
        FROM Annotation
        WHERE ObjectType = 1
    ",
};

/// Named M expressions (parameters and shared queries).
pub const PARAMETERS: QueryTemplate = QueryTemplate {
    name: "parameters",
    sql: "
        SELECT
            Name AS ParameterName,
            Description,
            Expression,
            ModifiedTime
        FROM Expression
    ",
};

/// Row-level security filters per role and table.
pub const SECURITY_RULES: QueryTemplate = QueryTemplate {
    name: "security_rules",
    sql: "
        SELECT
            t.Name AS TableName,
            r.Name AS RoleName,
            r.Description AS RoleDescription,
            tp.FilterExpression,
            tp.State,
            tp.MetadataPermission
        FROM TablePermission tp
        JOIN [Table] t ON t.ID = tp.TableID
        JOIN Role r ON r.ID = tp.RoleID
        WHERE t.SystemFlags = 0
    ",
};

/// Every template, in execution order.
pub const CATALOG: [QueryTemplate; 9] = [
    TABLES,
    COLUMNS,
    M_PARTITIONS,
    CALCULATED_TABLES,
    MEASURES,
    RELATIONSHIPS,
    ANNOTATIONS,
    PARAMETERS,
    SECURITY_RULES,
];
