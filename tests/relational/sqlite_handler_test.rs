//! The query templates against a SQLite store laid out like a model's
//! metadata database.

use rusqlite::Connection;

use vertiscope::extract::default_extractor;
use vertiscope::model::{Cardinality, CrossFilter, SemanticType};
use vertiscope::relational::{QueryHandler, RelationalAdapter, SqliteHandler, CATALOG};
use vertiscope::report::{LoadIssue, LoadReport};

const SCHEMA: &str = "
    CREATE TABLE [Table] (ID INTEGER PRIMARY KEY, Name TEXT, IsHidden INTEGER, SystemFlags INTEGER);
    CREATE TABLE [Column] (
        ID INTEGER PRIMARY KEY, TableID INTEGER, ExplicitName TEXT, Type INTEGER,
        ExplicitDataType INTEGER, Expression TEXT, ColumnStorageID INTEGER,
        ModifiedTime TEXT, StructureModifiedTime TEXT
    );
    CREATE TABLE ColumnStorage (
        ID INTEGER PRIMARY KEY, DictionaryStorageID INTEGER,
        Statistics_DistinctStates INTEGER, StoragePosition INTEGER
    );
    CREATE TABLE DictionaryStorage (
        ID INTEGER PRIMARY KEY, StorageFileID INTEGER, BaseId INTEGER,
        Magnitude REAL, IsNullable INTEGER
    );
    CREATE TABLE StorageFile (ID INTEGER PRIMARY KEY, FileName TEXT);
    CREATE TABLE ColumnPartitionStorage (ID INTEGER PRIMARY KEY, ColumnStorageID INTEGER, StorageFileID INTEGER);
    CREATE TABLE AttributeHierarchy (ID INTEGER PRIMARY KEY, ColumnID INTEGER, AttributeHierarchyStorageID INTEGER);
    CREATE TABLE AttributeHierarchyStorage (ID INTEGER PRIMARY KEY, StorageFileID INTEGER);
    CREATE TABLE Partition (ID INTEGER PRIMARY KEY, TableID INTEGER, Type INTEGER, QueryDefinition TEXT);
    CREATE TABLE Measure (
        ID INTEGER PRIMARY KEY, TableID INTEGER, Name TEXT, Expression TEXT,
        DisplayFolder TEXT, Description TEXT
    );
    CREATE TABLE Relationship (
        ID INTEGER PRIMARY KEY, FromTableID INTEGER, FromColumnID INTEGER,
        ToTableID INTEGER, ToColumnID INTEGER, IsActive INTEGER,
        FromCardinality INTEGER, ToCardinality INTEGER, CrossFilteringBehavior INTEGER,
        RelyOnReferentialIntegrity INTEGER, RelationshipStorageID INTEGER,
        RelationshipStorage2ID INTEGER
    );
    CREATE TABLE RelationshipStorage (ID INTEGER PRIMARY KEY, RelationshipIndexStorageID INTEGER);
    CREATE TABLE RelationshipIndexStorage (ID INTEGER PRIMARY KEY, RecordCount INTEGER);
    CREATE TABLE Annotation (ID INTEGER PRIMARY KEY, ObjectType INTEGER, Name TEXT, Value TEXT);
    CREATE TABLE Expression (ID INTEGER PRIMARY KEY, Name TEXT, Description TEXT, Expression TEXT, ModifiedTime TEXT);
    CREATE TABLE Role (ID INTEGER PRIMARY KEY, Name TEXT, Description TEXT);
    CREATE TABLE TablePermission (
        ID INTEGER PRIMARY KEY, TableID INTEGER, RoleID INTEGER,
        FilterExpression TEXT, State INTEGER, MetadataPermission INTEGER
    );
";

const DATA: &str = r#"
    INSERT INTO [Table] VALUES (1, 'Customer', 0, 0), (2, 'Sales', 0, 0), (3, 'H$Hidden', 1, 2);

    INSERT INTO StorageFile VALUES
        (1, 'Customer (1).tbl/Customer (1).CustomerKey.0.idf.dictionary'),
        (2, 'Customer (1).tbl/H$Customer (1)$CustomerKey.hidx'),
        (3, 'Customer (1).tbl/1.Customer (1).CustomerKey.0.idf'),
        (4, 'Customer (1).tbl/2.Customer (1).CustomerKey.0.idf');
    INSERT INTO DictionaryStorage VALUES (1, 1, 5, 1.0, 0);
    INSERT INTO ColumnStorage VALUES (1, 1, 1200, 0), (2, NULL, 10, 1), (3, NULL, 20, 0);
    INSERT INTO ColumnPartitionStorage VALUES (1, 1, 3), (2, 1, 4);
    INSERT INTO AttributeHierarchyStorage VALUES (1, 2);
    INSERT INTO AttributeHierarchy VALUES (1, 1, 1);

    INSERT INTO [Column] VALUES
        (1, 1, 'CustomerKey', 1, 6, NULL, 1, '2024-03-01', '2024-02-01'),
        (2, 1, 'RowNumber-2662979B', 3, 6, NULL, 2, NULL, NULL),
        (3, 2, 'CustomerKey', 1, 6, NULL, 3, NULL, NULL),
        (4, 2, 'Amount x2', 2, 10, '[Amount] * 2', NULL, NULL, NULL);

    INSERT INTO Partition VALUES
        (1, 2, 4, 'let Source = Value.NativeQuery(Db, "SELECT * FROM dbo.Sales;") in Source'),
        (2, 1, 4, 'let Source = Table.SelectRows(d_Em, each [Key] = 1) in Source'),
        (3, 1, 2, 'CALENDARAUTO()');

    INSERT INTO Measure VALUES (1, 2, 'Revenue', 'SUM(Sales[Amount])', 'KPIs', NULL);

    INSERT INTO RelationshipIndexStorage VALUES (1, 5000);
    INSERT INTO RelationshipStorage VALUES (1, 1);
    INSERT INTO Relationship VALUES (1, 2, 3, 1, 1, 1, 2, 1, 2, 0, 1, NULL);

    INSERT INTO Annotation VALUES (1, 1, 'PBI_QueryOrder', '["Customer","Sales"]'), (2, 3, 'Ignored', 'x');
    INSERT INTO Expression VALUES (1, 'ServerName', NULL, '"srv" meta [IsParameterQuery=true]', '2024-01-01');
    INSERT INTO Role VALUES (1, 'EU', 'Europe only');
    INSERT INTO TablePermission VALUES (1, 2, 1, '[Region] = "EU"', 1, 1);
"#;

fn store() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(SCHEMA).unwrap();
    conn.execute_batch(DATA).unwrap();
    conn
}

#[test]
fn test_every_template_prepares_against_the_schema() {
    let mut handler = SqliteHandler::from_connection(store());
    for template in &CATALOG {
        assert!(
            handler.execute(template.sql).is_ok(),
            "template {} failed",
            template.name
        );
    }
}

#[test]
fn test_populate_full_store() {
    let mut handler = SqliteHandler::from_connection(store());
    let mut report = LoadReport::new();

    let model = RelationalAdapter::new(default_extractor()).populate(&mut handler, &mut report);

    assert!(report.is_clean(), "{:?}", report.issues());
    assert!(handler.is_closed());

    let tables: Vec<_> = model.tables().iter().map(|t| t.name.as_str()).collect();
    assert_eq!(tables, vec!["Customer", "Sales"]);

    // Row-number columns are internal
    assert!(model.columns().iter().all(|c| !c.name.starts_with("RowNumber")));
    let key = model.columns_of("Customer").next().unwrap();
    assert_eq!(key.data_type, SemanticType::Integer);
    assert_eq!(key.stats.cardinality, 1200);
    assert_eq!(key.stats.base_id, 5);
    assert!(!key.stats.is_nullable);
    assert_eq!(
        key.storage.hierarchy_index.as_deref(),
        Some("Customer (1).tbl/H$Customer (1)$CustomerKey.hidx")
    );
    assert_eq!(
        key.storage.data_file.as_deref(),
        Some("Customer (1).tbl/1.Customer (1).CustomerKey.0.idf")
    );

    let calculated: Vec<_> = model.calculated_columns().map(|c| c.expression.as_str()).collect();
    assert_eq!(calculated, vec!["[Amount] * 2"]);
    let sales_key = model.columns_of("Sales").find(|c| c.name == "CustomerKey").unwrap();
    assert!(sales_key.storage.is_empty());
    assert!(sales_key.stats.is_nullable);

    let queries: Vec<_> = model.native_queries().collect();
    assert_eq!(queries, vec![("Sales", "SELECT * FROM dbo.Sales;")]);
    assert_eq!(model.partitions().len(), 2);
    assert_eq!(model.calculated_tables()[0].expression, "CALENDARAUTO()");

    let rel = &model.relationships()[0];
    assert_eq!((rel.from_table.as_str(), rel.to_table.as_str()), ("Sales", "Customer"));
    assert_eq!(rel.cardinality, Cardinality::ManyToOne);
    assert_eq!(rel.cross_filter, CrossFilter::Both);
    assert_eq!(rel.from_key_count, 5000);
    assert_eq!(rel.to_key_count, 0);

    assert_eq!(model.measures()[0].description, "");
    assert_eq!(model.annotations().len(), 1);
    assert_eq!(model.parameters()[0].name, "ServerName");
    assert_eq!(model.security_rules()[0].role_name, "EU");
    assert_eq!(model.security_rules()[0].filter_expression, "[Region] = \"EU\"");
}

#[test]
fn test_system_table_rows_are_skipped() {
    let conn = store();
    conn.execute_batch(
        "
        INSERT INTO [Column] VALUES (5, 3, 'RowKey', 1, 6, NULL, NULL, NULL, NULL);
        INSERT INTO Partition VALUES (4, 3, 4, 'Value.NativeQuery(Db, \"SELECT 2;\")');
        INSERT INTO Measure VALUES (2, 3, 'Internal', 'COUNTROWS()', NULL, NULL);
        ",
    )
    .unwrap();
    let mut handler = SqliteHandler::from_connection(conn);
    let mut report = LoadReport::new();

    let model = RelationalAdapter::new(default_extractor()).populate(&mut handler, &mut report);

    assert!(report.is_clean(), "{:?}", report.issues());
    assert!(model.table("H$Hidden").is_none());
    assert_eq!(model.tables().len(), 2);
    for column in model.columns() {
        assert!(model.table(&column.table_name).is_some(), "{}", column.table_name);
    }
    assert!(model.columns().iter().all(|c| c.name != "RowKey"));
    assert_eq!(model.partitions().len(), 2);
    assert_eq!(model.measures().len(), 1);
}

#[test]
fn test_missing_tables_become_issues() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "
        CREATE TABLE [Table] (ID INTEGER PRIMARY KEY, Name TEXT, IsHidden INTEGER, SystemFlags INTEGER);
        CREATE TABLE Partition (ID INTEGER PRIMARY KEY, TableID INTEGER, Type INTEGER, QueryDefinition TEXT);
        INSERT INTO [Table] VALUES (1, 'Sales', 0, 0);
        INSERT INTO Partition VALUES (1, 1, 4, 'Value.NativeQuery(Db, \"SELECT 1;\")');
        ",
    )
    .unwrap();
    let mut handler = SqliteHandler::from_connection(conn);
    let mut report = LoadReport::new();

    let model = RelationalAdapter::new(default_extractor()).populate(&mut handler, &mut report);

    assert_eq!(model.tables().len(), 1);
    assert_eq!(model.native_queries().count(), 1);
    assert!(model.columns().is_empty());

    let failed: Vec<_> = report
        .issues()
        .iter()
        .filter_map(|i| match i {
            LoadIssue::QueryFailed { template, .. } => Some(template.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(
        failed,
        vec!["columns", "measures", "relationships", "annotations", "parameters", "security_rules"]
    );
    assert!(handler.is_closed());
}
