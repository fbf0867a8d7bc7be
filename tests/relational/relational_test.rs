//! Relational adapter over a scripted query handler.

use std::collections::HashMap;

use vertiscope::extract::default_extractor;
use vertiscope::model::{Cardinality, CrossFilter, SemanticType};
use vertiscope::relational::{
    Cell, HandlerError, HandlerResult, QueryHandler, RelationalAdapter, ResultSet, CATALOG,
};
use vertiscope::report::{LoadIssue, LoadReport};

/// Answers each template by name; unknown templates return no rows.
#[derive(Default)]
struct ScriptedHandler {
    results: HashMap<&'static str, ResultSet>,
    failing: Vec<&'static str>,
    executed: Vec<&'static str>,
    closed: bool,
}

impl ScriptedHandler {
    fn answer(mut self, template: &'static str, columns: &[&str], rows: Vec<Vec<Cell>>) -> Self {
        let mut set = ResultSet::new(columns.iter().map(|c| c.to_string()).collect());
        set.rows = rows;
        self.results.insert(template, set);
        self
    }

    fn fail(mut self, template: &'static str) -> Self {
        self.failing.push(template);
        self
    }
}

impl QueryHandler for ScriptedHandler {
    fn execute(&mut self, sql: &str) -> HandlerResult<ResultSet> {
        if self.closed {
            return Err(HandlerError::Closed);
        }
        let name = CATALOG
            .iter()
            .find(|t| t.sql == sql)
            .map(|t| t.name)
            .unwrap_or("unknown");
        self.executed.push(name);

        if self.failing.contains(&name) {
            return Err(HandlerError::Sqlite(rusqlite::Error::InvalidQuery));
        }
        Ok(self.results.get(name).cloned().unwrap_or_default())
    }

    fn close(&mut self) -> HandlerResult<()> {
        self.closed = true;
        Ok(())
    }
}

fn text(s: &str) -> Cell {
    Cell::Text(s.to_string())
}

fn partitions(rows: &[(&str, &str)]) -> ScriptedHandler {
    ScriptedHandler::default().answer(
        "m_partitions",
        &["TableName", "Expression"],
        rows.iter().map(|(t, e)| vec![text(t), text(e)]).collect(),
    )
}

#[test]
fn test_m_partition_queries() {
    let mut handler = partitions(&[
        (
            "TestTable1",
            r#"let Source = Value.NativeQuery(Connector, "SELECT id, name FROM users WHERE active = 1") in Source"#,
        ),
        (
            "TestTable3",
            r#"let Source = Value.NativeQuery(Connector, "SET NOCOUNT ON; SELECT id FROM users") in Source"#,
        ),
        (
            "TestTable5",
            "let Source = Table.SelectRows(d_Em, each [Key] = 1) in Source",
        ),
    ]);
    let adapter = RelationalAdapter::new(default_extractor());

    let model = adapter.populate(&mut handler, &mut LoadReport::new());

    let queries: HashMap<_, _> = model
        .partitions()
        .iter()
        .map(|p| (p.table_name.as_str(), p.native_query()))
        .collect();
    assert_eq!(queries["TestTable1"], "SELECT id, name FROM users WHERE active = 1");
    assert_eq!(queries["TestTable3"], "SET NOCOUNT ON;");
    assert_eq!(queries["TestTable5"], "");
    assert_eq!(model.native_queries().count(), 2);
}

#[test]
fn test_every_template_runs_then_handler_closes() {
    let mut handler = ScriptedHandler::default();
    let model = RelationalAdapter::new(default_extractor())
        .populate(&mut handler, &mut LoadReport::new());

    let expected: Vec<_> = CATALOG.iter().map(|t| t.name).collect();
    assert_eq!(handler.executed, expected);
    assert!(handler.closed);
    assert!(model.is_empty());
}

#[test]
fn test_failing_template_leaves_collection_empty() {
    let mut handler = partitions(&[("Sales", r#"Value.NativeQuery(Db, "SELECT 1;")"#)])
        .answer(
            "measures",
            &["TableName", "Name", "Expression", "DisplayFolder", "Description"],
            vec![vec![
                text("Sales"),
                text("Revenue"),
                text("SUM(Sales[Amount])"),
                Cell::Null,
                Cell::Null,
            ]],
        )
        .fail("columns")
        .fail("security_rules");
    let mut report = LoadReport::new();

    let model = RelationalAdapter::new(default_extractor()).populate(&mut handler, &mut report);

    assert!(model.columns().is_empty());
    assert!(model.security_rules().is_empty());
    assert_eq!(model.measures().len(), 1);
    assert_eq!(model.measures()[0].display_folder, "");
    assert_eq!(model.partitions().len(), 1);

    let failed: Vec<_> = report
        .issues()
        .iter()
        .filter_map(|i| match i {
            LoadIssue::QueryFailed { template, .. } => Some(template.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(failed, vec!["columns", "security_rules"]);
    assert!(handler.closed);
}

#[test]
fn test_tables_and_columns() {
    let mut handler = ScriptedHandler::default()
        .answer(
            "tables",
            &["TableID", "TableName", "IsHidden"],
            vec![
                vec![Cell::Integer(10), text("Customer"), Cell::Integer(0)],
                vec![Cell::Integer(11), text("Bridge"), Cell::Integer(1)],
            ],
        )
        .answer(
            "columns",
            &[
                "TableName",
                "ColumnName",
                "ColumnType",
                "DataType",
                "Expression",
                "Dictionary",
                "HIDX",
                "IDF",
                "Cardinality",
                "BaseId",
                "Magnitude",
                "IsNullable",
                "ModifiedTime",
                "StructureModifiedTime",
            ],
            vec![
                vec![
                    text("Customer"),
                    text("CustomerKey"),
                    Cell::Integer(1),
                    Cell::Integer(6),
                    Cell::Null,
                    text("Customer (10).tbl/Customer.CustomerKey.0.idf.dictionary"),
                    text(""),
                    text("Customer (10).tbl/1.Customer (10).CustomerKey.0.idf"),
                    Cell::Integer(1200),
                    Cell::Integer(3),
                    Cell::Real(1.0),
                    Cell::Integer(0),
                    text("2024-03-01 10:00:00"),
                    text("2024-02-01 09:00:00"),
                ],
                vec![
                    text("Customer"),
                    text("FullName"),
                    Cell::Integer(2),
                    Cell::Integer(2),
                    text("[First] & \" \" & [Last]"),
                    Cell::Null,
                    Cell::Null,
                    Cell::Null,
                    Cell::Null,
                    Cell::Null,
                    Cell::Null,
                    Cell::Null,
                    Cell::Null,
                    Cell::Null,
                ],
                vec![
                    text("Customer"),
                    text("CustomerKey"),
                    Cell::Integer(1),
                    Cell::Integer(6),
                    Cell::Null,
                    Cell::Null,
                    Cell::Null,
                    Cell::Null,
                    Cell::Null,
                    Cell::Null,
                    Cell::Null,
                    Cell::Null,
                    Cell::Null,
                    Cell::Null,
                ],
            ],
        );
    let mut report = LoadReport::new();

    let model = RelationalAdapter::new(default_extractor()).populate(&mut handler, &mut report);

    assert_eq!(model.tables().len(), 2);
    assert!(model.table("Customer").unwrap().visible);
    assert!(!model.table("Bridge").unwrap().visible);
    assert_eq!(model.table("Customer").unwrap().source_id, "10");

    assert_eq!(model.columns().len(), 2);
    let key = &model.columns()[0];
    assert_eq!(key.data_type, SemanticType::Integer);
    assert_eq!(key.stats.cardinality, 1200);
    assert!(!key.stats.is_nullable);
    assert_eq!(key.storage.hierarchy_index, None);
    assert_eq!(
        key.storage.data_file.as_deref(),
        Some("Customer (10).tbl/1.Customer (10).CustomerKey.0.idf")
    );

    let names: Vec<_> = model.calculated_columns().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["FullName"]);
    assert!(model.columns()[1].stats.is_nullable);

    assert_eq!(
        report.issues(),
        &[LoadIssue::DuplicateColumn {
            table: "Customer".to_string(),
            column: "CustomerKey".to_string(),
        }]
    );
}

#[test]
fn test_relationship_codes() {
    let columns = [
        "FromTableName",
        "FromColumnName",
        "ToTableName",
        "ToColumnName",
        "IsActive",
        "FromCardinality",
        "ToCardinality",
        "CrossFilteringBehavior",
        "RelyOnReferentialIntegrity",
        "FromKeyCount",
        "ToKeyCount",
    ];
    let row = |active: i64, from: i64, to: i64, cross: i64| {
        vec![
            text("Sales"),
            text("CustomerKey"),
            Cell::Null,
            Cell::Null,
            Cell::Integer(active),
            Cell::Integer(from),
            Cell::Integer(to),
            Cell::Integer(cross),
            Cell::Integer(0),
            Cell::Integer(5000),
            Cell::Null,
        ]
    };
    let mut handler = ScriptedHandler::default().answer(
        "relationships",
        &columns,
        vec![row(1, 2, 1, 1), row(0, 1, 1, 2)],
    );

    let model = RelationalAdapter::new(default_extractor())
        .populate(&mut handler, &mut LoadReport::new());
    let rels = model.relationships();

    assert_eq!(rels[0].cardinality, Cardinality::ManyToOne);
    assert_eq!(rels[0].cross_filter, CrossFilter::Single);
    assert!(rels[0].is_active);
    assert_eq!(rels[0].from_key_count, 5000);
    // Unresolvable endpoints come back NULL and stay empty
    assert_eq!(rels[0].to_table, "");
    assert_eq!(rels[0].to_key_count, 0);

    assert_eq!(rels[1].cardinality, Cardinality::OneToOne);
    assert_eq!(rels[1].cross_filter, CrossFilter::Both);
    assert!(!rels[1].is_active);
}
