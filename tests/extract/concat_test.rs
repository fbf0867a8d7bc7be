//! Reconstruction of queries concatenated from literal pieces at runtime.

use vertiscope::config::ExtractorSettings;
use vertiscope::extract::{extract_native_query, MatchSource, QueryExtractor};

fn extractor() -> QueryExtractor {
    QueryExtractor::new(&ExtractorSettings::default()).unwrap()
}

#[test]
fn test_concatenated_where_clause() {
    let expression = "let Source = Value.NativeQuery(Connector, \"WHERE TRUE\n  AND ks.\"\"Код Региональной Группы\"\" IN ( \" & var_Reg & \" )\nORDER BY КС ASC\n;\") in Source";

    let extraction = extractor().extract(expression).unwrap();

    assert_eq!(extraction.source, MatchSource::Concatenation);
    assert!(extraction.text.contains("IN ("));
    assert!(extraction.text.contains("ORDER BY КС ASC"));
    assert!(extraction.text.contains("\"Код Региональной Группы\""));
    assert!(extraction.text.ends_with(';'));
}

#[test]
fn test_pieces_keep_order_and_skip_variables() {
    let expression = r#"Value.NativeQuery(Db, "WHERE TRUE AND col IN (" & ids & " )" & suffix & " ORDER BY x ASC;", null)"#;
    let text = extract_native_query(expression);
    let in_at = text.find("IN (").unwrap();
    let order_at = text.find("ORDER BY x ASC").unwrap();
    assert!(in_at < order_at);
    assert!(!text.contains("ids"));
    assert!(!text.contains("suffix"));
    assert!(text.ends_with(';'));
}

#[test]
fn test_concatenation_without_query_shape_is_rejected() {
    // Pieces neither terminate nor start with a keyword
    let expression = r#"Value.NativeQuery(Db, "WHERE a = " & x & " AND b = 1")"#;
    assert_eq!(extract_native_query(expression), "");
}

#[test]
fn test_concatenated_select_without_semicolon() {
    let expression = r#"Value.NativeQuery(Db, "--" & header & "
    SELECT * FROM " & tbl)"#;
    // The first literal is a bare comment; the joined pieces start with it too
    assert_eq!(extract_native_query(expression), "");

    let expression = r#"Value.NativeQuery(Db, "SELECT * FROM " & tbl & " WHERE 1 = 1")"#;
    // The leading literal already starts with SELECT
    assert_eq!(extract_native_query(expression), "SELECT * FROM");
}

#[test]
fn test_nested_calls_in_arguments() {
    let extractor = extractor();
    let expression = r#"Value.NativeQuery(Sql.Database("srv", "db"), "WHERE a IN (" & Text.Combine(ids, ",") & ");")"#;
    let extraction = extractor.extract(expression).unwrap();
    assert_eq!(extraction.source, MatchSource::Concatenation);
    assert_eq!(extraction.text, "WHERE a IN ( , );");
}

#[test]
fn test_case_insensitive_function_name() {
    let expression = r#"value.nativequery(Db, "WHERE x = '" & v & "';")"#;
    assert_eq!(extract_native_query(expression), "WHERE x = ' ';");
}
