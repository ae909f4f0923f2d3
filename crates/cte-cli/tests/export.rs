//! Integration tests for the warning-letter exporter.

use std::fs;

use cte_cli::export::{DEFAULT_TABLE, ExportError, export_table};
use rusqlite::{Connection, params};
use serde_json::{Value, json};

fn letters_db(dir: &std::path::Path) -> std::path::PathBuf {
    let path = dir.join("letters.db");
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(
        "CREATE TABLE warning_letters (
             id INTEGER,
             company TEXT,
             issued TEXT,
             penalty REAL,
             scan BLOB
         );",
    )
    .unwrap();
    let rows: [(Option<i64>, &str, Option<&str>, Option<f64>, Option<Vec<u8>>); 3] = [
        (Some(17), "Acme Pharma", Some("2023-04-01"), Some(2500.5), None),
        (None, "Globex Labs", None, None, Some(vec![0xde, 0xad, 0xbe, 0xef])),
        (Some(0), "Initech Bio", Some("2024-01-09"), Some(0.0), None),
    ];
    for (id, company, issued, penalty, scan) in rows {
        conn.execute(
            "INSERT INTO warning_letters (id, company, issued, penalty, scan)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![id, company, issued, penalty, scan],
        )
        .unwrap();
    }
    path
}

#[test]
fn test_export_maps_types_and_fills_ids() {
    let dir = tempfile::tempdir().unwrap();
    let db = letters_db(dir.path());
    let out = dir.path().join("letters.json");

    let count = export_table(&db, DEFAULT_TABLE, &out).unwrap();
    assert_eq!(count, 3);

    let written: Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(
        written,
        json!([
            {"id": 17, "company": "Acme Pharma", "issued": "2023-04-01",
             "penalty": 2500.5, "scan": null},
            {"id": 2, "company": "Globex Labs", "issued": null,
             "penalty": null, "scan": "deadbeef"},
            {"id": 3, "company": "Initech Bio", "issued": "2024-01-09",
             "penalty": 0.0, "scan": null}
        ])
    );
}

#[test]
fn test_output_is_pretty_printed() {
    let dir = tempfile::tempdir().unwrap();
    let db = letters_db(dir.path());
    let out = dir.path().join("letters.json");

    export_table(&db, DEFAULT_TABLE, &out).unwrap();
    let text = fs::read_to_string(&out).unwrap();
    assert!(text.starts_with("[\n  {\n    \"id\": 17,\n    \"company\": \"Acme Pharma\",\n"));
}

#[test]
fn test_rows_keep_column_order() {
    let dir = tempfile::tempdir().unwrap();
    let db = letters_db(dir.path());
    let out = dir.path().join("letters.json");

    export_table(&db, DEFAULT_TABLE, &out).unwrap();
    let written: Vec<serde_json::Map<String, Value>> =
        serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();

    for row in &written {
        let keys: Vec<_> = row.keys().map(String::as_str).collect();
        assert_eq!(keys, ["id", "company", "issued", "penalty", "scan"]);
    }
}

#[test]
fn test_missing_table_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let db = letters_db(dir.path());
    let out = dir.path().join("other.json");

    let err = export_table(&db, "recalls", &out).unwrap_err();
    assert!(matches!(err, ExportError::Sqlite(_)));
    assert!(!out.exists());
}

#[test]
fn test_missing_database_is_not_created() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("absent.db");

    let result = export_table(&db, DEFAULT_TABLE, &dir.path().join("out.json"));
    assert!(result.is_err());
    assert!(!db.exists());
}
