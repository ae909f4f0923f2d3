//! One-shot export of a SQLite table to a JSON array.
//!
//! Built for the `warning_letters` table but works on any table: every row
//! becomes an object keyed by column name. Rows without a usable `id` get
//! their one-based position as id.

use std::fs;
use std::path::{Path, PathBuf};

use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags};
use serde_json::{Map, Number, Value};
use tracing::{debug, info};

pub const DEFAULT_TABLE: &str = "warning_letters";

pub type Row = Map<String, Value>;

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("failed to serialize rows: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, ExportError>;

/// Reads `table` from the database at `db` and writes it to `out` as
/// pretty-printed JSON. Returns the number of rows written.
pub fn export_table(db: &Path, table: &str, out: &Path) -> Result<usize> {
    let conn = Connection::open_with_flags(db, OpenFlags::SQLITE_OPEN_READ_ONLY)?;
    let mut rows = read_rows(&conn, table)?;
    assign_ids(&mut rows);

    let json = serde_json::to_string_pretty(&rows)?;
    fs::write(out, json).map_err(|source| ExportError::Write {
        path: out.to_path_buf(),
        source,
    })?;
    info!("Exported {} rows from {table} to {}", rows.len(), out.display());
    Ok(rows.len())
}

/// Every row of `table` as a JSON object keyed by column name, in column
/// order.
pub fn read_rows(conn: &Connection, table: &str) -> Result<Vec<Row>> {
    let sql = format!("SELECT * FROM {}", quote_identifier(table));
    debug!("{sql}");
    let mut stmt = conn.prepare(&sql)?;
    let columns: Vec<String> = stmt
        .column_names()
        .into_iter()
        .map(str::to_string)
        .collect();

    let mut rows = Vec::new();
    let mut cursor = stmt.query([])?;
    while let Some(row) = cursor.next()? {
        let mut object = Map::with_capacity(columns.len());
        for (index, column) in columns.iter().enumerate() {
            object.insert(column.clone(), to_json(row.get_ref(index)?));
        }
        rows.push(object);
    }
    Ok(rows)
}

/// Sets `id` to the row's one-based position when it is missing, null,
/// zero or an empty string.
pub fn assign_ids(rows: &mut [Row]) {
    for (index, row) in rows.iter_mut().enumerate() {
        if row.get("id").is_none_or(is_blank_id) {
            row.insert("id".to_string(), Value::from(index as u64 + 1));
        }
    }
}

fn is_blank_id(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

fn to_json(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::from(i),
        ValueRef::Real(f) => Number::from_f64(f).map_or(Value::Null, Value::Number),
        ValueRef::Text(text) => Value::String(String::from_utf8_lossy(text).into_owned()),
        ValueRef::Blob(blob) => Value::String(hex::encode(blob)),
    }
}

fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_quote_identifier() {
        assert_eq!(quote_identifier("warning_letters"), "\"warning_letters\"");
        assert_eq!(quote_identifier("odd\"name"), "\"odd\"\"name\"");
    }

    #[test]
    fn test_assign_ids() {
        let mut rows: Vec<Row> = [
            json!({"id": 0, "company": "A"}),
            json!({"id": 42, "company": "B"}),
            json!({"company": "C"}),
            json!({"id": "", "company": "D"}),
            json!({"id": null, "company": "E"}),
            json!({"id": "WL-7", "company": "F"}),
        ]
        .into_iter()
        .filter_map(|value| value.as_object().cloned())
        .collect();

        assign_ids(&mut rows);
        let ids: Vec<Value> = rows.iter().map(|row| row["id"].clone()).collect();
        assert_eq!(
            ids,
            vec![json!(1), json!(42), json!(3), json!(4), json!(5), json!("WL-7")]
        );
    }
}
