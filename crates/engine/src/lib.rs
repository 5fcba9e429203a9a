// Query engine boundary
//
// Everything above this crate talks SQL through the `QueryEngine` trait and
// exchanges data as `Table` values. The SQLite implementation lives in
// `sqlite`; swapping in another in-process engine means implementing the
// trait, nothing else changes.

use std::fmt;

pub mod sqlite;

pub use sqlite::SqliteEngine;

/// A single cell value, the unit of data exchanged across the engine boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Float(f64),
    Text(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Integer(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Text(s) => write!(f, "{}", s),
        }
    }
}

/// Tabular data: an ordered column list plus row-major cells.
///
/// Used in both directions — file readers produce one, `execute` returns one,
/// staged results hold one. Row widths always match `columns.len()`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self { columns, rows: Vec::new() }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// True when the result carries no rows (a DDL statement, or an empty
    /// SELECT).
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Values of one column by name, in row order. `None` if the column
    /// does not exist.
    pub fn column(&self, name: &str) -> Option<Vec<&Value>> {
        let idx = self.columns.iter().position(|c| c == name)?;
        Some(self.rows.iter().map(|r| &r[idx]).collect())
    }
}

/// Engine-level failure, carrying the backend's message text.
///
/// Callers treat these as opaque: per-item failures are reported and the
/// session continues.
#[derive(Debug)]
pub struct EngineError(pub String);

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for EngineError {}

/// The seam between the session core and the SQL backend.
///
/// Methods take `&self`: the engine is a connection handle with interior
/// state, and the session is single-threaded throughout.
pub trait QueryEngine {
    /// Run one SQL statement and collect its full result set.
    fn execute(&self, sql: &str) -> Result<Table, EngineError>;

    /// Ordered (column name, declared type) pairs for a table.
    fn describe(&self, table: &str) -> Result<Vec<(String, String)>, EngineError>;

    /// Names of all user tables, in name order.
    fn list_tables(&self) -> Result<Vec<String>, EngineError>;

    /// Rename a table. Fails if the target name is taken.
    fn rename_table(&self, old: &str, new: &str) -> Result<(), EngineError>;

    /// Drop a table if it exists. Dropping a missing table is not an error.
    fn drop_table(&self, table: &str) -> Result<(), EngineError>;

    /// Materialize `data` under `name`, replacing any existing table of that
    /// name. This is the single point a lazily-referencing backend would
    /// override to register a file view instead.
    fn register(&self, name: &str, data: &Table) -> Result<(), EngineError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_display() {
        assert_eq!(Value::Null.to_string(), "");
        assert_eq!(Value::Integer(42).to_string(), "42");
        assert_eq!(Value::Float(2.5).to_string(), "2.5");
        assert_eq!(Value::Text("hi".into()).to_string(), "hi");
    }

    #[test]
    fn test_table_column_lookup() {
        let table = Table {
            columns: vec!["a".into(), "b".into()],
            rows: vec![
                vec![Value::Integer(1), Value::Text("x".into())],
                vec![Value::Integer(2), Value::Text("y".into())],
            ],
        };
        let b: Vec<String> = table
            .column("b")
            .unwrap()
            .iter()
            .map(|v| v.to_string())
            .collect();
        assert_eq!(b, vec!["x", "y"]);
        assert!(table.column("missing").is_none());
    }
}
