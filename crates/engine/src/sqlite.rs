// In-memory SQLite backend for the query engine boundary.
//
// Tables are materialized: SQLite cannot lazily reference external files the
// way DuckDB views can, so `register` drops and recreates. Column affinities
// are inferred from the data so numeric comparisons behave as expected.

use rusqlite::types::{ToSqlOutput, ValueRef};
use rusqlite::Connection;

use crate::{EngineError, QueryEngine, Table, Value};

pub struct SqliteEngine {
    conn: Connection,
}

impl SqliteEngine {
    /// Open a fresh in-memory database for one session.
    pub fn in_memory() -> Result<Self, EngineError> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }
}

impl From<rusqlite::Error> for EngineError {
    fn from(err: rusqlite::Error) -> Self {
        EngineError(err.to_string())
    }
}

impl rusqlite::ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Value::Null => ToSqlOutput::Owned(rusqlite::types::Value::Null),
            Value::Integer(v) => ToSqlOutput::Owned((*v).into()),
            Value::Float(v) => ToSqlOutput::Owned((*v).into()),
            Value::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
        })
    }
}

/// Quote an identifier for embedding in SQL text.
fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Quote a string literal for embedding in SQL text (pragma helpers only;
/// data always goes through bound parameters).
fn quote_literal(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

/// Pick a column's declared affinity from its data: INTEGER if every non-null
/// value is an integer, REAL if every non-null value is numeric, TEXT
/// otherwise (including all-null columns).
fn column_affinity(data: &Table, col: usize) -> &'static str {
    let mut saw_value = false;
    let mut all_integer = true;
    let mut all_numeric = true;
    for row in &data.rows {
        match &row[col] {
            Value::Null => {}
            Value::Integer(_) => saw_value = true,
            Value::Float(_) => {
                saw_value = true;
                all_integer = false;
            }
            Value::Text(_) => {
                saw_value = true;
                all_integer = false;
                all_numeric = false;
            }
        }
    }
    if !saw_value {
        "TEXT"
    } else if all_integer {
        "INTEGER"
    } else if all_numeric {
        "REAL"
    } else {
        "TEXT"
    }
}

impl QueryEngine for SqliteEngine {
    fn execute(&self, sql: &str) -> Result<Table, EngineError> {
        let mut stmt = self.conn.prepare(sql)?;
        let columns: Vec<String> = stmt
            .column_names()
            .iter()
            .map(|c| c.to_string())
            .collect();
        let ncols = columns.len();

        let mut out = Vec::new();
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            let mut cells = Vec::with_capacity(ncols);
            for i in 0..ncols {
                cells.push(match row.get_ref(i)? {
                    ValueRef::Null => Value::Null,
                    ValueRef::Integer(v) => Value::Integer(v),
                    ValueRef::Real(v) => Value::Float(v),
                    ValueRef::Text(t) => {
                        Value::Text(String::from_utf8_lossy(t).into_owned())
                    }
                    ValueRef::Blob(b) => Value::Text(format!("<{} bytes>", b.len())),
                });
            }
            out.push(cells);
        }

        Ok(Table { columns, rows: out })
    }

    fn describe(&self, table: &str) -> Result<Vec<(String, String)>, EngineError> {
        let sql = format!(
            "SELECT name, type FROM pragma_table_info({})",
            quote_literal(table)
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query([])?;
        let mut schema = Vec::new();
        while let Some(row) = rows.next()? {
            schema.push((row.get::<_, String>(0)?, row.get::<_, String>(1)?));
        }
        if schema.is_empty() {
            return Err(EngineError(format!("no such table: {}", table)));
        }
        Ok(schema)
    }

    fn list_tables(&self) -> Result<Vec<String>, EngineError> {
        let mut stmt = self.conn.prepare(
            "SELECT name FROM sqlite_master \
             WHERE type IN ('table', 'view') AND name NOT LIKE 'sqlite_%' \
             ORDER BY name",
        )?;
        let mut rows = stmt.query([])?;
        let mut names = Vec::new();
        while let Some(row) = rows.next()? {
            names.push(row.get(0)?);
        }
        Ok(names)
    }

    fn rename_table(&self, old: &str, new: &str) -> Result<(), EngineError> {
        let sql = format!(
            "ALTER TABLE {} RENAME TO {}",
            quote_ident(old),
            quote_ident(new)
        );
        self.conn.execute_batch(&sql)?;
        Ok(())
    }

    fn drop_table(&self, table: &str) -> Result<(), EngineError> {
        let sql = format!("DROP TABLE IF EXISTS {}", quote_ident(table));
        self.conn.execute_batch(&sql)?;
        Ok(())
    }

    fn register(&self, name: &str, data: &Table) -> Result<(), EngineError> {
        if data.columns.is_empty() {
            return Err(EngineError(format!(
                "cannot register '{}': no columns",
                name
            )));
        }

        self.drop_table(name)?;

        let decls: Vec<String> = data
            .columns
            .iter()
            .enumerate()
            .map(|(i, c)| format!("{} {}", quote_ident(c), column_affinity(data, i)))
            .collect();
        let create = format!(
            "CREATE TABLE {} ({})",
            quote_ident(name),
            decls.join(", ")
        );
        self.conn.execute_batch(&create)?;

        if data.rows.is_empty() {
            return Ok(());
        }

        let placeholders: Vec<String> =
            (1..=data.columns.len()).map(|i| format!("?{}", i)).collect();
        let insert = format!(
            "INSERT INTO {} VALUES ({})",
            quote_ident(name),
            placeholders.join(", ")
        );

        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare(&insert)?;
            for row in &data.rows {
                stmt.execute(rusqlite::params_from_iter(row.iter()))?;
            }
        }
        tx.commit()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table {
            columns: vec!["ID".into(), "Name".into(), "Value".into()],
            rows: vec![
                vec![
                    Value::Integer(1),
                    Value::Text("Alice".into()),
                    Value::Integer(100),
                ],
                vec![
                    Value::Integer(2),
                    Value::Text("Bob".into()),
                    Value::Integer(200),
                ],
                vec![
                    Value::Integer(3),
                    Value::Text("Charlie".into()),
                    Value::Integer(150),
                ],
            ],
        }
    }

    #[test]
    fn test_register_and_query() {
        let engine = SqliteEngine::in_memory().unwrap();
        engine.register("people", &sample()).unwrap();

        let res = engine
            .execute("SELECT Name FROM people WHERE Value > 120 ORDER BY ID")
            .unwrap();
        assert_eq!(res.columns, vec!["Name"]);
        let names: Vec<String> = res.rows.iter().map(|r| r[0].to_string()).collect();
        assert_eq!(names, vec!["Bob", "Charlie"]);
    }

    #[test]
    fn test_register_replaces_existing() {
        let engine = SqliteEngine::in_memory().unwrap();
        engine.register("t", &sample()).unwrap();

        let mut smaller = sample();
        smaller.rows.truncate(1);
        engine.register("t", &smaller).unwrap();

        let res = engine.execute("SELECT count(*) FROM t").unwrap();
        assert_eq!(res.rows[0][0], Value::Integer(1));
    }

    #[test]
    fn test_describe_preserves_column_order() {
        let engine = SqliteEngine::in_memory().unwrap();
        engine.register("people", &sample()).unwrap();

        let schema = engine.describe("people").unwrap();
        let names: Vec<&str> = schema.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["ID", "Name", "Value"]);
        assert_eq!(schema[0].1, "INTEGER");
        assert_eq!(schema[1].1, "TEXT");
    }

    #[test]
    fn test_describe_missing_table_fails() {
        let engine = SqliteEngine::in_memory().unwrap();
        assert!(engine.describe("nope").is_err());
    }

    #[test]
    fn test_rename_table() {
        let engine = SqliteEngine::in_memory().unwrap();
        engine.register("before", &sample()).unwrap();
        engine.rename_table("before", "after").unwrap();

        let tables = engine.list_tables().unwrap();
        assert!(tables.contains(&"after".to_string()));
        assert!(!tables.contains(&"before".to_string()));
    }

    #[test]
    fn test_drop_missing_table_is_ok() {
        let engine = SqliteEngine::in_memory().unwrap();
        assert!(engine.drop_table("ghost").is_ok());
    }

    #[test]
    fn test_quoted_identifiers() {
        let engine = SqliteEngine::in_memory().unwrap();
        let data = Table {
            columns: vec!["weird col".into()],
            rows: vec![vec![Value::Integer(7)]],
        };
        engine.register("odd name", &data).unwrap();
        let res = engine
            .execute("SELECT \"weird col\" FROM \"odd name\"")
            .unwrap();
        assert_eq!(res.rows[0][0], Value::Integer(7));
    }

    #[test]
    fn test_all_null_column_registers_as_text() {
        let engine = SqliteEngine::in_memory().unwrap();
        let data = Table {
            columns: vec!["a".into()],
            rows: vec![vec![Value::Null]],
        };
        engine.register("nulls", &data).unwrap();
        assert_eq!(engine.describe("nulls").unwrap()[0].1, "TEXT");
    }
}
