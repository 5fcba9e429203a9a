// JSON import: records orientation (array of objects) and NDJSON lines.
//
// Column order is first-seen across records, which relies on serde_json's
// preserve_order feature keeping object keys in document order.

use std::path::Path;

use serde_json::Value as Json;
use sheetql_engine::{Table, Value};

/// Read a `.json` file (array of objects) into a table. Falls back to
/// line-delimited parsing when the document is not a single JSON value.
pub fn read(path: &Path) -> Result<Table, String> {
    let content = std::fs::read_to_string(path).map_err(|e| e.to_string())?;
    match serde_json::from_str::<Json>(&content) {
        Ok(Json::Array(records)) => from_records(records),
        Ok(obj @ Json::Object(_)) => from_records(vec![obj]),
        Ok(_) => Err("expected an array of objects".to_string()),
        Err(_) => read_lines(&content),
    }
}

/// Read a `.jsonl` / `.ndjson` file: one object per line.
pub fn read_ndjson(path: &Path) -> Result<Table, String> {
    let content = std::fs::read_to_string(path).map_err(|e| e.to_string())?;
    read_lines(&content)
}

fn read_lines(content: &str) -> Result<Table, String> {
    let mut records = Vec::new();
    for (lineno, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let value: Json = serde_json::from_str(line)
            .map_err(|e| format!("line {}: {}", lineno + 1, e))?;
        records.push(value);
    }
    from_records(records)
}

fn from_records(records: Vec<Json>) -> Result<Table, String> {
    // Column order: first seen wins, later records may add columns at the end
    let mut columns: Vec<String> = Vec::new();
    for record in &records {
        let obj = record
            .as_object()
            .ok_or_else(|| "expected an array of objects".to_string())?;
        for key in obj.keys() {
            if !columns.iter().any(|c| c == key) {
                columns.push(key.clone());
            }
        }
    }
    if columns.is_empty() {
        return Err("no records".to_string());
    }

    let mut rows = Vec::with_capacity(records.len());
    for record in &records {
        let obj = record.as_object().unwrap();
        let row = columns
            .iter()
            .map(|c| obj.get(c).map(to_value).unwrap_or(Value::Null))
            .collect();
        rows.push(row);
    }

    Ok(Table { columns, rows })
}

fn to_value(v: &Json) -> Value {
    match v {
        Json::Null => Value::Null,
        Json::Bool(b) => Value::Integer(*b as i64),
        Json::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Integer(i)
            } else {
                Value::Float(n.as_f64().unwrap_or(f64::NAN))
            }
        }
        Json::String(s) => Value::Text(s.clone()),
        // Nested structures are kept as their JSON text
        other => Value::Text(other.to_string()),
    }
}
