// Parquet import via the parquet crate's row API.
//
// Row-by-row materialization is deliberate: this path feeds the engine's
// register step, and the arrow stack would be dead weight for it.

use std::fs::File;
use std::path::Path;

use parquet::file::reader::{FileReader, SerializedFileReader};
use parquet::record::Field;
use sheetql_engine::{Table, Value};

/// Read a parquet file into a table. Nested fields are flattened to their
/// text rendering; flat files (the common case for exported datasets) map
/// one leaf column to one table column.
pub fn read(path: &Path) -> Result<Table, String> {
    let file = File::open(path).map_err(|e| e.to_string())?;
    let reader = SerializedFileReader::new(file).map_err(|e| e.to_string())?;

    let schema = reader.metadata().file_metadata().schema_descr();
    let columns: Vec<String> = schema
        .columns()
        .iter()
        .map(|c| c.name().to_string())
        .collect();

    let mut rows = Vec::new();
    let row_iter = reader.get_row_iter(None).map_err(|e| e.to_string())?;
    for row in row_iter {
        let row = row.map_err(|e| e.to_string())?;
        let cells: Vec<Value> = row
            .get_column_iter()
            .map(|(_, field)| field_to_value(field))
            .collect();
        rows.push(cells);
    }

    Ok(Table { columns, rows })
}

fn field_to_value(field: &Field) -> Value {
    match field {
        Field::Null => Value::Null,
        Field::Bool(b) => Value::Integer(*b as i64),
        Field::Byte(v) => Value::Integer(*v as i64),
        Field::Short(v) => Value::Integer(*v as i64),
        Field::Int(v) => Value::Integer(*v as i64),
        Field::Long(v) => Value::Integer(*v),
        Field::UByte(v) => Value::Integer(*v as i64),
        Field::UShort(v) => Value::Integer(*v as i64),
        Field::UInt(v) => Value::Integer(*v as i64),
        Field::ULong(v) => Value::Integer(*v as i64),
        Field::Float(v) => Value::Float(*v as f64),
        Field::Double(v) => Value::Float(*v),
        Field::Str(s) => Value::Text(s.clone()),
        Field::Bytes(b) => Value::Text(String::from_utf8_lossy(b.data()).into_owned()),
        // Dates, timestamps, decimals, nested groups: keep the text rendering
        other => Value::Text(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use parquet::data_type::{ByteArray, ByteArrayType, Int64Type};
    use parquet::file::properties::WriterProperties;
    use parquet::file::writer::SerializedFileWriter;
    use parquet::schema::parser::parse_message_type;
    use tempfile::tempdir;

    fn write_sample(path: &Path) {
        let message = "message sample {
            required int64 ID;
            required binary Name (UTF8);
            required int64 Value;
        }";
        let schema = Arc::new(parse_message_type(message).unwrap());
        let props = Arc::new(WriterProperties::builder().build());
        let file = File::create(path).unwrap();
        let mut writer = SerializedFileWriter::new(file, schema, props).unwrap();

        let mut rg = writer.next_row_group().unwrap();

        let mut col = rg.next_column().unwrap().unwrap();
        col.typed::<Int64Type>()
            .write_batch(&[1, 2, 3], None, None)
            .unwrap();
        col.close().unwrap();

        let mut col = rg.next_column().unwrap().unwrap();
        let names: Vec<ByteArray> = ["Alice", "Bob", "Charlie"]
            .iter()
            .map(|s| ByteArray::from(*s))
            .collect();
        col.typed::<ByteArrayType>()
            .write_batch(&names, None, None)
            .unwrap();
        col.close().unwrap();

        let mut col = rg.next_column().unwrap().unwrap();
        col.typed::<Int64Type>()
            .write_batch(&[100, 200, 150], None, None)
            .unwrap();
        col.close().unwrap();

        rg.close().unwrap();
        writer.close().unwrap();
    }

    #[test]
    fn test_read_parquet() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sample.parquet");
        write_sample(&path);

        let table = read(&path).unwrap();
        assert_eq!(table.columns, vec!["ID", "Name", "Value"]);
        assert_eq!(table.rows.len(), 3);
        assert_eq!(table.rows[1][1], Value::Text("Bob".into()));
        assert_eq!(table.rows[2][2], Value::Integer(150));
    }
}
