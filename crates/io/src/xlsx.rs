// Excel import (xlsx, xls, xlsb, ods) and styled XLSX export.
//
// Import: one table per sheet, first row as headers. Header sanitization is
// the session core's job; this module returns names as found.
// Export: one worksheet per staged result — a presentation snapshot, not a
// round-trip format.

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use rust_xlsxwriter::{Color, Format, Workbook};
use sheetql_engine::{Table, Value};

/// Excel worksheet names are capped at 31 characters.
const MAX_SHEET_NAME_LEN: usize = 31;

/// Header fill used on exported result sheets (steel blue, white bold text).
const HEADER_FILL: u32 = 0x4F81BD;

/// Exported columns get a fixed readable width.
const EXPORT_COLUMN_WIDTH: f64 = 20.0;

/// Read every sheet of a spreadsheet file. Sheets without a header row are
/// skipped. Returns (sheet name, table) pairs in workbook order.
pub fn read_sheets(path: &Path) -> Result<Vec<(String, Table)>, String> {
    let mut workbook = open_workbook_auto(path).map_err(|e| e.to_string())?;
    let sheet_names = workbook.sheet_names().to_owned();

    let mut sheets = Vec::new();
    for name in sheet_names {
        let range = workbook
            .worksheet_range(&name)
            .map_err(|e| format!("sheet '{}': {}", name, e))?;

        let mut rows_iter = range.rows();
        let header = match rows_iter.next() {
            Some(r) => r,
            None => continue,
        };
        let columns: Vec<String> = header
            .iter()
            .enumerate()
            .map(|(i, cell)| {
                let text = cell_to_value(cell).to_string();
                let trimmed = text.trim().to_string();
                if trimmed.is_empty() {
                    format!("column_{}", i + 1)
                } else {
                    trimmed
                }
            })
            .collect();

        let rows: Vec<Vec<Value>> = rows_iter
            .map(|r| r.iter().map(cell_to_value).collect())
            .collect();

        sheets.push((name, Table { columns, rows }));
    }

    Ok(sheets)
}

fn cell_to_value(cell: &Data) -> Value {
    match cell {
        Data::Empty => Value::Null,
        Data::Int(v) => Value::Integer(*v),
        Data::Float(v) => Value::Float(*v),
        Data::Bool(b) => Value::Integer(*b as i64),
        Data::String(s) => Value::Text(s.clone()),
        Data::DateTime(dt) => Value::Float(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Value::Text(s.clone()),
        Data::Error(e) => Value::Text(format!("{:?}", e)),
    }
}

/// Write named result sets to an XLSX workbook, one worksheet per result,
/// with the header row styled and columns widened.
pub fn write_results(results: &[(String, Table)], path: &Path) -> Result<(), String> {
    let mut workbook = Workbook::new();

    let header_format = Format::new()
        .set_bold()
        .set_font_color(Color::White)
        .set_background_color(Color::RGB(HEADER_FILL));

    for (name, table) in results {
        let sheet_name: String = name.chars().take(MAX_SHEET_NAME_LEN).collect();
        let worksheet = workbook
            .add_worksheet()
            .set_name(&sheet_name)
            .map_err(|e| format!("sheet '{}': {}", name, e))?;

        for (col, column) in table.columns.iter().enumerate() {
            worksheet
                .write_with_format(0, col as u16, column.as_str(), &header_format)
                .map_err(|e| e.to_string())?;
            worksheet
                .set_column_width(col as u16, EXPORT_COLUMN_WIDTH)
                .map_err(|e| e.to_string())?;
        }

        for (r, row) in table.rows.iter().enumerate() {
            let excel_row = (r + 1) as u32;
            for (c, cell) in row.iter().enumerate() {
                let col = c as u16;
                match cell {
                    Value::Null => {}
                    Value::Integer(v) => {
                        worksheet
                            .write_number(excel_row, col, *v as f64)
                            .map_err(|e| e.to_string())?;
                    }
                    Value::Float(v) => {
                        worksheet
                            .write_number(excel_row, col, *v)
                            .map_err(|e| e.to_string())?;
                    }
                    Value::Text(s) => {
                        worksheet
                            .write_string(excel_row, col, s.as_str())
                            .map_err(|e| e.to_string())?;
                    }
                }
            }
        }
    }

    workbook
        .save(path)
        .map_err(|e| format!("failed to save '{}': {}", path.display(), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn result_table() -> Table {
        Table {
            columns: vec!["City".into(), "Population".into()],
            rows: vec![
                vec![Value::Text("NY".into()), Value::Float(8.4)],
                vec![Value::Text("LA".into()), Value::Float(3.9)],
            ],
        }
    }

    #[test]
    fn test_write_then_read_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.xlsx");

        let results = vec![("Cities".to_string(), result_table())];
        write_results(&results, &path).unwrap();

        let sheets = read_sheets(&path).unwrap();
        assert_eq!(sheets.len(), 1);
        let (name, table) = &sheets[0];
        assert_eq!(name, "Cities");
        assert_eq!(table.columns, vec!["City", "Population"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0][0], Value::Text("NY".into()));
        assert_eq!(table.rows[1][1], Value::Float(3.9));
    }

    #[test]
    fn test_write_multiple_sheets_in_order() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("multi.xlsx");

        let results = vec![
            ("second_quarter".to_string(), result_table()),
            ("first_quarter".to_string(), result_table()),
        ];
        write_results(&results, &path).unwrap();

        let sheets = read_sheets(&path).unwrap();
        let names: Vec<&str> = sheets.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["second_quarter", "first_quarter"]);
    }

    #[test]
    fn test_long_result_name_truncated_to_sheet_limit() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("long.xlsx");

        let long_name = "a".repeat(40);
        let results = vec![(long_name, result_table())];
        write_results(&results, &path).unwrap();

        let sheets = read_sheets(&path).unwrap();
        assert_eq!(sheets[0].0.len(), MAX_SHEET_NAME_LEN);
    }

    #[test]
    fn test_blank_header_cells_get_placeholder_names() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("blank.xlsx");

        let table = Table {
            columns: vec!["".into(), "b".into()],
            rows: vec![vec![Value::Integer(1), Value::Integer(2)]],
        };
        write_results(&[("s".to_string(), table)], &path).unwrap();

        let sheets = read_sheets(&path).unwrap();
        assert_eq!(sheets[0].1.columns, vec!["column_1", "b"]);
    }
}
