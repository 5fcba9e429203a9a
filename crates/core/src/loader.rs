// Loader: turns input files into uniquely, deterministically named tables.
//
// Dispatch is a closed enum over supported formats; adding a format means
// adding a variant. Per-file failures become report warnings, never errors —
// the rest of the batch always runs.

use std::path::{Path, PathBuf};

use sheetql_engine::QueryEngine;
use sheetql_io as io;

use crate::registry::{LogicalTable, Registry};

/// Supported source formats. Each variant owns its read-and-register
/// strategy in `load_file`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// Delimited text (.csv, .tsv); delimiter is sniffed.
    Csv,
    /// Array-of-objects .json, or line-delimited .jsonl/.ndjson.
    Json,
    Parquet,
    /// Multi-sheet spreadsheet (.xlsx, .xls, .xlsb, .ods): one table per sheet.
    Excel,
}

impl SourceFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "csv" | "tsv" => Some(SourceFormat::Csv),
            "json" | "jsonl" | "ndjson" => Some(SourceFormat::Json),
            "parquet" => Some(SourceFormat::Parquet),
            "xlsx" | "xls" | "xlsb" | "ods" => Some(SourceFormat::Excel),
            _ => None,
        }
    }

    /// Table-name suffix for single-table formats. Excel tables are named
    /// per sheet instead.
    pub fn suffix(self) -> &'static str {
        match self {
            SourceFormat::Csv => "_csv",
            SourceFormat::Json => "_json",
            SourceFormat::Parquet => "_parquet",
            SourceFormat::Excel => "",
        }
    }
}

/// Replace every run of non-alphanumeric, non-underscore characters with a
/// single underscore. Existing underscores pass through untouched.
pub fn sanitize(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_run = false;
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() || ch == '_' {
            out.push(ch);
            in_run = false;
        } else if !in_run {
            out.push('_');
            in_run = true;
        }
    }
    out
}

/// Deterministic table name for a single-table source:
/// `sanitize(basename without extension)` + format suffix.
pub fn derive_table_name(path: &Path, format: SourceFormat) -> String {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    format!("{}{}", sanitize(stem), format.suffix())
}

/// Outcome of one load batch. `created` preserves creation order; every
/// skipped file leaves a warning naming it.
#[derive(Debug, Default)]
pub struct LoadReport {
    /// (source path, table name) per created table, in creation order.
    pub created: Vec<(PathBuf, String)>,
    pub warnings: Vec<String>,
}

impl LoadReport {
    pub fn table_names(&self) -> Vec<String> {
        self.created.iter().map(|(_, name)| name.clone()).collect()
    }
}

/// Load a batch of files, registering every resulting table with the engine
/// and the registry. Never fails: unreadable or unsupported files are
/// skipped with a warning.
pub fn load(
    engine: &dyn QueryEngine,
    registry: &mut Registry,
    paths: &[PathBuf],
) -> LoadReport {
    let mut report = LoadReport::default();

    for path in paths {
        let format = match SourceFormat::from_path(path) {
            Some(f) => f,
            None => {
                report.warnings.push(format!(
                    "skipping unsupported file type: {}",
                    path.display()
                ));
                continue;
            }
        };

        let mut created = Vec::new();
        let result = load_file(engine, path, format, &mut created);
        // Tables registered before a mid-file failure stay (a later sheet of
        // a workbook may fail after earlier ones registered cleanly)
        for name in created {
            registry.insert(LogicalTable {
                name: name.clone(),
                source: path.clone(),
                format,
                columns: Vec::new(),
            });
            report.created.push((path.clone(), name));
        }
        if let Err(err) = result {
            report
                .warnings
                .push(format!("failed to load '{}': {}", path.display(), err));
        }
    }

    // Replace-on-reload: cache every created table's schema from the engine
    for (_, name) in &report.created {
        if let Ok(schema) = engine.describe(name) {
            let columns = schema.into_iter().map(|(name, _)| name).collect();
            registry.set_schema(name, columns);
        }
    }

    report
}

fn load_file(
    engine: &dyn QueryEngine,
    path: &Path,
    format: SourceFormat,
    created: &mut Vec<String>,
) -> Result<(), String> {
    match format {
        SourceFormat::Csv => {
            let data = io::csv::read(path)?;
            register_single(engine, path, format, &data, created)
        }
        SourceFormat::Json => {
            let ext = path
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or_default()
                .to_ascii_lowercase();
            let data = if ext == "jsonl" || ext == "ndjson" {
                io::json::read_ndjson(path)?
            } else {
                io::json::read(path)?
            };
            register_single(engine, path, format, &data, created)
        }
        SourceFormat::Parquet => {
            let data = io::parquet::read(path)?;
            register_single(engine, path, format, &data, created)
        }
        SourceFormat::Excel => {
            let stem = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or_default();
            let base = sanitize(stem);
            for (sheet, mut data) in io::xlsx::read_sheets(path)? {
                // Spreadsheet headers are sanitized and lower-cased at load
                data.columns = data
                    .columns
                    .iter()
                    .map(|c| sanitize(c.trim()).to_ascii_lowercase())
                    .collect();
                let name = format!("{}_{}", base, sanitize(&sheet).to_ascii_lowercase());
                engine
                    .register(&name, &data)
                    .map_err(|e| format!("sheet '{}': {}", sheet, e))?;
                created.push(name);
            }
            Ok(())
        }
    }
}

fn register_single(
    engine: &dyn QueryEngine,
    path: &Path,
    format: SourceFormat,
    data: &sheetql_engine::Table,
    created: &mut Vec<String>,
) -> Result<(), String> {
    let name = derive_table_name(path, format);
    engine.register(&name, data).map_err(|e| e.to_string())?;
    created.push(name);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_collapses_runs() {
        assert_eq!(sanitize("my file (v2).final"), "my_file_v2_final");
        assert_eq!(sanitize("a--b"), "a_b");
        assert_eq!(sanitize("a__b"), "a__b");
        assert_eq!(sanitize("Sales Q1"), "Sales_Q1");
        assert_eq!(sanitize("héllo"), "h_llo");
    }

    #[test]
    fn test_derive_table_name_is_deterministic() {
        let path = Path::new("/data/Monthly Sales.csv");
        let first = derive_table_name(path, SourceFormat::Csv);
        let second = derive_table_name(path, SourceFormat::Csv);
        assert_eq!(first, "Monthly_Sales_csv");
        assert_eq!(first, second);
    }

    #[test]
    fn test_derive_strips_directory_and_extension() {
        assert_eq!(
            derive_table_name(Path::new("/a/b/data.parquet"), SourceFormat::Parquet),
            "data_parquet"
        );
        assert_eq!(
            derive_table_name(Path::new("events.jsonl"), SourceFormat::Json),
            "events_json"
        );
    }

    #[test]
    fn test_format_dispatch_by_extension() {
        assert_eq!(
            SourceFormat::from_path(Path::new("x.CSV")),
            Some(SourceFormat::Csv)
        );
        assert_eq!(
            SourceFormat::from_path(Path::new("x.ndjson")),
            Some(SourceFormat::Json)
        );
        assert_eq!(
            SourceFormat::from_path(Path::new("x.xlsb")),
            Some(SourceFormat::Excel)
        );
        assert_eq!(SourceFormat::from_path(Path::new("x.docx")), None);
        assert_eq!(SourceFormat::from_path(Path::new("noext")), None);
    }
}
