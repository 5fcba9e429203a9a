// Alias resolver: renames loader-derived tables to user-chosen aliases.
//
// Matching is structural against the declared input list, not substring
// scanning: a single-table input matches its exact derived name, a
// spreadsheet input matches derived-prefix + sheet remainder. Every declared
// input competes for a table, aliased or not. Tie-break policy when two
// inputs' sanitized bases are prefixes of one another: the longest base
// wins; equal lengths fall back to declaration order. A winning input
// without an alias keeps the table's derived name.

use sheetql_engine::QueryEngine;

use crate::loader::{derive_table_name, sanitize, SourceFormat};
use crate::registry::Registry;
use crate::script::InputSpec;

#[derive(Debug, Default)]
pub struct AliasReport {
    /// (old name, new name) per successful rename, in processing order.
    pub renamed: Vec<(String, String)>,
    /// One entry per table that kept its original name, naming it.
    pub failures: Vec<String>,
}

/// Rename every loaded table whose source input declared an alias. The
/// registry entry moves with the rename; failures leave the original name
/// in place and the remaining tables are still processed.
pub fn apply_aliases(
    engine: &dyn QueryEngine,
    registry: &mut Registry,
    loaded: &[String],
    inputs: &[InputSpec],
) -> AliasReport {
    let mut report = AliasReport::default();

    for table in loaded {
        let target = match best_match(table, inputs) {
            Some(t) => t,
            None => continue,
        };
        if target == *table {
            continue;
        }

        // The source must be renameable before the target name is freed;
        // dropping the target for a rename that then fails would lose it
        if let Err(err) = engine.describe(table) {
            report.failures.push(format!(
                "could not alias '{}' -> '{}': {}",
                table, target, err
            ));
            continue;
        }
        if let Err(err) = engine.drop_table(&target) {
            report.failures.push(format!(
                "could not alias '{}' -> '{}': {}",
                table, target, err
            ));
            continue;
        }
        match engine.rename_table(table, &target) {
            Ok(()) => {
                registry.rename(table, &target);
                report.renamed.push((table.clone(), target));
            }
            Err(err) => {
                // Target dropped from the engine; drop its registry entry
                registry.drop(&target);
                report.failures.push(format!(
                    "could not alias '{}' -> '{}': {}",
                    table, target, err
                ));
            }
        }
    }

    report
}

/// The alias target for `table`, if the winning structurally matching input
/// declared one. Alias-less inputs still compete for the table so a sheet
/// match from a shorter base cannot hijack their derived name.
fn best_match(table: &str, inputs: &[InputSpec]) -> Option<String> {
    // (target if the input carries an alias, sanitized base length)
    let mut best: Option<(Option<String>, usize)> = None;

    for input in inputs {
        let format = match SourceFormat::from_path(&input.path) {
            Some(f) => f,
            None => continue,
        };
        let stem = input
            .path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default();
        let base = sanitize(stem);

        let target = match format {
            SourceFormat::Excel => {
                // One sheet of this workbook: alias keeps the sheet suffix
                match table.strip_prefix(&format!("{}_", base)) {
                    Some(rest) if !rest.is_empty() => {
                        input.alias.as_ref().map(|a| format!("{}_{}", a, rest))
                    }
                    _ => continue,
                }
            }
            _ => {
                if derive_table_name(&input.path, format) != table {
                    continue;
                }
                input.alias.clone()
            }
        };

        // Longest sanitized base wins; earlier declaration wins ties
        let better = match &best {
            Some((_, best_len)) => base.len() > *best_len,
            None => true,
        };
        if better {
            best = Some((target, base.len()));
        }
    }

    best.and_then(|(target, _)| target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    use sheetql_engine::{SqliteEngine, Table, Value};

    use crate::registry::LogicalTable;

    fn input(path: &str, alias: Option<&str>) -> InputSpec {
        InputSpec {
            path: PathBuf::from(path),
            alias: alias.map(|a| a.to_string()),
        }
    }

    fn seed(engine: &SqliteEngine, registry: &mut Registry, name: &str) {
        let data = Table {
            columns: vec!["a".into()],
            rows: vec![vec![Value::Integer(1)]],
        };
        engine.register(name, &data).unwrap();
        registry.insert(LogicalTable {
            name: name.to_string(),
            source: PathBuf::from("x.csv"),
            format: SourceFormat::Csv,
            columns: vec!["a".into()],
        });
    }

    #[test]
    fn test_exact_match_single_table_source() {
        assert_eq!(
            best_match("sample_csv", &[input("data/sample.csv", Some("my_data"))]),
            Some("my_data".to_string())
        );
    }

    #[test]
    fn test_sheet_match_keeps_sheet_suffix() {
        assert_eq!(
            best_match("report_cities", &[input("report.xlsx", Some("geo"))]),
            Some("geo_cities".to_string())
        );
    }

    #[test]
    fn test_no_match_without_alias() {
        assert_eq!(best_match("sample_csv", &[input("sample.csv", None)]), None);
    }

    #[test]
    fn test_unrelated_input_does_not_match() {
        assert_eq!(
            best_match("sample_csv", &[input("other.csv", Some("x"))]),
            None
        );
    }

    #[test]
    fn test_longest_base_wins_over_declaration_order() {
        // Both bases are prefixes of one another's tables; the sheet-style
        // match from "sales" would also fit "sales_q1_csv"
        let inputs = [
            input("sales.xlsx", Some("alpha")),
            input("sales_q1.csv", Some("beta")),
        ];
        assert_eq!(best_match("sales_q1_csv", &inputs), Some("beta".to_string()));
    }

    #[test]
    fn test_aliasless_input_keeps_its_derived_name() {
        // The sheet-style match from "sales" would produce "geo_q1_csv", but
        // the alias-less declared owner of "sales_q1_csv" outranks it
        let inputs = [
            input("sales.xlsx", Some("geo")),
            input("sales_q1.csv", None),
        ];
        assert_eq!(best_match("sales_q1_csv", &inputs), None);
    }

    #[test]
    fn test_equal_bases_first_declared_wins() {
        let inputs = [
            input("sales.xlsx", Some("first")),
            input("sales.xls", Some("second")),
        ];
        assert_eq!(best_match("sales_summary", &inputs), Some("first_summary".to_string()));
    }

    #[test]
    fn test_apply_renames_engine_and_registry() {
        let engine = SqliteEngine::in_memory().unwrap();
        let mut registry = Registry::default();
        seed(&engine, &mut registry, "sample_csv");

        let report = apply_aliases(
            &engine,
            &mut registry,
            &["sample_csv".to_string()],
            &[input("sample.csv", Some("my_data"))],
        );

        assert_eq!(report.renamed, vec![("sample_csv".to_string(), "my_data".to_string())]);
        assert!(report.failures.is_empty());
        assert!(registry.contains("my_data"));
        assert!(!registry.contains("sample_csv"));
        assert!(engine.describe("my_data").is_ok());
    }

    #[test]
    fn test_apply_drops_colliding_target_first() {
        let engine = SqliteEngine::in_memory().unwrap();
        let mut registry = Registry::default();
        seed(&engine, &mut registry, "sample_csv");
        seed(&engine, &mut registry, "my_data");

        let report = apply_aliases(
            &engine,
            &mut registry,
            &["sample_csv".to_string()],
            &[input("sample.csv", Some("my_data"))],
        );

        assert_eq!(report.renamed.len(), 1);
        assert_eq!(registry.len(), 1);
        assert!(registry.contains("my_data"));
    }

    #[test]
    fn test_rename_failure_keeps_original_name() {
        let engine = SqliteEngine::in_memory().unwrap();
        let mut registry = Registry::default();
        // Registered in the registry but never created in the engine, so the
        // engine-level rename fails
        registry.insert(LogicalTable {
            name: "ghost_csv".to_string(),
            source: PathBuf::from("ghost.csv"),
            format: SourceFormat::Csv,
            columns: Vec::new(),
        });

        let report = apply_aliases(
            &engine,
            &mut registry,
            &["ghost_csv".to_string()],
            &[input("ghost.csv", Some("spirit"))],
        );

        assert!(report.renamed.is_empty());
        assert_eq!(report.failures.len(), 1);
        assert!(report.failures[0].contains("ghost_csv"));
        assert!(registry.contains("ghost_csv"));
    }

    #[test]
    fn test_failed_alias_leaves_target_table_intact() {
        let engine = SqliteEngine::in_memory().unwrap();
        let mut registry = Registry::default();
        seed(&engine, &mut registry, "my_data");
        // In the registry but never created in the engine
        registry.insert(LogicalTable {
            name: "ghost_csv".to_string(),
            source: PathBuf::from("ghost.csv"),
            format: SourceFormat::Csv,
            columns: Vec::new(),
        });

        let report = apply_aliases(
            &engine,
            &mut registry,
            &["ghost_csv".to_string()],
            &[input("ghost.csv", Some("my_data"))],
        );

        // The alias failed without sacrificing the existing target
        assert!(report.renamed.is_empty());
        assert_eq!(report.failures.len(), 1);
        assert!(engine.describe("my_data").is_ok());
        assert!(registry.contains("my_data"));
    }
}
