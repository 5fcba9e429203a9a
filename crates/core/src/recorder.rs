// Session recorder: append-only log of loads, transformations, and exports,
// replayable as a script.

use std::path::{Path, PathBuf};

use crate::script::{ExportSpec, InputSpec, ScriptSpec, TaskSpec};

/// Statements that introspect rather than transform; these never become
/// script tasks.
const INTROSPECTION_PREFIXES: [&str; 3] = ["SHOW", "DESCRIBE", "PRAGMA"];

#[derive(Debug, Default)]
pub struct SessionRecorder {
    inputs: Vec<InputSpec>,
    tasks: Vec<TaskSpec>,
    exports: Vec<PathBuf>,
}

impl SessionRecorder {
    /// Record one created table. The table name doubles as the alias so the
    /// regenerated script reproduces the session's names exactly.
    pub fn record_load(&mut self, path: &Path, table: &str) {
        self.inputs.push(InputSpec {
            path: path.to_path_buf(),
            alias: Some(table.to_string()),
        });
    }

    /// Record a staged transformation. Introspection statements are skipped.
    pub fn record_query(&mut self, name: &str, sql: &str) {
        let upper = sql.trim_start().to_ascii_uppercase();
        if INTROSPECTION_PREFIXES.iter().any(|p| upper.starts_with(p)) {
            return;
        }
        self.tasks.push(TaskSpec {
            name: name.to_string(),
            sql: sql.to_string(),
        });
    }

    pub fn record_export(&mut self, path: &Path) {
        self.exports.push(path.to_path_buf());
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty() && self.tasks.is_empty() && self.exports.is_empty()
    }

    /// Serialize the session into an equivalent script. Only the most recent
    /// export is retained.
    pub fn to_script(&self) -> ScriptSpec {
        ScriptSpec {
            inputs: self.inputs.clone(),
            tasks: self.tasks.clone(),
            export: self
                .exports
                .last()
                .map(|path| ExportSpec { path: Some(path.clone()) }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_introspection_statements_are_not_recorded() {
        let mut rec = SessionRecorder::default();
        rec.record_query("a", "SELECT * FROM t");
        rec.record_query("b", "show tables");
        rec.record_query("c", "  DESCRIBE t");
        rec.record_query("d", "PRAGMA table_info('t')");

        let script = rec.to_script();
        assert_eq!(script.tasks.len(), 1);
        assert_eq!(script.tasks[0].name, "a");
    }

    #[test]
    fn test_only_last_export_is_serialized() {
        let mut rec = SessionRecorder::default();
        rec.record_export(Path::new("first.xlsx"));
        rec.record_export(Path::new("second.xlsx"));

        let script = rec.to_script();
        assert_eq!(
            script.export.unwrap().path.unwrap(),
            PathBuf::from("second.xlsx")
        );
    }

    #[test]
    fn test_loads_keep_table_names_as_aliases() {
        let mut rec = SessionRecorder::default();
        rec.record_load(Path::new("data/sample.csv"), "sample_csv");

        let script = rec.to_script();
        assert_eq!(script.inputs.len(), 1);
        assert_eq!(script.inputs[0].alias.as_deref(), Some("sample_csv"));
        assert!(script.export.is_none());
    }
}
