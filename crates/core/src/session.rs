// The session: one context struct owning every piece of mutable state, passed
// by reference into component calls. No globals, no locks — single-threaded
// by design.

use std::path::{Path, PathBuf};

use sheetql_engine::{EngineError, QueryEngine, SqliteEngine, Table};
use sheetql_io as io;

use crate::alias::{self, AliasReport};
use crate::error::SessionError;
use crate::history::HistoryRing;
use crate::loader::{self, LoadReport};
use crate::recorder::SessionRecorder;
use crate::registry::Registry;
use crate::script::{ExportOutcome, ScriptReport, ScriptSpec};
use crate::stage::{ResultStage, ResultWriter};

/// Export destination when none is declared.
pub const DEFAULT_EXPORT_FILENAME: &str = "query_result.xlsx";

fn xlsx_writer(results: &[(String, Table)], path: &Path) -> Result<(), String> {
    io::xlsx::write_results(results, path)
}

pub struct Session {
    engine: Box<dyn QueryEngine>,
    writer: Box<dyn ResultWriter>,
    pub registry: Registry,
    pub stage: ResultStage,
    pub history: HistoryRing,
    pub recorder: SessionRecorder,
}

impl Session {
    /// A session over a fresh in-memory SQLite engine, exporting to XLSX.
    pub fn new() -> Result<Self, EngineError> {
        Ok(Self::with_parts(
            Box::new(SqliteEngine::in_memory()?),
            Box::new(xlsx_writer as fn(&[(String, Table)], &Path) -> Result<(), String>),
        ))
    }

    /// Inject a custom engine or writer (tests swap in failing writers).
    pub fn with_parts(engine: Box<dyn QueryEngine>, writer: Box<dyn ResultWriter>) -> Self {
        Self {
            engine,
            writer,
            registry: Registry::default(),
            stage: ResultStage::default(),
            history: HistoryRing::default(),
            recorder: SessionRecorder::default(),
        }
    }

    pub fn engine(&self) -> &dyn QueryEngine {
        self.engine.as_ref()
    }

    /// Load a batch of files and record every created table.
    pub fn load_files(&mut self, paths: &[PathBuf]) -> LoadReport {
        let report = loader::load(self.engine.as_ref(), &mut self.registry, paths);
        for (path, table) in &report.created {
            self.recorder.record_load(path, table);
        }
        report
    }

    /// Apply declared aliases to a freshly loaded batch.
    pub fn apply_aliases(
        &mut self,
        loaded: &[String],
        inputs: &[crate::script::InputSpec],
    ) -> AliasReport {
        alias::apply_aliases(self.engine.as_ref(), &mut self.registry, loaded, inputs)
    }

    /// Record a query in history, then execute it. Failing queries stay in
    /// history — `!N` can retry a fixed-up session state.
    pub fn run_query(&mut self, sql: &str) -> Result<Table, SessionError> {
        self.history.record(sql);
        self.engine
            .execute(sql)
            .map_err(|e| SessionError::Query(e.to_string()))
    }

    /// Replay history entry `index` (1-based). The replay itself becomes a
    /// new history entry. Returns the replayed text with the result.
    pub fn replay(&mut self, index: usize) -> Result<(String, Table), SessionError> {
        let sql = self.history.get(index)?.to_string();
        let result = self.run_query(&sql)?;
        Ok((sql, result))
    }

    /// Stage a result for export and record the transformation.
    pub fn stage_result(&mut self, name: &str, sql: &str, result: Table) {
        self.stage.stage(name, result);
        self.recorder.record_query(name, sql);
    }

    /// Rename one table: drop any table already holding the target name,
    /// rename at the engine, move the registry entry.
    ///
    /// The source is verified first. A typo'd old name must fail before the
    /// target is dropped, or the failing rename would destroy the target's
    /// data.
    pub fn rename_table(&mut self, old: &str, new: &str) -> Result<(), SessionError> {
        self.engine
            .describe(old)
            .map_err(|e| SessionError::Rename(e.to_string()))?;
        self.engine
            .drop_table(new)
            .map_err(|e| SessionError::Rename(e.to_string()))?;
        if let Err(err) = self.engine.rename_table(old, new) {
            // The target is already gone from the engine; the registry
            // entry for it must go too
            self.registry.drop(new);
            return Err(SessionError::Rename(err.to_string()));
        }
        self.registry.rename(old, new);
        Ok(())
    }

    /// Export all staged results. The stage clears only on success; the
    /// export is recorded for script regeneration.
    pub fn export(&mut self, path: Option<&Path>) -> Result<(PathBuf, usize), SessionError> {
        let path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_EXPORT_FILENAME));
        let sheets = self.stage.export(self.writer.as_ref(), &path)?;
        self.recorder.record_export(&path);
        Ok((path, sheets))
    }

    /// Run a declarative script: inputs, then tasks, then export. Each phase
    /// is optional and each item is individually fault-tolerant; rerunning
    /// the same script is safe (loads overwrite, aliases drop-then-rename,
    /// tasks overwrite staged names).
    pub fn run_script(&mut self, spec: &ScriptSpec) -> ScriptReport {
        let mut report = ScriptReport::new();

        if !spec.inputs.is_empty() {
            let paths: Vec<PathBuf> = spec.inputs.iter().map(|i| i.path.clone()).collect();
            let load = self.load_files(&paths);
            let loaded = load.table_names();
            report.load = Some(load);
            report.aliases = Some(self.apply_aliases(&loaded, &spec.inputs));
        }

        for task in &spec.tasks {
            match self.engine.execute(&task.sql) {
                Ok(result) => {
                    self.stage_result(&task.name, &task.sql, result);
                    report.tasks_completed.push(task.name.clone());
                }
                Err(err) => {
                    report.task_failures.push((task.name.clone(), err.to_string()));
                }
            }
        }

        if let Some(export) = &spec.export {
            if self.stage.is_empty() {
                report.export = ExportOutcome::NothingStaged;
            } else {
                let declared = export.path.as_deref();
                match self.export(declared) {
                    Ok((path, sheets)) => {
                        report.export = ExportOutcome::Written { path, sheets };
                    }
                    Err(err) => {
                        report.export = ExportOutcome::Failed {
                            path: declared
                                .map(Path::to_path_buf)
                                .unwrap_or_else(|| PathBuf::from(DEFAULT_EXPORT_FILENAME)),
                            reason: err.to_string(),
                        };
                    }
                }
            }
        }

        report
    }
}
