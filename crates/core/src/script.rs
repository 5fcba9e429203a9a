// Declarative script model: inputs -> tasks -> export.
//
// This is the parsed structure only. Text parsing (TOML in the CLI) happens
// outside the core; the script engine itself lives on `Session::run_script`.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::alias::AliasReport;
use crate::loader::LoadReport;

/// One input file, optionally renamed to a user-chosen alias after load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputSpec {
    pub path: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
}

/// One transformation: the query result is staged under `name`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskSpec {
    pub name: String,
    pub sql: String,
}

/// Export destination. A missing path falls back to the session default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

/// A three-phase batch script. Every block is optional; an absent block
/// skips its phase entirely.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScriptSpec {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub inputs: Vec<InputSpec>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tasks: Vec<TaskSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export: Option<ExportSpec>,
}

impl ScriptSpec {
    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty() && self.tasks.is_empty() && self.export.is_none()
    }
}

/// What the export phase did.
#[derive(Debug, PartialEq)]
pub enum ExportOutcome {
    /// The script declared no export block.
    NotRequested,
    /// An export was declared but nothing was staged.
    NothingStaged,
    Written { path: PathBuf, sheets: usize },
    Failed { path: PathBuf, reason: String },
}

/// Aggregated outcome of one script run. Per-item failures land here; the
/// run itself only fails on a structural problem (malformed script text,
/// caught before this exists).
#[derive(Debug)]
pub struct ScriptReport {
    pub load: Option<LoadReport>,
    pub aliases: Option<AliasReport>,
    /// Task names staged successfully, in declared order.
    pub tasks_completed: Vec<String>,
    /// (task name, reason) per failed task.
    pub task_failures: Vec<(String, String)>,
    pub export: ExportOutcome,
}

impl ScriptReport {
    pub fn new() -> Self {
        Self {
            load: None,
            aliases: None,
            tasks_completed: Vec::new(),
            task_failures: Vec::new(),
            export: ExportOutcome::NotRequested,
        }
    }
}

impl Default for ScriptReport {
    fn default() -> Self {
        Self::new()
    }
}
