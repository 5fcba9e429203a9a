// Session core: the table namespace and the batch-script engine.
//
// A `Session` owns all mutable state — registry, result stage, history,
// recorder — and every component mutates it through `&mut` on the one
// control thread. Per-item failures (a bad file, a failing task) end up in
// report structs; only structural failures surface as `Err`.

pub mod alias;
pub mod error;
pub mod history;
pub mod loader;
pub mod recorder;
pub mod registry;
pub mod script;
pub mod session;
pub mod stage;

pub use alias::AliasReport;
pub use error::SessionError;
pub use history::HistoryRing;
pub use loader::{LoadReport, SourceFormat};
pub use recorder::SessionRecorder;
pub use registry::{LogicalTable, Registry};
pub use script::{ExportOutcome, ExportSpec, InputSpec, ScriptReport, ScriptSpec, TaskSpec};
pub use session::{Session, DEFAULT_EXPORT_FILENAME};
pub use stage::{ResultStage, ResultWriter};
