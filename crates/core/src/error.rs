// Session error taxonomy.
//
// Only failures that cross a component boundary live here. Per-item
// failures (one file in a batch, one task in a script) are carried in the
// corresponding report structs instead, so the batch can continue.

use std::fmt;

#[derive(Debug)]
pub enum SessionError {
    /// SQL execution failed; the session stays usable.
    Query(String),
    /// A direct rename failed; the table keeps its original name.
    Rename(String),
    /// The spreadsheet writer failed; staged results are preserved for retry.
    Export(String),
    /// History replay index outside `1..=len`.
    HistoryRange { index: usize, len: usize },
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::Query(msg) => write!(f, "SQL error: {}", msg),
            SessionError::Rename(msg) => write!(f, "rename failed: {}", msg),
            SessionError::Export(msg) => write!(f, "export failed: {}", msg),
            SessionError::HistoryRange { index, len } => {
                write!(f, "history index {} out of range (1..={})", index, len)
            }
        }
    }
}

impl std::error::Error for SessionError {}
