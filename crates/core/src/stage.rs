// Result stage: named query outputs held pending export.

use std::path::Path;

use sheetql_engine::Table;

use crate::error::SessionError;

/// The spreadsheet writer boundary. Formatting and styling are the
/// implementation's business; the stage only hands over the ordered
/// name -> result mapping.
pub trait ResultWriter {
    fn write(&self, results: &[(String, Table)], path: &Path) -> Result<(), String>;
}

impl<F> ResultWriter for F
where
    F: Fn(&[(String, Table)], &Path) -> Result<(), String>,
{
    fn write(&self, results: &[(String, Table)], path: &Path) -> Result<(), String> {
        self(results, path)
    }
}

/// Insertion-ordered name -> result mapping. Re-staging an existing name
/// overwrites it in place; the whole stage clears on successful export.
#[derive(Debug, Default)]
pub struct ResultStage {
    entries: Vec<(String, Table)>,
}

impl ResultStage {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(n, _)| n == name)
    }

    pub fn get(&self, name: &str) -> Option<&Table> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, t)| t)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn stage(&mut self, name: &str, result: Table) {
        match self.entries.iter_mut().find(|(n, _)| n == name) {
            Some((_, slot)) => *slot = result,
            None => self.entries.push((name.to_string(), result)),
        }
    }

    /// Hand everything to the writer. The stage empties only when the writer
    /// succeeds; on failure it is left intact so the user can retry.
    pub fn export(
        &mut self,
        writer: &dyn ResultWriter,
        path: &Path,
    ) -> Result<usize, SessionError> {
        writer
            .write(&self.entries, path)
            .map_err(SessionError::Export)?;
        let exported = self.entries.len();
        self.entries.clear();
        Ok(exported)
    }
}
