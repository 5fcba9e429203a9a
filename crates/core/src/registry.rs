// Table registry: the session's logical table namespace.
//
// Each entry carries its cached schema, so the invariant "a name is in the
// schema cache iff it is in the registry" holds by construction — rename and
// drop move or remove the whole entry in one step.

use std::path::PathBuf;

use crate::loader::SourceFormat;

/// A named, queryable reference to loaded tabular data.
#[derive(Debug, Clone)]
pub struct LogicalTable {
    /// Registry-wide unique name, case-sensitive as stored.
    pub name: String,
    /// File the table was loaded from.
    pub source: PathBuf,
    pub format: SourceFormat,
    /// Cached ordered column names, refreshed from the engine after load.
    pub columns: Vec<String>,
}

/// Insertion-ordered set of logical tables.
#[derive(Debug, Default)]
pub struct Registry {
    tables: Vec<LogicalTable>,
}

impl Registry {
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn get(&self, name: &str) -> Option<&LogicalTable> {
        self.tables.iter().find(|t| t.name == name)
    }

    /// Cached column list for a table, if known.
    pub fn schema(&self, name: &str) -> Option<&[String]> {
        self.get(name).map(|t| t.columns.as_slice())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tables.iter().map(|t| t.name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &LogicalTable> {
        self.tables.iter()
    }

    /// Insert a table, replacing any existing entry of the same name in
    /// place (reloading a file keeps the table's position).
    pub fn insert(&mut self, table: LogicalTable) {
        match self.tables.iter_mut().find(|t| t.name == table.name) {
            Some(slot) => *slot = table,
            None => self.tables.push(table),
        }
    }

    /// Refresh the cached column list for a table. Returns false if the
    /// table is not registered.
    pub fn set_schema(&mut self, name: &str, columns: Vec<String>) -> bool {
        match self.tables.iter_mut().find(|t| t.name == name) {
            Some(table) => {
                table.columns = columns;
                true
            }
            None => false,
        }
    }

    /// Move an entry from `old` to `new` atomically, schema included.
    ///
    /// The old name is resolved case-insensitively (SQL engines match table
    /// names that way), but the stored name keeps the caller's exact `new`.
    /// Returns false if `old` is not present.
    pub fn rename(&mut self, old: &str, new: &str) -> bool {
        let idx = match self.position_ci(old) {
            Some(i) => i,
            None => return false,
        };
        // A stale entry under the new name would be a duplicate; drop it
        if let Some(existing) = self.position_ci(new) {
            if existing != idx {
                self.tables.remove(existing);
            }
        }
        let idx = self.position_ci(old).expect("entry just located");
        self.tables[idx].name = new.to_string();
        true
    }

    /// Remove a table. Returns false if it was not present.
    pub fn drop(&mut self, name: &str) -> bool {
        match self.position_ci(name) {
            Some(idx) => {
                self.tables.remove(idx);
                true
            }
            None => false,
        }
    }

    fn position_ci(&self, name: &str) -> Option<usize> {
        self.tables
            .iter()
            .position(|t| t.name.eq_ignore_ascii_case(name))
    }
}
