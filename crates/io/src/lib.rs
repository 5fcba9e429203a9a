// File I/O: format readers and the XLSX result writer
//
// Every reader returns `sheetql_engine::Table` (or a list of named tables
// for multi-sheet sources). Naming policy — table names, sanitized headers —
// lives in the session core, not here.

pub mod csv;
pub mod json;
pub mod parquet;
pub mod xlsx;
