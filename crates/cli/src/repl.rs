// Interactive shell: multi-line SQL buffering, dot commands, history replay,
// result staging.
//
// Plain stdin line reading on purpose — completion and line editing are a
// different layer and do not affect session state.

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use sheetql_core::{AliasReport, ExportOutcome, LoadReport, ScriptReport, ScriptSpec, Session};
use sheetql_engine::Table;

use crate::command::MetaCommand;

const PROMPT_SQL: &str = "SQL> ";
const PROMPT_CONTINUE: &str = "  -> ";

/// Rows shown before a result is elided.
const PREVIEW_ROWS: usize = 15;

type Lines<'a> = io::Lines<io::StdinLock<'a>>;

pub fn run(session: &mut Session) {
    print_welcome();

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let mut buffer = String::new();

    loop {
        prompt(if buffer.is_empty() { PROMPT_SQL } else { PROMPT_CONTINUE });
        let line = match lines.next() {
            Some(Ok(line)) => line,
            // EOF or a read failure is an exit request
            Some(Err(_)) | None => break,
        };
        let trimmed = line.trim();

        if let Some(index) = trimmed.strip_prefix('!') {
            replay(session, index, &mut lines);
            buffer.clear();
            continue;
        }

        if trimmed.starts_with('.') {
            match MetaCommand::parse(trimmed) {
                Ok(cmd) => {
                    if dispatch(session, cmd, &mut lines) {
                        break;
                    }
                }
                Err(msg) => eprintln!("error: {}", msg),
            }
            buffer.clear();
            continue;
        }

        buffer.push_str(&line);
        buffer.push(' ');
        if buffer.trim_end().ends_with(';') {
            let sql = buffer.trim().to_string();
            execute_and_display(session, &sql, &mut lines);
            buffer.clear();
        }
    }

    println!("Goodbye.");
}

fn print_welcome() {
    println!("--- SheetQL ---");
    println!("Terminate SQL with ';'. Commands: .help, .tables, .load, .export, .exit");
}

fn prompt(text: &str) {
    print!("{}", text);
    let _ = io::stdout().flush();
}

fn read_line(lines: &mut Lines) -> Option<String> {
    lines.next().and_then(|r| r.ok())
}

/// Returns true when the session should end.
fn dispatch(session: &mut Session, cmd: MetaCommand, lines: &mut Lines) -> bool {
    match cmd {
        MetaCommand::Help => {
            println!("Commands:");
            println!("  .help, .tables, .schema <t>, .history, .load <f>..., .rename <o> <n>");
            println!("  .export [file]     Write staged results to XLSX");
            println!("  .dump [file]       Save this session as a TOML script");
            println!("  .runscript <file>  Run a TOML script");
            println!("  .exit, .quit       Leave (offers a final export)");
            println!("  !N                 Re-run history entry N");
        }
        MetaCommand::Tables => match session.engine().list_tables() {
            Ok(tables) => {
                println!("Tables ({}):", tables.len());
                for t in tables {
                    println!(" - {}", t);
                }
            }
            Err(err) => eprintln!("error: {}", err),
        },
        MetaCommand::Schema(table) => match session.engine().describe(&table) {
            Ok(schema) => {
                println!("Schema: {}", table);
                for (name, ty) in schema {
                    println!("  {:<24} {}", name, ty);
                }
            }
            Err(err) => eprintln!("error: {}", err),
        },
        MetaCommand::History => {
            for (i, q) in session.history.iter().enumerate() {
                println!("{}: {}", i + 1, q);
            }
        }
        MetaCommand::Load(paths) => {
            let paths: Vec<PathBuf> = paths.iter().map(|p| expand_path(p)).collect();
            let report = session.load_files(&paths);
            print_load_report(&report);
        }
        MetaCommand::Rename { old, new } => match session.rename_table(&old, &new) {
            Ok(()) => println!("renamed {} -> {}", old, new),
            Err(err) => eprintln!("error: {}", err),
        },
        MetaCommand::Export(path) => export(session, path.as_deref()),
        MetaCommand::Dump(path) => dump(session, &path),
        MetaCommand::RunScript(path) => run_script_file(session, &path),
        MetaCommand::Exit => {
            offer_final_export(session, lines);
            return true;
        }
    }
    false
}

fn expand_path(path: &Path) -> PathBuf {
    match path.to_str() {
        Some(s) => PathBuf::from(shellexpand::tilde(s).into_owned()),
        None => path.to_path_buf(),
    }
}

fn replay(session: &mut Session, index: &str, lines: &mut Lines) {
    let index: usize = match index.trim().parse() {
        Ok(i) => i,
        Err(_) => {
            eprintln!("error: usage: !N where N is a history index");
            return;
        }
    };
    match session.replay(index) {
        Ok((sql, result)) => {
            println!("{}", sql);
            display_result(session, &sql, result, lines);
        }
        Err(err) => eprintln!("error: {}", err),
    }
}

fn execute_and_display(session: &mut Session, sql: &str, lines: &mut Lines) {
    match session.run_query(sql) {
        Ok(result) => display_result(session, sql, result, lines),
        Err(err) => eprintln!("error: {}", err),
    }
}

fn display_result(session: &mut Session, sql: &str, result: Table, lines: &mut Lines) {
    if result.is_empty() {
        println!("No data returned.");
        return;
    }
    print_table(&result);
    prompt("Stage for export? (y/n): ");
    let answer = read_line(lines).unwrap_or_default();
    if !answer.trim().to_ascii_lowercase().starts_with('y') {
        return;
    }
    prompt("Sheet name: ");
    let name = read_line(lines).unwrap_or_default();
    let name = name.trim();
    if !name.is_empty() {
        session.stage_result(name, sql, result);
        println!("staged '{}'", name);
    }
}

fn export(session: &mut Session, path: Option<&Path>) {
    if session.stage.is_empty() {
        eprintln!("warning: nothing to export");
        return;
    }
    match session.export(path) {
        Ok((path, sheets)) => {
            println!("exported {} sheet(s) to {}", sheets, path.display());
        }
        Err(err) => eprintln!("error: {}", err),
    }
}

fn dump(session: &mut Session, path: &Path) {
    if session.recorder.is_empty() {
        eprintln!("warning: nothing recorded yet");
        return;
    }
    let script = session.recorder.to_script();
    let text = match toml::to_string_pretty(&script) {
        Ok(t) => t,
        Err(err) => {
            eprintln!("error: failed to serialize session: {}", err);
            return;
        }
    };
    match fs::write(path, text) {
        Ok(()) => println!("session dumped to {}", path.display()),
        Err(err) => eprintln!("error: failed to write '{}': {}", path.display(), err),
    }
}

fn run_script_file(session: &mut Session, path: &Path) {
    let spec = match parse_script(path) {
        Ok(spec) => spec,
        // A malformed script is fatal to the run: no phase executes
        Err(msg) => {
            eprintln!("error: {}", msg);
            return;
        }
    };
    let report = session.run_script(&spec);
    print_script_report(&report);
}

pub fn parse_script(path: &Path) -> Result<ScriptSpec, String> {
    let text = fs::read_to_string(path)
        .map_err(|e| format!("cannot read script '{}': {}", path.display(), e))?;
    toml::from_str(&text).map_err(|e| format!("invalid script '{}': {}", path.display(), e))
}

fn offer_final_export(session: &mut Session, lines: &mut Lines) {
    if session.stage.is_empty() {
        return;
    }
    prompt("Export staged results? (y/n): ");
    let answer = read_line(lines).unwrap_or_default();
    if answer.trim().to_ascii_lowercase().starts_with('y') {
        export(session, None);
    }
}

// ============================================================================
// Report printing
// ============================================================================

pub fn print_load_report(report: &LoadReport) {
    for warning in &report.warnings {
        eprintln!("warning: {}", warning);
    }
    println!("loaded {} table(s)", report.created.len());
    for (_, table) in &report.created {
        println!(" - {}", table);
    }
}

pub fn print_alias_report(report: &AliasReport) {
    for (old, new) in &report.renamed {
        println!("aliased {} -> {}", old, new);
    }
    for failure in &report.failures {
        eprintln!("warning: {}", failure);
    }
}

pub fn print_script_report(report: &ScriptReport) {
    if let Some(load) = &report.load {
        print_load_report(load);
    }
    if let Some(aliases) = &report.aliases {
        print_alias_report(aliases);
    }
    for name in &report.tasks_completed {
        println!("task '{}' complete", name);
    }
    for (name, reason) in &report.task_failures {
        eprintln!("error: task '{}' failed: {}", name, reason);
    }
    match &report.export {
        ExportOutcome::NotRequested => {}
        ExportOutcome::NothingStaged => eprintln!("warning: nothing to export"),
        ExportOutcome::Written { path, sheets } => {
            println!("exported {} sheet(s) to {}", sheets, path.display());
        }
        ExportOutcome::Failed { path, reason } => {
            eprintln!("error: export to '{}' failed: {}", path.display(), reason);
        }
    }
}

/// Fixed-width preview of a result table: header, separator, first rows.
pub fn print_table(table: &Table) {
    let mut widths: Vec<usize> = table.columns.iter().map(|c| c.len()).collect();
    let preview = table.rows.iter().take(PREVIEW_ROWS);
    for row in preview.clone() {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.to_string().len());
        }
    }

    let header: Vec<String> = table
        .columns
        .iter()
        .enumerate()
        .map(|(i, c)| format!("{:<w$}", c, w = widths[i]))
        .collect();
    println!("{}", header.join("  "));
    println!("{}", "-".repeat(widths.iter().sum::<usize>() + 2 * (widths.len().saturating_sub(1))));

    for row in preview {
        let cells: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(i, v)| format!("{:<w$}", v.to_string(), w = widths[i]))
            .collect();
        println!("{}", cells.join("  "));
    }

    if table.rows.len() > PREVIEW_ROWS {
        println!("... ({} more rows)", table.rows.len() - PREVIEW_ROWS);
    }
}
