use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use sheetql_core::Session;

mod command;
mod repl;

const EXIT_ERROR: u8 = 1;
const EXIT_SCRIPT: u8 = 3;

/// Load tabular files into a SQL session and export results to XLSX.
#[derive(Parser)]
#[command(name = "sheetql", version, about)]
struct Cli {
    /// Data files to load at startup (CSV, Excel, JSON, Parquet)
    files: Vec<PathBuf>,

    /// Run a TOML script and exit instead of starting the shell
    #[arg(long, short = 'r', value_name = "SCRIPT")]
    run: Option<PathBuf>,
}

struct CliError {
    code: u8,
    message: String,
    hint: Option<String>,
}

impl CliError {
    fn script(message: impl Into<String>) -> Self {
        CliError { code: EXIT_SCRIPT, message: message.into(), hint: None }
    }

    fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err.message);
            if let Some(hint) = &err.hint {
                eprintln!("hint: {}", hint);
            }
            ExitCode::from(err.code)
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let mut session = Session::new().map_err(|e| CliError {
        code: EXIT_ERROR,
        message: format!("cannot open session: {}", e),
        hint: None,
    })?;

    if let Some(script) = cli.run {
        return run_batch(&mut session, &script);
    }

    if !cli.files.is_empty() {
        let report = session.load_files(&cli.files);
        repl::print_load_report(&report);
    }

    repl::run(&mut session);
    Ok(())
}

/// Batch mode: a script that fails to parse is fatal, but individual load,
/// task, and export failures are reported to stderr and still exit 0 so a
/// partially useful run keeps its output.
fn run_batch(session: &mut Session, script: &std::path::Path) -> Result<(), CliError> {
    let spec = repl::parse_script(script)
        .map_err(|msg| CliError::script(msg).with_hint("scripts are TOML; see '.dump' output"))?;
    let report = session.run_script(&spec);
    repl::print_script_report(&report);
    Ok(())
}
