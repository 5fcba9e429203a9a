// Dot-command parsing for the interactive shell.
//
// Commands are parsed into a closed enum and arity-checked before dispatch;
// unknown tokens and bad arities report an error instead of silently doing
// nothing.

use std::path::PathBuf;

/// Default target for `.dump` when no file is given.
pub const DEFAULT_DUMP_FILE: &str = "script.toml";

#[derive(Debug, Clone, PartialEq)]
pub enum MetaCommand {
    Help,
    Tables,
    Schema(String),
    History,
    Load(Vec<PathBuf>),
    Rename { old: String, new: String },
    Export(Option<PathBuf>),
    Dump(PathBuf),
    RunScript(PathBuf),
    Exit,
}

impl MetaCommand {
    /// Parse a `.command` line. The command token is case-insensitive;
    /// arguments keep their case.
    pub fn parse(line: &str) -> Result<MetaCommand, String> {
        let mut parts = line.split_whitespace();
        let cmd = parts.next().unwrap_or_default().to_ascii_lowercase();
        let args: Vec<&str> = parts.collect();

        match cmd.as_str() {
            ".help" => no_args(MetaCommand::Help, &cmd, &args),
            ".tables" => no_args(MetaCommand::Tables, &cmd, &args),
            ".history" => no_args(MetaCommand::History, &cmd, &args),
            ".exit" | ".quit" => no_args(MetaCommand::Exit, &cmd, &args),
            ".schema" => match args.as_slice() {
                [table] => Ok(MetaCommand::Schema(table.to_string())),
                _ => Err("usage: .schema <table>".to_string()),
            },
            ".rename" => match args.as_slice() {
                [old, new] => Ok(MetaCommand::Rename {
                    old: old.to_string(),
                    new: new.to_string(),
                }),
                _ => Err("usage: .rename <old> <new>".to_string()),
            },
            ".load" => {
                if args.is_empty() {
                    Err("usage: .load <file>...".to_string())
                } else {
                    Ok(MetaCommand::Load(
                        args.iter().map(PathBuf::from).collect(),
                    ))
                }
            }
            ".export" => match args.as_slice() {
                [] => Ok(MetaCommand::Export(None)),
                [path] => Ok(MetaCommand::Export(Some(PathBuf::from(path)))),
                _ => Err("usage: .export [file]".to_string()),
            },
            ".dump" => match args.as_slice() {
                [] => Ok(MetaCommand::Dump(PathBuf::from(DEFAULT_DUMP_FILE))),
                [path] => Ok(MetaCommand::Dump(PathBuf::from(path))),
                _ => Err("usage: .dump [file]".to_string()),
            },
            ".runscript" => match args.as_slice() {
                [path] => Ok(MetaCommand::RunScript(PathBuf::from(path))),
                _ => Err("usage: .runscript <file>".to_string()),
            },
            other => Err(format!("unknown command: {}", other)),
        }
    }
}

fn no_args(cmd: MetaCommand, token: &str, args: &[&str]) -> Result<MetaCommand, String> {
    if args.is_empty() {
        Ok(cmd)
    } else {
        Err(format!("{} takes no arguments", token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_no_arg_commands() {
        assert_eq!(MetaCommand::parse(".help").unwrap(), MetaCommand::Help);
        assert_eq!(MetaCommand::parse(".tables").unwrap(), MetaCommand::Tables);
        assert_eq!(MetaCommand::parse(".exit").unwrap(), MetaCommand::Exit);
        assert_eq!(MetaCommand::parse(".quit").unwrap(), MetaCommand::Exit);
        assert_eq!(MetaCommand::parse(".HELP").unwrap(), MetaCommand::Help);
    }

    #[test]
    fn test_parse_rename() {
        assert_eq!(
            MetaCommand::parse(".rename old_name new_name").unwrap(),
            MetaCommand::Rename {
                old: "old_name".to_string(),
                new: "new_name".to_string()
            }
        );
        assert!(MetaCommand::parse(".rename only_one").is_err());
    }

    #[test]
    fn test_parse_dump_default_file() {
        assert_eq!(
            MetaCommand::parse(".dump").unwrap(),
            MetaCommand::Dump(PathBuf::from(DEFAULT_DUMP_FILE))
        );
        assert_eq!(
            MetaCommand::parse(".dump my.toml").unwrap(),
            MetaCommand::Dump(PathBuf::from("my.toml"))
        );
    }

    #[test]
    fn test_unknown_command_is_an_error() {
        let err = MetaCommand::parse(".frobnicate").unwrap_err();
        assert!(err.contains("unknown command"));
    }

    #[test]
    fn test_arity_is_validated_before_dispatch() {
        assert!(MetaCommand::parse(".tables extra").is_err());
        assert!(MetaCommand::parse(".schema").is_err());
        assert!(MetaCommand::parse(".runscript").is_err());
        assert!(MetaCommand::parse(".load").is_err());
    }

    #[test]
    fn test_load_takes_multiple_paths() {
        assert_eq!(
            MetaCommand::parse(".load a.csv b.xlsx").unwrap(),
            MetaCommand::Load(vec![PathBuf::from("a.csv"), PathBuf::from("b.xlsx")])
        );
    }
}
