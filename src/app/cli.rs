use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliVerb {
    Run,
    Status,
    Reset,
    Help,
    Unknown,
}

pub fn parse_cli_verb(input: &str) -> CliVerb {
    match input {
        "run" => CliVerb::Run,
        "status" => CliVerb::Status,
        "reset" => CliVerb::Reset,
        "help" | "--help" | "-h" => CliVerb::Help,
        _ => CliVerb::Unknown,
    }
}

/// Global options that may appear anywhere on the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliOptions {
    pub config_path: Option<PathBuf>,
}

/// Splits `--config <path>` (or `--config=<path>`) out of `args`.
pub fn extract_cli_options(args: &[String]) -> Result<(CliOptions, Vec<String>), String> {
    let mut options = CliOptions::default();
    let mut rest = Vec::new();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg == "--config" {
            let value = iter
                .next()
                .ok_or_else(|| "--config requires a path".to_string())?;
            options.config_path = Some(PathBuf::from(value));
        } else if let Some(value) = arg.strip_prefix("--config=") {
            if value.is_empty() {
                return Err("--config requires a path".to_string());
            }
            options.config_path = Some(PathBuf::from(value));
        } else {
            rest.push(arg.clone());
        }
    }
    Ok((options, rest))
}

pub fn cli_help_lines() -> Vec<String> {
    vec![
        "Usage: startup-wizard [--config <path>] <command>".to_string(),
        String::new(),
        "Commands:".to_string(),
        "  run                                  Fill in the startup form step by step".to_string(),
        "  status                               Show the saved draft, if any".to_string(),
        "  reset                                Discard the saved draft".to_string(),
        "  help                                 Show this help".to_string(),
    ]
}

pub fn help_text() -> String {
    cli_help_lines().join("\n")
}
