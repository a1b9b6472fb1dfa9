use crate::app::cli::{extract_cli_options, help_text, parse_cli_verb, CliVerb};
use crate::config::load_settings;

pub mod wizard;

pub fn run_cli(args: Vec<String>) -> Result<String, String> {
    let (options, args) = extract_cli_options(&args)?;
    if args.is_empty() {
        return Ok(help_text());
    }

    let verb = parse_cli_verb(args[0].as_str());
    if matches!(verb, CliVerb::Help) {
        return Ok(help_text());
    }
    if matches!(verb, CliVerb::Unknown) {
        return Err(format!("unknown command `{}`", args[0]));
    }

    let settings = load_settings(options.config_path.as_deref()).map_err(|e| e.to_string())?;
    match verb {
        CliVerb::Run => wizard::cmd_run(&settings),
        CliVerb::Status => wizard::cmd_status(&settings),
        CliVerb::Reset => wizard::cmd_reset(&settings),
        CliVerb::Help | CliVerb::Unknown => Ok(help_text()),
    }
}
