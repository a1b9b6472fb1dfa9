use crate::storage::KeyValueStore;
use crate::submit::SubmitTransport;
use crate::wizard::{FormInputs, WizardController, WizardError};
use std::io::{BufRead, Write};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Set { field: String, value: String },
    Clear { field: String },
    Next,
    Back,
    Goto(usize),
    Show,
    Submit,
    Help,
    Quit,
}

pub fn parse_session_command(line: &str) -> Result<Option<SessionCommand>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };
    let command = match verb {
        "set" => {
            let (field, value) = match rest.split_once(char::is_whitespace) {
                Some((field, value)) => (field, value.trim()),
                None => (rest, ""),
            };
            if field.is_empty() {
                return Err("usage: set <field> <value>".to_string());
            }
            SessionCommand::Set {
                field: field.to_string(),
                value: value.to_string(),
            }
        }
        "clear" => {
            if rest.is_empty() {
                return Err("usage: clear <field>".to_string());
            }
            SessionCommand::Clear {
                field: rest.to_string(),
            }
        }
        "next" | "n" => SessionCommand::Next,
        "back" | "b" => SessionCommand::Back,
        "goto" => {
            let step = rest
                .parse::<usize>()
                .map_err(|_| "usage: goto <step number>".to_string())?;
            SessionCommand::Goto(step)
        }
        "show" | "s" => SessionCommand::Show,
        "submit" => SessionCommand::Submit,
        "help" | "?" => SessionCommand::Help,
        "quit" | "exit" | "q" => SessionCommand::Quit,
        other => return Err(format!("unknown command `{other}` (try `help`)")),
    };
    Ok(Some(command))
}

pub fn session_help_text() -> &'static str {
    "set <field> <value>   fill in a field\n\
     clear <field>         empty a field\n\
     next                  validate this step and continue\n\
     back                  return to the previous step\n\
     goto <n>              jump to a completed step\n\
     show                  print the current step\n\
     submit                send the form\n\
     quit                  leave (the draft stays saved)"
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionReport {
    pub submitted: bool,
    pub redirect: Option<String>,
    pub final_step: usize,
}

fn io_err(err: std::io::Error) -> String {
    format!("failed to write session output: {err}")
}

/// Text view of the current step: fields, values, messages and progress.
pub fn render_step<S, I>(controller: &WizardController<S, I>) -> String
where
    S: KeyValueStore,
    I: FormInputs,
{
    let mut lines = Vec::new();
    let current = controller.current_step();
    match controller.current_step_definition() {
        Some(step) => {
            let mut heading = format!(
                "Step {current} of {}: {}",
                controller.total_steps(),
                step.title
            );
            if !step.subtitle.is_empty() {
                heading.push_str(&format!(" ({})", step.subtitle));
            }
            lines.push(heading);
            if step.fields.is_empty() {
                for (name, value) in controller.fields() {
                    lines.push(format!("  {name} = {value}"));
                }
            }
            for field in &step.fields {
                let marker = if step.required.contains(field) { "*" } else { " " };
                let value = controller
                    .inputs()
                    .value(field)
                    .filter(|value| !value.is_empty())
                    .unwrap_or_else(|| "<empty>".to_string());
                let mut line = format!("  {marker} {field} = {value}");
                if let Some(message) = controller.errors().get(field) {
                    line.push_str(&format!("   ! {message}"));
                }
                lines.push(line);
            }
        }
        None => lines.push(format!("Step {current} of {}", controller.total_steps())),
    }
    let statuses = (1..=controller.total_steps())
        .map(|step| format!("{step}:{}", controller.step_status(step)))
        .collect::<Vec<_>>()
        .join(" ");
    lines.push(format!(
        "progress: step {}% | required {}% | position {}%",
        controller.step_progress(),
        controller.overall_progress(),
        controller.position_progress()
    ));
    lines.push(format!("steps: {statuses}"));
    lines.join("\n")
}

/// Drives a controller from line commands until quit, submission or EOF.
/// Every command is followed by an autosave tick.
pub fn run_session<S, I, R, W>(
    controller: &mut WizardController<S, I>,
    transport: &dyn SubmitTransport,
    reader: R,
    writer: &mut W,
) -> Result<SessionReport, String>
where
    S: KeyValueStore,
    I: FormInputs,
    R: BufRead,
    W: Write,
{
    let mut report = SessionReport {
        submitted: false,
        redirect: None,
        final_step: controller.current_step(),
    };
    writeln!(writer, "{}", render_step(controller)).map_err(io_err)?;

    for line in reader.lines() {
        let line = line.map_err(|e| format!("failed to read session input: {e}"))?;
        let command = match parse_session_command(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(err) => {
                writeln!(writer, "{err}").map_err(io_err)?;
                continue;
            }
        };

        let mut finished = false;
        match command {
            SessionCommand::Set { field, value } => match controller.input(&field, &value) {
                Some(message) => writeln!(writer, "{field}: {message}").map_err(io_err)?,
                None => writeln!(writer, "{field}: ok").map_err(io_err)?,
            },
            SessionCommand::Clear { field } => {
                controller.inputs_mut().set_value(&field, "");
                if let Some(message) = controller.validate_field(&field) {
                    writeln!(writer, "{field}: {message}").map_err(io_err)?;
                }
            }
            SessionCommand::Next => {
                let before = controller.current_step();
                if !controller.advance() {
                    writeln!(writer, "Please complete all required fields").map_err(io_err)?;
                } else if controller.current_step() == before {
                    writeln!(writer, "Already on the last step; use `submit`").map_err(io_err)?;
                }
                writeln!(writer, "{}", render_step(controller)).map_err(io_err)?;
            }
            SessionCommand::Back => {
                if !controller.retreat() {
                    writeln!(writer, "Already on the first step").map_err(io_err)?;
                }
                writeln!(writer, "{}", render_step(controller)).map_err(io_err)?;
            }
            SessionCommand::Goto(step) => {
                if !controller.jump_to(step) {
                    writeln!(
                        writer,
                        "Step {step} is not reachable yet (furthest: {})",
                        controller.max_accessible_step()
                    )
                    .map_err(io_err)?;
                }
                writeln!(writer, "{}", render_step(controller)).map_err(io_err)?;
            }
            SessionCommand::Show => {
                writeln!(writer, "{}", render_step(controller)).map_err(io_err)?;
            }
            SessionCommand::Help => {
                writeln!(writer, "{}", session_help_text()).map_err(io_err)?;
            }
            SessionCommand::Submit => match controller.submit(transport) {
                Ok(outcome) => {
                    writeln!(writer, "Startup created successfully").map_err(io_err)?;
                    if let Some(redirect) = &outcome.redirect {
                        writeln!(writer, "next: {redirect}").map_err(io_err)?;
                    }
                    report.submitted = true;
                    report.redirect = outcome.redirect;
                    finished = true;
                }
                Err(err @ WizardError::Validation { .. }) => {
                    writeln!(writer, "{err}").map_err(io_err)?;
                }
                Err(err) if err.is_retryable() => {
                    writeln!(
                        writer,
                        "Could not create the startup, please try again: {err}"
                    )
                    .map_err(io_err)?;
                }
                Err(err) => writeln!(writer, "{err}").map_err(io_err)?,
            },
            SessionCommand::Quit => finished = true,
        }

        controller.tick();
        if finished {
            break;
        }
    }

    report.final_step = controller.current_step();
    Ok(report)
}
