use crate::app::session::run_session;
use crate::config::Settings;
use crate::shared::logging::WizardLog;
use crate::storage::{FileStore, KeyValueStore};
use crate::submit::HttpTransport;
use crate::wizard::{InMemoryForm, WizardController, SNAPSHOT_KEY};
use std::io::Write;

pub type TerminalWizard = WizardController<FileStore, InMemoryForm>;

pub fn build_controller(settings: &Settings) -> Result<TerminalWizard, String> {
    let paths = settings.resolve_paths().map_err(|e| e.to_string())?;
    let controller = WizardController::new(
        settings.definition(),
        FileStore::new(paths.store_path()),
        InMemoryForm::new(),
    )
    .map_err(|e| e.to_string())?
    .with_log(WizardLog::new(paths.log_path()))
    .with_autosave_interval(settings.autosave_interval())
    .with_snapshot_max_age(settings.snapshot_max_age());
    Ok(controller)
}

pub fn build_transport(settings: &Settings) -> HttpTransport {
    HttpTransport::new(settings.resolved_submit_url(), settings.csrf_token.clone())
        .with_timeout(settings.submit_timeout())
}

fn format_saved_at(timestamp: Option<i64>) -> String {
    timestamp
        .and_then(chrono::DateTime::<chrono::Utc>::from_timestamp_millis)
        .map(|at| at.to_rfc3339())
        .unwrap_or_else(|| "unknown".to_string())
}

pub fn cmd_status(settings: &Settings) -> Result<String, String> {
    let mut controller = build_controller(settings)?;
    if !controller.restore() {
        return Ok("no saved wizard draft".to_string());
    }
    let state = controller.state();
    Ok(format!(
        "draft step={} of {}\nfields={}\nerrors={}\nsaved_at={}",
        state.current_step,
        state.total_steps,
        state.fields.len(),
        state.errors.len(),
        format_saved_at(state.timestamp)
    ))
}

pub fn cmd_reset(settings: &Settings) -> Result<String, String> {
    let paths = settings.resolve_paths().map_err(|e| e.to_string())?;
    let mut store = FileStore::new(paths.store_path());
    store.remove(SNAPSHOT_KEY).map_err(|e| e.to_string())?;
    Ok("cleared saved wizard draft".to_string())
}

pub fn cmd_run(settings: &Settings) -> Result<String, String> {
    let mut controller = build_controller(settings)?;
    let transport = build_transport(settings);
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    if controller.restore() {
        writeln!(out, "resumed saved draft").map_err(|e| e.to_string())?;
    }
    let stdin = std::io::stdin();
    let report = run_session(&mut controller, &transport, stdin.lock(), &mut out)?;
    controller.teardown();
    if report.submitted {
        Ok("submitted".to_string())
    } else {
        Ok(format!(
            "draft saved at step {} of {}",
            report.final_step,
            controller.total_steps()
        ))
    }
}
