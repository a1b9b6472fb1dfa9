use super::autosave::{AutosaveSchedule, DEFAULT_AUTOSAVE_INTERVAL};
use super::definition::{StepDefinition, WizardDefinition};
use super::error::WizardError;
use super::inputs::FormInputs;
use super::state::{Snapshot, WizardState, SNAPSHOT_KEY};
use crate::shared::clock::{Clock, SystemClock};
use crate::shared::logging::WizardLog;
use crate::storage::KeyValueStore;
use crate::submit::{
    SubmissionPayload, SubmitTransport, TransportError, TransportResponse,
};
use crate::validation::{RequiredRule, ValidationRule};
use std::collections::BTreeMap;
use std::time::Duration;

pub const DEFAULT_SNAPSHOT_MAX_AGE: Duration = Duration::from_secs(24 * 60 * 60);
pub const MAX_UPLOAD_BYTES: u64 = 2 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitOutcome {
    pub redirect: Option<String>,
}

/// One wizard instance: owns its state for the lifetime of a form.
pub struct WizardController<S, I> {
    definition: WizardDefinition,
    rules: BTreeMap<String, Box<dyn ValidationRule>>,
    state: WizardState,
    store: S,
    inputs: I,
    clock: Box<dyn Clock>,
    log: Option<WizardLog>,
    autosave: AutosaveSchedule,
    snapshot_max_age_ms: i64,
    submitting: bool,
}

impl<S, I> WizardController<S, I>
where
    S: KeyValueStore,
    I: FormInputs,
{
    pub fn new(definition: WizardDefinition, store: S, inputs: I) -> Result<Self, WizardError> {
        definition.validate().map_err(WizardError::Definition)?;
        let rules = definition
            .rules
            .iter()
            .map(|(field, config)| (field.clone(), config.build()))
            .collect();
        let clock: Box<dyn Clock> = Box::new(SystemClock);
        let autosave = AutosaveSchedule::new(DEFAULT_AUTOSAVE_INTERVAL, clock.now_millis());
        Ok(Self {
            state: WizardState::new(definition.total_steps()),
            definition,
            rules,
            store,
            inputs,
            clock,
            log: None,
            autosave,
            snapshot_max_age_ms: DEFAULT_SNAPSHOT_MAX_AGE.as_millis() as i64,
            submitting: false,
        })
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self.autosave = AutosaveSchedule::new(self.autosave.interval(), self.clock.now_millis());
        self
    }

    pub fn with_log(mut self, log: WizardLog) -> Self {
        self.log = Some(log);
        self
    }

    pub fn with_autosave_interval(mut self, interval: Duration) -> Self {
        self.autosave = AutosaveSchedule::new(interval, self.clock.now_millis());
        self
    }

    pub fn with_snapshot_max_age(mut self, max_age: Duration) -> Self {
        self.snapshot_max_age_ms = i64::try_from(max_age.as_millis()).unwrap_or(i64::MAX);
        self
    }

    /// Replaces or adds the rule for one field.
    pub fn with_rule(mut self, field: &str, rule: impl ValidationRule + 'static) -> Self {
        self.rules.insert(field.to_string(), Box::new(rule));
        self
    }

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    pub fn definition(&self) -> &WizardDefinition {
        &self.definition
    }

    pub fn current_step(&self) -> usize {
        self.state.current_step
    }

    pub fn total_steps(&self) -> usize {
        self.state.total_steps
    }

    pub fn current_step_definition(&self) -> Option<&StepDefinition> {
        self.definition.step(self.state.current_step)
    }

    pub fn errors(&self) -> &BTreeMap<String, String> {
        &self.state.errors
    }

    pub fn fields(&self) -> &BTreeMap<String, String> {
        &self.state.fields
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn inputs(&self) -> &I {
        &self.inputs
    }

    pub fn inputs_mut(&mut self) -> &mut I {
        &mut self.inputs
    }

    pub fn into_parts(self) -> (S, I) {
        (self.store, self.inputs)
    }

    fn log(&self, level: &str, event: &str, message: &str) {
        if let Some(log) = &self.log {
            log.append(level, event, message);
        }
    }

    fn input_value(&self, name: &str) -> String {
        self.inputs.value(name).unwrap_or_default()
    }

    /// Required-ness first, then the field's own rule on non-empty values.
    fn check_value(&self, name: &str, value: &str) -> Option<String> {
        if value.is_empty() {
            if self.definition.is_required(name) {
                return RequiredRule.validate(name, value);
            }
            return None;
        }
        self.rules
            .get(name)
            .and_then(|rule| rule.validate(name, value))
    }

    fn step_fields(&self, step: usize) -> Vec<String> {
        self.definition
            .step(step)
            .map(|definition| definition.fields.clone())
            .unwrap_or_default()
    }

    /// Validates one field against its current input value and records the
    /// outcome in the error map and on the form.
    pub fn validate_field(&mut self, name: &str) -> Option<String> {
        let value = self.input_value(name);
        let outcome = self.check_value(name, &value);
        match &outcome {
            Some(message) => {
                self.state
                    .errors
                    .insert(name.to_string(), message.clone());
            }
            None => {
                self.state.errors.remove(name);
            }
        }
        self.inputs.show_error(name, outcome.as_deref());
        outcome
    }

    /// Input event: store the new value and validate it immediately.
    pub fn input(&mut self, name: &str, value: &str) -> Option<String> {
        self.inputs.set_value(name, value);
        self.validate_field(name)
    }

    pub fn validate_current_step(&mut self) -> bool {
        let mut valid = true;
        for field in self.step_fields(self.state.current_step) {
            if self.validate_field(&field).is_some() {
                valid = false;
            }
        }
        valid
    }

    /// Pure check: every field of `step` currently passes.
    pub fn is_step_valid(&self, step: usize) -> bool {
        let Some(definition) = self.definition.step(step) else {
            return false;
        };
        definition
            .fields
            .iter()
            .all(|field| self.check_value(field, &self.input_value(field)).is_none())
    }

    /// Highest step reachable through consecutive valid steps.
    pub fn max_accessible_step(&self) -> usize {
        let mut max_step = 1;
        for step in 1..self.state.total_steps {
            if !self.is_step_valid(step) {
                break;
            }
            max_step = step + 1;
        }
        max_step.min(self.state.total_steps)
    }

    fn capture_inputs(&mut self) {
        let values = self.inputs.values();
        self.state.fields.extend(values);
    }

    pub fn advance(&mut self) -> bool {
        if !self.validate_current_step() {
            let failing: Vec<&str> = self.current_step_errors();
            self.log(
                "warn",
                "wizard.validation_failed",
                &format!(
                    "Please complete all required fields: {}",
                    failing.join(", ")
                ),
            );
            return false;
        }
        self.capture_inputs();
        if let Err(err) = self.persist() {
            self.log("error", "wizard.persist_failed", &err.to_string());
        }
        if self.state.current_step < self.state.total_steps {
            self.state.current_step += 1;
            self.log(
                "info",
                "wizard.advance",
                &format!(
                    "step {} of {}",
                    self.state.current_step, self.state.total_steps
                ),
            );
        }
        true
    }

    pub fn retreat(&mut self) -> bool {
        if self.state.current_step > 1 {
            self.state.current_step -= 1;
            return true;
        }
        false
    }

    pub fn jump_to(&mut self, step: usize) -> bool {
        if step < 1 || step > self.max_accessible_step() {
            return false;
        }
        self.state.current_step = step;
        true
    }

    fn current_step_errors(&self) -> Vec<&str> {
        self.definition
            .step(self.state.current_step)
            .map(|step| {
                step.fields
                    .iter()
                    .filter(|field| self.state.errors.contains_key(field.as_str()))
                    .map(String::as_str)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn persist(&mut self) -> Result<(), WizardError> {
        let now = self.clock.now_millis();
        let raw = Snapshot::capture(&self.state, now)
            .encode()
            .map_err(WizardError::Encode)?;
        self.store.set(SNAPSHOT_KEY, &raw)?;
        self.state.timestamp = Some(now);
        self.autosave.record(now);
        self.log(
            "info",
            "wizard.persist",
            &format!(
                "saved step {} with {} fields",
                self.state.current_step,
                self.state.fields.len()
            ),
        );
        Ok(())
    }

    /// Loads a fresh snapshot if one exists. Returns whether state changed.
    pub fn restore(&mut self) -> bool {
        let raw = match self.store.get(SNAPSHOT_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return false,
            Err(err) => {
                self.log("warn", "wizard.restore_discarded", &err.to_string());
                return false;
            }
        };
        let snapshot = match Snapshot::decode(&raw) {
            Ok(snapshot) => snapshot,
            Err(err) => {
                self.log(
                    "warn",
                    "wizard.restore_discarded",
                    &format!("malformed snapshot: {err}"),
                );
                return false;
            }
        };
        let now = self.clock.now_millis();
        let age = snapshot.age_millis(now);
        if age >= self.snapshot_max_age_ms {
            self.log(
                "info",
                "wizard.restore_discarded",
                &format!("snapshot is {}s old", age / 1000),
            );
            return false;
        }

        self.state = snapshot.into_state(self.definition.total_steps());
        for (name, value) in &self.state.fields {
            if !value.is_empty() {
                self.inputs.set_value(name, value);
            }
        }
        for (name, message) in &self.state.errors {
            self.inputs.show_error(name, Some(message));
        }
        self.log(
            "info",
            "wizard.restore",
            &format!(
                "restored step {} with {} fields",
                self.state.current_step,
                self.state.fields.len()
            ),
        );
        true
    }

    /// First half of a submission: validates the current step, saves the draft
    /// and hands back the payload to post. Until [`finish_submit`] runs the
    /// controller reports `is_submitting()` and refuses another submission, while
    /// input, navigation and autosave keep working. A host posts the payload on
    /// another thread and feeds the transport result back.
    ///
    /// [`finish_submit`]: Self::finish_submit
    pub fn begin_submit(&mut self) -> Result<SubmissionPayload, WizardError> {
        if self.submitting {
            return Err(WizardError::SubmitInProgress);
        }
        if !self.validate_current_step() {
            let fields = self
                .current_step_errors()
                .into_iter()
                .map(str::to_string)
                .collect();
            return Err(WizardError::Validation { fields });
        }

        self.capture_inputs();
        if let Err(err) = self.persist() {
            self.log("error", "wizard.persist_failed", &err.to_string());
        }
        self.submitting = true;
        Ok(SubmissionPayload::new(self.state.fields.clone()))
    }

    /// Second half of a submission: applies the transport outcome.
    pub fn finish_submit(
        &mut self,
        result: Result<TransportResponse, TransportError>,
    ) -> Result<SubmitOutcome, WizardError> {
        self.submitting = false;
        match result {
            Ok(response) if response.is_success() => {
                self.autosave.stop();
                if let Err(err) = self.store.remove(SNAPSHOT_KEY) {
                    self.log("error", "wizard.persist_failed", &err.to_string());
                }
                self.log(
                    "info",
                    "wizard.submit",
                    &format!("submitted {} fields", self.state.fields.len()),
                );
                Ok(SubmitOutcome {
                    redirect: response.redirect,
                })
            }
            Ok(response) => {
                self.log(
                    "warn",
                    "wizard.submit_failed",
                    &format!("server responded with status {}", response.status),
                );
                Err(WizardError::Server {
                    status: response.status,
                })
            }
            Err(err) => {
                self.log("warn", "wizard.submit_failed", &err.to_string());
                Err(WizardError::Transport(err.to_string()))
            }
        }
    }

    /// Posts through `transport` on the calling thread.
    pub fn submit(
        &mut self,
        transport: &dyn SubmitTransport,
    ) -> Result<SubmitOutcome, WizardError> {
        let payload = self.begin_submit()?;
        let result = transport.post(&payload);
        self.finish_submit(result)
    }

    /// Timer tick: saves when the autosave interval has elapsed.
    pub fn tick(&mut self) -> bool {
        let now = self.clock.now_millis();
        if !self.autosave.is_due(now) {
            return false;
        }
        match self.persist() {
            Ok(()) => {
                self.log("info", "wizard.autosave", "autosaved wizard state");
                true
            }
            Err(err) => {
                self.autosave.record(now);
                self.log("error", "wizard.persist_failed", &err.to_string());
                false
            }
        }
    }

    /// Stops autosaving for good; call when the form goes away.
    pub fn teardown(&mut self) {
        self.autosave.stop();
    }

    /// Checks a file picked for an upload field.
    pub fn check_upload(
        &mut self,
        field: &str,
        file_name: &str,
        content_type: &str,
        size_bytes: u64,
    ) -> bool {
        let problem = if !content_type.starts_with("image/") {
            Some("Please select a valid image".to_string())
        } else if size_bytes > MAX_UPLOAD_BYTES {
            Some("The image must be smaller than 2MB".to_string())
        } else {
            None
        };
        self.inputs.show_error(field, problem.as_deref());
        match problem {
            Some(message) => {
                self.state.errors.insert(field.to_string(), message);
                false
            }
            None => {
                self.state.errors.remove(field);
                self.inputs.set_value(field, file_name);
                self.state
                    .fields
                    .insert(field.to_string(), file_name.to_string());
                true
            }
        }
    }
}
