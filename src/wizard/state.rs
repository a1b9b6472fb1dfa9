use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Storage key holding the serialized snapshot.
pub const SNAPSHOT_KEY: &str = "startupWizardData";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WizardState {
    pub current_step: usize,
    pub total_steps: usize,
    pub fields: BTreeMap<String, String>,
    pub errors: BTreeMap<String, String>,
    /// Milliseconds since the Unix epoch of the last successful save.
    pub timestamp: Option<i64>,
}

impl WizardState {
    pub fn new(total_steps: usize) -> Self {
        Self {
            current_step: 1,
            total_steps: total_steps.max(1),
            fields: BTreeMap::new(),
            errors: BTreeMap::new(),
            timestamp: None,
        }
    }
}

fn first_step() -> usize {
    1
}

/// Persisted form of [`WizardState`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default = "first_step")]
    pub current_step: usize,
    #[serde(default)]
    pub form: BTreeMap<String, String>,
    #[serde(default)]
    pub errors: BTreeMap<String, String>,
    pub timestamp: i64,
}

impl Snapshot {
    pub fn capture(state: &WizardState, timestamp: i64) -> Self {
        Self {
            current_step: state.current_step,
            form: state.fields.clone(),
            errors: state.errors.clone(),
            timestamp,
        }
    }

    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn decode(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    pub fn age_millis(&self, now: i64) -> i64 {
        now.saturating_sub(self.timestamp)
    }

    pub fn into_state(self, total_steps: usize) -> WizardState {
        let mut state = WizardState::new(total_steps);
        state.current_step = self.current_step.clamp(1, state.total_steps);
        state.fields = self.form;
        state.errors = self.errors;
        state.timestamp = Some(self.timestamp);
        state
    }
}
