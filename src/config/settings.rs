use super::{default_state_root, ConfigError, WizardPaths};
use crate::validation::{default_rule_configs, RuleConfig};
use crate::wizard::{StepDefinition, WizardDefinition};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const SUBMIT_URL_ENV: &str = "STARTUP_WIZARD_SUBMIT_URL";
pub const DEFAULT_SUBMIT_URL: &str = "http://127.0.0.1:8000/startups/create/";

fn default_submit_url() -> String {
    DEFAULT_SUBMIT_URL.to_string()
}

fn default_autosave_interval_secs() -> u64 {
    30
}

fn default_snapshot_max_age_hours() -> u64 {
    24
}

fn default_submit_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_root: Option<PathBuf>,
    #[serde(default = "default_submit_url")]
    pub submit_url: String,
    #[serde(default)]
    pub csrf_token: String,
    #[serde(default = "default_autosave_interval_secs")]
    pub autosave_interval_secs: u64,
    #[serde(default = "default_snapshot_max_age_hours")]
    pub snapshot_max_age_hours: u64,
    #[serde(default = "default_submit_timeout_secs")]
    pub submit_timeout_secs: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steps: Option<Vec<StepDefinition>>,
    /// Per-field overrides layered over the built-in rules.
    #[serde(default)]
    pub rules: BTreeMap<String, RuleConfig>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            state_root: None,
            submit_url: default_submit_url(),
            csrf_token: String::new(),
            autosave_interval_secs: default_autosave_interval_secs(),
            snapshot_max_age_hours: default_snapshot_max_age_hours(),
            submit_timeout_secs: default_submit_timeout_secs(),
            steps: None,
            rules: BTreeMap::new(),
        }
    }
}

impl Settings {
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.submit_url.trim().is_empty() {
            return Err(ConfigError::Settings(
                "submit_url must be non-empty".to_string(),
            ));
        }
        if self.autosave_interval_secs == 0 {
            return Err(ConfigError::Settings(
                "autosave_interval_secs must be greater than 0".to_string(),
            ));
        }
        if self.snapshot_max_age_hours == 0 {
            return Err(ConfigError::Settings(
                "snapshot_max_age_hours must be greater than 0".to_string(),
            ));
        }
        if self.submit_timeout_secs == 0 {
            return Err(ConfigError::Settings(
                "submit_timeout_secs must be greater than 0".to_string(),
            ));
        }
        self.definition().validate().map_err(ConfigError::Settings)
    }

    pub fn definition(&self) -> WizardDefinition {
        let mut definition = WizardDefinition::startup();
        if let Some(steps) = &self.steps {
            definition.steps = steps.clone();
        }
        let mut rules = default_rule_configs();
        rules.extend(self.rules.clone());
        definition.rules = rules;
        definition
    }

    pub fn resolve_paths(&self) -> Result<WizardPaths, ConfigError> {
        match &self.state_root {
            Some(root) => Ok(WizardPaths::new(root.clone())),
            None => Ok(WizardPaths::new(default_state_root()?)),
        }
    }

    /// Submit endpoint, with the environment override taking precedence.
    pub fn resolved_submit_url(&self) -> String {
        std::env::var(SUBMIT_URL_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| self.submit_url.clone())
    }

    pub fn autosave_interval(&self) -> Duration {
        Duration::from_secs(self.autosave_interval_secs)
    }

    pub fn snapshot_max_age(&self) -> Duration {
        Duration::from_secs(self.snapshot_max_age_hours.saturating_mul(60 * 60))
    }

    pub fn submit_timeout(&self) -> Duration {
        Duration::from_secs(self.submit_timeout_secs)
    }
}
