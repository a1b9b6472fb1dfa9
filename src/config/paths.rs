use crate::config::ConfigError;
use std::path::{Path, PathBuf};

pub const GLOBAL_STATE_DIR: &str = ".startup-wizard";
pub const GLOBAL_SETTINGS_FILE_NAME: &str = "config.yaml";

fn home_dir() -> Result<PathBuf, ConfigError> {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .ok_or(ConfigError::HomeDirectoryUnavailable)
}

pub fn default_state_root() -> Result<PathBuf, ConfigError> {
    Ok(home_dir()?.join(GLOBAL_STATE_DIR))
}

pub fn default_settings_path() -> Result<PathBuf, ConfigError> {
    Ok(default_state_root()?.join(GLOBAL_SETTINGS_FILE_NAME))
}

/// Files kept under the wizard's state root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WizardPaths {
    pub root: PathBuf,
}

impl WizardPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn store_path(&self) -> PathBuf {
        self.root.join("store.json")
    }

    pub fn log_path(&self) -> PathBuf {
        self.root.join("logs/wizard.log")
    }
}
