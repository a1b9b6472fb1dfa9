use super::{default_settings_path, ConfigError, Settings};
use std::path::Path;

/// Reads settings from `path`, or from the default location when none is
/// given. A missing default file yields the built-in settings.
pub fn load_settings(path: Option<&Path>) -> Result<Settings, ConfigError> {
    let settings = match path {
        Some(path) => Settings::from_path(path)?,
        None => {
            let default_path = default_settings_path()?;
            if default_path.exists() {
                Settings::from_path(&default_path)?
            } else {
                Settings::default()
            }
        }
    };
    settings.validate()?;
    Ok(settings)
}
