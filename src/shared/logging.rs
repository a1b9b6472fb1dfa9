use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Append-only JSON-lines event log. Writes are best-effort.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WizardLog {
    path: PathBuf,
}

impl WizardLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, level: &str, event: &str, message: &str) {
        let payload = serde_json::json!({
            "timestamp": chrono::Utc::now().timestamp(),
            "level": level,
            "event": event,
            "message": message,
        });

        let Ok(line) = serde_json::to_string(&payload) else {
            return;
        };

        if let Some(parent) = self.path.parent() {
            if fs::create_dir_all(parent).is_err() {
                return;
            }
        }
        let Ok(mut file) = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
        else {
            return;
        };
        let _ = writeln!(file, "{line}");
    }
}
