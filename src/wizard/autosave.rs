use std::time::Duration;

pub const DEFAULT_AUTOSAVE_INTERVAL: Duration = Duration::from_secs(30);

/// Tick-driven replacement for a repeating save timer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutosaveSchedule {
    interval_ms: i64,
    last_save_ms: i64,
    stopped: bool,
}

impl AutosaveSchedule {
    pub fn new(interval: Duration, now_ms: i64) -> Self {
        Self {
            interval_ms: i64::try_from(interval.as_millis()).unwrap_or(i64::MAX),
            last_save_ms: now_ms,
            stopped: false,
        }
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms.max(0) as u64)
    }

    pub fn is_due(&self, now_ms: i64) -> bool {
        !self.stopped && now_ms.saturating_sub(self.last_save_ms) >= self.interval_ms
    }

    pub fn record(&mut self, now_ms: i64) {
        self.last_save_ms = now_ms;
    }

    pub fn stop(&mut self) {
        self.stopped = true;
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }
}
