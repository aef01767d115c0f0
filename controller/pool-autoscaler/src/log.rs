//! Logging capability handed to event handlers

use std::sync::Mutex;
use tracing::info;

/// Informational log sink for handler branch points
pub trait EventLog: Send + Sync {
    fn info(&self, message: &str);
}

/// Forwards handler log lines to `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingEventLog;

impl EventLog for TracingEventLog {
    fn info(&self, message: &str) {
        info!(target: "pool_autoscaler", "{}", message);
    }
}

/// Keeps log lines in memory so callers can inspect them
#[derive(Debug, Default)]
pub struct MemoryEventLog {
    lines: Mutex<Vec<String>>,
}

impl MemoryEventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.lines().iter().any(|line| line.contains(needle))
    }
}

impl EventLog for MemoryEventLog {
    fn info(&self, message: &str) {
        self.lines
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(message.to_string());
    }
}
