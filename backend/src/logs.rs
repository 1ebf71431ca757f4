//! Pipeline progress log.
//!
//! Every stage reports through a process-wide sink that echoes entries to
//! stderr and keeps them so the run report can carry the full history.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

/// Log level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A single log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    /// Log level
    pub level: LogLevel,
    /// Log message
    pub message: String,
    /// Optional indentation level (for nested logs)
    #[serde(default)]
    pub indent: u8,
}

impl LogEntry {
    pub fn info(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Info, message: message.into(), indent: 0 }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Success, message: message.into(), indent: 0 }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Warning, message: message.into(), indent: 0 }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Error, message: message.into(), indent: 0 }
    }

    pub fn with_indent(mut self, indent: u8) -> Self {
        self.indent = indent;
        self
    }
}

/// Global log sink
pub static PIPELINE_LOG: Lazy<PipelineLog> = Lazy::new(PipelineLog::new);

/// Collects log entries for the current process
pub struct PipelineLog {
    history: Mutex<Vec<LogEntry>>,
    echo: bool,
}

impl PipelineLog {
    pub fn new() -> Self {
        Self { history: Mutex::new(Vec::new()), echo: true }
    }

    /// A sink that records without printing.
    pub fn silent() -> Self {
        Self { history: Mutex::new(Vec::new()), echo: false }
    }

    /// Record an entry and echo it to stderr
    pub fn log(&self, entry: LogEntry) {
        if self.echo {
            let prefix = match entry.level {
                LogLevel::Info => "   ",
                LogLevel::Success => "   ✓",
                LogLevel::Warning => "   ⚠️",
                LogLevel::Error => "   ❌",
            };
            let indent = "   ".repeat(entry.indent as usize);
            eprintln!("{}{} {}", indent, prefix, entry.message);
        }

        if let Ok(mut history) = self.history.lock() {
            history.push(entry);
        }
    }

    /// Copy of every entry logged so far
    pub fn snapshot(&self) -> Vec<LogEntry> {
        self.history.lock().map(|h| h.clone()).unwrap_or_default()
    }

    pub fn warning_count(&self) -> usize {
        self.history
            .lock()
            .map(|h| h.iter().filter(|e| e.level == LogLevel::Warning).count())
            .unwrap_or(0)
    }
}

impl Default for PipelineLog {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenient logging functions
pub fn log_info(msg: impl Into<String>) {
    PIPELINE_LOG.log(LogEntry::info(msg));
}

pub fn log_success(msg: impl Into<String>) {
    PIPELINE_LOG.log(LogEntry::success(msg));
}

pub fn log_warning(msg: impl Into<String>) {
    PIPELINE_LOG.log(LogEntry::warning(msg));
}

pub fn log_error(msg: impl Into<String>) {
    PIPELINE_LOG.log(LogEntry::error(msg));
}

pub fn log_info_indent(msg: impl Into<String>, indent: u8) {
    PIPELINE_LOG.log(LogEntry::info(msg).with_indent(indent));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_and_warning_count() {
        let log = PipelineLog::silent();
        log.log(LogEntry::info("loading"));
        log.log(LogEntry::warning("3 appearances without date"));
        log.log(LogEntry::success("done").with_indent(1));

        assert_eq!(log.warning_count(), 1);

        let history = log.snapshot();
        assert_eq!(history.len(), 3);
        assert_eq!(history[2].indent, 1);
        assert_eq!(history[1].level, LogLevel::Warning);
    }

    #[test]
    fn test_entry_serializes_lowercase_level() {
        let json = serde_json::to_string(&LogEntry::warning("x")).unwrap();
        assert!(json.contains("\"level\":\"warning\""));
    }
}
