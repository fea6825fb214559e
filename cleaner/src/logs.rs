//! Leveled pipeline logs.
//!
//! Thin helpers over `tracing` so pipeline code can report progress with a
//! user-facing level (`info`, `success`, `warning`, `error`). The level is
//! attached to each event as the `status` field; subscribers are configured by
//! the binary.

use serde::Serialize;

/// Log level for pipeline progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Info => "info",
            LogLevel::Success => "success",
            LogLevel::Warning => "warning",
            LogLevel::Error => "error",
        }
    }
}

/// A single log entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
    /// Nesting depth, rendered as leading indentation
    pub indent: u8,
}

impl LogEntry {
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self { level, message: message.into(), indent: 0 }
    }

    pub fn with_indent(mut self, indent: u8) -> Self {
        self.indent = indent;
        self
    }

    /// Message with its indentation applied.
    pub fn render(&self) -> String {
        format!("{}{}", "   ".repeat(self.indent as usize), self.message)
    }

    /// Emit this entry as a `tracing` event.
    pub fn emit(&self) {
        let message = self.render();
        let level = self.level.as_str();
        match self.level {
            LogLevel::Info | LogLevel::Success => tracing::info!(status = level, "{}", message),
            LogLevel::Warning => tracing::warn!(status = level, "{}", message),
            LogLevel::Error => tracing::error!(status = level, "{}", message),
        }
    }
}

/// Convenient logging functions
pub fn log_info(msg: impl Into<String>) {
    LogEntry::new(LogLevel::Info, msg).emit();
}

pub fn log_success(msg: impl Into<String>) {
    LogEntry::new(LogLevel::Success, msg).emit();
}

pub fn log_warning(msg: impl Into<String>) {
    LogEntry::new(LogLevel::Warning, msg).emit();
}

pub fn log_error(msg: impl Into<String>) {
    LogEntry::new(LogLevel::Error, msg).emit();
}

pub fn log_info_indent(msg: impl Into<String>, indent: u8) {
    LogEntry::new(LogLevel::Info, msg).with_indent(indent).emit();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_indent() {
        let entry = LogEntry::new(LogLevel::Info, "2019").with_indent(2);
        assert_eq!(entry.render(), "      2019");
    }

    #[test]
    fn test_level_serialization() {
        let entry = LogEntry::new(LogLevel::Success, "done");
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["level"], "success");
        assert_eq!(json["indent"], 0);
    }
}
