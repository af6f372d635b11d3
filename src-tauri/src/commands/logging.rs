//! Logging setup and the bridge for host-layout log messages.
//!
//! Everything goes through the `log` facade; `env_logger` writes it out.
//! The default filter is `info`, overridable through `RUST_LOG`.

use tauri::command;

/// Log levels matching frontend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Parse a frontend level name; unknown names log as info.
    pub fn parse(level: &str) -> Self {
        match level.to_lowercase().as_str() {
            "debug" | "trace" => LogLevel::Debug,
            "warn" | "warning" => LogLevel::Warn,
            "error" => LogLevel::Error,
            _ => LogLevel::Info,
        }
    }
}

impl From<LogLevel> for log::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Debug => log::Level::Debug,
            LogLevel::Info => log::Level::Info,
            LogLevel::Warn => log::Level::Warn,
            LogLevel::Error => log::Level::Error,
        }
    }
}

/// Initialize the logging system. Safe to call more than once.
pub fn init_logging() {
    let result = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .try_init();

    if result.is_ok() {
        log::info!("[Logging] Logging system initialized");
    }
}

// ============================================================================
// Tauri Commands
// ============================================================================

/// Write a log message from the frontend
#[command]
pub fn write_log(level: String, source: String, message: String) {
    let level: log::Level = LogLevel::parse(&level).into();
    log::log!(target: "frontend", level, "[{}] {}", source, message);
}

/// Write multiple log messages from the frontend (batch)
#[command]
pub fn write_logs(logs: Vec<(String, String, String)>) {
    for (level, source, message) in logs {
        write_log(level, source, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_frontend_levels() {
        assert_eq!(LogLevel::parse("DEBUG"), LogLevel::Debug);
        assert_eq!(LogLevel::parse("warning"), LogLevel::Warn);
        assert_eq!(LogLevel::parse("error"), LogLevel::Error);
        assert_eq!(LogLevel::parse("verbose"), LogLevel::Info);
    }

    #[test]
    fn maps_to_log_levels() {
        assert_eq!(log::Level::from(LogLevel::Warn), log::Level::Warn);
        assert_eq!(log::Level::from(LogLevel::Debug), log::Level::Debug);
    }

    #[test]
    fn init_twice_is_harmless() {
        init_logging();
        init_logging();
        write_logs(vec![(
            "info".to_string(),
            "test".to_string(),
            "bridged".to_string(),
        )]);
    }
}
