//! Logging system initialization
//!
//! Sets up tracing-based logging with file output to %APPDATA%\talukscope\app.log
//! and rotation on startup keeping 9 historical files. Raw server replies of
//! failed requests end up here, never in front of the user.

use crate::config::ConfigManager;
use crate::error::{AnalyzerError, Result, StringError};
use std::path::Path;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt};

/// Maximum number of historical log files to keep (app.log.1 through app.log.9)
const MAX_LOG_FILES: u8 = 9;

/// Initialize the logging system
///
/// Log level defaults to INFO but can be configured via `RUST_LOG` environment variable.
pub fn init_logging() -> Result<()> {
    let log_dir = ConfigManager::get_app_dir();
    std::fs::create_dir_all(&log_dir)?;

    let rotated = rotate_logs_on_startup(&log_dir.join("app.log"))?;

    // Rotation is handled above, once per session
    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix("app")
        .filename_suffix("log")
        .build(&log_dir)
        .map_err(|e| AnalyzerError::ConfigError(Box::new(e)))?;

    let subscriber = fmt()
        .with_writer(file_appender)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_ansi(false)
        .with_target(true)
        .with_thread_names(true) // worker threads are named after their request
        .with_file(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| AnalyzerError::ConfigError(Box::new(e)))?;

    tracing::info!("talukscope v{} started", env!("CARGO_PKG_VERSION"));
    if rotated {
        tracing::info!("Log rotation completed on startup");
    }

    Ok(())
}

/// Shift app.log → app.log.1 → … → app.log.9, dropping the oldest
///
/// A fresh app.log is created by the appender afterwards. Returns whether a
/// previous log was rotated; runs before the subscriber exists, so it cannot log.
fn rotate_logs_on_startup(log_path: &Path) -> Result<bool> {
    if !log_path.exists() {
        return Ok(false);
    }

    let log_dir = log_path.parent().ok_or_else(|| {
        AnalyzerError::ConfigError(StringError::new("Invalid log path"))
    })?;
    let log_name = log_path
        .file_name()
        .ok_or_else(|| AnalyzerError::ConfigError(StringError::new("Invalid log filename")))?
        .to_string_lossy();
    let numbered = |i: u8| log_dir.join(format!("{log_name}.{i}"));

    let oldest_log = numbered(MAX_LOG_FILES);
    if oldest_log.exists() {
        std::fs::remove_file(&oldest_log)?;
    }

    for i in (1..MAX_LOG_FILES).rev() {
        let current_log = numbered(i);
        if current_log.exists() {
            std::fs::rename(&current_log, numbered(i + 1))?;
        }
    }

    std::fs::rename(log_path, numbered(1))?;

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::create_test_dir;
    use std::fs;

    fn start_session(log_path: &Path, session: u32) {
        fs::write(log_path, format!("session {session}")).unwrap();
        assert!(rotate_logs_on_startup(log_path).unwrap());
    }

    fn read(dir: &Path, name: &str) -> String {
        fs::read_to_string(dir.join(name)).unwrap()
    }

    #[test]
    fn test_rotation_moves_current_log() {
        let dir = create_test_dir();
        let log_path = dir.path().join("app.log");

        start_session(&log_path, 1);

        assert!(!log_path.exists());
        assert_eq!(read(dir.path(), "app.log.1"), "session 1");
    }

    #[test]
    fn test_rotation_orders_newest_first() {
        let dir = create_test_dir();
        let log_path = dir.path().join("app.log");

        for session in 1..=3 {
            start_session(&log_path, session);
        }

        assert_eq!(read(dir.path(), "app.log.1"), "session 3");
        assert_eq!(read(dir.path(), "app.log.2"), "session 2");
        assert_eq!(read(dir.path(), "app.log.3"), "session 1");
    }

    #[test]
    fn test_rotation_keeps_at_most_max_files() {
        let dir = create_test_dir();
        let log_path = dir.path().join("app.log");

        for session in 1..=12 {
            start_session(&log_path, session);
        }

        assert_eq!(read(dir.path(), "app.log.1"), "session 12");
        assert_eq!(
            read(dir.path(), &format!("app.log.{MAX_LOG_FILES}")),
            "session 4"
        );
        assert!(!dir.path().join("app.log.10").exists());
    }

    #[test]
    fn test_rotation_without_existing_log_is_noop() {
        let dir = create_test_dir();
        let log_path = dir.path().join("app.log");

        assert!(!rotate_logs_on_startup(&log_path).unwrap());

        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
