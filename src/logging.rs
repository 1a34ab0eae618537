//! Logging configuration and initialization for gator.
//!
//! Log output goes to stderr so that command output on stdout stays clean.

use std::fs::{self, File, OpenOptions};
use std::path::Path;
use std::sync::Arc;

use tracing::{Level, Subscriber};
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;
use crate::{GatorError, Result};

/// Parse log level string to tracing Level.
fn parse_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" | "warning" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::from_default_env().add_directive(parse_level(level).into())
}

/// Open `path` for appending, creating missing parent directories.
fn open_log_file(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(OpenOptions::new().create(true).append(true).open(path)?)
}

/// Build the subscriber for `config` without installing it.
///
/// Events always go to stderr. When `file` is set they are also appended,
/// without ANSI colors, to that file.
fn build(config: &LoggingConfig) -> Result<impl Subscriber + Send + Sync + 'static> {
    let file_layer = match config.file.as_deref() {
        Some(path) => {
            let log_file = Arc::new(open_log_file(Path::new(path))?);
            Some(
                tracing_subscriber::fmt::layer()
                    .with_writer(log_file)
                    .with_ansi(false)
                    .with_target(true),
            )
        }
        None => None,
    };

    Ok(tracing_subscriber::registry()
        .with(env_filter(&config.level))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true)
                .with_target(true),
        )
        .with(file_layer))
}

/// Initialize the logging system with the given configuration.
///
/// Fails if the log file cannot be opened or a global subscriber is
/// already installed.
pub fn init(config: &LoggingConfig) -> Result<()> {
    build(config)?
        .try_init()
        .map_err(|e| GatorError::Config(format!("failed to install logger: {e}")))
}

/// Initialize console-only logging.
///
/// Used as the fallback when [`init`] fails; an already installed
/// subscriber is left in place.
pub fn init_console_only(level: &str) {
    let config = LoggingConfig {
        level: level.to_string(),
        file: None,
    };
    if let Err(e) = init(&config) {
        eprintln!("{e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level_trace() {
        assert_eq!(parse_level("trace"), Level::TRACE);
        assert_eq!(parse_level("TRACE"), Level::TRACE);
    }

    #[test]
    fn test_parse_level_debug() {
        assert_eq!(parse_level("debug"), Level::DEBUG);
    }

    #[test]
    fn test_parse_level_warn() {
        assert_eq!(parse_level("warn"), Level::WARN);
        assert_eq!(parse_level("warning"), Level::WARN);
    }

    #[test]
    fn test_parse_level_error() {
        assert_eq!(parse_level("ERROR"), Level::ERROR);
    }

    #[test]
    fn test_parse_level_default() {
        assert_eq!(parse_level("verbose"), Level::INFO);
        assert_eq!(parse_level(""), Level::INFO);
    }

    #[test]
    fn test_console_only_creates_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = LoggingConfig {
            level: "debug".to_string(),
            file: None,
        };

        let subscriber = build(&config).unwrap();
        tracing::subscriber::with_default(subscriber, || {
            tracing::info!("console only");
        });

        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_file_logging_appends_and_creates_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("nested").join("gator.log");
        let config = LoggingConfig {
            level: "info".to_string(),
            file: Some(path.to_string_lossy().into_owned()),
        };

        for message in ["first event", "second event"] {
            let subscriber = build(&config).unwrap();
            tracing::subscriber::with_default(subscriber, || {
                tracing::info!("{message}");
                tracing::trace!("filtered out");
            });
        }

        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.contains("first event"));
        assert!(contents.contains("second event"));
        assert!(!contents.contains("filtered out"));
        assert!(!contents.contains('\x1b'));
    }

    #[test]
    fn test_unwritable_log_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = LoggingConfig {
            level: "info".to_string(),
            // A directory cannot be opened for appending.
            file: Some(dir.path().to_string_lossy().into_owned()),
        };
        assert!(matches!(build(&config), Err(GatorError::Io(_))));
    }

    #[test]
    fn test_init_console_only_installs_once() {
        let config = LoggingConfig::default();
        assert!(config.file.is_none());

        init(&config).unwrap();
        let err = init(&config).unwrap_err();
        assert!(matches!(err, GatorError::Config(_)));
    }
}
