//! Tracing subscriber setup.
//!
//! The terminal transcript and log lines share a tty, so logs go to
//! `WEBFACE_LOG_FILE` when one is configured and to stderr otherwise.

use std::fs::OpenOptions;
use std::io;
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};

use tracing_subscriber::EnvFilter;

use crate::config::EnvConfig;

static INIT: OnceLock<()> = OnceLock::new();

#[derive(Debug)]
pub enum LoggingError {
    OpenLogFile { path: PathBuf, source: io::Error },
    Install(String),
}

impl std::fmt::Display for LoggingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OpenLogFile { path, source } => {
                write!(f, "failed to open log file {}: {source}", path.display())
            }
            Self::Install(message) => write!(f, "failed to install log subscriber: {message}"),
        }
    }
}

impl std::error::Error for LoggingError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::OpenLogFile { source, .. } => Some(source),
            Self::Install(_) => None,
        }
    }
}

/// Filter directive derived from the config: explicit `WEBFACE_LOG` wins,
/// then `WEBFACE_DEBUG=1`, then `warn`.
pub fn filter_directive(config: &EnvConfig) -> String {
    if let Some(filter) = &config.log_filter {
        return filter.clone();
    }
    if config.debug {
        "warn,webface=debug,webface_api=debug,webface_cli=debug,session_store=debug".to_string()
    } else {
        "warn".to_string()
    }
}

/// Installs the global subscriber. Later calls return `Ok(())` without
/// touching the installed one.
pub fn init_logging(config: &EnvConfig) -> Result<(), LoggingError> {
    if INIT.get().is_some() {
        return Ok(());
    }

    let filter = EnvFilter::new(filter_directive(config));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(config.debug);

    let installed = match &config.log_file {
        Some(path) => {
            let path = PathBuf::from(path);
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .map_err(|source| LoggingError::OpenLogFile { path, source })?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
        None => builder.with_writer(io::stderr).try_init(),
    };
    installed.map_err(|error| LoggingError::Install(error.to_string()))?;

    let _ = INIT.set(());
    for warning in &config.warnings {
        tracing::warn!("{warning}");
    }
    Ok(())
}
