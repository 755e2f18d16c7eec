//! Tracing subscriber setup for the binaries

use std::path::PathBuf;
use tracing::{debug, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::FlightError;

const LOG_FILE_PREFIX: &str = "sky-flights.log";

/// Where log lines go
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Used when `RUST_LOG` is not set
    pub default_directive: String,
    /// Daily-rolling JSON files in this directory instead of stderr
    pub log_dir: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            default_directive: "warn".to_string(),
            log_dir: None,
        }
    }
}

impl LogConfig {
    fn filter(&self) -> Result<EnvFilter, FlightError> {
        match EnvFilter::try_from_default_env() {
            Ok(filter) => Ok(filter),
            Err(_) => EnvFilter::try_new(&self.default_directive)
                .map_err(|e| FlightError::Config(format!("Invalid log directive: {}", e))),
        }
    }
}

/// Install the global subscriber.
///
/// Keep the returned guard alive for the lifetime of the program when
/// logging to files, or buffered lines are lost on exit.
pub fn init(config: &LogConfig) -> Result<Option<WorkerGuard>, FlightError> {
    let filter = config.filter()?;

    let guard = match &config.log_dir {
        Some(log_dir) => {
            std::fs::create_dir_all(log_dir)
                .map_err(|e| FlightError::Config(format!("Cannot create {}: {}", log_dir.display(), e)))?;
            let file_appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(file_appender);

            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(writer)
                        .with_ansi(false)
                        .with_target(true)
                        .with_thread_ids(true)
                        .with_file(true)
                        .with_line_number(true)
                        .json(),
                )
                .try_init()
                .map_err(|e| FlightError::Config(format!("Logging already initialized: {}", e)))?;

            info!(log_dir = %log_dir.display(), "Logging initialized");
            Some(guard)
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(false),
                )
                .try_init()
                .map_err(|e| FlightError::Config(format!("Logging already initialized: {}", e)))?;
            None
        }
    };

    debug!("Debug logging is enabled");
    Ok(guard)
}
