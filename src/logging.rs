//! File-backed `tracing` setup. The terminal belongs to the UI, so log output
//! goes to `<data dir>/donorform/donorform.log`.

use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{EnvFilter, fmt};

/// Environment variable holding the log filter, e.g. `donorform=debug`.
pub const LOG_ENV: &str = "DONORFORM_LOG";

const LOG_FILE: &str = "donorform.log";

/// Errors that can occur while installing the log subscriber.
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("could not open log file: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not install log subscriber: {0}")]
    Init(#[from] TryInitError),
}

/// Returns the log file location, creating its directory.
pub fn log_path() -> Result<PathBuf, LoggingError> {
    let dir = dirs::data_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("donorform");
    fs::create_dir_all(&dir)?;
    Ok(dir.join(LOG_FILE))
}

/// Installs the global subscriber and returns the log file path.
#[cfg_attr(coverage_nightly, coverage(off))]
#[mutants::skip]
pub fn init() -> Result<PathBuf, LoggingError> {
    let path = log_path()?;
    let file = OpenOptions::new().create(true).append(true).open(&path)?;
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(Mutex::new(file)).with_ansi(false))
        .with(filter)
        .try_init()?;
    Ok(path)
}
