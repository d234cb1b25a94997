use crate::config::ConfigError;
use crate::logging::LoggingError;

/// Errors that can occur in the TUI layer.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// An I/O error occurred (terminal, event reading, etc.).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration could not be loaded.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Logging could not be set up.
    #[error("Logging error: {0}")]
    Logging(#[from] LoggingError),

    /// A submitted record could not be written out.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
