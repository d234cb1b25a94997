use std::path::PathBuf;

/// Errors raised when a QR scan session cannot be started.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// The scanner device or payload file could not be opened.
    #[error("could not open scanner at {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
