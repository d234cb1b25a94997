use std::path::PathBuf;

/// Errors that can occur while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The config file exists but could not be read.
    #[error("failed to read config at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid JSON for [`Config`](super::Config).
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The platform does not provide a config directory.
    #[error("could not determine config directory")]
    NoConfigDir,

    /// No photo directory was configured and the platform has no default.
    #[error("could not determine a photo directory; set photo_dir in the config")]
    NoPhotoDir,
}
