//! User configuration, read from `<config dir>/donorform/config.json`.
//!
//! Every key is optional; a missing file means all defaults.

mod error;

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub use error::ConfigError;

/// Scanner device used when none is configured.
const DEFAULT_SCANNER_DEVICE: &str = "/dev/ttyACM0";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Identical scans closer together than this are treated as one.
    pub scan_debounce_ms: u64,
    /// Clear the form after each submit.
    pub reset_after_submit: bool,
    /// Directory used as the photo gallery and camera drop folder.
    pub photo_dir: Option<PathBuf>,
    /// Line-oriented QR scanner device or payload file.
    pub scanner_device: Option<PathBuf>,
    /// How long a camera request waits for a new photo.
    pub camera_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scan_debounce_ms: 2000,
            reset_after_submit: false,
            photo_dir: None,
            scanner_device: None,
            camera_timeout_secs: 60,
        }
    }
}

impl Config {
    /// Loads the config from the default location.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::default_path()?)
    }

    /// Loads the config from `path`, falling back to defaults if it does not exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Returns `<config dir>/donorform/config.json`.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(dir.join("donorform").join("config.json"))
    }

    pub fn scan_debounce(&self) -> Duration {
        Duration::from_millis(self.scan_debounce_ms)
    }

    pub fn camera_timeout(&self) -> Duration {
        Duration::from_secs(self.camera_timeout_secs)
    }

    /// The configured photo directory, else the platform picture directory,
    /// else the home directory.
    pub fn photo_dir(&self) -> Result<PathBuf, ConfigError> {
        self.photo_dir
            .clone()
            .or_else(dirs::picture_dir)
            .or_else(dirs::home_dir)
            .ok_or(ConfigError::NoPhotoDir)
    }

    pub fn scanner_device(&self) -> PathBuf {
        self.scanner_device
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SCANNER_DEVICE))
    }
}
