//! # Config Module
//!
//! Toolkit-wide settings, loadable from a JSON file.
//!
//! ```json
//! {
//!   "fingerprint": { "window_size": 32768, "full_hash_threshold": 98304, "block_size": 512 },
//!   "max_slice_len": 10240,
//!   "summary_capacity": 1024
//! }
//! ```
//!
//! Missing keys take their defaults.

use crate::core::fingerprint::FingerprintConfig;
use crate::core::mapped::DEFAULT_MAX_SLICE_LEN;
use crate::core::summary::DEFAULT_SUMMARY_CAPACITY;
use crate::error::{FileKitError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Application directory name under the platform config dir
const APP_DIR: &str = "photo-filekit";

/// Settings shared by every toolkit operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolkitConfig {
    /// Sampling policy for fingerprints
    pub fingerprint: FingerprintConfig,
    /// Upper bound on bytes returned by a slice read
    pub max_slice_len: usize,
    /// Upper bound on the size of a metadata summary
    pub summary_capacity: usize,
}

impl Default for ToolkitConfig {
    fn default() -> Self {
        Self {
            fingerprint: FingerprintConfig::default(),
            max_slice_len: DEFAULT_MAX_SLICE_LEN,
            summary_capacity: DEFAULT_SUMMARY_CAPACITY,
        }
    }
}

impl ToolkitConfig {
    /// Default config file location, if the platform has a config dir
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join("config.json"))
    }

    /// Load and validate a config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| FileKitError::from_io("read config", path, e))?;
        let config: Self = serde_json::from_str(&text)
            .map_err(|e| FileKitError::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Load the default config file, or defaults when there is none
    pub fn load_default() -> Result<Self> {
        match Self::default_path() {
            Some(path) if path.is_file() => Self::load(path),
            _ => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.fingerprint.validate()?;
        if self.max_slice_len == 0 {
            return Err(FileKitError::Config(
                "max_slice_len must be non-zero".to_string(),
            ));
        }
        if self.summary_capacity == 0 {
            return Err(FileKitError::Config(
                "summary_capacity must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}
