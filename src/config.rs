//! Frontend configuration
//!
//! Loaded from a YAML file with `confy` when `--config` is given. Every
//! field is optional in the file; missing ones take the defaults below.

use std::path::Path;
use std::time::Duration;

use perch_types::OverlayOptions;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration")]
    Load(#[from] confy::ConfyError),

    #[error("frame interval must be at least 1ms")]
    InvalidFrameInterval,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerchConfig {
    /// Options every new tooltip starts from
    pub defaults: OverlayOptions,
    /// Delay between a scroll/resize and the reposition pass it triggers
    pub frame_interval_ms: u64,
    pub viewport: ViewportConfig,
}

impl Default for PerchConfig {
    fn default() -> Self {
        Self {
            defaults: OverlayOptions::default(),
            frame_interval_ms: 17,
            viewport: ViewportConfig::default(),
        }
    }
}

/// Initial size of the headless viewport
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    pub width: f64,
    pub height: f64,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
        }
    }
}

impl PerchConfig {
    /// Read the config at `path`, or the defaults when no path is given.
    /// A missing file is created with the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => {
                let config: Self = confy::load_path(path)?;
                tracing::debug!(path = %path.display(), "configuration loaded");
                Ok(config)
            }
            None => Ok(Self::default()),
        }
    }

    pub fn frame_interval(&self) -> Result<Duration, ConfigError> {
        match self.frame_interval_ms {
            0 => Err(ConfigError::InvalidFrameInterval),
            ms => Ok(Duration::from_millis(ms)),
        }
    }
}
