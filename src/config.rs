//! Runtime configuration.
//!
//! Loaded from TOML; every field is optional and falls back to the defaults
//! below.
//!
//! ```toml
//! behavior_id = "8f2c6a44-3d0e-4c54-9d6e-2a4f0b9c1e77"
//! sensitivity = 40
//! deadzone = 0.25
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Remote behavior (script) whose inputs receive sensitivity/pitch/yaw.
    pub behavior_id: String,
    /// Initial slider value, `0..=100`.
    pub sensitivity: u8,
    /// Minimum gamepad axis magnitude that counts as intentional input.
    pub deadzone: f32,
    /// Gamepad axis poll interval.
    pub poll_interval_ms: u64,
    /// Outer bound on a capture session before the first keystroke.
    pub capture_timeout_secs: u64,
    /// Inactivity window after a keystroke that ends a capture session.
    pub idle_window_secs: u64,
    /// Delay before retrying a refused pointer-lock request.
    pub pointer_retry_delay_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            behavior_id: String::new(),
            sensitivity: 50,
            deadzone: 0.2,
            poll_interval_ms: 100,
            capture_timeout_secs: 5 * 60,
            idle_window_secs: 3,
            pointer_retry_delay_ms: 1000,
        }
    }
}

impl Config {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Config = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        tracing::info!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.sensitivity > 100 {
            return Err(Error::Config(format!(
                "sensitivity must be within 0..=100, got {}",
                self.sensitivity
            )));
        }
        if !(0.0..1.0).contains(&self.deadzone) {
            return Err(Error::Config(format!(
                "deadzone must be within [0, 1), got {}",
                self.deadzone
            )));
        }
        if self.poll_interval_ms == 0 || self.idle_window_secs == 0 {
            return Err(Error::Config(
                "poll_interval_ms and idle_window_secs must be non-zero".into(),
            ));
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn capture_timeout(&self) -> Duration {
        Duration::from_secs(self.capture_timeout_secs)
    }

    pub fn idle_window(&self) -> Duration {
        Duration::from_secs(self.idle_window_secs)
    }

    pub fn pointer_retry_delay(&self) -> Duration {
        Duration::from_millis(self.pointer_retry_delay_ms)
    }
}
