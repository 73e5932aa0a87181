//! Notification center configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::window::WindowLevel;
use crate::{Error, Result};

/// Configuration of a [`NotificationCenter`](crate::NotificationCenter).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CenterConfig {
    /// If `true`, equal notifications may be queued and shown one after another.
    pub allow_duplicates: bool,
    /// The level the presentation window is placed at. Changing it while a
    /// notification is displayed only affects the next presentation.
    pub window_level: WindowLevel,
    /// How long a notification stays presented when shown without a dismiss
    /// trigger, in milliseconds.
    pub default_display_duration_ms: u64,
}

impl Default for CenterConfig {
    fn default() -> Self {
        Self {
            allow_duplicates: false,
            window_level: WindowLevel::StatusBar,
            default_display_duration_ms: 2000,
        }
    }
}

impl CenterConfig {
    /// Parse and validate a JSON configuration. Missing fields use defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.default_display_duration_ms == 0 {
            return Err(Error::config(
                "default_display_duration_ms must be greater than zero",
            ));
        }
        Ok(())
    }

    pub fn default_display_duration(&self) -> Duration {
        Duration::from_millis(self.default_display_duration_ms)
    }
}
