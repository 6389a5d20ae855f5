// SPDX-License-Identifier: MIT OR Apache-2.0
//! Timeline playback settings stored as RON.

use crate::clock::Time;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Errors raised while loading or saving settings
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// RON parse error
    #[error("Parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// RON serialization error
    #[error("Serialization error: {0}")]
    Serialize(#[from] ron::Error),

    /// Frame rate is not a positive finite number
    #[error("Invalid frame rate: {0}")]
    InvalidFrameRate(f32),
}

/// Playback settings for a [`Timeline`](crate::Timeline)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineSettings {
    /// Multiplier applied to every step delta
    pub speed: f32,
    /// Frames per time unit used by `step_frame`
    pub frame_rate: f32,
    /// Drop finished items that allow it
    pub remove_on_finish: bool,
}

impl TimelineSettings {
    /// Parse settings from RON text
    pub fn from_ron(text: &str) -> Result<Self, SettingsError> {
        let settings: Self = ron::from_str(text)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Serialize settings to pretty RON
    pub fn to_ron(&self) -> Result<String, SettingsError> {
        Ok(ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?)
    }

    /// Load settings from a RON file
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let text = std::fs::read_to_string(path)?;
        let settings = Self::from_ron(&text)?;
        tracing::debug!("Loaded timeline settings from {:?}", path);
        Ok(settings)
    }

    /// Save settings to a RON file
    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        std::fs::write(path, self.to_ron()?)?;
        Ok(())
    }

    /// Length of one frame
    pub fn frame_duration(&self) -> Time {
        1.0 / self.frame_rate
    }

    fn validate(&self) -> Result<(), SettingsError> {
        if self.frame_rate.is_finite() && self.frame_rate > 0.0 {
            Ok(())
        } else {
            Err(SettingsError::InvalidFrameRate(self.frame_rate))
        }
    }
}

impl Default for TimelineSettings {
    fn default() -> Self {
        Self {
            speed: 1.0,
            frame_rate: 60.0,
            remove_on_finish: true,
        }
    }
}
