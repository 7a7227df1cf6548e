//! Console configuration, stored as JSON

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::camera::CameraOptions;
use crate::error::ConfigError;

/// Largest virtual screen edge accepted
pub const MAX_SCREEN_EDGE: u32 = 1024;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    pub screen_width: u32,
    pub screen_height: u32,
    pub target_fps: u32,
    /// Window pixels per virtual pixel
    pub scale: u32,
    pub vsync: bool,
    pub camera: CameraOptions,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            screen_width: 128,
            screen_height: 128,
            target_fps: 30,
            scale: 4,
            vsync: true,
            camera: CameraOptions::default(),
        }
    }
}

impl ConsoleConfig {
    /// Parse and validate; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Camera options are checked when applied to the camera, not here
    pub fn validate(&self) -> Result<(), ConfigError> {
        let edge_ok = |v: u32| (1..=MAX_SCREEN_EDGE).contains(&v);
        if !edge_ok(self.screen_width) || !edge_ok(self.screen_height) {
            return Err(ConfigError::InvalidScreen {
                width: self.screen_width,
                height: self.screen_height,
            });
        }
        if self.target_fps == 0 {
            return Err(ConfigError::InvalidFps);
        }
        if self.scale == 0 {
            return Err(ConfigError::InvalidScale);
        }
        Ok(())
    }

    /// Window size in real pixels
    pub fn window_size(&self) -> (u32, u32) {
        (self.screen_width * self.scale, self.screen_height * self.scale)
    }
}
