//! Error types
//!
//! None of these abort the frame loop. Camera configuration errors are
//! recovered inside the camera (fallback + log) and only returned so callers
//! can report them.

use thiserror::Error;

/// Rejected or corrected camera options
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CameraConfigError {
    /// Lerp must lie in (0, 1]; the camera falls back to 1.0 (instant snap)
    #[error("lerp factor {0} outside (0, 1], using 1.0")]
    InvalidLerp(f32),

    /// Dead zone extents must be non-negative; the new options are discarded
    #[error("negative dead zone {w}x{h}, keeping previous camera options")]
    NegativeDeadZone { w: f32, h: f32 },

    /// Map clamping needs a positive map size; the new options are discarded
    #[error("map clamping enabled with invalid map size {width}x{height}, keeping previous camera options")]
    InvalidMapSize { width: f32, height: f32 },
}

/// Console configuration loading / validation errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read or write config: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid screen size {width}x{height}")]
    InvalidScreen { width: u32, height: u32 },

    #[error("target fps must be positive")]
    InvalidFps,

    #[error("window scale must be at least 1")]
    InvalidScale,
}

/// Window host failures (SDL reports errors as strings)
#[derive(Debug, Error)]
pub enum DisplayError {
    #[error("SDL error: {0}")]
    Sdl(String),
}

impl From<String> for DisplayError {
    fn from(message: String) -> Self {
        Self::Sdl(message)
    }
}
