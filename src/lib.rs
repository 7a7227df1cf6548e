//! picocam: the drawing core of a PICO-8 style fantasy console.
//!
//! Cartridges draw through [`RenderState`]; a [`Runner`] drives them one
//! frame at a time. The camera, the pixel buffer and the sprite caches live
//! underneath and can be used on their own.

pub mod cache;
pub mod camera;
pub mod cartridge;
pub mod config;
pub mod display;
pub mod draw;
pub mod error;
pub mod input;
pub mod map;
pub mod palette;
pub mod render_state;
pub mod sprite;
pub mod texture;
pub mod util;

pub use camera::{Camera, CameraMode, CameraOptions};
pub use cartridge::{Cartridge, Runner};
pub use config::ConsoleConfig;
pub use display::PixelBuffer;
pub use error::{CameraConfigError, ConfigError, DisplayError};
pub use input::{Button, Buttons};
pub use render_state::RenderState;
