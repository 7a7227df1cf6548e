pub mod font;
mod pixel_buffer;
#[cfg(feature = "window")]
mod window;

pub use font::{draw_text, text_width, GLYPH_HEIGHT, GLYPH_WIDTH};
pub use pixel_buffer::PixelBuffer;
#[cfg(feature = "window")]
pub use window::{Display, InputEvent, RenderTarget};

/// PICO-8 screen
pub const DEFAULT_WIDTH: u32 = 128;
pub const DEFAULT_HEIGHT: u32 = 128;
