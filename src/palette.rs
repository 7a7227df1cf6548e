//! PICO-8 palette and per-draw colour remapping
//!
//! Cartridges speak in palette indices (0-15); the pixel buffer and sprite
//! images store RGBA bytes. This module converts between the two and keeps
//! the draw palette / transparency table that `pal` and `palt` mutate.

use tracing::warn;

/// RGBA colour in R, G, B, A byte order
pub type Rgba = [u8; 4];

/// Number of colours in the console palette
pub const PALETTE_SIZE: usize = 16;

/// The PICO-8 16-colour palette
pub const PICO8_PALETTE: [Rgba; PALETTE_SIZE] = [
    [0, 0, 0, 255],       // 0 black
    [29, 43, 83, 255],    // 1 dark blue
    [126, 37, 83, 255],   // 2 dark purple
    [0, 135, 81, 255],    // 3 dark green
    [171, 82, 54, 255],   // 4 brown
    [95, 87, 79, 255],    // 5 dark grey
    [194, 195, 199, 255], // 6 light grey
    [255, 241, 232, 255], // 7 white
    [255, 0, 77, 255],    // 8 red
    [255, 163, 0, 255],   // 9 orange
    [255, 236, 39, 255],  // 10 yellow
    [0, 228, 54, 255],    // 11 green
    [41, 173, 255, 255],  // 12 blue
    [131, 118, 156, 255], // 13 lavender
    [255, 119, 168, 255], // 14 pink
    [255, 204, 170, 255], // 15 peach
];

/// RGBA value for a palette index (upper bits ignored)
#[inline]
pub fn rgba(index: u8) -> Rgba {
    PICO8_PALETTE[(index & 0x0f) as usize]
}

/// Palette index for an RGBA value. Unknown colours map to 0.
#[inline]
pub fn index_of(color: Rgba) -> u8 {
    PICO8_PALETTE
        .iter()
        .position(|c| c[0] == color[0] && c[1] == color[1] && c[2] == color[2])
        .map_or(0, |i| i as u8)
}

/// Bytes in a `width` x `height` RGBA image, or None if that overflows
#[inline]
pub fn rgba_len(width: u32, height: u32) -> Option<usize> {
    (width as usize).checked_mul(height as usize)?.checked_mul(4)
}

/// Zeroed RGBA storage with its effective size. A size whose byte length
/// overflows collapses to 0x0.
pub fn rgba_storage(width: u32, height: u32) -> (u32, u32, Vec<u8>) {
    match rgba_len(width, height) {
        Some(len) => (width, height, vec![0; len]),
        None => {
            warn!(width, height, "RGBA image size overflows, using 0x0");
            (0, 0, Vec::new())
        },
    }
}

const IDENTITY: [u8; PALETTE_SIZE] = {
    let mut pal = [0u8; PALETTE_SIZE];
    let mut i = 0;
    while i < PALETTE_SIZE {
        pal[i] = i as u8;
        i += 1;
    }
    pal
};

/// Draw palette and transparency flags, snapshotted into every queued
/// sprite/map command so later `pal` calls do not leak backwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawPalette {
    remap: [u8; PALETTE_SIZE],
    transparent: [bool; PALETTE_SIZE],
}

impl DrawPalette {
    pub fn new() -> Self {
        let mut transparent = [false; PALETTE_SIZE];
        transparent[0] = true;
        Self {
            remap: IDENTITY,
            transparent,
        }
    }

    /// Draw colour `from` as `to`
    pub fn set(&mut self, from: u8, to: u8) {
        self.remap[(from & 0x0f) as usize] = to & 0x0f;
    }

    pub fn reset_remap(&mut self) {
        self.remap = IDENTITY;
    }

    pub fn set_transparent(&mut self, color: u8, transparent: bool) {
        self.transparent[(color & 0x0f) as usize] = transparent;
    }

    /// Back to "only colour 0 is transparent"
    pub fn reset_transparency(&mut self) {
        self.transparent = [false; PALETTE_SIZE];
        self.transparent[0] = true;
    }

    #[inline]
    pub fn map(&self, color: u8) -> u8 {
        self.remap[(color & 0x0f) as usize]
    }

    #[inline]
    pub fn is_transparent(&self, color: u8) -> bool {
        self.transparent[(color & 0x0f) as usize]
    }
}

impl Default for DrawPalette {
    fn default() -> Self {
        Self::new()
    }
}
