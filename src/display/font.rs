//! 3x5 bitmap font
//!
//! Each glyph is five rows of three bits, high bit on the left. Characters
//! advance 4px horizontally and lines advance 6px, matching PICO-8 `print`.
//! Lowercase letters render with the uppercase shapes.

use super::PixelBuffer;
use crate::palette::Rgba;

pub const GLYPH_WIDTH: u32 = 3;
pub const GLYPH_HEIGHT: u32 = 5;
pub const CHAR_ADVANCE: i32 = 4;
pub const LINE_ADVANCE: i32 = 6;

/// Glyphs for ASCII 32 (space) through 95 (underscore)
const GLYPHS: [[u8; 5]; 64] = [
    [0b000, 0b000, 0b000, 0b000, 0b000], // ' '
    [0b010, 0b010, 0b010, 0b000, 0b010], // !
    [0b101, 0b101, 0b000, 0b000, 0b000], // "
    [0b101, 0b111, 0b101, 0b111, 0b101], // #
    [0b111, 0b110, 0b011, 0b111, 0b010], // $
    [0b101, 0b001, 0b010, 0b100, 0b101], // %
    [0b110, 0b110, 0b011, 0b101, 0b111], // &
    [0b010, 0b100, 0b000, 0b000, 0b000], // '
    [0b010, 0b100, 0b100, 0b100, 0b010], // (
    [0b010, 0b001, 0b001, 0b001, 0b010], // )
    [0b101, 0b010, 0b111, 0b010, 0b101], // *
    [0b000, 0b010, 0b111, 0b010, 0b000], // +
    [0b000, 0b000, 0b000, 0b010, 0b100], // ,
    [0b000, 0b000, 0b111, 0b000, 0b000], // -
    [0b000, 0b000, 0b000, 0b000, 0b010], // .
    [0b001, 0b010, 0b010, 0b010, 0b100], // /
    [0b111, 0b101, 0b101, 0b101, 0b111], // 0
    [0b110, 0b010, 0b010, 0b010, 0b111], // 1
    [0b111, 0b001, 0b111, 0b100, 0b111], // 2
    [0b111, 0b001, 0b011, 0b001, 0b111], // 3
    [0b101, 0b101, 0b111, 0b001, 0b001], // 4
    [0b111, 0b100, 0b111, 0b001, 0b111], // 5
    [0b100, 0b100, 0b111, 0b101, 0b111], // 6
    [0b111, 0b001, 0b001, 0b001, 0b001], // 7
    [0b111, 0b101, 0b111, 0b101, 0b111], // 8
    [0b111, 0b101, 0b111, 0b001, 0b001], // 9
    [0b000, 0b010, 0b000, 0b010, 0b000], // :
    [0b000, 0b010, 0b000, 0b010, 0b100], // ;
    [0b001, 0b010, 0b100, 0b010, 0b001], // <
    [0b000, 0b111, 0b000, 0b111, 0b000], // =
    [0b100, 0b010, 0b001, 0b010, 0b100], // >
    [0b111, 0b001, 0b011, 0b000, 0b010], // ?
    [0b010, 0b101, 0b101, 0b100, 0b011], // @
    [0b111, 0b101, 0b111, 0b101, 0b101], // A
    [0b111, 0b101, 0b110, 0b101, 0b111], // B
    [0b011, 0b100, 0b100, 0b100, 0b011], // C
    [0b110, 0b101, 0b101, 0b101, 0b111], // D
    [0b111, 0b100, 0b110, 0b100, 0b111], // E
    [0b111, 0b100, 0b110, 0b100, 0b100], // F
    [0b011, 0b100, 0b100, 0b101, 0b111], // G
    [0b101, 0b101, 0b111, 0b101, 0b101], // H
    [0b111, 0b010, 0b010, 0b010, 0b111], // I
    [0b111, 0b010, 0b010, 0b010, 0b110], // J
    [0b101, 0b101, 0b110, 0b101, 0b101], // K
    [0b100, 0b100, 0b100, 0b100, 0b111], // L
    [0b111, 0b111, 0b101, 0b101, 0b101], // M
    [0b110, 0b101, 0b101, 0b101, 0b101], // N
    [0b011, 0b101, 0b101, 0b101, 0b110], // O
    [0b111, 0b101, 0b111, 0b100, 0b100], // P
    [0b010, 0b101, 0b101, 0b110, 0b011], // Q
    [0b111, 0b101, 0b110, 0b101, 0b101], // R
    [0b011, 0b100, 0b111, 0b001, 0b110], // S
    [0b111, 0b010, 0b010, 0b010, 0b010], // T
    [0b101, 0b101, 0b101, 0b101, 0b011], // U
    [0b101, 0b101, 0b101, 0b111, 0b010], // V
    [0b101, 0b101, 0b101, 0b111, 0b111], // W
    [0b101, 0b101, 0b010, 0b101, 0b101], // X
    [0b101, 0b101, 0b111, 0b001, 0b111], // Y
    [0b111, 0b001, 0b010, 0b100, 0b111], // Z
    [0b110, 0b100, 0b100, 0b100, 0b110], // [
    [0b100, 0b010, 0b010, 0b010, 0b001], // backslash
    [0b011, 0b001, 0b001, 0b001, 0b011], // ]
    [0b010, 0b101, 0b000, 0b000, 0b000], // ^
    [0b000, 0b000, 0b000, 0b000, 0b111], // _
];

/// Glyph rows for a character; unsupported characters render as '?'
pub fn get_glyph(ch: char) -> [u8; 5] {
    let ch = ch.to_ascii_uppercase();
    let code = ch as u32;
    if (32..96).contains(&code) {
        GLYPHS[(code - 32) as usize]
    } else {
        GLYPHS[('?' as u32 - 32) as usize]
    }
}

/// Draw text with the top-left of the first glyph at (x, y).
/// Returns the x coordinate after the last character of the last line.
pub fn draw_text(buffer: &mut PixelBuffer, x: i32, y: i32, text: &str, color: Rgba) -> i32 {
    let mut cx = x;
    let mut cy = y;
    for ch in text.chars() {
        if ch == '\n' {
            cx = x;
            cy += LINE_ADVANCE;
            continue;
        }
        let glyph = get_glyph(ch);
        for (row, bits) in glyph.iter().enumerate() {
            for col in 0..GLYPH_WIDTH {
                if bits & (0b100 >> col) != 0 {
                    buffer.set_pixel(cx + col as i32, cy + row as i32, color);
                }
            }
        }
        cx += CHAR_ADVANCE;
    }
    cx
}

/// Width in pixels of the longest line of `text`
pub fn text_width(text: &str) -> u32 {
    text.lines()
        .map(|line| line.chars().count() as u32 * CHAR_ADVANCE as u32)
        .max()
        .unwrap_or(0)
}
