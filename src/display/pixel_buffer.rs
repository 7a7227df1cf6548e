use super::{DEFAULT_HEIGHT, DEFAULT_WIDTH};
use crate::palette::{self, Rgba};

// ============================================================================
// Utility Functions
// ============================================================================

/// Write an RGBA pixel to a 4-byte slice
#[inline]
fn write_pixel(dest: &mut [u8], color: Rgba) {
    dest.copy_from_slice(&color);
}

// ============================================================================
// PixelBuffer
// ============================================================================

/// RGBA pixel buffer backing the virtual screen.
///
/// Bytes are stored R, G, B, A. Every write marks the buffer dirty; the host
/// checks `is_dirty()` once per frame to decide whether to re-upload it and
/// calls `clear_dirty()` after presenting.
pub struct PixelBuffer {
    pixels: Vec<u8>,
    width: u32,
    height: u32,
    dirty: bool,
}

impl PixelBuffer {
    /// Create a new pixel buffer with default resolution (128x128)
    pub fn new() -> Self {
        Self::with_size(DEFAULT_WIDTH, DEFAULT_HEIGHT)
    }

    /// Create a zero-filled, clean pixel buffer
    pub fn with_size(width: u32, height: u32) -> Self {
        let (width, height, pixels) = palette::rgba_storage(width, height);
        Self {
            pixels,
            width,
            height,
            dirty: false,
        }
    }

    /// Reallocate for a new resolution, discarding prior contents.
    /// A size too large to address becomes 0x0.
    pub fn init(&mut self, width: u32, height: u32) {
        let (width, height, pixels) = palette::rgba_storage(width, height);
        self.pixels = pixels;
        self.width = width;
        self.height = height;
        self.dirty = false;
    }

    /// Same contract as `init`
    pub fn resize(&mut self, width: u32, height: u32) {
        self.init(width, height);
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Called by the host after uploading the buffer
    #[inline]
    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    /// Check if coordinates are within bounds
    #[inline]
    fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && x < self.width as i32 && y >= 0 && y < self.height as i32
    }

    /// Calculate byte offset for pixel at (x, y)
    #[inline]
    fn pixel_index(&self, x: u32, y: u32) -> usize {
        ((y * self.width + x) * 4) as usize
    }

    /// Clear to a solid color
    /// Optimized: uses u32 fill for maximum speed
    pub fn clear(&mut self, color: Rgba) {
        let pixel = u32::from_ne_bytes(color);

        // Safety: pixels.len() is always divisible by 4 (width * height * 4).
        // We use write_unaligned to avoid assuming alignment of Vec<u8>.
        let ptr = self.pixels.as_mut_ptr() as *mut u32;
        let len = self.pixels.len() / 4;
        for i in 0..len {
            // Safety: i < len keeps every write inside the allocation
            unsafe {
                ptr.add(i).write_unaligned(pixel);
            }
        }
        self.dirty = true;
    }

    /// Set a single pixel (bounds checked, out of range is a no-op)
    #[inline]
    pub fn set_pixel(&mut self, x: i32, y: i32, color: Rgba) {
        if self.in_bounds(x, y) {
            let idx = self.pixel_index(x as u32, y as u32);
            write_pixel(&mut self.pixels[idx..idx + 4], color);
            self.dirty = true;
        }
    }

    /// Read a pixel from the buffer (bounds checked)
    #[inline]
    pub fn get_pixel(&self, x: i32, y: i32) -> Option<Rgba> {
        if self.in_bounds(x, y) {
            let idx = self.pixel_index(x as u32, y as u32);
            let mut out = [0u8; 4];
            out.copy_from_slice(&self.pixels[idx..idx + 4]);
            Some(out)
        } else {
            None
        }
    }

    /// Draw a horizontal line
    /// Computes the starting index once, then increments by 4
    pub fn hline(&mut self, x1: i32, x2: i32, y: i32, color: Rgba) {
        if y < 0 || y >= self.height as i32 {
            return;
        }
        let (x1, x2) = if x1 <= x2 { (x1, x2) } else { (x2, x1) };
        let start = x1.max(0);
        let end = x2.min(self.width as i32 - 1);
        if start > end {
            return;
        }

        let mut idx = self.pixel_index(start as u32, y as u32);
        for _ in start..=end {
            write_pixel(&mut self.pixels[idx..idx + 4], color);
            idx += 4;
        }
        self.dirty = true;
    }

    /// Draw a vertical line
    pub fn vline(&mut self, x: i32, y1: i32, y2: i32, color: Rgba) {
        if x < 0 || x >= self.width as i32 {
            return;
        }
        let (y1, y2) = if y1 <= y2 { (y1, y2) } else { (y2, y1) };
        let start = y1.max(0);
        let end = y2.min(self.height as i32 - 1);
        if start > end {
            return;
        }

        // Stride is width * 4 bytes per row
        let stride = (self.width * 4) as usize;
        let mut idx = self.pixel_index(x as u32, start as u32);
        for _ in start..=end {
            write_pixel(&mut self.pixels[idx..idx + 4], color);
            idx += stride;
        }
        self.dirty = true;
    }

    /// Draw a line using Bresenham's algorithm with Cohen-Sutherland clipping
    pub fn line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Rgba) {
        let Some((cx0, cy0, cx1, cy1)) = self.clip_line(x0, y0, x1, y1) else {
            return;
        };

        let dx = (cx1 - cx0).abs();
        let dy = -((cy1 - cy0).abs());
        let sx = if cx0 < cx1 { 1i32 } else { -1i32 };
        let sy = if cy0 < cy1 { 1i32 } else { -1i32 };
        let mut err = dx + dy;
        let mut x = cx0;
        let mut y = cy0;

        loop {
            self.set_pixel(x, y, color);
            if x == cx1 && y == cy1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    /// Cohen-Sutherland line clipping
    /// Returns the clipped endpoints, or None if the line is fully outside
    fn clip_line(
        &self,
        mut x0: i32,
        mut y0: i32,
        mut x1: i32,
        mut y1: i32,
    ) -> Option<(i32, i32, i32, i32)> {
        const INSIDE: u8 = 0;
        const LEFT: u8 = 1;
        const RIGHT: u8 = 2;
        const BOTTOM: u8 = 4;
        const TOP: u8 = 8;
        // Converges in at most 4 iterations for valid input
        const MAX_ITERATIONS: u32 = 16;

        let w = self.width as i32;
        let h = self.height as i32;
        if w == 0 || h == 0 {
            return None;
        }

        let outcode = |x: i32, y: i32| -> u8 {
            let mut code = INSIDE;
            if x < 0 {
                code |= LEFT;
            } else if x >= w {
                code |= RIGHT;
            }
            if y < 0 {
                code |= TOP;
            } else if y >= h {
                code |= BOTTOM;
            }
            code
        };

        let mut code0 = outcode(x0, y0);
        let mut code1 = outcode(x1, y1);

        for _ in 0..MAX_ITERATIONS {
            if (code0 | code1) == 0 {
                return Some((x0, y0, x1, y1));
            }
            if (code0 & code1) != 0 {
                return None;
            }

            let code_out = if code0 != 0 { code0 } else { code1 };
            let dy = y1 - y0;
            let dx = x1 - x0;

            let (x, y) = if (code_out & BOTTOM) != 0 {
                if dy == 0 {
                    return None;
                }
                (x0 + dx * (h - 1 - y0) / dy, h - 1)
            } else if (code_out & TOP) != 0 {
                if dy == 0 {
                    return None;
                }
                (x0 + dx * (0 - y0) / dy, 0)
            } else if (code_out & RIGHT) != 0 {
                if dx == 0 {
                    return None;
                }
                (w - 1, y0 + dy * (w - 1 - x0) / dx)
            } else {
                if dx == 0 {
                    return None;
                }
                (0, y0 + dy * (0 - x0) / dx)
            };

            if code_out == code0 {
                x0 = x;
                y0 = y;
                code0 = outcode(x0, y0);
            } else {
                x1 = x;
                y1 = y;
                code1 = outcode(x1, y1);
            }
        }

        None
    }

    /// Fill the rectangle spanned by two inclusive corners
    pub fn fill_rect(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Rgba) {
        let (top, bottom) = if y0 <= y1 { (y0, y1) } else { (y1, y0) };
        for y in top.max(0)..=bottom.min(self.height as i32 - 1) {
            self.hline(x0, x1, y, color);
        }
    }

    /// Outline the rectangle spanned by two inclusive corners
    pub fn rect(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Rgba) {
        self.hline(x0, x1, y0, color);
        self.hline(x0, x1, y1, color);
        self.vline(x0, y0, y1, color);
        self.vline(x1, y0, y1, color);
    }

    /// Draw a filled circle using horizontal spans
    pub fn fill_circle(&mut self, cx: i32, cy: i32, radius: i32, color: Rgba) {
        if radius <= 0 {
            if radius == 0 {
                self.set_pixel(cx, cy, color);
            }
            return;
        }

        // Midpoint circle algorithm with span filling
        let mut x = radius;
        let mut y = 0;
        let mut err = 1 - radius;

        while x >= y {
            self.hline(cx - x, cx + x, cy + y, color);
            if y != 0 {
                self.hline(cx - x, cx + x, cy - y, color);
            }
            if x != y {
                self.hline(cx - y, cx + y, cy + x, color);
                if y != 0 {
                    self.hline(cx - y, cx + y, cy - x, color);
                }
            }

            y += 1;
            if err < 0 {
                err += 2 * y + 1;
            } else {
                x -= 1;
                err += 2 * (y - x) + 1;
            }
        }
    }

    /// Draw a circle outline (1px thick)
    pub fn draw_circle(&mut self, cx: i32, cy: i32, radius: i32, color: Rgba) {
        if radius < 0 {
            return;
        }
        let mut x = radius;
        let mut y = 0;
        let mut err = 0;

        while x >= y {
            self.set_pixel(cx + x, cy + y, color);
            self.set_pixel(cx + y, cy + x, color);
            self.set_pixel(cx - y, cy + x, color);
            self.set_pixel(cx - x, cy + y, color);
            self.set_pixel(cx - x, cy - y, color);
            self.set_pixel(cx - y, cy - x, color);
            self.set_pixel(cx + y, cy - x, color);
            self.set_pixel(cx + x, cy - y, color);

            y += 1;
            err += 1 + 2 * y;
            if 2 * (err - x) + 1 > 0 {
                x -= 1;
                err += 1 - 2 * x;
            }
        }
    }

    /// Raw bytes for backend upload and screen cache rebuilds
    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }
}

impl Default for PixelBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgba = [255, 0, 77, 255];

    #[test]
    fn test_init_sizes_buffer_and_clears_dirty() {
        for (w, h) in [(1, 1), (128, 128), (320, 7)] {
            let buffer = PixelBuffer::with_size(w, h);
            assert_eq!(buffer.as_bytes().len(), (w * h * 4) as usize);
            assert!(!buffer.is_dirty());
        }
    }

    #[test]
    fn test_set_pixel_marks_dirty_and_writes_rgba() {
        let mut buffer = PixelBuffer::with_size(4, 4);
        buffer.set_pixel(1, 2, RED);
        assert!(buffer.is_dirty());
        let idx = (2 * 4 + 1) * 4;
        assert_eq!(&buffer.as_bytes()[idx..idx + 4], &RED);
        assert_eq!(buffer.get_pixel(1, 2), Some(RED));
    }

    #[test]
    fn test_unaddressable_size_collapses_to_empty() {
        let mut buffer = PixelBuffer::with_size(u32::MAX, u32::MAX);
        assert_eq!((buffer.width(), buffer.height()), (0, 0));
        assert!(buffer.as_bytes().is_empty());
        buffer.set_pixel(0, 0, [255, 0, 0, 255]);
        buffer.clear([1, 2, 3, 255]);
        assert_eq!(buffer.get_pixel(0, 0), None);
    }

    #[test]
    fn test_out_of_range_write_is_noop() {
        let mut buffer = PixelBuffer::with_size(4, 4);
        buffer.set_pixel(-1, 0, RED);
        buffer.set_pixel(4, 0, RED);
        buffer.set_pixel(0, 99, RED);
        assert!(!buffer.is_dirty());
        assert!(buffer.as_bytes().iter().all(|&b| b == 0));
        assert_eq!(buffer.get_pixel(4, 4), None);
    }

    #[test]
    fn test_resize_discards_contents_and_dirty() {
        let mut buffer = PixelBuffer::with_size(4, 4);
        buffer.set_pixel(0, 0, RED);
        buffer.resize(8, 2);
        assert_eq!(buffer.width(), 8);
        assert_eq!(buffer.height(), 2);
        assert_eq!(buffer.as_bytes().len(), 8 * 2 * 4);
        assert!(!buffer.is_dirty());
        assert_eq!(buffer.get_pixel(0, 0), Some([0, 0, 0, 0]));
    }

    #[test]
    fn test_clear_dirty_after_present() {
        let mut buffer = PixelBuffer::with_size(2, 2);
        buffer.clear(RED);
        assert!(buffer.is_dirty());
        buffer.clear_dirty();
        assert!(!buffer.is_dirty());
        assert_eq!(buffer.get_pixel(1, 1), Some(RED));
    }

    #[test]
    fn test_line_is_clipped() {
        let mut buffer = PixelBuffer::with_size(8, 8);
        buffer.line(-10, 3, 20, 3, RED);
        for x in 0..8 {
            assert_eq!(buffer.get_pixel(x, 3), Some(RED));
        }
        assert_eq!(buffer.get_pixel(0, 2), Some([0, 0, 0, 0]));
    }

    #[test]
    fn test_rect_outline_leaves_interior() {
        let mut buffer = PixelBuffer::with_size(8, 8);
        buffer.rect(1, 1, 5, 5, RED);
        assert_eq!(buffer.get_pixel(1, 1), Some(RED));
        assert_eq!(buffer.get_pixel(5, 3), Some(RED));
        assert_eq!(buffer.get_pixel(3, 3), Some([0, 0, 0, 0]));
    }

    #[test]
    fn test_fill_circle_covers_centre_and_radius() {
        let mut buffer = PixelBuffer::with_size(16, 16);
        buffer.fill_circle(8, 8, 3, RED);
        assert_eq!(buffer.get_pixel(8, 8), Some(RED));
        assert_eq!(buffer.get_pixel(11, 8), Some(RED));
        assert_eq!(buffer.get_pixel(12, 8), Some([0, 0, 0, 0]));
    }
}
