//! Backend sprite images
//!
//! A `SpriteImage` stands in for a texture owned by the graphics backend.
//! It counts the uploads (batched pixel writes) and readbacks it has served.

use crate::palette::{self, Rgba};

/// One pending write into a sprite image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelWrite {
    pub x: u32,
    pub y: u32,
    pub color: Rgba,
}

/// An RGBA image held by the backend
#[derive(Clone)]
pub struct SpriteImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>, // RGBA format, 4 bytes per pixel
    uploads: u64,
    readbacks: u64,
}

impl SpriteImage {
    /// Create a new transparent image
    pub fn new(width: u32, height: u32) -> Self {
        let (width, height, pixels) = palette::rgba_storage(width, height);
        Self {
            width,
            height,
            pixels,
            uploads: 0,
            readbacks: 0,
        }
    }

    /// Create image from raw RGBA data
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Option<Self> {
        if palette::rgba_len(width, height) == Some(data.len()) {
            Some(Self {
                width,
                height,
                pixels: data,
                uploads: 0,
                readbacks: 0,
            })
        } else {
            None
        }
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
    pub fn byte_len(&self) -> usize {
        self.pixels.len()
    }

    /// Apply a batch of writes as a single upload. Later writes to the same
    /// pixel override earlier ones; out-of-range writes are skipped.
    pub fn write_batch(&mut self, writes: &[PixelWrite]) {
        if writes.is_empty() {
            return;
        }
        for w in writes {
            if w.x < self.width && w.y < self.height {
                let idx = ((w.y * self.width + w.x) * 4) as usize;
                self.pixels[idx..idx + 4].copy_from_slice(&w.color);
            }
        }
        self.uploads += 1;
    }

    /// Copy the whole image into `dest` (one readback)
    pub fn read_into(&mut self, dest: &mut [u8]) {
        let n = dest.len().min(self.pixels.len());
        dest[..n].copy_from_slice(&self.pixels[..n]);
        self.readbacks += 1;
    }

    /// Number of batched uploads applied so far
    pub fn upload_count(&self) -> u64 {
        self.uploads
    }

    /// Number of full readbacks served so far
    pub fn readback_count(&self) -> u64 {
        self.readbacks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rgba_checks_length() {
        assert!(SpriteImage::from_rgba(2, 2, vec![0; 16]).is_some());
        assert!(SpriteImage::from_rgba(2, 2, vec![0; 15]).is_none());
    }

    #[test]
    fn test_write_batch_is_one_upload_and_last_write_wins() {
        let mut img = SpriteImage::new(4, 4);
        img.write_batch(&[
            PixelWrite { x: 1, y: 1, color: [1, 1, 1, 255] },
            PixelWrite { x: 1, y: 1, color: [2, 2, 2, 255] },
            PixelWrite { x: 9, y: 9, color: [3, 3, 3, 255] },
        ]);
        assert_eq!(img.upload_count(), 1);

        let mut out = vec![0u8; img.byte_len()];
        img.read_into(&mut out);
        let idx = (4 + 1) * 4;
        assert_eq!(&out[idx..idx + 4], &[2, 2, 2, 255]);
        assert_eq!(img.readback_count(), 1);
    }

    #[test]
    fn test_empty_batch_does_not_upload() {
        let mut img = SpriteImage::new(1, 1);
        img.write_batch(&[]);
        assert_eq!(img.upload_count(), 0);
    }
}
