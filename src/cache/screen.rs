//! Mirror of the composited screen used to answer pixel reads

use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::palette::{self, Rgba};

/// Read-only snapshot of the screen cache
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenCacheStats {
    pub width: u32,
    pub height: u32,
    pub valid: bool,
    pub byte_size: usize,
}

struct Inner {
    width: u32,
    height: u32,
    bytes: Vec<u8>,
    valid: bool,
}

/// Lazily rebuilt copy of the screen.
///
/// Every draw invalidates it; the next pixel query rebuilds it from the
/// pixel buffer. Readers share the lock; invalidate and rebuild take it
/// exclusively.
pub struct ScreenPixelCache {
    inner: RwLock<Inner>,
}

impl ScreenPixelCache {
    pub fn new(width: u32, height: u32) -> Self {
        let (width, height, bytes) = palette::rgba_storage(width, height);
        Self {
            inner: RwLock::new(Inner {
                width,
                height,
                bytes,
                valid: false,
            }),
        }
    }

    /// Reallocate for a new screen size and mark invalid
    pub fn init(&self, width: u32, height: u32) {
        let (width, height, bytes) = palette::rgba_storage(width, height);
        let mut inner = self.inner.write();
        inner.width = width;
        inner.height = height;
        inner.bytes = bytes;
        inner.valid = false;
    }

    pub fn invalidate(&self) {
        self.inner.write().valid = false;
    }

    pub fn is_valid(&self) -> bool {
        self.inner.read().valid
    }

    /// Copy the composited screen into the cache. Skipped when already valid.
    pub fn rebuild(&self, width: u32, height: u32, source: &[u8]) {
        if self.inner.read().valid {
            return;
        }
        let mut inner = self.inner.write();
        // Another writer may have rebuilt between the two locks
        if inner.valid {
            return;
        }
        if inner.width != width || inner.height != height || inner.bytes.len() != source.len() {
            warn!(
                cache_w = inner.width,
                cache_h = inner.height,
                width,
                height,
                "screen cache size does not match screen, reallocating"
            );
            inner.width = width;
            inner.height = height;
            inner.bytes = vec![0; source.len()];
        }
        inner.bytes.copy_from_slice(source);
        inner.valid = true;
        debug!(bytes = source.len(), "screen cache rebuilt");
    }

    /// Cached pixel, or None on a miss (invalid cache or out of range)
    pub fn pixel(&self, x: i32, y: i32) -> Option<Rgba> {
        let inner = self.inner.read();
        if !inner.valid || x < 0 || y < 0 || x >= inner.width as i32 || y >= inner.height as i32 {
            return None;
        }
        let idx = ((y as u32 * inner.width + x as u32) * 4) as usize;
        let mut out = [0u8; 4];
        out.copy_from_slice(&inner.bytes[idx..idx + 4]);
        Some(out)
    }

    pub fn stats(&self) -> ScreenCacheStats {
        let inner = self.inner.read();
        ScreenCacheStats {
            width: inner.width,
            height: inner.height,
            valid: inner.valid,
            byte_size: inner.bytes.len(),
        }
    }
}
