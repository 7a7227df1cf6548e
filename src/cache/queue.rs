//! Batched sprite pixel writes

use std::collections::HashMap;

use parking_lot::RwLock;
use tracing::trace;

use crate::palette::Rgba;
use crate::sprite::SpriteHandle;
use crate::texture::{PixelWrite, SpriteImage};

/// Pending writes per sprite image, applied as one upload per flush.
///
/// The list for a handle is append-only until it is flushed; nothing is
/// dropped when it grows.
#[derive(Default)]
pub struct SpriteModificationQueue {
    pending: RwLock<HashMap<SpriteHandle, Vec<PixelWrite>>>,
}

impl SpriteModificationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&self, handle: SpriteHandle, x: u32, y: u32, color: Rgba) {
        self.pending
            .write()
            .entry(handle)
            .or_default()
            .push(PixelWrite { x, y, color });
    }

    /// Apply all pending writes for `handle` to `image` in enqueue order and
    /// clear the list. Returns the number of writes applied.
    pub fn flush(&self, handle: SpriteHandle, image: &mut SpriteImage) -> usize {
        let writes = {
            let mut pending = self.pending.write();
            match pending.get_mut(&handle) {
                Some(list) if !list.is_empty() => std::mem::take(list),
                _ => return 0,
            }
        };
        image.write_batch(&writes);
        trace!(?handle, writes = writes.len(), "sprite queue flushed");
        writes.len()
    }

    /// Pending write count for one handle
    pub fn pending(&self, handle: SpriteHandle) -> usize {
        self.pending.read().get(&handle).map_or(0, Vec::len)
    }

    pub fn has_pending(&self, handle: SpriteHandle) -> bool {
        self.pending(handle) > 0
    }

    pub fn total_pending(&self) -> usize {
        self.pending.read().values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total_pending() == 0
    }

    /// Drop everything (the images the handles point at are gone)
    pub fn clear(&self) {
        self.pending.write().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: SpriteHandle = SpriteHandle::from_raw(1);
    const B: SpriteHandle = SpriteHandle::from_raw(2);

    fn pixel(img: &mut SpriteImage, x: u32, y: u32) -> Rgba {
        let mut out = vec![0u8; img.byte_len()];
        img.read_into(&mut out);
        let idx = ((y * img.width() + x) * 4) as usize;
        [out[idx], out[idx + 1], out[idx + 2], out[idx + 3]]
    }

    #[test]
    fn test_enqueue_does_not_touch_image() {
        let queue = SpriteModificationQueue::new();
        let img = SpriteImage::new(8, 8);
        queue.enqueue(A, 0, 0, [1, 2, 3, 255]);
        assert_eq!(queue.pending(A), 1);
        assert_eq!(img.upload_count(), 0);
    }

    #[test]
    fn test_last_write_wins_after_flush() {
        let queue = SpriteModificationQueue::new();
        let mut img = SpriteImage::new(8, 8);
        queue.enqueue(A, 3, 4, [10, 0, 0, 255]);
        queue.enqueue(A, 3, 4, [20, 0, 0, 255]);
        assert_eq!(queue.flush(A, &mut img), 2);
        assert_eq!(pixel(&mut img, 3, 4), [20, 0, 0, 255]);
        assert_eq!(queue.pending(A), 0);
    }

    #[test]
    fn test_many_writes_coalesce_into_one_upload() {
        let queue = SpriteModificationQueue::new();
        let mut img = SpriteImage::new(8, 8);
        for i in 0..64 {
            queue.enqueue(A, i % 8, i / 8, [i as u8, 0, 0, 255]);
        }
        queue.flush(A, &mut img);
        assert_eq!(img.upload_count(), 1);
        // Nothing left: second flush is free
        assert_eq!(queue.flush(A, &mut img), 0);
        assert_eq!(img.upload_count(), 1);
    }

    #[test]
    fn test_handles_are_independent() {
        let queue = SpriteModificationQueue::new();
        let mut img = SpriteImage::new(8, 8);
        queue.enqueue(A, 0, 0, [1, 1, 1, 255]);
        queue.enqueue(B, 0, 0, [2, 2, 2, 255]);
        queue.flush(A, &mut img);
        assert_eq!(queue.pending(B), 1);
        assert_eq!(queue.total_pending(), 1);
    }

    #[test]
    fn test_enqueue_keeps_appending_until_flush() {
        let queue = SpriteModificationQueue::new();
        for i in 0..10_000u32 {
            queue.enqueue(A, i % 8, 0, [0, 0, 0, 255]);
        }
        assert_eq!(queue.pending(A), 10_000);
        queue.clear();
        assert!(queue.is_empty());
    }

    #[test]
    fn test_concurrent_enqueue_preserves_count() {
        let queue = SpriteModificationQueue::new();
        std::thread::scope(|s| {
            for t in 0..4u8 {
                let queue = &queue;
                s.spawn(move || {
                    for i in 0..250u32 {
                        queue.enqueue(A, i % 8, 0, [t, 0, 0, 255]);
                    }
                });
            }
        });
        assert_eq!(queue.pending(A), 1000);
    }
}
