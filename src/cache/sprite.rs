//! Per-sprite pixel cache

use parking_lot::RwLock;
use tracing::debug;

use crate::palette::{self, Rgba};

/// Default slot count: one per PICO-8 sprite id
pub const DEFAULT_SPRITE_SLOTS: usize = 256;

/// Diagnostic counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SpriteCacheStats {
    pub sprite_count: usize,
    pub valid_count: usize,
    pub byte_size: usize,
}

struct Entry {
    width: u32,
    height: u32,
    bytes: Vec<u8>,
    valid: bool,
}

impl Entry {
    fn new(width: u32, height: u32) -> Self {
        let (width, height, bytes) = palette::rgba_storage(width, height);
        Self {
            width,
            height,
            bytes,
            valid: false,
        }
    }
}

/// Sprite id -> cached RGBA bytes.
///
/// Slots live in a fixed array sized at construction, so steady-state
/// lookups never grow the map. Ids past the capacity are never cached.
pub struct SpritePixelCache {
    slots: RwLock<Vec<Option<Entry>>>,
}

impl SpritePixelCache {
    pub fn with_capacity(capacity: usize) -> Self {
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || None);
        Self {
            slots: RwLock::new(slots),
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.read().len()
    }

    /// Allocate an entry for `id` sized to the sprite, not yet populated
    pub fn init(&self, id: usize, width: u32, height: u32) {
        let mut slots = self.slots.write();
        if let Some(slot) = slots.get_mut(id) {
            *slot = Some(Entry::new(width, height));
        }
    }

    /// Mark one entry stale. Other entries are untouched.
    pub fn invalidate(&self, id: usize) {
        let mut slots = self.slots.write();
        if let Some(Some(entry)) = slots.get_mut(id) {
            entry.valid = false;
        }
    }

    /// Drop every entry (spritesheet reload)
    pub fn clear_all(&self) {
        let mut slots = self.slots.write();
        for slot in slots.iter_mut() {
            *slot = None;
        }
        debug!("sprite cache cleared");
    }

    pub fn is_valid(&self, id: usize) -> bool {
        matches!(self.slots.read().get(id), Some(Some(entry)) if entry.valid)
    }

    /// Cached pixel at sprite-local (x, y); None on a miss
    pub fn pixel(&self, id: usize, x: u32, y: u32) -> Option<Rgba> {
        let slots = self.slots.read();
        let entry = slots.get(id)?.as_ref()?;
        if !entry.valid || x >= entry.width || y >= entry.height {
            return None;
        }
        let idx = ((y * entry.width + x) * 4) as usize;
        let mut out = [0u8; 4];
        out.copy_from_slice(&entry.bytes[idx..idx + 4]);
        Some(out)
    }

    /// Run `visit` over the entry's bytes, filling it first with `fill` if it
    /// is missing or stale. Returns None for ids past the capacity.
    pub fn with_pixels<R>(
        &self,
        id: usize,
        width: u32,
        height: u32,
        fill: impl FnOnce(&mut [u8]),
        visit: impl FnOnce(&[u8]) -> R,
    ) -> Option<R> {
        {
            let slots = self.slots.read();
            match slots.get(id) {
                None => return None,
                Some(Some(entry))
                    if entry.valid && entry.width == width && entry.height == height =>
                {
                    return Some(visit(&entry.bytes));
                },
                Some(_) => {},
            }
        }

        let mut slots = self.slots.write();
        let slot = slots.get_mut(id)?;
        let sized = matches!(slot, Some(e) if e.width == width && e.height == height);
        if !sized {
            *slot = Some(Entry::new(width, height));
        }
        let entry = slot.as_mut()?;
        if !entry.valid {
            fill(&mut entry.bytes);
            entry.valid = true;
            debug!(sprite = id, "sprite cache entry filled");
        }
        Some(visit(&entry.bytes))
    }

    pub fn stats(&self) -> SpriteCacheStats {
        let slots = self.slots.read();
        slots
            .iter()
            .flatten()
            .fold(SpriteCacheStats::default(), |mut stats, entry| {
                stats.sprite_count += 1;
                if entry.valid {
                    stats.valid_count += 1;
                }
                stats.byte_size += entry.bytes.len();
                stats
            })
    }
}

impl Default for SpritePixelCache {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_SPRITE_SLOTS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fill_with(v: u8) -> impl FnOnce(&mut [u8]) {
        move |bytes: &mut [u8]| bytes.fill(v)
    }

    #[test]
    fn test_init_creates_invalid_entry() {
        let cache = SpritePixelCache::default();
        cache.init(3, 8, 8);
        assert!(!cache.is_valid(3));
        let stats = cache.stats();
        assert_eq!(stats.sprite_count, 1);
        assert_eq!(stats.valid_count, 0);
        assert_eq!(stats.byte_size, 8 * 8 * 4);
    }

    #[test]
    fn test_lazy_fill_on_first_read() {
        let cache = SpritePixelCache::default();
        let first = cache.with_pixels(5, 2, 2, fill_with(4), |b| b[0]);
        assert_eq!(first, Some(4));
        assert!(cache.is_valid(5));

        // Valid entry: fill must not run again
        let second = cache.with_pixels(5, 2, 2, |_| panic!("refilled"), |b| b[15]);
        assert_eq!(second, Some(4));
        assert_eq!(cache.pixel(5, 1, 1), Some([4, 4, 4, 4]));
    }

    #[test]
    fn test_invalidate_isolated_to_one_sprite() {
        let cache = SpritePixelCache::default();
        cache.with_pixels(1, 8, 8, fill_with(1), |_| ());
        cache.with_pixels(2, 8, 8, fill_with(2), |_| ());
        cache.invalidate(1);
        assert!(!cache.is_valid(1));
        assert!(cache.is_valid(2));
        assert_eq!(cache.pixel(1, 0, 0), None);
        assert_eq!(cache.pixel(2, 0, 0), Some([2, 2, 2, 2]));
    }

    #[test]
    fn test_refill_after_invalidate() {
        let cache = SpritePixelCache::default();
        cache.with_pixels(0, 1, 1, fill_with(1), |_| ());
        cache.invalidate(0);
        let v = cache.with_pixels(0, 1, 1, fill_with(9), |b| b[0]);
        assert_eq!(v, Some(9));
    }

    #[test]
    fn test_clear_all_leaves_no_entries() {
        let cache = SpritePixelCache::default();
        for id in 0..10 {
            cache.with_pixels(id, 8, 8, fill_with(0), |_| ());
        }
        cache.clear_all();
        assert_eq!(cache.stats(), SpriteCacheStats::default());
        assert_eq!(cache.capacity(), DEFAULT_SPRITE_SLOTS);
    }

    #[test]
    fn test_ids_past_capacity_are_ignored() {
        let cache = SpritePixelCache::with_capacity(4);
        assert_eq!(cache.with_pixels(4, 1, 1, fill_with(1), |b| b[0]), None);
        cache.init(10, 1, 1);
        cache.invalidate(10);
        assert_eq!(cache.stats().sprite_count, 0);
    }

    #[test]
    fn test_concurrent_readers_and_invalidator() {
        let cache = SpritePixelCache::default();
        for id in 0..8 {
            cache.with_pixels(id, 8, 8, fill_with(id as u8), |_| ());
        }
        std::thread::scope(|s| {
            s.spawn(|| {
                for round in 0..100 {
                    cache.invalidate(round % 8);
                }
            });
            for _ in 0..3 {
                s.spawn(|| {
                    for round in 0..100 {
                        let id = round % 8;
                        let v = cache.with_pixels(id, 8, 8, fill_with(id as u8), |b| b[0]);
                        assert_eq!(v, Some(id as u8));
                    }
                });
            }
        });
    }
}
