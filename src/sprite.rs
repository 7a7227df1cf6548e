//! Sprite bank: the 128x128 spritesheet split into 8x8 backend images

use crate::texture::SpriteImage;

pub const SPRITE_SIZE: u32 = 8;
pub const SHEET_SIZE: u32 = 128;
pub const SPRITES_PER_ROW: u32 = SHEET_SIZE / SPRITE_SIZE;
pub const SPRITE_COUNT: usize = (SPRITES_PER_ROW * SPRITES_PER_ROW) as usize;

/// Opaque handle of a backend sprite image.
///
/// Handles are never reused: reloading the sheet hands out fresh ones, so
/// work queued against an old image cannot land on a new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SpriteHandle(u32);

impl SpriteHandle {
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }
}

/// Sprite images and their flags, indexed by sprite id
pub struct SpriteBank {
    images: Vec<SpriteImage>,
    handles: Vec<SpriteHandle>,
    flags: [u8; SPRITE_COUNT],
    next_handle: u32,
}

impl SpriteBank {
    /// 256 blank sprites
    pub fn new() -> Self {
        let mut bank = Self {
            images: Vec::with_capacity(SPRITE_COUNT),
            handles: Vec::with_capacity(SPRITE_COUNT),
            flags: [0; SPRITE_COUNT],
            next_handle: 1,
        };
        bank.load_blank();
        bank
    }

    fn load_blank(&mut self) {
        self.images.clear();
        self.handles.clear();
        for _ in 0..SPRITE_COUNT {
            self.images.push(SpriteImage::new(SPRITE_SIZE, SPRITE_SIZE));
            self.handles.push(SpriteHandle(self.next_handle));
            self.next_handle += 1;
        }
    }

    /// Replace every image from a 128x128 RGBA sheet. Returns false (and keeps
    /// the current images) when the sheet has the wrong size.
    pub fn load_sheet(&mut self, rgba: &[u8]) -> bool {
        if rgba.len() != (SHEET_SIZE * SHEET_SIZE * 4) as usize {
            return false;
        }
        self.load_blank();
        let row_bytes = (SPRITE_SIZE * 4) as usize;
        for (id, image) in self.images.iter_mut().enumerate() {
            let sx = (id as u32 % SPRITES_PER_ROW) * SPRITE_SIZE;
            let sy = (id as u32 / SPRITES_PER_ROW) * SPRITE_SIZE;
            let mut data = Vec::with_capacity(row_bytes * SPRITE_SIZE as usize);
            for row in 0..SPRITE_SIZE {
                let start = (((sy + row) * SHEET_SIZE + sx) * 4) as usize;
                data.extend_from_slice(&rgba[start..start + row_bytes]);
            }
            if let Some(loaded) = SpriteImage::from_rgba(SPRITE_SIZE, SPRITE_SIZE, data) {
                *image = loaded;
            }
        }
        true
    }

    pub fn handle(&self, id: usize) -> Option<SpriteHandle> {
        self.handles.get(id).copied()
    }

    pub fn image_mut(&mut self, id: usize) -> Option<&mut SpriteImage> {
        self.images.get_mut(id)
    }

    pub fn image(&self, id: usize) -> Option<&SpriteImage> {
        self.images.get(id)
    }

    /// Map spritesheet coordinates to (sprite id, local x, local y)
    pub fn locate(x: i32, y: i32) -> Option<(usize, u32, u32)> {
        if x < 0 || y < 0 || x >= SHEET_SIZE as i32 || y >= SHEET_SIZE as i32 {
            return None;
        }
        let (x, y) = (x as u32, y as u32);
        let id = (y / SPRITE_SIZE) * SPRITES_PER_ROW + x / SPRITE_SIZE;
        Some((id as usize, x % SPRITE_SIZE, y % SPRITE_SIZE))
    }

    /// All flags of a sprite, or one bit of them
    pub fn flag(&self, id: usize, bit: Option<u8>) -> u8 {
        let Some(&flags) = self.flags.get(id) else {
            return 0;
        };
        match bit {
            Some(b) if b < 8 => (flags >> b) & 1,
            Some(_) => 0,
            None => flags,
        }
    }

    pub fn set_flag(&mut self, id: usize, bit: Option<u8>, value: u8) {
        let Some(flags) = self.flags.get_mut(id) else {
            return;
        };
        match bit {
            Some(b) if b < 8 => {
                if value != 0 {
                    *flags |= 1 << b;
                } else {
                    *flags &= !(1 << b);
                }
            },
            Some(_) => {},
            None => *flags = value,
        }
    }
}

impl Default for SpriteBank {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locate_maps_sheet_coords() {
        assert_eq!(SpriteBank::locate(0, 0), Some((0, 0, 0)));
        assert_eq!(SpriteBank::locate(9, 3), Some((1, 1, 3)));
        assert_eq!(SpriteBank::locate(127, 127), Some((255, 7, 7)));
        assert_eq!(SpriteBank::locate(128, 0), None);
        assert_eq!(SpriteBank::locate(0, -1), None);
    }

    #[test]
    fn test_reload_issues_fresh_handles() {
        let mut bank = SpriteBank::new();
        let before = bank.handle(0);
        assert!(bank.load_sheet(&vec![0u8; (SHEET_SIZE * SHEET_SIZE * 4) as usize]));
        assert_ne!(bank.handle(0), before);
        assert_eq!(bank.handle(SPRITE_COUNT), None);
    }

    #[test]
    fn test_load_sheet_rejects_wrong_size() {
        let mut bank = SpriteBank::new();
        let before = bank.handle(7);
        assert!(!bank.load_sheet(&[0u8; 16]));
        assert_eq!(bank.handle(7), before);
    }

    #[test]
    fn test_load_sheet_splits_cells() {
        let mut sheet = vec![0u8; (SHEET_SIZE * SHEET_SIZE * 4) as usize];
        // Pixel (9, 2) belongs to sprite 1 at local (1, 2)
        let idx = ((2 * SHEET_SIZE + 9) * 4) as usize;
        sheet[idx..idx + 4].copy_from_slice(&[255, 0, 77, 255]);
        let mut bank = SpriteBank::new();
        bank.load_sheet(&sheet);

        let image = bank.image_mut(1).unwrap();
        let mut out = vec![0u8; image.byte_len()];
        image.read_into(&mut out);
        let local = ((2 * SPRITE_SIZE + 1) * 4) as usize;
        assert_eq!(&out[local..local + 4], &[255, 0, 77, 255]);
    }

    #[test]
    fn test_flags_bit_and_mask() {
        let mut bank = SpriteBank::new();
        bank.set_flag(4, Some(2), 1);
        assert_eq!(bank.flag(4, Some(2)), 1);
        assert_eq!(bank.flag(4, None), 0b100);
        bank.set_flag(4, None, 0b1010_0000);
        assert_eq!(bank.flag(4, Some(7)), 1);
        assert_eq!(bank.flag(4, Some(2)), 0);
        assert_eq!(bank.flag(999, None), 0);
    }
}
