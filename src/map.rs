//! Tile map: 128x64 cells, each holding a sprite id

pub const MAP_WIDTH: usize = 128;
pub const MAP_HEIGHT: usize = 64;

pub struct TileMap {
    cells: Vec<u8>,
}

impl TileMap {
    pub fn new() -> Self {
        Self {
            cells: vec![0; MAP_WIDTH * MAP_HEIGHT],
        }
    }

    #[inline]
    fn index(x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= MAP_WIDTH as i32 || y >= MAP_HEIGHT as i32 {
            None
        } else {
            Some(y as usize * MAP_WIDTH + x as usize)
        }
    }

    /// Sprite id at a cell; 0 outside the map
    pub fn get(&self, x: i32, y: i32) -> u8 {
        Self::index(x, y).map_or(0, |i| self.cells[i])
    }

    pub fn set(&mut self, x: i32, y: i32, sprite: u8) {
        if let Some(i) = Self::index(x, y) {
            self.cells[i] = sprite;
        }
    }

    /// Replace all cells from row-major bytes; short input leaves the tail
    pub fn load(&mut self, cells: &[u8]) {
        let n = cells.len().min(self.cells.len());
        self.cells[..n].copy_from_slice(&cells[..n]);
    }
}

impl Default for TileMap {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_set_and_bounds() {
        let mut map = TileMap::new();
        map.set(3, 4, 17);
        assert_eq!(map.get(3, 4), 17);
        map.set(-1, 0, 9);
        map.set(MAP_WIDTH as i32, 0, 9);
        assert_eq!(map.get(-1, 0), 0);
        assert_eq!(map.get(0, MAP_HEIGHT as i32), 0);
    }

    #[test]
    fn test_load_row_major() {
        let mut map = TileMap::new();
        map.load(&[1, 2, 3]);
        assert_eq!(map.get(0, 0), 1);
        assert_eq!(map.get(2, 0), 3);
        assert_eq!(map.get(3, 0), 0);
    }
}
