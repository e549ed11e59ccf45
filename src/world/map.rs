//! Tile map
//!
//! An immutable-per-level 2D grid of tile codes. 0 is open floor, any
//! non-zero value is a wall and doubles as the texture frame selector
//! for the wall pass. A map is built once per level from a generator
//! function and discarded wholesale on level transition.

use super::generators::GeneratorFn;

/// Number of wall texture variants the renderer can show
pub const WALL_VARIANTS: u8 = 4;

/// The level grid. Tiles are row-major, `y * width + x`.
pub struct TileMap {
    width: i32,
    height: i32,
    tiles: Vec<u8>,
}

impl TileMap {
    /// Fill a grid by sampling a generator at every cell. Wall variants
    /// are picked from a coordinate hash so repeated walls do not tile
    /// into an obvious pattern.
    pub fn generate(width: i32, height: i32, generator: GeneratorFn) -> Self {
        let mut tiles = Vec::with_capacity((width * height) as usize);
        for y in 0..height {
            for x in 0..width {
                if generator(x, y, width, height) {
                    tiles.push(1 + (coord_hash(x, y) % WALL_VARIANTS as u32) as u8);
                } else {
                    tiles.push(0);
                }
            }
        }
        Self { width, height, tiles }
    }

    /// Build directly from tile codes. Used by tests and scripted levels.
    pub fn from_tiles(width: i32, height: i32, tiles: Vec<u8>) -> Self {
        assert_eq!(tiles.len(), (width * height) as usize);
        Self { width, height, tiles }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    /// Tile code at a cell, or None outside the grid. Out-of-range
    /// lookups are never an error and never an implicit wall; callers
    /// decide what absence means for them.
    pub fn tile(&self, x: i32, y: i32) -> Option<u8> {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return None;
        }
        Some(self.tiles[(y * self.width + x) as usize])
    }

    /// True when the cell exists and holds a wall
    pub fn is_wall(&self, x: i32, y: i32) -> bool {
        matches!(self.tile(x, y), Some(t) if t > 0)
    }

    /// True when the cell exists and is open floor
    pub fn is_open(&self, x: i32, y: i32) -> bool {
        matches!(self.tile(x, y), Some(0))
    }
}

/// Small integer mix for variant selection; stable across runs so a
/// level always looks the same for a given generator.
fn coord_hash(x: i32, y: i32) -> u32 {
    let mut h = (x as u32).wrapping_mul(0x9e37_79b9) ^ (y as u32).wrapping_mul(0x85eb_ca6b);
    h ^= h >> 13;
    h = h.wrapping_mul(0xc2b2_ae35);
    h ^ (h >> 16)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_range_is_none() {
        let map = TileMap::from_tiles(2, 2, vec![1, 0, 0, 1]);
        assert_eq!(map.tile(-1, 0), None);
        assert_eq!(map.tile(0, -1), None);
        assert_eq!(map.tile(2, 0), None);
        assert_eq!(map.tile(0, 2), None);
        assert!(!map.is_wall(5, 5));
        assert!(!map.is_open(5, 5));
    }

    #[test]
    fn test_generate_assigns_variants() {
        let map = TileMap::generate(8, 8, |x, y, w, h| {
            x == 0 || y == 0 || x == w - 1 || y == h - 1
        });
        for x in 0..8 {
            let t = map.tile(x, 0).unwrap();
            assert!(t >= 1 && t <= WALL_VARIANTS);
        }
        assert!(map.is_open(3, 3));
    }
}
