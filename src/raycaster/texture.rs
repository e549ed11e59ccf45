//! Texture strip
//!
//! All art lives in one horizontal RGBA strip of square frames. Walls
//! index it by tile variant, entities by their `Sprite` frame. The strip
//! is loaded from a PNG when one ships with the game; otherwise a
//! procedural strip is generated so the binary runs with no assets.

use thiserror::Error;

use super::constants::TEXTURE_SIZE;

// Frame layout of the built-in strip. A shipped PNG must follow the
// same order.
pub const FRAME_WALL: usize = 0; // 4 wall variants at 0..4
pub const FRAME_GHOUL_A: usize = 4;
pub const FRAME_GHOUL_B: usize = 5;
pub const FRAME_GHOUL_TELEGRAPH: usize = 6;
pub const FRAME_DRIFTER_A: usize = 7;
pub const FRAME_DRIFTER_B: usize = 8;
pub const FRAME_BOLT: usize = 9;
pub const FRAME_CLAW: usize = 10;
pub const FRAME_PUFF_A: usize = 11;
pub const FRAME_PUFF_B: usize = 12;
pub const FRAME_PUFF_C: usize = 13;

const BUILTIN_FRAMES: usize = 14;

#[derive(Debug, Error)]
pub enum TextureError {
    #[error("failed to decode texture strip: {0}")]
    Decode(#[from] image::ImageError),
    #[error("texture strip is {width}x{height}, expected a horizontal strip of {frame}x{frame} frames")]
    BadDimensions { width: u32, height: u32, frame: u32 },
}

/// A horizontal strip of square RGBA frames
pub struct TextureStrip {
    frame_size: usize,
    frames: usize,
    /// RGBA, row-major across the full strip width
    pixels: Vec<u8>,
}

impl TextureStrip {
    /// Decode a PNG strip. Height must equal `TEXTURE_SIZE` and width
    /// must be a whole number of frames.
    pub fn from_png_bytes(bytes: &[u8]) -> Result<Self, TextureError> {
        let img = image::load_from_memory(bytes)?.to_rgba8();
        let (width, height) = img.dimensions();
        let frame = TEXTURE_SIZE as u32;
        if height != frame || width % frame != 0 || width == 0 {
            return Err(TextureError::BadDimensions { width, height, frame });
        }
        Ok(Self {
            frame_size: TEXTURE_SIZE,
            frames: (width / frame) as usize,
            pixels: img.into_raw(),
        })
    }

    /// Procedural fallback strip with every frame the game references
    pub fn builtin() -> Self {
        let size = TEXTURE_SIZE;
        let mut strip = Self {
            frame_size: size,
            frames: BUILTIN_FRAMES,
            pixels: vec![0; BUILTIN_FRAMES * size * size * 4],
        };
        for f in 0..4 {
            strip.paint_wall(f);
        }
        strip.paint_blob(FRAME_GHOUL_A, [96, 130, 80], 0.42);
        strip.paint_blob(FRAME_GHOUL_B, [96, 130, 80], 0.38);
        strip.paint_blob(FRAME_GHOUL_TELEGRAPH, [190, 70, 60], 0.44);
        strip.paint_blob(FRAME_DRIFTER_A, [140, 120, 170], 0.30);
        strip.paint_blob(FRAME_DRIFTER_B, [140, 120, 170], 0.26);
        strip.paint_blob(FRAME_BOLT, [240, 220, 120], 0.12);
        strip.paint_blob(FRAME_CLAW, [220, 160, 80], 0.20);
        strip.paint_blob(FRAME_PUFF_A, [200, 200, 210], 0.34);
        strip.paint_blob(FRAME_PUFF_B, [160, 160, 175], 0.24);
        strip.paint_blob(FRAME_PUFF_C, [120, 120, 140], 0.14);
        strip
    }

    pub fn frames(&self) -> usize {
        self.frames
    }

    pub fn frame_size(&self) -> usize {
        self.frame_size
    }

    /// RGBA texel at (tx, ty) inside a frame. Out-of-range coordinates
    /// clamp rather than wrap; the passes compute coordinates that are
    /// already in range except for float rounding at frame edges.
    pub fn sample(&self, frame: usize, tx: usize, ty: usize) -> [u8; 4] {
        let frame = frame % self.frames;
        let tx = tx.min(self.frame_size - 1);
        let ty = ty.min(self.frame_size - 1);
        let row_stride = self.frames * self.frame_size;
        let idx = (ty * row_stride + frame * self.frame_size + tx) * 4;
        [
            self.pixels[idx],
            self.pixels[idx + 1],
            self.pixels[idx + 2],
            self.pixels[idx + 3],
        ]
    }

    fn put(&mut self, frame: usize, tx: usize, ty: usize, rgba: [u8; 4]) {
        let row_stride = self.frames * self.frame_size;
        let idx = (ty * row_stride + frame * self.frame_size + tx) * 4;
        self.pixels[idx..idx + 4].copy_from_slice(&rgba);
    }

    /// Brick-like wall pattern; each variant shifts hue and course height
    fn paint_wall(&mut self, variant: usize) {
        let size = self.frame_size;
        let base = [
            [104, 86, 72],
            [82, 88, 96],
            [96, 78, 96],
            [72, 96, 80],
        ][variant % 4];
        let course = 8 + 2 * (variant % 3);
        for ty in 0..size {
            for tx in 0..size {
                let row = ty / course;
                let offset = if row % 2 == 0 { 0 } else { size / 4 };
                let mortar = ty % course == 0 || (tx + offset) % (size / 4) == 0;
                let shade = if mortar { 60 } else { 100 + ((tx ^ ty) % 13) as i32 };
                let c = |v: i32| ((v * shade) / 100).clamp(0, 255) as u8;
                self.put(
                    FRAME_WALL + variant,
                    tx,
                    ty,
                    [c(base[0]), c(base[1]), c(base[2]), 255],
                );
            }
        }
    }

    /// Soft round sprite on a transparent background
    fn paint_blob(&mut self, frame: usize, rgb: [u8; 3], radius: f32) {
        let size = self.frame_size as f32;
        let r = radius * size;
        for ty in 0..self.frame_size {
            for tx in 0..self.frame_size {
                let dx = tx as f32 - size / 2.0;
                let dy = ty as f32 - size * 0.55;
                let d = (dx * dx + dy * dy).sqrt();
                if d < r {
                    let rim = if d > r * 0.75 { 70 } else { 100 };
                    let c = |v: u8| ((v as u32 * rim) / 100) as u8;
                    self.put(frame, tx, ty, [c(rgb[0]), c(rgb[1]), c(rgb[2]), 255]);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_has_all_frames() {
        let strip = TextureStrip::builtin();
        assert_eq!(strip.frames(), BUILTIN_FRAMES);
        assert_eq!(strip.frame_size(), TEXTURE_SIZE);
    }

    #[test]
    fn test_walls_opaque_sprites_keyed() {
        let strip = TextureStrip::builtin();
        // Wall centers are opaque
        assert_eq!(strip.sample(FRAME_WALL, 32, 32)[3], 255);
        // Sprite corners are transparent (alpha 0 color key)
        assert_eq!(strip.sample(FRAME_BOLT, 0, 0)[3], 0);
    }

    #[test]
    fn test_sample_clamps_at_edges() {
        let strip = TextureStrip::builtin();
        let _ = strip.sample(FRAME_WALL, TEXTURE_SIZE + 5, TEXTURE_SIZE + 5);
    }
}
