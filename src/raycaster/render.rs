//! Framebuffer and the two render passes
//!
//! The wall pass casts one ray per column, draws the textured wall
//! slice and records the perpendicular distance in a per-column depth
//! buffer. The sprite pass then billboards every visible entity
//! back-to-front, testing each vertical strip against that buffer so
//! walls occlude sprites correctly.

use crate::world::TileMap;
use super::camera::Camera;
use super::constants::{MIN_PERP_DIST, TEXTURE_SIZE};
use super::math::Vec2;
use super::ray::{raycast, Side};
use super::texture::TextureStrip;

/// Software render target. `depth` holds one perpendicular wall
/// distance per column, written by the wall pass and consumed by the
/// sprite pass.
pub struct Framebuffer {
    pub pixels: Vec<u8>, // RGBA, 4 bytes per pixel
    pub depth: Vec<f32>, // per-column wall distance
    pub width: usize,
    pub height: usize,
}

impl Framebuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            pixels: vec![0; width * height * 4],
            depth: vec![f32::MAX; width],
            width,
            height,
        }
    }

    /// Two-tone ceiling/floor clear with a subtle vertical gradient,
    /// and a depth reset
    pub fn clear_shaded(&mut self, ceiling: [u8; 3], floor: [u8; 3]) {
        let half = self.height / 2;
        for y in 0..self.height {
            let (base, t) = if y < half {
                (ceiling, y as f32 / half as f32)
            } else {
                (floor, 1.0 - (y - half) as f32 / half.max(1) as f32)
            };
            // Darken toward the horizon for a little depth cue
            let fade = 1.0 - 0.35 * t;
            let px = [
                (base[0] as f32 * fade) as u8,
                (base[1] as f32 * fade) as u8,
                (base[2] as f32 * fade) as u8,
                255,
            ];
            for x in 0..self.width {
                let idx = (y * self.width + x) * 4;
                self.pixels[idx..idx + 4].copy_from_slice(&px);
            }
        }
        self.depth.fill(f32::MAX);
    }

    fn put_pixel(&mut self, x: usize, y: usize, rgba: [u8; 4]) {
        let idx = (y * self.width + x) * 4;
        self.pixels[idx..idx + 4].copy_from_slice(&rgba);
    }
}

/// One billboard to draw: world position plus texture frame. The caller
/// collects these from the component store.
#[derive(Debug, Clone, Copy)]
pub struct SpriteInstance {
    pub pos: Vec2,
    pub frame: usize,
}

/// Wall pass: one ray per screen column
pub fn render_walls(fb: &mut Framebuffer, map: &TileMap, camera: &Camera, strip: &TextureStrip) {
    let width = fb.width;
    let height = fb.height as i32;

    for x in 0..width {
        let u = 2.0 * x as f32 / width as f32 - 1.0;
        let dir = camera.ray_dir(u);
        let hit = raycast(map, camera.pos, dir);
        let perp = hit.perp_dist.max(MIN_PERP_DIST);
        fb.depth[x] = perp;

        let line_h = (height as f32 / perp) as i32;
        let draw_start = ((height - line_h) / 2).max(0);
        let draw_end = ((height + line_h) / 2).min(height - 1);

        // Fractional hit position selects the texture column. Flip it on
        // the sides where stepping direction would mirror the image, so
        // walls read consistently as you circle them.
        let mut tex_x = (hit.wall_x * TEXTURE_SIZE as f32) as usize;
        let flipped = match hit.side {
            Side::X => dir.x > 0.0,
            Side::Y => dir.y < 0.0,
        };
        if flipped {
            tex_x = TEXTURE_SIZE - 1 - tex_x.min(TEXTURE_SIZE - 1);
        }

        // Implicit boundary hits (tile 0) reuse the first wall variant
        let frame = hit.tile.saturating_sub(1) as usize;
        let step = TEXTURE_SIZE as f32 / line_h.max(1) as f32;
        let mut tex_pos = (draw_start - (height - line_h) / 2) as f32 * step;

        for y in draw_start..=draw_end {
            let tex_y = (tex_pos as usize).min(TEXTURE_SIZE - 1);
            tex_pos += step;
            let mut px = strip.sample(frame, tex_x, tex_y);
            if hit.side == Side::Y {
                // Cheap two-tone lighting: darken Y-side hits
                px[0] /= 2;
                px[1] /= 2;
                px[2] /= 2;
            }
            fb.put_pixel(x, y as usize, px);
        }
    }
}

/// Sprite pass: back-to-front affine billboards with a per-column depth
/// test against the wall pass.
pub fn render_sprites(
    fb: &mut Framebuffer,
    camera: &Camera,
    sprites: &mut Vec<SpriteInstance>,
    strip: &TextureStrip,
) {
    // Painter's order: farthest first so near sprites overdraw far ones
    sprites.sort_by(|a, b| {
        let da = (a.pos - camera.pos).len_sq();
        let db = (b.pos - camera.pos).len_sq();
        db.partial_cmp(&da).unwrap_or(std::cmp::Ordering::Equal)
    });

    let w = fb.width as i32;
    let h = fb.height as i32;
    let det = camera.plane.x * camera.dir.y - camera.dir.x * camera.plane.y;
    if det.abs() < f32::EPSILON {
        return;
    }
    let inv_det = 1.0 / det;

    for sprite in sprites.iter() {
        let rel = sprite.pos - camera.pos;
        // Inverse of the [plane dir] basis: camera-space position where
        // ty is depth along the facing axis
        let tx = inv_det * (camera.dir.y * rel.x - camera.dir.x * rel.y);
        let ty = inv_det * (-camera.plane.y * rel.x + camera.plane.x * rel.y);
        if ty <= 0.0 {
            continue; // behind the camera
        }

        let screen_x = ((w / 2) as f32 * (1.0 + tx / ty)) as i32;
        // Same 1/depth scaling as the wall projection keeps sprites and
        // geometry visually consistent
        let size = (h as f32 / ty).abs() as i32;
        if size <= 0 {
            continue;
        }

        let draw_start_y = ((h - size) / 2).max(0);
        let draw_end_y = ((h + size) / 2).min(h - 1);
        let draw_start_x = (screen_x - size / 2).max(0);
        let draw_end_x = (screen_x + size / 2).min(w - 1);

        for x in draw_start_x..=draw_end_x {
            if ty >= fb.depth[x as usize] {
                continue; // wall in front at this column
            }
            let tex_x = ((x - (screen_x - size / 2)) * TEXTURE_SIZE as i32 / size)
                .clamp(0, TEXTURE_SIZE as i32 - 1) as usize;
            for y in draw_start_y..=draw_end_y {
                let tex_y = ((y - (h - size) / 2) * TEXTURE_SIZE as i32 / size)
                    .clamp(0, TEXTURE_SIZE as i32 - 1) as usize;
                let px = strip.sample(sprite.frame, tex_x, tex_y);
                if px[3] == 0 {
                    continue; // color key
                }
                fb.put_pixel(x as usize, y as usize, px);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::TileMap;

    fn setup() -> (Framebuffer, TileMap, Camera, TextureStrip) {
        let fb = Framebuffer::new(64, 48);
        let map = TileMap::generate(10, 10, |x, y, w, h| {
            x == 0 || y == 0 || x == w - 1 || y == h - 1
        });
        let mut cam = Camera::new();
        cam.pos = Vec2::new(5.0, 5.0);
        cam.set_facing(0.0);
        (fb, map, cam, TextureStrip::builtin())
    }

    #[test]
    fn test_wall_pass_fills_depth() {
        let (mut fb, map, cam, strip) = setup();
        fb.clear_shaded([40, 40, 60], [50, 45, 40]);
        render_walls(&mut fb, &map, &cam, &strip);
        for x in 0..fb.width {
            let d = fb.depth[x];
            assert!(d.is_finite() && d > 0.0, "column {x} depth unset");
        }
        // Center column looks straight at the wall at x=9, face at 9.0
        let center = fb.depth[fb.width / 2];
        assert!((center - 4.0).abs() < 0.1, "center depth {center}");
    }

    #[test]
    fn test_sprite_behind_camera_skipped() {
        let (mut fb, map, cam, strip) = setup();
        fb.clear_shaded([0, 0, 0], [0, 0, 0]);
        render_walls(&mut fb, &map, &cam, &strip);
        let before = fb.pixels.clone();
        let mut sprites = vec![SpriteInstance {
            pos: Vec2::new(2.0, 5.0), // behind a camera facing +x
            frame: 9,
        }];
        render_sprites(&mut fb, &cam, &mut sprites, &strip);
        assert_eq!(before, fb.pixels);
    }

    #[test]
    fn test_sprite_in_front_draws() {
        let (mut fb, map, cam, strip) = setup();
        fb.clear_shaded([0, 0, 0], [0, 0, 0]);
        render_walls(&mut fb, &map, &cam, &strip);
        let before = fb.pixels.clone();
        let mut sprites = vec![SpriteInstance {
            pos: Vec2::new(7.0, 5.0),
            frame: 4,
        }];
        render_sprites(&mut fb, &cam, &mut sprites, &strip);
        assert_ne!(before, fb.pixels);
    }
}
