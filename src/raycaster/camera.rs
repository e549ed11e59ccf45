//! Camera for the raycast view
//!
//! The camera is a position, a unit facing vector and a perpendicular
//! plane vector. Rays for screen column `x` are `dir + plane * u` where
//! `u` runs from -1 at the left edge to +1 at the right edge.

use super::constants::PLANE_LENGTH;
use super::math::Vec2;

/// Camera state read by the renderer, written by whichever system tracks
/// the view (player follow or the title-screen sweep).
#[derive(Clone, Debug)]
pub struct Camera {
    pub pos: Vec2,
    /// Unit facing vector
    pub dir: Vec2,
    /// Camera plane, perpendicular to `dir`, length = PLANE_LENGTH
    pub plane: Vec2,
}

impl Camera {
    pub fn new() -> Self {
        let mut cam = Self {
            pos: Vec2::ZERO,
            dir: Vec2::new(1.0, 0.0),
            plane: Vec2::ZERO,
        };
        cam.set_facing(0.0);
        cam
    }

    /// Point the camera along `facing` radians, rebuilding the plane
    pub fn set_facing(&mut self, facing: f32) {
        self.dir = Vec2::from_angle(facing);
        self.plane = self.dir.perp() * PLANE_LENGTH;
    }

    /// World-space ray direction for camera-space offset `u` in [-1, 1]
    pub fn ray_dir(&self, u: f32) -> Vec2 {
        self.dir + self.plane * u
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plane_stays_perpendicular() {
        let mut cam = Camera::new();
        for i in 0..12 {
            cam.set_facing(i as f32 * 0.5);
            assert!(cam.dir.dot(cam.plane).abs() < 1e-5);
            assert!((cam.dir.len() - 1.0).abs() < 1e-5);
            assert!((cam.plane.len() - PLANE_LENGTH).abs() < 1e-5);
        }
    }

    #[test]
    fn test_ray_spread() {
        let mut cam = Camera::new();
        cam.set_facing(0.0);
        let left = cam.ray_dir(-1.0);
        let right = cam.ray_dir(1.0);
        // Edge rays straddle the facing direction symmetrically
        assert!((left.y + right.y).abs() < 1e-5);
        assert!(left.x > 0.0 && right.x > 0.0);
    }
}
