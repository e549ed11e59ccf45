//! Renderer constants
//!
//! Internal render resolution and projection constants.

/// Internal render width (one ray per column)
pub const CAMERA_WIDTH: usize = 320;

/// Internal render height
pub const CAMERA_HEIGHT: usize = 240;

/// Side length of one texture frame in pixels (frames are square)
pub const TEXTURE_SIZE: usize = 64;

/// Half-width of the camera plane in world units. Controls field of view:
/// with a unit facing vector this gives roughly 66 degrees.
pub const PLANE_LENGTH: f32 = 0.66;

/// Perpendicular distances below this are clamped before projection so a
/// camera pressed against a wall cannot divide a column height by zero.
pub const MIN_PERP_DIST: f32 = 1.0e-4;
