//! Screen-space raycasting renderer
//!
//! Turns the 2D tile/entity state into a pseudo-3D view: a DDA wall
//! pass with a per-column depth buffer, then affine sprite billboards
//! drawn back-to-front against that buffer.
//!
//! # Module Organization
//!
//! - `math` - Vec2 and the small amount of vector algebra the game needs
//! - `camera` - position / facing / plane basis read by the passes
//! - `ray` - the pure DDA grid traversal
//! - `render` - Framebuffer, wall pass, sprite pass
//! - `texture` - the RGBA frame strip (PNG or procedural)
//! - `constants` - render resolution and projection constants

pub mod camera;
pub mod constants;
pub mod math;
pub mod ray;
pub mod render;
pub mod texture;

pub use camera::Camera;
pub use constants::{CAMERA_HEIGHT, CAMERA_WIDTH, PLANE_LENGTH, TEXTURE_SIZE};
pub use math::Vec2;
pub use ray::{raycast, RayHit, Side};
pub use render::{render_sprites, render_walls, Framebuffer, SpriteInstance};
pub use texture::{TextureStrip, TextureError};
