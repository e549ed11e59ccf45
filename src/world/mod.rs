//! Level data
//!
//! The tile grid and the generator registry that fills it. A level's map
//! is immutable once generated; level transitions build a fresh one.

pub mod generators;
pub mod map;

pub use generators::{pick_generator, GeneratorFn, GENERATORS};
pub use map::{TileMap, WALL_VARIANTS};
