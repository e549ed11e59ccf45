//! Level generators
//!
//! Each generator is a pure function `(x, y, width, height) -> is_wall`,
//! sampled once per cell when a level is built. Generators must wall the
//! outer border; the interior is theirs. One is picked at random from
//! the registry at each level transition.

use rand::Rng;

/// The map generator contract
pub type GeneratorFn = fn(x: i32, y: i32, width: i32, height: i32) -> bool;

/// Named generator registry
pub const GENERATORS: &[(&str, GeneratorFn)] = &[
    ("pillar_hall", pillar_hall),
    ("warren", warren),
    ("cross_rooms", cross_rooms),
];

/// Pick a random generator for a new level
pub fn pick_generator(rng: &mut impl Rng) -> (&'static str, GeneratorFn) {
    GENERATORS[rng.gen_range(0..GENERATORS.len())]
}

fn border(x: i32, y: i32, w: i32, h: i32) -> bool {
    x == 0 || y == 0 || x == w - 1 || y == h - 1
}

/// Open hall studded with a regular grid of pillars
fn pillar_hall(x: i32, y: i32, w: i32, h: i32) -> bool {
    if border(x, y, w, h) {
        return true;
    }
    x % 3 == 0 && y % 3 == 0
}

/// Cave-like warren carved from hash noise, with a guaranteed open
/// center so the player never spawns entombed.
fn warren(x: i32, y: i32, w: i32, h: i32) -> bool {
    if border(x, y, w, h) {
        return true;
    }
    let (cx, cy) = (w / 2, h / 2);
    if (x - cx).abs() <= 2 && (y - cy).abs() <= 2 {
        return false;
    }
    cell_noise(x, y) % 100 < 28
}

/// Four quadrant rooms joined by axis corridors
fn cross_rooms(x: i32, y: i32, w: i32, h: i32) -> bool {
    if border(x, y, w, h) {
        return true;
    }
    let (cx, cy) = (w / 2, h / 2);
    // Corridors along both axes stay open
    if (x - cx).abs() <= 1 || (y - cy).abs() <= 1 {
        return false;
    }
    // Interior walls split the quadrants, with door gaps
    let on_wall_x = x % (w / 3).max(2) == 0;
    let on_wall_y = y % (h / 3).max(2) == 0;
    (on_wall_x || on_wall_y) && (x + y) % 5 != 0
}

/// Deterministic per-cell noise; generators stay pure functions of
/// their arguments, so no RNG state leaks in here.
fn cell_noise(x: i32, y: i32) -> u32 {
    let mut h = 0x811c_9dc5u32;
    for v in [x as u32, y as u32] {
        h ^= v;
        h = h.wrapping_mul(0x0100_0193);
    }
    h ^= h >> 15;
    h.wrapping_mul(0x2c1b_3c6d)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_generators_wall_the_border() {
        let (w, h) = (24, 18);
        for (name, gen) in GENERATORS {
            for x in 0..w {
                assert!(gen(x, 0, w, h), "{name} open at top border");
                assert!(gen(x, h - 1, w, h), "{name} open at bottom border");
            }
            for y in 0..h {
                assert!(gen(0, y, w, h), "{name} open at left border");
                assert!(gen(w - 1, y, w, h), "{name} open at right border");
            }
        }
    }

    #[test]
    fn test_generators_are_pure() {
        for (name, gen) in GENERATORS {
            for y in 0..16 {
                for x in 0..16 {
                    assert_eq!(
                        gen(x, y, 16, 16),
                        gen(x, y, 16, 16),
                        "{name} not deterministic at ({x},{y})"
                    );
                }
            }
        }
    }

    #[test]
    fn test_warren_center_is_open() {
        assert!(!warren(12, 9, 24, 18));
    }
}
