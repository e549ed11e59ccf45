//! Movement and collision
//!
//! Per tick every body integrates, clamps to the map bounds, resolves
//! against wall tiles, and lands in the spatial hash. The hash then
//! feeds the entity-vs-entity narrow phase: pairs are deduped with an
//! order-independent key, gated by the collision-group table, recorded
//! as contacts (triggers included), and - when neither side is a
//! trigger - separated with an equal-mass half split. No mass
//! weighting anywhere: every body pushes like every other.

use std::collections::HashSet;

use crate::world::TileMap;
use super::components::{Bbox, CollisionMatrix};
use super::entity::Entity;
use super::spatial::SpatialHash;
use super::world::World;

/// Per-axis penetration between two overlapping boxes. `dx`/`dy` point
/// from the second box's center toward the first's and pick the push
/// direction.
struct Penetration {
    px: f32,
    py: f32,
    dx: f32,
    dy: f32,
}

fn penetration(a: &Bbox, b: &Bbox) -> Option<Penetration> {
    let dx = (a.x + a.w / 2.0) - (b.x + b.w / 2.0);
    let dy = (a.y + a.h / 2.0) - (b.y + b.h / 2.0);
    let px = (a.w + b.w) / 2.0 - dx.abs();
    let py = (a.h + b.h) / 2.0 - dy.abs();
    (px > 0.0 && py > 0.0).then_some(Penetration { px, py, dx, dy })
}

/// Order-independent pair key. Entity slot indices are 32-bit, so
/// packing min and max into one u64 can never collide.
fn pair_key(a: Entity, b: Entity) -> u64 {
    let (lo, hi) = if a.index() < b.index() {
        (a.index(), b.index())
    } else {
        (b.index(), a.index())
    };
    ((lo as u64) << 32) | hi as u64
}

/// Run one physics tick over every body.
pub fn tick(
    world: &mut World,
    map: &TileMap,
    matrix: &CollisionMatrix,
    hash: &mut SpatialHash,
    dt: f32,
) {
    let entities = world.body_entities();
    hash.clear();

    // Phase 1: move each body and resolve it against terrain
    for &e in &entities {
        let Some(body) = world.bodies.get_mut(e) else { continue };
        let Some(pos) = world.positions.get_mut(e) else { continue };

        // This tick's results only: reset before detection
        body.contacts.clear();
        body.on_terrain = false;

        pos.x += body.vx * dt;
        pos.y += body.vy * dt;
        body.recompute_bbox(pos);

        // Map bounds: clamp, reflect by bounce, flag terrain
        let mw = map.width() as f32;
        let mh = map.height() as f32;
        if body.bbox.x < 0.0 {
            pos.x = body.w / 2.0;
            body.vx = -body.vx * body.bounce;
            body.on_terrain = true;
        } else if body.bbox.x + body.w > mw {
            pos.x = mw - body.w / 2.0;
            body.vx = -body.vx * body.bounce;
            body.on_terrain = true;
        }
        if body.bbox.y < 0.0 {
            pos.y = body.h / 2.0;
            body.vy = -body.vy * body.bounce;
            body.on_terrain = true;
        } else if body.bbox.y + body.h > mh {
            pos.y = mh - body.h / 2.0;
            body.vy = -body.vy * body.bounce;
            body.on_terrain = true;
        }
        body.recompute_bbox(pos);

        // Wall tiles under the bbox. Off-map cells return no tile and
        // are skipped - never treated as implicit walls here.
        let x0 = body.bbox.x.floor() as i32;
        let y0 = body.bbox.y.floor() as i32;
        let x1 = (body.bbox.x + body.bbox.w).floor() as i32;
        let y1 = (body.bbox.y + body.bbox.h).floor() as i32;

        let mut overlaps: Vec<(i32, i32, f32)> = Vec::new();
        for ty in y0..=y1 {
            for tx in x0..=x1 {
                if !map.is_wall(tx, ty) {
                    continue;
                }
                let tile = Bbox { x: tx as f32, y: ty as f32, w: 1.0, h: 1.0 };
                if let Some(o) = body.bbox.overlap(&tile) {
                    overlaps.push((tx, ty, o.area()));
                }
            }
        }

        if !overlaps.is_empty() {
            body.on_terrain = true;
            // Largest penetration first; resolving the deepest overlap
            // usually clears its neighbors and avoids corner oscillation
            overlaps.sort_by(|a, b| b.2.partial_cmp(&a.2).unwrap_or(std::cmp::Ordering::Equal));
            for (tx, ty, _) in overlaps {
                let tile = Bbox { x: tx as f32, y: ty as f32, w: 1.0, h: 1.0 };
                // Earlier pushes may already have separated this tile
                let Some(pen) = penetration(&body.bbox, &tile) else { continue };
                if pen.px < pen.py {
                    pos.x += pen.px.copysign(pen.dx);
                    body.vx = -body.vx * body.bounce;
                } else {
                    pos.y += pen.py.copysign(pen.dy);
                    body.vy = -body.vy * body.bounce;
                }
                body.recompute_bbox(pos);
            }
        }

        hash.insert(e, &body.bbox);
    }

    // Phase 2: entity-vs-entity. Broad phase via the hash, pair dedupe,
    // group gate, exact overlap; contacts for everything that touches,
    // physical response only when neither side is a trigger.
    let mut seen: HashSet<u64> = HashSet::new();
    let mut neighbors: Vec<Entity> = Vec::new();
    let mut resolve_list: Vec<(Entity, Entity)> = Vec::new();

    for &a in &entities {
        let Some(body_a) = world.bodies.get(a) else { continue };
        let (group_a, trigger_a, bbox_a) = (body_a.group, body_a.trigger, body_a.bbox);

        neighbors.clear();
        hash.query_into(&bbox_a, &mut neighbors);
        for i in 0..neighbors.len() {
            let b = neighbors[i];
            if b == a || !seen.insert(pair_key(a, b)) {
                continue;
            }
            let Some(body_b) = world.bodies.get(b) else { continue };
            if !matrix.collidable(group_a, body_b.group) {
                continue;
            }
            if bbox_a.overlap(&body_b.bbox).is_none() {
                continue;
            }
            let trigger_b = body_b.trigger;

            // Contacts are recorded regardless of trigger status;
            // gameplay uses them for hit detection either way
            if let Some((ba, bb)) = world.bodies.get_pair_mut(a, b) {
                ba.contacts.push(b);
                bb.contacts.push(a);
            }
            if !trigger_a && !trigger_b {
                resolve_list.push((a, b));
            }
        }
    }

    // Phase 3: separate the non-trigger pairs. Equal split: each body
    // takes half the penetration, each keeps its own bounce.
    for (a, b) in resolve_list {
        let Some((body_a, body_b)) = world.bodies.get_pair_mut(a, b) else { continue };
        let Some(pen) = penetration(&body_a.bbox, &body_b.bbox) else { continue };
        let Some((pos_a, pos_b)) = world.positions.get_pair_mut(a, b) else { continue };

        if pen.px < pen.py {
            let half = (pen.px / 2.0).copysign(pen.dx);
            pos_a.x += half;
            pos_b.x -= half;
            body_a.vx = -body_a.vx * body_a.bounce;
            body_b.vx = -body_b.vx * body_b.bounce;
        } else {
            let half = (pen.py / 2.0).copysign(pen.dy);
            pos_a.y += half;
            pos_b.y -= half;
            body_a.vy = -body_a.vy * body_a.bounce;
            body_b.vy = -body_b.vy * body_b.bounce;
        }
        body_a.recompute_bbox(pos_a);
        body_b.recompute_bbox(pos_b);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::components::Group;
    use crate::game::template::TemplateRegistry;

    fn open_map() -> TileMap {
        TileMap::from_tiles(10, 10, vec![0; 100])
    }

    fn spawn_body(
        world: &mut World,
        x: f32,
        y: f32,
        size: f32,
        group: Group,
    ) -> Entity {
        let reg = TemplateRegistry::standard();
        let e = world.spawn_at(&reg, "player", x, y, 0.0).unwrap();
        // Retype the template body for the scenario
        let body = world.bodies.get_mut(e).unwrap();
        body.w = size;
        body.h = size;
        body.group = group;
        world.players.remove(e);
        world.refresh_bbox(e);
        e
    }

    fn run_tick(world: &mut World, map: &TileMap, dt: f32) {
        let matrix = CollisionMatrix::standard();
        let mut hash = SpatialHash::new(map.width(), map.height());
        tick(world, map, &matrix, &mut hash, dt);
    }

    #[test]
    fn test_wall_stop() {
        let mut tiles = vec![0u8; 100];
        tiles[5 * 10 + 1] = 1; // wall at (1, 5)
        let map = TileMap::from_tiles(10, 10, tiles);

        let mut world = World::new();
        let e = spawn_body(&mut world, 0.9, 5.5, 0.4, Group::Player);
        let body = world.bodies.get_mut(e).unwrap();
        body.vx = 5.0;
        body.bounce = 0.0;

        run_tick(&mut world, &map, 0.1);

        let body = world.bodies.get(e).unwrap();
        assert_eq!(body.vx, 0.0);
        assert!(body.on_terrain);
        // Right edge stops at the tile face, never inside it
        assert!(body.bbox.x + body.bbox.w <= 1.0 + 1e-5);
    }

    #[test]
    fn test_wall_bounce() {
        let mut tiles = vec![0u8; 100];
        tiles[5 * 10 + 1] = 1;
        let map = TileMap::from_tiles(10, 10, tiles);

        let mut world = World::new();
        let e = spawn_body(&mut world, 0.9, 5.5, 0.4, Group::Player);
        let body = world.bodies.get_mut(e).unwrap();
        body.vx = 5.0;
        body.bounce = 1.0;

        run_tick(&mut world, &map, 0.1);

        let body = world.bodies.get(e).unwrap();
        assert_eq!(body.vx, -5.0);
    }

    #[test]
    fn test_bbox_invariant_after_tick() {
        let map = open_map();
        let mut world = World::new();
        let e = spawn_body(&mut world, 4.0, 4.0, 0.5, Group::Player);
        world.bodies.get_mut(e).unwrap().vx = 1.5;
        world.bodies.get_mut(e).unwrap().vy = -0.5;

        run_tick(&mut world, &map, 0.016);

        let pos = *world.positions.get(e).unwrap();
        let body = world.bodies.get(e).unwrap();
        assert_eq!(body.bbox.x, pos.x - body.w / 2.0);
        assert_eq!(body.bbox.y, pos.y - body.h / 2.0);
        assert_eq!(body.bbox.w, body.w);
        assert_eq!(body.bbox.h, body.h);
    }

    #[test]
    fn test_map_containment() {
        let map = open_map();
        let mut world = World::new();
        // Sprinting off every edge in turn
        for (x, y, vx, vy) in [
            (0.5, 5.0, -50.0, 0.0),
            (9.5, 5.0, 50.0, 0.0),
            (5.0, 0.5, 0.0, -50.0),
            (5.0, 9.5, 0.0, 50.0),
        ] {
            let e = spawn_body(&mut world, x, y, 0.4, Group::Player);
            let body = world.bodies.get_mut(e).unwrap();
            body.vx = vx;
            body.vy = vy;
        }

        run_tick(&mut world, &map, 0.1);

        for e in world.body_entities() {
            let b = world.bodies.get(e).unwrap();
            assert!(b.bbox.x >= 0.0);
            assert!(b.bbox.y >= 0.0);
            assert!(b.bbox.x + b.bbox.w <= 10.0);
            assert!(b.bbox.y + b.bbox.h <= 10.0);
            assert!(b.on_terrain);
        }
    }

    #[test]
    fn test_rest_is_idempotent() {
        let mut tiles = vec![1u8; 100];
        // One open tile at (4, 4)
        tiles[4 * 10 + 4] = 0;
        let map = TileMap::from_tiles(10, 10, tiles);

        let mut world = World::new();
        let e = spawn_body(&mut world, 4.5, 4.5, 0.5, Group::Player);
        for _ in 0..20 {
            run_tick(&mut world, &map, 0.016);
        }
        let pos = world.positions.get(e).unwrap();
        assert_eq!((pos.x, pos.y), (4.5, 4.5));
    }

    #[test]
    fn test_contact_symmetry_and_dedup() {
        let map = open_map();
        let mut world = World::new();
        // Overlapping enemies straddling a bucket boundary so the hash
        // reports the pair from more than one bucket
        let a = spawn_body(&mut world, 1.9, 2.0, 0.6, Group::Enemy);
        let b = spawn_body(&mut world, 2.1, 2.0, 0.6, Group::Enemy);

        run_tick(&mut world, &map, 0.0);

        let contacts_a = &world.bodies.get(a).unwrap().contacts;
        let contacts_b = &world.bodies.get(b).unwrap().contacts;
        assert_eq!(contacts_a.as_slice(), &[b]);
        assert_eq!(contacts_b.as_slice(), &[a]);
    }

    #[test]
    fn test_non_collidable_groups_ignored() {
        let map = open_map();
        let mut world = World::new();
        let a = spawn_body(&mut world, 2.0, 2.0, 0.6, Group::Player);
        let b = spawn_body(&mut world, 2.2, 2.0, 0.6, Group::PlayerShot);

        run_tick(&mut world, &map, 0.0);

        assert!(world.bodies.get(a).unwrap().contacts.is_empty());
        assert!(world.bodies.get(b).unwrap().contacts.is_empty());
    }

    #[test]
    fn test_trigger_detects_without_pushback() {
        let map = open_map();
        let mut world = World::new();
        let a = spawn_body(&mut world, 2.0, 2.0, 0.6, Group::Enemy);
        let t = spawn_body(&mut world, 2.2, 2.0, 0.6, Group::PlayerShot);
        world.bodies.get_mut(t).unwrap().trigger = true;

        run_tick(&mut world, &map, 0.0);

        // Contact recorded on both sides, nobody moved
        assert_eq!(world.bodies.get(a).unwrap().contacts.as_slice(), &[t]);
        assert_eq!(world.bodies.get(t).unwrap().contacts.as_slice(), &[a]);
        assert_eq!(world.positions.get(a).unwrap().x, 2.0);
        assert_eq!(world.positions.get(t).unwrap().x, 2.2);
    }

    #[test]
    fn test_equal_split_resolution() {
        let map = open_map();
        let mut world = World::new();
        let a = spawn_body(&mut world, 2.0, 2.0, 0.6, Group::Enemy);
        let b = spawn_body(&mut world, 2.4, 2.0, 0.6, Group::Enemy);

        run_tick(&mut world, &map, 0.0);

        // Overlap was 0.2 on x; each body moved half of it, apart
        let xa = world.positions.get(a).unwrap().x;
        let xb = world.positions.get(b).unwrap().x;
        assert!((xa - 1.9).abs() < 1e-5, "xa = {xa}");
        assert!((xb - 2.5).abs() < 1e-5, "xb = {xb}");
    }
}
