//! Gameplay systems: hazard, mortality, ttl, animation
//!
//! These consume the contacts and timers the earlier pipeline stages
//! produced and queue despawns for the flush point. None of them
//! removes an entity mid-iteration, and none may assume an entity it
//! despawned is invisible to a later system in the same tick - the
//! flush at the end of the pipeline is the only removal point.

use super::entity::Entity;
use super::event::{DamageEvent, DeathEvent, Events};
use super::template::TemplateRegistry;
use super::world::World;

/// Apply hazard contact damage. Only the *first* contact of the tick is
/// damaged - a hazard never multi-hits a crowd in one frame. One-shot
/// hazards despawn after touching terrain or anything at all.
pub fn hazards(world: &mut World, events: &mut Events) {
    let ids: Vec<Entity> = world
        .hazards
        .iter()
        .filter_map(|(idx, _)| world.entity_at(idx))
        .collect();

    for e in ids {
        let Some(hazard) = world.hazards.get(e).copied() else { continue };
        let Some(body) = world.bodies.get(e) else { continue };
        let first = body.contacts.first().copied();
        let touched = body.on_terrain || !body.contacts.is_empty();

        if let Some(target) = first {
            // A contact without hit points is simply not damaged
            if let Some(mortal) = world.mortals.get_mut(target) {
                mortal.hp -= hazard.damage;
                events.damage.send(DamageEvent {
                    target,
                    amount: hazard.damage,
                });
            }
        }
        if hazard.one_shot && touched {
            world.despawn(e);
        }
    }
}

/// Despawn anything at or below zero hit points, leaving a death
/// effect at its last position. Runs after `hazards` so a lethal hit
/// resolves on the same frame it landed.
pub fn mortality(world: &mut World, templates: &TemplateRegistry, events: &mut Events) {
    let dead: Vec<(Entity, f32, f32)> = world
        .mortals
        .iter()
        .filter(|(_, m)| m.hp <= 0)
        .filter_map(|(idx, _)| {
            let e = world.entity_at(idx)?;
            let pos = world.positions.get(e)?;
            Some((e, pos.x, pos.y))
        })
        .collect();

    for (e, x, y) in dead {
        let _ = world.spawn_at(templates, "puff", x, y, 0.0);
        events.death.send(DeathEvent { entity: e, x, y });
        world.despawn(e);
    }
}

/// Count down lifetimes; despawn at zero.
pub fn lifetimes(world: &mut World, dt: f32) {
    for (_, ttl) in world.lifetimes.iter_mut() {
        ttl.remaining -= dt;
    }
    let expired: Vec<Entity> = world
        .lifetimes
        .iter()
        .filter(|(_, ttl)| ttl.remaining <= 0.0)
        .filter_map(|(idx, _)| world.entity_at(idx))
        .collect();
    for e in expired {
        world.despawn(e);
    }
}

/// Advance animation cursors and write the resulting frame into the
/// sprite component. Clips wrap independently per entity.
pub fn animation(world: &mut World, dt: f32) {
    let ids: Vec<Entity> = world
        .animations
        .iter()
        .filter_map(|(idx, _)| world.entity_at(idx))
        .collect();

    for e in ids {
        let frame = {
            let Some(anim) = world.animations.get_mut(e) else { continue };
            if anim.frame_delay > 0.0 {
                anim.elapsed += dt;
                while anim.elapsed >= anim.frame_delay {
                    anim.elapsed -= anim.frame_delay;
                    let len = anim
                        .frame_sets
                        .get(anim.active_set)
                        .map_or(0, |clip| clip.len());
                    if len == 0 {
                        break;
                    }
                    anim.cursor = (anim.cursor + 1) % len;
                }
            }
            anim.frame_sets
                .get(anim.active_set)
                .and_then(|clip| clip.get(anim.cursor))
                .copied()
        };
        if let Some(frame) = frame {
            if let Some(sprite) = world.sprites.get_mut(e) {
                sprite.frame = frame;
            }
        }
    }
}
