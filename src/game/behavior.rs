//! Behavior engine
//!
//! A Mealy-style FSM with timed and conditional edges. Models are
//! static data: an initial state plus an ordered rule list. Rule order
//! encodes priority - the first matching rule wins and at most one
//! transition fires per tick. State entry/update/exit hooks are match
//! arms over the `AiState` enum, so entities can never alias a shared
//! state object.

use rand::Rng;

use crate::raycaster::Vec2;
use super::components::{AiState, ModelId};
use super::entity::Entity;
use super::template::{TemplateRegistry, ANIM_MOVE, ANIM_TELEGRAPH};
use super::world::World;

/// Transition condition. Distance triggers measure center-to-center
/// against the tracked target and see an infinite distance when the
/// target is gone, so they can never fire on a vanished entity.
#[derive(Debug, Clone, Copy)]
pub enum Trigger {
    /// Fires once the state has been held for this many seconds
    After(f32),
    TargetWithin(f32),
    TargetBeyond(f32),
    TargetGone,
}

#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub from: AiState,
    pub trigger: Trigger,
    pub to: AiState,
}

/// A complete behavior: transition table plus tuning. New behaviors are
/// new tables, not new code paths.
pub struct BehaviorModel {
    pub initial: AiState,
    pub rules: &'static [Rule],
    pub move_speed: f32,
    /// Template spawned by the Attack state, ahead of the actor
    pub attack_template: Option<&'static str>,
    pub attack_reach: f32,
}

static DRIFTER: BehaviorModel = BehaviorModel {
    initial: AiState::Wander,
    rules: &[
        // Re-roll the heading every few seconds, forever
        Rule { from: AiState::Wander, trigger: Trigger::After(3.0), to: AiState::Wander },
    ],
    move_speed: 1.2,
    attack_template: None,
    attack_reach: 0.0,
};

static STALKER: BehaviorModel = BehaviorModel {
    initial: AiState::Idle,
    rules: &[
        Rule { from: AiState::Idle, trigger: Trigger::TargetWithin(6.0), to: AiState::Chase },
        // Losing the target outranks every other chase edge
        Rule { from: AiState::Chase, trigger: Trigger::TargetGone, to: AiState::Idle },
        Rule { from: AiState::Chase, trigger: Trigger::TargetWithin(1.3), to: AiState::Windup },
        Rule { from: AiState::Chase, trigger: Trigger::TargetBeyond(8.0), to: AiState::Idle },
        Rule { from: AiState::Windup, trigger: Trigger::After(0.45), to: AiState::Attack },
        Rule { from: AiState::Attack, trigger: Trigger::After(0.25), to: AiState::Chase },
    ],
    move_speed: 1.6,
    attack_template: Some("claw"),
    attack_reach: 0.7,
};

impl ModelId {
    pub fn model(self) -> &'static BehaviorModel {
        match self {
            ModelId::Drifter => &DRIFTER,
            ModelId::Stalker => &STALKER,
        }
    }
}

/// Advance every behavior-driven entity by one tick.
pub fn tick(
    world: &mut World,
    templates: &TemplateRegistry,
    rng: &mut impl Rng,
    dt: f32,
) {
    let entities = world.behavior_entities();
    let player = world.player();

    for &e in &entities {
        if !world.is_alive(e) {
            continue;
        }
        let Some(mut beh) = world.behaviors.get(e).copied() else { continue };
        let model = beh.model.model();

        // Hunters track the player; a dead target is dropped, never
        // chased as a stale id
        if beh.target.map_or(true, |t| !world.is_alive(t)) {
            beh.target = match beh.model {
                ModelId::Stalker => player,
                ModelId::Drifter => None,
            };
        }

        if beh.state.is_none() {
            beh.state = Some(model.initial);
            beh.elapsed = 0.0;
            enter(world, templates, e, model, model.initial, rng);
        }
        beh.elapsed += dt;

        let dist = target_distance(world, e, beh.target);
        let Some(current) = beh.state else { continue };

        // First matching rule wins; one transition per tick
        for rule in model.rules {
            if rule.from != current {
                continue;
            }
            let fires = match rule.trigger {
                Trigger::After(t) => beh.elapsed >= t,
                Trigger::TargetWithin(d) => dist <= d,
                Trigger::TargetBeyond(d) => dist.is_finite() && dist > d,
                Trigger::TargetGone => dist.is_infinite(),
            };
            if fires {
                exit(world, e, current);
                beh.state = Some(rule.to);
                beh.elapsed = 0.0;
                enter(world, templates, e, model, rule.to, rng);
                break;
            }
        }

        // Whether or not a transition fired, the current state updates
        if let Some(state) = beh.state {
            update(world, e, model, state, beh.target);
        }

        if let Some(slot) = world.behaviors.get_mut(e) {
            *slot = beh;
        }
    }
}

/// Center-to-center distance to the target, infinite when it is gone
fn target_distance(world: &World, e: Entity, target: Option<Entity>) -> f32 {
    let Some(t) = target else { return f32::INFINITY };
    if !world.is_alive(t) {
        return f32::INFINITY;
    }
    let (Some(a), Some(b)) = (world.positions.get(e), world.positions.get(t)) else {
        return f32::INFINITY;
    };
    (a.vec() - b.vec()).len()
}

fn enter(
    world: &mut World,
    templates: &TemplateRegistry,
    e: Entity,
    model: &BehaviorModel,
    state: AiState,
    rng: &mut impl Rng,
) {
    match state {
        AiState::Idle => {
            halt(world, e);
            set_clip(world, e, ANIM_MOVE);
        }
        AiState::Wander => {
            let heading = rng.gen_range(0.0..std::f32::consts::TAU);
            if let Some(pos) = world.positions.get_mut(e) {
                pos.facing = heading;
            }
            if let Some(body) = world.bodies.get_mut(e) {
                let v = Vec2::from_angle(heading) * model.move_speed;
                body.vx = v.x;
                body.vy = v.y;
            }
            set_clip(world, e, ANIM_MOVE);
        }
        AiState::Chase => {
            set_clip(world, e, ANIM_MOVE);
        }
        AiState::Windup => {
            halt(world, e);
            set_clip(world, e, ANIM_TELEGRAPH);
        }
        AiState::Attack => {
            let Some(template) = model.attack_template else { return };
            let Some(pos) = world.positions.get(e).copied() else { return };
            let ahead = pos.vec() + Vec2::from_angle(pos.facing) * model.attack_reach;
            let _ = world.spawn_at(templates, template, ahead.x, ahead.y, pos.facing);
        }
    }
}

fn exit(world: &mut World, e: Entity, state: AiState) {
    if state == AiState::Windup {
        set_clip(world, e, ANIM_MOVE);
    }
}

fn update(world: &mut World, e: Entity, model: &BehaviorModel, state: AiState, target: Option<Entity>) {
    if state != AiState::Chase {
        return;
    }
    // Face and move toward the target; stop if it no longer exists
    let tpos = target
        .filter(|&t| world.is_alive(t))
        .and_then(|t| world.positions.get(t))
        .copied();
    let Some(own) = world.positions.get(e).copied() else { return };
    match tpos {
        Some(tp) => {
            let to = Vec2::new(tp.x - own.x, tp.y - own.y);
            if to.len() > 1e-4 {
                let facing = to.angle();
                if let Some(pos) = world.positions.get_mut(e) {
                    pos.facing = facing;
                }
                if let Some(body) = world.bodies.get_mut(e) {
                    let v = to.normalize() * model.move_speed;
                    body.vx = v.x;
                    body.vy = v.y;
                }
            }
        }
        None => halt(world, e),
    }
}

fn halt(world: &mut World, e: Entity) {
    if let Some(body) = world.bodies.get_mut(e) {
        body.vx = 0.0;
        body.vy = 0.0;
    }
}

fn set_clip(world: &mut World, e: Entity, set: usize) {
    if let Some(anim) = world.animations.get_mut(e) {
        anim.set_active(set);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;

    fn fixed_rng() -> StepRng {
        StepRng::new(0, 1)
    }

    #[test]
    fn test_timed_self_transition_fires_once_and_resets() {
        let reg = TemplateRegistry::standard();
        let mut world = World::new();
        let mut rng = fixed_rng();
        let e = world.spawn_at(&reg, "drifter", 4.0, 4.0, 0.0).unwrap();

        // First tick enters Wander and accumulates 1s
        tick(&mut world, &reg, &mut rng, 1.0);
        let beh = world.behaviors.get(e).unwrap();
        assert_eq!(beh.state, Some(AiState::Wander));
        assert!((beh.elapsed - 1.0).abs() < 1e-6);

        tick(&mut world, &reg, &mut rng, 1.0);
        // Elapsed hits exactly 3.0: the wander->wander rule fires once
        // and the timer resets; no second transition in the same tick
        tick(&mut world, &reg, &mut rng, 1.0);
        let beh = world.behaviors.get(e).unwrap();
        assert_eq!(beh.state, Some(AiState::Wander));
        assert_eq!(beh.elapsed, 0.0);

        // The re-entered wander still moves at model speed
        let body = world.bodies.get(e).unwrap();
        let speed = (body.vx * body.vx + body.vy * body.vy).sqrt();
        assert!((speed - ModelId::Drifter.model().move_speed).abs() < 1e-4);
    }

    #[test]
    fn test_stalker_closes_in_on_player() {
        let reg = TemplateRegistry::standard();
        let mut world = World::new();
        let mut rng = fixed_rng();
        let _player = world.spawn_at(&reg, "player", 5.0, 4.0, 0.0).unwrap();
        let e = world.spawn_at(&reg, "ghoul", 2.0, 4.0, 0.0).unwrap();

        // Idle -> Chase on proximity
        tick(&mut world, &reg, &mut rng, 0.016);
        assert_eq!(world.behaviors.get(e).unwrap().state, Some(AiState::Chase));

        // Chasing: moving toward the player, facing it
        tick(&mut world, &reg, &mut rng, 0.016);
        let body = world.bodies.get(e).unwrap();
        assert!(body.vx > 0.0);
        assert!(body.vy.abs() < 1e-4);
        assert!(world.positions.get(e).unwrap().facing.abs() < 1e-4);
    }

    #[test]
    fn test_vanished_target_never_triggers_distance_rules() {
        let reg = TemplateRegistry::standard();
        let mut world = World::new();
        let mut rng = fixed_rng();
        let player = world.spawn_at(&reg, "player", 2.5, 4.0, 0.0).unwrap();
        let e = world.spawn_at(&reg, "ghoul", 2.0, 4.0, 0.0).unwrap();

        tick(&mut world, &reg, &mut rng, 0.016);
        assert_eq!(world.behaviors.get(e).unwrap().state, Some(AiState::Chase));

        world.despawn(player);
        world.flush_despawns();

        // TargetGone wins; TargetWithin can never fire on the dead id
        tick(&mut world, &reg, &mut rng, 0.016);
        let beh = world.behaviors.get(e).unwrap();
        assert_eq!(beh.state, Some(AiState::Idle));
        let body = world.bodies.get(e).unwrap();
        assert_eq!((body.vx, body.vy), (0.0, 0.0));
    }

    #[test]
    fn test_attack_spawns_hazard_ahead() {
        let reg = TemplateRegistry::standard();
        let mut world = World::new();
        let mut rng = fixed_rng();
        let _player = world.spawn_at(&reg, "player", 3.0, 4.0, 0.0).unwrap();
        let e = world.spawn_at(&reg, "ghoul", 2.0, 4.0, 0.0).unwrap();

        // Pin the machine just before the windup timer expires
        {
            let beh = world.behaviors.get_mut(e).unwrap();
            beh.state = Some(AiState::Windup);
            beh.elapsed = 0.44;
        }
        world.positions.get_mut(e).unwrap().facing = 0.0;
        assert_eq!(world.hazards.count(), 0);

        tick(&mut world, &reg, &mut rng, 0.02);

        assert_eq!(world.behaviors.get(e).unwrap().state, Some(AiState::Attack));
        assert_eq!(world.hazards.count(), 1);
        // The claw sits ahead of the actor along its facing
        let (idx, _) = world.hazards.iter().next().unwrap();
        let claw = world.entity_at(idx).unwrap();
        let cpos = world.positions.get(claw).unwrap();
        let reach = ModelId::Stalker.model().attack_reach;
        assert!((cpos.x - (2.0 + reach)).abs() < 1e-4);
        assert!((cpos.y - 4.0).abs() < 1e-4);
    }
}
