//! Entity templates
//!
//! A template is a named list of component-factory closures; spawning
//! runs each factory against the fresh entity, so every instance gets
//! its own owned records - there is no shared prototype to alias.

use std::collections::HashMap;

use crate::raycaster::texture::{
    FRAME_BOLT, FRAME_CLAW, FRAME_DRIFTER_A, FRAME_DRIFTER_B, FRAME_GHOUL_A, FRAME_GHOUL_B,
    FRAME_GHOUL_TELEGRAPH, FRAME_PUFF_A, FRAME_PUFF_B, FRAME_PUFF_C,
};
use super::components::*;
use super::entity::Entity;
use super::world::World;

/// Animation clip slots shared by the walking templates
pub const ANIM_MOVE: usize = 0;
pub const ANIM_TELEGRAPH: usize = 1;

/// Builds one component record onto a freshly spawned entity
pub type ComponentFactory = Box<dyn Fn(&mut World, Entity)>;

/// Named sets of component factories, consumed by `World::spawn`.
pub struct TemplateRegistry {
    templates: HashMap<&'static str, Vec<ComponentFactory>>,
}

impl TemplateRegistry {
    pub fn empty() -> Self {
        Self {
            templates: HashMap::new(),
        }
    }

    pub fn register(&mut self, key: &'static str, factories: Vec<ComponentFactory>) {
        self.templates.insert(key, factories);
    }

    /// Run a template's factories against an entity. False for an
    /// unknown key (a content error; the caller decides how loudly to
    /// complain).
    pub fn apply(&self, world: &mut World, entity: Entity, key: &str) -> bool {
        let Some(factories) = self.templates.get(key) else {
            return false;
        };
        for factory in factories {
            factory(world, entity);
        }
        true
    }

    pub fn contains(&self, key: &str) -> bool {
        self.templates.contains_key(key)
    }

    /// Every template the shipped game spawns.
    pub fn standard() -> Self {
        let mut reg = Self::empty();

        reg.register(
            "player",
            vec![
                Box::new(|w, e| w.positions.insert(e, Position::default())),
                Box::new(|w, e| w.bodies.insert(e, Body::new(0.5, 0.5, Group::Player))),
                Box::new(|w, e| w.mortals.insert(e, Mortal::new(10))),
                Box::new(|w, e| w.players.insert(e, Player)),
            ],
        );

        reg.register(
            "ghoul",
            vec![
                Box::new(|w, e| w.positions.insert(e, Position::default())),
                Box::new(|w, e| w.bodies.insert(e, Body::new(0.6, 0.6, Group::Enemy))),
                Box::new(|w, e| w.mortals.insert(e, Mortal::new(3))),
                Box::new(|w, e| w.sprites.insert(e, Sprite { frame: FRAME_GHOUL_A })),
                Box::new(|w, e| {
                    w.animations.insert(
                        e,
                        Animation::new(
                            vec![
                                vec![FRAME_GHOUL_A, FRAME_GHOUL_B],
                                vec![FRAME_GHOUL_TELEGRAPH],
                            ],
                            0.25,
                        ),
                    )
                }),
                Box::new(|w, e| w.behaviors.insert(e, Behavior::new(ModelId::Stalker))),
            ],
        );

        reg.register(
            "drifter",
            vec![
                Box::new(|w, e| w.positions.insert(e, Position::default())),
                Box::new(|w, e| w.bodies.insert(e, Body::new(0.5, 0.5, Group::Enemy))),
                Box::new(|w, e| w.mortals.insert(e, Mortal::new(2))),
                Box::new(|w, e| w.sprites.insert(e, Sprite { frame: FRAME_DRIFTER_A })),
                Box::new(|w, e| {
                    w.animations.insert(
                        e,
                        Animation::new(vec![vec![FRAME_DRIFTER_A, FRAME_DRIFTER_B]], 0.3),
                    )
                }),
                Box::new(|w, e| w.behaviors.insert(e, Behavior::new(ModelId::Drifter))),
            ],
        );

        // Player projectile: a fast one-shot trigger
        reg.register(
            "bolt",
            vec![
                Box::new(|w, e| w.positions.insert(e, Position::default())),
                Box::new(|w, e| {
                    w.bodies
                        .insert(e, Body::new(0.25, 0.25, Group::PlayerShot).as_trigger())
                }),
                Box::new(|w, e| w.hazards.insert(e, Hazard { damage: 1, one_shot: true })),
                Box::new(|w, e| w.sprites.insert(e, Sprite { frame: FRAME_BOLT })),
                Box::new(|w, e| w.lifetimes.insert(e, TimeToLive { remaining: 1.5 })),
            ],
        );

        // Melee swipe spawned by the stalker's attack state
        reg.register(
            "claw",
            vec![
                Box::new(|w, e| w.positions.insert(e, Position::default())),
                Box::new(|w, e| {
                    w.bodies
                        .insert(e, Body::new(0.5, 0.5, Group::EnemyShot).as_trigger())
                }),
                Box::new(|w, e| w.hazards.insert(e, Hazard { damage: 1, one_shot: true })),
                Box::new(|w, e| w.sprites.insert(e, Sprite { frame: FRAME_CLAW })),
                Box::new(|w, e| w.lifetimes.insert(e, TimeToLive { remaining: 0.25 })),
            ],
        );

        // Death effect: animated, bodiless, short-lived
        reg.register(
            "puff",
            vec![
                Box::new(|w, e| w.positions.insert(e, Position::default())),
                Box::new(|w, e| w.sprites.insert(e, Sprite { frame: FRAME_PUFF_A })),
                Box::new(|w, e| {
                    w.animations.insert(
                        e,
                        Animation::new(vec![vec![FRAME_PUFF_A, FRAME_PUFF_B, FRAME_PUFF_C]], 0.08),
                    )
                }),
                Box::new(|w, e| w.lifetimes.insert(e, TimeToLive { remaining: 0.24 })),
            ],
        );

        reg
    }
}
