//! Game components
//!
//! Plain data records attached to entities; behavior lives in systems.
//! Every `Body` is paired with a `Position` by the templates that build
//! entities, and its `bbox` is recomputed immediately after any position
//! change so collision code never reads a stale box.

use serde::{Serialize, Deserialize};
use crate::raycaster::Vec2;
use super::entity::Entity;

// =============================================================================
// Position / Physics
// =============================================================================

/// World placement in tile units, facing in radians
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
    pub facing: f32,
}

impl Position {
    pub fn new(x: f32, y: f32, facing: f32) -> Self {
        Self { x, y, facing }
    }

    pub fn vec(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

/// Axis-aligned bounding box, x/y at the top-left corner
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Bbox {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Bbox {
    /// Overlap rectangle with another box, or None when disjoint.
    /// Touching edges do not count as overlap.
    pub fn overlap(&self, other: &Bbox) -> Option<Bbox> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let w = (self.x + self.w).min(other.x + other.w) - x;
        let h = (self.y + self.h).min(other.y + other.h) - y;
        if w > 0.0 && h > 0.0 {
            Some(Bbox { x, y, w, h })
        } else {
            None
        }
    }

    pub fn area(&self) -> f32 {
        self.w * self.h
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }
}

/// Collision group tag. Which pairs of groups physically interact is
/// decided by the `CollisionMatrix`, not hardcoded in the physics pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Group {
    Player,
    Enemy,
    PlayerShot,
    EnemyShot,
    Effect,
}

pub const GROUP_COUNT: usize = 5;

impl Group {
    fn idx(self) -> usize {
        self as usize
    }
}

/// Symmetric group-pair table consulted by the narrow phase
pub struct CollisionMatrix {
    table: [[bool; GROUP_COUNT]; GROUP_COUNT],
}

impl CollisionMatrix {
    pub fn empty() -> Self {
        Self {
            table: [[false; GROUP_COUNT]; GROUP_COUNT],
        }
    }

    /// The shipped rules: bodies collide with their enemies and their
    /// enemies' shots; effects collide with nothing.
    pub fn standard() -> Self {
        let mut m = Self::empty();
        m.allow(Group::Player, Group::Enemy);
        m.allow(Group::Player, Group::EnemyShot);
        m.allow(Group::Enemy, Group::PlayerShot);
        m.allow(Group::Enemy, Group::Enemy);
        m
    }

    /// Mark an unordered pair collidable (symmetric)
    pub fn allow(&mut self, a: Group, b: Group) {
        self.table[a.idx()][b.idx()] = true;
        self.table[b.idx()][a.idx()] = true;
    }

    pub fn collidable(&self, a: Group, b: Group) -> bool {
        self.table[a.idx()][b.idx()]
    }
}

/// Physics body: an axis-aligned box with velocity. `trigger` bodies
/// detect contacts but are never displaced and never displace others.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Body {
    pub w: f32,
    pub h: f32,
    pub vx: f32,
    pub vy: f32,
    /// 0 = stop dead at obstacles, 1 = reflect at full speed
    pub bounce: f32,
    pub group: Group,
    pub trigger: bool,
    /// Derived from Position every tick; never authoritative
    pub bbox: Bbox,
    /// Touched a wall tile or the map boundary this tick
    pub on_terrain: bool,
    /// Entities whose boxes overlapped this one this tick
    pub contacts: Vec<Entity>,
}

impl Body {
    pub fn new(w: f32, h: f32, group: Group) -> Self {
        Self {
            w,
            h,
            vx: 0.0,
            vy: 0.0,
            bounce: 0.0,
            group,
            trigger: false,
            bbox: Bbox::default(),
            on_terrain: false,
            contacts: Vec::new(),
        }
    }

    pub fn with_bounce(mut self, bounce: f32) -> Self {
        self.bounce = bounce;
        self
    }

    pub fn as_trigger(mut self) -> Self {
        self.trigger = true;
        self
    }

    /// Re-derive the bbox from a position. Must be called after every
    /// position mutation, before any collision code reads the box.
    pub fn recompute_bbox(&mut self, pos: &Position) {
        self.bbox = Bbox {
            x: pos.x - self.w / 2.0,
            y: pos.y - self.h / 2.0,
            w: self.w,
            h: self.h,
        };
    }
}

// =============================================================================
// Combat / Lifetime
// =============================================================================

/// Hit points; the mortality system despawns at hp <= 0
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Mortal {
    pub hp: i32,
}

impl Mortal {
    pub fn new(hp: i32) -> Self {
        Self { hp }
    }
}

/// Deals contact damage. One-shot hazards despawn after their first
/// effective contact or terrain hit.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Hazard {
    pub damage: i32,
    pub one_shot: bool,
}

/// Remaining lifetime in seconds
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TimeToLive {
    pub remaining: f32,
}

// =============================================================================
// Rendering / Animation
// =============================================================================

/// Index into the texture strip; what the sprite pass draws
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Sprite {
    pub frame: usize,
}

/// Selectable animation clips. `frame_sets[active_set]` is the current
/// clip; the animation system advances `cursor` and writes the global
/// frame into `Sprite`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Animation {
    pub frame_sets: Vec<Vec<usize>>,
    pub active_set: usize,
    pub cursor: usize,
    pub frame_delay: f32,
    pub elapsed: f32,
}

impl Animation {
    pub fn new(frame_sets: Vec<Vec<usize>>, frame_delay: f32) -> Self {
        Self {
            frame_sets,
            active_set: 0,
            cursor: 0,
            frame_delay,
            elapsed: 0.0,
        }
    }

    /// Switch clips, rewinding only on an actual change so a repeated
    /// select does not stutter the cycle.
    pub fn set_active(&mut self, set: usize) {
        if set != self.active_set && set < self.frame_sets.len() {
            self.active_set = set;
            self.cursor = 0;
            self.elapsed = 0.0;
        }
    }
}

// =============================================================================
// Behavior / Markers
// =============================================================================

/// Behavior states. Variants, not shared state objects: two entities in
/// `Wander` share nothing but the discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AiState {
    Idle,
    Wander,
    Chase,
    /// Halted, telegraphing the strike
    Windup,
    /// Spawns the damage trigger, then leaves via its timer rule
    Attack,
}

/// Which static behavior model drives this entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelId {
    /// Aimless roamer, re-rolls its heading on a timer
    Drifter,
    /// Hunts the player: chase, telegraph, strike
    Stalker,
}

/// Per-entity FSM bookkeeping; the transition tables live in the static
/// model definitions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Behavior {
    pub model: ModelId,
    /// None until the engine enters the model's initial state
    pub state: Option<AiState>,
    pub elapsed: f32,
    pub target: Option<Entity>,
}

impl Behavior {
    pub fn new(model: ModelId) -> Self {
        Self {
            model,
            state: None,
            elapsed: 0.0,
            target: None,
        }
    }
}

/// Marks the controlled entity; camera follow and target acquisition
/// look for it.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Player;
