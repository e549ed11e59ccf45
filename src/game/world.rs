//! The simulation context
//!
//! `World` owns every component storage and the entity allocator. It is
//! passed by reference into each system call; there are no process-wide
//! singletons. Component kinds are typed fields known at compile time,
//! not a TypeId registry - this game knows exactly what it stores.

use super::component::ComponentStorage;
use super::components::*;
use super::entity::{Entity, EntityAllocator};
use super::template::TemplateRegistry;

/// All entities and their components.
pub struct World {
    entities: EntityAllocator,
    /// Entities queued for removal at the tick's flush point. Systems
    /// never remove mid-iteration; pipeline order is the only
    /// synchronization.
    despawn_queue: Vec<Entity>,

    pub positions: ComponentStorage<Position>,
    pub bodies: ComponentStorage<Body>,
    pub mortals: ComponentStorage<Mortal>,
    pub hazards: ComponentStorage<Hazard>,
    pub sprites: ComponentStorage<Sprite>,
    pub animations: ComponentStorage<Animation>,
    pub lifetimes: ComponentStorage<TimeToLive>,
    pub behaviors: ComponentStorage<Behavior>,
    pub players: ComponentStorage<Player>,
}

impl World {
    pub fn new() -> Self {
        Self {
            entities: EntityAllocator::new(),
            despawn_queue: Vec::new(),
            positions: ComponentStorage::new(),
            bodies: ComponentStorage::new(),
            mortals: ComponentStorage::new(),
            hazards: ComponentStorage::new(),
            sprites: ComponentStorage::new(),
            animations: ComponentStorage::new(),
            lifetimes: ComponentStorage::new(),
            behaviors: ComponentStorage::new(),
            players: ComponentStorage::new(),
        }
    }

    // =========================================================================
    // Spawning
    // =========================================================================

    /// Spawn from a template with the template's own placement. Every
    /// factory builds a fresh owned record, so instances never share
    /// state. Returns None for an unknown key.
    pub fn spawn(&mut self, templates: &TemplateRegistry, key: &str) -> Option<Entity> {
        let entity = self.entities.allocate();
        if !templates.apply(self, entity, key) {
            self.entities.free(entity);
            return None;
        }
        self.refresh_bbox(entity);
        Some(entity)
    }

    /// Spawn from a template at an explicit position and facing. The
    /// override always applies - spawning at literal (0, 0, 0) lands
    /// exactly there.
    pub fn spawn_at(
        &mut self,
        templates: &TemplateRegistry,
        key: &str,
        x: f32,
        y: f32,
        facing: f32,
    ) -> Option<Entity> {
        let entity = self.spawn(templates, key)?;
        if let Some(pos) = self.positions.get_mut(entity) {
            pos.x = x;
            pos.y = y;
            pos.facing = facing;
        }
        self.refresh_bbox(entity);
        Some(entity)
    }

    /// Re-derive an entity's bbox after a position change
    pub fn refresh_bbox(&mut self, entity: Entity) {
        if let Some(pos) = self.positions.get(entity) {
            let pos = *pos;
            if let Some(body) = self.bodies.get_mut(entity) {
                body.recompute_bbox(&pos);
            }
        }
    }

    // =========================================================================
    // Despawning
    // =========================================================================

    /// Queue an entity for removal at the end of the tick.
    pub fn despawn(&mut self, entity: Entity) {
        if self.is_alive(entity) && !self.despawn_queue.contains(&entity) {
            self.despawn_queue.push(entity);
        }
    }

    /// Remove an entity from every component mapping immediately.
    /// Prefer `despawn` inside systems; this runs at the flush point.
    pub fn despawn_immediate(&mut self, entity: Entity) {
        if !self.entities.free(entity) {
            return;
        }
        let idx = entity.index();
        self.positions.clear_slot(idx);
        self.bodies.clear_slot(idx);
        self.mortals.clear_slot(idx);
        self.hazards.clear_slot(idx);
        self.sprites.clear_slot(idx);
        self.animations.clear_slot(idx);
        self.lifetimes.clear_slot(idx);
        self.behaviors.clear_slot(idx);
        self.players.clear_slot(idx);
    }

    /// Process queued despawns. Called once per tick, after the
    /// gameplay systems and before rendering.
    pub fn flush_despawns(&mut self) {
        let queue = std::mem::take(&mut self.despawn_queue);
        for entity in queue {
            self.despawn_immediate(entity);
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn is_alive(&self, entity: Entity) -> bool {
        self.entities.is_alive(entity)
    }

    pub fn entity_count(&self) -> u32 {
        self.entities.alive_count()
    }

    /// Entity ids that currently carry a body; the order is stable
    /// within a tick. Collected up front so systems can mutate freely
    /// while walking the list.
    pub fn body_entities(&self) -> Vec<Entity> {
        self.collect_with(|w, e| w.bodies.contains(e))
    }

    pub fn behavior_entities(&self) -> Vec<Entity> {
        self.collect_with(|w, e| w.behaviors.contains(e))
    }

    /// The controlled entity, if one is alive
    pub fn player(&self) -> Option<Entity> {
        let (idx, _) = self.players.iter().next()?;
        self.entity_at(idx)
    }

    /// Resolve a raw slot index back to a live entity id. Valid for
    /// occupied component slots: despawn clears slots, so an occupied
    /// slot always belongs to the allocator's current generation.
    pub fn entity_at(&self, index: u32) -> Option<Entity> {
        let e = self.entities.entity_at(index)?;
        self.is_alive(e).then_some(e)
    }

    fn collect_with(&self, keep: impl Fn(&World, Entity) -> bool) -> Vec<Entity> {
        let mut out = Vec::new();
        for (idx, _) in self.positions.iter() {
            if let Some(e) = self.entity_at(idx) {
                if keep(self, e) {
                    out.push(e);
                }
            }
        }
        out
    }

    /// Drop every entity and component, e.g. on level transition. Old
    /// ids never resolve again.
    pub fn clear(&mut self) {
        self.entities.clear();
        self.despawn_queue.clear();
        self.positions.clear();
        self.bodies.clear();
        self.mortals.clear();
        self.hazards.clear();
        self.sprites.clear();
        self.animations.clear();
        self.lifetimes.clear();
        self.behaviors.clear();
        self.players.clear();
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_despawn_removes_every_component() {
        let reg = TemplateRegistry::standard();
        let mut world = World::new();
        let e = world.spawn_at(&reg, "ghoul", 3.0, 4.0, 0.0).unwrap();
        world.despawn(e);
        // Still visible until the flush point
        assert!(world.is_alive(e));
        world.flush_despawns();
        assert!(!world.is_alive(e));
        assert!(!world.positions.contains(e));
        assert!(!world.bodies.contains(e));
        assert!(!world.mortals.contains(e));
        assert!(!world.sprites.contains(e));
        assert!(!world.animations.contains(e));
        assert!(!world.behaviors.contains(e));
    }

    #[test]
    fn test_double_despawn_is_harmless() {
        let reg = TemplateRegistry::standard();
        let mut world = World::new();
        let e = world.spawn(&reg, "drifter").unwrap();
        world.despawn(e);
        world.despawn(e);
        world.flush_despawns();
        assert_eq!(world.entity_count(), 0);
    }

    #[test]
    fn test_player_lookup() {
        let reg = TemplateRegistry::standard();
        let mut world = World::new();
        assert!(world.player().is_none());
        let p = world.spawn_at(&reg, "player", 2.0, 2.0, 0.0).unwrap();
        assert_eq!(world.player(), Some(p));
    }

    #[test]
    fn test_clear_invalidates_old_ids() {
        let reg = TemplateRegistry::standard();
        let mut world = World::new();
        let e = world.spawn(&reg, "drifter").unwrap();
        world.clear();
        assert!(!world.is_alive(e));
        assert_eq!(world.entity_count(), 0);
        // New spawns never revive the old id
        let f = world.spawn(&reg, "drifter").unwrap();
        assert_ne!(e, f);
    }
}
