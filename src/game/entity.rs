//! Entity identifiers
//!
//! An entity is an opaque id owning no data; components attach to it
//! through the per-kind storages in `World`. Ids are generational: a
//! freed slot is recycled with a bumped generation, so a despawned id
//! can never reappear in any component mapping - stale references to it
//! simply stop resolving.

use serde::{Serialize, Deserialize};

/// Opaque entity id: storage slot index plus the slot's generation at
/// allocation time. Equal ids always mean the same entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Entity {
    index: u32,
    generation: u32,
}

impl Entity {
    pub(crate) fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Slot index, used by component storages and the pair key
    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }
}

/// Allocates entity ids and tracks which are alive.
pub struct EntityAllocator {
    /// Current generation per slot
    generations: Vec<u32>,
    /// Freed slots available for reuse
    free_indices: Vec<u32>,
    next_fresh: u32,
    alive_count: u32,
}

impl EntityAllocator {
    pub fn new() -> Self {
        Self {
            generations: Vec::new(),
            free_indices: Vec::new(),
            next_fresh: 0,
            alive_count: 0,
        }
    }

    pub fn allocate(&mut self) -> Entity {
        self.alive_count += 1;
        if let Some(index) = self.free_indices.pop() {
            // Generation was bumped when the slot was freed
            Entity::new(index, self.generations[index as usize])
        } else {
            let index = self.next_fresh;
            self.next_fresh += 1;
            self.generations.push(0);
            Entity::new(index, 0)
        }
    }

    /// Free an entity. Returns false if it was already dead.
    pub fn free(&mut self, entity: Entity) -> bool {
        if !self.is_alive(entity) {
            return false;
        }
        self.generations[entity.index as usize] += 1;
        self.free_indices.push(entity.index);
        self.alive_count -= 1;
        true
    }

    pub fn is_alive(&self, entity: Entity) -> bool {
        let idx = entity.index as usize;
        idx < self.generations.len() && self.generations[idx] == entity.generation
    }

    pub fn alive_count(&self) -> u32 {
        self.alive_count
    }

    /// Highest slot index ever handed out plus one. Bounds the pair-key
    /// index space for collision dedup.
    pub fn capacity(&self) -> u32 {
        self.next_fresh
    }

    /// Reconstruct the id currently living at a slot. Only meaningful
    /// for slots the caller knows are occupied - component storages are
    /// cleared on despawn, so any occupied component slot is live.
    pub fn entity_at(&self, index: u32) -> Option<Entity> {
        self.generations
            .get(index as usize)
            .map(|&g| Entity::new(index, g))
    }

    /// Invalidate every live entity, e.g. on level transition.
    pub fn clear(&mut self) {
        for gen in &mut self.generations {
            *gen += 1;
        }
        self.free_indices.clear();
        for i in 0..self.next_fresh {
            self.free_indices.push(i);
        }
        self.alive_count = 0;
    }
}

impl Default for EntityAllocator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocate_and_free() {
        let mut alloc = EntityAllocator::new();
        let a = alloc.allocate();
        let b = alloc.allocate();
        assert_eq!(alloc.alive_count(), 2);
        assert!(alloc.free(a));
        assert!(!alloc.free(a));
        assert!(!alloc.is_alive(a));
        assert!(alloc.is_alive(b));
    }

    #[test]
    fn test_freed_id_never_resolves_again() {
        let mut alloc = EntityAllocator::new();
        let a = alloc.allocate();
        alloc.free(a);
        // The slot is recycled, the id is not
        let b = alloc.allocate();
        assert_eq!(b.index(), a.index());
        assert_ne!(b.generation(), a.generation());
        assert!(!alloc.is_alive(a));
        assert!(alloc.is_alive(b));
    }

    #[test]
    fn test_clear_invalidates_everything() {
        let mut alloc = EntityAllocator::new();
        let ids: Vec<_> = (0..5).map(|_| alloc.allocate()).collect();
        alloc.clear();
        assert_eq!(alloc.alive_count(), 0);
        for id in ids {
            assert!(!alloc.is_alive(id));
        }
    }
}
