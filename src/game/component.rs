//! Component storage
//!
//! One sparse map per component kind: a `Vec<Option<T>>` indexed by
//! entity slot. Lookups for entities that lack the component return
//! None; systems check before use rather than treating absence as an
//! error.

use super::entity::Entity;

/// Sparse storage for a single component kind.
pub struct ComponentStorage<T> {
    data: Vec<Option<T>>,
}

impl<T> ComponentStorage<T> {
    pub fn new() -> Self {
        Self { data: Vec::new() }
    }

    fn ensure_capacity(&mut self, index: usize) {
        if index >= self.data.len() {
            self.data.resize_with(index + 1, || None);
        }
    }

    /// Attach a component, replacing any existing record.
    pub fn insert(&mut self, entity: Entity, component: T) {
        let idx = entity.index() as usize;
        self.ensure_capacity(idx);
        self.data[idx] = Some(component);
    }

    pub fn remove(&mut self, entity: Entity) -> Option<T> {
        let idx = entity.index() as usize;
        if idx < self.data.len() {
            self.data[idx].take()
        } else {
            None
        }
    }

    pub fn get(&self, entity: Entity) -> Option<&T> {
        self.data.get(entity.index() as usize).and_then(|o| o.as_ref())
    }

    pub fn get_mut(&mut self, entity: Entity) -> Option<&mut T> {
        self.data
            .get_mut(entity.index() as usize)
            .and_then(|o| o.as_mut())
    }

    /// Mutable access to two distinct entities' components at once.
    /// Needed by pairwise collision response, which pushes both bodies
    /// apart in a single step. Returns None if the entities are equal
    /// or either lacks the component.
    pub fn get_pair_mut(&mut self, a: Entity, b: Entity) -> Option<(&mut T, &mut T)> {
        let ia = a.index() as usize;
        let ib = b.index() as usize;
        if ia == ib || ia >= self.data.len() || ib >= self.data.len() {
            return None;
        }
        let (lo, hi) = if ia < ib { (ia, ib) } else { (ib, ia) };
        let (left, right) = self.data.split_at_mut(hi);
        let (first, second) = (left[lo].as_mut()?, right[0].as_mut()?);
        if ia < ib {
            Some((first, second))
        } else {
            Some((second, first))
        }
    }

    pub fn contains(&self, entity: Entity) -> bool {
        matches!(self.data.get(entity.index() as usize), Some(Some(_)))
    }

    /// Iterate (slot index, component). Liveness is the caller's
    /// concern; despawn clears slots, so stale entries never appear.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &T)> {
        self.data
            .iter()
            .enumerate()
            .filter_map(|(idx, o)| o.as_ref().map(|c| (idx as u32, c)))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (u32, &mut T)> {
        self.data
            .iter_mut()
            .enumerate()
            .filter_map(|(idx, o)| o.as_mut().map(|c| (idx as u32, c)))
    }

    /// Drop the component at a raw slot; used by despawn.
    pub fn clear_slot(&mut self, index: u32) {
        if let Some(slot) = self.data.get_mut(index as usize) {
            *slot = None;
        }
    }

    /// Drop every component; used on level transition.
    pub fn clear(&mut self) {
        for slot in &mut self.data {
            *slot = None;
        }
    }

    pub fn count(&self) -> usize {
        self.data.iter().filter(|o| o.is_some()).count()
    }
}

impl<T> Default for ComponentStorage<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_get_remove() {
        let mut storage: ComponentStorage<i32> = ComponentStorage::new();
        let e = Entity::new(3, 0);
        storage.insert(e, 7);
        assert_eq!(storage.get(e), Some(&7));
        assert_eq!(storage.remove(e), Some(7));
        assert!(!storage.contains(e));
    }

    #[test]
    fn test_get_pair_mut_disjoint() {
        let mut storage: ComponentStorage<i32> = ComponentStorage::new();
        let a = Entity::new(1, 0);
        let b = Entity::new(4, 0);
        storage.insert(a, 10);
        storage.insert(b, 20);

        let (ra, rb) = storage.get_pair_mut(a, b).unwrap();
        std::mem::swap(ra, rb);
        assert_eq!(storage.get(a), Some(&20));
        assert_eq!(storage.get(b), Some(&10));

        // Order-reversed call maps results back to the argument order
        let (rb2, ra2) = storage.get_pair_mut(b, a).unwrap();
        *rb2 += 1;
        *ra2 += 2;
        assert_eq!(storage.get(a), Some(&22));
        assert_eq!(storage.get(b), Some(&11));
    }

    #[test]
    fn test_get_pair_mut_rejects_self() {
        let mut storage: ComponentStorage<i32> = ComponentStorage::new();
        let a = Entity::new(2, 0);
        storage.insert(a, 5);
        assert!(storage.get_pair_mut(a, a).is_none());
    }

    #[test]
    fn test_sparse_holes() {
        let mut storage: ComponentStorage<&str> = ComponentStorage::new();
        storage.insert(Entity::new(50, 0), "far");
        assert!(storage.contains(Entity::new(50, 0)));
        assert!(!storage.contains(Entity::new(10, 0)));
        assert_eq!(storage.count(), 1);
    }
}
