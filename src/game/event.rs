//! Frame events
//!
//! Systems record what happened this tick; the glue layer (HUD, game
//! flow) drains the queues after the pipeline runs. Queues are cleared
//! every frame - events are observations, not state.

use super::entity::Entity;

/// A queue for events of a single type.
#[derive(Debug)]
pub struct EventQueue<T> {
    events: Vec<T>,
}

impl<T> EventQueue<T> {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn send(&mut self, event: T) {
        self.events.push(event);
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl<T> Default for EventQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// All event queues for one frame.
pub struct Events {
    pub damage: EventQueue<DamageEvent>,
    pub death: EventQueue<DeathEvent>,
}

impl Events {
    pub fn new() -> Self {
        Self {
            damage: EventQueue::new(),
            death: EventQueue::new(),
        }
    }

    /// Call at end of frame, after the glue layer has looked.
    pub fn clear_all(&mut self) {
        self.damage.clear();
        self.death.clear();
    }
}

impl Default for Events {
    fn default() -> Self {
        Self::new()
    }
}

/// A hazard damaged an entity
#[derive(Debug, Clone, Copy)]
pub struct DamageEvent {
    pub target: Entity,
    pub amount: i32,
}

/// An entity ran out of hit points
#[derive(Debug, Clone, Copy)]
pub struct DeathEvent {
    pub entity: Entity,
    pub x: f32,
    pub y: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_send_and_clear() {
        let mut events = Events::new();
        events.damage.send(DamageEvent {
            target: Entity::new(0, 0),
            amount: 2,
        });
        assert_eq!(events.damage.len(), 1);
        events.clear_all();
        assert!(events.damage.is_empty());
    }
}
