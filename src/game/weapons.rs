//! Weapon registry
//!
//! Weapons are data: which projectile template to spawn, how far ahead
//! of the shooter, how fast, and how long until the next shot. The
//! input glue owns the cooldown timer and calls `fire`.

use std::collections::HashMap;

use crate::raycaster::Vec2;
use super::entity::Entity;
use super::template::TemplateRegistry;
use super::world::World;

#[derive(Debug, Clone, Copy)]
pub struct WeaponDef {
    pub projectile_template: &'static str,
    /// Spawn distance ahead of the shooter, along its facing
    pub spawn_offset: f32,
    pub projectile_speed: f32,
    pub cooldown: f32,
}

pub struct WeaponRegistry {
    weapons: HashMap<&'static str, WeaponDef>,
}

impl WeaponRegistry {
    pub fn empty() -> Self {
        Self {
            weapons: HashMap::new(),
        }
    }

    pub fn register(&mut self, key: &'static str, def: WeaponDef) {
        self.weapons.insert(key, def);
    }

    pub fn get(&self, key: &str) -> Option<&WeaponDef> {
        self.weapons.get(key)
    }

    pub fn standard() -> Self {
        let mut reg = Self::empty();
        reg.register(
            "spitter",
            WeaponDef {
                projectile_template: "bolt",
                spawn_offset: 0.6,
                projectile_speed: 9.0,
                cooldown: 0.35,
            },
        );
        reg
    }
}

/// Spawn a weapon's projectile ahead of the shooter, moving along the
/// shooter's facing. Returns the projectile when everything resolved.
pub fn fire(
    world: &mut World,
    templates: &TemplateRegistry,
    weapon: &WeaponDef,
    shooter: Entity,
) -> Option<Entity> {
    let pos = world.positions.get(shooter).copied()?;
    let dir = Vec2::from_angle(pos.facing);
    let at = pos.vec() + dir * weapon.spawn_offset;
    let projectile = world.spawn_at(templates, weapon.projectile_template, at.x, at.y, pos.facing)?;
    if let Some(body) = world.bodies.get_mut(projectile) {
        body.vx = dir.x * weapon.projectile_speed;
        body.vy = dir.y * weapon.projectile_speed;
    }
    Some(projectile)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fire_spawns_moving_projectile() {
        let templates = TemplateRegistry::standard();
        let weapons = WeaponRegistry::standard();
        let mut world = World::new();
        let shooter = world.spawn_at(&templates, "player", 3.0, 3.0, 0.0).unwrap();

        let def = *weapons.get("spitter").unwrap();
        let bolt = fire(&mut world, &templates, &def, shooter).unwrap();

        let pos = world.positions.get(bolt).unwrap();
        assert!((pos.x - 3.6).abs() < 1e-5);
        assert!((pos.y - 3.0).abs() < 1e-5);

        let body = world.bodies.get(bolt).unwrap();
        assert!((body.vx - 9.0).abs() < 1e-5);
        assert!(body.vy.abs() < 1e-5);
        assert!(body.trigger);
        assert!(world.hazards.contains(bolt));
    }
}
