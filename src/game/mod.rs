//! Simulation core
//!
//! An ECS-inspired runtime sized for this game: entities are
//! generational ids, components live in typed sparse storages on a
//! `World` that is passed into each system, and the systems run as a
//! fixed pipeline once per frame.
//!
//! Key pieces:
//! - Entity / ComponentStorage / World: the store
//! - SpatialHash + physics: broad phase, tile and body collision
//! - behavior: table-driven FSMs for the monsters
//! - systems: hazard, mortality, ttl, animation
//! - template / weapons: data registries consumed by spawning

pub mod behavior;
pub mod component;
pub mod components;
pub mod entity;
pub mod event;
pub mod physics;
pub mod spatial;
pub mod systems;
pub mod template;
pub mod weapons;
pub mod world;

pub use component::ComponentStorage;
pub use entity::Entity;
pub use event::Events;
pub use template::TemplateRegistry;
pub use weapons::WeaponRegistry;
pub use world::World;
