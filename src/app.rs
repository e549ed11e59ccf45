//! Game flow
//!
//! The screen sequencer (title, play, game over) and the fixed
//! per-frame pipeline. Everything here is glue around the simulation
//! core: it decides what runs, in what order, and builds levels; the
//! systems themselves do the work.

use rand::rngs::ThreadRng;
use rand::Rng;
use tracing::{debug, info};

use crate::game::components::CollisionMatrix;
use crate::game::spatial::SpatialHash;
use crate::game::{behavior, physics, systems, weapons};
use crate::game::{Entity, Events, TemplateRegistry, WeaponRegistry, World};
use crate::input::{Action, InputState};
use crate::raycaster::render::SpriteInstance;
use crate::raycaster::{
    render_sprites, render_walls, Camera, Framebuffer, TextureStrip, CAMERA_HEIGHT, CAMERA_WIDTH,
};
use crate::settings::GameSettings;
use crate::world::{pick_generator, TileMap};

/// Frames longer than this (a backgrounded window, a debugger pause)
/// are discarded whole rather than integrated as one giant step.
pub const MAX_FRAME_DT: f32 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Title,
    Playing,
    GameOver,
}

pub struct App {
    settings: GameSettings,
    templates: TemplateRegistry,
    weapons: WeaponRegistry,
    matrix: CollisionMatrix,

    world: World,
    map: TileMap,
    hash: SpatialHash,
    events: Events,

    camera: Camera,
    fb: Framebuffer,
    strip: TextureStrip,
    input: InputState,
    rng: ThreadRng,
    sprite_scratch: Vec<SpriteInstance>,

    screen: Screen,
    level: u32,
    kills: u32,
    player_entity: Option<Entity>,
    fire_cooldown: f32,
    sweep_angle: f32,
}

impl App {
    pub fn new(settings: GameSettings, strip: TextureStrip) -> Self {
        let mut app = Self {
            settings,
            templates: TemplateRegistry::standard(),
            weapons: WeaponRegistry::standard(),
            matrix: CollisionMatrix::standard(),
            world: World::new(),
            map: TileMap::from_tiles(1, 1, vec![1]),
            hash: SpatialHash::new(1, 1),
            events: Events::new(),
            camera: Camera::new(),
            fb: Framebuffer::new(CAMERA_WIDTH, CAMERA_HEIGHT),
            strip,
            input: InputState::new(),
            rng: rand::thread_rng(),
            sprite_scratch: Vec::new(),
            screen: Screen::Title,
            level: 1,
            kills: 0,
            player_entity: None,
            fire_cooldown: 0.0,
            sweep_angle: 0.0,
        };
        app.build_level();
        app
    }

    // =========================================================================
    // Level lifecycle
    // =========================================================================

    /// Build a fresh level: new map from a random generator, new
    /// spatial hash, repopulated world. The old map and entities are
    /// discarded wholesale.
    fn build_level(&mut self) {
        let (name, generator) = pick_generator(&mut self.rng);
        self.map = TileMap::generate(self.settings.map_width, self.settings.map_height, generator);
        self.hash = SpatialHash::new(self.map.width(), self.map.height());
        self.world.clear();

        let (px, py) = random_open_tile(&self.map, &mut self.rng);
        self.player_entity = self.world.spawn_at(&self.templates, "player", px, py, 0.0);

        let ghouls = 2 + self.level;
        for _ in 0..ghouls {
            let (x, y) = random_open_tile(&self.map, &mut self.rng);
            let _ = self.world.spawn_at(&self.templates, "ghoul", x, y, 0.0);
        }
        for _ in 0..2 {
            let (x, y) = random_open_tile(&self.map, &mut self.rng);
            let _ = self.world.spawn_at(&self.templates, "drifter", x, y, 0.0);
        }

        info!(level = self.level, generator = name, "level built");
    }

    // =========================================================================
    // Frame driver
    // =========================================================================

    pub fn frame(&mut self, dt: f32) {
        if dt > MAX_FRAME_DT {
            // One skipped frame beats one giant integration step
            debug!(dt, "oversized frame skipped");
            return;
        }
        match self.screen {
            Screen::Title => self.title_frame(dt),
            Screen::Playing => self.play_frame(dt),
            Screen::GameOver => self.game_over_frame(),
        }
    }

    /// Scripted camera sweep over the frozen level
    fn title_frame(&mut self, dt: f32) {
        self.sweep_angle += 0.35 * dt;
        self.camera.pos.x = self.map.width() as f32 / 2.0;
        self.camera.pos.y = self.map.height() as f32 / 2.0;
        self.camera.set_facing(self.sweep_angle);
        self.render();

        if self.input.action_pressed(Action::Confirm) {
            self.level = 1;
            self.kills = 0;
            self.build_level();
            self.screen = Screen::Playing;
            info!("run started");
        }
    }

    /// The fixed pipeline: input, behavior, physics, hazard, mortality,
    /// ttl, flush, animation, camera sync, render.
    fn play_frame(&mut self, dt: f32) {
        self.player_input(dt);
        behavior::tick(&mut self.world, &self.templates, &mut self.rng, dt);
        physics::tick(&mut self.world, &self.map, &self.matrix, &mut self.hash, dt);
        systems::hazards(&mut self.world, &mut self.events);
        systems::mortality(&mut self.world, &self.templates, &mut self.events);
        systems::lifetimes(&mut self.world, dt);
        self.world.flush_despawns();
        systems::animation(&mut self.world, dt);

        for death in self.events.death.iter() {
            if Some(death.entity) != self.player_entity {
                self.kills += 1;
            }
        }
        self.events.clear_all();

        self.sync_camera();
        self.render();

        if self.world.player().is_none() {
            info!(level = self.level, kills = self.kills, "player fell");
            self.screen = Screen::GameOver;
        } else if self.world.behaviors.count() == 0 {
            self.level += 1;
            self.build_level();
        }
    }

    /// Nothing simulates; the last rendered frame stays up
    fn game_over_frame(&mut self) {
        if self.input.action_pressed(Action::Confirm) {
            self.screen = Screen::Title;
            self.sweep_angle = 0.0;
        }
    }

    // =========================================================================
    // Player control (input-driven, external to the core systems)
    // =========================================================================

    fn player_input(&mut self, dt: f32) {
        let Some(player) = self.world.player() else { return };

        let turn = self.input.turn_axis();
        let (forward, strafe) = self.input.move_axes();

        let facing = {
            let Some(pos) = self.world.positions.get_mut(player) else { return };
            pos.facing += turn * self.settings.turn_speed * dt;
            pos.facing
        };

        if let Some(body) = self.world.bodies.get_mut(player) {
            let (sin, cos) = facing.sin_cos();
            // Forward along facing, strafe along its perpendicular
            body.vx = (cos * forward - sin * strafe) * self.settings.move_speed;
            body.vy = (sin * forward + cos * strafe) * self.settings.move_speed;
        }

        self.fire_cooldown -= dt;
        if self.fire_cooldown <= 0.0 && self.input.action_down(Action::Fire) {
            if let Some(def) = self.weapons.get(&self.settings.weapon).copied() {
                if weapons::fire(&mut self.world, &self.templates, &def, player).is_some() {
                    self.fire_cooldown = def.cooldown;
                }
            }
        }
    }

    fn sync_camera(&mut self) {
        let Some(player) = self.world.player() else { return };
        if let Some(pos) = self.world.positions.get(player) {
            self.camera.pos = pos.vec();
            self.camera.set_facing(pos.facing);
        }
    }

    // =========================================================================
    // Rendering
    // =========================================================================

    fn render(&mut self) {
        self.fb
            .clear_shaded(self.settings.ceiling_tint, self.settings.floor_tint);
        render_walls(&mut self.fb, &self.map, &self.camera, &self.strip);

        // Everything with a sprite billboard except the camera holder
        self.sprite_scratch.clear();
        for (idx, sprite) in self.world.sprites.iter() {
            let Some(e) = self.world.entity_at(idx) else { continue };
            if Some(e) == self.player_entity {
                continue;
            }
            let Some(pos) = self.world.positions.get(e) else { continue };
            self.sprite_scratch.push(SpriteInstance {
                pos: pos.vec(),
                frame: sprite.frame,
            });
        }
        render_sprites(&mut self.fb, &self.camera, &mut self.sprite_scratch, &self.strip);
    }

    // =========================================================================
    // Read access for the shell (HUD, upload)
    // =========================================================================

    pub fn framebuffer(&self) -> &Framebuffer {
        &self.fb
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn kills(&self) -> u32 {
        self.kills
    }

    pub fn player_hp(&self) -> i32 {
        self.world
            .player()
            .and_then(|p| self.world.mortals.get(p))
            .map_or(0, |m| m.hp)
    }
}

/// Center of a uniformly sampled open tile. Falls back to the map
/// center if sampling keeps hitting walls (a generator would have to be
/// pathological for that).
fn random_open_tile(map: &TileMap, rng: &mut impl Rng) -> (f32, f32) {
    for _ in 0..256 {
        let x = rng.gen_range(1..map.width() - 1);
        let y = rng.gen_range(1..map.height() - 1);
        if map.is_open(x, y) {
            return (x as f32 + 0.5, y as f32 + 0.5);
        }
    }
    (map.width() as f32 / 2.0, map.height() as f32 / 2.0)
}
