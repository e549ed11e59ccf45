//! UNDERHALL: a grid-crawler action game
//!
//! A tile-grid simulation (entities, collision, monster FSMs) seen
//! through a software raycasting renderer: one ray per column, affine
//! sprite billboards, a shared depth buffer. The whole tick runs on one
//! thread, once per animation frame.

/// Version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

mod app;
mod game;
mod input;
mod raycaster;
mod settings;
mod world;

use macroquad::prelude::*;

use app::{App, Screen};
use raycaster::{TextureStrip, CAMERA_HEIGHT, CAMERA_WIDTH};
use settings::GameSettings;

fn window_conf() -> Conf {
    Conf {
        window_title: format!("UNDERHALL v{}", VERSION),
        window_width: (CAMERA_WIDTH * 3) as i32,
        window_height: (CAMERA_HEIGHT * 3) as i32,
        window_resizable: true,
        high_dpi: true,
        ..Default::default()
    }
}

/// Settings from disk when present, defaults otherwise. WASM builds
/// have no filesystem and always run on defaults.
fn load_settings() -> GameSettings {
    #[cfg(not(target_arch = "wasm32"))]
    {
        let path = std::path::Path::new("assets/settings.ron");
        if path.exists() {
            match GameSettings::load(path) {
                Ok(s) => return s,
                Err(e) => tracing::warn!("settings load failed, using defaults: {e}"),
            }
        }
    }
    GameSettings::default()
}

/// The shipped texture strip, or the procedural fallback
fn load_texture_strip() -> TextureStrip {
    #[cfg(not(target_arch = "wasm32"))]
    {
        if let Ok(bytes) = std::fs::read("assets/textures/strip.png") {
            match TextureStrip::from_png_bytes(&bytes) {
                Ok(strip) => return strip,
                Err(e) => tracing::warn!("texture strip rejected, using builtin: {e}"),
            }
        }
    }
    TextureStrip::builtin()
}

#[macroquad::main(window_conf)]
async fn main() {
    // Crash logging first, before any other code
    #[cfg(not(target_arch = "wasm32"))]
    crashlog::setup!(crashlog::cargo_metadata!().capitalized(), false);

    #[cfg(not(target_arch = "wasm32"))]
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut app = App::new(load_settings(), load_texture_strip());

    loop {
        let dt = get_frame_time();
        app.frame(dt);

        // Upload the software framebuffer and letterbox it to the window
        clear_background(BLACK);
        let fb = app.framebuffer();
        let texture = Texture2D::from_rgba8(fb.width as u16, fb.height as u16, &fb.pixels);
        texture.set_filter(FilterMode::Nearest);

        let scale = (screen_width() / fb.width as f32).min(screen_height() / fb.height as f32);
        let draw_w = fb.width as f32 * scale;
        let draw_h = fb.height as f32 * scale;
        let ox = (screen_width() - draw_w) / 2.0;
        let oy = (screen_height() - draw_h) / 2.0;
        draw_texture_ex(
            &texture,
            ox,
            oy,
            WHITE,
            DrawTextureParams {
                dest_size: Some(vec2(draw_w, draw_h)),
                ..Default::default()
            },
        );

        draw_hud(&app, ox, oy, draw_w, draw_h);

        next_frame().await;
    }
}

/// Text overlay on top of the rendered view
fn draw_hud(app: &App, ox: f32, oy: f32, w: f32, h: f32) {
    let ui = Color::from_rgba(235, 230, 215, 255);
    let dim = Color::from_rgba(160, 155, 145, 255);

    match app.screen() {
        Screen::Title => {
            draw_text("UNDERHALL", ox + w * 0.30, oy + h * 0.42, 56.0, ui);
            draw_text(
                "ENTER to descend  -  WASD move, arrows turn, SPACE fire",
                ox + w * 0.16,
                oy + h * 0.56,
                22.0,
                dim,
            );
        }
        Screen::Playing => {
            draw_text(
                &format!("HP {}", app.player_hp()),
                ox + 12.0,
                oy + 24.0,
                28.0,
                ui,
            );
            draw_text(
                &format!("DEPTH {}   KILLS {}", app.level(), app.kills()),
                ox + 12.0,
                oy + h - 14.0,
                22.0,
                dim,
            );
        }
        Screen::GameOver => {
            draw_text("YOU FELL", ox + w * 0.34, oy + h * 0.45, 48.0, ui);
            draw_text(
                &format!("depth {}   kills {}   -   ENTER to try again", app.level(), app.kills()),
                ox + w * 0.22,
                oy + h * 0.58,
                22.0,
                dim,
            );
        }
    }
}
