//! Input polling
//!
//! Keyboard state mapped to game actions. This is glue: it owns no
//! simulation state and just answers "is the player asking for X right
//! now" each frame.

use macroquad::prelude::*;

/// Everything the player can ask for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    MoveForward,
    MoveBackward,
    StrafeLeft,
    StrafeRight,
    TurnLeft,
    TurnRight,
    Fire,
    /// Start / restart on the menu screens
    Confirm,
}

pub struct InputState;

impl InputState {
    pub fn new() -> Self {
        Self
    }

    /// Held down this frame
    pub fn action_down(&self, action: Action) -> bool {
        match action {
            Action::MoveForward => is_key_down(KeyCode::W) || is_key_down(KeyCode::Up),
            Action::MoveBackward => is_key_down(KeyCode::S) || is_key_down(KeyCode::Down),
            Action::StrafeLeft => is_key_down(KeyCode::A),
            Action::StrafeRight => is_key_down(KeyCode::D),
            Action::TurnLeft => is_key_down(KeyCode::Left) || is_key_down(KeyCode::Q),
            Action::TurnRight => is_key_down(KeyCode::Right) || is_key_down(KeyCode::E),
            Action::Fire => is_key_down(KeyCode::Space) || is_key_down(KeyCode::J),
            Action::Confirm => is_key_down(KeyCode::Enter),
        }
    }

    /// Went down this frame
    pub fn action_pressed(&self, action: Action) -> bool {
        match action {
            Action::Fire => is_key_pressed(KeyCode::Space) || is_key_pressed(KeyCode::J),
            Action::Confirm => is_key_pressed(KeyCode::Enter),
            _ => false,
        }
    }

    /// Movement request as (forward, strafe) in [-1, 1]
    pub fn move_axes(&self) -> (f32, f32) {
        let mut forward = 0.0;
        let mut strafe = 0.0;
        if self.action_down(Action::MoveForward) {
            forward += 1.0;
        }
        if self.action_down(Action::MoveBackward) {
            forward -= 1.0;
        }
        if self.action_down(Action::StrafeRight) {
            strafe += 1.0;
        }
        if self.action_down(Action::StrafeLeft) {
            strafe -= 1.0;
        }
        (forward, strafe)
    }

    /// Turn request in [-1, 1], positive clockwise
    pub fn turn_axis(&self) -> f32 {
        let mut turn = 0.0;
        if self.action_down(Action::TurnRight) {
            turn += 1.0;
        }
        if self.action_down(Action::TurnLeft) {
            turn -= 1.0;
        }
        turn
    }
}

impl Default for InputState {
    fn default() -> Self {
        Self::new()
    }
}
