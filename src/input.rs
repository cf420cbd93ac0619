use std::collections::HashSet;

use winit::{
    event::*,
    keyboard::{KeyCode, PhysicalKey},
};

use crate::{app::AppState, settings::Settings};

/// Keys currently held down, fed from window events.
#[derive(Debug, Default, Clone)]
pub struct HeldKeys {
    keys: HashSet<KeyCode>,
}

impl HeldKeys {
    pub fn apply(&mut self, key: KeyCode, state: ElementState) {
        match state {
            ElementState::Pressed => {
                self.keys.insert(key);
            }
            ElementState::Released => {
                self.keys.remove(&key);
            }
        }
    }

    pub fn is_pressed(&self, key: KeyCode) -> bool {
        self.keys.contains(&key)
    }

    pub fn clear(&mut self) {
        self.keys.clear();
    }
}

/// Tracks key state from a window event. Returns `true` if the event was consumed.
pub fn handle_input(held: &mut HeldKeys, event: &WindowEvent) -> bool {
    match event {
        WindowEvent::KeyboardInput {
            event:
                KeyEvent {
                    state: key_state,
                    physical_key: PhysicalKey::Code(key),
                    ..
                },
            ..
        } => {
            held.apply(*key, *key_state);
            true
        }
        // Releases are not delivered to an unfocused window.
        WindowEvent::Focused(false) => {
            held.clear();
            false
        }
        _ => false,
    }
}

/// Applies held keys to the state. Runs once per frame, so holding a key
/// moves the figure every frame.
pub fn process_input(held: &HeldKeys, state: &mut AppState, settings: &Settings) {
    if held.is_pressed(KeyCode::KeyW) {
        state.y += settings.step_y;
        log::info!("Y: {}", state.y);
    }
    if held.is_pressed(KeyCode::KeyS) {
        state.y -= settings.step_y;
        log::info!("Y: {}", state.y);
    }
    if held.is_pressed(KeyCode::KeyA) {
        state.x += settings.step_x;
        log::info!("X: {}", state.x);
    }
    if held.is_pressed(KeyCode::KeyD) {
        state.x -= settings.step_x;
        log::info!("X: {}", state.x);
    }
    if held.is_pressed(KeyCode::Escape) {
        state.request_close();
    }
}
