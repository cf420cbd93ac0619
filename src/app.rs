use glam::Mat4;

use crate::transform;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum LoopState {
    Running,
    CloseRequested,
    Terminated,
}

/// Everything the render loop mutates between frames.
#[derive(Debug, Clone)]
pub struct AppState {
    pub x: f32,
    pub y: f32,
    loop_state: LoopState,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            loop_state: LoopState::Running,
        }
    }

    pub fn loop_state(&self) -> LoopState {
        self.loop_state
    }

    pub fn is_running(&self) -> bool {
        self.loop_state == LoopState::Running
    }

    /// Asks the loop to stop. The current frame still finishes.
    pub fn request_close(&mut self) {
        if self.loop_state == LoopState::Running {
            self.loop_state = LoopState::CloseRequested;
        }
    }

    /// Loop condition check, run once per iteration after presenting.
    /// Returns `true` when the loop must stop.
    pub fn check_close(&mut self) -> bool {
        if self.loop_state == LoopState::CloseRequested {
            self.loop_state = LoopState::Terminated;
        }
        self.loop_state == LoopState::Terminated
    }

    pub fn transform(&self) -> Mat4 {
        transform::translation(self.x, self.y)
    }
}
