// Input surface: action definitions and per-player edge/axis state
//
// Binding physical keys to actions is host-side glue; the core only sees
// discrete action edges and the two continuous movement axes.

use std::collections::HashSet;

/// Discrete in-game actions a character responds to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Jump,
    Sprint,
    Dash,
    QuickStep,
    Glide,
    Attack,
}

/// Input state for a single player
#[derive(Debug, Default)]
pub struct PlayerInput {
    /// Actions currently held down
    pressed: HashSet<Action>,
    /// Actions pressed this frame
    just_pressed: HashSet<Action>,
    /// Actions released this frame
    just_released: HashSet<Action>,
    /// Up/forward axis in [-1, 1]
    axis_move_up: f32,
    /// Right axis in [-1, 1]
    axis_move_right: f32,
}

impl PlayerInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if an action is currently pressed
    pub fn is_pressed(&self, action: Action) -> bool {
        self.pressed.contains(&action)
    }

    /// Check if an action was just pressed this frame
    pub fn just_pressed(&self, action: Action) -> bool {
        self.just_pressed.contains(&action)
    }

    /// Check if an action was just released this frame
    pub fn just_released(&self, action: Action) -> bool {
        self.just_released.contains(&action)
    }

    pub fn axis_move_up(&self) -> f32 {
        self.axis_move_up
    }

    pub fn axis_move_right(&self) -> f32 {
        self.axis_move_right
    }

    /// Register an action press
    pub fn press(&mut self, action: Action) {
        if self.pressed.insert(action) {
            self.just_pressed.insert(action);
        }
    }

    /// Register an action release
    pub fn release(&mut self, action: Action) {
        if self.pressed.remove(&action) {
            self.just_released.insert(action);
        }
    }

    /// Update a movement axis; values are clamped to [-1, 1]
    pub fn set_axis_move_up(&mut self, value: f32) {
        self.axis_move_up = value.clamp(-1.0, 1.0);
    }

    pub fn set_axis_move_right(&mut self, value: f32) {
        self.axis_move_right = value.clamp(-1.0, 1.0);
    }

    /// Clear per-frame edge state; call once per frame after dispatch
    pub fn update(&mut self) {
        self.just_pressed.clear();
        self.just_released.clear();
    }

    /// Reset all input state
    pub fn reset(&mut self) {
        self.pressed.clear();
        self.just_pressed.clear();
        self.just_released.clear();
        self.axis_move_up = 0.0;
        self.axis_move_right = 0.0;
    }
}
