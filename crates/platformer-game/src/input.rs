//! Input system with action-based mapping
//!
//! Provides an abstraction layer between raw key events and the movement
//! controller: a single jump action and a raw horizontal axis.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use winit::event::ElementState;
use winit::keyboard::{KeyCode, PhysicalKey};

use crate::movement::{Body, GroundSensor, LocomotionContext, MovementController};

/// Game actions that can be triggered by input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputAction {
    /// Move left (A by default)
    MoveLeft,
    /// Move right (D by default)
    MoveRight,
    /// Jump (Space, W or Up by default)
    Jump,
}

/// Current state of all inputs for a frame
#[derive(Debug, Clone, Default)]
pub struct InputState {
    /// Actions currently held down
    pub held: HashSet<InputAction>,
    /// Actions that were just pressed this frame
    pub just_pressed: HashSet<InputAction>,
    /// Actions that were just released this frame
    pub just_released: HashSet<InputAction>,
}

impl InputState {
    /// Create a new empty input state
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if an action is currently held
    pub fn is_held(&self, action: InputAction) -> bool {
        self.held.contains(&action)
    }

    /// Check if an action was just pressed this frame
    pub fn is_just_pressed(&self, action: InputAction) -> bool {
        self.just_pressed.contains(&action)
    }

    /// Check if an action was just released this frame
    pub fn is_just_released(&self, action: InputAction) -> bool {
        self.just_released.contains(&action)
    }

    /// Raw horizontal axis: -1, 0 or 1
    pub fn horizontal_axis(&self) -> f32 {
        let mut axis = 0.0;
        if self.is_held(InputAction::MoveLeft) {
            axis -= 1.0;
        }
        if self.is_held(InputAction::MoveRight) {
            axis += 1.0;
        }
        axis
    }

    /// Clear frame-specific data (call at end of frame)
    pub fn clear_frame(&mut self) {
        self.just_pressed.clear();
        self.just_released.clear();
    }
}

/// Maps keys to game actions
#[derive(Debug, Clone)]
pub struct InputBindings {
    /// Key to action mappings
    bindings: HashMap<KeyCode, InputAction>,
    /// Reverse lookup: action to all keys
    reverse: HashMap<InputAction, Vec<KeyCode>>,
}

impl Default for InputBindings {
    fn default() -> Self {
        let mut bindings = Self {
            bindings: HashMap::new(),
            reverse: HashMap::new(),
        };

        bindings.bind(KeyCode::KeyA, InputAction::MoveLeft);
        bindings.bind(KeyCode::KeyD, InputAction::MoveRight);
        bindings.bind(KeyCode::ArrowLeft, InputAction::MoveLeft);
        bindings.bind(KeyCode::ArrowRight, InputAction::MoveRight);

        bindings.bind(KeyCode::Space, InputAction::Jump);
        bindings.bind(KeyCode::KeyW, InputAction::Jump);
        bindings.bind(KeyCode::ArrowUp, InputAction::Jump);

        bindings
    }
}

impl InputBindings {
    /// Create new input bindings with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a key to an action
    pub fn bind(&mut self, key: KeyCode, action: InputAction) {
        self.unbind(key);
        self.bindings.insert(key, action);
        self.reverse.entry(action).or_default().push(key);
    }

    /// Unbind a key
    pub fn unbind(&mut self, key: KeyCode) {
        if let Some(action) = self.bindings.remove(&key) {
            if let Some(keys) = self.reverse.get_mut(&action) {
                keys.retain(|k| *k != key);
            }
        }
    }

    /// Get the action for a key, if any
    pub fn get_key_action(&self, key: KeyCode) -> Option<InputAction> {
        self.bindings.get(&key).copied()
    }

    /// All keys bound to an action
    pub fn keys_for(&self, action: InputAction) -> &[KeyCode] {
        self.reverse.get(&action).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Input handler that processes raw events and updates state
#[derive(Debug, Default)]
pub struct InputHandler {
    /// Current input state
    pub state: InputState,
    /// Input bindings
    pub bindings: InputBindings,
    /// Physical keys currently down
    keys_down: HashSet<KeyCode>,
}

impl InputHandler {
    /// Create a new input handler with default bindings
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle a keyboard event
    pub fn handle_keyboard(&mut self, physical_key: PhysicalKey, element_state: ElementState) {
        if let PhysicalKey::Code(key_code) = physical_key {
            match element_state {
                ElementState::Pressed => self.key_down(key_code),
                ElementState::Released => self.key_up(key_code),
            }
        }
    }

    /// A key went down. Repeats of a held key are ignored.
    pub fn key_down(&mut self, key: KeyCode) {
        let Some(action) = self.bindings.get_key_action(key) else {
            return;
        };
        if !self.keys_down.insert(key) {
            return;
        }
        if !self.state.held.contains(&action) {
            self.state.just_pressed.insert(action);
        }
        self.state.held.insert(action);
    }

    /// A key went up. The action is released once no bound key holds it.
    pub fn key_up(&mut self, key: KeyCode) {
        let Some(action) = self.bindings.get_key_action(key) else {
            return;
        };
        if !self.keys_down.remove(&key) {
            return;
        }
        let still_held = self
            .bindings
            .keys_for(action)
            .iter()
            .any(|k| self.keys_down.contains(k));
        if !still_held {
            self.state.held.remove(&action);
            self.state.just_released.insert(action);
        }
    }

    /// Feed this frame's input into a movement controller
    pub fn apply_to<B, G, L>(&self, controller: &mut MovementController<B, G, L>)
    where
        B: Body,
        G: GroundSensor,
        L: LocomotionContext,
    {
        controller.set_horizontal_input(self.state.horizontal_axis());
        if self.state.is_just_pressed(InputAction::Jump) {
            controller.press_jump();
        }
        if self.state.is_just_released(InputAction::Jump) {
            controller.release_jump();
        }
    }

    /// Clear frame-specific input data
    pub fn end_frame(&mut self) {
        self.state.clear_frame();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_bindings() {
        let bindings = InputBindings::default();
        assert_eq!(bindings.get_key_action(KeyCode::Space), Some(InputAction::Jump));
        assert_eq!(bindings.get_key_action(KeyCode::KeyW), Some(InputAction::Jump));
        assert_eq!(bindings.get_key_action(KeyCode::ArrowUp), Some(InputAction::Jump));
        assert_eq!(bindings.get_key_action(KeyCode::KeyA), Some(InputAction::MoveLeft));
        assert_eq!(bindings.get_key_action(KeyCode::ArrowRight), Some(InputAction::MoveRight));
        assert_eq!(bindings.get_key_action(KeyCode::KeyS), None);
    }

    #[test]
    fn test_rebind_moves_key() {
        let mut bindings = InputBindings::default();
        bindings.bind(KeyCode::KeyW, InputAction::MoveRight);
        assert_eq!(bindings.get_key_action(KeyCode::KeyW), Some(InputAction::MoveRight));
        assert!(!bindings.keys_for(InputAction::Jump).contains(&KeyCode::KeyW));
    }

    #[test]
    fn test_input_state() {
        let mut handler = InputHandler::new();
        handler.handle_keyboard(PhysicalKey::Code(KeyCode::KeyD), ElementState::Pressed);
        handler.handle_keyboard(PhysicalKey::Code(KeyCode::Space), ElementState::Pressed);

        assert!(handler.state.is_held(InputAction::MoveRight));
        assert!(handler.state.is_just_pressed(InputAction::Jump));
        assert_eq!(handler.state.horizontal_axis(), 1.0);

        handler.end_frame();
        assert!(handler.state.is_held(InputAction::Jump));
        assert!(!handler.state.is_just_pressed(InputAction::Jump));
    }

    #[test]
    fn test_opposite_directions_cancel() {
        let mut handler = InputHandler::new();
        handler.key_down(KeyCode::KeyA);
        assert_eq!(handler.state.horizontal_axis(), -1.0);
        handler.key_down(KeyCode::ArrowRight);
        assert_eq!(handler.state.horizontal_axis(), 0.0);
    }

    #[test]
    fn test_jump_held_by_two_keys() {
        let mut handler = InputHandler::new();
        handler.key_down(KeyCode::Space);
        handler.end_frame();

        handler.key_down(KeyCode::KeyW);
        assert!(!handler.state.is_just_pressed(InputAction::Jump));

        handler.key_up(KeyCode::Space);
        assert!(handler.state.is_held(InputAction::Jump));
        assert!(!handler.state.is_just_released(InputAction::Jump));

        handler.key_up(KeyCode::KeyW);
        assert!(!handler.state.is_held(InputAction::Jump));
        assert!(handler.state.is_just_released(InputAction::Jump));
    }

    #[test]
    fn test_key_repeat_ignored() {
        let mut handler = InputHandler::new();
        handler.key_down(KeyCode::Space);
        handler.end_frame();
        handler.key_down(KeyCode::Space);
        assert!(!handler.state.is_just_pressed(InputAction::Jump));
    }

    #[test]
    fn test_unbound_keys_ignored() {
        let mut handler = InputHandler::new();
        handler.key_down(KeyCode::KeyQ);
        handler.key_up(KeyCode::KeyQ);
        assert!(handler.state.held.is_empty());
        assert!(handler.state.just_released.is_empty());
    }
}
