// Local player key state

use super::action::{Action, InputSource};
use std::collections::{HashMap, HashSet};

/// Pressed-action state for the local player
#[derive(Debug, Default)]
pub struct PlayerInput {
    /// Actions that are currently held
    pressed: HashSet<Action>,

    /// Bound sources holding each action down. An action stays pressed
    /// while any of its sources is held.
    held_by: HashMap<Action, HashSet<InputSource>>,

    /// Actions pressed since the last frame update
    just_pressed: HashSet<Action>,

    /// Actions released since the last frame update
    just_released: HashSet<Action>,
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

    /// Register an action press
    pub fn press(&mut self, action: Action) {
        if self.pressed.insert(action) {
            self.just_pressed.insert(action);
        }
    }

    /// Register an action release, regardless of which sources hold it
    pub fn release(&mut self, action: Action) {
        self.held_by.remove(&action);
        if self.pressed.remove(&action) {
            self.just_released.insert(action);
        }
    }

    /// Register a bound source going down
    pub fn press_source(&mut self, source: InputSource, action: Action) {
        self.held_by.entry(action).or_default().insert(source);
        self.press(action);
    }

    /// Register a bound source going up. The action is released once no
    /// other source still holds it.
    pub fn release_source(&mut self, source: InputSource, action: Action) {
        if let Some(sources) = self.held_by.get_mut(&action) {
            sources.remove(&source);
            if !sources.is_empty() {
                return;
            }
        }
        self.release(action);
    }

    /// Clear per-frame edges. Call once per frame after processing events.
    pub fn update(&mut self) {
        self.just_pressed.clear();
        self.just_released.clear();
    }

    /// Release everything (e.g. when the window loses focus)
    pub fn reset(&mut self) {
        self.pressed.clear();
        self.held_by.clear();
        self.just_pressed.clear();
        self.just_released.clear();
    }

    /// Whether no action is held
    pub fn is_idle(&self) -> bool {
        self.pressed.is_empty()
    }

    /// Get all currently pressed actions
    pub fn get_pressed_actions(&self) -> Vec<Action> {
        self.pressed.iter().copied().collect()
    }

    /// Turn input: +1 left, -1 right, 0 when both or neither are held
    pub fn turn_axis(&self) -> f32 {
        let mut axis = 0.0;
        if self.is_pressed(Action::TurnLeft) {
            axis += 1.0;
        }
        if self.is_pressed(Action::TurnRight) {
            axis -= 1.0;
        }
        axis
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::keyboard::KeyCode;

    #[test]
    fn test_press_action() {
        let mut input = PlayerInput::new();
        input.press(Action::MoveForward);
        assert!(input.is_pressed(Action::MoveForward));
        assert!(input.just_pressed(Action::MoveForward));
    }

    #[test]
    fn test_release_action() {
        let mut input = PlayerInput::new();
        input.press(Action::Run);
        input.update();
        input.release(Action::Run);
        assert!(!input.is_pressed(Action::Run));
        assert!(input.just_released(Action::Run));
    }

    #[test]
    fn test_just_pressed_cleared_on_update() {
        let mut input = PlayerInput::new();
        input.press(Action::MoveForward);
        input.update();
        assert!(input.is_pressed(Action::MoveForward));
        assert!(!input.just_pressed(Action::MoveForward));
    }

    #[test]
    fn test_reset() {
        let mut input = PlayerInput::new();
        input.press(Action::MoveForward);
        input.press(Action::Run);
        input.reset();
        assert!(input.is_idle());
        assert!(input.get_pressed_actions().is_empty());
    }

    #[test]
    fn test_multiple_presses_same_action() {
        let mut input = PlayerInput::new();
        input.press(Action::MoveBackward);
        input.press(Action::MoveBackward);
        assert_eq!(input.get_pressed_actions().len(), 1, "Should not duplicate actions");
    }

    #[test]
    fn test_release_unpressed_action() {
        let mut input = PlayerInput::new();
        input.release(Action::TurnLeft);
        assert!(!input.just_released(Action::TurnLeft));
    }

    #[test]
    fn test_action_held_while_any_source_down() {
        let left = InputSource::key(KeyCode::ShiftLeft);
        let right = InputSource::key(KeyCode::ShiftRight);
        let mut input = PlayerInput::new();
        input.press_source(left, Action::Run);
        input.press_source(right, Action::Run);

        input.release_source(right, Action::Run);
        assert!(input.is_pressed(Action::Run));
        assert!(!input.just_released(Action::Run));

        input.release_source(left, Action::Run);
        assert!(!input.is_pressed(Action::Run));
        assert!(input.just_released(Action::Run));
    }

    #[test]
    fn test_release_source_never_pressed() {
        let mut input = PlayerInput::new();
        input.press_source(InputSource::key(KeyCode::KeyW), Action::MoveForward);
        input.release_source(InputSource::key(KeyCode::ArrowUp), Action::MoveForward);
        assert!(input.is_pressed(Action::MoveForward));
    }

    #[test]
    fn test_reset_forgets_sources() {
        let shift = InputSource::key(KeyCode::ShiftLeft);
        let mut input = PlayerInput::new();
        input.press_source(shift, Action::Run);
        input.reset();
        input.press_source(InputSource::key(KeyCode::ShiftRight), Action::Run);
        input.release_source(InputSource::key(KeyCode::ShiftRight), Action::Run);
        assert!(!input.is_pressed(Action::Run));
    }

    #[test]
    fn test_turn_axis() {
        let mut input = PlayerInput::new();
        assert_eq!(input.turn_axis(), 0.0);
        input.press(Action::TurnLeft);
        assert_eq!(input.turn_axis(), 1.0);
        input.press(Action::TurnRight);
        assert_eq!(input.turn_axis(), 0.0);
        input.release(Action::TurnLeft);
        assert_eq!(input.turn_axis(), -1.0);
    }
}
