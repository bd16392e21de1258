// Input manager - routes window events into the shared key state

use super::action::{Action, InputSource};
use super::config::InputConfig;
use super::player::PlayerInput;
use super::InputHandle;
use std::cell::RefCell;
use std::rc::Rc;
use winit::event::{ElementState, KeyEvent, MouseButton};
use winit::keyboard::PhysicalKey;

/// Translates keyboard/mouse events into actions for the local player
pub struct InputManager {
    config: InputConfig,
    state: InputHandle,
}

impl InputManager {
    /// Create an input manager with the default bindings
    pub fn new() -> Self {
        Self::with_config(InputConfig::with_defaults())
    }

    pub fn with_config(config: InputConfig) -> Self {
        Self {
            config,
            state: Rc::new(RefCell::new(PlayerInput::new())),
        }
    }

    /// Shared key state for the local motion controller
    pub fn handle(&self) -> InputHandle {
        Rc::clone(&self.state)
    }

    /// Process a keyboard event from winit.
    ///
    /// Returns the action the key is bound to, if any.
    pub fn process_keyboard_event(&mut self, event: &KeyEvent) -> Option<Action> {
        let PhysicalKey::Code(key_code) = event.physical_key else {
            return None;
        };
        // Held keys already count as pressed
        if event.repeat {
            return None;
        }
        self.apply(InputSource::key(key_code), event.state)
    }

    /// Process a mouse button event from winit
    pub fn process_mouse_event(&mut self, button: MouseButton, state: ElementState) -> Option<Action> {
        self.apply(InputSource::mouse(button), state)
    }

    fn apply(&mut self, source: InputSource, state: ElementState) -> Option<Action> {
        let action = self.config.get_action(source)?;
        let mut input = self.state.borrow_mut();
        match state {
            ElementState::Pressed => input.press_source(source, action),
            ElementState::Released => input.release_source(source, action),
        }
        Some(action)
    }

    /// Update input state for a new frame.
    /// Call this once per frame after the frame's ticks ran.
    pub fn update(&mut self) {
        self.state.borrow_mut().update();
    }

    /// Release every action (e.g. on focus loss)
    pub fn reset(&mut self) {
        self.state.borrow_mut().reset();
    }

    /// Check whether an action was pressed this frame
    pub fn just_pressed(&self, action: Action) -> bool {
        self.state.borrow().just_pressed(action)
    }

    pub fn config(&self) -> &InputConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut InputConfig {
        &mut self.config
    }
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}
