// Input handling system
//
// Keyboard input for the local avatar, with remappable bindings.
//
// ## Architecture
//
// - `action`: Defines avatar actions and default key bindings
// - `player`: Pressed-key state for the local player
// - `config`: Input configuration and remapping system
// - `manager`: Routes winit keyboard events into the shared key state
//
// ## Usage Example
//
// ```rust
// use avatar_sync::engine::input::{Action, InputManager};
//
// let mut input_manager = InputManager::new();
// let keys = input_manager.handle(); // hand this to the local controller
//
// // In your event loop, process keyboard events
// input_manager.process_keyboard_event(&key_event);
//
// // At the end of each frame, update the input state
// input_manager.update();
// ```

pub mod action;
pub mod config;
pub mod manager;
pub mod player;

use std::cell::RefCell;
use std::rc::Rc;

// Re-export commonly used types
pub use action::{Action, InputSource};
pub use config::InputConfig;
pub use manager::InputManager;
pub use player::PlayerInput;

/// Shared, frame-thread-only view of the local key state.
///
/// The input manager writes it while processing events; the local motion
/// controller reads it once per tick.
pub type InputHandle = Rc<RefCell<PlayerInput>>;
