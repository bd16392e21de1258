// Avatar action definitions and mappings

use winit::event::MouseButton;
use winit::keyboard::KeyCode;

/// Represents all possible avatar actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    // Movement
    MoveForward,
    MoveBackward,
    TurnLeft,
    TurnRight,
    /// Held together with a move key to run instead of walk
    Run,

    // Meta actions
    Menu,
}

/// Represents an input source (keyboard key or mouse button)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputSource {
    Keyboard(KeyCode),
    Mouse(MouseButton),
}

impl InputSource {
    /// Create a keyboard input source
    pub fn key(code: KeyCode) -> Self {
        Self::Keyboard(code)
    }

    /// Create a mouse button input source
    pub fn mouse(button: MouseButton) -> Self {
        Self::Mouse(button)
    }
}

/// Default keyboard bindings for the local player
pub fn default_bindings() -> Vec<(InputSource, Action)> {
    vec![
        // WASD
        (InputSource::key(KeyCode::KeyW), Action::MoveForward),
        (InputSource::key(KeyCode::KeyS), Action::MoveBackward),
        (InputSource::key(KeyCode::KeyA), Action::TurnLeft),
        (InputSource::key(KeyCode::KeyD), Action::TurnRight),
        // Arrow keys as secondary layout
        (InputSource::key(KeyCode::ArrowUp), Action::MoveForward),
        (InputSource::key(KeyCode::ArrowDown), Action::MoveBackward),
        (InputSource::key(KeyCode::ArrowLeft), Action::TurnLeft),
        (InputSource::key(KeyCode::ArrowRight), Action::TurnRight),
        // Run modifier
        (InputSource::key(KeyCode::ShiftLeft), Action::Run),
        (InputSource::key(KeyCode::ShiftRight), Action::Run),
        (InputSource::key(KeyCode::Escape), Action::Menu),
    ]
}
