// Character system
//
// This module contains everything related to avatars:
// - Character entity and management
// - Motion controllers (local keyboard or replicated network)
// - Motion classification and per-tick samples
// - Animation registry and clip selection
// - Movement and model tuning

pub mod animation;
pub mod character;
pub mod controller;
pub mod state;
pub mod stats;

// Re-export commonly used types
pub use animation::{AnimationRegistry, AnimationSelector, ClipNameTable, Transition};
pub use character::{Character, CharacterId, CharacterManager, ModelState, RenderState};
pub use controller::{LocalController, MotionController, MotionSources, NetworkController};
pub use state::{Classification, MotionSample, MotionStateMachine, TransformDelta};
pub use stats::{MotionStats, ModelConfig};

/// Motion and animation errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MotionError {
    #[error("Stale snapshot {received} (last accepted {last})")]
    StaleUpdate { last: u64, received: u64 },

    #[error("Malformed snapshot {sequence}: non-finite position or unusable rotation")]
    MalformedUpdate { sequence: u64 },

    #[error("No animation registered for {0}")]
    MissingAnimation(Classification),

    #[error("Controller misuse: {0}")]
    ControllerMisuse(&'static str),
}
