// Motion controllers: the single source of motion for a character
//
// A character is bound to exactly one controller when it is created. Local
// characters read the keyboard; remote characters follow replicated
// snapshots. Both produce one `MotionSample` per tick and never block.

mod local;
mod network;

pub use local::LocalController;
pub use network::NetworkController;

use super::state::MotionSample;
use super::stats::MotionStats;
use super::MotionError;
use crate::engine::input::InputHandle;
use crate::engine::scene::Transform;
use crate::game::net::SnapshotInbox;

/// Sources a controller can be bound to
#[derive(Debug, Default)]
pub struct MotionSources {
    pub input: Option<InputHandle>,
    pub inbox: Option<SnapshotInbox>,
}

impl MotionSources {
    /// Keyboard-driven
    pub fn local(input: InputHandle) -> Self {
        Self {
            input: Some(input),
            inbox: None,
        }
    }

    /// Snapshot-driven
    pub fn remote(inbox: SnapshotInbox) -> Self {
        Self {
            input: None,
            inbox: Some(inbox),
        }
    }
}

/// The controller bound to a character
#[derive(Debug)]
pub enum MotionController {
    Local(LocalController),
    Network(NetworkController),
}

impl MotionController {
    /// Pick the variant for `is_remote` and bind it to its source.
    ///
    /// Fails with `ControllerMisuse` when the matching source is absent.
    pub fn bind(
        user_id: &str,
        is_remote: bool,
        sources: MotionSources,
        stats: MotionStats,
    ) -> Result<Self, MotionError> {
        if is_remote {
            let inbox = sources.inbox.ok_or(MotionError::ControllerMisuse(
                "network controller requires a snapshot inbox",
            ))?;
            Ok(Self::Network(NetworkController::new(user_id, inbox, stats)))
        } else {
            let input = sources.input.ok_or(MotionError::ControllerMisuse(
                "local controller requires an input source",
            ))?;
            Ok(Self::Local(LocalController::new(input, stats)))
        }
    }

    /// Produce this tick's sample
    pub fn sample(&mut self, dt: f32, current: &Transform) -> MotionSample {
        match self {
            Self::Local(controller) => controller.sample(dt),
            Self::Network(controller) => controller.sample(dt, current),
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Network(_))
    }

    pub fn as_local(&self) -> Option<&LocalController> {
        match self {
            Self::Local(controller) => Some(controller),
            Self::Network(_) => None,
        }
    }

    pub fn as_network(&self) -> Option<&NetworkController> {
        match self {
            Self::Network(controller) => Some(controller),
            Self::Local(_) => None,
        }
    }
}
