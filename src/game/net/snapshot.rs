// Motion snapshot message

use super::NetError;
use crate::engine::scene::Transform;
use crate::game::characters::Classification;
use crossbeam_channel::Receiver;
use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Buffered inbound snapshots for one remote user
pub type SnapshotInbox = Receiver<Snapshot>;

/// One replicated motion update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub user_id: String,
    /// Strictly increasing per sender
    pub sequence: u64,
    pub position: Vec3,
    pub rotation: Quat,
    pub classification: Classification,
}

impl Snapshot {
    /// Capture a transform and classification
    pub fn capture(
        user_id: &str,
        sequence: u64,
        transform: &Transform,
        classification: Classification,
    ) -> Self {
        Self {
            user_id: user_id.to_string(),
            sequence,
            position: transform.position,
            rotation: transform.rotation,
            classification,
        }
    }

    /// Serialize for the transport
    pub fn encode(&self) -> Result<Vec<u8>, NetError> {
        bincode::serialize(self).map_err(NetError::Encode)
    }

    /// Deserialize a transport payload
    pub fn decode(bytes: &[u8]) -> Result<Self, NetError> {
        bincode::deserialize(bytes).map_err(NetError::Decode)
    }
}
