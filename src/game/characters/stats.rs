// Character tuning - shared by every avatar so local and remote motion agree

use super::state::Classification;
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

/// Movement and animation tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionStats {
    /// Walking speed (units/second)
    pub walk_speed: f32,
    /// Running speed (units/second)
    pub run_speed: f32,
    /// Turn rate (radians/second)
    pub turn_speed: f32,
    /// Crossfade time between motion clips (seconds)
    pub blend_duration: f32,
    /// Expected spacing of remote snapshots; remote motion is interpolated
    /// across this window (seconds)
    pub snapshot_interval: f32,
}

/// The one set of motion stats used by all avatars
pub const BASE_STATS: MotionStats = MotionStats {
    walk_speed: 4.0,
    run_speed: 10.0,
    turn_speed: PI,
    blend_duration: 0.2,
    snapshot_interval: 0.1,
};

impl Default for MotionStats {
    fn default() -> Self {
        BASE_STATS
    }
}

impl MotionStats {
    /// Forward/backward speed for a classification
    pub fn speed_for(&self, classification: Classification) -> f32 {
        match classification {
            Classification::Idle => 0.0,
            Classification::WalkForward | Classification::WalkBackward => self.walk_speed,
            Classification::RunForward | Classification::RunBackward => self.run_speed,
        }
    }
}

/// How a loaded model is fitted under its character node
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Uniform scale applied to the model root
    pub scale: f32,
    /// Yaw applied to the model root so the mesh faces the node's forward
    pub yaw_offset: f32,
    /// Pick cylinder radius
    pub pick_radius: f32,
    /// Pick cylinder height
    pub pick_height: f32,
    /// Height of the pick cylinder's centre above the node
    pub pick_center_height: f32,
}

pub const BASE_MODEL: ModelConfig = ModelConfig {
    scale: 3.0,
    yaw_offset: PI,
    pick_radius: 1.0,
    pick_height: 4.0,
    pick_center_height: 3.0,
};

impl Default for ModelConfig {
    fn default() -> Self {
        BASE_MODEL
    }
}
