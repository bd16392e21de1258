// Keyboard-driven motion

use super::super::state::{Classification, MotionSample};
use super::super::stats::MotionStats;
use crate::core::math::{yaw_rotation, FORWARD};
use crate::engine::input::{Action, InputHandle};

/// Turns the local key state into motion samples
#[derive(Debug)]
pub struct LocalController {
    input: InputHandle,
    stats: MotionStats,
}

impl LocalController {
    pub fn new(input: InputHandle, stats: MotionStats) -> Self {
        Self { input, stats }
    }

    /// Classify the held keys and scale the motion by `dt`.
    ///
    /// Translation is along the character's facing; turning happens at the
    /// same rate whether or not the character is moving.
    pub fn sample(&mut self, dt: f32) -> MotionSample {
        let input = self.input.borrow();
        let classification = Classification::from_keys(
            input.is_pressed(Action::MoveForward),
            input.is_pressed(Action::MoveBackward),
            input.is_pressed(Action::Run),
        );

        let distance = self.stats.speed_for(classification) * classification.direction() * dt;
        let yaw = input.turn_axis() * self.stats.turn_speed * dt;

        MotionSample::new(classification, FORWARD * distance, yaw_rotation(yaw))
    }

    pub fn input(&self) -> &InputHandle {
        &self.input
    }
}
