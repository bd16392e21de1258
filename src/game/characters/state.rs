// Motion classification and per-tick motion samples

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction/speed class of a character's movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Classification {
    #[default]
    Idle,
    WalkForward,
    RunForward,
    WalkBackward,
    RunBackward,
}

impl Classification {
    /// Every classification, in registry order
    pub const ALL: [Classification; 5] = [
        Self::Idle,
        Self::WalkForward,
        Self::RunForward,
        Self::WalkBackward,
        Self::RunBackward,
    ];

    /// Classify held movement keys.
    ///
    /// Precedence: forward and backward together cancel to idle, a move key
    /// with run held runs, a move key alone walks.
    pub fn from_keys(forward: bool, backward: bool, run: bool) -> Self {
        match (forward, backward, run) {
            (true, true, _) | (false, false, _) => Self::Idle,
            (true, false, true) => Self::RunForward,
            (true, false, false) => Self::WalkForward,
            (false, true, true) => Self::RunBackward,
            (false, true, false) => Self::WalkBackward,
        }
    }

    /// Position in [`Classification::ALL`]
    pub fn index(self) -> usize {
        match self {
            Self::Idle => 0,
            Self::WalkForward => 1,
            Self::RunForward => 2,
            Self::WalkBackward => 3,
            Self::RunBackward => 4,
        }
    }

    /// +1 moving forward, -1 moving backward, 0 idle
    pub fn direction(self) -> f32 {
        match self {
            Self::Idle => 0.0,
            Self::WalkForward | Self::RunForward => 1.0,
            Self::WalkBackward | Self::RunBackward => -1.0,
        }
    }

    pub fn is_running(self) -> bool {
        matches!(self, Self::RunForward | Self::RunBackward)
    }

    /// Semantic name used by the animation registry and logs
    pub fn name(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::WalkForward => "walkForward",
            Self::RunForward => "runForward",
            Self::WalkBackward => "walkBackward",
            Self::RunBackward => "runBackward",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Transform change for one tick, in the character's local frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformDelta {
    pub translation: Vec3,
    pub rotation: Quat,
}

impl TransformDelta {
    pub const NONE: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    pub fn is_none(&self) -> bool {
        self.translation == Vec3::ZERO && self.rotation == Quat::IDENTITY
    }
}

/// One tick's classified movement plus its transform delta
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionSample {
    pub classification: Classification,
    pub delta: TransformDelta,
}

impl MotionSample {
    /// Standing still
    pub const IDLE: Self = Self {
        classification: Classification::Idle,
        delta: TransformDelta::NONE,
    };

    pub fn new(classification: Classification, translation: Vec3, rotation: Quat) -> Self {
        Self {
            classification,
            delta: TransformDelta {
                translation,
                rotation,
            },
        }
    }
}

/// Tracks the classification reported by each tick
#[derive(Debug, Default)]
pub struct MotionStateMachine {
    current_state: Classification,
    previous_state: Classification,
    state_time: f32,
    changes: u64,
}

impl MotionStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the current classification
    pub fn state(&self) -> Classification {
        self.current_state
    }

    /// Get the previous classification
    pub fn previous_state(&self) -> Classification {
        self.previous_state
    }

    /// Time spent in the current classification
    pub fn state_time(&self) -> f32 {
        self.state_time
    }

    /// Number of classification changes observed
    pub fn changes(&self) -> u64 {
        self.changes
    }

    /// Record this tick's classification; returns true when it changed
    pub fn observe(&mut self, state: Classification, dt: f32) -> bool {
        if state == self.current_state {
            self.state_time += dt;
            return false;
        }
        self.previous_state = self.current_state;
        self.current_state = state;
        self.state_time = 0.0;
        self.changes += 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_keys_is_idle() {
        assert_eq!(Classification::from_keys(false, false, false), Classification::Idle);
        assert_eq!(Classification::from_keys(false, false, true), Classification::Idle);
    }

    #[test]
    fn test_precedence_table() {
        use Classification::*;
        let table = [
            ((true, false, false), WalkForward),
            ((true, false, true), RunForward),
            ((false, true, false), WalkBackward),
            ((false, true, true), RunBackward),
            ((true, true, false), Idle),
            ((true, true, true), Idle),
        ];
        for ((forward, backward, run), expected) in table {
            assert_eq!(Classification::from_keys(forward, backward, run), expected);
        }
    }

    #[test]
    fn test_index_matches_all_order() {
        for (i, c) in Classification::ALL.iter().enumerate() {
            assert_eq!(c.index(), i);
        }
    }

    #[test]
    fn test_direction_and_running() {
        assert_eq!(Classification::RunBackward.direction(), -1.0);
        assert!(Classification::RunBackward.is_running());
        assert!(!Classification::WalkForward.is_running());
        assert_eq!(Classification::Idle.direction(), 0.0);
    }

    #[test]
    fn test_names() {
        assert_eq!(Classification::WalkBackward.to_string(), "walkBackward");
        assert_eq!(Classification::Idle.name(), "idle");
    }

    #[test]
    fn test_observe_reports_changes_once() {
        let mut sm = MotionStateMachine::new();
        assert!(!sm.observe(Classification::Idle, 0.1));
        assert!(sm.observe(Classification::RunForward, 0.1));
        assert!(!sm.observe(Classification::RunForward, 0.1));
        assert_eq!(sm.previous_state(), Classification::Idle);
        assert_eq!(sm.changes(), 1);
        assert!((sm.state_time() - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_idle_sample_has_no_delta() {
        assert!(MotionSample::IDLE.delta.is_none());
    }
}
