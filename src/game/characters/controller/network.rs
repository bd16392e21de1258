// Snapshot-driven motion for remote characters

use super::super::state::{Classification, MotionSample, TransformDelta};
use super::super::stats::MotionStats;
use super::super::MotionError;
use crate::engine::scene::Transform;
use crate::game::net::{Snapshot, SnapshotInbox};
use glam::{Quat, Vec3};
use log::{debug, warn};

/// Below this the interpolated pose counts as reached
const POSITION_EPSILON_SQ: f32 = 1e-10;
const ROTATION_EPSILON: f32 = 1e-6;
/// Rotations shorter than this cannot be normalized
const MIN_ROTATION_LENGTH_SQ: f32 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Pose {
    position: Vec3,
    rotation: Quat,
}

impl From<&Snapshot> for Pose {
    fn from(snapshot: &Snapshot) -> Self {
        Self {
            position: snapshot.position,
            rotation: snapshot.rotation.normalize(),
        }
    }
}

/// Follows a remote user's snapshots, smoothing between them
#[derive(Debug)]
pub struct NetworkController {
    user_id: String,
    inbox: SnapshotInbox,
    stats: MotionStats,

    /// Sequence of the newest accepted snapshot
    last_sequence: Option<u64>,
    /// Interpolation endpoints: the two newest accepted snapshots
    from: Option<Pose>,
    to: Option<Pose>,
    /// Progress from `from` to `to` (0..=1)
    alpha: f32,
    classification: Classification,

    accepted: u64,
    rejected: u64,
}

impl NetworkController {
    pub fn new(user_id: &str, inbox: SnapshotInbox, stats: MotionStats) -> Self {
        Self {
            user_id: user_id.to_string(),
            inbox,
            stats,
            last_sequence: None,
            from: None,
            to: None,
            alpha: 1.0,
            classification: Classification::Idle,
            accepted: 0,
            rejected: 0,
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Sequence of the newest accepted snapshot
    pub fn last_sequence(&self) -> Option<u64> {
        self.last_sequence
    }

    pub fn accepted(&self) -> u64 {
        self.accepted
    }

    /// Snapshots dropped as out of order
    pub fn rejected(&self) -> u64 {
        self.rejected
    }

    /// Position of the newest accepted snapshot
    pub fn target_position(&self) -> Option<Vec3> {
        self.to.map(|pose| pose.position)
    }

    /// Take a snapshot as the new interpolation target.
    ///
    /// Snapshots not newer than the last accepted one are rejected with
    /// `StaleUpdate`, and snapshots with a non-finite position or an
    /// unusable rotation with `MalformedUpdate`. Rejections leave the
    /// controller untouched.
    pub fn accept(&mut self, snapshot: &Snapshot) -> Result<(), MotionError> {
        let rotation = snapshot.rotation;
        if !snapshot.position.is_finite()
            || !rotation.is_finite()
            || rotation.length_squared() < MIN_ROTATION_LENGTH_SQ
        {
            self.rejected += 1;
            return Err(MotionError::MalformedUpdate {
                sequence: snapshot.sequence,
            });
        }

        if let Some(last) = self.last_sequence {
            if snapshot.sequence <= last {
                self.rejected += 1;
                return Err(MotionError::StaleUpdate {
                    last,
                    received: snapshot.sequence,
                });
            }
        }

        let pose = Pose::from(snapshot);
        match self.to {
            Some(previous) => {
                self.from = Some(previous);
                self.alpha = 0.0;
            }
            None => {
                // First snapshot: jump straight to it
                self.from = Some(pose);
                self.alpha = 1.0;
            }
        }
        self.to = Some(pose);
        self.classification = snapshot.classification;
        self.last_sequence = Some(snapshot.sequence);
        self.accepted += 1;
        Ok(())
    }

    /// Drain buffered snapshots and produce this tick's sample.
    ///
    /// Before any snapshot arrives the character idles where it spawned.
    pub fn sample(&mut self, dt: f32, current: &Transform) -> MotionSample {
        let pending: Vec<Snapshot> = self.inbox.try_iter().collect();
        for snapshot in &pending {
            if snapshot.user_id != self.user_id {
                warn!(
                    "Snapshot for {} delivered to controller of {}",
                    snapshot.user_id, self.user_id
                );
                continue;
            }
            if let Err(err) = self.accept(snapshot) {
                debug!("{}: {}", self.user_id, err);
            }
        }

        let (Some(from), Some(to)) = (self.from, self.to) else {
            return MotionSample::IDLE;
        };

        if self.stats.snapshot_interval > 0.0 {
            self.alpha = (self.alpha + dt / self.stats.snapshot_interval).min(1.0);
        } else {
            self.alpha = 1.0;
        }

        let position = from.position.lerp(to.position, self.alpha);
        let rotation = from.rotation.slerp(to.rotation, self.alpha);

        let reached = (position - current.position).length_squared() < POSITION_EPSILON_SQ
            && rotation.abs_diff_eq(current.rotation, ROTATION_EPSILON);
        let delta = if reached {
            TransformDelta::NONE
        } else {
            let (translation, rotation) = current.local_delta_to(position, rotation);
            TransformDelta {
                translation,
                rotation,
            }
        };

        MotionSample {
            classification: self.classification,
            delta,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::{unbounded, Sender};

    const DT: f32 = 1.0 / 60.0;

    fn snapshot(sequence: u64, x: f32, classification: Classification) -> Snapshot {
        Snapshot {
            user_id: "remote".to_string(),
            sequence,
            position: Vec3::new(x, 0.0, 0.0),
            rotation: Quat::IDENTITY,
            classification,
        }
    }

    fn controller() -> (NetworkController, Sender<Snapshot>) {
        let (tx, rx) = unbounded();
        (NetworkController::new("remote", rx, MotionStats::default()), tx)
    }

    fn step(controller: &mut NetworkController, transform: &mut Transform) -> MotionSample {
        let sample = controller.sample(DT, transform);
        transform.apply_local_delta(sample.delta.translation, sample.delta.rotation);
        sample
    }

    #[test]
    fn test_idle_before_first_snapshot() {
        let (mut controller, _tx) = controller();
        let spawn = Transform::from_position(Vec3::new(5.0, 0.0, 5.0));
        let sample = controller.sample(DT, &spawn);
        assert_eq!(sample, MotionSample::IDLE);
    }

    #[test]
    fn test_first_snapshot_snaps() {
        let (mut controller, tx) = controller();
        let mut transform = Transform::IDENTITY;
        tx.send(snapshot(1, 3.0, Classification::WalkForward)).unwrap();

        let sample = step(&mut controller, &mut transform);
        assert_eq!(sample.classification, Classification::WalkForward);
        assert!((transform.position.x - 3.0).abs() < 1e-5);
    }

    #[test]
    fn test_increasing_sequences_accepted() {
        let (mut controller, tx) = controller();
        let mut transform = Transform::IDENTITY;
        for sequence in 1..=4 {
            tx.send(snapshot(sequence, sequence as f32, Classification::RunForward))
                .unwrap();
            step(&mut controller, &mut transform);
            assert_eq!(controller.last_sequence(), Some(sequence));
            assert_eq!(controller.target_position(), Some(Vec3::new(sequence as f32, 0.0, 0.0)));
        }
        assert_eq!(controller.accepted(), 4);
        assert_eq!(controller.rejected(), 0);
    }

    #[test]
    fn test_stale_snapshot_rejected() {
        let (mut controller, _tx) = controller();
        controller.accept(&snapshot(5, 1.0, Classification::Idle)).unwrap();
        let err = controller
            .accept(&snapshot(5, 9.0, Classification::RunForward))
            .unwrap_err();
        assert_eq!(err, MotionError::StaleUpdate { last: 5, received: 5 });
        assert!(controller.accept(&snapshot(3, 9.0, Classification::RunForward)).is_err());
        assert_eq!(controller.target_position(), Some(Vec3::new(1.0, 0.0, 0.0)));
        assert_eq!(controller.rejected(), 2);
    }

    #[test]
    fn test_stale_tick_repeats_previous_output() {
        let (mut controller, tx) = controller();
        let mut transform = Transform::IDENTITY;
        tx.send(snapshot(1, 0.0, Classification::Idle)).unwrap();
        tx.send(snapshot(2, 2.0, Classification::WalkForward)).unwrap();
        for _ in 0..20 {
            step(&mut controller, &mut transform);
        }
        let settled = step(&mut controller, &mut transform);

        tx.send(snapshot(1, 50.0, Classification::RunBackward)).unwrap();
        let after_stale = step(&mut controller, &mut transform);

        assert_eq!(after_stale, settled);
        assert_eq!(after_stale.classification, Classification::WalkForward);
        assert_eq!(controller.rejected(), 1);
    }

    #[test]
    fn test_stale_mid_interpolation_does_not_disturb_motion() {
        let (mut with_stale, tx_a) = controller();
        let (mut clean, tx_b) = controller();
        let mut a = Transform::IDENTITY;
        let mut b = Transform::IDENTITY;
        for tx in [&tx_a, &tx_b] {
            tx.send(snapshot(1, 0.0, Classification::Idle)).unwrap();
        }
        step(&mut with_stale, &mut a);
        step(&mut clean, &mut b);
        for tx in [&tx_a, &tx_b] {
            tx.send(snapshot(2, 10.0, Classification::RunForward)).unwrap();
        }
        step(&mut with_stale, &mut a);
        step(&mut clean, &mut b);

        tx_a.send(snapshot(1, -40.0, Classification::Idle)).unwrap();
        for _ in 0..3 {
            step(&mut with_stale, &mut a);
            step(&mut clean, &mut b);
            assert!((a.position - b.position).length() < 1e-5);
        }
    }

    #[test]
    fn test_malformed_snapshots_rejected() {
        let (mut controller, _tx) = controller();
        let mut zero_rotation = snapshot(1, 0.0, Classification::Idle);
        zero_rotation.rotation = Quat::from_xyzw(0.0, 0.0, 0.0, 0.0);
        let mut nan_position = snapshot(2, 0.0, Classification::Idle);
        nan_position.position.y = f32::NAN;
        let mut infinite_rotation = snapshot(3, 0.0, Classification::Idle);
        infinite_rotation.rotation = Quat::from_xyzw(f32::INFINITY, 0.0, 0.0, 1.0);

        for bad in [zero_rotation, nan_position, infinite_rotation] {
            let sequence = bad.sequence;
            assert_eq!(
                controller.accept(&bad),
                Err(MotionError::MalformedUpdate { sequence })
            );
        }
        assert_eq!(controller.last_sequence(), None);
        assert_eq!(controller.rejected(), 3);
    }

    #[test]
    fn test_malformed_snapshot_does_not_corrupt_transform() {
        let (mut controller, tx) = controller();
        let mut transform = Transform::IDENTITY;
        let mut broken = snapshot(1, 0.0, Classification::Idle);
        broken.rotation = Quat::from_xyzw(0.0, 0.0, 0.0, 0.0);
        tx.send(broken).unwrap();
        step(&mut controller, &mut transform);
        assert_eq!(transform, Transform::IDENTITY);

        for sequence in 2..=5 {
            tx.send(snapshot(sequence, sequence as f32, Classification::WalkForward))
                .unwrap();
            for _ in 0..10 {
                step(&mut controller, &mut transform);
            }
        }
        assert!(transform.position.is_finite() && transform.rotation.is_finite());
        assert!((transform.position.x - 5.0).abs() < 1e-4);
    }

    #[test]
    fn test_interpolates_between_snapshots() {
        let (mut controller, tx) = controller();
        let mut transform = Transform::IDENTITY;
        tx.send(snapshot(1, 0.0, Classification::Idle)).unwrap();
        step(&mut controller, &mut transform);
        tx.send(snapshot(2, 10.0, Classification::RunForward)).unwrap();

        let mut last_x = transform.position.x;
        // 0.1s interval at 60Hz: five intermediate ticks before arriving
        for _ in 0..5 {
            step(&mut controller, &mut transform);
            let x = transform.position.x;
            assert!(x > last_x && x < 10.0, "x = {}", x);
            last_x = x;
        }
        for _ in 0..3 {
            step(&mut controller, &mut transform);
        }
        assert!((transform.position.x - 10.0).abs() < 1e-4);
    }

    #[test]
    fn test_rotation_slerps() {
        let (mut controller, tx) = controller();
        let mut transform = Transform::IDENTITY;
        tx.send(snapshot(1, 0.0, Classification::Idle)).unwrap();
        step(&mut controller, &mut transform);

        let mut turned = snapshot(2, 0.0, Classification::Idle);
        turned.rotation = Quat::from_rotation_y(1.0);
        tx.send(turned).unwrap();

        step(&mut controller, &mut transform);
        let partial = transform.rotation.angle_between(Quat::IDENTITY);
        assert!(partial > 0.0 && partial < 1.0);

        for _ in 0..10 {
            step(&mut controller, &mut transform);
        }
        assert!(transform.rotation.abs_diff_eq(Quat::from_rotation_y(1.0), 1e-4));
    }

    #[test]
    fn test_foreign_user_ignored() {
        let (mut controller, tx) = controller();
        let mut other = snapshot(1, 4.0, Classification::RunForward);
        other.user_id = "someone-else".to_string();
        tx.send(other).unwrap();

        let sample = controller.sample(DT, &Transform::IDENTITY);
        assert_eq!(sample, MotionSample::IDLE);
        assert_eq!(controller.accepted(), 0);
    }
}
