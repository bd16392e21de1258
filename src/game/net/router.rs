// Routes decoded snapshots to the inbox of the user they describe

use super::snapshot::{Snapshot, SnapshotInbox};
use super::NetError;
use crossbeam_channel::{unbounded, Sender};
use log::{debug, trace};
use std::collections::HashMap;

/// Per-user snapshot fan-out.
///
/// The transport hands raw payloads to `route_bytes` whenever they arrive;
/// each network controller drains its own inbox once per tick.
#[derive(Debug, Default)]
pub struct SnapshotRouter {
    routes: HashMap<String, Sender<Snapshot>>,
}

impl SnapshotRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open an inbox for a remote user, replacing any previous one
    pub fn register(&mut self, user_id: &str) -> SnapshotInbox {
        let (tx, rx) = unbounded();
        if self.routes.insert(user_id.to_string(), tx).is_some() {
            debug!("Replaced snapshot inbox for {}", user_id);
        }
        rx
    }

    /// Stop routing to a user
    pub fn unregister(&mut self, user_id: &str) -> bool {
        self.routes.remove(user_id).is_some()
    }

    pub fn is_registered(&self, user_id: &str) -> bool {
        self.routes.contains_key(user_id)
    }

    /// Deliver a decoded snapshot
    pub fn route(&mut self, snapshot: Snapshot) -> Result<(), NetError> {
        let user_id = snapshot.user_id.clone();
        let Some(tx) = self.routes.get(&user_id) else {
            return Err(NetError::UnknownUser(user_id));
        };
        trace!("Routing snapshot {} for {}", snapshot.sequence, user_id);
        if tx.send(snapshot).is_err() {
            // Inbox owner is gone
            self.routes.remove(&user_id);
            return Err(NetError::UnknownUser(user_id));
        }
        Ok(())
    }

    /// Decode a transport payload and deliver it
    pub fn route_bytes(&mut self, bytes: &[u8]) -> Result<(), NetError> {
        let snapshot = Snapshot::decode(bytes)?;
        self.route(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::characters::Classification;
    use glam::{Quat, Vec3};

    fn snapshot(user: &str, sequence: u64) -> Snapshot {
        Snapshot {
            user_id: user.to_string(),
            sequence,
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            classification: Classification::Idle,
        }
    }

    #[test]
    fn test_routes_to_matching_inbox() {
        let mut router = SnapshotRouter::new();
        let alice = router.register("alice");
        let bob = router.register("bob");

        router.route(snapshot("bob", 1)).unwrap();
        assert!(alice.try_recv().is_err());
        assert_eq!(bob.try_recv().unwrap().sequence, 1);
    }

    #[test]
    fn test_unknown_user() {
        let mut router = SnapshotRouter::new();
        let err = router.route(snapshot("ghost", 1)).unwrap_err();
        assert!(matches!(err, NetError::UnknownUser(user) if user == "ghost"));
    }

    #[test]
    fn test_dropped_inbox_unregisters() {
        let mut router = SnapshotRouter::new();
        drop(router.register("carol"));
        assert!(router.route(snapshot("carol", 1)).is_err());
        assert!(!router.is_registered("carol"));
    }

    #[test]
    fn test_route_bytes() {
        let mut router = SnapshotRouter::new();
        let inbox = router.register("dave");
        let bytes = snapshot("dave", 9).encode().unwrap();
        router.route_bytes(&bytes).unwrap();
        assert_eq!(inbox.try_recv().unwrap().sequence, 9);
    }
}
