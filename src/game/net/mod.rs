// Replication plumbing between the transport and the motion controllers
//
// - `snapshot`: the motion snapshot message and its wire codec
// - `router`: fans inbound snapshots out to per-user inboxes
// - `replication`: samples the local character at a fixed send rate

pub mod replication;
pub mod router;
pub mod snapshot;

pub use replication::Replicator;
pub use router::SnapshotRouter;
pub use snapshot::{Snapshot, SnapshotInbox};

/// Network message errors
#[derive(Debug, thiserror::Error)]
pub enum NetError {
    #[error("Failed to encode snapshot: {0}")]
    Encode(#[source] bincode::Error),

    #[error("Failed to decode snapshot: {0}")]
    Decode(#[source] bincode::Error),

    #[error("No inbox registered for user {0}")]
    UnknownUser(String),
}
