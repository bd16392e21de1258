// Game layer: avatars, replication and configuration

pub mod characters;
pub mod config;
pub mod net;

pub use config::{ConfigError, GameConfig, ReplicationConfig};
