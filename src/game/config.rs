// Game configuration loaded from TOML

use super::characters::{ClipNameTable, ModelConfig, MotionStats};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Outbound replication settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplicationConfig {
    /// Snapshots per second sent for the local character
    pub send_rate: f32,
}

impl Default for ReplicationConfig {
    fn default() -> Self {
        Self { send_rate: 20.0 }
    }
}

/// Everything tunable without a rebuild. Missing keys use defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Character model requested for every avatar
    pub model_path: String,
    /// Simulation ticks per second
    pub tick_rate: f32,
    pub motion: MotionStats,
    pub model: ModelConfig,
    pub clips: ClipNameTable,
    pub replication: ReplicationConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            model_path: "models/testCharacter2.glb".to_string(),
            tick_rate: 60.0,
            motion: MotionStats::default(),
            model: ModelConfig::default(),
            clips: ClipNameTable::default(),
            replication: ReplicationConfig::default(),
        }
    }
}

impl GameConfig {
    /// Parse a TOML document
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    /// Read and parse a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::characters::Classification;

    #[test]
    fn test_empty_document_is_default() {
        assert_eq!(GameConfig::from_toml_str("").unwrap(), GameConfig::default());
    }

    #[test]
    fn test_partial_override() {
        let config = GameConfig::from_toml_str(
            r#"
            model_path = "models/xbot.glb"
            tick_rate = 30.0

            [motion]
            run_speed = 12.5

            [clips]
            walk_backward = "WalkingBackward"
            run_backward = "RunningBackward"

            [replication]
            send_rate = 30.0
            "#,
        )
        .unwrap();

        assert_eq!(config.model_path, "models/xbot.glb");
        assert_eq!(config.tick_rate, 30.0);
        assert_eq!(config.motion.run_speed, 12.5);
        assert_eq!(config.motion.walk_speed, 4.0);
        assert_eq!(config.clips, ClipNameTable::straightened());
        assert_eq!(
            config.clips.name_for(Classification::Idle),
            "BreathingIdle"
        );
        assert_eq!(config.replication.send_rate, 30.0);
    }

    #[test]
    fn test_parse_error() {
        let err = GameConfig::from_toml_str("motion = 5").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = GameConfig::load("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
