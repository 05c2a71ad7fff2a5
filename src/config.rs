//! # Game Configuration
//!
//! One aggregate holding every tunable, loadable from JSON. Every section falls back to
//! its defaults field by field, so a config file only names what it changes.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::engine_state::{
    camera_state::ViewConfig,
    interaction::InteractionConfig,
    physics::player::MovementConfig,
    voxels::{noise_field::TerrainParameters, parkour::ParkourConfig},
};

/// Why a configuration was rejected.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The JSON could not be read into a configuration
    #[error("malformed configuration: {0}")]
    Parse(#[from] serde_json::Error),
    /// The JSON parsed but a value is out of range
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// World generation settings.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Noise fields and terrain levels
    pub terrain: TerrainParameters,
    /// Parkour trail, absent to disable
    pub parkour: Option<ParkourConfig>,
}

/// Everything configurable about a game session.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Terrain and parkour generation
    pub world: WorldConfig,
    /// Body size, speeds and timer windows of the player
    pub player: MovementConfig,
    /// Field of view and mouse look
    pub view: ViewConfig,
    /// Hotbar and block action timings
    pub interaction: InteractionConfig,
}

impl GameConfig {
    /// Parses and validates a JSON configuration.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serializes the configuration as pretty-printed JSON.
    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Checks the values serde cannot: positive sizes, ordered levels, usable presets.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let body = &self.player.body;
        if !(body.height > 1.0 && body.width > 0.0 && body.width < 1.0) {
            return Err(ConfigError::Invalid(format!(
                "body must be taller than one block and narrower than one, got {}x{}",
                body.height, body.width
            )));
        }

        let terrain = &self.world.terrain;
        for (name, field) in [
            ("height", &terrain.height),
            ("stone", &terrain.stone),
            ("coal", &terrain.coal),
            ("tree", &terrain.tree),
            ("leaf", &terrain.leaf),
        ] {
            if field.gap <= 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "{name} noise gap must be positive, got {}",
                    field.gap
                )));
            }
        }
        if terrain.bedrock_level >= terrain.baseline {
            return Err(ConfigError::Invalid(format!(
                "bedrock level {} must lie below the baseline {}",
                terrain.bedrock_level, terrain.baseline
            )));
        }

        let player = &self.player;
        for (name, speed) in [
            ("walking", player.walking_speed),
            ("sprinting", player.sprinting_speed),
            ("sneaking", player.sneaking_speed),
            ("flying", player.flying_speed),
        ] {
            if speed < 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "{name} speed must not be negative, got {speed}"
                )));
            }
        }
        if player.safety_net_y >= player.respawn_y {
            return Err(ConfigError::Invalid(format!(
                "respawn height {} must lie above the safety net {}",
                player.respawn_y, player.safety_net_y
            )));
        }

        if self.view.fov_presets.get(self.view.fov_index).is_none() {
            return Err(ConfigError::Invalid(format!(
                "fov index {} outside {} presets",
                self.view.fov_index,
                self.view.fov_presets.len()
            )));
        }

        if self.interaction.hotbar.is_empty() {
            return Err(ConfigError::Invalid("hotbar must not be empty".to_string()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::block::block_type::BlockType;

    #[test]
    fn defaults_are_valid() {
        assert!(GameConfig::default().validate().is_ok());
    }

    #[test]
    fn partial_json_fills_in_defaults() {
        let config = GameConfig::from_json_str(
            r#"{
                "world": { "parkour": { "seed": 3 } },
                "player": { "gravity": 20.0 },
                "interaction": { "hotbar": ["glass", "bedrock"] }
            }"#,
        )
        .unwrap();
        assert_eq!(config.player.gravity, 20.0);
        assert_eq!(config.player.walking_speed, 4.317);
        assert_eq!(config.world.parkour.map(|parkour| parkour.seed), Some(3));
        assert_eq!(config.world.terrain.baseline, 30);
        assert_eq!(config.interaction.hotbar, vec![BlockType::Glass, BlockType::Bedrock]);
        assert_eq!(config.view, ViewConfig::default());
    }

    #[test]
    fn round_trips_through_json() {
        let config = GameConfig::default();
        let json = config.to_json_string().unwrap();
        assert_eq!(GameConfig::from_json_str(&json).unwrap(), config);
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        assert!(matches!(
            GameConfig::from_json_str("{ not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn nonsense_values_are_rejected() {
        let cases = [
            r#"{ "player": { "body": { "height": 0.5, "width": 0.5 } } }"#,
            r#"{ "world": { "terrain": { "bedrock_level": 40 } } }"#,
            r#"{ "view": { "fov_index": 7 } }"#,
            r#"{ "interaction": { "hotbar": [] } }"#,
            r#"{ "player": { "respawn_y": -200.0 } }"#,
        ];
        for json in cases {
            assert!(
                matches!(GameConfig::from_json_str(json), Err(ConfigError::Invalid(_))),
                "accepted {json}"
            );
        }
    }
}
