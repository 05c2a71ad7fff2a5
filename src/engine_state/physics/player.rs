//! # Player Body and Movement Tunables
//!
//! The player's collision box and every constant of the locomotion model. Values are
//! per second unless noted; timer windows are stored in milliseconds so they read
//! naturally in configuration files.

use serde::{Deserialize, Serialize};
use web_time::Duration;

/// Axis-aligned body of the player.
///
/// The camera sits at the top; the body extends `height` below it and `width / 2` to
/// each side on both horizontal axes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerBody {
    /// Eye-to-feet distance
    pub height: f32,
    /// Horizontal extent on X and on Z
    pub width: f32,
}

impl Default for PlayerBody {
    fn default() -> Self {
        Self {
            height: 1.8,
            width: 0.5,
        }
    }
}

/// Discrete locomotion modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocomotionMode {
    /// Default grounded movement
    #[default]
    Walking,
    /// Faster grounded movement with a wider field of view
    Sprinting,
    /// Slow movement with a lowered eye and edge protection
    Sneaking,
    /// No gravity, no collision, direct vertical control
    Flying,
}

impl LocomotionMode {
    /// Whether gravity, jumping and collision apply.
    pub fn is_grounded(self) -> bool {
        self != LocomotionMode::Flying
    }
}

/// Tunables of the movement model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    /// Collision box
    pub body: PlayerBody,
    /// Horizontal speed while walking
    pub walking_speed: f32,
    /// Horizontal speed while sprinting
    pub sprinting_speed: f32,
    /// Horizontal speed while sneaking
    pub sneaking_speed: f32,
    /// Horizontal and vertical speed while flying
    pub flying_speed: f32,
    /// Gravity stops accelerating a fall at this vertical speed
    pub terminal_fall_speed: f32,
    /// Downward acceleration
    pub gravity: f32,
    /// Downward speed per second of tick applied when the head hits a ceiling
    pub ceiling_bounce: f32,
    /// Base jump velocity, scaled per mode
    pub jump_impulse: f32,
    /// Jump scale while walking
    pub walking_jump_factor: f32,
    /// Jump scale while sprinting
    pub sprinting_jump_factor: f32,
    /// Jump scale while sneaking
    pub sneaking_jump_factor: f32,
    /// Length of the upward probe rays
    pub up_reach: f32,
    /// How far sneak ledge guards are pulled back from a full body width
    pub ledge_inset: f32,
    /// How far the eye drops while sneaking
    pub sneak_eye_drop: f32,
    /// Window after a jump during which the ground probe is disabled, in ms
    pub jump_reach_reset_ms: u64,
    /// Maximum gap between two forward presses that starts a sprint, in ms
    pub double_tap_ms: u64,
    /// Jump re-attempt interval while the key is held, in ms
    pub jump_repeat_ms: u64,
    /// Jump re-attempt interval while sneaking, in ms
    pub sneak_jump_repeat_ms: u64,
    /// Falling below this height triggers a respawn
    pub safety_net_y: f32,
    /// Height a respawn puts the player at
    pub respawn_y: f32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            body: PlayerBody::default(),
            walking_speed: 4.317,
            sprinting_speed: 5.612,
            sneaking_speed: 1.295,
            flying_speed: 21.78,
            terminal_fall_speed: 38.4,
            gravity: 25.0,
            ceiling_bounce: 225.0,
            jump_impulse: 8.0,
            walking_jump_factor: 0.9,
            sprinting_jump_factor: 0.98,
            sneaking_jump_factor: 0.85,
            up_reach: 1.2,
            ledge_inset: 0.05,
            sneak_eye_drop: 0.2,
            jump_reach_reset_ms: 300,
            double_tap_ms: 300,
            jump_repeat_ms: 60,
            sneak_jump_repeat_ms: 120,
            safety_net_y: -100.0,
            respawn_y: 60.0,
        }
    }
}

impl MovementConfig {
    /// Movement speed of a mode.
    pub fn speed(&self, mode: LocomotionMode) -> f32 {
        match mode {
            LocomotionMode::Walking => self.walking_speed,
            LocomotionMode::Sprinting => self.sprinting_speed,
            LocomotionMode::Sneaking => self.sneaking_speed,
            LocomotionMode::Flying => self.flying_speed,
        }
    }

    /// Upward velocity of a jump started in a mode. Flying has no jump.
    pub fn jump_velocity(&self, mode: LocomotionMode) -> f32 {
        let factor = match mode {
            LocomotionMode::Walking => self.walking_jump_factor,
            LocomotionMode::Sprinting => self.sprinting_jump_factor,
            LocomotionMode::Sneaking => self.sneaking_jump_factor,
            LocomotionMode::Flying => 0.0,
        };
        self.jump_impulse * factor
    }

    /// How often a held jump key re-attempts a jump.
    pub fn jump_repeat(&self, mode: LocomotionMode) -> Duration {
        match mode {
            LocomotionMode::Sneaking => Duration::from_millis(self.sneak_jump_repeat_ms),
            _ => Duration::from_millis(self.jump_repeat_ms),
        }
    }

    /// Ground probe blackout after a jump.
    pub fn jump_reach_reset(&self) -> Duration {
        Duration::from_millis(self.jump_reach_reset_ms)
    }

    /// Double-tap window for sprinting.
    pub fn double_tap(&self) -> Duration {
        Duration::from_millis(self.double_tap_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn sprint_jumps_highest_and_sneak_lowest() {
        let config = MovementConfig::default();
        assert_relative_eq!(config.jump_velocity(LocomotionMode::Walking), 7.2, epsilon = 1e-5);
        assert_relative_eq!(config.jump_velocity(LocomotionMode::Sprinting), 7.84, epsilon = 1e-5);
        assert_relative_eq!(config.jump_velocity(LocomotionMode::Sneaking), 6.8, epsilon = 1e-5);
        assert_eq!(config.jump_velocity(LocomotionMode::Flying), 0.0);
    }

    #[test]
    fn sneaking_repeats_jumps_slower() {
        let config = MovementConfig::default();
        assert_eq!(config.jump_repeat(LocomotionMode::Walking), Duration::from_millis(60));
        assert_eq!(config.jump_repeat(LocomotionMode::Sneaking), Duration::from_millis(120));
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config: MovementConfig = serde_json::from_str(r#"{ "walking_speed": 3.0 }"#).unwrap();
        assert_eq!(config.walking_speed, 3.0);
        assert_eq!(config.body, PlayerBody::default());
    }
}
