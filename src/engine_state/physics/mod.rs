//! # Physics
//!
//! Player collision and movement against the voxel world.
//!
//! * `aabb` - Boxes and rays
//! * `player` - Body dimensions, locomotion modes and movement tunables
//! * `probe` - Per-tick contact detection around the player
//! * `resolver` - Turns move intent into a displacement that respects contacts
//! * `locomotion` - The state machine that owns velocity, modes and jump timing
//! * `raycast` - Block targeting along the view ray

pub mod aabb;
pub mod locomotion;
pub mod player;
pub mod probe;
pub mod raycast;
pub mod resolver;
