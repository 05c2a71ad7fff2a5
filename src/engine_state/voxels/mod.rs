//! # Voxel World
//!
//! This module contains everything that defines which voxels are solid:
//!
//! * **Block**: block types and the six-face vocabulary
//! * **Noise Field**: deterministic height and feature-density fields
//! * **Edit Log**: sparse player overrides of the procedural field
//! * **Parkour**: the optional platform trail
//! * **World**: the owned world state and the composed terrain query
//!
//! ## Data Flow
//!
//! 1. Block actions write edits into the `WorldState`
//! 2. Every tick the collision probe borrows a `TerrainQuery` from the same state
//! 3. The query composes edits over the procedural answer, so rendering and
//!    collision always agree on what is solid

use cgmath::Point3;

pub mod block;
pub mod edit_log;
pub mod noise_field;
pub mod parkour;
pub mod world;

/// Integer voxel coordinate. Voxel `(x, y, z)` is the unit cube centred on that point.
pub type VoxelPosition = Point3<i32>;

/// The voxel whose centre is nearest to a world-space point.
pub fn voxel_at(point: Point3<f32>) -> VoxelPosition {
    Point3::new(
        point.x.round() as i32,
        point.y.round() as i32,
        point.z.round() as i32,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_to_nearest_centre() {
        assert_eq!(voxel_at(Point3::new(0.49, -0.51, 2.5)), Point3::new(0, -1, 3));
    }
}
