//! Block targeting: which voxel face the crosshair points at.
//!
//! Voxels are unit cubes centred on integer coordinates, so the grid walked here is
//! offset by half a block from the usual floor-based DDA.

use cgmath::{Point3, Vector3};

use super::aabb::Ray;
use crate::engine_state::voxels::{block::block_side::BlockSide, world::TerrainQuery, VoxelPosition};

/// Default reach of block interaction.
pub const PICK_REACH: f32 = 8.0;

/// A targeted voxel and the face the ray entered through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockHit {
    /// The solid voxel hit
    pub position: VoxelPosition,
    /// Face of that voxel the ray crossed; placing goes on this side
    pub normal: BlockSide,
}

impl BlockHit {
    /// The empty cell in front of the hit face.
    pub fn adjacent(&self) -> VoxelPosition {
        self.position + self.normal.offset()
    }
}

/// Walks the voxel grid along a ray and returns the first solid voxel within `reach`.
///
/// The cell containing the origin is never reported.
pub fn pick_block(terrain: &TerrainQuery<'_>, ray: &Ray, reach: f32) -> Option<BlockHit> {
    let direction = ray.direction;
    let length = (direction.x * direction.x + direction.y * direction.y + direction.z * direction.z).sqrt();
    if length <= f32::EPSILON {
        return None;
    }
    let direction = direction / length;

    // Shift by half a block so cell boundaries fall on integers.
    let origin = Point3::new(ray.origin.x + 0.5, ray.origin.y + 0.5, ray.origin.z + 0.5);
    let mut cell = Point3::new(
        origin.x.floor() as i32,
        origin.y.floor() as i32,
        origin.z.floor() as i32,
    );

    let step = Vector3::new(signum(direction.x), signum(direction.y), signum(direction.z));
    let mut t_max = Vector3::new(
        first_boundary(origin.x, direction.x, cell.x),
        first_boundary(origin.y, direction.y, cell.y),
        first_boundary(origin.z, direction.z, cell.z),
    );
    let t_delta = Vector3::new(
        inverse_abs(direction.x),
        inverse_abs(direction.y),
        inverse_abs(direction.z),
    );

    loop {
        let axis = if t_max.x < t_max.y {
            if t_max.x < t_max.z {
                0
            } else {
                2
            }
        } else if t_max.y < t_max.z {
            1
        } else {
            2
        };

        let distance = t_max[axis];
        if distance > reach {
            return None;
        }
        t_max[axis] += t_delta[axis];
        cell[axis] += step[axis];

        if terrain.is_solid(cell) {
            return Some(BlockHit {
                position: cell,
                normal: entry_face(axis, step[axis]),
            });
        }
    }
}

fn signum(value: f32) -> i32 {
    if value >= 0.0 {
        1
    } else {
        -1
    }
}

fn inverse_abs(value: f32) -> f32 {
    if value.abs() <= f32::EPSILON {
        f32::INFINITY
    } else {
        (1.0 / value).abs()
    }
}

fn first_boundary(origin: f32, direction: f32, cell: i32) -> f32 {
    if direction.abs() <= f32::EPSILON {
        f32::INFINITY
    } else if direction > 0.0 {
        ((cell + 1) as f32 - origin) / direction
    } else {
        (cell as f32 - origin) / direction
    }
}

/// The face crossed when stepping along `axis` in direction `step`.
fn entry_face(axis: usize, step: i32) -> BlockSide {
    match (axis, step > 0) {
        (0, true) => BlockSide::Back,
        (0, false) => BlockSide::Front,
        (1, true) => BlockSide::Down,
        (1, false) => BlockSide::Up,
        (_, true) => BlockSide::Left,
        (_, false) => BlockSide::Right,
    }
}
