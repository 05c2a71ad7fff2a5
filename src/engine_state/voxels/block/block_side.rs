//! # Block Side Module
//!
//! This module defines the six axis-aligned faces of a voxel or of the player body.
//! Sides double as contact-flag keys for the collision probe and as face normals for
//! block targeting.
//!
//! World axes are fixed: the front face looks along +X, back along -X, left along -Z,
//! right along +Z, up along +Y and down along -Y.

use cgmath::{Rad, Vector3};
use std::f32::consts::{FRAC_PI_4, PI};

/// Represents the six possible faces of an axis-aligned box.
#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug)]
pub enum BlockSide {
    /// The front face (facing positive X)
    Front = 0,

    /// The back face (facing negative X)
    Back = 1,

    /// The left face (facing negative Z)
    Left = 2,

    /// The right face (facing positive Z)
    Right = 3,

    /// The top face (facing positive Y)
    Up = 4,

    /// The bottom face (facing negative Y)
    Down = 5,
}

impl BlockSide {
    /// Returns an array containing all six faces in a consistent order.
    ///
    /// The order is: [Front, Back, Left, Right, Up, Down]
    pub fn all() -> [BlockSide; 6] {
        [
            BlockSide::Front,
            BlockSide::Back,
            BlockSide::Left,
            BlockSide::Right,
            BlockSide::Up,
            BlockSide::Down,
        ]
    }

    /// The four faces whose normals lie in the horizontal plane.
    pub fn horizontal() -> [BlockSide; 4] {
        [
            BlockSide::Front,
            BlockSide::Back,
            BlockSide::Left,
            BlockSide::Right,
        ]
    }

    /// Unit normal of the face in world space.
    pub fn normal(self) -> Vector3<f32> {
        match self {
            BlockSide::Front => Vector3::new(1.0, 0.0, 0.0),
            BlockSide::Back => Vector3::new(-1.0, 0.0, 0.0),
            BlockSide::Left => Vector3::new(0.0, 0.0, -1.0),
            BlockSide::Right => Vector3::new(0.0, 0.0, 1.0),
            BlockSide::Up => Vector3::new(0.0, 1.0, 0.0),
            BlockSide::Down => Vector3::new(0.0, -1.0, 0.0),
        }
    }

    /// Integer unit normal, used to step from a targeted voxel to its neighbour.
    pub fn offset(self) -> Vector3<i32> {
        match self {
            BlockSide::Front => Vector3::new(1, 0, 0),
            BlockSide::Back => Vector3::new(-1, 0, 0),
            BlockSide::Left => Vector3::new(0, 0, -1),
            BlockSide::Right => Vector3::new(0, 0, 1),
            BlockSide::Up => Vector3::new(0, 1, 0),
            BlockSide::Down => Vector3::new(0, -1, 0),
        }
    }

    /// The face on the other side of the same axis.
    pub fn opposite(self) -> BlockSide {
        match self {
            BlockSide::Front => BlockSide::Back,
            BlockSide::Back => BlockSide::Front,
            BlockSide::Left => BlockSide::Right,
            BlockSide::Right => BlockSide::Left,
            BlockSide::Up => BlockSide::Down,
            BlockSide::Down => BlockSide::Up,
        }
    }

    /// Determines which horizontal face a heading points at.
    ///
    /// The heading is the signed angle of the facing direction measured from +X towards
    /// +Z. The plane is split into four quadrants centred on the face normals; ties on a
    /// quadrant boundary resolve towards the X axis.
    ///
    /// # Arguments
    /// * `heading` - Facing angle in radians, any range
    ///
    /// # Returns
    /// The face whose normal is closest to the heading
    pub fn facing(heading: Rad<f32>) -> BlockSide {
        let angle = normalize_heading(heading).0;
        if angle.abs() <= FRAC_PI_4 {
            BlockSide::Front
        } else if angle.abs() >= PI - FRAC_PI_4 {
            BlockSide::Back
        } else if angle > 0.0 {
            BlockSide::Right
        } else {
            BlockSide::Left
        }
    }
}

/// Wraps a heading into the half-open range (-PI, PI].
pub fn normalize_heading(heading: Rad<f32>) -> Rad<f32> {
    let mut angle = heading.0 % (2.0 * PI);
    if angle > PI {
        angle -= 2.0 * PI;
    } else if angle <= -PI {
        angle += 2.0 * PI;
    }
    Rad(angle)
}
