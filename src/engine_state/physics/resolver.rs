//! # Collision Resolver
//!
//! Turns the intended camera-relative velocity into the displacement actually applied
//! this tick, sliding along walls instead of stopping dead.
//!
//! The intended horizontal motion is rotated from camera space (forward, strafe) into
//! world axes using the heading. Each world axis is then checked against the two faces
//! on that axis: a component pointing into a blocked face is dropped, a component
//! pointing away from it, or into an open face, is kept. What survives is the tangential
//! part of the motion, so walking into a wall at an angle slides along it with the sine
//! of the angle, and walking straight into it does nothing at all.
//!
//! Vertical motion is never clipped here; gravity and ceiling contact are the
//! locomotion state machine's business.

use cgmath::{Rad, Vector3};

use super::probe::ContactFlags;
use crate::engine_state::voxels::block::block_side::BlockSide;

/// Camera-relative velocity of the player.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MoveIntent {
    /// Along the camera's horizontal forward vector
    pub forward: f32,
    /// Along the camera's horizontal right vector
    pub strafe: f32,
    /// World up
    pub vertical: f32,
}

/// Displacement chosen for one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolution {
    /// World-space displacement to add to the eye position
    pub displacement: Vector3<f32>,
    /// The horizontal face the camera is turned towards
    pub facing: BlockSide,
    /// Whether a component along X was dropped
    pub clipped_x: bool,
    /// Whether a component along Z was dropped
    pub clipped_z: bool,
}

impl Resolution {
    /// Whether any motion was held back by a wall.
    pub fn is_clipped(&self) -> bool {
        self.clipped_x || self.clipped_z
    }

    /// Sums two consecutive resolutions; the later one decides the facing.
    pub fn followed_by(self, next: Resolution) -> Resolution {
        Resolution {
            displacement: self.displacement + next.displacement,
            facing: next.facing,
            clipped_x: self.clipped_x || next.clipped_x,
            clipped_z: self.clipped_z || next.clipped_z,
        }
    }
}

/// Horizontal forward vector for a heading, measured from +X towards +Z.
pub fn forward_vector(heading: Rad<f32>) -> Vector3<f32> {
    let (sin, cos) = heading.0.sin_cos();
    Vector3::new(cos, 0.0, sin)
}

/// Horizontal right vector for a heading.
pub fn right_vector(heading: Rad<f32>) -> Vector3<f32> {
    let (sin, cos) = heading.0.sin_cos();
    Vector3::new(-sin, 0.0, cos)
}

/// Stateless slide response.
#[derive(Debug, Clone, Copy, Default)]
pub struct CollisionResolver;

impl CollisionResolver {
    /// Resolves one tick of motion.
    ///
    /// # Arguments
    /// * `contacts` - Contact flags from this tick's probe
    /// * `intent` - Camera-relative velocity
    /// * `heading` - Camera yaw, measured from +X towards +Z
    /// * `dt` - Tick length in seconds
    ///
    /// # Returns
    /// The displacement to apply and which axes were clipped
    pub fn resolve(
        contacts: &ContactFlags,
        intent: MoveIntent,
        heading: Rad<f32>,
        dt: f32,
    ) -> Resolution {
        let horizontal =
            (forward_vector(heading) * intent.forward + right_vector(heading) * intent.strafe) * dt;

        let (x, clipped_x) = clip_axis(horizontal.x, contacts.front, contacts.back);
        let (z, clipped_z) = clip_axis(horizontal.z, contacts.right, contacts.left);

        Resolution {
            displacement: Vector3::new(x, intent.vertical * dt, z),
            facing: BlockSide::facing(heading),
            clipped_x,
            clipped_z,
        }
    }
}

/// Drops a component that points into a blocked face.
fn clip_axis(component: f32, positive_blocked: bool, negative_blocked: bool) -> (f32, bool) {
    let blocked = (component > 0.0 && positive_blocked) || (component < 0.0 && negative_blocked);
    if blocked {
        (0.0, true)
    } else {
        (component, false)
    }
}
