//! Axis-aligned boxes and rays.

use cgmath::{Point3, Vector3};

use crate::engine_state::voxels::VoxelPosition;

/// An axis-aligned box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Corner with the smallest coordinates
    pub min: Point3<f32>,
    /// Corner with the largest coordinates
    pub max: Point3<f32>,
}

impl Aabb {
    /// A box of the given half extents around a centre.
    pub fn centered(center: Point3<f32>, half_extents: Vector3<f32>) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    /// The unit cube of a voxel.
    pub fn voxel(position: VoxelPosition) -> Self {
        Self::unit_cube(Point3::new(
            position.x as f32,
            position.y as f32,
            position.z as f32,
        ))
    }

    /// A unit cube around an arbitrary centre.
    pub fn unit_cube(center: Point3<f32>) -> Self {
        Self::centered(center, Vector3::new(0.5, 0.5, 0.5))
    }

    /// Whether two boxes overlap with positive volume.
    pub fn intersects(&self, other: &Aabb) -> bool {
        (0..3).all(|axis| self.min[axis] < other.max[axis] && other.min[axis] < self.max[axis])
    }
}

/// A half-line from an origin along a direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// Start point
    pub origin: Point3<f32>,
    /// Direction; distances are measured in multiples of its length
    pub direction: Vector3<f32>,
}

impl Ray {
    /// Creates a ray.
    pub fn new(origin: Point3<f32>, direction: Vector3<f32>) -> Self {
        Self { origin, direction }
    }

    /// Distance at which the ray enters a box, if within `max_distance`.
    ///
    /// Slab test. Only entering hits count: a ray starting inside a box does not report
    /// it, matching front-face-only picking.
    pub fn cast(&self, aabb: &Aabb, max_distance: f32) -> Option<f32> {
        let mut t_enter = f32::NEG_INFINITY;
        let mut t_exit = f32::INFINITY;

        for axis in 0..3 {
            let origin = self.origin[axis];
            let direction = self.direction[axis];
            let (low, high) = (aabb.min[axis], aabb.max[axis]);

            if direction.abs() <= f32::EPSILON {
                if origin < low || origin > high {
                    return None;
                }
                continue;
            }

            let inverse = 1.0 / direction;
            let mut near = (low - origin) * inverse;
            let mut far = (high - origin) * inverse;
            if near > far {
                std::mem::swap(&mut near, &mut far);
            }
            t_enter = t_enter.max(near);
            t_exit = t_exit.min(far);
            if t_enter > t_exit {
                return None;
            }
        }

        (t_enter >= 0.0 && t_enter <= max_distance).then_some(t_enter)
    }

    /// Nearest entering hit among many boxes.
    pub fn cast_nearest<'a>(
        &self,
        boxes: impl IntoIterator<Item = &'a Aabb>,
        max_distance: f32,
    ) -> Option<f32> {
        boxes
            .into_iter()
            .filter_map(|aabb| self.cast(aabb, max_distance))
            .min_by(f32::total_cmp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn downward_ray_hits_top_face() {
        let ray = Ray::new(Point3::new(0.2, 12.2, -0.1), Vector3::new(0.0, -1.0, 0.0));
        let ground = Aabb::voxel(Point3::new(0, 10, 0));
        let distance = ray.cast(&ground, 1.8);
        assert!(distance.is_some());
        assert_relative_eq!(distance.unwrap_or_default(), 1.7, epsilon = 1e-5);
    }

    #[test]
    fn short_ray_misses() {
        let ray = Ray::new(Point3::new(0.0, 12.2, 0.0), Vector3::new(0.0, -1.0, 0.0));
        assert!(ray.cast(&Aabb::voxel(Point3::new(0, 10, 0)), 1.0).is_none());
    }

    #[test]
    fn ray_starting_inside_does_not_report() {
        let ray = Ray::new(Point3::new(0.1, 0.1, 0.1), Vector3::new(1.0, 0.0, 0.0));
        assert!(ray.cast(&Aabb::voxel(Point3::new(0, 0, 0)), 5.0).is_none());
    }

    #[test]
    fn negative_reach_never_hits() {
        let ray = Ray::new(Point3::new(0.0, 10.6, 0.0), Vector3::new(0.0, -1.0, 0.0));
        assert!(ray.cast(&Aabb::voxel(Point3::new(0, 10, 0)), -0.1).is_none());
    }

    #[test]
    fn nearest_of_several() {
        let ray = Ray::new(Point3::new(0.0, 0.0, 0.0), Vector3::new(1.0, 0.0, 0.0));
        let boxes = [
            Aabb::voxel(Point3::new(5, 0, 0)),
            Aabb::voxel(Point3::new(2, 0, 0)),
            Aabb::voxel(Point3::new(2, 3, 0)),
        ];
        let nearest = ray.cast_nearest(boxes.iter(), 10.0);
        assert_relative_eq!(nearest.unwrap_or_default(), 1.5);
    }

    #[test]
    fn boxes_touching_do_not_intersect() {
        let a = Aabb::voxel(Point3::new(0, 0, 0));
        let b = Aabb::voxel(Point3::new(1, 0, 0));
        assert!(!a.intersects(&b));
        assert!(a.intersects(&Aabb::unit_cube(Point3::new(0.5, 0.0, 0.0))));
    }
}
