//! # Camera Implementation
//!
//! First-person camera orientation and the controller that turns mouse motion into it.
//!
//! ## Key Components
//! - `Camera`: eye position, yaw and pitch
//! - `CameraController`: accumulates mouse deltas between frames

use cgmath::*;
use std::f32::consts::FRAC_PI_2;

/// Safe limit for pitch to prevent gimbal lock
const SAFE_FRAC_PI_2: f32 = FRAC_PI_2 - 0.0001;

/// Represents a first-person camera in 3D space.
///
/// Yaw is measured from +X towards +Z, so a yaw of zero looks along +X, the world's
/// front. Pitch is positive looking up.
#[derive(Debug, Clone)]
pub struct Camera {
    /// The camera's position in world space
    pub position: Point3<f32>,
    /// Horizontal rotation (around Y axis) in radians
    pub yaw: Rad<f32>,
    /// Vertical rotation (around X axis) in radians
    pub pitch: Rad<f32>,
}

impl Camera {
    /// Creates a new camera with the specified position and orientation.
    ///
    /// # Arguments
    /// * `position` - Initial position of the camera in world space
    /// * `yaw` - Initial yaw, any type that converts to `Rad<f32>`
    /// * `pitch` - Initial pitch, any type that converts to `Rad<f32>`
    ///
    /// # Example
    /// ```ignore
    /// use cgmath::{Point3, Deg};
    /// let camera = Camera::new(
    ///     Point3::new(0.0, 40.0, 0.0),
    ///     Deg(0.0),                     // Facing along positive X
    ///     Deg(0.0),                     // Level horizon
    /// );
    /// ```
    pub fn new<V: Into<Point3<f32>>, Y: Into<Rad<f32>>, P: Into<Rad<f32>>>(
        position: V,
        yaw: Y,
        pitch: P,
    ) -> Self {
        Self {
            position: position.into(),
            yaw: yaw.into(),
            pitch: pitch.into(),
        }
    }

    /// The horizontal heading used by movement.
    pub fn heading(&self) -> Rad<f32> {
        self.yaw
    }

    /// Unit vector the camera looks along.
    pub fn look_direction(&self) -> Vector3<f32> {
        let (yaw_sin, yaw_cos) = self.yaw.0.sin_cos();
        let (pitch_sin, pitch_cos) = self.pitch.0.sin_cos();
        Vector3::new(pitch_cos * yaw_cos, pitch_sin, pitch_cos * yaw_sin).normalize()
    }

    /// Applies and clears the controller's pending rotation.
    ///
    /// # Returns
    /// `true` if the orientation changed
    pub fn apply_controller(&mut self, controller: &mut CameraController) -> bool {
        if !controller.has_updates() {
            return false;
        }

        self.yaw += Rad(controller.rotate_horizontal * controller.sensitivity);
        self.pitch += Rad(-controller.rotate_vertical * controller.sensitivity);
        controller.rotate_horizontal = 0.0;
        controller.rotate_vertical = 0.0;

        // Keep yaw bounded so long sessions do not lose precision
        self.yaw = Rad(self.yaw.0.rem_euclid(std::f32::consts::TAU));

        // Clamp pitch to prevent gimbal lock
        if self.pitch < -Rad(SAFE_FRAC_PI_2) {
            self.pitch = -Rad(SAFE_FRAC_PI_2);
        } else if self.pitch > Rad(SAFE_FRAC_PI_2) {
            self.pitch = Rad(SAFE_FRAC_PI_2);
        }
        true
    }
}

/// Accumulates mouse motion until the next frame applies it.
#[derive(Debug, Clone)]
pub struct CameraController {
    // Pending rotation, in pixels of mouse travel
    rotate_horizontal: f32,
    rotate_vertical: f32,

    // Radians per pixel
    sensitivity: f32,
}

impl CameraController {
    /// Creates a controller.
    ///
    /// # Arguments
    /// * `sensitivity` - Radians of rotation per pixel of mouse travel
    pub fn new(sensitivity: f32) -> Self {
        Self {
            rotate_horizontal: 0.0,
            rotate_vertical: 0.0,
            sensitivity,
        }
    }

    /// Adds raw mouse motion.
    pub fn intake_mouse_motion(&mut self, delta_x: f64, delta_y: f64) {
        self.rotate_horizontal += delta_x as f32;
        self.rotate_vertical += delta_y as f32;
    }

    /// Checks if there are any pending updates that would affect the camera.
    pub fn has_updates(&self) -> bool {
        self.rotate_horizontal != 0.0 || self.rotate_vertical != 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn zero_yaw_looks_along_x() {
        let camera = Camera::new(Point3::new(0.0, 0.0, 0.0), Deg(0.0), Deg(0.0));
        let look = camera.look_direction();
        assert_relative_eq!(look.x, 1.0);
        assert_relative_eq!(look.z, 0.0);
    }

    #[test]
    fn mouse_motion_turns_the_camera() {
        let mut camera = Camera::new(Point3::new(0.0, 0.0, 0.0), Rad(0.0), Rad(0.0));
        let mut controller = CameraController::new(0.01);
        controller.intake_mouse_motion(50.0, -20.0);
        assert!(camera.apply_controller(&mut controller));
        assert_relative_eq!(camera.yaw.0, 0.5, epsilon = 1e-6);
        assert_relative_eq!(camera.pitch.0, 0.2, epsilon = 1e-6);
        assert!(!controller.has_updates());
        assert!(!camera.apply_controller(&mut controller));
    }

    #[test]
    fn pitch_is_clamped() {
        let mut camera = Camera::new(Point3::new(0.0, 0.0, 0.0), Rad(0.0), Rad(0.0));
        let mut controller = CameraController::new(0.01);
        controller.intake_mouse_motion(0.0, -10_000.0);
        camera.apply_controller(&mut controller);
        assert!(camera.pitch.0 < FRAC_PI_2);
    }
}
