//! # Camera State Management
//!
//! This module handles the camera-side view of the player:
//! - Camera position and orientation tracking
//! - Mouse look through the `CameraController`
//! - Field-of-view targets per locomotion mode
//!
//! The camera itself never animates. FOV changes are issued as targets and a tween
//! length; the view collaborator does the smoothing.

use camera::{Camera, CameraController};
use cgmath::{Deg, Point3};
use serde::{Deserialize, Serialize};
use web_time::Duration;

use super::physics::player::LocomotionMode;

pub mod camera;

/// Field-of-view and mouse settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    /// Selectable base fields of view, in degrees
    pub fov_presets: Vec<f32>,
    /// Index of the active preset
    pub fov_index: usize,
    /// Added to the base field of view while sprinting
    pub sprint_fov_offset: f32,
    /// Added to the base field of view while sneaking
    pub sneak_fov_offset: f32,
    /// Duration of a field-of-view transition, in ms
    pub fov_tween_ms: u64,
    /// Radians of camera rotation per pixel of mouse travel
    pub mouse_sensitivity: f32,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            fov_presets: vec![50.0, 70.0, 90.0, 110.0],
            fov_index: 1,
            sprint_fov_offset: 20.0,
            sneak_fov_offset: -10.0,
            fov_tween_ms: 200,
            mouse_sensitivity: 0.002,
        }
    }
}

/// Fallback when the preset list is empty or the index is out of range.
const FALLBACK_FOV: f32 = 70.0;

impl ViewConfig {
    /// The active preset.
    pub fn base_fov(&self) -> f32 {
        self.fov_presets
            .get(self.fov_index)
            .copied()
            .unwrap_or(FALLBACK_FOV)
    }

    /// Field of view for a locomotion mode.
    pub fn fov_for(&self, mode: LocomotionMode) -> f32 {
        let offset = match mode {
            LocomotionMode::Sprinting => self.sprint_fov_offset,
            LocomotionMode::Sneaking => self.sneak_fov_offset,
            LocomotionMode::Walking | LocomotionMode::Flying => 0.0,
        };
        self.base_fov() + offset
    }

    /// Duration of a field-of-view transition.
    pub fn fov_tween(&self) -> Duration {
        Duration::from_millis(self.fov_tween_ms)
    }
}

/// Camera, mouse look and the current field-of-view target.
#[derive(Debug, Clone)]
pub struct CameraState {
    /// The current camera position and orientation
    pub camera: Camera,
    /// Pending mouse look
    pub camera_controller: CameraController,
    config: ViewConfig,
    fov_target: f32,
}

impl CameraState {
    /// Creates a camera looking along +X at `position`.
    ///
    /// # Arguments
    /// * `config` - View settings
    /// * `position` - Initial eye position
    pub fn new(config: ViewConfig, position: Point3<f32>) -> Self {
        let camera = Camera::new(position, Deg(0.0), Deg(0.0));
        let camera_controller = CameraController::new(config.mouse_sensitivity);
        let fov_target = config.fov_for(LocomotionMode::Walking);
        Self {
            camera,
            camera_controller,
            config,
            fov_target,
        }
    }

    /// Field-of-view presets and look sensitivity.
    pub fn config(&self) -> &ViewConfig {
        &self.config
    }

    /// The last field of view requested from the view collaborator.
    pub fn fov_target(&self) -> f32 {
        self.fov_target
    }

    /// Records a new field-of-view target.
    ///
    /// # Returns
    /// The target and tween length if it differs from the current one
    pub fn request_fov(&mut self, target: f32) -> Option<(f32, Duration)> {
        if (target - self.fov_target).abs() <= f32::EPSILON {
            return None;
        }
        self.fov_target = target;
        Some((target, self.config.fov_tween()))
    }

    /// Switches to the next FOV preset, wrapping around.
    ///
    /// # Returns
    /// The new base field of view
    pub fn cycle_fov_preset(&mut self) -> f32 {
        if !self.config.fov_presets.is_empty() {
            self.config.fov_index = (self.config.fov_index + 1) % self.config.fov_presets.len();
        }
        self.config.base_fov()
    }

    /// Adds mouse motion for the next update.
    pub fn intake_mouse_motion(&mut self, delta_x: f64, delta_y: f64) {
        self.camera_controller.intake_mouse_motion(delta_x, delta_y);
    }

    /// Applies pending mouse look.
    ///
    /// # Returns
    /// `true` if the orientation changed
    pub fn update(&mut self) -> bool {
        self.camera.apply_controller(&mut self.camera_controller)
    }
}
