//! # Application State Management
//!
//! This module hosts the game core, including:
//! - The per-frame loop: mouse look, input dispatch, due timers, one gameplay tick
//! - Translation of window events into core input events
//! - The `winit` application lifecycle for windowed targets
//!
//! The host owns the scheduler and lends it to the engine for every event, so timers
//! installed while handling input are polled by the same loop.

pub mod demo;
pub mod input_manager;
pub mod input_state;

use std::sync::Arc;

use input_manager::InputManager;
use input_state::{dispatch, InputContext};
use web_time::{Duration, Instant};
use winit::{
    application::ApplicationHandler,
    event::{DeviceEvent, DeviceId, ElementState, KeyEvent, WindowEvent},
    event_loop::ActiveEventLoop,
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use crate::{
    config::GameConfig,
    engine_state::{
        physics::locomotion::TickOutcome, scene::Collaborators, task_management::Scheduler,
        EngineState,
    },
};

/// Longest frame the physics will integrate in one step.
///
/// A stalled tab or a debugger pause would otherwise launch the player through the floor.
pub const MAX_FRAME_TIME: Duration = Duration::from_millis(100);

/// Frame time assumed for the very first frame.
pub const NOMINAL_FRAME_TIME: Duration = Duration::from_millis(16);

/// The host: engine, input queue and timer queue, advanced one frame at a time.
pub struct ApplicationState {
    /// The core game engine state and logic
    pub engine_state: EngineState,

    /// Manages input state and event processing
    pub input_manager: InputManager,

    /// Pending timers of every subsystem
    pub scheduler: Scheduler,

    /// Handle to the application window, once the event loop created one
    pub window: Option<Arc<Window>>,

    /// Timestamp of the last frame for delta time calculations
    last_frame_time: Option<Instant>,
}

impl ApplicationState {
    /// Creates a host around a fresh engine.
    ///
    /// # Arguments
    /// * `config` - Validated game configuration
    /// * `collaborators` - Presentation layers the engine drives
    pub fn new(config: GameConfig, collaborators: Collaborators) -> Self {
        Self {
            engine_state: EngineState::new(config, collaborators),
            input_manager: InputManager::new(),
            scheduler: Scheduler::new(),
            window: None,
            last_frame_time: None,
        }
    }

    /// Advances the game by one frame.
    ///
    /// Mouse motion is applied first, then queued input events in arrival order, then
    /// timers that came due, and finally the gameplay tick.
    ///
    /// # Arguments
    /// * `now` - Time of this frame
    ///
    /// # Returns
    /// What the gameplay tick did
    pub fn frame(&mut self, now: Instant) -> TickOutcome {
        let frame_time = match self.last_frame_time {
            Some(last) => now.saturating_duration_since(last).min(MAX_FRAME_TIME),
            None => NOMINAL_FRAME_TIME,
        };
        self.last_frame_time = Some(now);

        if let Some((delta_x, delta_y)) = self.input_manager.take_mouse_delta() {
            self.engine_state
                .camera_state
                .intake_mouse_motion(delta_x, delta_y);
        }

        let mut ctx = InputContext::new(now, &mut self.scheduler);
        for event in self.input_manager.drain_events() {
            dispatch(&mut self.engine_state, &mut ctx, event);
        }

        for fired in ctx.scheduler.poll_due(now) {
            self.engine_state.on_timer(&mut ctx, fired);
        }

        self.engine_state.update(&mut ctx, frame_time.as_secs_f32())
    }

    /// Starts over in a freshly seeded world and forgets held input.
    pub fn new_game(&mut self, seed: u64) {
        self.input_manager.release_all();
        self.input_manager.drain_events();
        self.engine_state.new_game(&mut self.scheduler, seed);
    }
}

impl ApplicationHandler for ApplicationState {
    /// Creates the window the first time the application is resumed.
    ///
    /// # Arguments
    /// * `event_loop` - Reference to the active event loop
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        #[allow(unused_mut)]
        let mut attributes = Window::default_attributes().with_title("Voxel Sandbox");
        #[cfg(target_family = "wasm")]
        {
            use winit::platform::web::WindowAttributesExtWebSys;
            attributes = attributes.with_append(true);
        }

        match event_loop.create_window(attributes) {
            Ok(window) => {
                log::info!("Window created");
                self.window = Some(Arc::new(window));
            }
            Err(error) => {
                log::error!("Could not create a window: {}", error);
                event_loop.exit();
            }
        }
    }

    /// Feeds window input to the input manager and handles quitting.
    ///
    /// # Arguments
    /// * `event_loop` - Reference to the active event loop
    /// * `_window_id` - ID of the window that generated the event
    /// * `event` - The window event to process
    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        self.input_manager.intake_input(&event);

        match event {
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        ..
                    },
                ..
            } => event_loop.exit(),
            _ => (),
        }
    }

    /// Handles device-level input events such as mouse motion.
    ///
    /// # Arguments
    /// * `_event_loop` - Reference to the active event loop
    /// * `_device_id` - ID of the device that generated the event
    /// * `event` - The device event to process
    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        if let DeviceEvent::MouseMotion { delta } = event {
            self.input_manager.intake_mouse_motion(delta);
        }
    }

    /// Runs one frame before the event loop goes to sleep.
    ///
    /// # Arguments
    /// * `_event_loop` - Reference to the active event loop
    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = self.window.clone() {
            self.frame(Instant::now());
            window.request_redraw();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::WorldConfig,
        engine_state::{physics::player::LocomotionMode, voxels::noise_field::TerrainParameters},
    };
    use winit::event::MouseButton;

    fn flat_host() -> ApplicationState {
        let config = GameConfig {
            world: WorldConfig {
                terrain: TerrainParameters::superflat(10),
                parkour: None,
            },
            ..GameConfig::default()
        };
        ApplicationState::new(config, Collaborators::headless())
    }

    fn run_frames(host: &mut ApplicationState, now: &mut Instant, frames: usize) {
        for _ in 0..frames {
            *now += NOMINAL_FRAME_TIME;
            host.frame(*now);
        }
    }

    #[test]
    fn long_stalls_are_clamped() {
        let mut host = flat_host();
        let mut now = Instant::now();
        run_frames(&mut host, &mut now, 300);
        let rest = host.engine_state.locomotion().position();

        now += Duration::from_secs(5);
        host.frame(now);
        let after = host.engine_state.locomotion().position();
        assert!((after.y - rest.y).abs() < 0.05);
    }

    #[test]
    fn queued_keys_reach_the_engine() {
        let mut host = flat_host();
        let mut now = Instant::now();
        run_frames(&mut host, &mut now, 300);

        host.input_manager.intake_key(KeyCode::KeyQ, true, false);
        run_frames(&mut host, &mut now, 1);
        assert_eq!(host.engine_state.locomotion().mode(), LocomotionMode::Flying);
    }

    #[test]
    fn mouse_motion_turns_the_camera() {
        let mut host = flat_host();
        let mut now = Instant::now();
        let yaw = host.engine_state.camera_state.camera.yaw;
        host.input_manager.intake_mouse_motion((100.0, 0.0));
        run_frames(&mut host, &mut now, 1);
        assert_ne!(host.engine_state.camera_state.camera.yaw, yaw);
    }

    #[test]
    fn focus_loss_stops_the_click_repeat() {
        let mut host = flat_host();
        let mut now = Instant::now();
        run_frames(&mut host, &mut now, 300);

        host.input_manager.intake_mouse_button(MouseButton::Left, true);
        run_frames(&mut host, &mut now, 1);
        assert!(!host.scheduler.is_empty());

        host.input_manager.intake_input(&WindowEvent::Focused(false));
        run_frames(&mut host, &mut now, 1);
        assert!(host.scheduler.is_empty());
    }
}
