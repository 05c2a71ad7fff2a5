//! # Engine State Module
//!
//! The gameplay core: the world, the player and everything that happens to them each
//! frame.
//!
//! ## Key Components
//!
//! * `EngineState` - The main state container, owner of all subsystems
//! * `camera_state` - Camera orientation, mouse look and field-of-view targets
//! * `interaction` - Hotbar and block placement/removal
//! * `physics` - Ray and box geometry, contact probing, collision response, locomotion
//! * `scene` - Interfaces to the renderer, audio and view collaborators
//! * `task_management` - Deadline queue for key repeats and transient windows
//! * `voxels` - Block types, noise fields, edits, terrain queries and the parkour trail
//!
//! ## Frame
//!
//! Input events and due timers are dispatched to `EngineState` first; then a single
//! `update` runs the locomotion tick (probe, integrate, resolve) and commits the eye
//! position to the view collaborator. The probe is rebuilt from the current world every
//! tick, so edits made by this frame's clicks are already solid for this frame's physics.

use cgmath::Point3;
use winit::event::MouseButton;

use camera_state::CameraState;
use interaction::{BlockInteraction, InteractionScope};
use physics::{
    locomotion::{LocomotionStateMachine, TickOutcome},
    probe::CollisionProbe,
};
use scene::Collaborators;
use task_management::{task::FiredTimer, Scheduler};
use voxels::world::WorldState;

use crate::{
    application_state::input_state::{Action, InputContext, InputHandler, KeyBindings, KeyInput},
    config::GameConfig,
};

pub mod camera_state;
pub mod interaction;
pub mod physics;
pub mod scene;
pub mod task_management;
pub mod voxels;

/// Eye height at which a new game starts; the player falls to the ground from here.
pub const SPAWN_HEIGHT: f32 = 40.0;

/// The main state container of the game core.
///
/// Owns the world and the player, and lends them to collaborators through explicit
/// references; there is no global state.
///
/// # Examples
///
/// ```ignore
/// let mut engine_state = EngineState::new(GameConfig::default(), Collaborators::headless());
/// let mut scheduler = Scheduler::new();
///
/// // Main game loop
/// loop {
///     let now = Instant::now();
///     let mut ctx = InputContext::new(now, &mut scheduler);
///     for event in input_manager.drain_events() {
///         dispatch(&mut engine_state, &mut ctx, event);
///     }
///     engine_state.update(&mut ctx, frame_seconds);
/// }
/// ```
pub struct EngineState {
    /// Camera orientation and field-of-view target
    pub camera_state: CameraState,
    /// Procedural terrain, edits and the parkour trail
    world: WorldState,
    /// Player movement
    locomotion: LocomotionStateMachine,
    /// Per-tick contact probe, reusing its candidate buffer
    probe: CollisionProbe,
    /// Hotbar and block actions
    interaction: BlockInteraction,
    /// Renderer, audio and view
    collaborators: Collaborators,
    /// Key to action map, used for hotbar and view keys
    bindings: KeyBindings,
}

impl EngineState {
    /// Creates the world and puts the player at the spawn point.
    ///
    /// # Arguments
    /// * `config` - Validated game configuration
    /// * `collaborators` - Presentation layers to drive
    pub fn new(config: GameConfig, collaborators: Collaborators) -> Self {
        let GameConfig {
            world,
            player,
            view,
            interaction,
        } = config;

        let spawn = Self::spawn_point();
        let bindings = KeyBindings::default();
        let probe = CollisionProbe::from_config(&player);
        let locomotion =
            LocomotionStateMachine::new(player, view.clone(), bindings.clone(), spawn);

        log::info!(
            "Engine created, spawn at ({}, {}, {})",
            spawn.x,
            spawn.y,
            spawn.z
        );

        Self {
            camera_state: CameraState::new(view, spawn),
            world: WorldState::new(world.terrain, world.parkour),
            locomotion,
            probe,
            interaction: BlockInteraction::new(interaction),
            collaborators,
            bindings,
        }
    }

    fn spawn_point() -> Point3<f32> {
        Point3::new(0.0, SPAWN_HEIGHT, 0.0)
    }

    /// The voxel world of the current session.
    pub fn world(&self) -> &WorldState {
        &self.world
    }

    /// Mutable access to the world, for edits made outside block actions.
    pub fn world_mut(&mut self) -> &mut WorldState {
        &mut self.world
    }

    /// The player's movement state.
    pub fn locomotion(&self) -> &LocomotionStateMachine {
        &self.locomotion
    }

    /// Hotbar selection and held mouse buttons.
    pub fn interaction(&self) -> &BlockInteraction {
        &self.interaction
    }

    /// The contact probe, holding the candidates of the latest tick.
    pub fn probe(&self) -> &CollisionProbe {
        &self.probe
    }

    /// Runs one frame of gameplay.
    ///
    /// # Arguments
    /// * `ctx` - Frame time and scheduler
    /// * `dt` - Seconds since the previous frame
    pub fn update(&mut self, ctx: &mut InputContext<'_>, dt: f32) -> TickOutcome {
        self.camera_state.update();
        self.world.extend_parkour(self.locomotion.position().x);

        let heading = self.camera_state.camera.heading();
        let terrain = self.world.query();
        let outcome = self
            .locomotion
            .tick(ctx, &mut self.probe, &terrain, heading, dt);

        self.flush_fov_request();
        let position = self.locomotion.position();
        self.camera_state.camera.position = position;
        self.collaborators.view.commit_position(position);
        outcome
    }

    /// Routes a fired timer to whichever subsystem installed it.
    pub fn on_timer(&mut self, ctx: &mut InputContext<'_>, fired: FiredTimer) {
        if !self.locomotion.on_timer(ctx, fired) {
            let mut scope = InteractionScope {
                world: &mut self.world,
                collaborators: &mut self.collaborators,
                camera: &self.camera_state.camera,
            };
            if !self.interaction.on_timer(&mut scope, fired) {
                log::trace!("Stale timer {:?}", fired);
            }
        }
        self.flush_fov_request();
    }

    /// Starts over in a freshly seeded world.
    ///
    /// Every pending timer is dropped, edits are cleared and the player is back at the
    /// spawn point, walking.
    pub fn new_game(&mut self, scheduler: &mut Scheduler, seed: u64) {
        let mut rng = fastrand::Rng::with_seed(seed);
        self.world.reseed(rng.f64());
        scheduler.clear();
        self.interaction.reset();

        let spawn = Self::spawn_point();
        self.locomotion.reset(scheduler, spawn);
        self.camera_state.camera.position = spawn;
        self.flush_fov_request();
        self.collaborators.view.commit_position(spawn);
        log::info!("New game with seed {}", seed);
    }

    fn flush_fov_request(&mut self) {
        if let Some(target) = self.locomotion.take_fov_request() {
            if let Some((target, duration)) = self.camera_state.request_fov(target) {
                self.collaborators.view.animate_fov(target, duration);
            }
        }
    }

    fn interaction_scope(&mut self) -> (&mut BlockInteraction, InteractionScope<'_>) {
        (
            &mut self.interaction,
            InteractionScope {
                world: &mut self.world,
                collaborators: &mut self.collaborators,
                camera: &self.camera_state.camera,
            },
        )
    }
}

impl InputHandler for EngineState {
    fn on_key_down(&mut self, ctx: &mut InputContext<'_>, input: KeyInput) {
        match self.bindings.action_for(input.code) {
            Some(Action::Hotbar(slot)) => {
                if !input.repeat {
                    self.interaction.select(slot);
                }
                return;
            }
            Some(Action::CycleFov) => {
                if !input.repeat {
                    let base = self.camera_state.cycle_fov_preset();
                    self.locomotion
                        .set_view_config(self.camera_state.config().clone());
                    log::debug!("FOV preset {}", base);
                }
            }
            _ => self.locomotion.on_key_down(ctx, input),
        }
        self.flush_fov_request();
    }

    fn on_key_up(&mut self, ctx: &mut InputContext<'_>, input: KeyInput) {
        self.locomotion.on_key_up(ctx, input);
        self.flush_fov_request();
    }

    fn on_mouse_down(&mut self, ctx: &mut InputContext<'_>, button: MouseButton) {
        let (interaction, mut scope) = self.interaction_scope();
        interaction.on_mouse_down(ctx, &mut scope, button);
    }

    fn on_mouse_up(&mut self, ctx: &mut InputContext<'_>, button: MouseButton) {
        self.interaction.on_mouse_up(ctx, button);
    }

    fn on_wheel(&mut self, ctx: &mut InputContext<'_>, delta_y: f32) {
        self.interaction.scroll(ctx, delta_y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        application_state::input_state::{dispatch, InputEvent},
        config::WorldConfig,
        core::StResource,
        engine_state::{
            physics::player::LocomotionMode,
            scene::CollaboratorCall,
            voxels::{block::block_type::BlockType, noise_field::TerrainParameters},
        },
    };
    use web_time::{Duration, Instant};
    use winit::keyboard::KeyCode;

    fn flat_engine() -> (EngineState, StResource<Vec<CollaboratorCall>>) {
        let config = GameConfig {
            world: WorldConfig {
                terrain: TerrainParameters::superflat(10),
                parkour: None,
            },
            ..GameConfig::default()
        };
        let (collaborators, calls) = Collaborators::recording();
        (EngineState::new(config, collaborators), calls)
    }

    fn settle(engine: &mut EngineState, scheduler: &mut Scheduler, now: &mut Instant, frames: usize) {
        for _ in 0..frames {
            *now += Duration::from_millis(16);
            let fired = scheduler.poll_due(*now);
            let mut ctx = InputContext::new(*now, scheduler);
            for timer in fired {
                engine.on_timer(&mut ctx, timer);
            }
            engine.update(&mut ctx, 0.016);
        }
    }

    #[test]
    fn spawn_falls_to_the_ground_and_commits_positions() {
        let (mut engine, calls) = flat_engine();
        let mut scheduler = Scheduler::new();
        let mut now = Instant::now();
        settle(&mut engine, &mut scheduler, &mut now, 300);

        let state = engine.locomotion().state();
        assert!(state.contacts.down);
        assert!((engine.locomotion().position().y - 12.3).abs() < 0.05);
        assert_eq!(engine.camera_state.camera.position, engine.locomotion().position());
        assert!(matches!(
            calls.get().last(),
            Some(CollaboratorCall::CommitPosition(_))
        ));
    }

    #[test]
    fn sprint_requests_a_wider_view() {
        let (mut engine, calls) = flat_engine();
        let mut scheduler = Scheduler::new();
        let mut now = Instant::now();
        settle(&mut engine, &mut scheduler, &mut now, 300);
        calls.get_mut().clear();

        let mut ctx = InputContext::new(now, &mut scheduler);
        let forward = KeyInput::new(KeyCode::KeyW);
        dispatch(&mut engine, &mut ctx, InputEvent::KeyDown(forward));
        dispatch(&mut engine, &mut ctx, InputEvent::KeyUp(forward));
        dispatch(&mut engine, &mut ctx, InputEvent::KeyDown(forward));
        assert_eq!(engine.locomotion().mode(), LocomotionMode::Sprinting);
        assert!(calls.get().contains(&CollaboratorCall::AnimateFov {
            target: 90.0,
            duration: Duration::from_millis(200),
        }));
    }

    #[test]
    fn digit_keys_pick_the_hotbar_slot() {
        let (mut engine, _calls) = flat_engine();
        let mut scheduler = Scheduler::new();
        let mut ctx = InputContext::new(Instant::now(), &mut scheduler);
        dispatch(
            &mut engine,
            &mut ctx,
            InputEvent::KeyDown(KeyInput::new(KeyCode::Digit7)),
        );
        assert_eq!(engine.interaction().selected_block(), BlockType::Glass);
    }

    #[test]
    fn view_key_cycles_the_fov_preset() {
        let (mut engine, calls) = flat_engine();
        let mut scheduler = Scheduler::new();
        let mut ctx = InputContext::new(Instant::now(), &mut scheduler);
        dispatch(
            &mut engine,
            &mut ctx,
            InputEvent::KeyDown(KeyInput::new(KeyCode::KeyV)),
        );
        assert_eq!(engine.camera_state.fov_target(), 90.0);
        assert!(calls.get().contains(&CollaboratorCall::AnimateFov {
            target: 90.0,
            duration: Duration::from_millis(200),
        }));
    }

    #[test]
    fn new_game_clears_edits_and_timers() {
        let (mut engine, _calls) = flat_engine();
        let mut scheduler = Scheduler::new();
        let mut now = Instant::now();
        settle(&mut engine, &mut scheduler, &mut now, 300);

        engine
            .world_mut()
            .record_edit(Point3::new(3, 11, 3), BlockType::Glass, true);
        let mut ctx = InputContext::new(now, &mut scheduler);
        dispatch(
            &mut engine,
            &mut ctx,
            InputEvent::KeyDown(KeyInput::new(KeyCode::Space)),
        );
        assert!(!scheduler.is_empty());

        engine.new_game(&mut scheduler, 42);
        assert!(scheduler.is_empty());
        assert!(engine.world().edits().is_empty());
        assert_eq!(engine.locomotion().position(), Point3::new(0.0, SPAWN_HEIGHT, 0.0));
        assert_eq!(engine.locomotion().mode(), LocomotionMode::Walking);
    }
}
