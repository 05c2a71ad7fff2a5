//! # Locomotion State Machine
//!
//! Owns the player's eye position, velocity and locomotion mode, and advances them once
//! per frame.
//!
//! ## Modes
//! - `Walking`: the default
//! - `Sprinting`: double-tap forward, or forward with control; ends on forward release
//!   or when the facing side runs into a wall
//! - `Sneaking`: while the sneak key is held; lowers the eye and guards ledges
//! - `Flying`: toggled; no gravity, no collision, direct vertical control
//!
//! ## Tick
//! A tick is split into equal steps short enough that no step carries the body further
//! than the side rays reach. Each step:
//! 1. Probe the surroundings with the current ground reach, stretched by this step's fall
//! 2. Accumulate gravity below terminal speed
//! 3. Ceiling contact bounces the player down, ground contact stops the fall
//! 4. Resolve the intended velocity against the contacts and move; a sneaking player
//!    never moves to where no footprint corner has ground below it
//!
//! Key repeats and the post-jump probe window run on [`Scheduler`] timers held in
//! handle slots; every transition that invalidates a timer cancels its slot.

use std::collections::HashSet;

use cgmath::{Point3, Rad, Vector3, Zero};
use web_time::Instant;
use winit::keyboard::KeyCode;

use super::{
    player::{LocomotionMode, MovementConfig},
    probe::{CollisionProbe, ContactFlags, ProbeResult},
    resolver::{CollisionResolver, MoveIntent, Resolution},
};
use crate::{
    application_state::input_state::{Action, InputContext, InputHandler, KeyBindings, KeyInput},
    engine_state::{
        camera_state::ViewConfig,
        task_management::{
            task::{FiredTimer, TimerEvent, TimerHandle},
            Scheduler,
        },
        voxels::{block::block_side::BlockSide, world::TerrainQuery},
    },
};

/// Upper bound on the steps one tick is split into.
const MAX_STEPS: u32 = 32;

/// Per-tick physical state of the player.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocomotionState {
    /// Current mode
    pub mode: LocomotionMode,
    /// Camera-relative velocity: x forward, y up, z strafe right
    pub velocity: Vector3<f32>,
    /// Airborne after a jump, until the ground is touched again
    pub is_jumping: bool,
    /// Contacts from the most recent probe
    pub contacts: ContactFlags,
}

impl Default for LocomotionState {
    fn default() -> Self {
        Self {
            mode: LocomotionMode::Walking,
            velocity: Vector3::zero(),
            is_jumping: false,
            contacts: ContactFlags::default(),
        }
    }
}

/// What one tick did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickOutcome {
    /// Displacement applied and the walls that held it back
    pub resolution: Resolution,
    /// Probe result, absent while flying
    pub probe: Option<ProbeResult>,
    /// Whether the player fell through the safety net and was put back up
    pub respawned: bool,
}

/// Walking, sprinting, sneaking and flying, driven by key events and contacts.
#[derive(Debug)]
pub struct LocomotionStateMachine {
    config: MovementConfig,
    view: ViewConfig,
    bindings: KeyBindings,
    state: LocomotionState,
    position: Point3<f32>,
    heading: Rad<f32>,
    down_reach: f32,
    held_keys: HashSet<KeyCode>,
    last_forward_press: Option<Instant>,
    eye_lowered: bool,
    fov_request: Option<f32>,
    jump_repeat: Option<TimerHandle>,
    reach_reset: Option<TimerHandle>,
}

impl LocomotionStateMachine {
    /// Creates a walking player at an eye position.
    ///
    /// # Arguments
    /// * `config` - Movement tunables
    /// * `view` - Field-of-view presets used for mode changes
    /// * `bindings` - Key to action map
    /// * `position` - Initial eye position
    pub fn new(
        config: MovementConfig,
        view: ViewConfig,
        bindings: KeyBindings,
        position: Point3<f32>,
    ) -> Self {
        let down_reach = config.body.height;
        Self {
            config,
            view,
            bindings,
            state: LocomotionState::default(),
            position,
            heading: Rad(0.0),
            down_reach,
            held_keys: HashSet::new(),
            last_forward_press: None,
            eye_lowered: false,
            fov_request: None,
            jump_repeat: None,
            reach_reset: None,
        }
    }

    /// Mode, velocity and contacts.
    pub fn state(&self) -> &LocomotionState {
        &self.state
    }

    /// The current locomotion mode.
    pub fn mode(&self) -> LocomotionMode {
        self.state.mode
    }

    /// Movement tunables.
    pub fn config(&self) -> &MovementConfig {
        &self.config
    }

    /// Eye position.
    pub fn position(&self) -> Point3<f32> {
        self.position
    }

    /// Current length of the ground rays; zero during the post-jump window.
    pub fn down_reach(&self) -> f32 {
        self.down_reach
    }

    /// Whether any key bound to an action is currently held.
    pub fn is_held(&self, action: Action) -> bool {
        self.held_keys
            .iter()
            .any(|code| self.bindings.action_for(*code) == Some(action))
    }

    /// Takes the field of view requested by the latest mode change, if any.
    pub fn take_fov_request(&mut self) -> Option<f32> {
        self.fov_request.take()
    }

    /// Replaces the field-of-view presets and requests the current mode's view.
    pub fn set_view_config(&mut self, view: ViewConfig) {
        self.view = view;
        self.fov_request = Some(self.view.fov_for(self.state.mode));
    }

    /// Puts the player back to walking at `position`, releasing every key and timer.
    pub fn reset(&mut self, scheduler: &mut Scheduler, position: Point3<f32>) {
        scheduler.cancel_slot(&mut self.jump_repeat);
        scheduler.cancel_slot(&mut self.reach_reset);
        self.state = LocomotionState::default();
        self.position = position;
        self.down_reach = self.config.body.height;
        self.held_keys.clear();
        self.last_forward_press = None;
        self.eye_lowered = false;
        self.fov_request = Some(self.view.fov_for(LocomotionMode::Walking));
    }

    /// Switches mode and applies the mode's side effects.
    ///
    /// Entering or leaving sneak moves the eye. A held jump key has its repeat
    /// reinstalled at the new mode's interval. Entering flight ends the post-jump
    /// window.
    pub fn set_mode(&mut self, ctx: &mut InputContext<'_>, mode: LocomotionMode) {
        let previous = self.state.mode;
        if previous == mode {
            return;
        }

        if mode == LocomotionMode::Sneaking && !self.eye_lowered {
            self.position.y -= self.config.sneak_eye_drop;
            self.eye_lowered = true;
        } else if mode != LocomotionMode::Sneaking && self.eye_lowered {
            self.position.y += self.config.sneak_eye_drop;
            self.eye_lowered = false;
        }

        self.state.mode = mode;

        ctx.scheduler.cancel_slot(&mut self.jump_repeat);
        if mode.is_grounded() && self.is_held(Action::Jump) {
            ctx.scheduler.install_repeating(
                &mut self.jump_repeat,
                ctx.now,
                self.config.jump_repeat(mode),
                TimerEvent::JumpRepeat,
            );
        }

        if mode == LocomotionMode::Flying {
            ctx.scheduler.cancel_slot(&mut self.reach_reset);
            self.down_reach = self.config.body.height;
            self.state.is_jumping = false;
        }

        self.fov_request = Some(self.view.fov_for(mode));
        self.refresh_velocity();
        log::debug!("Locomotion {:?} -> {:?}", previous, mode);
    }

    /// Starts a jump if the player stands on the ground.
    ///
    /// # Returns
    /// Whether the jump happened
    pub fn jump(&mut self, ctx: &mut InputContext<'_>) -> bool {
        let mode = self.state.mode;
        if !mode.is_grounded() || !self.state.contacts.down || self.state.is_jumping {
            return false;
        }

        self.state.velocity.y = self.config.jump_velocity(mode);
        self.state.is_jumping = true;
        self.state.contacts.down = false;
        self.down_reach = 0.0;
        ctx.scheduler.install_once(
            &mut self.reach_reset,
            ctx.now,
            self.config.jump_reach_reset(),
            TimerEvent::RestoreDownReach,
        );
        log::trace!("Jump in {:?} at {:.2}", mode, self.state.velocity.y);
        true
    }

    /// Handles a timer this machine installed.
    ///
    /// # Returns
    /// `false` if the timer belongs to someone else or was superseded
    pub fn on_timer(&mut self, ctx: &mut InputContext<'_>, fired: FiredTimer) -> bool {
        match fired.event {
            TimerEvent::JumpRepeat if self.jump_repeat == Some(fired.handle) => {
                self.jump(ctx);
                true
            }
            TimerEvent::RestoreDownReach if self.reach_reset == Some(fired.handle) => {
                self.reach_reset = None;
                self.down_reach = self.config.body.height;
                true
            }
            _ => false,
        }
    }

    /// Advances the player by one frame.
    ///
    /// # Arguments
    /// * `ctx` - Time and scheduler
    /// * `probe` - Contact probe, rebuilt against `terrain` every step
    /// * `terrain` - Current world view
    /// * `heading` - Camera yaw, measured from +X towards +Z
    /// * `dt` - Frame time in seconds
    pub fn tick(
        &mut self,
        ctx: &mut InputContext<'_>,
        probe: &mut CollisionProbe,
        terrain: &TerrainQuery<'_>,
        heading: Rad<f32>,
        dt: f32,
    ) -> TickOutcome {
        self.heading = heading;

        if self.state.mode == LocomotionMode::Flying {
            self.state.contacts = ContactFlags::default();
            let resolution =
                CollisionResolver::resolve(&self.state.contacts, self.intent(), heading, dt);
            self.position += resolution.displacement;
            return TickOutcome {
                resolution,
                probe: None,
                respawned: false,
            };
        }

        let travel = self.state.velocity.x.hypot(self.state.velocity.z) * dt;
        let steps = ((travel / probe.side_reach()).ceil() as u32).clamp(1, MAX_STEPS);
        let step_dt = dt / steps as f32;
        if steps > 1 {
            log::trace!("Splitting a {:.3}s tick into {} steps", dt, steps);
        }

        let mut outcome = self.step(ctx, probe, terrain, heading, step_dt);
        for _ in 1..steps {
            if outcome.respawned {
                break;
            }
            let next = self.step(ctx, probe, terrain, heading, step_dt);
            outcome = TickOutcome {
                resolution: outcome.resolution.followed_by(next.resolution),
                probe: next.probe,
                respawned: next.respawned,
            };
        }
        outcome
    }

    fn step(
        &mut self,
        ctx: &mut InputContext<'_>,
        probe: &mut CollisionProbe,
        terrain: &TerrainQuery<'_>,
        heading: Rad<f32>,
        dt: f32,
    ) -> TickOutcome {
        let reach = self.down_reach - self.state.velocity.y * dt;
        let ledge_guard = self.state.mode == LocomotionMode::Sneaking && !self.state.is_jumping;
        let result = probe.probe(terrain, self.position, reach, ledge_guard);
        self.state.contacts = result.contacts;

        if self.state.velocity.y.abs() < self.config.terminal_fall_speed {
            self.state.velocity.y -= self.config.gravity * dt;
        }

        if self.state.contacts.up {
            self.state.velocity.y = -self.config.ceiling_bounce * dt;
            self.down_reach = self.config.body.height;
            ctx.scheduler.cancel_slot(&mut self.reach_reset);
        }

        if self.state.contacts.down {
            if self.state.is_jumping {
                self.state.is_jumping = false;
            } else {
                self.state.velocity.y = 0.0;
            }
        }

        if self.state.mode == LocomotionMode::Sprinting
            && self.state.contacts.get(BlockSide::facing(heading))
        {
            self.set_mode(ctx, LocomotionMode::Walking);
        }

        let mut resolution =
            CollisionResolver::resolve(&self.state.contacts, self.intent(), heading, dt);
        if ledge_guard && self.state.contacts.down {
            let reach = reach.max(self.config.body.height);
            self.keep_footing(probe, terrain, reach, &mut resolution);
        }
        self.position += resolution.displacement;

        let respawned = self.position.y < self.config.safety_net_y;
        if respawned {
            log::info!(
                "Fell below {} at ({:.1}, {:.1}), respawning",
                self.config.safety_net_y,
                self.position.x,
                self.position.z
            );
            self.position.y = self.config.respawn_y;
            self.state.velocity.y = 0.0;
        }

        TickOutcome {
            resolution,
            probe: Some(result),
            respawned,
        }
    }

    /// Drops the horizontal parts of a sneaking move that would leave every footprint
    /// corner over a drop. Ledge guards only cover one or two missed corners, so a
    /// diagonal step off an outer corner is caught here.
    fn keep_footing(
        &self,
        probe: &mut CollisionProbe,
        terrain: &TerrainQuery<'_>,
        reach: f32,
        resolution: &mut Resolution,
    ) {
        let full = resolution.displacement;
        if (full.x == 0.0 && full.z == 0.0)
            || probe.has_footing(terrain, self.position + full, reach)
        {
            return;
        }

        let along_x = Vector3::new(full.x, full.y, 0.0);
        let along_z = Vector3::new(0.0, full.y, full.z);
        if full.x != 0.0 && probe.has_footing(terrain, self.position + along_x, reach) {
            resolution.displacement = along_x;
            resolution.clipped_z |= full.z != 0.0;
        } else if full.z != 0.0 && probe.has_footing(terrain, self.position + along_z, reach) {
            resolution.displacement = along_z;
            resolution.clipped_x |= full.x != 0.0;
        } else {
            resolution.displacement = Vector3::new(0.0, full.y, 0.0);
            resolution.clipped_x |= full.x != 0.0;
            resolution.clipped_z |= full.z != 0.0;
        }
        log::trace!("Sneak kept footing at ({:.2}, {:.2})", self.position.x, self.position.z);
    }

    fn intent(&self) -> MoveIntent {
        MoveIntent {
            forward: self.state.velocity.x,
            strafe: self.state.velocity.z,
            vertical: self.state.velocity.y,
        }
    }

    fn axis(&self, positive: Action, negative: Action) -> f32 {
        let value = |action| if self.is_held(action) { 1.0 } else { 0.0 };
        value(positive) - value(negative)
    }

    /// Re-derives the horizontal velocity, and the vertical one while flying, from the
    /// held keys at the current mode's speed.
    fn refresh_velocity(&mut self) {
        let speed = self.config.speed(self.state.mode);
        self.state.velocity.x = speed * self.axis(Action::Forward, Action::Backward);
        self.state.velocity.z = speed * self.axis(Action::StrafeRight, Action::StrafeLeft);
        if self.state.mode == LocomotionMode::Flying {
            self.state.velocity.y = speed * self.axis(Action::Jump, Action::Sneak);
        }
    }

    fn try_sprint(&mut self, ctx: &mut InputContext<'_>) {
        if self.state.mode == LocomotionMode::Walking
            && self.is_held(Action::Forward)
            && !self.state.contacts.get(BlockSide::facing(self.heading))
        {
            self.set_mode(ctx, LocomotionMode::Sprinting);
        }
    }

    fn toggle_flight(&mut self, ctx: &mut InputContext<'_>) {
        self.state.velocity = Vector3::zero();
        self.state.is_jumping = false;
        let next = if self.state.mode == LocomotionMode::Flying {
            LocomotionMode::Walking
        } else {
            LocomotionMode::Flying
        };
        self.set_mode(ctx, next);
    }
}

impl InputHandler for LocomotionStateMachine {
    fn on_key_down(&mut self, ctx: &mut InputContext<'_>, input: KeyInput) {
        if input.repeat {
            return;
        }
        let Some(action) = self.bindings.action_for(input.code) else {
            return;
        };
        self.held_keys.insert(input.code);
        let flying = self.state.mode == LocomotionMode::Flying;

        match action {
            Action::Forward => {
                let double_tap = self
                    .last_forward_press
                    .is_some_and(|last| ctx.now.saturating_duration_since(last) <= self.config.double_tap());
                self.last_forward_press = Some(ctx.now);
                if double_tap || input.modifiers.control_key() {
                    self.try_sprint(ctx);
                }
            }
            Action::Sprint => self.try_sprint(ctx),
            Action::Sneak if !flying => self.set_mode(ctx, LocomotionMode::Sneaking),
            Action::Jump if !flying => {
                self.jump(ctx);
                ctx.scheduler.install_repeating(
                    &mut self.jump_repeat,
                    ctx.now,
                    self.config.jump_repeat(self.state.mode),
                    TimerEvent::JumpRepeat,
                );
            }
            Action::ToggleFlight => self.toggle_flight(ctx),
            _ => {}
        }
        self.refresh_velocity();
    }

    fn on_key_up(&mut self, ctx: &mut InputContext<'_>, input: KeyInput) {
        let Some(action) = self.bindings.action_for(input.code) else {
            return;
        };
        self.held_keys.remove(&input.code);
        if self.is_held(action) {
            // Another key bound to the same action is still down.
            return;
        }

        match action {
            Action::Forward if self.state.mode == LocomotionMode::Sprinting => {
                self.set_mode(ctx, LocomotionMode::Walking);
            }
            Action::Sneak if self.state.mode == LocomotionMode::Sneaking => {
                self.set_mode(ctx, LocomotionMode::Walking);
            }
            Action::Jump => ctx.scheduler.cancel_slot(&mut self.jump_repeat),
            _ => {}
        }
        self.refresh_velocity();
    }
}
