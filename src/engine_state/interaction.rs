//! # Block Interaction
//!
//! Placing and removing blocks, and the hotbar that chooses what gets placed.
//!
//! Left mouse removes the targeted block, right mouse places the selected block against
//! the targeted face. Holding a button repeats the action on a timer. Failed actions are
//! not errors to the player: they are logged at debug level and nothing happens.

use cgmath::Point3;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use web_time::Duration;
use winit::event::MouseButton;

use super::{
    camera_state::camera::Camera,
    physics::{
        aabb::Ray,
        raycast::{pick_block, BlockHit, PICK_REACH},
    },
    scene::Collaborators,
    task_management::task::{FiredTimer, TimerEvent, TimerHandle},
    voxels::{
        block::{block_side::BlockSide, block_type::BlockType},
        voxel_at,
        world::WorldState,
        VoxelPosition,
    },
};
use crate::application_state::input_state::InputContext;

/// Why a block action did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ActionError {
    /// The crosshair points at nothing within reach
    #[error("no block in reach")]
    NoTarget,
    /// The targeted block is bedrock
    #[error("block at {position:?} cannot be removed")]
    Immutable {
        /// The targeted voxel
        position: VoxelPosition,
    },
    /// The new block would fill a voxel the player's body occupies
    #[error("placing at {position:?} would trap the player")]
    OverlapsPlayer {
        /// The voxel the block would have filled
        position: VoxelPosition,
    },
}

/// Hotbar contents and action timings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    /// Block types selectable for placement
    pub hotbar: Vec<BlockType>,
    /// Maximum distance to a targeted block
    pub reach: f32,
    /// Interval of repeated actions while a mouse button is held, in ms
    pub click_repeat_ms: u64,
    /// Minimum time between two wheel-driven hotbar changes, in ms
    pub wheel_cooldown_ms: u64,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            hotbar: vec![
                BlockType::Grass,
                BlockType::Stone,
                BlockType::Tree,
                BlockType::Wood,
                BlockType::Diamond,
                BlockType::Quartz,
                BlockType::Glass,
                BlockType::Grass,
                BlockType::Grass,
                BlockType::Grass,
            ],
            reach: PICK_REACH,
            click_repeat_ms: 333,
            wheel_cooldown_ms: 100,
        }
    }
}

/// What a block action needs to reach beyond the interaction state.
pub struct InteractionScope<'a> {
    /// The world edits are recorded in
    pub world: &'a mut WorldState,
    /// Scene and audio feedback
    pub collaborators: &'a mut Collaborators,
    /// The view the crosshair ray starts from
    pub camera: &'a Camera,
}

/// Hotbar selection and mouse-held repeats.
#[derive(Debug)]
pub struct BlockInteraction {
    config: InteractionConfig,
    selected: usize,
    held_button: Option<MouseButton>,
    click_repeat: Option<TimerHandle>,
    wheel_cooldown: Option<TimerHandle>,
}

impl BlockInteraction {
    /// Creates the interaction state with the first hotbar slot selected.
    pub fn new(config: InteractionConfig) -> Self {
        Self {
            config,
            selected: 0,
            held_button: None,
            click_repeat: None,
            wheel_cooldown: None,
        }
    }

    /// Index of the selected hotbar slot.
    pub fn selected_slot(&self) -> usize {
        self.selected
    }

    /// The block type right click places.
    pub fn selected_block(&self) -> BlockType {
        self.config
            .hotbar
            .get(self.selected)
            .copied()
            .unwrap_or(BlockType::Grass)
    }

    /// Selects a hotbar slot.
    ///
    /// # Returns
    /// `false` if the slot does not exist
    pub fn select(&mut self, slot: usize) -> bool {
        if slot >= self.config.hotbar.len() {
            return false;
        }
        self.selected = slot;
        log::debug!("Selected slot {} ({})", slot, self.selected_block());
        true
    }

    /// Moves the selection one slot along the wheel direction, then ignores the wheel
    /// until the cooldown has passed.
    pub fn scroll(&mut self, ctx: &mut InputContext<'_>, delta_y: f32) {
        let len = self.config.hotbar.len();
        if self.wheel_cooldown.is_some() || len == 0 || delta_y == 0.0 {
            return;
        }
        self.selected = if delta_y > 0.0 {
            (self.selected + 1) % len
        } else {
            (self.selected + len - 1) % len
        };
        ctx.scheduler.install_once(
            &mut self.wheel_cooldown,
            ctx.now,
            Duration::from_millis(self.config.wheel_cooldown_ms),
            TimerEvent::WheelCooldown,
        );
    }

    /// The block under the crosshair.
    ///
    /// Asks the scene first and falls back to walking the voxel grid.
    pub fn target(&self, scope: &InteractionScope<'_>) -> Option<BlockHit> {
        let ray = Ray::new(scope.camera.position, scope.camera.look_direction());
        scope
            .collaborators
            .scene
            .instanced_block_at(&ray)
            .or_else(|| pick_block(&scope.world.query(), &ray, self.config.reach))
    }

    /// Removes the targeted block and shows the procedural neighbours it exposed.
    pub fn remove_block(
        &self,
        scope: &mut InteractionScope<'_>,
        target: Option<BlockHit>,
    ) -> Result<VoxelPosition, ActionError> {
        let position = target.ok_or(ActionError::NoTarget)?.position;
        let block = scope.world.query().block_at(position);
        if !block.is_removable() {
            return Err(ActionError::Immutable { position });
        }

        scope.world.record_edit(position, block, false);
        scope.collaborators.scene.remove_voxel_visual(position);
        scope.collaborators.audio.play_sound(block);

        let terrain = scope.world.query();
        for side in BlockSide::all() {
            let neighbour = position + side.offset();
            if scope.world.edits().query(neighbour).is_some() {
                continue;
            }
            let exposed = terrain.block_at(neighbour);
            if exposed.is_solid() {
                scope
                    .collaborators
                    .scene
                    .add_transient_voxel_visual(neighbour, exposed);
            }
        }

        log::debug!("Removed {} at {:?}", block, position);
        Ok(position)
    }

    /// Places the selected block against the targeted face.
    ///
    /// # Arguments
    /// * `eye` - Player eye position; the eye and body cells below it stay free
    pub fn place_block(
        &self,
        scope: &mut InteractionScope<'_>,
        target: Option<BlockHit>,
        eye: Point3<f32>,
    ) -> Result<VoxelPosition, ActionError> {
        let position = target.ok_or(ActionError::NoTarget)?.adjacent();
        let player = voxel_at(eye);
        if position.x == player.x
            && position.z == player.z
            && (position.y == player.y || position.y == player.y - 1)
        {
            return Err(ActionError::OverlapsPlayer { position });
        }

        let block = self.selected_block();
        scope.world.record_edit(position, block, true);
        scope
            .collaborators
            .scene
            .add_transient_voxel_visual(position, block);
        scope.collaborators.audio.play_sound(block);

        log::debug!("Placed {} at {:?}", block, position);
        Ok(position)
    }

    /// Runs the action bound to a mouse button against the current target.
    pub fn perform(
        &self,
        scope: &mut InteractionScope<'_>,
        button: MouseButton,
    ) -> Option<Result<VoxelPosition, ActionError>> {
        let result = match button {
            MouseButton::Left => {
                let target = self.target(scope);
                self.remove_block(scope, target)
            }
            MouseButton::Right => {
                let target = self.target(scope);
                let eye = scope.camera.position;
                self.place_block(scope, target, eye)
            }
            _ => return None,
        };
        if let Err(error) = &result {
            log::debug!("{:?} click ignored: {}", button, error);
        }
        Some(result)
    }

    /// Acts on a button press and keeps repeating while it is held.
    pub fn on_mouse_down(
        &mut self,
        ctx: &mut InputContext<'_>,
        scope: &mut InteractionScope<'_>,
        button: MouseButton,
    ) {
        if self.perform(scope, button).is_none() {
            return;
        }
        self.held_button = Some(button);
        ctx.scheduler.install_repeating(
            &mut self.click_repeat,
            ctx.now,
            Duration::from_millis(self.config.click_repeat_ms),
            TimerEvent::ClickRepeat(button),
        );
    }

    /// Stops the repeat of a released button.
    pub fn on_mouse_up(&mut self, ctx: &mut InputContext<'_>, button: MouseButton) {
        if self.held_button == Some(button) {
            self.held_button = None;
            ctx.scheduler.cancel_slot(&mut self.click_repeat);
        }
    }

    /// Handles a timer this state installed.
    ///
    /// # Returns
    /// `false` if the timer belongs to someone else or was superseded
    pub fn on_timer(&mut self, scope: &mut InteractionScope<'_>, fired: FiredTimer) -> bool {
        match fired.event {
            TimerEvent::ClickRepeat(button) if self.click_repeat == Some(fired.handle) => {
                self.perform(scope, button);
                true
            }
            TimerEvent::WheelCooldown if self.wheel_cooldown == Some(fired.handle) => {
                self.wheel_cooldown = None;
                true
            }
            _ => false,
        }
    }

    /// Forgets held buttons and timers; the scheduler is expected to be cleared too.
    pub fn reset(&mut self) {
        self.held_button = None;
        self.click_repeat = None;
        self.wheel_cooldown = None;
    }
}
