//! # Collaborators
//!
//! Interfaces of the presentation layers the core drives but does not own: the scene
//! that shows voxels, the audio that plays block sounds and the view that animates the
//! camera. Calls are fire-and-forget and must not fail.
//!
//! Two implementations ship with the core: a headless one that only logs, used by the
//! native demo, and a recording one that keeps every call for inspection.

use cgmath::Point3;
use web_time::Duration;

use super::{
    physics::{aabb::Ray, raycast::BlockHit},
    voxels::{block::block_type::BlockType, VoxelPosition},
};
use crate::core::StResource;

/// The renderer side of the world.
pub trait Scene {
    /// Shows a voxel that the procedural mesh does not contain.
    fn add_transient_voxel_visual(&mut self, position: VoxelPosition, block_type: BlockType);

    /// Hides the voxel at a position.
    fn remove_voxel_visual(&mut self, position: VoxelPosition);

    /// Answers which rendered block a ray hits, if the renderer can tell.
    ///
    /// The default defers to the core's own voxel raycast.
    fn instanced_block_at(&self, _ray: &Ray) -> Option<BlockHit> {
        None
    }
}

/// Block sound playback.
pub trait AudioSink {
    /// Plays the break or place sound of a block type.
    fn play_sound(&mut self, block_type: BlockType);
}

/// Camera presentation: position commits and field-of-view tweens.
pub trait ViewAnimator {
    /// Animates the field of view to `target` degrees over `duration`.
    fn animate_fov(&mut self, target: f32, duration: Duration);

    /// Moves the rendered camera to the player's eye.
    fn commit_position(&mut self, position: Point3<f32>);
}

/// The three collaborators the engine talks to.
pub struct Collaborators {
    /// Voxel visuals and block targeting
    pub scene: Box<dyn Scene>,
    /// Block sounds
    pub audio: Box<dyn AudioSink>,
    /// Camera position and field of view
    pub view: Box<dyn ViewAnimator>,
}

impl Collaborators {
    /// Collaborators that log every call and render nothing.
    pub fn headless() -> Self {
        Self {
            scene: Box::new(HeadlessCollaborator),
            audio: Box::new(HeadlessCollaborator),
            view: Box::new(HeadlessCollaborator),
        }
    }

    /// Collaborators that record every call into a shared log.
    ///
    /// # Returns
    /// The collaborators and a handle to the log they write
    pub fn recording() -> (Self, StResource<Vec<CollaboratorCall>>) {
        let recorder = RecordingCollaborator::default();
        let log = recorder.calls.clone();
        let collaborators = Self {
            scene: Box::new(recorder.clone()),
            audio: Box::new(recorder.clone()),
            view: Box::new(recorder),
        };
        (collaborators, log)
    }
}

/// Logs calls at trace level.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeadlessCollaborator;

impl Scene for HeadlessCollaborator {
    fn add_transient_voxel_visual(&mut self, position: VoxelPosition, block_type: BlockType) {
        log::trace!("Show {} at {:?}", block_type, position);
    }

    fn remove_voxel_visual(&mut self, position: VoxelPosition) {
        log::trace!("Hide voxel at {:?}", position);
    }
}

impl AudioSink for HeadlessCollaborator {
    fn play_sound(&mut self, block_type: BlockType) {
        log::trace!("Play {} sound", block_type);
    }
}

impl ViewAnimator for HeadlessCollaborator {
    fn animate_fov(&mut self, target: f32, duration: Duration) {
        log::trace!("Animate FOV to {} over {:?}", target, duration);
    }

    fn commit_position(&mut self, _position: Point3<f32>) {}
}

/// One call made to a collaborator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CollaboratorCall {
    /// [`Scene::add_transient_voxel_visual`]
    AddVisual {
        /// Voxel shown
        position: VoxelPosition,
        /// Its block type
        block_type: BlockType,
    },
    /// [`Scene::remove_voxel_visual`]
    RemoveVisual {
        /// Voxel hidden
        position: VoxelPosition,
    },
    /// [`AudioSink::play_sound`]
    Sound(BlockType),
    /// [`ViewAnimator::animate_fov`]
    AnimateFov {
        /// Field of view in degrees
        target: f32,
        /// Tween length
        duration: Duration,
    },
    /// [`ViewAnimator::commit_position`]
    CommitPosition(Point3<f32>),
}

/// Appends every call to a shared log.
#[derive(Debug, Clone, Default)]
pub struct RecordingCollaborator {
    /// Every call so far, oldest first
    pub calls: StResource<Vec<CollaboratorCall>>,
}

impl RecordingCollaborator {
    fn record(&self, call: CollaboratorCall) {
        self.calls.get_mut().push(call);
    }
}

impl Scene for RecordingCollaborator {
    fn add_transient_voxel_visual(&mut self, position: VoxelPosition, block_type: BlockType) {
        self.record(CollaboratorCall::AddVisual {
            position,
            block_type,
        });
    }

    fn remove_voxel_visual(&mut self, position: VoxelPosition) {
        self.record(CollaboratorCall::RemoveVisual { position });
    }
}

impl AudioSink for RecordingCollaborator {
    fn play_sound(&mut self, block_type: BlockType) {
        self.record(CollaboratorCall::Sound(block_type));
    }
}

impl ViewAnimator for RecordingCollaborator {
    fn animate_fov(&mut self, target: f32, duration: Duration) {
        self.record(CollaboratorCall::AnimateFov { target, duration });
    }

    fn commit_position(&mut self, position: Point3<f32>) {
        self.record(CollaboratorCall::CommitPosition(position));
    }
}
