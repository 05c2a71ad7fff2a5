//! # Edit Log
//!
//! Sparse record of player-made deviations from the procedural terrain. Each voxel has
//! at most one authoritative [`Edit`]; a later edit at the same coordinate replaces the
//! earlier one outright (last write wins), so any sequence of edits at a position
//! collapses to its final element.

use std::collections::HashMap;

use super::{block::block_type::BlockType, VoxelPosition};

/// A single override of the procedural field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edit {
    /// The voxel being overridden
    pub position: VoxelPosition,
    /// The block type placed, or the type that was removed
    pub block_type: BlockType,
    /// `true` adds a block, `false` forces the voxel empty
    pub placed: bool,
}

impl Edit {
    /// The block this edit makes visible at its position.
    pub fn resulting_block(&self) -> BlockType {
        if self.placed {
            self.block_type
        } else {
            BlockType::Air
        }
    }
}

/// Hash-indexed collection of edits.
#[derive(Debug, Default, Clone)]
pub struct EditLog {
    edits: HashMap<VoxelPosition, Edit>,
}

impl EditLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an edit, superseding whatever was recorded at the same position.
    ///
    /// # Returns
    /// The edit that was superseded, if any
    pub fn record_edit(
        &mut self,
        position: VoxelPosition,
        block_type: BlockType,
        placed: bool,
    ) -> Option<Edit> {
        self.edits.insert(
            position,
            Edit {
                position,
                block_type,
                placed,
            },
        )
    }

    /// The authoritative edit at a position, if any.
    pub fn query(&self, position: VoxelPosition) -> Option<&Edit> {
        self.edits.get(&position)
    }

    /// Iterates over all edits in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = &Edit> {
        self.edits.values()
    }

    /// Number of overridden voxels.
    pub fn len(&self) -> usize {
        self.edits.len()
    }

    /// Whether nothing has been edited.
    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    /// Forgets every edit. Used when a new game starts.
    pub fn clear(&mut self) {
        self.edits.clear();
    }
}
