//! # Block Type Module
//!
//! This module defines the different types of blocks in the voxel world.
//! It provides block type identification and the per-type rules the gameplay code
//! relies on (solidity and removability).

use std::fmt;

use serde::{Deserialize, Serialize};

/// Enumerates all possible block types in the voxel world.
///
/// Each variant represents a distinct type of block. Configuration files name them in
/// lowercase.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockType {
    /// The absence of a block.
    Air = 0,

    /// Surface block of ordinary terrain.
    Grass = 1,

    /// Surface block of low-lying terrain.
    Sand = 2,

    /// Tree trunk.
    Tree = 3,

    /// Foliage around tree tops.
    Leaf = 4,

    /// Plain dirt, placeable only.
    Dirt = 5,

    /// Underground fill and rocky surface patches.
    Stone = 6,

    /// Ore variant of stone surface patches.
    Coal = 7,

    /// Planks, placeable only.
    Wood = 8,

    /// Placeable only.
    Diamond = 9,

    /// Parkour platforms and placeable.
    Quartz = 10,

    /// Placeable only.
    Glass = 11,

    /// The indestructible floor of the world.
    Bedrock = 12,
}

impl BlockType {
    /// Whether the block occupies its voxel for collision and rendering.
    pub fn is_solid(self) -> bool {
        self != BlockType::Air
    }

    /// Whether the player may break the block.
    pub fn is_removable(self) -> bool {
        !matches!(self, BlockType::Air | BlockType::Bedrock)
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BlockType::Air => "air",
            BlockType::Grass => "grass",
            BlockType::Sand => "sand",
            BlockType::Tree => "tree",
            BlockType::Leaf => "leaf",
            BlockType::Dirt => "dirt",
            BlockType::Stone => "stone",
            BlockType::Coal => "coal",
            BlockType::Wood => "wood",
            BlockType::Diamond => "diamond",
            BlockType::Quartz => "quartz",
            BlockType::Glass => "glass",
            BlockType::Bedrock => "bedrock",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_air_is_passable() {
        assert!(!BlockType::Air.is_solid());
        assert!(BlockType::Leaf.is_solid());
        assert!(BlockType::Glass.is_solid());
    }

    #[test]
    fn bedrock_and_air_are_not_removable() {
        assert!(!BlockType::Bedrock.is_removable());
        assert!(!BlockType::Air.is_removable());
        assert!(BlockType::Glass.is_removable());
    }

    #[test]
    fn deserializes_lowercase_names() {
        let parsed: Vec<BlockType> = serde_json::from_str(r#"["grass", "quartz"]"#).unwrap();
        assert_eq!(parsed, vec![BlockType::Grass, BlockType::Quartz]);
    }
}
