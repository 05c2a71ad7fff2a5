//! # World State Module
//!
//! Owns everything that defines the voxel world for one session and answers
//! "what occupies this voxel" for both rendering and collision.
//!
//! ## Key Components
//! - `WorldState`: the noise field, the edit log and the optional parkour trail
//! - `TerrainQuery`: a read-only view composing procedural terrain with edits
//!
//! ## Composition Rules
//! 1. Bedrock is authoritative: edits at a bedrock voxel are ignored, and a placed
//!    bedrock block cannot be removed again.
//! 2. An edit at a voxel replaces the procedural answer entirely.
//! 3. Otherwise the voxel is synthesized: stone below the surface, a surface block,
//!    parkour platforms, tree trunks and foliage above it.

use super::{
    block::block_type::BlockType,
    edit_log::{Edit, EditLog},
    noise_field::{FeatureKind, NoiseField, TerrainParameters},
    parkour::{ParkourConfig, ParkourPath},
    VoxelPosition,
};

/// Band of foliage above and below a tree top.
const LEAF_BAND: i32 = 2;

/// The voxel world of one game session.
///
/// Edits are written by block actions and read by every subsequent probe, so all
/// consumers borrow the same instance instead of sharing global state.
#[derive(Debug)]
pub struct WorldState {
    /// Procedural fields
    field: NoiseField,
    /// Player edits
    edits: EditLog,
    /// Trail settings, kept so a new game can rebuild it
    parkour_config: Option<ParkourConfig>,
    /// The trail itself
    parkour: Option<ParkourPath>,
}

impl WorldState {
    /// Creates a Perlin-backed world.
    ///
    /// # Arguments
    /// * `params` - Terrain parameters for the session
    /// * `parkour` - Settings of the parkour trail, `None` to disable it
    pub fn new(params: TerrainParameters, parkour: Option<ParkourConfig>) -> Self {
        Self::with_field(NoiseField::new(params), parkour)
    }

    /// Creates a world over an already built noise field.
    pub fn with_field(field: NoiseField, parkour_config: Option<ParkourConfig>) -> Self {
        let parkour = parkour_config
            .as_ref()
            .map(|config| ParkourPath::new(config, &field));
        Self {
            field,
            edits: EditLog::new(),
            parkour_config,
            parkour,
        }
    }

    /// A read-only view for block queries.
    pub fn query(&self) -> TerrainQuery<'_> {
        TerrainQuery::new(self)
    }

    /// The procedural fields.
    pub fn field(&self) -> &NoiseField {
        &self.field
    }

    /// The edit log.
    pub fn edits(&self) -> &EditLog {
        &self.edits
    }

    /// The parkour trail, if enabled.
    pub fn parkour(&self) -> Option<&ParkourPath> {
        self.parkour.as_ref()
    }

    /// Records a player edit.
    ///
    /// Removing a voxel that currently holds bedrock is ignored.
    ///
    /// # Returns
    /// The edit that was superseded, if any
    pub fn record_edit(
        &mut self,
        position: VoxelPosition,
        block_type: BlockType,
        placed: bool,
    ) -> Option<Edit> {
        if !placed && self.query().block_at(position) == BlockType::Bedrock {
            log::debug!("Ignored removal of bedrock at {:?}", position);
            return None;
        }
        self.edits.record_edit(position, block_type, placed)
    }

    /// Keeps the parkour trail generated ahead of the given X coordinate.
    pub fn extend_parkour(&mut self, x: f32) {
        if let Some(path) = self.parkour.as_mut() {
            path.extend_to(x.round() as i32, &self.field);
        }
    }

    /// Starts a fresh world: new seed slices, no edits, a rebuilt trail.
    pub fn reseed(&mut self, seed: f64) {
        self.field.reseed(seed);
        self.edits.clear();
        self.parkour = self
            .parkour_config
            .as_ref()
            .map(|config| ParkourPath::new(config, &self.field));
        log::info!("World reseeded with seed {seed:.6}");
    }
}

/// Read-only composition of procedural terrain and edits.
#[derive(Debug, Clone, Copy)]
pub struct TerrainQuery<'a> {
    field: &'a NoiseField,
    edits: &'a EditLog,
    parkour: Option<&'a ParkourPath>,
}

impl<'a> TerrainQuery<'a> {
    /// Borrows the parts of a world needed for queries.
    pub fn new(world: &'a WorldState) -> Self {
        Self {
            field: &world.field,
            edits: &world.edits,
            parkour: world.parkour.as_ref(),
        }
    }

    /// The block occupying a voxel after edits.
    pub fn block_at(&self, position: VoxelPosition) -> BlockType {
        let procedural = self.procedural_block_at(position);
        if procedural == BlockType::Bedrock {
            return procedural;
        }
        match self.edits.query(position) {
            Some(edit) => edit.resulting_block(),
            None => procedural,
        }
    }

    /// Whether a voxel is solid after edits.
    pub fn is_solid(&self, position: VoxelPosition) -> bool {
        self.block_at(position).is_solid()
    }

    /// Surface height of a column, ignoring edits.
    pub fn surface_height(&self, x: i32, z: i32) -> i32 {
        self.field.height_at(x, z)
    }

    /// The block the generator would put at a voxel, ignoring edits.
    pub fn procedural_block_at(&self, position: VoxelPosition) -> BlockType {
        let params = self.field.parameters();
        let (x, y, z) = (position.x, position.y, position.z);

        if y < params.bedrock_level {
            return BlockType::Air;
        }
        if y == params.bedrock_level {
            return BlockType::Bedrock;
        }

        let height = self.field.height_at(x, z);
        if y < height {
            return BlockType::Stone;
        }
        if y == height {
            return self.surface_type(x, z, height);
        }

        if let Some(path) = self.parkour {
            if path.platform_at(x, z) == Some(y) {
                return BlockType::Quartz;
            }
        }
        if self.tree_top(x, z, height).is_some_and(|top| y <= top) {
            return BlockType::Tree;
        }
        if self.leaf_at(x, y, z) {
            return BlockType::Leaf;
        }
        BlockType::Air
    }

    fn surface_type(&self, x: i32, z: i32, height: i32) -> BlockType {
        if self.field.feature_present(FeatureKind::Stone, x, z) {
            if self.field.feature_present(FeatureKind::Coal, x, z) {
                BlockType::Coal
            } else {
                BlockType::Stone
            }
        } else if height < self.field.parameters().sand_level {
            BlockType::Sand
        } else {
            BlockType::Grass
        }
    }

    /// Top voxel of the trunk rooted in column `(x, z)`, if a tree grows there.
    fn tree_top(&self, x: i32, z: i32, height: i32) -> Option<i32> {
        let params = self.field.parameters();
        if params.tree_height <= 0 || height < params.sand_level {
            return None;
        }
        if self.parkour.is_some_and(|path| path.is_near(x, z)) {
            return None;
        }
        let grows = self.field.feature_present(FeatureKind::Tree, x, z)
            && !self.field.feature_present(FeatureKind::Stone, x, z);
        grows.then_some(height + params.tree_height)
    }

    fn leaf_at(&self, x: i32, y: i32, z: i32) -> bool {
        let params = self.field.parameters();
        let highest_top = params.baseline
            + params.height.amplitude.abs().ceil() as i32
            + params.tree_height;
        if params.tree_height <= 0 || y > highest_top + LEAF_BAND {
            return false;
        }
        if self.parkour.is_some_and(|path| path.is_near(x, z)) {
            return false;
        }
        if self.field.leaf_density(x, y, z) <= params.leaf.threshold {
            return false;
        }

        let radius = params.leaf_radius;
        for tx in x - radius..=x + radius {
            for tz in z - radius..=z + radius {
                let height = self.field.height_at(tx, tz);
                let Some(top) = self.tree_top(tx, tz, height) else {
                    continue;
                };
                let own_trunk = tx == x && tz == z && y <= top;
                if (y - top).abs() <= LEAF_BAND && !own_trunk {
                    return true;
                }
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::noise_field::ConstantNoise;
    use cgmath::Point3;

    fn forest() -> WorldState {
        // Every column grows a tree: 0.9 * 6 = 5.4 beats the tree threshold.
        let mut params = TerrainParameters::default();
        params.stone.threshold = 100.0;
        let field = NoiseField::with_raw_noise(params, Box::new(ConstantNoise(0.9)));
        WorldState::with_field(field, None)
    }

    #[test]
    fn column_layers() {
        let world = WorldState::new(TerrainParameters::superflat(10), None);
        let query = world.query();
        assert_eq!(query.block_at(Point3::new(3, -1, 3)), BlockType::Air);
        assert_eq!(query.block_at(Point3::new(3, 0, 3)), BlockType::Bedrock);
        assert_eq!(query.block_at(Point3::new(3, 5, 3)), BlockType::Stone);
        assert_eq!(query.block_at(Point3::new(3, 10, 3)), BlockType::Grass);
        assert_eq!(query.block_at(Point3::new(3, 11, 3)), BlockType::Air);
    }

    #[test]
    fn edits_override_procedural_terrain() {
        let mut world = WorldState::new(TerrainParameters::superflat(10), None);
        world.record_edit(Point3::new(0, 10, 0), BlockType::Grass, false);
        world.record_edit(Point3::new(0, 11, 1), BlockType::Glass, true);
        let query = world.query();
        assert_eq!(query.block_at(Point3::new(0, 10, 0)), BlockType::Air);
        assert_eq!(query.block_at(Point3::new(0, 11, 1)), BlockType::Glass);
        assert_eq!(query.procedural_block_at(Point3::new(0, 10, 0)), BlockType::Grass);
    }

    #[test]
    fn bedrock_ignores_removal_edits() {
        let mut world = WorldState::new(TerrainParameters::with_seed(0.21), None);
        for x in -3..3 {
            world.record_edit(Point3::new(x, 0, x), BlockType::Bedrock, false);
        }
        let query = world.query();
        for x in -3..3 {
            assert_eq!(query.block_at(Point3::new(x, 0, x)), BlockType::Bedrock);
        }
    }

    #[test]
    fn placed_bedrock_cannot_be_removed() {
        let mut world = WorldState::new(TerrainParameters::superflat(10), None);
        let position = Point3::new(2, 14, -2);
        world.record_edit(position, BlockType::Bedrock, true);
        assert_eq!(world.record_edit(position, BlockType::Bedrock, false), None);
        assert_eq!(world.query().block_at(position), BlockType::Bedrock);
        assert!(world.edits().query(position).is_some_and(|edit| edit.placed));

        world.record_edit(Point3::new(2, 13, -2), BlockType::Stone, true);
        world.record_edit(Point3::new(2, 13, -2), BlockType::Stone, false);
        assert_eq!(world.query().block_at(Point3::new(2, 13, -2)), BlockType::Air);
    }

    #[test]
    fn trees_and_leaves() {
        let world = forest();
        let query = world.query();
        let surface = query.surface_height(0, 0);
        assert_eq!(surface, 37);
        assert_eq!(query.block_at(Point3::new(0, surface + 1, 0)), BlockType::Tree);
        assert_eq!(query.block_at(Point3::new(0, surface + 10, 0)), BlockType::Tree);
        assert_eq!(query.block_at(Point3::new(0, surface + 11, 0)), BlockType::Leaf);
        assert_eq!(query.block_at(Point3::new(0, surface + 13, 0)), BlockType::Air);
    }

    #[test]
    fn low_columns_are_sand_without_trees() {
        let mut params = TerrainParameters::default();
        params.stone.threshold = 100.0;
        let field = NoiseField::with_raw_noise(params, Box::new(ConstantNoise(-0.9)));
        let world = WorldState::with_field(field, None);
        let query = world.query();
        let surface = query.surface_height(5, 5);
        assert!(surface < 27);
        assert_eq!(query.block_at(Point3::new(5, surface, 5)), BlockType::Sand);
        assert_eq!(query.block_at(Point3::new(5, surface + 1, 5)), BlockType::Air);
    }

    #[test]
    fn parkour_platforms_carve_trees() {
        let mut params = TerrainParameters::default();
        params.stone.threshold = 100.0;
        let field = NoiseField::with_raw_noise(params, Box::new(ConstantNoise(0.9)));
        let world = WorldState::with_field(field, Some(ParkourConfig::default()));
        let query = world.query();
        assert_eq!(query.block_at(Point3::new(0, 40, 0)), BlockType::Quartz);
        assert_eq!(query.block_at(Point3::new(0, 41, 0)), BlockType::Air);
        assert_eq!(query.block_at(Point3::new(-1, 38, 1)), BlockType::Air);
    }

    #[test]
    fn identical_seeds_give_identical_worlds() {
        let a = WorldState::new(TerrainParameters::with_seed(0.77), None);
        let b = WorldState::new(TerrainParameters::with_seed(0.77), None);
        for x in -4..4 {
            for z in -4..4 {
                for y in 20..50 {
                    let position = Point3::new(x, y, z);
                    assert_eq!(a.query().block_at(position), b.query().block_at(position));
                }
            }
        }
    }

    #[test]
    fn reseed_clears_edits() {
        let mut world = WorldState::new(TerrainParameters::superflat(10), None);
        world.record_edit(Point3::new(0, 11, 0), BlockType::Wood, true);
        world.reseed(0.9);
        assert!(world.edits().is_empty());
        assert_eq!(world.field().parameters().height.seed, 0.9);
    }
}
