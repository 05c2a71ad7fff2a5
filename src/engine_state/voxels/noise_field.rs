//! # Noise Field
//!
//! Deterministic procedural fields for terrain synthesis. Every query is a pure function
//! of the coordinate and the immutable [`TerrainParameters`], so the collision probe can
//! recompute the world every tick and always see the same answer.
//!
//! ## Key Components
//! - [`RawNoise`]: the underlying gradient noise source (Perlin by default, stubbable)
//! - [`NoiseParameters`]: seed, coordinate scale, amplitude and threshold of one field
//! - [`TerrainParameters`]: the full set of fields plus the fixed terrain levels
//! - [`NoiseField`]: height and feature-density queries
//!
//! The world seed is not a permutation seed: it selects a slice of the noise volume by
//! being passed as the third coordinate. Feature fields derive their own slices from the
//! world seed so a single number reproduces an entire world.

use std::fmt;

use noise::{NoiseFn, Perlin};
use serde::{Deserialize, Serialize};

/// A source of continuous noise in roughly `[-1, 1]`.
pub trait RawNoise: fmt::Debug {
    /// Samples the noise volume at the given point.
    fn sample(&self, x: f64, y: f64, z: f64) -> f64;
}

/// Classic Perlin noise with a fixed permutation table.
#[derive(Debug, Clone, Copy)]
pub struct PerlinNoise {
    perlin: Perlin,
}

impl PerlinNoise {
    /// Creates the noise source. The permutation is fixed; worlds differ by seed slice.
    pub fn new() -> Self {
        Self {
            perlin: Perlin::new(0),
        }
    }
}

impl Default for PerlinNoise {
    fn default() -> Self {
        Self::new()
    }
}

impl RawNoise for PerlinNoise {
    fn sample(&self, x: f64, y: f64, z: f64) -> f64 {
        self.perlin.get([x, y, z])
    }
}

/// A noise source returning the same value everywhere.
///
/// Useful for previews of perfectly flat worlds and for pinning the height formula.
#[derive(Debug, Clone, Copy)]
pub struct ConstantNoise(pub f64);

impl RawNoise for ConstantNoise {
    fn sample(&self, _x: f64, _y: f64, _z: f64) -> f64 {
        self.0
    }
}

/// Parameters of a single scaled noise field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NoiseParameters {
    /// Slice of the noise volume, passed as the third coordinate
    pub seed: f64,
    /// Coordinate scale divisor; larger gaps give smoother fields
    pub gap: f64,
    /// Multiplier applied to the raw sample
    pub amplitude: f64,
    /// Scaled offsets strictly above this value count as "present"
    pub threshold: f64,
}

impl NoiseParameters {
    const fn new(seed: f64, gap: f64, amplitude: f64, threshold: f64) -> Self {
        Self {
            seed,
            gap,
            amplitude,
            threshold,
        }
    }
}

/// The density fields layered on top of the height map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureKind {
    /// Rocky surface patches
    Stone,
    /// Coal inside rocky patches
    Coal,
    /// Tree trunks
    Tree,
    /// Foliage around tree tops (sampled in 3D)
    Leaf,
}

/// Everything needed to synthesize terrain for one world session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainParameters {
    /// Height map
    pub height: NoiseParameters,
    /// Stone surface density
    pub stone: NoiseParameters,
    /// Coal density within stone patches
    pub coal: NoiseParameters,
    /// Tree density
    pub tree: NoiseParameters,
    /// 3D leaf density
    pub leaf: NoiseParameters,
    /// Surface height where the height noise is zero
    pub baseline: i32,
    /// Columns lower than this get sand and no trees
    pub sand_level: i32,
    /// The indestructible bottom layer
    pub bedrock_level: i32,
    /// Trunk length in voxels
    pub tree_height: i32,
    /// Horizontal reach of foliage from a trunk
    pub leaf_radius: i32,
}

/// Seed used until a new game draws a random one.
pub const DEFAULT_SEED: f64 = 0.5;

impl TerrainParameters {
    /// Standard rolling terrain for the given world seed.
    pub fn with_seed(seed: f64) -> Self {
        Self {
            height: NoiseParameters::new(seed, 22.0, 8.0, 0.0),
            stone: NoiseParameters::new(seed * 0.4, 12.0, 8.0, 3.5),
            coal: NoiseParameters::new(seed * 0.5, 3.0, 8.0, 3.0),
            tree: NoiseParameters::new(seed * 0.7, 2.0, 6.0, 4.0),
            leaf: NoiseParameters::new(seed * 0.8, 2.0, 5.0, -0.03),
            baseline: 30,
            sand_level: 27,
            bedrock_level: 0,
            tree_height: 10,
            leaf_radius: 2,
        }
    }

    /// A featureless grass plain at the given surface height.
    pub fn superflat(surface: i32) -> Self {
        let mut params = Self::with_seed(DEFAULT_SEED);
        params.baseline = surface;
        params.sand_level = surface.min(params.sand_level);
        for field in [
            &mut params.height,
            &mut params.stone,
            &mut params.coal,
            &mut params.tree,
            &mut params.leaf,
        ] {
            field.amplitude = 0.0;
        }
        params.leaf.threshold = 0.0;
        params
    }

    /// The same terrain shape with every field moved to slices derived from `seed`.
    pub fn reseeded(&self, seed: f64) -> Self {
        let mut params = self.clone();
        params.height.seed = seed;
        params.stone.seed = seed * 0.4;
        params.coal.seed = seed * 0.5;
        params.tree.seed = seed * 0.7;
        params.leaf.seed = seed * 0.8;
        params
    }

    /// The parameters of one feature field.
    pub fn feature(&self, kind: FeatureKind) -> &NoiseParameters {
        match kind {
            FeatureKind::Stone => &self.stone,
            FeatureKind::Coal => &self.coal,
            FeatureKind::Tree => &self.tree,
            FeatureKind::Leaf => &self.leaf,
        }
    }
}

impl Default for TerrainParameters {
    fn default() -> Self {
        Self::with_seed(DEFAULT_SEED)
    }
}

/// Height and density queries over an immutable parameter set.
#[derive(Debug)]
pub struct NoiseField {
    params: TerrainParameters,
    raw: Box<dyn RawNoise>,
}

impl NoiseField {
    /// Creates a Perlin-backed field.
    pub fn new(params: TerrainParameters) -> Self {
        Self::with_raw_noise(params, Box::new(PerlinNoise::new()))
    }

    /// Creates a field over an arbitrary noise source.
    pub fn with_raw_noise(params: TerrainParameters, raw: Box<dyn RawNoise>) -> Self {
        Self { params, raw }
    }

    /// The parameters this field was built from.
    pub fn parameters(&self) -> &TerrainParameters {
        &self.params
    }

    /// Moves every field to the slices derived from a new world seed.
    pub fn reseed(&mut self, seed: f64) {
        self.params = self.params.reseeded(seed);
    }

    /// Surface height of the column at `(x, z)`.
    ///
    /// `baseline + floor(raw(x / gap, z / gap, seed) * amplitude)`
    pub fn height_at(&self, x: i32, z: i32) -> i32 {
        let p = &self.params.height;
        let raw = self
            .raw
            .sample(x as f64 / p.gap, z as f64 / p.gap, p.seed);
        self.params.baseline + (raw * p.amplitude).floor() as i32
    }

    /// Scaled 2D density of a feature at column `(x, z)`.
    ///
    /// Leaves are a 3D field; this samples their `y = 0` slice.
    pub fn feature_offset(&self, kind: FeatureKind, x: i32, z: i32) -> f64 {
        let p = self.params.feature(kind);
        self.raw.sample(x as f64 / p.gap, z as f64 / p.gap, p.seed) * p.amplitude
    }

    /// Whether the feature's density at `(x, z)` exceeds its threshold.
    pub fn feature_present(&self, kind: FeatureKind, x: i32, z: i32) -> bool {
        self.feature_offset(kind, x, z) > self.params.feature(kind).threshold
    }

    /// Scaled 3D foliage density at a voxel.
    pub fn leaf_density(&self, x: i32, y: i32, z: i32) -> f64 {
        let p = &self.params.leaf;
        self.raw.sample(
            x as f64 / p.gap,
            y as f64 / p.gap,
            z as f64 / p.gap + p.seed,
        ) * p.amplitude
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn height_formula_with_stubbed_noise() {
        let mut params = TerrainParameters::with_seed(0.0);
        params.height.gap = 100.0;
        params.height.amplitude = 10.0;
        let field = NoiseField::with_raw_noise(params, Box::new(ConstantNoise(0.5)));
        assert_eq!(field.height_at(0, 0), 35);
    }

    #[test]
    fn negative_noise_floors_downwards() {
        let field =
            NoiseField::with_raw_noise(TerrainParameters::default(), Box::new(ConstantNoise(-0.3)));
        // -0.3 * 8 = -2.4 floors to -3
        assert_eq!(field.height_at(7, -4), 27);
    }

    #[test]
    fn perlin_field_is_deterministic_across_instances() {
        let a = NoiseField::new(TerrainParameters::with_seed(0.37));
        let b = NoiseField::new(TerrainParameters::with_seed(0.37));
        for x in -20..20 {
            for z in -20..20 {
                assert_eq!(a.height_at(x, z), b.height_at(x, z));
                assert_eq!(
                    a.feature_offset(FeatureKind::Tree, x, z),
                    b.feature_offset(FeatureKind::Tree, x, z)
                );
            }
        }
    }

    #[test]
    fn perlin_heights_stay_within_amplitude() {
        let field = NoiseField::new(TerrainParameters::with_seed(0.81));
        for x in -64..64 {
            let h = field.height_at(x, x * 3);
            assert!((30 - 9..=30 + 8).contains(&h), "height {h} out of range");
        }
    }

    #[test]
    fn superflat_has_no_features() {
        let field = NoiseField::new(TerrainParameters::superflat(12));
        assert_eq!(field.height_at(100, -40), 12);
        assert!(!field.feature_present(FeatureKind::Stone, 3, 3));
        assert!(!field.feature_present(FeatureKind::Tree, 3, 3));
    }

    #[test]
    fn reseeding_moves_every_slice() {
        let params = TerrainParameters::default().reseeded(2.0);
        assert_eq!(params.height.seed, 2.0);
        assert_eq!(params.tree.seed, 2.0 * 0.7);
        assert_eq!(params.leaf.seed, 2.0 * 0.8);
    }
}
