//! # Parkour Path
//!
//! A floating trail of platforms hovering three blocks above the terrain, generated as a
//! seeded random walk that always makes progress along +X. The walk alternates between
//! runs in one of several directions; whenever the next platform would sit two or more
//! blocks above the previous one, the cells in between are filled so the climb stays
//! possible.
//!
//! The path is generated lazily: [`ParkourPath::extend_to`] grows it until it reaches a
//! given distance ahead of the player. Queries never generate.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::noise_field::NoiseField;

/// Height of platforms above the terrain surface.
pub const PLATFORM_CLEARANCE: i32 = 3;

/// Settings for the optional parkour trail.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParkourConfig {
    /// X coordinate of the first platform
    pub start_x: i32,
    /// Z coordinate of the first platform
    pub start_z: i32,
    /// Seed for gap and direction choices
    pub seed: u64,
    /// How far past the player along +X the trail is kept generated
    pub lookahead: i32,
}

impl Default for ParkourConfig {
    fn default() -> Self {
        Self {
            start_x: 0,
            start_z: 0,
            seed: 7,
            lookahead: 32,
        }
    }
}

/// Heading of one run of the random walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PathDirection {
    Forward,
    LeftSmall,
    LeftLarge,
    Left,
    RightSmall,
    RightLarge,
    Right,
}

impl PathDirection {
    const ALL: [PathDirection; 7] = [
        PathDirection::Forward,
        PathDirection::LeftSmall,
        PathDirection::LeftLarge,
        PathDirection::Left,
        PathDirection::RightSmall,
        PathDirection::RightLarge,
        PathDirection::Right,
    ];

    /// Displacement of one jump with the given gap.
    fn step(self, gap: i32) -> (i32, i32) {
        match self {
            PathDirection::Forward => (gap, 0),
            PathDirection::LeftSmall => (gap, -1),
            PathDirection::LeftLarge => (gap - 1, -2),
            PathDirection::Left => (1, -gap),
            PathDirection::RightSmall => (gap, 1),
            PathDirection::RightLarge => (gap - 1, 2),
            PathDirection::Right => (1, gap),
        }
    }
}

/// The generated trail, keyed by column.
#[derive(Debug, Clone)]
pub struct ParkourPath {
    cells: HashMap<(i32, i32), i32>,
    last: (i32, i32, i32),
    rng: fastrand::Rng,
    direction: PathDirection,
    run_left: u32,
    lookahead: i32,
}

impl ParkourPath {
    /// Starts a trail at the configured column and generates the initial lookahead.
    pub fn new(config: &ParkourConfig, field: &NoiseField) -> Self {
        let y = field.height_at(config.start_x, config.start_z) + PLATFORM_CLEARANCE;
        let mut cells = HashMap::new();
        cells.insert((config.start_x, config.start_z), y);

        let mut path = Self {
            cells,
            last: (config.start_x, y, config.start_z),
            rng: fastrand::Rng::with_seed(config.seed),
            direction: PathDirection::Forward,
            run_left: 0,
            lookahead: config.lookahead,
        };
        path.extend_to(config.start_x, field);
        path
    }

    /// Grows the trail until its head is past `x` plus the lookahead.
    pub fn extend_to(&mut self, x: i32, field: &NoiseField) {
        let target = x.saturating_add(self.lookahead);
        let before = self.cells.len();
        while self.last.0 <= target {
            self.step(field);
        }
        if self.cells.len() != before {
            log::trace!(
                "Parkour path extended to x = {} ({} cells)",
                self.last.0,
                self.cells.len()
            );
        }
    }

    fn step(&mut self, field: &NoiseField) {
        if self.run_left == 0 {
            self.direction = PathDirection::ALL[self.rng.usize(..PathDirection::ALL.len())];
            self.run_left = self.rng.u32(2..=5);
        }
        self.run_left -= 1;

        let gap = self.rng.i32(3..=4);
        let (dx, dz) = self.direction.step(gap);
        let (last_x, last_y, last_z) = self.last;
        let (next_x, next_z) = (last_x + dx, last_z + dz);
        let next_y = field.height_at(next_x, next_z) + PLATFORM_CLEARANCE;

        // Too high to jump: lay stepping cells along the way.
        if next_y - last_y >= 2 {
            let steps = dx.abs().max(dz.abs());
            for i in 1..steps {
                let x = last_x + dx * i / steps;
                let z = last_z + dz * i / steps;
                self.cells
                    .insert((x, z), field.height_at(x, z) + PLATFORM_CLEARANCE);
            }
        }

        self.cells.insert((next_x, next_z), next_y);
        self.last = (next_x, next_y, next_z);
    }

    /// The platform height in column `(x, z)`, if the trail passes through it.
    pub fn platform_at(&self, x: i32, z: i32) -> Option<i32> {
        self.cells.get(&(x, z)).copied()
    }

    /// Whether the column is on the trail or directly beside it.
    pub fn is_near(&self, x: i32, z: i32) -> bool {
        (-1..=1).any(|dx| (-1..=1).any(|dz| self.cells.contains_key(&(x + dx, z + dz))))
    }

    /// Number of platform cells generated so far.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Always false: the start cell is generated eagerly.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// The X coordinate of the most recently generated platform.
    pub fn head_x(&self) -> i32 {
        self.last.0
    }
}
