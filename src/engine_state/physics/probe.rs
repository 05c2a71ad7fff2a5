//! # Collision Probe
//!
//! Per-tick contact detection for the player body.
//!
//! ## Algorithm
//! 1. Gather candidates: every solid voxel of the 3×3 columns around the player's
//!    rounded position, within a vertical window around the eye that is stretched
//!    downwards to cover the current ground reach. Voxels come straight from
//!    [`TerrainQuery`], so edits, removals and bedrock are already applied and the
//!    candidate set is exactly what the world renders.
//! 2. Cast four parallel rays per face of the body against the candidates:
//!    - down: the four footprint corners at eye height, `down_reach` long
//!    - up: the four footprint corners one unit below the eye, `up_reach` long
//!    - front/back (±X): at `z ± width/2`, at the eye and one unit below, `width/2` long
//!    - left/right (∓Z): at `x ± width/2`, at the eye and one unit below, `width/2` long
//! 3. While sneaking on the ground, footprint corners whose down ray missed get ledge
//!    guards: invisible unit cubes just past the edge, at body height, that stop the
//!    horizontal rays before the player walks off.
//!
//! A face's contact flag is set when any of its four rays hits. The candidate buffer is
//! reused between ticks but rebuilt from scratch every time.

use cgmath::Point3;

use super::{
    aabb::{Aabb, Ray},
    player::{MovementConfig, PlayerBody},
};
use crate::engine_state::voxels::{block::block_side::BlockSide, voxel_at, world::TerrainQuery};

/// Candidate voxels are searched this far above and below the eye.
const VERTICAL_WINDOW: i32 = 3;
/// Cap on the extra depth searched for a long ground reach.
const MAX_EXTRA_DEPTH: i32 = 8;

/// Sign of each footprint corner on (X, Z), in ray order.
const CORNERS: [(f32, f32); 4] = [(-1.0, -1.0), (1.0, -1.0), (-1.0, 1.0), (1.0, 1.0)];
/// Corner pairs sharing an edge of the footprint.
const EDGES: [(usize, usize); 4] = [(0, 1), (1, 3), (2, 3), (2, 0)];

/// Six per-face contact flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContactFlags {
    /// Blocked towards +X
    pub front: bool,
    /// Blocked towards -X
    pub back: bool,
    /// Blocked towards -Z
    pub left: bool,
    /// Blocked towards +Z
    pub right: bool,
    /// Head against a ceiling
    pub up: bool,
    /// Standing on something
    pub down: bool,
}

impl ContactFlags {
    /// The flag of one face.
    pub fn get(&self, side: BlockSide) -> bool {
        match side {
            BlockSide::Front => self.front,
            BlockSide::Back => self.back,
            BlockSide::Left => self.left,
            BlockSide::Right => self.right,
            BlockSide::Up => self.up,
            BlockSide::Down => self.down,
        }
    }

    /// Sets the flag of one face.
    pub fn set(&mut self, side: BlockSide, value: bool) {
        let flag = match side {
            BlockSide::Front => &mut self.front,
            BlockSide::Back => &mut self.back,
            BlockSide::Left => &mut self.left,
            BlockSide::Right => &mut self.right,
            BlockSide::Up => &mut self.up,
            BlockSide::Down => &mut self.down,
        };
        *flag = value;
    }

    /// Whether any side face is blocked.
    pub fn any_horizontal(&self) -> bool {
        self.front || self.back || self.left || self.right
    }
}

/// Outcome of one probe.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ProbeResult {
    /// Per-face contact
    pub contacts: ContactFlags,
    /// Shortest distance from the eye to the ground among the down rays
    pub down_distance: Option<f32>,
    /// Number of ledge guards added this tick
    pub ledge_guards: usize,
}

/// Casts the body's rays against the voxels around it.
#[derive(Debug, Clone)]
pub struct CollisionProbe {
    body: PlayerBody,
    up_reach: f32,
    ledge_inset: f32,
    candidates: Vec<Aabb>,
}

impl CollisionProbe {
    /// Creates a probe for a body.
    ///
    /// # Arguments
    /// * `body` - Player dimensions
    /// * `up_reach` - Length of the ceiling rays
    /// * `ledge_inset` - How far ledge guards are pulled back from a full body width
    pub fn new(body: PlayerBody, up_reach: f32, ledge_inset: f32) -> Self {
        Self {
            body,
            up_reach,
            ledge_inset,
            candidates: Vec::with_capacity(96),
        }
    }

    /// Creates a probe from the movement tunables.
    pub fn from_config(config: &MovementConfig) -> Self {
        Self::new(config.body, config.up_reach, config.ledge_inset)
    }

    /// Length of the side rays, measured from the body's centre line.
    ///
    /// A body moving further than this in one step can end up with its rays starting
    /// inside a wall, where they no longer see it.
    pub fn side_reach(&self) -> f32 {
        self.body.width / 2.0
    }

    /// The candidate boxes of the most recent probe, ledge guards included.
    pub fn candidates(&self) -> &[Aabb] {
        &self.candidates
    }

    /// Detects contacts around the eye position.
    ///
    /// # Arguments
    /// * `terrain` - Current world view
    /// * `position` - Eye position
    /// * `down_reach` - Length of the ground rays; zero or less disables ground contact
    /// * `ledge_guard` - Whether to add ledge guards for missed ground rays
    pub fn probe(
        &mut self,
        terrain: &TerrainQuery<'_>,
        position: Point3<f32>,
        down_reach: f32,
        ledge_guard: bool,
    ) -> ProbeResult {
        self.gather(terrain, position, down_reach);

        let mut contacts = ContactFlags::default();
        let mut down_distance: Option<f32> = None;
        let mut missed = [false; 4];

        let down = BlockSide::Down.normal();
        for (index, origin) in self.footprint(position, position.y).into_iter().enumerate() {
            match Ray::new(origin, down).cast_nearest(&self.candidates, down_reach) {
                Some(distance) => {
                    contacts.down = true;
                    down_distance = Some(down_distance.map_or(distance, |d| d.min(distance)));
                }
                None => missed[index] = true,
            }
        }

        let up = BlockSide::Up.normal();
        contacts.up = self
            .footprint(position, position.y - 1.0)
            .into_iter()
            .any(|origin| {
                Ray::new(origin, up)
                    .cast_nearest(&self.candidates, self.up_reach)
                    .is_some()
            });

        let ledge_guards = if ledge_guard {
            self.add_ledge_guards(position, &missed)
        } else {
            0
        };

        let side_reach = self.side_reach();
        for side in BlockSide::horizontal() {
            let direction = side.normal();
            let hit = self.side_origins(side, position).into_iter().any(|origin| {
                Ray::new(origin, direction)
                    .cast_nearest(&self.candidates, side_reach)
                    .is_some()
            });
            contacts.set(side, hit);
        }

        log::trace!(
            "Probe at ({:.2}, {:.2}, {:.2}): {:?}, {} candidates",
            position.x,
            position.y,
            position.z,
            contacts,
            self.candidates.len()
        );

        ProbeResult {
            contacts,
            down_distance,
            ledge_guards,
        }
    }

    /// Whether any footprint corner at `position` stands on ground within `reach`.
    ///
    /// Rebuilds the candidate set around `position` without ledge guards.
    pub fn has_footing(
        &mut self,
        terrain: &TerrainQuery<'_>,
        position: Point3<f32>,
        reach: f32,
    ) -> bool {
        self.gather(terrain, position, reach);
        let down = BlockSide::Down.normal();
        self.footprint(position, position.y)
            .into_iter()
            .any(|origin| {
                Ray::new(origin, down)
                    .cast_nearest(&self.candidates, reach)
                    .is_some()
            })
    }

    fn gather(&mut self, terrain: &TerrainQuery<'_>, position: Point3<f32>, down_reach: f32) {
        self.candidates.clear();

        let center = voxel_at(position);
        let reach_floor = (position.y - down_reach.max(self.body.height)).floor() as i32 - 1;
        let lowest = reach_floor.clamp(
            center.y - VERTICAL_WINDOW - MAX_EXTRA_DEPTH,
            center.y - VERTICAL_WINDOW,
        );
        let highest = center.y + VERTICAL_WINDOW;

        for dx in -1..=1 {
            for dz in -1..=1 {
                for y in lowest..=highest {
                    let voxel = Point3::new(center.x + dx, y, center.z + dz);
                    if terrain.is_solid(voxel) {
                        self.candidates.push(Aabb::voxel(voxel));
                    }
                }
            }
        }
    }

    /// The four footprint corners at height `y`, in [`CORNERS`] order.
    fn footprint(&self, position: Point3<f32>, y: f32) -> [Point3<f32>; 4] {
        let half = self.body.width / 2.0;
        CORNERS.map(|(sx, sz)| Point3::new(position.x + sx * half, y, position.z + sz * half))
    }

    fn side_origins(&self, side: BlockSide, position: Point3<f32>) -> [Point3<f32>; 4] {
        let half = self.body.width / 2.0;
        let Point3 { x, y, z } = position;
        match side {
            BlockSide::Front | BlockSide::Back => [
                Point3::new(x, y, z - half),
                Point3::new(x, y, z + half),
                Point3::new(x, y - 1.0, z - half),
                Point3::new(x, y - 1.0, z + half),
            ],
            _ => [
                Point3::new(x - half, y, z),
                Point3::new(x + half, y, z),
                Point3::new(x - half, y - 1.0, z),
                Point3::new(x + half, y - 1.0, z),
            ],
        }
    }

    /// Adds guards past the corners and edges of the footprint that hang over a drop.
    ///
    /// Guards only appear while the player still has partial footing: one or two missed
    /// corners. With three or four misses there is no ledge to hold on to.
    fn add_ledge_guards(&mut self, position: Point3<f32>, missed: &[bool; 4]) -> usize {
        let misses = missed.iter().filter(|miss| **miss).count();
        if !(1..=2).contains(&misses) {
            return 0;
        }

        let offset = self.body.width - self.ledge_inset;
        let y = position.y.floor();
        let corners = self.footprint(position, y);
        let before = self.candidates.len();

        for (index, corner) in corners.iter().enumerate() {
            if !missed[index] {
                continue;
            }
            let (sx, sz) = CORNERS[index];
            self.candidates.push(Aabb::unit_cube(Point3::new(
                corner.x.round() + sx * offset,
                y,
                corner.z.round() + sz * offset,
            )));
        }

        for (a, b) in EDGES {
            if !(missed[a] && missed[b]) {
                continue;
            }
            let ((ax, az), (bx, bz)) = (CORNERS[a], CORNERS[b]);
            // The sign both corners share is the outward side of the edge.
            let out_x = if ax == bx { ax * offset } else { 0.0 };
            let out_z = if az == bz { az * offset } else { 0.0 };
            let mid_x = ((corners[a].x + corners[b].x) / 2.0).round();
            let mid_z = ((corners[a].z + corners[b].z) / 2.0).round();
            self.candidates
                .push(Aabb::unit_cube(Point3::new(mid_x + out_x, y, mid_z + out_z)));
        }

        let added = self.candidates.len() - before;
        log::trace!("Added {added} ledge guards for {misses} missed corners");
        added
    }
}
