//! World access for navigation
//!
//! The pathfinder never owns terrain. It reads it through two traits:
//! - [`TerrainSampler`] answers what occupies a grid cell
//! - [`CollisionOracle`] answers whether a volume hits solid geometry
//!
//! [`VoxelWorld`] is an in-memory grid implementing both.

mod aabb;
mod block;
mod voxel;

pub use aabb::Aabb;
pub use block::Block;
pub use voxel::VoxelWorld;

use glam::{IVec3, Vec3};

use crate::ai::PathType;

/// Read-only view of terrain contents
///
/// Implementations must return the same answers for the duration of one search.
pub trait TerrainSampler {
    /// Classification of the cell on its own (air, water, door, fence, ...)
    fn raw_path_type(&self, pos: IVec3) -> PathType;

    /// Top of the cell's collision shape relative to the cell floor, `None` if empty
    fn collision_top(&self, pos: IVec3) -> Option<f32>;

    /// Cell is completely empty
    fn is_air(&self, pos: IVec3) -> bool;

    /// Cell counts as solid ground
    fn is_solid(&self, pos: IVec3) -> bool;

    /// Cell holds water
    fn is_water(&self, pos: IVec3) -> bool;

    /// Cell holds lava
    fn is_lava(&self, pos: IVec3) -> bool;

    /// Cell holds a rail
    fn is_rail(&self, pos: IVec3) -> bool;

    /// Agents standing here rest one unit higher than the cell (cauldron-like blocks)
    fn is_raised_surface(&self, pos: IVec3) -> bool;

    /// Lowest buildable y
    fn min_height(&self) -> i32;

    /// One above the highest buildable y
    fn max_height(&self) -> i32;

    /// Water surface height used by swimmers that prefer shallow water
    fn sea_level(&self) -> i32 {
        63
    }

    /// Height an agent standing in `pos` rests at
    fn floor_level(&self, pos: IVec3) -> f32 {
        let below = pos - IVec3::Y;
        below.y as f32 + self.collision_top(below).unwrap_or(0.0)
    }
}

/// Geometric queries against solid terrain
pub trait CollisionOracle {
    /// Whether the volume overlaps any solid geometry
    fn intersects(&self, volume: &Aabb) -> bool;

    /// Whether the cell contains a fluid (only consulted by ray queries)
    fn contains_fluid(&self, _pos: IVec3) -> bool {
        false
    }

    /// Whether a straight segment crosses no solid geometry
    fn line_is_clear(&self, from: Vec3, to: Vec3, include_fluids: bool) -> bool {
        const STEP: f32 = 0.1;
        const PROBE: f32 = 1.0e-3;

        let delta = to - from;
        let steps = (delta.length() / STEP).ceil().max(1.0) as u32;
        (0..=steps).all(|i| {
            let point = from + delta * (i as f32 / steps as f32);
            let probe = Aabb::new(point - Vec3::splat(PROBE), point + Vec3::splat(PROBE));
            !self.intersects(&probe)
                && !(include_fluids && self.contains_fluid(point.floor().as_ivec3()))
        })
    }
}

/// Everything a search needs from the host world
pub trait NavWorld: TerrainSampler + CollisionOracle {}

impl<T: TerrainSampler + CollisionOracle + ?Sized> NavWorld for T {}

/// Receives movement targets from a path follower
pub trait MovementActuator {
    /// Ask the agent to move towards `position` at `speed_modifier` times its base speed
    fn set_wanted_position(&mut self, position: Vec3, speed_modifier: f32);
}
