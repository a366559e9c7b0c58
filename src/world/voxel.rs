//! Dense in-memory voxel grid

use glam::IVec3;

use super::{Aabb, Block, CollisionOracle, TerrainSampler};
use crate::ai::PathType;

/// A bounded box of blocks; everything outside reads as air
#[derive(Debug, Clone)]
pub struct VoxelWorld {
    /// Minimum corner (inclusive)
    origin: IVec3,
    /// Extent in cells
    size: IVec3,
    /// Block storage, x fastest then z then y
    blocks: Vec<Block>,
    /// Water level for swimmers
    sea_level: i32,
}

impl VoxelWorld {
    /// Create an empty (all air) world
    #[must_use]
    pub fn new(origin: IVec3, size: IVec3) -> Self {
        let size = size.max(IVec3::ONE);
        Self {
            origin,
            size,
            blocks: vec![Block::Air; (size.x * size.y * size.z) as usize],
            sea_level: origin.y + size.y / 2,
        }
    }

    /// A `width` x `depth` plane of stone whose top surface is at y = 0
    ///
    /// The stone occupies y in -4..=-1; there are 16 cells of air above it.
    #[must_use]
    pub fn flat(width: i32, depth: i32) -> Self {
        let mut world = Self::new(IVec3::new(0, -4, 0), IVec3::new(width, 20, depth));
        world.fill(
            IVec3::new(0, -4, 0),
            IVec3::new(width - 1, -1, depth - 1),
            Block::Stone,
        );
        world
    }

    /// Set the sea level
    #[must_use]
    pub fn with_sea_level(mut self, sea_level: i32) -> Self {
        self.sea_level = sea_level;
        self
    }

    fn index(&self, pos: IVec3) -> Option<usize> {
        let local = pos - self.origin;
        if local.cmplt(IVec3::ZERO).any() || local.cmpge(self.size).any() {
            return None;
        }
        Some((local.y * self.size.z * self.size.x + local.z * self.size.x + local.x) as usize)
    }

    /// Block at a position
    #[must_use]
    pub fn block(&self, pos: IVec3) -> Block {
        self.index(pos).map_or(Block::Air, |i| self.blocks[i])
    }

    /// Set a block; positions outside the world are ignored
    pub fn set_block(&mut self, pos: IVec3, block: Block) {
        if let Some(i) = self.index(pos) {
            self.blocks[i] = block;
        }
    }

    /// Fill an inclusive box with one block
    pub fn fill(&mut self, a: IVec3, b: IVec3, block: Block) {
        let lo = a.min(b);
        let hi = a.max(b);
        for y in lo.y..=hi.y {
            for z in lo.z..=hi.z {
                for x in lo.x..=hi.x {
                    self.set_block(IVec3::new(x, y, z), block);
                }
            }
        }
    }

    /// Minimum corner
    #[must_use]
    pub fn origin(&self) -> IVec3 {
        self.origin
    }

    /// Extent in cells
    #[must_use]
    pub fn size(&self) -> IVec3 {
        self.size
    }
}

impl TerrainSampler for VoxelWorld {
    fn raw_path_type(&self, pos: IVec3) -> PathType {
        self.block(pos).path_type()
    }

    fn collision_top(&self, pos: IVec3) -> Option<f32> {
        self.block(pos).collision_top()
    }

    fn is_air(&self, pos: IVec3) -> bool {
        self.block(pos) == Block::Air
    }

    fn is_solid(&self, pos: IVec3) -> bool {
        self.block(pos).is_solid()
    }

    fn is_water(&self, pos: IVec3) -> bool {
        self.block(pos) == Block::Water
    }

    fn is_lava(&self, pos: IVec3) -> bool {
        self.block(pos) == Block::Lava
    }

    fn is_rail(&self, pos: IVec3) -> bool {
        self.block(pos) == Block::Rail
    }

    fn is_raised_surface(&self, pos: IVec3) -> bool {
        self.block(pos) == Block::Cauldron
    }

    fn min_height(&self) -> i32 {
        self.origin.y
    }

    fn max_height(&self) -> i32 {
        self.origin.y + self.size.y
    }

    fn sea_level(&self) -> i32 {
        self.sea_level
    }
}

impl CollisionOracle for VoxelWorld {
    fn intersects(&self, volume: &Aabb) -> bool {
        // Fences reach half a cell above their own cell, so look one cell lower too
        let (lo, hi) = volume.cell_range();
        for y in (lo.y - 1)..=hi.y {
            for z in lo.z..=hi.z {
                for x in lo.x..=hi.x {
                    let pos = IVec3::new(x, y, z);
                    let Some(top) = self.block(pos).collision_top() else {
                        continue;
                    };
                    let mut shape = Aabb::cell(pos);
                    shape.max.y = shape.min.y + top;
                    if shape.intersects(volume) {
                        return true;
                    }
                }
            }
        }
        false
    }

    fn contains_fluid(&self, pos: IVec3) -> bool {
        self.block(pos).is_fluid()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn test_flat_world_floor() {
        let world = VoxelWorld::flat(8, 8);
        assert!(world.is_solid(IVec3::new(3, -1, 3)));
        assert!(world.is_air(IVec3::new(3, 0, 3)));
        assert_eq!(world.floor_level(IVec3::new(3, 0, 3)), 0.0);
        assert_eq!(world.min_height(), -4);
    }

    #[test]
    fn test_outside_reads_as_air() {
        let world = VoxelWorld::flat(4, 4);
        assert_eq!(world.block(IVec3::new(-1, -1, 0)), Block::Air);
        assert_eq!(world.raw_path_type(IVec3::new(100, 0, 0)), PathType::Open);
    }

    #[test]
    fn test_slab_floor_level() {
        let mut world = VoxelWorld::flat(4, 4);
        world.set_block(IVec3::new(1, 0, 1), Block::Slab);
        assert_eq!(world.floor_level(IVec3::new(1, 1, 1)), 0.5);
    }

    #[test]
    fn test_box_collision() {
        let mut world = VoxelWorld::flat(4, 4);
        let standing = Aabb::from_feet(Vec3::new(1.5, 0.0, 1.5), 0.6, 1.8, 0.6);
        assert!(!world.intersects(&standing));

        world.set_block(IVec3::new(1, 1, 1), Block::Stone);
        assert!(world.intersects(&standing));
    }

    #[test]
    fn test_fence_collides_above_its_cell() {
        let mut world = VoxelWorld::flat(4, 4);
        world.set_block(IVec3::new(1, 0, 1), Block::Fence);
        let above = Aabb::new(Vec3::new(1.2, 1.1, 1.2), Vec3::new(1.8, 1.4, 1.8));
        assert!(world.intersects(&above));
    }

    #[test]
    fn test_line_of_sight() {
        let mut world = VoxelWorld::flat(8, 8);
        let from = Vec3::new(0.5, 0.5, 0.5);
        let to = Vec3::new(6.5, 0.5, 0.5);
        assert!(world.line_is_clear(from, to, false));

        world.set_block(IVec3::new(3, 0, 0), Block::Stone);
        assert!(!world.line_is_clear(from, to, false));
    }
}
