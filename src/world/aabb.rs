//! Axis-aligned bounding boxes
//!
//! Volumes used for agent footprints and collision queries.

use glam::{IVec3, Vec3};

/// An axis-aligned box in world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner
    pub min: Vec3,
    /// Maximum corner
    pub max: Vec3,
}

impl Aabb {
    /// Create a box from two corners (in any order)
    #[must_use]
    pub fn new(a: Vec3, b: Vec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Box standing on `feet`, centered on x/z
    #[must_use]
    pub fn from_feet(feet: Vec3, width: f32, height: f32, depth: f32) -> Self {
        let half_w = width * 0.5;
        let half_d = depth * 0.5;
        Self {
            min: Vec3::new(feet.x - half_w, feet.y, feet.z - half_d),
            max: Vec3::new(feet.x + half_w, feet.y + height, feet.z + half_d),
        }
    }

    /// The unit cube occupying a grid cell
    #[must_use]
    pub fn cell(pos: IVec3) -> Self {
        let min = pos.as_vec3();
        Self {
            min,
            max: min + Vec3::ONE,
        }
    }

    /// Extent along x
    #[must_use]
    pub fn x_size(&self) -> f32 {
        self.max.x - self.min.x
    }

    /// Extent along y
    #[must_use]
    pub fn y_size(&self) -> f32 {
        self.max.y - self.min.y
    }

    /// Extent along z
    #[must_use]
    pub fn z_size(&self) -> f32 {
        self.max.z - self.min.z
    }

    /// Mean edge length
    #[must_use]
    pub fn size(&self) -> f32 {
        (self.x_size() + self.y_size() + self.z_size()) / 3.0
    }

    /// Center point
    #[must_use]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Translate the box
    #[must_use]
    pub fn translate(&self, offset: Vec3) -> Self {
        Self {
            min: self.min + offset,
            max: self.max + offset,
        }
    }

    /// Grow (or shrink, with negative values) on every side
    #[must_use]
    pub fn inflate(&self, amount: f32) -> Self {
        Self {
            min: self.min - Vec3::splat(amount),
            max: self.max + Vec3::splat(amount),
        }
    }

    /// Overlap test; touching faces do not count
    #[must_use]
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
            && self.min.z < other.max.z
            && self.max.z > other.min.z
    }

    /// Grid cells touched by this box (inclusive range)
    #[must_use]
    pub fn cell_range(&self) -> (IVec3, IVec3) {
        let lo = self.min.floor().as_ivec3();
        // A box ending exactly on a cell boundary does not reach into the next cell
        let hi = (self.max - Vec3::splat(1.0e-4)).floor().as_ivec3();
        (lo, hi.max(lo))
    }

    /// Bit-exact key usable in hash maps
    #[must_use]
    pub fn cache_key(&self) -> [u32; 6] {
        [
            self.min.x.to_bits(),
            self.min.y.to_bits(),
            self.min.z.to_bits(),
            self.max.x.to_bits(),
            self.max.y.to_bits(),
            self.max.z.to_bits(),
        ]
    }
}
