//! Block kinds for the reference voxel world

use serde::{Deserialize, Serialize};

use crate::ai::PathType;

/// Contents of one voxel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Block {
    /// Empty
    #[default]
    Air,
    /// Full solid cube
    Stone,
    /// Bottom half slab
    Slab,
    /// Water source
    Water,
    /// Lava source
    Lava,
    /// Fence post
    Fence,
    /// Stone wall
    Wall,
    /// Fence gate
    FenceGate {
        /// Whether the gate is open
        open: bool,
    },
    /// Door that can be opened by hand
    WoodDoor {
        /// Whether the door is open
        open: bool,
    },
    /// Door that needs a mechanism
    IronDoor {
        /// Whether the door is open
        open: bool,
    },
    /// Rail track
    Rail,
    /// Leaves
    Leaves,
    /// Cactus
    Cactus,
    /// Sweet berry bush
    BerryBush,
    /// Fire
    Fire,
    /// Magma block
    Magma,
    /// Honey block
    Honey,
    /// Powder snow
    PowderSnow,
    /// Trapdoor
    Trapdoor {
        /// Whether the trapdoor is open
        open: bool,
    },
    /// Lily pad floating on water
    LilyPad,
    /// Cocoa pod
    Cocoa,
    /// Wither rose
    WitherRose,
    /// Cauldron; entities stand on its rim
    Cauldron,
}

impl Block {
    /// Height of the collision shape's top inside the cell, `None` if it has no collision
    #[must_use]
    pub const fn collision_top(self) -> Option<f32> {
        match self {
            Self::Stone | Self::Magma | Self::Leaves | Self::Cauldron => Some(1.0),
            Self::Slab => Some(0.5),
            Self::Fence | Self::Wall => Some(1.5),
            Self::FenceGate { open: false } => Some(1.5),
            Self::WoodDoor { open: false } | Self::IronDoor { open: false } => Some(1.0),
            Self::Cactus | Self::Honey => Some(0.9375),
            Self::Trapdoor { open: false } => Some(0.1875),
            Self::LilyPad => Some(0.09375),
            _ => None,
        }
    }

    /// Whether the block counts as solid ground
    #[must_use]
    pub const fn is_solid(self) -> bool {
        matches!(
            self,
            Self::Stone
                | Self::Slab
                | Self::Magma
                | Self::Leaves
                | Self::Honey
                | Self::Cauldron
                | Self::Fence
                | Self::Wall
                | Self::Cactus
                | Self::WoodDoor { .. }
                | Self::IronDoor { .. }
                | Self::FenceGate { .. }
        )
    }

    /// Whether the cell holds a fluid
    #[must_use]
    pub const fn is_fluid(self) -> bool {
        matches!(self, Self::Water | Self::Lava)
    }

    /// Classification of the cell on its own, ignoring what lies around it
    #[must_use]
    pub const fn path_type(self) -> PathType {
        match self {
            Self::Air => PathType::Open,
            Self::Trapdoor { .. } | Self::LilyPad => PathType::Trapdoor,
            Self::PowderSnow => PathType::PowderSnow,
            Self::Cactus | Self::BerryBush => PathType::DamageOther,
            Self::Honey => PathType::StickyHoney,
            Self::Cocoa => PathType::Cocoa,
            Self::WitherRose => PathType::DamageCautious,
            Self::Lava => PathType::Lava,
            Self::Fire | Self::Magma => PathType::DamageFire,
            Self::WoodDoor { open: true } | Self::IronDoor { open: true } => PathType::DoorOpen,
            Self::WoodDoor { open: false } => PathType::DoorWoodClosed,
            Self::IronDoor { open: false } => PathType::DoorIronClosed,
            Self::Rail => PathType::Rail,
            Self::Leaves => PathType::Leaves,
            Self::Fence | Self::Wall | Self::FenceGate { open: false } => PathType::Fence,
            Self::FenceGate { open: true } => PathType::Open,
            Self::Water => PathType::Water,
            Self::Stone | Self::Slab | Self::Cauldron => PathType::Blocked,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_doors_classify_by_state() {
        assert_eq!(Block::WoodDoor { open: false }.path_type(), PathType::DoorWoodClosed);
        assert_eq!(Block::IronDoor { open: false }.path_type(), PathType::DoorIronClosed);
        assert_eq!(Block::WoodDoor { open: true }.path_type(), PathType::DoorOpen);
    }

    #[test]
    fn test_fence_is_tall() {
        assert_eq!(Block::Fence.collision_top(), Some(1.5));
        assert_eq!(Block::FenceGate { open: true }.collision_top(), None);
    }
}
