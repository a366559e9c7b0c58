//! Terrain classification for pathfinding
//!
//! Every grid cell is reduced to a [`PathType`]; agents attach a cost
//! ("malus") to each type. A negative malus means the agent cannot enter.

use serde::{Deserialize, Serialize};

/// Terrain classification of a single cell, as seen by a walking agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PathType {
    /// Solid, cannot be entered
    Blocked,
    /// Empty space with nothing to stand on
    Open,
    /// Empty space above a floor
    Walkable,
    /// A closed door the agent is able to open
    WalkableDoor,
    /// Trapdoors, lily pads and similar thin platforms
    Trapdoor,
    /// Powder snow the agent would sink into
    PowderSnow,
    /// Standing on top of powder snow
    DangerPowderSnow,
    /// Fences, walls and closed gates
    Fence,
    /// Lava
    Lava,
    /// Water
    Water,
    /// Walkable cell next to water
    WaterBorder,
    /// Rail the agent may use
    Rail,
    /// Rail the agent is not riding on
    UnpassableRail,
    /// Walkable cell next to something burning
    DangerFire,
    /// Burning block
    DamageFire,
    /// Walkable cell next to a damaging block
    DangerOther,
    /// Damaging block (cactus, berry bush)
    DamageOther,
    /// An open door
    DoorOpen,
    /// A closed wooden door
    DoorWoodClosed,
    /// A closed iron door
    DoorIronClosed,
    /// Breachable obstacle
    Breach,
    /// Leaves
    Leaves,
    /// Honey block
    StickyHoney,
    /// Cocoa pod
    Cocoa,
    /// Wither roses, pointed dripstone
    DamageCautious,
}

impl PathType {
    /// Every type in declaration order
    pub const ALL: [PathType; 25] = [
        Self::Blocked,
        Self::Open,
        Self::Walkable,
        Self::WalkableDoor,
        Self::Trapdoor,
        Self::PowderSnow,
        Self::DangerPowderSnow,
        Self::Fence,
        Self::Lava,
        Self::Water,
        Self::WaterBorder,
        Self::Rail,
        Self::UnpassableRail,
        Self::DangerFire,
        Self::DamageFire,
        Self::DangerOther,
        Self::DamageOther,
        Self::DoorOpen,
        Self::DoorWoodClosed,
        Self::DoorIronClosed,
        Self::Breach,
        Self::Leaves,
        Self::StickyHoney,
        Self::Cocoa,
        Self::DamageCautious,
    ];

    /// Default cost penalty for entering this kind of cell
    #[must_use]
    pub const fn default_malus(self) -> f32 {
        match self {
            Self::Blocked
            | Self::PowderSnow
            | Self::Fence
            | Self::Lava
            | Self::UnpassableRail
            | Self::DamageOther
            | Self::DoorWoodClosed
            | Self::DoorIronClosed
            | Self::Leaves => -1.0,
            Self::Water
            | Self::WaterBorder
            | Self::DangerFire
            | Self::DangerOther
            | Self::StickyHoney => 8.0,
            Self::DamageFire => 16.0,
            Self::Breach => 4.0,
            Self::Open
            | Self::Walkable
            | Self::WalkableDoor
            | Self::Trapdoor
            | Self::DangerPowderSnow
            | Self::Rail
            | Self::DoorOpen
            | Self::Cocoa
            | Self::DamageCautious => 0.0,
        }
    }

    /// Cells whose collision shape only partly fills the cell
    #[must_use]
    pub const fn has_partial_collision(self) -> bool {
        matches!(
            self,
            Self::Fence | Self::DoorWoodClosed | Self::DoorIronClosed
        )
    }

    /// Whether a follower may skip a waypoint of this type when cutting a corner
    #[must_use]
    pub const fn allows_corner_cut(self) -> bool {
        !matches!(
            self,
            Self::DangerFire | Self::DangerOther | Self::WalkableDoor
        )
    }

    const fn bit(self) -> u32 {
        1 << (self as u32)
    }
}

/// Compact set of path types, iterated in declaration order
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PathTypeSet(u32);

impl PathTypeSet {
    /// Empty set
    #[must_use]
    pub const fn new() -> Self {
        Self(0)
    }

    /// Add a type
    pub fn insert(&mut self, path_type: PathType) {
        self.0 |= path_type.bit();
    }

    /// Membership test
    #[must_use]
    pub const fn contains(&self, path_type: PathType) -> bool {
        self.0 & path_type.bit() != 0
    }

    /// Check if the set is empty
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Iterate members in declaration order
    pub fn iter(&self) -> impl Iterator<Item = PathType> + use<> {
        let set = *self;
        PathType::ALL.into_iter().filter(move |t| set.contains(*t))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_matches_discriminants() {
        for (i, t) in PathType::ALL.iter().enumerate() {
            assert_eq!(*t as usize, i);
        }
    }

    #[test]
    fn test_default_malus() {
        assert!(PathType::Blocked.default_malus() < 0.0);
        assert_eq!(PathType::Walkable.default_malus(), 0.0);
        assert_eq!(PathType::Water.default_malus(), 8.0);
        assert_eq!(PathType::DamageFire.default_malus(), 16.0);
    }

    #[test]
    fn test_set_iterates_in_order() {
        let mut set = PathTypeSet::new();
        set.insert(PathType::Water);
        set.insert(PathType::Open);
        set.insert(PathType::Water);
        let members: Vec<_> = set.iter().collect();
        assert_eq!(members, vec![PathType::Open, PathType::Water]);
        assert!(!set.contains(PathType::Fence));
    }
}
