//! Agents that navigate the grid
//!
//! An [`Agent`] pairs a static [`AgentDescriptor`] (size, movement limits,
//! capabilities, terrain preferences) with its per-tick [`AgentState`].

use std::path::Path;

use glam::{IVec3, Vec3};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::ai::PathType;
use crate::core::ConfigError;
use crate::core::config;
use crate::world::Aabb;

/// Physical footprint and movement capabilities of an agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentDescriptor {
    /// Footprint along x
    pub width: f32,
    /// Footprint along y
    pub height: f32,
    /// Footprint along z
    pub depth: f32,
    /// Highest ledge the agent can step onto without jumping
    pub max_up_step: f32,
    /// Deepest drop the agent accepts
    pub max_fall_distance: i32,
    /// Base movement speed in blocks per tick
    pub movement_speed: f32,
    /// Search radius
    pub follow_range: f32,
    /// Can swim upward / stay on the water surface
    pub can_float: bool,
    /// Can open wooden doors
    pub can_open_doors: bool,
    /// Can walk through open doors
    pub can_pass_doors: bool,
    /// Can climb over fences
    pub can_walk_over_fences: bool,
    /// Per-type cost overrides
    pub malus_overrides: FxHashMap<PathType, f32>,
}

impl Default for AgentDescriptor {
    fn default() -> Self {
        Self {
            width: 0.6,
            height: 1.95,
            depth: 0.6,
            max_up_step: 0.6,
            max_fall_distance: 3,
            movement_speed: 0.25,
            follow_range: 16.0,
            can_float: false,
            can_open_doors: false,
            can_pass_doors: true,
            can_walk_over_fences: false,
            malus_overrides: FxHashMap::default(),
        }
    }
}

impl AgentDescriptor {
    /// Set the footprint
    #[must_use]
    pub fn with_size(mut self, width: f32, height: f32, depth: f32) -> Self {
        self.width = width;
        self.height = height;
        self.depth = depth;
        self
    }

    /// Set the base speed
    #[must_use]
    pub fn with_movement_speed(mut self, speed: f32) -> Self {
        self.movement_speed = speed;
        self
    }

    /// Set the follow range
    #[must_use]
    pub fn with_follow_range(mut self, range: f32) -> Self {
        self.follow_range = range;
        self
    }

    /// Set the floating capability
    #[must_use]
    pub fn with_can_float(mut self, can_float: bool) -> Self {
        self.can_float = can_float;
        self
    }

    /// Set door capabilities
    #[must_use]
    pub fn with_doors(mut self, can_open: bool, can_pass: bool) -> Self {
        self.can_open_doors = can_open;
        self.can_pass_doors = can_pass;
        self
    }

    /// Set fence climbing
    #[must_use]
    pub fn with_can_walk_over_fences(mut self, can_walk: bool) -> Self {
        self.can_walk_over_fences = can_walk;
        self
    }

    /// Override the cost of one path type
    #[must_use]
    pub fn with_malus(mut self, path_type: PathType, malus: f32) -> Self {
        self.malus_overrides.insert(path_type, malus);
        self
    }

    /// Cost of entering a cell of this type; negative means impassable
    #[must_use]
    pub fn malus(&self, path_type: PathType) -> f32 {
        self.malus_overrides
            .get(&path_type)
            .copied()
            .unwrap_or_else(|| path_type.default_malus())
    }

    /// Load a descriptor from a RON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or deserialization fails
    pub fn load_ron(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        config::load_ron(path)
    }

    /// Save the descriptor to a RON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or serialization fails
    pub fn save_ron(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        config::save_ron(self, path)
    }

    /// Load a descriptor from a JSON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or deserialization fails
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        config::load_json(path)
    }
}

/// Per-tick physical state of an agent
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AgentState {
    /// Feet position (center of the footprint, bottom face)
    pub position: Vec3,
    /// Standing on solid ground
    pub on_ground: bool,
    /// Touching water
    pub in_water: bool,
    /// Touching lava
    pub in_lava: bool,
    /// Riding another entity
    pub passenger: bool,
    /// Sprinting
    pub sprinting: bool,
    /// Current movement speed in blocks per tick
    pub speed: f32,
}

/// An agent: what it is plus where it is
#[derive(Debug, Clone, PartialEq)]
pub struct Agent {
    /// Static description
    pub descriptor: AgentDescriptor,
    /// Dynamic state
    pub state: AgentState,
}

impl Agent {
    /// Create a grounded agent standing at `position`
    #[must_use]
    pub fn new(descriptor: AgentDescriptor, position: Vec3) -> Self {
        let speed = descriptor.movement_speed;
        Self {
            descriptor,
            state: AgentState {
                position,
                on_ground: true,
                speed,
                ..Default::default()
            },
        }
    }

    /// Feet position
    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.state.position
    }

    /// Cell containing the feet
    #[must_use]
    pub fn block_position(&self) -> IVec3 {
        self.state.position.floor().as_ivec3()
    }

    /// Current bounding box
    #[must_use]
    pub fn bounding_box(&self) -> Aabb {
        Aabb::from_feet(
            self.state.position,
            self.descriptor.width,
            self.descriptor.height,
            self.descriptor.depth,
        )
    }

    /// Touching water or lava
    #[must_use]
    pub fn is_in_liquid(&self) -> bool {
        self.state.in_water || self.state.in_lava
    }

    /// Cost of entering a cell of this type
    #[must_use]
    pub fn malus(&self, path_type: PathType) -> f32 {
        self.descriptor.malus(path_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malus_override() {
        let descriptor = AgentDescriptor::default().with_malus(PathType::Water, -1.0);
        assert_eq!(descriptor.malus(PathType::Water), -1.0);
        assert_eq!(descriptor.malus(PathType::DamageFire), 16.0);
    }

    #[test]
    fn test_agent_box_and_cell() {
        let agent = Agent::new(AgentDescriptor::default(), Vec3::new(2.5, 0.0, -0.5));
        assert_eq!(agent.block_position(), IVec3::new(2, 0, -1));
        let bb = agent.bounding_box();
        assert!((bb.x_size() - 0.6).abs() < 1e-6);
        assert!(agent.state.on_ground);
        assert_eq!(agent.state.speed, 0.25);
    }

    #[test]
    fn test_descriptor_ron_round_trip() {
        let descriptor = AgentDescriptor::default()
            .with_doors(true, true)
            .with_malus(PathType::Leaves, 2.0);
        let ron_str =
            ron::ser::to_string_pretty(&descriptor, ron::ser::PrettyConfig::default()).unwrap();
        assert!(ron_str.contains("Leaves"));

        let loaded: AgentDescriptor = ron::from_str(&ron_str).unwrap();
        assert_eq!(loaded, descriptor);
    }

    #[test]
    fn test_descriptor_json_file() {
        let path = std::env::temp_dir().join("voxel_nav_agent_test.json");
        let descriptor = AgentDescriptor::default().with_can_float(true);
        config::save_json(&descriptor, &path).unwrap();

        let loaded = AgentDescriptor::load_json(&path).unwrap();
        assert!(loaded.can_float);
        let _ = std::fs::remove_file(&path);
    }
}
