//! Voxel-grid pathfinding and path following
//!
//! This crate provides:
//! - Terrain classification of grid cells for agents of any footprint
//! - Weighted multi-target A* search with partial-path fallback
//! - Tick-driven path following with stuck and timeout detection
//! - Entity Component System (ECS) integration with hecs

pub mod agent;
pub mod ai;
pub mod core;
pub mod ecs;
pub mod world;

// Re-exports for convenience
pub use glam;
pub use hecs;

/// Prelude module for common imports
pub mod prelude {
    pub use crate::agent::{Agent, AgentDescriptor, AgentState};
    pub use crate::ai::{
        FollowStrategy, MoveControl, Path, PathFinder, PathNavigation, PathNode, PathType,
    };
    pub use crate::core::{NavEvent, NavigationConfig, SearchStats};
    pub use crate::ecs::{AgentWorld, Name, NavLog};
    pub use crate::world::{
        Aabb, Block, CollisionOracle, MovementActuator, NavWorld, TerrainSampler, VoxelWorld,
    };
    pub use glam::{IVec3, Vec3};
}
