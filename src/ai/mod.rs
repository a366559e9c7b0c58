//! AI and navigation module
//!
//! Provides voxel pathfinding and tick-driven path following.

pub mod navigation;
pub mod pathfinding;

pub use navigation::{FollowStrategy, MoveControl, PathNavigation};
pub use pathfinding::{
    Evaluator, EvaluatorFlags, NodeEvaluator, Path, PathFinder, PathId, PathNode, PathType,
    PathTypeSet,
};
