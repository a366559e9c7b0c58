//! Multi-target A* pathfinding on a voxel grid
//!
//! - [`PathType`] classifies cells
//! - [`Evaluator`] turns cells into search nodes for one agent
//! - [`PathFinder`] runs the search and returns a [`Path`]

mod amphibious;
mod evaluator;
mod finder;
mod node;
mod path;
mod path_type;
mod walk;

pub use amphibious::AmphibiousNodeEvaluator;
pub use evaluator::{
    Direction, EvalContext, Evaluator, EvaluatorFlags, Neighbors, NodeEvaluator,
    amphibious_static_path_type, check_neighbour_blocks, static_path_type,
};
pub use finder::PathFinder;
pub use node::{Node, NodeArena, NodeId, Target};
pub use path::{Path, PathId, PathNode};
pub use path_type::{PathType, PathTypeSet};
pub use walk::WalkNodeEvaluator;
