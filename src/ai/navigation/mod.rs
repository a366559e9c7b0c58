//! Path following
//!
//! [`PathNavigation`] turns search results into movement targets tick by
//! tick; [`MoveControl`] is a minimal mover that consumes them.

mod move_control;
mod path_navigation;
mod strategy;

pub use move_control::MoveControl;
pub use path_navigation::PathNavigation;
pub use strategy::{AmphibiousStrategy, FollowStrategy, GroundStrategy, PathFollowStrategy};
