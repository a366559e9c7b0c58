//! Entity Component System module
//!
//! Built on top of the hecs ECS library. Navigating entities carry an
//! [`Agent`](crate::agent::Agent), a [`PathNavigation`](crate::ai::PathNavigation)
//! and a [`MoveControl`](crate::ai::MoveControl).

mod components;
pub mod systems;
mod world;

pub use components::{Name, NavLog};
pub use systems::{collect_events, drain_events, tick_navigation};
pub use world::AgentWorld;
