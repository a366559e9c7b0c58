//! Core module
//!
//! Configuration, events and statistics shared by the navigation stack

pub mod config;
mod events;
mod stats;

pub use config::{ConfigError, NavigationConfig};
pub use events::{EventQueue, NavEvent};
pub use stats::{SearchRecord, SearchStats};
