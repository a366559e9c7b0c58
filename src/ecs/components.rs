//! Components attached to navigating entities

use crate::core::NavEvent;

/// Name component for debugging
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Name(pub String);

impl Name {
    /// Create a name
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

/// Events drained from an entity's follower during the last tick
#[derive(Debug, Clone, Default)]
pub struct NavLog {
    /// Events in the order they were raised
    pub events: Vec<NavEvent>,
}

impl NavLog {
    /// Empty log
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}
