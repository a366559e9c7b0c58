//! Navigation events
//!
//! A path follower reports what happened during a tick (a path was adopted,
//! the agent got stuck, a waypoint timed out) by pushing [`NavEvent`]s into
//! its own [`EventQueue`]. The owning agent logic drains the queue and
//! decides whether to retry, pick a new destination, or wait.
//!
//! # Example
//!
//! ```ignore
//! navigation.tick(&world, &agent, &mut move_control);
//! for event in navigation.events_mut().drain() {
//!     if let NavEvent::Stuck { position } = event {
//!         pick_new_destination(position);
//!     }
//! }
//! ```

use std::collections::VecDeque;

use glam::{IVec3, Vec3};

/// Something a path follower reports to its owner.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum NavEvent {
    /// A new path was adopted.
    PathStarted {
        /// Final node of the path
        destination: IVec3,
        /// Number of nodes in the path
        nodes: usize,
        /// Whether the path ends at a target
        reaches_target: bool,
    },

    /// The path was replaced by a recomputation.
    PathRecomputed {
        /// Whether the search produced a path
        found: bool,
    },

    /// The last waypoint was passed.
    PathFinished {
        /// Whether the path ended at a target
        reached_target: bool,
    },

    /// The agent barely moved between two stuck checks; the path was dropped.
    Stuck {
        /// Agent position at the failed check
        position: Vec3,
    },

    /// The agent took too long to reach a waypoint; the path was dropped.
    TimedOut {
        /// The waypoint that was never reached
        waypoint: IVec3,
    },
}

/// FIFO of navigation events.
///
/// # Performance
///
/// - Push: O(1) amortized
/// - Drain: O(n)
#[derive(Debug)]
pub struct EventQueue {
    events: VecDeque<NavEvent>,
}

impl EventQueue {
    /// Default initial capacity for event queues.
    const DEFAULT_CAPACITY: usize = 8;

    /// Create a new event queue with default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    /// Create a new event queue with specified initial capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            events: VecDeque::with_capacity(capacity),
        }
    }

    /// Record an event.
    #[inline]
    pub fn push(&mut self, event: NavEvent) {
        log::trace!("nav event: {event:?}");
        self.events.push_back(event);
    }

    /// Iterate over queued events without consuming them.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &NavEvent> {
        self.events.iter()
    }

    /// Take every queued event, oldest first.
    #[inline]
    pub fn drain(&mut self) -> impl Iterator<Item = NavEvent> + '_ {
        self.events.drain(..)
    }

    /// Check if the queue is empty.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Get the number of queued events.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Drop every queued event.
    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_queue_order() {
        let mut queue = EventQueue::new();
        queue.push(NavEvent::PathRecomputed { found: true });
        queue.push(NavEvent::Stuck {
            position: Vec3::ZERO,
        });

        assert_eq!(queue.len(), 2);
        let events: Vec<_> = queue.drain().collect();
        assert!(matches!(events[0], NavEvent::PathRecomputed { found: true }));
        assert!(matches!(events[1], NavEvent::Stuck { .. }));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_event_queue_clear() {
        let mut queue = EventQueue::new();
        queue.push(NavEvent::TimedOut {
            waypoint: IVec3::ONE,
        });
        assert_eq!(queue.iter().count(), 1);

        queue.clear();
        assert!(queue.is_empty());
    }
}
