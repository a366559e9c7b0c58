//! Computed routes
//!
//! A [`Path`] is a detached copy of the nodes a search chose, so it outlives
//! the search arena. The follower walks it by moving a cursor.

use std::sync::atomic::{AtomicU64, Ordering};

use glam::{IVec3, Vec3};

use super::PathType;

/// Global counter for path identities
static NEXT_PATH_ID: AtomicU64 = AtomicU64::new(1);

fn next_id() -> u64 {
    NEXT_PATH_ID.fetch_add(1, Ordering::Relaxed)
}

/// Identity of a path; clones share it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PathId(u64);

/// One waypoint
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathNode {
    /// Cell coordinate
    pub pos: IVec3,
    /// Classification at search time
    pub path_type: PathType,
    /// Cost of entering the cell at search time
    pub cost_malus: f32,
}

impl PathNode {
    /// Create a waypoint
    #[must_use]
    pub fn new(pos: IVec3, path_type: PathType, cost_malus: f32) -> Self {
        Self {
            pos,
            path_type,
            cost_malus,
        }
    }

    /// Same waypoint, moved
    #[must_use]
    pub fn moved_to(&self, pos: IVec3) -> Self {
        Self { pos, ..*self }
    }

    /// Bottom center of the cell
    #[must_use]
    pub fn bottom_center(&self) -> Vec3 {
        Vec3::new(self.pos.x as f32 + 0.5, self.pos.y as f32, self.pos.z as f32 + 0.5)
    }
}

/// A route from a start cell towards a target
#[derive(Debug, Clone)]
pub struct Path {
    id: PathId,
    nodes: Vec<PathNode>,
    next_node_index: usize,
    target: IVec3,
    dist_to_target: f32,
    reached: bool,
}

impl Path {
    /// Create a path with a fresh identity
    #[must_use]
    pub fn new(nodes: Vec<PathNode>, target: IVec3, reached: bool) -> Self {
        let dist_to_target = nodes.last().map_or(f32::MAX, |end| {
            let d = (target - end.pos).abs();
            (d.x + d.y + d.z) as f32
        });
        Self {
            id: PathId(next_id()),
            nodes,
            next_node_index: 0,
            target,
            dist_to_target,
            reached,
        }
    }

    /// Identity shared by clones of this path
    #[must_use]
    pub fn id(&self) -> PathId {
        self.id
    }

    /// Move the cursor to the next waypoint
    pub fn advance(&mut self) {
        self.next_node_index += 1;
    }

    /// No waypoint has been passed yet
    #[must_use]
    pub fn not_started(&self) -> bool {
        self.next_node_index == 0
    }

    /// Every waypoint has been passed
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.next_node_index >= self.nodes.len()
    }

    /// Last waypoint
    #[must_use]
    pub fn end_node(&self) -> Option<&PathNode> {
        self.nodes.last()
    }

    /// Waypoint at `index`
    #[must_use]
    pub fn node(&self, index: usize) -> Option<&PathNode> {
        self.nodes.get(index)
    }

    /// Cell of the waypoint at `index`
    #[must_use]
    pub fn node_pos(&self, index: usize) -> Option<IVec3> {
        self.node(index).map(|n| n.pos)
    }

    /// Waypoint under the cursor
    #[must_use]
    pub fn next_node(&self) -> Option<&PathNode> {
        self.node(self.next_node_index)
    }

    /// Cell of the waypoint under the cursor
    #[must_use]
    pub fn next_node_pos(&self) -> Option<IVec3> {
        self.node_pos(self.next_node_index)
    }

    /// Waypoint just passed
    #[must_use]
    pub fn previous_node(&self) -> Option<&PathNode> {
        self.next_node_index
            .checked_sub(1)
            .and_then(|index| self.node(index))
    }

    /// Where an agent of `width` stands when centered on waypoint `index`
    #[must_use]
    pub fn entity_pos_at_node(&self, width: f32, index: usize) -> Option<Vec3> {
        let node = self.node(index)?;
        let offset = (width + 1.0).floor() * 0.5;
        Some(Vec3::new(
            node.pos.x as f32 + offset,
            node.pos.y as f32,
            node.pos.z as f32 + offset,
        ))
    }

    /// Where an agent of `width` stands when centered on the waypoint under the cursor
    #[must_use]
    pub fn next_entity_pos(&self, width: f32) -> Option<Vec3> {
        self.entity_pos_at_node(width, self.next_node_index)
    }

    /// Drop every waypoint from `len` on
    pub fn truncate_nodes(&mut self, len: usize) {
        self.nodes.truncate(len);
    }

    /// Replace the waypoint at `index`; out-of-range indices are ignored
    pub fn replace_node(&mut self, index: usize, node: PathNode) {
        if let Some(slot) = self.nodes.get_mut(index) {
            *slot = node;
        }
    }

    /// Cursor position
    #[must_use]
    pub fn next_node_index(&self) -> usize {
        self.next_node_index
    }

    /// Move the cursor
    pub fn set_next_node_index(&mut self, index: usize) {
        self.next_node_index = index;
    }

    /// Number of waypoints
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Every waypoint, start first
    #[must_use]
    pub fn nodes(&self) -> &[PathNode] {
        &self.nodes
    }

    /// Cell the search aimed at
    #[must_use]
    pub fn target(&self) -> IVec3 {
        self.target
    }

    /// Manhattan distance from the last waypoint to the target
    #[must_use]
    pub fn dist_to_target(&self) -> f32 {
        self.dist_to_target
    }

    /// Whether the last waypoint is within accuracy of the target
    #[must_use]
    pub fn can_reach(&self) -> bool {
        self.reached
    }

    /// Same cells in the same order
    #[must_use]
    pub fn same_as(&self, other: &Path) -> bool {
        self.nodes.len() == other.nodes.len()
            && self
                .nodes
                .iter()
                .zip(&other.nodes)
                .all(|(a, b)| a.pos == b.pos)
    }
}
