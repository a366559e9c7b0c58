//! Search nodes and the per-search arena that owns them

use glam::IVec3;
use rustc_hash::FxHashMap;

use super::PathType;

/// Index of a node inside a [`NodeArena`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    /// Position in the arena
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// A grid cell as seen by one search
#[derive(Debug, Clone)]
pub struct Node {
    /// Cell coordinate
    pub pos: IVec3,
    /// Classification for the searching agent
    pub path_type: PathType,
    /// Extra cost of entering this cell; negative means impassable
    pub cost_malus: f32,
    /// Cost from the start
    pub g: f32,
    /// Weighted distance estimate to the closest target
    pub h: f32,
    /// `g + h`
    pub f: f32,
    /// Distance walked along the best known route
    pub walked_distance: f32,
    /// Already expanded
    pub closed: bool,
    /// Currently waiting in the open set
    pub in_open_set: bool,
    /// Insertion stamp of the live open-set entry
    pub open_seq: u64,
    /// Predecessor on the best known route
    pub came_from: Option<NodeId>,
}

impl Node {
    fn new(pos: IVec3) -> Self {
        Self {
            pos,
            path_type: PathType::Blocked,
            cost_malus: 0.0,
            g: 0.0,
            h: 0.0,
            f: 0.0,
            walked_distance: 0.0,
            closed: false,
            in_open_set: false,
            open_seq: 0,
            came_from: None,
        }
    }

    /// Packs a coordinate into one integer; unique for coordinates within +-2^20
    #[must_use]
    pub const fn key(pos: IVec3) -> u64 {
        const MASK: u64 = 0x1F_FFFF;
        ((pos.x as u64 & MASK) << 42) | ((pos.z as u64 & MASK) << 21) | (pos.y as u64 & MASK)
    }

    /// Euclidean distance to another cell
    #[must_use]
    pub fn distance_to(&self, pos: IVec3) -> f32 {
        (pos - self.pos).as_vec3().length()
    }

    /// Manhattan distance to another cell
    #[must_use]
    pub fn distance_manhattan(&self, pos: IVec3) -> f32 {
        let d = (pos - self.pos).abs();
        (d.x + d.y + d.z) as f32
    }
}

/// Nodes created during one search, addressed by [`NodeId`]
///
/// Back-pointers are indices into this arena, so the arena must not be
/// cleared while a path is being reconstructed.
#[derive(Debug, Default)]
pub struct NodeArena {
    nodes: Vec<Node>,
    by_key: FxHashMap<u64, NodeId>,
}

impl NodeArena {
    /// Create an empty arena
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Node for a coordinate, created on first use
    pub fn get_or_create(&mut self, pos: IVec3) -> NodeId {
        let next = NodeId(self.nodes.len() as u32);
        let id = *self.by_key.entry(Node::key(pos)).or_insert(next);
        if id == next {
            self.nodes.push(Node::new(pos));
        }
        id
    }

    /// Node already created for a coordinate
    #[must_use]
    pub fn find(&self, pos: IVec3) -> Option<NodeId> {
        self.by_key.get(&Node::key(pos)).copied()
    }

    /// Borrow a node
    #[must_use]
    pub fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    /// Mutably borrow a node
    pub fn get_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    /// Number of nodes created
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if no node was created
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Drop every node
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.by_key.clear();
    }

    /// Walk back-pointers from `end` to the start, returned start first
    #[must_use]
    pub fn trace_back(&self, end: NodeId) -> Vec<NodeId> {
        let mut route = vec![end];
        let mut current = end;
        while let Some(prev) = self.get(current).came_from {
            route.push(prev);
            current = prev;
        }
        route.reverse();
        route
    }
}

/// A destination of a multi-target search
#[derive(Debug, Clone)]
pub struct Target {
    /// Destination cell
    pos: IVec3,
    /// Arena node at the destination
    node: NodeId,
    /// Smallest distance seen so far
    best_distance: f32,
    /// Node that came closest
    best_node: Option<NodeId>,
    /// Node popped within accuracy of this target
    reached_by: Option<NodeId>,
}

impl Target {
    /// Create a target around an arena node
    #[must_use]
    pub fn new(pos: IVec3, node: NodeId) -> Self {
        Self {
            pos,
            node,
            best_distance: f32::MAX,
            best_node: None,
            reached_by: None,
        }
    }

    /// Destination cell
    #[must_use]
    pub fn pos(&self) -> IVec3 {
        self.pos
    }

    /// Arena node at the destination
    #[must_use]
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Remember `node` if it is the closest approach so far
    pub fn update_best(&mut self, distance: f32, node: NodeId) {
        if distance < self.best_distance {
            self.best_distance = distance;
            self.best_node = Some(node);
        }
    }

    /// Closest approach so far
    #[must_use]
    pub fn best_node(&self) -> Option<NodeId> {
        self.best_node
    }

    /// Distance of the closest approach
    #[must_use]
    pub fn best_distance(&self) -> f32 {
        self.best_distance
    }

    /// Mark the target reached by `node`
    pub fn set_reached(&mut self, node: NodeId) {
        self.reached_by = Some(node);
    }

    /// Node that reached the target, if any
    #[must_use]
    pub fn reached_by(&self) -> Option<NodeId> {
        self.reached_by
    }

    /// Check if the target was reached
    #[must_use]
    pub fn is_reached(&self) -> bool {
        self.reached_by.is_some()
    }
}
