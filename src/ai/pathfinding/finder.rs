//! Weighted multi-target A* search
//!
//! The search expands nodes produced by an [`Evaluator`] until a target is
//! within accuracy or the node budget runs out. When no target is reached the
//! best partial route is returned instead, so callers always get something to
//! walk towards unless the start itself is invalid.
//!
//! The heuristic is scaled by a fudge factor (1.5 by default). This makes the
//! search greedier and cheaper at the price of optimality.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::Instant;

use glam::IVec3;

use super::evaluator::{EvalContext, Evaluator, Neighbors, NodeEvaluator};
use super::node::{NodeArena, NodeId, Target};
use super::path::{Path, PathNode};
use crate::agent::Agent;
use crate::core::config::HEURISTIC_FUDGE;
use crate::core::{SearchRecord, SearchStats};
use crate::world::NavWorld;

/// Open-set entry
#[derive(Debug, Clone, Copy)]
struct OpenEntry {
    f: f32,
    seq: u64,
    id: NodeId,
}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenEntry {}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse for min-heap; older entries win ties
        other
            .f
            .total_cmp(&self.f)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Min-heap on `f` with lazy removal of superseded entries
#[derive(Debug, Default)]
struct OpenSet {
    heap: BinaryHeap<OpenEntry>,
    next_seq: u64,
    live: usize,
}

impl OpenSet {
    fn clear(&mut self) {
        self.heap.clear();
        self.next_seq = 0;
        self.live = 0;
    }

    fn is_empty(&self) -> bool {
        self.live == 0
    }

    fn push_entry(&mut self, nodes: &mut NodeArena, id: NodeId, f: f32) {
        let seq = self.next_seq;
        self.next_seq += 1;

        let node = nodes.get_mut(id);
        node.f = f;
        node.open_seq = seq;
        self.heap.push(OpenEntry { f, seq, id });
    }

    fn insert(&mut self, nodes: &mut NodeArena, id: NodeId, f: f32) {
        nodes.get_mut(id).in_open_set = true;
        self.live += 1;
        self.push_entry(nodes, id, f);
    }

    fn change_cost(&mut self, nodes: &mut NodeArena, id: NodeId, f: f32) {
        self.push_entry(nodes, id, f);
    }

    fn pop(&mut self, nodes: &mut NodeArena) -> Option<NodeId> {
        while let Some(entry) = self.heap.pop() {
            let node = nodes.get_mut(entry.id);
            if !node.in_open_set || node.open_seq != entry.seq {
                continue;
            }
            node.in_open_set = false;
            self.live -= 1;
            return Some(entry.id);
        }
        None
    }
}

/// A* path finder owning its evaluator and scratch state
#[derive(Debug)]
pub struct PathFinder {
    evaluator: Evaluator,
    open_set: OpenSet,
    neighbors: Neighbors,
    max_visited_nodes: usize,
    heuristic_fudge: f32,
    stats: SearchStats,
}

impl PathFinder {
    /// Create a path finder that expands at most `max_visited_nodes` nodes per search
    #[must_use]
    pub fn new(evaluator: Evaluator, max_visited_nodes: usize) -> Self {
        Self {
            evaluator,
            open_set: OpenSet::default(),
            neighbors: Neighbors::new(),
            max_visited_nodes,
            heuristic_fudge: HEURISTIC_FUDGE,
            stats: SearchStats::new(),
        }
    }

    /// Set the heuristic weight
    #[must_use]
    pub fn with_heuristic_fudge(mut self, fudge: f32) -> Self {
        self.heuristic_fudge = fudge;
        self
    }

    /// Node budget before the per-call multiplier
    #[must_use]
    pub fn max_visited_nodes(&self) -> usize {
        self.max_visited_nodes
    }

    /// Change the node budget
    pub fn set_max_visited_nodes(&mut self, max_visited_nodes: usize) {
        self.max_visited_nodes = max_visited_nodes;
    }

    /// The evaluator
    #[must_use]
    pub fn evaluator(&self) -> &Evaluator {
        &self.evaluator
    }

    /// Mutable access to the evaluator
    pub fn evaluator_mut(&mut self) -> &mut Evaluator {
        &mut self.evaluator
    }

    /// Statistics of recent searches
    #[must_use]
    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    /// Statistics of the most recent search
    #[must_use]
    pub fn last_stats(&self) -> Option<&SearchRecord> {
        self.stats.last()
    }

    /// Search from the agent's position towards the closest reachable target
    ///
    /// Returns `None` when `targets` is empty or the agent has no valid start
    /// node. Otherwise returns either a path that reaches a target within
    /// Manhattan distance `accuracy`, or the best partial path.
    pub fn find_path(
        &mut self,
        world: &dyn NavWorld,
        agent: &Agent,
        targets: &[IVec3],
        max_range: f32,
        accuracy: i32,
        search_depth_multiplier: f32,
    ) -> Option<Path> {
        if targets.is_empty() {
            return None;
        }

        let ctx = EvalContext::new(world, agent);
        self.open_set.clear();
        self.evaluator.prepare(&ctx);

        let path = self.evaluator.start(&ctx).and_then(|start| {
            let mut goals: Vec<Target> = Vec::with_capacity(targets.len());
            for &pos in targets {
                if !goals.iter().any(|t| t.pos() == pos) {
                    goals.push(self.evaluator.goal(pos));
                }
            }
            self.search(&ctx, start, &mut goals, max_range, accuracy, search_depth_multiplier)
        });

        self.evaluator.done();
        path
    }

    fn search(
        &mut self,
        ctx: &EvalContext<'_>,
        start: NodeId,
        targets: &mut [Target],
        max_range: f32,
        accuracy: i32,
        search_depth_multiplier: f32,
    ) -> Option<Path> {
        let started = Instant::now();
        let budget = (self.max_visited_nodes as f32 * search_depth_multiplier) as usize;
        let accuracy = accuracy as f32;

        let start_h = best_h(self.evaluator.nodes(), start, targets);
        {
            let node = self.evaluator.nodes_mut().get_mut(start);
            node.g = 0.0;
            node.h = start_h;
        }
        self.open_set.insert(self.evaluator.nodes_mut(), start, start_h);

        let start_pos = self.evaluator.nodes().get(start).pos;
        let mut iterations = 0;
        let mut reached_any = false;

        while !self.open_set.is_empty() {
            iterations += 1;
            if iterations >= budget {
                break;
            }

            let Some(current) = self.open_set.pop(self.evaluator.nodes_mut()) else {
                break;
            };
            self.evaluator.nodes_mut().get_mut(current).closed = true;

            let node = self.evaluator.nodes().get(current);
            for target in targets.iter_mut() {
                if node.distance_manhattan(target.pos()) <= accuracy {
                    target.set_reached(current);
                    reached_any = true;
                }
            }
            if reached_any {
                break;
            }

            if node.distance_to(start_pos) >= max_range {
                continue;
            }

            let mut neighbors = std::mem::take(&mut self.neighbors);
            neighbors.clear();
            self.evaluator.neighbors(ctx, current, &mut neighbors);

            for &neighbor in &neighbors {
                let nodes = self.evaluator.nodes_mut();
                let (cur_g, cur_walked, cur_pos) = {
                    let c = nodes.get(current);
                    (c.g, c.walked_distance, c.pos)
                };
                let n = nodes.get_mut(neighbor);
                let distance = n.distance_to(cur_pos);
                n.walked_distance = cur_walked + distance;
                let g = cur_g + distance + n.cost_malus;

                if n.walked_distance < max_range && (!n.in_open_set || g < n.g) {
                    n.came_from = Some(current);
                    n.g = g;
                    let h = best_h(nodes, neighbor, targets) * self.heuristic_fudge;
                    let n = nodes.get_mut(neighbor);
                    n.h = h;
                    let f = g + h;
                    if n.in_open_set {
                        self.open_set.change_cost(nodes, neighbor, f);
                    } else {
                        self.open_set.insert(nodes, neighbor, f);
                    }
                }
            }
            self.neighbors = neighbors;
        }

        let nodes = self.evaluator.nodes();
        let path = if reached_any {
            targets
                .iter()
                .filter_map(|t| t.reached_by().map(|end| reconstruct(nodes, end, t.pos(), true)))
                .min_by_key(Path::node_count)
        } else {
            targets
                .iter()
                .filter_map(|t| t.best_node().map(|end| reconstruct(nodes, end, t.pos(), false)))
                .min_by(|a, b| {
                    a.dist_to_target()
                        .total_cmp(&b.dist_to_target())
                        .then_with(|| a.node_count().cmp(&b.node_count()))
                })
        };

        let record = SearchRecord {
            iterations,
            nodes_created: nodes.len(),
            reached: reached_any,
            duration: started.elapsed(),
        };
        log::debug!(
            "path search from {start_pos}: {} iterations, {} nodes, reached: {}, {} waypoints",
            record.iterations,
            record.nodes_created,
            record.reached,
            path.as_ref().map_or(0, Path::node_count),
        );
        self.stats.record(record);

        path
    }
}

/// Distance to the closest target, updating every target's best approach
fn best_h(nodes: &NodeArena, id: NodeId, targets: &mut [Target]) -> f32 {
    let node = nodes.get(id);
    let mut best = f32::MAX;
    for target in targets.iter_mut() {
        let distance = node.distance_to(target.pos());
        target.update_best(distance, id);
        best = best.min(distance);
    }
    best
}

fn reconstruct(nodes: &NodeArena, end: NodeId, target: IVec3, reached: bool) -> Path {
    let waypoints = nodes
        .trace_back(end)
        .into_iter()
        .map(|id| {
            let node = nodes.get(id);
            PathNode::new(node.pos, node.path_type, node.cost_malus)
        })
        .collect();
    Path::new(waypoints, target, reached)
}
