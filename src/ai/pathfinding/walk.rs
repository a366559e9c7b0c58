//! Walking agents
//!
//! Moves are one cell horizontally, possibly combined with stepping up a
//! ledge, dropping down a bounded fall, or sinking through water. Diagonal
//! moves are allowed only where both orthogonal moves are.

use glam::{IVec3, Vec3};
use rustc_hash::FxHashMap;

use super::evaluator::{
    Direction, EvalContext, EvaluatorFlags, Neighbors, NodeEvaluator,
    amphibious_static_path_type, static_path_type,
};
use super::node::{NodeArena, NodeId};
use super::{PathType, PathTypeSet};
use crate::world::Aabb;

/// Lowest ledge height that always counts as a jump
const MIN_JUMP_HEIGHT: f32 = 1.125;

/// Evaluator for agents that walk on the ground
#[derive(Debug)]
pub struct WalkNodeEvaluator {
    /// Nodes of the current session
    nodes: NodeArena,
    /// Capabilities
    flags: EvaluatorFlags,
    /// Session-scoped cost overrides layered over the agent's own
    malus_overrides: FxHashMap<PathType, f32>,
    /// Agent classification per cell
    path_types: FxHashMap<IVec3, PathType>,
    /// Collision answers per box
    collisions: FxHashMap<[u32; 6], bool>,
    /// Cells covered by the agent's footprint
    footprint: IVec3,
    /// Treats water as walkable terrain
    amphibious: bool,
}

impl WalkNodeEvaluator {
    /// Create a walking evaluator
    #[must_use]
    pub fn new(flags: EvaluatorFlags) -> Self {
        Self {
            nodes: NodeArena::new(),
            flags,
            malus_overrides: FxHashMap::default(),
            path_types: FxHashMap::default(),
            collisions: FxHashMap::default(),
            footprint: IVec3::ONE,
            amphibious: false,
        }
    }

    pub(super) fn new_amphibious(flags: EvaluatorFlags) -> Self {
        Self {
            amphibious: true,
            ..Self::new(flags)
        }
    }

    pub(super) fn set_malus_override(&mut self, path_type: PathType, malus: f32) {
        self.malus_overrides.insert(path_type, malus);
    }

    pub(super) fn clear_malus_overrides(&mut self) {
        self.malus_overrides.clear();
    }

    /// Cost of entering a cell of this type for the current session
    #[must_use]
    pub fn malus(&self, ctx: &EvalContext<'_>, path_type: PathType) -> f32 {
        self.malus_overrides
            .get(&path_type)
            .copied()
            .unwrap_or_else(|| ctx.agent.malus(path_type))
    }

    /// Height the agent rests at when standing in `pos`
    pub(super) fn floor_level(&self, ctx: &EvalContext<'_>, pos: IVec3) -> f32 {
        if (self.flags.can_float || self.amphibious) && ctx.world.is_water(pos) {
            pos.y as f32 + 0.5
        } else {
            ctx.world.floor_level(pos)
        }
    }

    /// Vertical step budget from `pos`, plus the type of `pos` itself
    pub(super) fn step_budget(&mut self, ctx: &EvalContext<'_>, pos: IVec3) -> (i32, PathType) {
        let above = self.path_type(ctx, pos + IVec3::Y);
        let current = self.path_type(ctx, pos);
        let budget = if self.malus(ctx, above) >= 0.0 && current != PathType::StickyHoney {
            ctx.agent.descriptor.max_up_step.max(1.0).floor() as i32
        } else {
            0
        };
        (budget, current)
    }

    pub(super) fn start_node(&mut self, ctx: &EvalContext<'_>, pos: IVec3) -> NodeId {
        let path_type = self.path_type(ctx, pos);
        let malus = self.malus(ctx, path_type);
        let id = self.nodes.get_or_create(pos);
        let node = self.nodes.get_mut(id);
        node.path_type = path_type;
        node.cost_malus = malus;
        id
    }

    fn can_start_at(&mut self, ctx: &EvalContext<'_>, pos: IVec3) -> bool {
        let path_type = self.path_type(ctx, pos);
        path_type != PathType::Open && self.malus(ctx, path_type) >= 0.0
    }

    pub(super) fn is_neighbor_valid(&self, candidate: NodeId, node: NodeId) -> bool {
        let candidate = self.nodes.get(candidate);
        !candidate.closed && (candidate.cost_malus >= 0.0 || self.nodes.get(node).cost_malus < 0.0)
    }

    fn is_diagonal_valid(
        &self,
        ctx: &EvalContext<'_>,
        root: NodeId,
        x_node: Option<NodeId>,
        z_node: Option<NodeId>,
        diagonal: Option<NodeId>,
    ) -> bool {
        let (Some(x_node), Some(z_node), Some(diagonal)) = (x_node, z_node, diagonal) else {
            return false;
        };
        let root = self.nodes.get(root);
        let x_node = self.nodes.get(x_node);
        let z_node = self.nodes.get(z_node);
        let diagonal = self.nodes.get(diagonal);

        if diagonal.closed || x_node.pos.y > root.pos.y || z_node.pos.y > root.pos.y {
            return false;
        }
        if [x_node, z_node, diagonal]
            .iter()
            .any(|n| n.path_type == PathType::WalkableDoor)
        {
            return false;
        }

        // Thin agents squeeze between two fence posts
        let between_fences = x_node.path_type == PathType::Fence
            && z_node.path_type == PathType::Fence
            && ctx.agent.descriptor.width < 0.5;
        diagonal.cost_malus >= 0.0
            && (z_node.pos.y < root.pos.y || z_node.cost_malus >= 0.0 || between_fences)
            && (x_node.pos.y < root.pos.y || x_node.cost_malus >= 0.0 || between_fences)
    }

    /// Node the agent ends up on when moving into column `pos`
    ///
    /// Tries `pos` itself, then climbs (within `vertical_limit`), sinks
    /// through water or falls, depending on what the cell holds.
    pub(super) fn find_accepted_node(
        &mut self,
        ctx: &EvalContext<'_>,
        pos: IVec3,
        vertical_limit: i32,
        node_floor: f32,
        direction: Direction,
        current: PathType,
    ) -> Option<NodeId> {
        let (x, z) = (pos.x, pos.z);
        let mut y = pos.y;

        let jump_height = ctx.agent.descriptor.max_up_step.max(MIN_JUMP_HEIGHT);
        if self.floor_level(ctx, pos) - node_floor > jump_height {
            return None;
        }

        let mut path_type = self.path_type(ctx, pos);
        let mut malus = self.malus(ctx, path_type);
        let half_width = ctx.agent.descriptor.width / 2.0;

        let mut node = None;
        if malus >= 0.0 {
            node = Some(self.node_and_update_cost_to_max(pos, path_type, malus));
        }

        if current.has_partial_collision()
            && let Some(id) = node
            && self.nodes.get(id).cost_malus >= 0.0
            && !self.can_reach_without_collision(ctx, id)
        {
            node = None;
        }

        if path_type == PathType::Walkable || (self.amphibious && path_type == PathType::Water) {
            return node;
        }

        let blocked_here = node.is_none_or(|id| self.nodes.get(id).cost_malus < 0.0);
        let climbable = (path_type != PathType::Fence || self.flags.can_walk_over_fences)
            && !matches!(
                path_type,
                PathType::UnpassableRail | PathType::Trapdoor | PathType::PowderSnow
            );
        if blocked_here && vertical_limit > 0 && climbable {
            node = self.find_accepted_node(
                ctx,
                pos + IVec3::Y,
                vertical_limit - 1,
                node_floor,
                direction,
                current,
            );

            if let Some(id) = node
                && ctx.agent.descriptor.width < 1.0
            {
                let above = self.nodes.get(id);
                if matches!(above.path_type, PathType::Open | PathType::Walkable) {
                    // Head room above the cell we climb from
                    let from = IVec3::new(x, y + 1, z) - direction.step() * IVec3::new(1, 0, 1);
                    let cx = from.x as f32 + 0.5;
                    let cz = from.z as f32 + 0.5;
                    let clearance = Aabb::new(
                        Vec3::new(
                            cx - half_width,
                            ctx.world.floor_level(from) + 0.001,
                            cz - half_width,
                        ),
                        Vec3::new(
                            cx + half_width,
                            ctx.agent.descriptor.height + ctx.world.floor_level(above.pos) - 0.002,
                            cz + half_width,
                        ),
                    );
                    if self.has_collisions(ctx, &clearance) {
                        node = None;
                    }
                }
            }
        }

        if !self.amphibious && path_type == PathType::Water && !self.flags.can_float {
            if self.path_type(ctx, IVec3::new(x, y - 1, z)) != PathType::Water {
                return node;
            }
            while y > ctx.world.min_height() {
                y -= 1;
                path_type = self.path_type(ctx, IVec3::new(x, y, z));
                if path_type != PathType::Water {
                    return node;
                }
                malus = self.malus(ctx, path_type);
                node = Some(self.node_and_update_cost_to_max(IVec3::new(x, y, z), path_type, malus));
            }
        }

        if path_type == PathType::Open {
            let start_y = y;
            let mut fallen = 0;
            while path_type == PathType::Open {
                y -= 1;
                if y < ctx.world.min_height() {
                    return Some(self.blocked_node(IVec3::new(x, start_y, z)));
                }
                if fallen >= ctx.agent.descriptor.max_fall_distance {
                    return Some(self.blocked_node(IVec3::new(x, y, z)));
                }
                fallen += 1;

                path_type = self.path_type(ctx, IVec3::new(x, y, z));
                malus = self.malus(ctx, path_type);
                if path_type != PathType::Open && malus >= 0.0 {
                    node = Some(self.node_and_update_cost_to_max(
                        IVec3::new(x, y, z),
                        path_type,
                        malus,
                    ));
                    break;
                }
                if malus < 0.0 {
                    return Some(self.blocked_node(IVec3::new(x, y, z)));
                }
            }
        }

        if path_type.has_partial_collision() && node.is_none() {
            let id = self.nodes.get_or_create(IVec3::new(x, y, z));
            let closed = self.nodes.get_mut(id);
            closed.closed = true;
            closed.path_type = path_type;
            closed.cost_malus = path_type.default_malus();
            node = Some(id);
        }

        node
    }

    fn node_and_update_cost_to_max(&mut self, pos: IVec3, path_type: PathType, malus: f32) -> NodeId {
        let id = self.nodes.get_or_create(pos);
        let node = self.nodes.get_mut(id);
        node.path_type = path_type;
        node.cost_malus = node.cost_malus.max(malus);
        id
    }

    fn blocked_node(&mut self, pos: IVec3) -> NodeId {
        let id = self.nodes.get_or_create(pos);
        let node = self.nodes.get_mut(id);
        node.path_type = PathType::Blocked;
        node.cost_malus = -1.0;
        id
    }

    /// Sweep the agent's box from where it stands into the node's cell
    fn can_reach_without_collision(&mut self, ctx: &EvalContext<'_>, id: NodeId) -> bool {
        let mut bounds = ctx.agent.bounding_box();
        let feet = ctx.agent.position();
        let target = self.nodes.get(id).pos.as_vec3();
        let delta = Vec3::new(
            target.x - feet.x + bounds.x_size() / 2.0,
            target.y - feet.y + bounds.y_size() / 2.0,
            target.z - feet.z + bounds.z_size() / 2.0,
        );

        let steps = (delta.length() / bounds.size()).ceil() as i32;
        if steps <= 0 {
            return true;
        }
        let step = delta / steps as f32;
        for _ in 0..steps {
            bounds = bounds.translate(step);
            if self.has_collisions(ctx, &bounds) {
                return false;
            }
        }
        true
    }

    fn has_collisions(&mut self, ctx: &EvalContext<'_>, bounds: &Aabb) -> bool {
        *self
            .collisions
            .entry(bounds.cache_key())
            .or_insert_with(|| ctx.world.intersects(bounds))
    }

    fn static_path_type(&self, ctx: &EvalContext<'_>, pos: IVec3) -> PathType {
        if self.amphibious {
            amphibious_static_path_type(ctx.world, pos)
        } else {
            static_path_type(ctx.world, pos)
        }
    }

    /// Apply the agent's door and rail abilities to a cell type
    fn evaluate_door_and_rail(
        &self,
        ctx: &EvalContext<'_>,
        agent_cell: IVec3,
        path_type: PathType,
    ) -> PathType {
        let can_pass = self.flags.can_pass_doors;
        match path_type {
            PathType::DoorWoodClosed if self.flags.can_open_doors && can_pass => {
                PathType::WalkableDoor
            }
            PathType::DoorOpen if !can_pass => PathType::Blocked,
            PathType::Rail
                if !ctx.world.is_rail(agent_cell) && !ctx.world.is_rail(agent_cell - IVec3::Y) =>
            {
                PathType::UnpassableRail
            }
            other => other,
        }
    }

    /// Classify `pos` for every cell of the agent's footprint
    fn agent_path_type(&self, ctx: &EvalContext<'_>, pos: IVec3) -> PathType {
        let agent_cell = ctx.agent.block_position();
        let mut types = PathTypeSet::new();
        let mut first = PathType::Blocked;

        for dx in 0..self.footprint.x {
            for dy in 0..self.footprint.y {
                for dz in 0..self.footprint.z {
                    let offset = IVec3::new(dx, dy, dz);
                    let cell_type = self.evaluate_door_and_rail(
                        ctx,
                        agent_cell,
                        self.static_path_type(ctx, pos + offset),
                    );
                    if offset == IVec3::ZERO {
                        first = cell_type;
                    }
                    types.insert(cell_type);
                }
            }
        }

        if types.contains(PathType::Fence) {
            return PathType::Fence;
        }
        if types.contains(PathType::UnpassableRail) {
            return PathType::UnpassableRail;
        }

        let mut best = PathType::Blocked;
        for path_type in types.iter() {
            let malus = self.malus(ctx, path_type);
            if malus < 0.0 {
                return path_type;
            }
            if malus >= self.malus(ctx, best) {
                best = path_type;
            }
        }

        if first == PathType::Open && self.malus(ctx, best) == 0.0 && self.footprint.x <= 1 {
            PathType::Open
        } else {
            best
        }
    }
}

impl NodeEvaluator for WalkNodeEvaluator {
    fn prepare(&mut self, ctx: &EvalContext<'_>) {
        self.nodes.clear();
        self.path_types.clear();
        self.collisions.clear();

        let d = &ctx.agent.descriptor;
        self.footprint = IVec3::new(
            (d.width + 1.0).floor() as i32,
            (d.height + 1.0).floor() as i32,
            (d.depth + 1.0).floor() as i32,
        );
    }

    fn done(&mut self) {
        self.path_types.clear();
        self.collisions.clear();
    }

    fn start(&mut self, ctx: &EvalContext<'_>) -> Option<NodeId> {
        let world = ctx.world;
        let agent = ctx.agent;
        let feet = agent.block_position();

        let y = if self.flags.can_float && agent.state.in_water {
            // Float up to the water surface
            let mut cell = feet;
            while world.is_water(cell) && cell.y < world.max_height() {
                cell.y += 1;
            }
            cell.y - 1
        } else if agent.state.on_ground {
            (agent.position().y + 0.5).floor() as i32
        } else {
            let mut cell = feet;
            while world.collision_top(cell).is_none() && cell.y > world.min_height() {
                cell.y -= 1;
            }
            cell.y + 1
        };

        if y < world.min_height() {
            return None;
        }

        let column = IVec3::new(feet.x, y, feet.z);
        if !self.can_start_at(ctx, column) {
            let bounds = agent.bounding_box();
            let corners = [
                (bounds.min.x, bounds.min.z),
                (bounds.min.x, bounds.max.z),
                (bounds.max.x, bounds.min.z),
                (bounds.max.x, bounds.max.z),
            ];
            for (cx, cz) in corners {
                let corner = IVec3::new(cx.floor() as i32, y, cz.floor() as i32);
                if self.can_start_at(ctx, corner) {
                    return Some(self.start_node(ctx, corner));
                }
            }
        }

        Some(self.start_node(ctx, column))
    }

    fn neighbors(&mut self, ctx: &EvalContext<'_>, id: NodeId, out: &mut Neighbors) {
        let pos = self.nodes.get(id).pos;
        let (budget, current) = self.step_budget(ctx, pos);
        let floor = self.floor_level(ctx, pos);

        let south = self.find_accepted_node(ctx, pos + IVec3::Z, budget, floor, Direction::South, current);
        let west = self.find_accepted_node(ctx, pos - IVec3::X, budget, floor, Direction::West, current);
        let east = self.find_accepted_node(ctx, pos + IVec3::X, budget, floor, Direction::East, current);
        let north = self.find_accepted_node(ctx, pos - IVec3::Z, budget, floor, Direction::North, current);

        for candidate in [south, west, east, north].into_iter().flatten() {
            if self.is_neighbor_valid(candidate, id) {
                out.push(candidate);
            }
        }

        let diagonals = [
            (IVec3::new(-1, 0, -1), Direction::North, west, north),
            (IVec3::new(1, 0, -1), Direction::North, east, north),
            (IVec3::new(-1, 0, 1), Direction::South, west, south),
            (IVec3::new(1, 0, 1), Direction::South, east, south),
        ];
        for (offset, direction, x_node, z_node) in diagonals {
            let diagonal = self.find_accepted_node(ctx, pos + offset, budget, floor, direction, current);
            if self.is_diagonal_valid(ctx, id, x_node, z_node, diagonal)
                && let Some(diagonal) = diagonal
            {
                out.push(diagonal);
            }
        }
    }

    fn path_type(&mut self, ctx: &EvalContext<'_>, pos: IVec3) -> PathType {
        if let Some(cached) = self.path_types.get(&pos) {
            return *cached;
        }
        let path_type = self.agent_path_type(ctx, pos);
        self.path_types.insert(pos, path_type);
        path_type
    }

    fn nodes(&self) -> &NodeArena {
        &self.nodes
    }

    fn nodes_mut(&mut self) -> &mut NodeArena {
        &mut self.nodes
    }

    fn flags(&self) -> &EvaluatorFlags {
        &self.flags
    }

    fn flags_mut(&mut self) -> &mut EvaluatorFlags {
        &mut self.flags
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{Agent, AgentDescriptor};
    use crate::world::{Block, VoxelWorld};

    fn agent_at(descriptor: AgentDescriptor, x: i32, z: i32) -> Agent {
        Agent::new(descriptor, Vec3::new(x as f32 + 0.5, 0.0, z as f32 + 0.5))
    }

    fn evaluator_for(ctx: &EvalContext<'_>) -> WalkNodeEvaluator {
        let mut evaluator = WalkNodeEvaluator::new(EvaluatorFlags::from_agent(ctx.agent));
        evaluator.prepare(ctx);
        evaluator
    }

    fn neighbor_positions(
        evaluator: &mut WalkNodeEvaluator,
        ctx: &EvalContext<'_>,
        id: NodeId,
    ) -> Vec<IVec3> {
        let mut out = Neighbors::new();
        evaluator.neighbors(ctx, id, &mut out);
        out.iter().map(|n| evaluator.nodes().get(*n).pos).collect()
    }

    #[test]
    fn test_start_on_flat_ground() {
        let world = VoxelWorld::flat(12, 12);
        let agent = agent_at(AgentDescriptor::default(), 5, 5);
        let ctx = EvalContext::new(&world, &agent);
        let mut evaluator = evaluator_for(&ctx);

        let start = evaluator.start(&ctx).unwrap();
        let node = evaluator.nodes().get(start);
        assert_eq!(node.pos, IVec3::new(5, 0, 5));
        assert_eq!(node.path_type, PathType::Walkable);
        assert_eq!(node.cost_malus, 0.0);
    }

    #[test]
    fn test_airborne_start_drops_to_floor() {
        let world = VoxelWorld::flat(12, 12);
        let mut agent = Agent::new(AgentDescriptor::default(), Vec3::new(5.5, 3.2, 5.5));
        agent.state.on_ground = false;
        let ctx = EvalContext::new(&world, &agent);
        let mut evaluator = evaluator_for(&ctx);

        let start = evaluator.start(&ctx).unwrap();
        assert_eq!(evaluator.nodes().get(start).pos, IVec3::new(5, 0, 5));
    }

    #[test]
    fn test_flat_ground_has_eight_neighbors() {
        let world = VoxelWorld::flat(12, 12);
        let agent = agent_at(AgentDescriptor::default(), 5, 5);
        let ctx = EvalContext::new(&world, &agent);
        let mut evaluator = evaluator_for(&ctx);

        let start = evaluator.start(&ctx).unwrap();
        let found = neighbor_positions(&mut evaluator, &ctx, start);
        assert_eq!(
            found,
            vec![
                IVec3::new(5, 0, 6),
                IVec3::new(4, 0, 5),
                IVec3::new(6, 0, 5),
                IVec3::new(5, 0, 4),
                IVec3::new(4, 0, 4),
                IVec3::new(6, 0, 4),
                IVec3::new(4, 0, 6),
                IVec3::new(6, 0, 6),
            ]
        );
    }

    #[test]
    fn test_neighbors_are_symmetric() {
        let world = VoxelWorld::flat(12, 12);
        let agent = agent_at(AgentDescriptor::default(), 5, 5);
        let ctx = EvalContext::new(&world, &agent);
        let mut evaluator = evaluator_for(&ctx);

        let start = evaluator.start(&ctx).unwrap();
        let mut out = Neighbors::new();
        evaluator.neighbors(&ctx, start, &mut out);
        for neighbor in out {
            let back = neighbor_positions(&mut evaluator, &ctx, neighbor);
            assert!(back.contains(&IVec3::new(5, 0, 5)));
        }
    }

    #[test]
    fn test_wall_corner_blocks_diagonals() {
        let mut world = VoxelWorld::flat(12, 12);
        world.fill(IVec3::new(6, 0, 5), IVec3::new(6, 1, 5), Block::Stone);
        let agent = agent_at(AgentDescriptor::default(), 5, 5);
        let ctx = EvalContext::new(&world, &agent);
        let mut evaluator = evaluator_for(&ctx);

        let start = evaluator.start(&ctx).unwrap();
        let found = neighbor_positions(&mut evaluator, &ctx, start);
        assert_eq!(found.len(), 5);
        assert!(!found.iter().any(|p| p.x == 6));
    }

    #[test]
    fn test_steps_up_one_block() {
        let mut world = VoxelWorld::flat(12, 12);
        world.set_block(IVec3::new(6, 0, 5), Block::Stone);
        let agent = agent_at(AgentDescriptor::default(), 5, 5);
        let ctx = EvalContext::new(&world, &agent);
        let mut evaluator = evaluator_for(&ctx);

        let start = evaluator.start(&ctx).unwrap();
        let found = neighbor_positions(&mut evaluator, &ctx, start);
        assert!(found.contains(&IVec3::new(6, 1, 5)));
        // Diagonals next to a raised orthogonal are refused
        assert!(!found.contains(&IVec3::new(6, 0, 4)));
        assert_eq!(found.len(), 6);
    }

    #[test]
    fn test_falls_into_shallow_pit() {
        let mut world = VoxelWorld::flat(12, 12);
        world.fill(IVec3::new(6, -2, 5), IVec3::new(6, -1, 5), Block::Air);
        let agent = agent_at(AgentDescriptor::default(), 5, 5);
        let ctx = EvalContext::new(&world, &agent);
        let mut evaluator = evaluator_for(&ctx);

        let start = evaluator.start(&ctx).unwrap();
        let found = neighbor_positions(&mut evaluator, &ctx, start);
        assert!(found.contains(&IVec3::new(6, -2, 5)));
    }

    #[test]
    fn test_refuses_deep_drop() {
        let mut world = VoxelWorld::flat(12, 12);
        world.fill(IVec3::new(6, -4, 5), IVec3::new(6, -1, 5), Block::Air);
        let agent = agent_at(AgentDescriptor::default(), 5, 5);
        let ctx = EvalContext::new(&world, &agent);
        let mut evaluator = evaluator_for(&ctx);

        let start = evaluator.start(&ctx).unwrap();
        let found = neighbor_positions(&mut evaluator, &ctx, start);
        assert!(!found.iter().any(|p| p.x == 6 && p.z == 5));
    }

    #[test]
    fn test_closed_door_needs_hands() {
        let mut world = VoxelWorld::flat(12, 12);
        world.fill(
            IVec3::new(6, 0, 5),
            IVec3::new(6, 1, 5),
            Block::WoodDoor { open: false },
        );

        let agent = agent_at(AgentDescriptor::default(), 5, 5);
        let ctx = EvalContext::new(&world, &agent);
        let mut evaluator = evaluator_for(&ctx);
        let start = evaluator.start(&ctx).unwrap();
        let found = neighbor_positions(&mut evaluator, &ctx, start);
        assert!(!found.iter().any(|p| p.x == 6 && p.z == 5));

        let opener = agent_at(AgentDescriptor::default().with_doors(true, true), 5, 5);
        let ctx = EvalContext::new(&world, &opener);
        let mut evaluator = evaluator_for(&ctx);
        let start = evaluator.start(&ctx).unwrap();
        let mut out = Neighbors::new();
        evaluator.neighbors(&ctx, start, &mut out);
        let door = out
            .iter()
            .map(|n| evaluator.nodes().get(*n))
            .find(|n| n.pos == IVec3::new(6, 0, 5))
            .unwrap();
        assert_eq!(door.path_type, PathType::WalkableDoor);
        // No diagonal moves past a door
        assert!(!out.iter().any(|n| evaluator.nodes().get(*n).pos == IVec3::new(6, 0, 6)));
    }

    #[test]
    fn test_thin_agent_squeezes_between_fences() {
        let mut world = VoxelWorld::flat(12, 12);
        world.set_block(IVec3::new(4, 0, 5), Block::Fence);
        world.set_block(IVec3::new(5, 0, 4), Block::Fence);
        let north_west = IVec3::new(4, 0, 4);

        let wide = agent_at(AgentDescriptor::default(), 5, 5);
        let ctx = EvalContext::new(&world, &wide);
        let mut evaluator = evaluator_for(&ctx);
        let start = evaluator.start(&ctx).unwrap();
        assert!(!neighbor_positions(&mut evaluator, &ctx, start).contains(&north_west));

        let thin = agent_at(AgentDescriptor::default().with_size(0.4, 0.8, 0.4), 5, 5);
        let ctx = EvalContext::new(&world, &thin);
        let mut evaluator = evaluator_for(&ctx);
        let start = evaluator.start(&ctx).unwrap();
        assert!(neighbor_positions(&mut evaluator, &ctx, start).contains(&north_west));
    }

    #[test]
    fn test_malus_override_blocks_type() {
        let mut world = VoxelWorld::flat(12, 12);
        world.set_block(IVec3::new(6, -1, 5), Block::Magma);
        let agent = agent_at(AgentDescriptor::default(), 5, 5);
        let ctx = EvalContext::new(&world, &agent);
        let mut evaluator = evaluator_for(&ctx);
        assert_eq!(evaluator.path_type(&ctx, IVec3::new(6, 0, 5)), PathType::DamageFire);

        let careful = agent_at(
            AgentDescriptor::default().with_malus(PathType::DamageFire, -1.0),
            5,
            5,
        );
        let ctx = EvalContext::new(&world, &careful);
        let mut evaluator = evaluator_for(&ctx);
        let start = evaluator.start(&ctx).unwrap();
        let found = neighbor_positions(&mut evaluator, &ctx, start);
        assert!(!found.contains(&IVec3::new(6, 0, 5)));
    }
}
