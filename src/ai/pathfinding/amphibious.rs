//! Agents that walk and swim
//!
//! Water is cheap, dry land is costly, and swimming adds straight up/down
//! moves between water cells.

use glam::IVec3;

use super::PathType;
use super::evaluator::{Direction, EvalContext, EvaluatorFlags, Neighbors, NodeEvaluator};
use super::node::{NodeArena, NodeId};
use super::walk::WalkNodeEvaluator;

/// Session costs while swimming is allowed
const WATER_MALUS: f32 = 0.0;
const WALKABLE_MALUS: f32 = 6.0;
const WATER_BORDER_MALUS: f32 = 4.0;

/// Depth below sea level at which shallow swimmers start paying extra
const SHALLOW_DEPTH: i32 = 10;

/// Evaluator for agents equally at home in water and on land
#[derive(Debug)]
pub struct AmphibiousNodeEvaluator {
    walk: WalkNodeEvaluator,
    prefers_shallow_swimming: bool,
}

impl AmphibiousNodeEvaluator {
    /// Create an amphibious evaluator
    #[must_use]
    pub fn new(flags: EvaluatorFlags, prefers_shallow_swimming: bool) -> Self {
        Self {
            walk: WalkNodeEvaluator::new_amphibious(flags),
            prefers_shallow_swimming,
        }
    }

    fn is_vertical_neighbor_valid(&self, candidate: NodeId, node: NodeId) -> bool {
        self.walk.is_neighbor_valid(candidate, node)
            && self.walk.nodes().get(candidate).path_type == PathType::Water
    }
}

impl NodeEvaluator for AmphibiousNodeEvaluator {
    fn prepare(&mut self, ctx: &EvalContext<'_>) {
        self.walk.prepare(ctx);
        self.walk.set_malus_override(PathType::Water, WATER_MALUS);
        self.walk.set_malus_override(PathType::Walkable, WALKABLE_MALUS);
        self.walk.set_malus_override(PathType::WaterBorder, WATER_BORDER_MALUS);
    }

    fn done(&mut self) {
        self.walk.clear_malus_overrides();
        self.walk.done();
    }

    fn start(&mut self, ctx: &EvalContext<'_>) -> Option<NodeId> {
        if !ctx.agent.state.in_water {
            return self.walk.start(ctx);
        }

        let bounds = ctx.agent.bounding_box();
        let pos = IVec3::new(
            bounds.min.x.floor() as i32,
            (bounds.min.y + 0.5).floor() as i32,
            bounds.min.z.floor() as i32,
        );
        if pos.y < ctx.world.min_height() {
            return None;
        }
        Some(self.walk.start_node(ctx, pos))
    }

    fn neighbors(&mut self, ctx: &EvalContext<'_>, id: NodeId, out: &mut Neighbors) {
        let first = out.len();
        self.walk.neighbors(ctx, id, out);

        let pos = self.walk.nodes().get(id).pos;
        let (budget, current) = self.walk.step_budget(ctx, pos);
        let floor = self.walk.floor_level(ctx, pos);

        let up = self.walk.find_accepted_node(
            ctx,
            pos + IVec3::Y,
            (budget - 1).max(0),
            floor,
            Direction::Up,
            current,
        );
        let down = self.walk.find_accepted_node(
            ctx,
            pos - IVec3::Y,
            budget,
            floor,
            Direction::Down,
            current,
        );

        if let Some(up) = up
            && self.is_vertical_neighbor_valid(up, id)
        {
            out.push(up);
        }
        if let Some(down) = down
            && self.is_vertical_neighbor_valid(down, id)
            && current != PathType::Trapdoor
        {
            out.push(down);
        }

        if self.prefers_shallow_swimming {
            let deep = ctx.world.sea_level() - SHALLOW_DEPTH;
            for &neighbor in &out[first..] {
                let node = self.walk.nodes_mut().get_mut(neighbor);
                if node.path_type == PathType::Water && node.pos.y < deep {
                    node.cost_malus += 1.0;
                }
            }
        }
    }

    fn path_type(&mut self, ctx: &EvalContext<'_>, pos: IVec3) -> PathType {
        self.walk.path_type(ctx, pos)
    }

    fn nodes(&self) -> &NodeArena {
        self.walk.nodes()
    }

    fn nodes_mut(&mut self) -> &mut NodeArena {
        self.walk.nodes_mut()
    }

    fn flags(&self) -> &EvaluatorFlags {
        self.walk.flags()
    }

    fn flags_mut(&mut self) -> &mut EvaluatorFlags {
        self.walk.flags_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{Agent, AgentDescriptor};
    use crate::world::{Block, VoxelWorld};
    use glam::Vec3;

    /// Stone ground with a 7x7 pool, five deep, whose surface is at y = -1
    fn pool() -> VoxelWorld {
        let mut world = VoxelWorld::new(IVec3::new(0, -8, 0), IVec3::new(12, 24, 12));
        world.fill(IVec3::new(0, -8, 0), IVec3::new(11, -1, 11), Block::Stone);
        world.fill(IVec3::new(3, -5, 3), IVec3::new(9, -1, 9), Block::Water);
        world
    }

    fn swimmer(pos: Vec3) -> Agent {
        let mut agent = Agent::new(AgentDescriptor::default().with_size(0.9, 0.6, 0.9), pos);
        agent.state.in_water = true;
        agent.state.on_ground = false;
        agent
    }

    #[test]
    fn test_session_overrides() {
        let world = pool();
        let agent = swimmer(Vec3::new(6.5, -3.0, 6.5));
        let ctx = EvalContext::new(&world, &agent);
        let mut evaluator = AmphibiousNodeEvaluator::new(EvaluatorFlags::default(), false);

        evaluator.prepare(&ctx);
        assert_eq!(evaluator.walk.malus(&ctx, PathType::Water), 0.0);
        assert_eq!(evaluator.walk.malus(&ctx, PathType::Walkable), 6.0);

        evaluator.done();
        assert_eq!(evaluator.walk.malus(&ctx, PathType::Water), 8.0);
    }

    #[test]
    fn test_swims_up_and_down() {
        let world = pool();
        let agent = swimmer(Vec3::new(6.5, -3.0, 6.5));
        let ctx = EvalContext::new(&world, &agent);
        let mut evaluator = AmphibiousNodeEvaluator::new(EvaluatorFlags::default(), false);
        evaluator.prepare(&ctx);

        let start = evaluator.start(&ctx).unwrap();
        assert_eq!(evaluator.nodes().get(start).pos, IVec3::new(6, -3, 6));
        assert_eq!(evaluator.nodes().get(start).path_type, PathType::Water);

        let mut out = Neighbors::new();
        evaluator.neighbors(&ctx, start, &mut out);
        let found: Vec<_> = out.iter().map(|n| evaluator.nodes().get(*n).pos).collect();
        assert!(found.contains(&IVec3::new(6, -2, 6)));
        assert!(found.contains(&IVec3::new(6, -4, 6)));
        assert!(found.contains(&IVec3::new(7, -3, 6)));
    }

    #[test]
    fn test_shallow_swimmers_pay_for_depth() {
        let world = pool().with_sea_level(10);
        let agent = swimmer(Vec3::new(6.5, -3.0, 6.5));
        let ctx = EvalContext::new(&world, &agent);
        let mut evaluator = AmphibiousNodeEvaluator::new(EvaluatorFlags::default(), true);
        evaluator.prepare(&ctx);

        let start = evaluator.start(&ctx).unwrap();
        let mut out = Neighbors::new();
        evaluator.neighbors(&ctx, start, &mut out);
        let deeper = out
            .iter()
            .map(|n| evaluator.nodes().get(*n))
            .find(|n| n.pos == IVec3::new(6, -4, 6))
            .unwrap();
        assert_eq!(deeper.cost_malus, 1.0);
    }
}
