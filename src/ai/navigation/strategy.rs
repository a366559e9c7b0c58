//! Movement-mode specific parts of path following
//!
//! A walking agent and an amphibious agent follow paths the same way but
//! differ in when they may replan, which height they measure themselves at,
//! and which evaluator searches for them.

use glam::{IVec3, Vec3};

use crate::agent::Agent;
use crate::ai::pathfinding::{Evaluator, EvaluatorFlags};
use crate::world::NavWorld;

/// Water cells scanned upward when looking for the surface
const MAX_SURFACE_SCAN: i32 = 16;

/// Per-mode hooks used by the path follower
pub trait PathFollowStrategy {
    /// Whether the agent is in a state where it may follow or replan a path
    fn can_update_path(&self, agent: &Agent) -> bool;

    /// Position used for waypoint and stuck checks
    fn temp_agent_pos(&self, world: &dyn NavWorld, agent: &Agent, can_float: bool) -> Vec3;

    /// Height the movement target is placed at
    fn ground_y(&self, world: &dyn NavWorld, pos: Vec3) -> f32;

    /// Whether the agent can move straight from `from` to `to` without waypoints
    fn can_move_directly(&self, world: &dyn NavWorld, agent: &Agent, from: Vec3, to: Vec3)
    -> bool;

    /// Whether an agent could rest at `pos`
    fn is_stable_destination(&self, world: &dyn NavWorld, pos: IVec3) -> bool;

    /// Move a requested target onto something the agent can stand on
    fn adjust_target(&self, world: &dyn NavWorld, pos: IVec3) -> IVec3;

    /// Evaluator that searches for this mode
    fn create_evaluator(&self, flags: EvaluatorFlags) -> Evaluator;
}

/// Walking agents
#[derive(Debug, Clone, Copy, Default)]
pub struct GroundStrategy;

impl GroundStrategy {
    fn surface_y(world: &dyn NavWorld, agent: &Agent, can_float: bool) -> f32 {
        let pos = agent.position();
        if !(agent.state.in_water && can_float) {
            return (pos.y + 0.5).floor();
        }

        let start = agent.block_position();
        let mut cell = start;
        let mut scanned = 0;
        while world.is_water(cell) {
            cell.y += 1;
            scanned += 1;
            if scanned > MAX_SURFACE_SCAN {
                return start.y as f32;
            }
        }
        cell.y as f32
    }
}

impl PathFollowStrategy for GroundStrategy {
    fn can_update_path(&self, agent: &Agent) -> bool {
        agent.state.on_ground || agent.is_in_liquid() || agent.state.passenger
    }

    fn temp_agent_pos(&self, world: &dyn NavWorld, agent: &Agent, can_float: bool) -> Vec3 {
        let pos = agent.position();
        Vec3::new(pos.x, Self::surface_y(world, agent, can_float), pos.z)
    }

    fn ground_y(&self, world: &dyn NavWorld, pos: Vec3) -> f32 {
        let cell = pos.floor().as_ivec3();
        if world.is_air(cell - IVec3::Y) {
            pos.y
        } else {
            world.floor_level(cell)
        }
    }

    fn can_move_directly(
        &self,
        _world: &dyn NavWorld,
        _agent: &Agent,
        _from: Vec3,
        _to: Vec3,
    ) -> bool {
        false
    }

    fn is_stable_destination(&self, world: &dyn NavWorld, pos: IVec3) -> bool {
        world.is_solid(pos - IVec3::Y)
    }

    fn adjust_target(&self, world: &dyn NavWorld, pos: IVec3) -> IVec3 {
        let mut pos = pos;

        if world.is_air(pos) {
            let mut below = pos - IVec3::Y;
            while below.y > world.min_height() && world.is_air(below) {
                below.y -= 1;
            }
            if below.y > world.min_height() {
                return below + IVec3::Y;
            }
            while below.y < world.max_height() && world.is_air(below) {
                below.y += 1;
            }
            pos = below;
        }

        if !world.is_solid(pos) {
            return pos;
        }

        let mut above = pos + IVec3::Y;
        while above.y < world.max_height() && world.is_solid(above) {
            above.y += 1;
        }
        above
    }

    fn create_evaluator(&self, flags: EvaluatorFlags) -> Evaluator {
        Evaluator::walk(flags)
    }
}

/// Agents that walk and swim
#[derive(Debug, Clone, Copy, Default)]
pub struct AmphibiousStrategy;

impl PathFollowStrategy for AmphibiousStrategy {
    fn can_update_path(&self, _agent: &Agent) -> bool {
        true
    }

    fn temp_agent_pos(&self, _world: &dyn NavWorld, agent: &Agent, _can_float: bool) -> Vec3 {
        agent.bounding_box().center()
    }

    fn ground_y(&self, _world: &dyn NavWorld, pos: Vec3) -> f32 {
        pos.y
    }

    fn can_move_directly(&self, world: &dyn NavWorld, agent: &Agent, from: Vec3, to: Vec3) -> bool {
        agent.is_in_liquid()
            && world.line_is_clear(
                from,
                to + Vec3::new(0.0, agent.descriptor.height * 0.5, 0.0),
                false,
            )
    }

    fn is_stable_destination(&self, world: &dyn NavWorld, pos: IVec3) -> bool {
        !world.is_air(pos - IVec3::Y)
    }

    fn adjust_target(&self, _world: &dyn NavWorld, pos: IVec3) -> IVec3 {
        pos
    }

    fn create_evaluator(&self, flags: EvaluatorFlags) -> Evaluator {
        Evaluator::amphibious(flags, false)
    }
}

/// Strategy chosen for a follower
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FollowStrategy {
    /// Walk on ground, swim only at the surface
    #[default]
    Ground,
    /// Walk and swim in every direction
    Amphibious,
}

impl FollowStrategy {
    fn inner(self) -> &'static dyn PathFollowStrategy {
        match self {
            Self::Ground => &GroundStrategy,
            Self::Amphibious => &AmphibiousStrategy,
        }
    }
}

impl PathFollowStrategy for FollowStrategy {
    fn can_update_path(&self, agent: &Agent) -> bool {
        self.inner().can_update_path(agent)
    }

    fn temp_agent_pos(&self, world: &dyn NavWorld, agent: &Agent, can_float: bool) -> Vec3 {
        self.inner().temp_agent_pos(world, agent, can_float)
    }

    fn ground_y(&self, world: &dyn NavWorld, pos: Vec3) -> f32 {
        self.inner().ground_y(world, pos)
    }

    fn can_move_directly(&self, world: &dyn NavWorld, agent: &Agent, from: Vec3, to: Vec3) -> bool {
        self.inner().can_move_directly(world, agent, from, to)
    }

    fn is_stable_destination(&self, world: &dyn NavWorld, pos: IVec3) -> bool {
        self.inner().is_stable_destination(world, pos)
    }

    fn adjust_target(&self, world: &dyn NavWorld, pos: IVec3) -> IVec3 {
        self.inner().adjust_target(world, pos)
    }

    fn create_evaluator(&self, flags: EvaluatorFlags) -> Evaluator {
        self.inner().create_evaluator(flags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::AgentDescriptor;
    use crate::world::{Block, TerrainSampler, VoxelWorld};

    fn agent_at(pos: Vec3) -> Agent {
        Agent::new(AgentDescriptor::default(), pos)
    }

    #[test]
    fn test_ground_can_update_path() {
        let mut agent = agent_at(Vec3::new(1.5, 0.0, 1.5));
        assert!(GroundStrategy.can_update_path(&agent));

        agent.state.on_ground = false;
        assert!(!GroundStrategy.can_update_path(&agent));
        assert!(AmphibiousStrategy.can_update_path(&agent));

        agent.state.in_water = true;
        assert!(GroundStrategy.can_update_path(&agent));
    }

    #[test]
    fn test_ground_temp_pos_rounds_height() {
        let world = VoxelWorld::flat(8, 8);
        let agent = agent_at(Vec3::new(1.5, 0.6, 1.5));
        let pos = GroundStrategy.temp_agent_pos(&world, &agent, false);
        assert_eq!(pos, Vec3::new(1.5, 1.0, 1.5));
    }

    #[test]
    fn test_floating_agent_measures_at_surface() {
        let mut world = VoxelWorld::flat(8, 8);
        world.fill(IVec3::new(2, -3, 2), IVec3::new(4, -1, 4), Block::Water);
        let mut agent = agent_at(Vec3::new(3.5, -2.7, 3.5));
        agent.state.in_water = true;

        assert_eq!(GroundStrategy.temp_agent_pos(&world, &agent, true).y, 0.0);
        assert_eq!(GroundStrategy.temp_agent_pos(&world, &agent, false).y, -3.0);
    }

    #[test]
    fn test_amphibious_temp_pos_is_box_center() {
        let world = VoxelWorld::flat(8, 8);
        let agent = agent_at(Vec3::new(1.5, 0.0, 1.5));
        let pos = AmphibiousStrategy.temp_agent_pos(&world, &agent, false);
        assert!((pos.y - 0.975).abs() < 1.0e-6);
    }

    #[test]
    fn test_ground_y_uses_floor_level() {
        let mut world = VoxelWorld::flat(8, 8);
        world.set_block(IVec3::new(3, 0, 3), Block::Slab);

        assert_eq!(GroundStrategy.ground_y(&world, Vec3::new(3.5, 1.0, 3.5)), 0.5);
        assert_eq!(GroundStrategy.ground_y(&world, Vec3::new(1.5, 0.0, 1.5)), 0.0);
        // Nothing below: keep the requested height
        assert_eq!(GroundStrategy.ground_y(&world, Vec3::new(1.5, 5.0, 1.5)), 5.0);
        assert_eq!(AmphibiousStrategy.ground_y(&world, Vec3::new(3.5, 1.0, 3.5)), 1.0);
    }

    #[test]
    fn test_adjust_target_snaps_to_ground() {
        let mut world = VoxelWorld::flat(8, 8);
        world.fill(IVec3::new(5, 0, 5), IVec3::new(5, 2, 5), Block::Stone);

        assert_eq!(
            GroundStrategy.adjust_target(&world, IVec3::new(2, 6, 2)),
            IVec3::new(2, 0, 2)
        );
        assert_eq!(
            GroundStrategy.adjust_target(&world, IVec3::new(5, 1, 5)),
            IVec3::new(5, 3, 5)
        );
        assert_eq!(
            GroundStrategy.adjust_target(&world, IVec3::new(2, 0, 2)),
            IVec3::new(2, 0, 2)
        );
        assert_eq!(
            AmphibiousStrategy.adjust_target(&world, IVec3::new(2, 6, 2)),
            IVec3::new(2, 6, 2)
        );
    }

    #[test]
    fn test_adjust_target_over_void_goes_up() {
        let world = VoxelWorld::new(IVec3::new(0, -4, 0), IVec3::new(8, 20, 8));
        let pos = GroundStrategy.adjust_target(&world, IVec3::new(2, 3, 2));
        assert_eq!(pos.y, world.max_height());
    }

    #[test]
    fn test_stable_destination() {
        let mut world = VoxelWorld::flat(8, 8);
        world.set_block(IVec3::new(4, -1, 4), Block::Water);

        assert!(GroundStrategy.is_stable_destination(&world, IVec3::new(2, 0, 2)));
        assert!(!GroundStrategy.is_stable_destination(&world, IVec3::new(4, 0, 4)));
        assert!(AmphibiousStrategy.is_stable_destination(&world, IVec3::new(4, 0, 4)));
        assert!(!AmphibiousStrategy.is_stable_destination(&world, IVec3::new(2, 3, 2)));
    }

    #[test]
    fn test_amphibious_direct_movement_needs_liquid() {
        let world = VoxelWorld::flat(8, 8);
        let mut agent = agent_at(Vec3::new(1.5, 0.0, 1.5));
        let from = Vec3::new(1.5, 0.5, 1.5);
        let to = Vec3::new(4.5, 0.0, 1.5);

        assert!(!AmphibiousStrategy.can_move_directly(&world, &agent, from, to));
        agent.state.in_water = true;
        assert!(AmphibiousStrategy.can_move_directly(&world, &agent, from, to));
        assert!(!GroundStrategy.can_move_directly(&world, &agent, from, to));
    }

    #[test]
    fn test_enum_dispatch() {
        let agent = agent_at(Vec3::new(1.5, 0.0, 1.5));
        let flags = EvaluatorFlags::from_agent(&agent);
        assert!(matches!(
            FollowStrategy::Ground.create_evaluator(flags),
            Evaluator::Walk(_)
        ));
        assert!(matches!(
            FollowStrategy::Amphibious.create_evaluator(flags),
            Evaluator::Amphibious(_)
        ));
    }
}
