//! Systems driving navigation inside a `hecs` world

use hecs::Entity;

use super::components::NavLog;
use crate::agent::Agent;
use crate::ai::{MoveControl, PathNavigation};
use crate::core::NavEvent;
use crate::world::NavWorld;

/// Tick every follower, then move its agent
///
/// Entities need an [`Agent`], a [`PathNavigation`] and a [`MoveControl`].
/// Followers see the agent as it was at the start of the tick.
pub fn tick_navigation(world: &mut hecs::World, terrain: &dyn NavWorld) {
    for (_, (agent, navigation, control)) in
        world.query_mut::<(&mut Agent, &mut PathNavigation, &mut MoveControl)>()
    {
        navigation.tick(terrain, agent, control);
        control.apply(agent, terrain);
    }
}

/// Move pending follower events into each entity's [`NavLog`]
///
/// Entities without a log keep their events queued.
pub fn collect_events(world: &mut hecs::World) {
    for (_, (navigation, log)) in world.query_mut::<(&mut PathNavigation, &mut NavLog)>() {
        log.events.clear();
        log.events.extend(navigation.events_mut().drain());
    }
}

/// Drain the events of every follower, tagged with their entity
pub fn drain_events(world: &mut hecs::World) -> Vec<(Entity, NavEvent)> {
    let mut drained = Vec::new();
    for (entity, navigation) in world.query_mut::<&mut PathNavigation>() {
        drained.extend(navigation.events_mut().drain().map(|event| (entity, event)));
    }
    drained
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::AgentDescriptor;
    use crate::world::VoxelWorld;
    use glam::{IVec3, Vec3};

    fn spawn_walker(world: &mut hecs::World, terrain: &VoxelWorld, pos: Vec3, goal: IVec3) -> Entity {
        let agent = Agent::new(AgentDescriptor::default(), pos);
        let mut navigation = PathNavigation::ground(&agent);
        assert!(navigation.move_to_pos(terrain, &agent, goal, 1.0));
        world.spawn((agent, navigation, MoveControl::new(), NavLog::new()))
    }

    #[test]
    fn test_tick_moves_agents() {
        let terrain = VoxelWorld::flat(16, 16);
        let mut world = hecs::World::new();
        let walker = spawn_walker(&mut world, &terrain, Vec3::new(1.5, 0.0, 1.5), IVec3::new(8, 0, 1));

        for _ in 0..5 {
            tick_navigation(&mut world, &terrain);
        }

        let agent = world.get::<&Agent>(walker).unwrap();
        assert!(agent.position().x > 2.0);
        assert_eq!(agent.position().y, 0.0);
    }

    #[test]
    fn test_drain_events_tags_entities() {
        let terrain = VoxelWorld::flat(16, 16);
        let mut world = hecs::World::new();
        let a = spawn_walker(&mut world, &terrain, Vec3::new(1.5, 0.0, 1.5), IVec3::new(8, 0, 1));
        let b = spawn_walker(&mut world, &terrain, Vec3::new(1.5, 0.0, 9.5), IVec3::new(8, 0, 9));

        let events = drain_events(&mut world);
        assert_eq!(events.len(), 2);
        assert!(events.iter().any(|(e, _)| *e == a));
        assert!(events.iter().any(|(e, _)| *e == b));
        assert!(drain_events(&mut world).is_empty());
    }

    #[test]
    fn test_collect_events_into_log() {
        let terrain = VoxelWorld::flat(16, 16);
        let mut world = hecs::World::new();
        let walker = spawn_walker(&mut world, &terrain, Vec3::new(1.5, 0.0, 1.5), IVec3::new(4, 0, 1));

        collect_events(&mut world);
        {
            let log = world.get::<&NavLog>(walker).unwrap();
            assert!(matches!(log.events[0], NavEvent::PathStarted { .. }));
        }

        let mut finished = false;
        for _ in 0..60 {
            tick_navigation(&mut world, &terrain);
            collect_events(&mut world);
            let log = world.get::<&NavLog>(walker).unwrap();
            if log.events.contains(&NavEvent::PathFinished { reached_target: true }) {
                finished = true;
                break;
            }
        }
        assert!(finished);
    }
}
