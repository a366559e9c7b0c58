//! World wrapper around hecs

use hecs::Entity;

use super::components::{Name, NavLog};
use super::systems;
use crate::agent::Agent;
use crate::ai::{MoveControl, PathNavigation};
use crate::core::NavEvent;
use crate::world::NavWorld;

/// Entities that navigate, plus the systems that drive them
pub struct AgentWorld {
    /// The underlying hecs world
    pub inner: hecs::World,
}

impl AgentWorld {
    /// Create a new empty world
    pub fn new() -> Self {
        Self {
            inner: hecs::World::new(),
        }
    }

    /// Spawn an entity with the given components
    pub fn spawn(&mut self, components: impl hecs::DynamicBundle) -> Entity {
        self.inner.spawn(components)
    }

    /// Spawn an agent with its follower, a mover and an event log
    pub fn spawn_navigator(
        &mut self,
        name: impl Into<String>,
        agent: Agent,
        navigation: PathNavigation,
    ) -> Entity {
        self.inner.spawn((
            Name::new(name),
            agent,
            navigation,
            MoveControl::new(),
            NavLog::new(),
        ))
    }

    /// Despawn an entity
    pub fn despawn(&mut self, entity: Entity) -> Result<(), hecs::NoSuchEntity> {
        self.inner.despawn(entity)
    }

    /// Get a reference to a component
    pub fn get<T: hecs::Component>(
        &self,
        entity: Entity,
    ) -> Result<hecs::Ref<'_, T>, hecs::ComponentError> {
        self.inner.get::<&T>(entity)
    }

    /// Get a mutable reference to a component
    pub fn get_mut<T: hecs::Component>(
        &mut self,
        entity: Entity,
    ) -> Result<hecs::RefMut<'_, T>, hecs::ComponentError> {
        self.inner.get::<&mut T>(entity)
    }

    /// Check if an entity exists
    pub fn contains(&self, entity: Entity) -> bool {
        self.inner.contains(entity)
    }

    /// Get the number of entities
    pub fn len(&self) -> u32 {
        self.inner.len()
    }

    /// Check if the world is empty
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Query for entities with specific components (mutable)
    pub fn query_mut<Q: hecs::Query>(&mut self) -> hecs::QueryMut<'_, Q> {
        self.inner.query_mut::<Q>()
    }

    /// Run one navigation tick against `terrain`
    ///
    /// Followers tick, agents move, then each entity's [`NavLog`] is refilled
    /// with the events raised during this tick.
    pub fn tick(&mut self, terrain: &dyn NavWorld) {
        systems::tick_navigation(&mut self.inner, terrain);
        systems::collect_events(&mut self.inner);
    }

    /// Events raised during the last tick, by entity name
    pub fn events(&self) -> Vec<(String, NavEvent)> {
        let mut query = self.inner.query::<(&Name, &NavLog)>();
        query
            .iter()
            .flat_map(|(_, (name, log))| {
                log.events
                    .iter()
                    .map(move |event| (name.0.clone(), event.clone()))
            })
            .collect()
    }

    /// Whether every follower has finished or given up
    pub fn all_idle(&mut self) -> bool {
        self.inner
            .query_mut::<&PathNavigation>()
            .into_iter()
            .all(|(_, navigation)| navigation.is_done())
    }
}

impl Default for AgentWorld {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::AgentDescriptor;
    use crate::world::VoxelWorld;
    use glam::{IVec3, Vec3};

    #[test]
    fn test_spawn_navigator() {
        let terrain = VoxelWorld::flat(16, 16);
        let mut world = AgentWorld::new();
        let agent = Agent::new(AgentDescriptor::default(), Vec3::new(1.5, 0.0, 1.5));
        let mut navigation = PathNavigation::ground(&agent);
        assert!(navigation.move_to_pos(&terrain, &agent, IVec3::new(6, 0, 1), 1.0));

        let entity = world.spawn_navigator("walker", agent, navigation);
        assert!(world.contains(entity));
        assert_eq!(world.len(), 1);
        assert!(world.get::<MoveControl>(entity).is_ok());
        assert_eq!(world.get::<Name>(entity).unwrap().0, "walker");
        assert!(!world.all_idle());
    }

    #[test]
    fn test_tick_until_idle() {
        let terrain = VoxelWorld::flat(16, 16);
        let mut world = AgentWorld::new();
        let agent = Agent::new(AgentDescriptor::default(), Vec3::new(1.5, 0.0, 1.5));
        let mut navigation = PathNavigation::ground(&agent);
        assert!(navigation.move_to_pos(&terrain, &agent, IVec3::new(6, 0, 4), 1.0));
        world.spawn_navigator("walker", agent, navigation);

        let mut finished = false;
        for _ in 0..100 {
            world.tick(&terrain);
            if world
                .events()
                .iter()
                .any(|(_, e)| matches!(e, NavEvent::PathFinished { .. }))
            {
                finished = true;
            }
            if world.all_idle() {
                break;
            }
        }
        assert!(finished);
        assert!(world.all_idle());
    }

    #[test]
    fn test_get_mut_and_query_mut() {
        let terrain = VoxelWorld::flat(16, 16);
        let mut world = AgentWorld::new();
        let agent = Agent::new(AgentDescriptor::default(), Vec3::new(1.5, 0.0, 1.5));
        let navigation = PathNavigation::ground(&agent);
        let entity = world.spawn_navigator("walker", agent, navigation);

        world.get_mut::<Agent>(entity).unwrap().state.position = Vec3::new(4.5, 0.0, 4.5);
        {
            let mut navigation = world.get_mut::<PathNavigation>(entity).unwrap();
            let agent = Agent::new(AgentDescriptor::default(), Vec3::new(4.5, 0.0, 4.5));
            assert!(navigation.move_to_pos(&terrain, &agent, IVec3::new(9, 0, 4), 1.0));
        }

        let positions: Vec<_> = world
            .query_mut::<(&Name, &Agent)>()
            .into_iter()
            .map(|(_, (name, agent))| (name.0.clone(), agent.position()))
            .collect();
        assert_eq!(positions, vec![("walker".to_string(), Vec3::new(4.5, 0.0, 4.5))]);
        assert!(!world.all_idle());
    }

    #[test]
    fn test_despawn() {
        let mut world = AgentWorld::new();
        let entity = world.spawn((Name::new("marker"),));
        assert!(world.despawn(entity).is_ok());
        assert!(world.is_empty());
        assert!(world.despawn(entity).is_err());
    }
}
