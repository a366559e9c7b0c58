//! Simple kinematic mover
//!
//! [`MoveControl`] receives the follower's wanted position and moves the
//! agent towards it at its movement speed, resolving collisions against the
//! terrain in the crudest way that still lets an agent climb steps and fall
//! off ledges.

use glam::{IVec3, Vec2, Vec3};

use crate::agent::Agent;
use crate::world::{Aabb, MovementActuator, NavWorld};

/// Highest rise an agent can jump onto
const JUMP_HEIGHT: f32 = 1.25;

/// Cells searched below the feet when falling
const MAX_FALL_SCAN: i32 = 16;

/// Vertical speed while falling, in blocks per tick
const FALL_SPEED: f32 = 0.5;

/// Buffers the wanted position until the agent moves
#[derive(Debug, Clone, Default)]
pub struct MoveControl {
    wanted: Option<Vec3>,
    speed_modifier: f32,
}

impl MoveControl {
    /// Create an idle mover
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pending target, if any
    #[must_use]
    pub fn wanted_position(&self) -> Option<Vec3> {
        self.wanted
    }

    /// Speed modifier of the pending target
    #[must_use]
    pub fn speed_modifier(&self) -> f32 {
        self.speed_modifier
    }

    /// Whether a target is waiting to be applied
    #[must_use]
    pub fn has_wanted(&self) -> bool {
        self.wanted.is_some()
    }

    /// Move the agent one tick towards the pending target
    pub fn apply(&mut self, agent: &mut Agent, world: &dyn NavWorld) {
        let Some(wanted) = self.wanted.take() else {
            settle(agent, world);
            return;
        };

        let step = agent.descriptor.movement_speed * self.speed_modifier;
        agent.state.speed = step;

        let pos = agent.state.position;
        let delta = Vec2::new(wanted.x - pos.x, wanted.z - pos.z);
        let horizontal = if delta.length() <= step {
            delta
        } else {
            delta.normalize_or_zero() * step
        };

        let moved = Vec3::new(pos.x + horizontal.x, pos.y, pos.z + horizontal.y);
        if !collides(agent, world, moved) {
            agent.state.position = moved;
        } else {
            let rise = wanted.y - pos.y;
            let lifted = Vec3::new(moved.x, wanted.y, moved.z);
            if rise > 0.0 && rise <= JUMP_HEIGHT && !collides(agent, world, lifted) {
                agent.state.position = lifted;
            }
        }

        settle(agent, world);
    }
}

impl MovementActuator for MoveControl {
    fn set_wanted_position(&mut self, position: Vec3, speed_modifier: f32) {
        self.wanted = Some(position);
        self.speed_modifier = speed_modifier;
    }
}

fn collides(agent: &Agent, world: &dyn NavWorld, feet: Vec3) -> bool {
    let d = &agent.descriptor;
    let volume = Aabb::from_feet(feet, d.width, d.height, d.depth);
    world.intersects(&volume)
}

/// Highest collision top at or below the feet under the agent's footprint
fn ground_below(agent: &Agent, world: &dyn NavWorld, feet: Vec3) -> Option<f32> {
    let d = &agent.descriptor;
    let (lo, hi) = Aabb::from_feet(feet, d.width, d.height, d.depth).cell_range();
    let mut ground: Option<f32> = None;

    for z in lo.z..=hi.z {
        for x in lo.x..=hi.x {
            let mut cell = IVec3::new(x, feet.y.floor() as i32, z);
            for _ in 0..MAX_FALL_SCAN {
                if let Some(top) = world.collision_top(cell) {
                    let surface = cell.y as f32 + top;
                    if surface <= feet.y + 1.0e-4 {
                        ground = Some(ground.map_or(surface, |g| g.max(surface)));
                        break;
                    }
                }
                cell -= IVec3::Y;
            }
        }
    }
    ground
}

/// Apply gravity and refresh the contact flags
fn settle(agent: &mut Agent, world: &dyn NavWorld) {
    let mut pos = agent.state.position;
    let feet_cell = pos.floor().as_ivec3();
    let in_water = world.is_water(feet_cell);

    let ground = ground_below(agent, world, pos);
    let on_ground = match ground {
        Some(surface) if pos.y - surface <= FALL_SPEED => {
            let rested = Vec3::new(pos.x, surface, pos.z);
            if !collides(agent, world, rested) {
                pos = rested;
            }
            (pos.y - surface).abs() < 1.0e-4
        }
        _ if in_water => false,
        _ => {
            pos.y -= FALL_SPEED;
            false
        }
    };

    agent.state.position = pos;
    agent.state.on_ground = on_ground;
    agent.state.in_water = world.is_water(pos.floor().as_ivec3());
    agent.state.in_lava = world.is_lava(pos.floor().as_ivec3());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::AgentDescriptor;
    use crate::world::{Block, VoxelWorld};

    fn walker(pos: Vec3) -> Agent {
        Agent::new(AgentDescriptor::default(), pos)
    }

    #[test]
    fn test_moves_at_speed() {
        let world = VoxelWorld::flat(10, 10);
        let mut agent = walker(Vec3::new(1.5, 0.0, 1.5));
        let mut control = MoveControl::new();

        control.set_wanted_position(Vec3::new(5.5, 0.0, 1.5), 1.0);
        assert!(control.has_wanted());
        control.apply(&mut agent, &world);

        assert!((agent.position().x - 1.75).abs() < 1.0e-5);
        assert_eq!(agent.position().y, 0.0);
        assert!(agent.state.on_ground);
        assert!(!control.has_wanted());
    }

    #[test]
    fn test_snaps_when_close() {
        let world = VoxelWorld::flat(10, 10);
        let mut agent = walker(Vec3::new(1.5, 0.0, 1.5));
        let mut control = MoveControl::new();

        control.set_wanted_position(Vec3::new(1.6, 0.0, 1.5), 1.0);
        control.apply(&mut agent, &world);
        assert!((agent.position().x - 1.6).abs() < 1.0e-5);
    }

    #[test]
    fn test_wall_blocks_movement() {
        let mut world = VoxelWorld::flat(10, 10);
        world.fill(IVec3::new(2, 0, 0), IVec3::new(2, 2, 9), Block::Stone);
        let mut agent = walker(Vec3::new(1.65, 0.0, 1.5));
        let mut control = MoveControl::new();

        control.set_wanted_position(Vec3::new(3.5, 0.0, 1.5), 1.0);
        control.apply(&mut agent, &world);
        assert!((agent.position().x - 1.65).abs() < 1.0e-5);
    }

    #[test]
    fn test_jumps_onto_step() {
        let mut world = VoxelWorld::flat(10, 10);
        world.set_block(IVec3::new(2, 0, 1), Block::Stone);
        let mut agent = walker(Vec3::new(1.65, 0.0, 1.5));
        let mut control = MoveControl::new();

        control.set_wanted_position(Vec3::new(2.5, 1.0, 1.5), 1.0);
        control.apply(&mut agent, &world);
        assert_eq!(agent.position().y, 1.0);
        assert!(agent.state.on_ground);
    }

    #[test]
    fn test_falls_off_ledge() {
        let mut world = VoxelWorld::flat(10, 10);
        world.fill(IVec3::new(0, 0, 0), IVec3::new(1, 1, 9), Block::Stone);
        let mut agent = walker(Vec3::new(1.5, 2.0, 1.5));
        let mut control = MoveControl::new();

        control.set_wanted_position(Vec3::new(5.5, 0.0, 1.5), 1.0);
        for _ in 0..20 {
            control.set_wanted_position(Vec3::new(5.5, 0.0, 1.5), 1.0);
            control.apply(&mut agent, &world);
        }
        assert_eq!(agent.position().y, 0.0);
        assert!(agent.state.on_ground);
    }
}
