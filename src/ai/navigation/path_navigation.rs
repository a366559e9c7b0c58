//! Tick-driven path following
//!
//! [`PathNavigation`] owns a [`PathFinder`] and the path currently being
//! followed. Every tick it advances the waypoint cursor when the agent gets
//! close enough, watches for lack of progress, and hands the next waypoint to
//! a [`MovementActuator`].
//!
//! ```text
//!   Idle ──move_to──▶ Following ──last waypoint passed──▶ Idle
//!                         │
//!                         ├── stuck / timed out ──▶ Idle (event)
//!                         └── recompute ──▶ Following (new path)
//! ```
//!
//! Failures are never errors: they show up as `None` paths, `is_stuck()` and
//! [`NavEvent`]s in the follower's queue.

use glam::{IVec3, Vec3};

use super::strategy::{FollowStrategy, PathFollowStrategy};
use crate::agent::Agent;
use crate::ai::pathfinding::{EvaluatorFlags, NodeEvaluator, Path, PathFinder, PathNode};
use crate::core::{EventQueue, NavEvent, NavigationConfig, SearchStats};
use crate::world::{MovementActuator, NavWorld};

/// Ticks per second, used to turn a travel estimate into ticks
const TICKS_PER_SECOND: f32 = 20.0;

/// Lookahead window for corner cutting, squared
const CORNER_CUT_RANGE_SQ: f32 = 4.0;

/// Follows paths for one agent
#[derive(Debug)]
pub struct PathNavigation {
    strategy: FollowStrategy,
    finder: PathFinder,
    config: NavigationConfig,
    events: EventQueue,

    path: Option<Path>,
    speed_modifier: f32,
    tick: u64,
    max_visited_nodes_multiplier: f32,

    // Target of the last successful search
    target_pos: Option<IVec3>,
    reach_range: i32,

    time_last_recompute: Option<u64>,
    has_delayed_recomputation: bool,

    // Stuck detection
    last_stuck_check: u64,
    last_stuck_check_pos: Vec3,
    is_stuck: bool,

    // Waypoint timeout
    timeout_cached_node: Option<IVec3>,
    timeout_timer: u64,
    last_timeout_check: u64,
    timeout_limit: f32,

    max_distance_to_waypoint: f32,
}

impl PathNavigation {
    /// Create a follower for `agent`, taking its capabilities from the descriptor
    #[must_use]
    pub fn new(strategy: FollowStrategy, agent: &Agent, config: NavigationConfig) -> Self {
        let range = agent.descriptor.follow_range.max(config.required_path_length);
        let evaluator = strategy.create_evaluator(EvaluatorFlags::from_agent(agent));
        let finder = PathFinder::new(evaluator, config.visited_nodes_for_range(range))
            .with_heuristic_fudge(config.heuristic_fudge);

        Self {
            strategy,
            finder,
            max_visited_nodes_multiplier: config.search_depth_multiplier,
            config,
            events: EventQueue::new(),
            path: None,
            speed_modifier: 0.0,
            tick: 0,
            target_pos: None,
            reach_range: 0,
            time_last_recompute: None,
            has_delayed_recomputation: false,
            last_stuck_check: 0,
            last_stuck_check_pos: Vec3::ZERO,
            is_stuck: false,
            timeout_cached_node: None,
            timeout_timer: 0,
            last_timeout_check: 0,
            timeout_limit: 0.0,
            max_distance_to_waypoint: 0.5,
        }
    }

    /// Walking follower with default tuning
    #[must_use]
    pub fn ground(agent: &Agent) -> Self {
        Self::new(FollowStrategy::Ground, agent, NavigationConfig::default())
    }

    /// Amphibious follower with default tuning
    #[must_use]
    pub fn amphibious(agent: &Agent) -> Self {
        Self::new(FollowStrategy::Amphibious, agent, NavigationConfig::default())
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Path being followed, if any
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_ref()
    }

    /// No path, or every waypoint passed
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.path.as_ref().is_none_or(Path::is_done)
    }

    /// Following a path
    #[must_use]
    pub fn is_in_progress(&self) -> bool {
        !self.is_done()
    }

    /// The last stuck check failed
    #[must_use]
    pub fn is_stuck(&self) -> bool {
        self.is_stuck
    }

    /// Drop the current path
    pub fn stop(&mut self) {
        self.path = None;
    }

    /// Target of the last successful search
    #[must_use]
    pub fn target_pos(&self) -> Option<IVec3> {
        self.target_pos
    }

    /// Horizontal distance at which the next waypoint counts as passed
    #[must_use]
    pub fn max_distance_to_waypoint(&self) -> f32 {
        self.max_distance_to_waypoint
    }

    /// Ticks processed
    #[must_use]
    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    /// Tuning knobs
    #[must_use]
    pub fn config(&self) -> &NavigationConfig {
        &self.config
    }

    /// Movement mode
    #[must_use]
    pub fn strategy(&self) -> FollowStrategy {
        self.strategy
    }

    /// Search statistics
    #[must_use]
    pub fn search_stats(&self) -> &SearchStats {
        self.finder.stats()
    }

    /// Pending events
    #[must_use]
    pub fn events(&self) -> &EventQueue {
        &self.events
    }

    /// Pending events, for draining
    pub fn events_mut(&mut self) -> &mut EventQueue {
        &mut self.events
    }

    /// Whether an agent could rest at `pos`
    #[must_use]
    pub fn is_stable_destination(&self, world: &dyn NavWorld, pos: IVec3) -> bool {
        self.strategy.is_stable_destination(world, pos)
    }

    /// Set the speed modifier of the current path
    pub fn set_speed_modifier(&mut self, speed_modifier: f32) {
        self.speed_modifier = speed_modifier;
    }

    /// Scale the node budget of subsequent searches
    pub fn set_max_visited_nodes_multiplier(&mut self, multiplier: f32) {
        self.max_visited_nodes_multiplier = multiplier;
    }

    /// Restore the configured node budget multiplier
    pub fn reset_max_visited_nodes_multiplier(&mut self) {
        self.max_visited_nodes_multiplier = self.config.search_depth_multiplier;
    }

    /// Allow swimming up / staying on the water surface
    pub fn set_can_float(&mut self, can_float: bool) {
        self.finder.evaluator_mut().flags_mut().can_float = can_float;
    }

    /// Allow opening wooden doors
    pub fn set_can_open_doors(&mut self, can_open: bool) {
        self.finder.evaluator_mut().flags_mut().can_open_doors = can_open;
    }

    /// Allow walking through open doors
    pub fn set_can_pass_doors(&mut self, can_pass: bool) {
        self.finder.evaluator_mut().flags_mut().can_pass_doors = can_pass;
    }

    /// Allow climbing fences
    pub fn set_can_walk_over_fences(&mut self, can_walk: bool) {
        self.finder.evaluator_mut().flags_mut().can_walk_over_fences = can_walk;
    }

    fn can_float(&self) -> bool {
        self.finder.evaluator().flags().can_float
    }

    fn temp_agent_pos(&self, world: &dyn NavWorld, agent: &Agent) -> Vec3 {
        self.strategy.temp_agent_pos(world, agent, self.can_float())
    }

    // ========================================================================
    // Path creation
    // ========================================================================

    /// Search a path to the closest of `targets`
    ///
    /// Returns the current path unchanged when it is unfinished and already
    /// aims at one of the targets.
    pub fn create_path(
        &mut self,
        world: &dyn NavWorld,
        agent: &Agent,
        targets: &[IVec3],
        accuracy: i32,
    ) -> Option<Path> {
        if targets.is_empty()
            || agent.position().y < world.min_height() as f32
            || !self.strategy.can_update_path(agent)
        {
            return None;
        }

        if let Some(path) = &self.path
            && !path.is_done()
            && self.target_pos.is_some_and(|t| targets.contains(&t))
        {
            return Some(path.clone());
        }

        let max_range = agent
            .descriptor
            .follow_range
            .max(self.config.required_path_length);
        self.finder
            .set_max_visited_nodes(self.config.visited_nodes_for_range(max_range));

        let path = self.finder.find_path(
            world,
            agent,
            targets,
            max_range,
            accuracy,
            self.max_visited_nodes_multiplier,
        )?;

        self.target_pos = Some(path.target());
        self.reach_range = accuracy;
        self.reset_stuck_timeout();
        Some(path)
    }

    /// Search a path to one position, snapped to something standable
    pub fn create_path_to(
        &mut self,
        world: &dyn NavWorld,
        agent: &Agent,
        pos: IVec3,
        accuracy: i32,
    ) -> Option<Path> {
        let target = self.strategy.adjust_target(world, pos);
        self.create_path(world, agent, &[target], accuracy)
    }

    /// Search a path to the cell holding an entity's feet
    pub fn create_path_to_entity(
        &mut self,
        world: &dyn NavWorld,
        agent: &Agent,
        entity_pos: Vec3,
        accuracy: i32,
    ) -> Option<Path> {
        self.create_path_to(world, agent, entity_pos.floor().as_ivec3(), accuracy)
    }

    // ========================================================================
    // Path adoption
    // ========================================================================

    /// Start following `path`
    ///
    /// `None` clears the current path. Passing the path that is already being
    /// followed (same identity) changes nothing. Returns whether the agent is
    /// now following a path.
    pub fn move_to(
        &mut self,
        world: &dyn NavWorld,
        agent: &Agent,
        path: Option<Path>,
        speed_modifier: f32,
    ) -> bool {
        let Some(path) = path else {
            self.path = None;
            return false;
        };

        if self.path.as_ref().is_some_and(|p| p.id() == path.id()) {
            return self.is_in_progress();
        }

        self.path = Some(path);
        if self.is_done() {
            return false;
        }

        self.trim_path(world);
        let Some(path) = &self.path else {
            return false;
        };
        let Some(end) = path.end_node() else {
            return false;
        };

        let started = NavEvent::PathStarted {
            destination: end.pos,
            nodes: path.node_count(),
            reaches_target: path.can_reach(),
        };
        log::debug!(
            "following {} waypoints towards {} (reaches target: {})",
            path.node_count(),
            path.target(),
            path.can_reach()
        );

        self.speed_modifier = speed_modifier;
        self.last_stuck_check = self.tick;
        self.last_stuck_check_pos = self.temp_agent_pos(world, agent);
        self.timeout_cached_node = None;
        self.timeout_timer = 0;
        self.timeout_limit = 0.0;
        self.last_timeout_check = self.tick;
        self.events.push(started);
        true
    }

    /// Search a path to `pos` and follow it
    pub fn move_to_pos(
        &mut self,
        world: &dyn NavWorld,
        agent: &Agent,
        pos: IVec3,
        speed_modifier: f32,
    ) -> bool {
        let path = self.create_path_to(world, agent, pos, self.config.default_accuracy);
        self.move_to(world, agent, path, speed_modifier)
    }

    /// Search a path to the closest of `targets` and follow it
    pub fn move_to_targets(
        &mut self,
        world: &dyn NavWorld,
        agent: &Agent,
        targets: &[IVec3],
        speed_modifier: f32,
    ) -> bool {
        let path = self.create_path(world, agent, targets, self.config.default_accuracy);
        self.move_to(world, agent, path, speed_modifier)
    }

    /// Search a path to an entity and follow it
    pub fn move_to_entity(
        &mut self,
        world: &dyn NavWorld,
        agent: &Agent,
        entity_pos: Vec3,
        speed_modifier: f32,
    ) -> bool {
        let path = self.create_path_to_entity(world, agent, entity_pos, self.config.default_accuracy);
        self.move_to(world, agent, path, speed_modifier)
    }

    /// Lift waypoints resting on raised surfaces
    fn trim_path(&mut self, world: &dyn NavWorld) {
        let Some(path) = &mut self.path else {
            return;
        };

        for i in 0..path.node_count() {
            let Some(node) = path.node(i).copied() else {
                break;
            };
            if !world.is_raised_surface(node.pos) {
                continue;
            }

            let next = path.node(i + 1).copied();
            path.replace_node(i, node.moved_to(node.pos + IVec3::Y));
            if let Some(next) = next
                && node.pos.y >= next.pos.y
            {
                let lifted = IVec3::new(next.pos.x, node.pos.y + 1, next.pos.z);
                path.replace_node(i + 1, node.moved_to(lifted));
            }
        }
    }

    // ========================================================================
    // Recomputation
    // ========================================================================

    /// Replace the path with a fresh search towards the stored target
    ///
    /// Debounced: within the cooldown the request is remembered and retried
    /// on the next tick.
    pub fn recompute_path(&mut self, world: &dyn NavWorld, agent: &Agent) {
        let cooled_down = self
            .time_last_recompute
            .is_none_or(|last| self.tick - last > self.config.recompute_cooldown);

        if !cooled_down {
            self.has_delayed_recomputation = true;
            return;
        }

        if let Some(target) = self.target_pos {
            self.path = None;
            self.path = self.create_path(world, agent, &[target], self.reach_range);
            self.time_last_recompute = Some(self.tick);
            self.has_delayed_recomputation = false;

            let found = self.path.is_some();
            log::debug!("recomputed path towards {target} (found: {found})");
            self.events.push(NavEvent::PathRecomputed { found });
        }
    }

    /// Whether a change at `pos` is close enough to the remaining route to matter
    #[must_use]
    pub fn should_recompute_path(&self, agent: &Agent, pos: IVec3) -> bool {
        if self.has_delayed_recomputation {
            return false;
        }
        let Some(path) = &self.path else {
            return false;
        };
        let Some(end) = path.end_node() else {
            return false;
        };
        if path.is_done() {
            return false;
        }

        let midpoint = (end.pos.as_vec3() + agent.position()) * 0.5;
        let remaining = (path.node_count() - path.next_node_index()) as f32;
        (pos.as_vec3() + Vec3::splat(0.5)).distance_squared(midpoint) < remaining * remaining
    }

    // ========================================================================
    // Tick
    // ========================================================================

    /// Advance the follower by one tick
    pub fn tick(
        &mut self,
        world: &dyn NavWorld,
        agent: &Agent,
        actuator: &mut dyn MovementActuator,
    ) {
        self.tick += 1;

        if self.has_delayed_recomputation {
            self.recompute_path(world, agent);
        }

        if self.is_done() {
            return;
        }

        if self.strategy.can_update_path(agent) {
            self.follow_the_path(world, agent);
        } else {
            self.passive_advance(world, agent);
        }

        let width = agent.descriptor.width;
        let Some(path) = &self.path else {
            return;
        };
        if path.is_done() {
            log::debug!("path finished (reached target: {})", path.can_reach());
            self.events.push(NavEvent::PathFinished {
                reached_target: path.can_reach(),
            });
            return;
        }

        let next = path.next_node_index();
        let index = if agent.state.sprinting && next + 1 < path.node_count() {
            next + 1
        } else {
            next
        };
        if let Some(target) = path.entity_pos_at_node(width, index) {
            let y = self.strategy.ground_y(world, target);
            actuator.set_wanted_position(Vec3::new(target.x, y, target.z), self.speed_modifier);
        }
    }

    /// Falling or riding agents drop onto waypoints below them
    fn passive_advance(&mut self, world: &dyn NavWorld, agent: &Agent) {
        let pos = self.temp_agent_pos(world, agent);
        let Some(path) = &mut self.path else {
            return;
        };
        let Some(next) = path.next_entity_pos(agent.descriptor.width) else {
            return;
        };

        if pos.y > next.y
            && !agent.state.on_ground
            && pos.x.floor() == next.x.floor()
            && pos.z.floor() == next.z.floor()
        {
            path.advance();
        }
    }

    fn follow_the_path(&mut self, world: &dyn NavWorld, agent: &Agent) {
        let temp = self.temp_agent_pos(world, agent);
        let width = agent.descriptor.width;
        self.max_distance_to_waypoint = if width > 0.75 {
            width / 2.0
        } else {
            0.75 - width / 2.0
        };

        let Some(next) = self.path.as_ref().and_then(|p| p.next_node().copied()) else {
            return;
        };
        let pos = agent.position();
        let dx = (pos.x - (next.pos.x as f32 + 0.5)).abs();
        let dy = (pos.y - next.pos.y as f32).abs();
        let dz = (pos.z - (next.pos.z as f32 + 0.5)).abs();

        let close = dx < self.max_distance_to_waypoint
            && dz < self.max_distance_to_waypoint
            && dy < 1.0;
        if close
            || (next.path_type.allows_corner_cut()
                && self.should_target_next_node_in_direction(world, agent, temp))
        {
            if let Some(path) = &mut self.path {
                path.advance();
                log::trace!("passed waypoint {} at {}", path.next_node_index(), next.pos);
            }
        }

        self.do_stuck_detection(agent, temp);
    }

    fn should_target_next_node_in_direction(
        &self,
        world: &dyn NavWorld,
        agent: &Agent,
        pos: Vec3,
    ) -> bool {
        let Some(path) = &self.path else {
            return false;
        };
        let next_index = path.next_node_index();
        if next_index + 1 >= path.node_count() {
            return false;
        }
        let (Some(next), Some(after)) = (path.node(next_index), path.node(next_index + 1)) else {
            return false;
        };

        let v0 = next.bottom_center();
        if pos.distance_squared(v0) >= CORNER_CUT_RANGE_SQ {
            return false;
        }
        if let Some(entity_pos) = path.next_entity_pos(agent.descriptor.width)
            && self.strategy.can_move_directly(world, agent, pos, entity_pos)
        {
            return true;
        }

        let v1 = after.bottom_center();
        let to_next = v0 - pos;
        let to_after = v1 - pos;
        let d0 = to_next.length_squared();
        let d1 = to_after.length_squared();
        let after_is_closer = d1 < d0;
        let next_is_close = d0 < 0.5;
        if !after_is_closer && !next_is_close {
            return false;
        }

        to_after.normalize_or_zero().dot(to_next.normalize_or_zero()) < 0.0
    }

    // ========================================================================
    // Progress monitoring
    // ========================================================================

    fn do_stuck_detection(&mut self, agent: &Agent, pos: Vec3) {
        let interval = self.config.stuck_check_interval;
        if self.tick - self.last_stuck_check > interval {
            let speed = agent.state.speed;
            let expected = if speed >= 1.0 { speed } else { speed * speed };
            let limit = expected * interval as f32 * self.config.stuck_distance_factor;

            if pos.distance_squared(self.last_stuck_check_pos) < limit * limit {
                log::warn!("agent stuck at {pos}, dropping path");
                self.is_stuck = true;
                self.stop();
                self.events.push(NavEvent::Stuck { position: pos });
            } else {
                self.is_stuck = false;
            }

            self.last_stuck_check = self.tick;
            self.last_stuck_check_pos = pos;
        }

        let next = self
            .path
            .as_ref()
            .filter(|p| !p.is_done())
            .and_then(Path::next_node)
            .copied();
        if let Some(next) = next {
            self.check_timeout(agent, pos, next);
        }
    }

    fn check_timeout(&mut self, agent: &Agent, pos: Vec3, next: PathNode) {
        if self.timeout_cached_node == Some(next.pos) {
            self.timeout_timer += self.tick - self.last_timeout_check;
        } else {
            self.timeout_cached_node = Some(next.pos);
            self.timeout_timer = 0;
            let speed = agent.state.speed;
            self.timeout_limit = if speed > 0.0 {
                pos.distance(next.bottom_center()) / speed * TICKS_PER_SECOND
            } else {
                0.0
            };
        }

        if self.timeout_limit > 0.0
            && self.timeout_timer as f32 > self.timeout_limit * self.config.timeout_multiplier
        {
            log::info!(
                "waypoint {} not reached after {} ticks, dropping path",
                next.pos,
                self.timeout_timer
            );
            self.events.push(NavEvent::TimedOut { waypoint: next.pos });
            self.reset_stuck_timeout();
            self.stop();
        }

        self.last_timeout_check = self.tick;
    }

    fn reset_stuck_timeout(&mut self) {
        self.timeout_cached_node = None;
        self.timeout_timer = 0;
        self.timeout_limit = 0.0;
        self.is_stuck = false;
    }
}
