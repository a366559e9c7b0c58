//! Demo: agents crossing a small voxel world
//!
//! Usage: `voxel_nav [config.ron]`

use voxel_nav::core::ConfigError;
use voxel_nav::prelude::*;

/// Ticks simulated before giving up
const MAX_TICKS: u32 = 600;

fn build_world() -> VoxelWorld {
    let mut world = VoxelWorld::flat(20, 20);

    // A wall with a single gap, and a raised platform behind it
    world.fill(IVec3::new(6, 0, 0), IVec3::new(6, 2, 15), Block::Stone);
    world.fill(IVec3::new(12, 0, 12), IVec3::new(15, 0, 15), Block::Slab);
    world.fill(IVec3::new(3, -1, 12), IVec3::new(4, -1, 16), Block::Water);
    world
}

fn load_config() -> Result<NavigationConfig, ConfigError> {
    match std::env::args().nth(1) {
        Some(path) => {
            let config = NavigationConfig::load_ron(&path)?;
            log::info!("loaded navigation config from {path}");
            Ok(config)
        }
        None => Ok(NavigationConfig::default()),
    }
}

fn spawn(
    agents: &mut AgentWorld,
    terrain: &VoxelWorld,
    config: &NavigationConfig,
    name: &str,
    start: Vec3,
    goal: IVec3,
) {
    let agent = Agent::new(AgentDescriptor::default(), start);
    let mut navigation = PathNavigation::new(FollowStrategy::Ground, &agent, config.clone());
    if !navigation.move_to_pos(terrain, &agent, goal, 1.0) {
        log::warn!("{name}: no path from {start} towards {goal}");
    }
    if let Some(path) = navigation.path() {
        log::info!(
            "{name}: {} waypoints towards {}, reaches target: {}",
            path.node_count(),
            path.target(),
            path.can_reach()
        );
    }
    agents.spawn_navigator(name, agent, navigation);
}

fn run(config: NavigationConfig) {
    let terrain = build_world();
    let mut agents = AgentWorld::new();

    spawn(&mut agents, &terrain, &config, "alice", Vec3::new(0.5, 0.0, 0.5), IVec3::new(10, 0, 10));
    spawn(&mut agents, &terrain, &config, "bob", Vec3::new(2.5, 0.0, 2.5), IVec3::new(13, 1, 13));
    spawn(&mut agents, &terrain, &config, "carol", Vec3::new(9.5, 0.0, 1.5), IVec3::new(1, 0, 1));

    let mut ticks = 0;
    while ticks < MAX_TICKS && !agents.all_idle() {
        agents.tick(&terrain);
        ticks += 1;
        for (name, event) in agents.events() {
            log::info!("tick {ticks}: {name}: {event:?}");
        }
    }

    for (_, (name, agent, navigation)) in
        agents.query_mut::<(&Name, &Agent, &PathNavigation)>()
    {
        log::info!(
            "{}: ended at {} ({})",
            name.0,
            agent.position(),
            navigation.search_stats().format_stats()
        );
    }
    log::info!("simulation finished after {ticks} ticks");
}

fn main() {
    env_logger::init();

    match load_config().and_then(|config| config.validate().map(|()| config)) {
        Ok(config) => run(config),
        Err(e) => eprintln!("Config error: {}", e),
    }
}
