//! Terrain evaluation for a searching agent
//!
//! A [`NodeEvaluator`] turns grid cells into search nodes: it classifies each
//! cell for the agent's footprint and capabilities, finds the start node and
//! lists the cells reachable in one move. Two evaluators exist: a walking one
//! and an amphibious one that also swims vertically. [`Evaluator`] wraps both
//! so a path finder can own either without boxing.

use glam::IVec3;
use smallvec::SmallVec;

use super::amphibious::AmphibiousNodeEvaluator;
use super::node::{NodeArena, NodeId, Target};
use super::walk::WalkNodeEvaluator;
use super::PathType;
use crate::agent::Agent;
use crate::world::{NavWorld, TerrainSampler};

/// Neighbour buffer; a node has at most 10 neighbours, the rest is headroom
pub type Neighbors = SmallVec<[NodeId; 32]>;

/// What an evaluator reads during one search
#[derive(Clone, Copy)]
pub struct EvalContext<'a> {
    /// Terrain and collision queries
    pub world: &'a dyn NavWorld,
    /// The searching agent
    pub agent: &'a Agent,
}

impl<'a> EvalContext<'a> {
    /// Create a context
    #[must_use]
    pub fn new(world: &'a dyn NavWorld, agent: &'a Agent) -> Self {
        Self { world, agent }
    }
}

/// Movement capabilities an evaluator honours
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EvaluatorFlags {
    /// Swims up / floats on water
    pub can_float: bool,
    /// Opens wooden doors
    pub can_open_doors: bool,
    /// Walks through open doors
    pub can_pass_doors: bool,
    /// Climbs fences
    pub can_walk_over_fences: bool,
}

impl EvaluatorFlags {
    /// Flags taken from an agent's descriptor
    #[must_use]
    pub fn from_agent(agent: &Agent) -> Self {
        let d = &agent.descriptor;
        Self {
            can_float: d.can_float,
            can_open_doors: d.can_open_doors,
            can_pass_doors: d.can_pass_doors,
            can_walk_over_fences: d.can_walk_over_fences,
        }
    }
}

/// Direction of a move, used for head clearance checks when climbing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// -z
    North,
    /// +z
    South,
    /// -x
    West,
    /// +x
    East,
    /// +y
    Up,
    /// -y
    Down,
}

impl Direction {
    /// Unit step
    #[must_use]
    pub const fn step(self) -> IVec3 {
        match self {
            Self::North => IVec3::NEG_Z,
            Self::South => IVec3::Z,
            Self::West => IVec3::NEG_X,
            Self::East => IVec3::X,
            Self::Up => IVec3::Y,
            Self::Down => IVec3::NEG_Y,
        }
    }

    /// All six directions
    pub const ALL: [Direction; 6] = [
        Self::Down,
        Self::Up,
        Self::North,
        Self::South,
        Self::West,
        Self::East,
    ];
}

/// Classifies terrain and produces search nodes for one agent
pub trait NodeEvaluator {
    /// Start a search session: clear the arena and per-session state
    fn prepare(&mut self, ctx: &EvalContext<'_>);

    /// End a search session and drop caches
    fn done(&mut self);

    /// Node the agent starts from; `None` when it is outside the world
    fn start(&mut self, ctx: &EvalContext<'_>) -> Option<NodeId>;

    /// Target wrapping the node at `pos`
    fn goal(&mut self, pos: IVec3) -> Target {
        let node = self.nodes_mut().get_or_create(pos);
        Target::new(pos, node)
    }

    /// Append every node reachable from `id` in one move
    fn neighbors(&mut self, ctx: &EvalContext<'_>, id: NodeId, out: &mut Neighbors);

    /// Classification of `pos` for the agent's whole footprint (cached per session)
    fn path_type(&mut self, ctx: &EvalContext<'_>, pos: IVec3) -> PathType;

    /// Nodes created this session
    fn nodes(&self) -> &NodeArena;

    /// Mutable access to this session's nodes
    fn nodes_mut(&mut self) -> &mut NodeArena;

    /// Capabilities
    fn flags(&self) -> &EvaluatorFlags;

    /// Mutable capabilities
    fn flags_mut(&mut self) -> &mut EvaluatorFlags;
}

/// Either evaluator, dispatched statically
#[derive(Debug)]
pub enum Evaluator {
    /// Walks, climbs and falls
    Walk(WalkNodeEvaluator),
    /// Walks and swims in all directions
    Amphibious(AmphibiousNodeEvaluator),
}

impl Evaluator {
    /// Walking evaluator
    #[must_use]
    pub fn walk(flags: EvaluatorFlags) -> Self {
        Self::Walk(WalkNodeEvaluator::new(flags))
    }

    /// Amphibious evaluator
    #[must_use]
    pub fn amphibious(flags: EvaluatorFlags, prefers_shallow_swimming: bool) -> Self {
        Self::Amphibious(AmphibiousNodeEvaluator::new(flags, prefers_shallow_swimming))
    }
}

impl NodeEvaluator for Evaluator {
    fn prepare(&mut self, ctx: &EvalContext<'_>) {
        match self {
            Self::Walk(e) => e.prepare(ctx),
            Self::Amphibious(e) => e.prepare(ctx),
        }
    }

    fn done(&mut self) {
        match self {
            Self::Walk(e) => e.done(),
            Self::Amphibious(e) => e.done(),
        }
    }

    fn start(&mut self, ctx: &EvalContext<'_>) -> Option<NodeId> {
        match self {
            Self::Walk(e) => e.start(ctx),
            Self::Amphibious(e) => e.start(ctx),
        }
    }

    fn neighbors(&mut self, ctx: &EvalContext<'_>, id: NodeId, out: &mut Neighbors) {
        match self {
            Self::Walk(e) => e.neighbors(ctx, id, out),
            Self::Amphibious(e) => e.neighbors(ctx, id, out),
        }
    }

    fn path_type(&mut self, ctx: &EvalContext<'_>, pos: IVec3) -> PathType {
        match self {
            Self::Walk(e) => e.path_type(ctx, pos),
            Self::Amphibious(e) => e.path_type(ctx, pos),
        }
    }

    fn nodes(&self) -> &NodeArena {
        match self {
            Self::Walk(e) => e.nodes(),
            Self::Amphibious(e) => e.nodes(),
        }
    }

    fn nodes_mut(&mut self) -> &mut NodeArena {
        match self {
            Self::Walk(e) => e.nodes_mut(),
            Self::Amphibious(e) => e.nodes_mut(),
        }
    }

    fn flags(&self) -> &EvaluatorFlags {
        match self {
            Self::Walk(e) => e.flags(),
            Self::Amphibious(e) => e.flags(),
        }
    }

    fn flags_mut(&mut self) -> &mut EvaluatorFlags {
        match self {
            Self::Walk(e) => e.flags_mut(),
            Self::Amphibious(e) => e.flags_mut(),
        }
    }
}

// ============================================================================
// Agent-independent classification
// ============================================================================

/// Classification of a cell from its own contents and the cell below
///
/// Empty cells above something standable become [`PathType::Walkable`];
/// hazards below (fire, cactus, honey, powder snow, wither roses) carry up.
#[must_use]
pub fn static_path_type<W: TerrainSampler + ?Sized>(world: &W, pos: IVec3) -> PathType {
    let mut path_type = world.raw_path_type(pos);

    if path_type == PathType::Open && pos.y > world.min_height() {
        let below = world.raw_path_type(pos - IVec3::Y);
        path_type = match below {
            PathType::Walkable | PathType::Open | PathType::Water | PathType::Lava => {
                PathType::Open
            }
            PathType::DamageFire => PathType::DamageFire,
            PathType::DamageOther => PathType::DamageOther,
            PathType::StickyHoney => PathType::StickyHoney,
            PathType::PowderSnow => PathType::DangerPowderSnow,
            PathType::DamageCautious => PathType::DamageCautious,
            _ => PathType::Walkable,
        };
    }

    if path_type == PathType::Walkable {
        path_type = check_neighbour_blocks(world, pos, path_type);
    }
    path_type
}

/// Downgrade a walkable cell next to something dangerous or wet
///
/// Scans the surrounding 3x3x3 block except the cell's own column.
#[must_use]
pub fn check_neighbour_blocks<W: TerrainSampler + ?Sized>(
    world: &W,
    pos: IVec3,
    path_type: PathType,
) -> PathType {
    for dx in -1..=1 {
        for dy in -1..=1 {
            for dz in -1..=1 {
                if dx == 0 && dz == 0 {
                    continue;
                }
                let neighbour = pos + IVec3::new(dx, dy, dz);
                match world.raw_path_type(neighbour) {
                    PathType::DamageOther => return PathType::DangerOther,
                    PathType::DamageFire | PathType::Lava => return PathType::DangerFire,
                    _ => {}
                }
                if world.is_water(neighbour) {
                    return PathType::WaterBorder;
                }
            }
        }
    }
    path_type
}

/// Like [`static_path_type`], but water touching a solid block is a border
#[must_use]
pub fn amphibious_static_path_type<W: TerrainSampler + ?Sized>(world: &W, pos: IVec3) -> PathType {
    let path_type = world.raw_path_type(pos);
    if path_type != PathType::Water {
        return static_path_type(world, pos);
    }

    let touches_solid = Direction::ALL
        .iter()
        .any(|d| world.raw_path_type(pos + d.step()) == PathType::Blocked);
    if touches_solid {
        PathType::WaterBorder
    } else {
        PathType::Water
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{Block, VoxelWorld};

    #[test]
    fn test_static_floor_and_air() {
        let world = VoxelWorld::flat(8, 8);
        assert_eq!(static_path_type(&world, IVec3::new(3, 0, 3)), PathType::Walkable);
        assert_eq!(static_path_type(&world, IVec3::new(3, 1, 3)), PathType::Open);
        assert_eq!(static_path_type(&world, IVec3::new(3, -1, 3)), PathType::Blocked);
    }

    #[test]
    fn test_hazards_propagate_up() {
        let mut world = VoxelWorld::flat(8, 8);
        world.set_block(IVec3::new(2, -1, 2), Block::Magma);
        world.set_block(IVec3::new(5, -1, 5), Block::PowderSnow);

        assert_eq!(static_path_type(&world, IVec3::new(2, 0, 2)), PathType::DamageFire);
        assert_eq!(
            static_path_type(&world, IVec3::new(5, 0, 5)),
            PathType::DangerPowderSnow
        );
    }

    #[test]
    fn test_neighbour_danger() {
        let mut world = VoxelWorld::flat(8, 8);
        world.set_block(IVec3::new(3, 0, 3), Block::Cactus);
        world.set_block(IVec3::new(6, 0, 6), Block::Water);

        assert_eq!(static_path_type(&world, IVec3::new(4, 0, 3)), PathType::DangerOther);
        assert_eq!(static_path_type(&world, IVec3::new(5, 1, 6)), PathType::Open);
        assert_eq!(static_path_type(&world, IVec3::new(5, 0, 5)), PathType::WaterBorder);
        assert_eq!(static_path_type(&world, IVec3::new(3, 1, 3)), PathType::DamageOther);
    }

    #[test]
    fn test_amphibious_water_border() {
        let mut world = VoxelWorld::flat(8, 8);
        world.fill(IVec3::new(2, -1, 2), IVec3::new(4, -1, 4), Block::Water);
        world.set_block(IVec3::new(3, -2, 3), Block::Water);

        assert_eq!(
            amphibious_static_path_type(&world, IVec3::new(3, -1, 3)),
            PathType::Water
        );
        assert_eq!(
            amphibious_static_path_type(&world, IVec3::new(2, -1, 2)),
            PathType::WaterBorder
        );
        assert_eq!(static_path_type(&world, IVec3::new(2, -1, 2)), PathType::Water);
    }
}
