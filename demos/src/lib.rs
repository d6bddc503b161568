//! Shared code for the tilepath demos: a config file format, a scripted
//! pointer, and a small simulation that wires a grid, one pathfinder and one
//! path executor to a scheduler.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::error::Error;
use std::rc::Rc;

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use tilepath_core::glam::Vec3;
use tilepath_core::{
    ConfigError, GridConfig, Point, Position, RandomWalkable, Scheduler, Tick, Tile, TileGrid,
    WorldPointSource, error::ensure_positive, log_selection,
};
use tilepath_motion::{ExecutorState, MotionConfig, PathExecutor};
use tilepath_paths::{Pathfinder, PathfinderConfig, SearchOutcome};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Everything a demo run needs. Any field left out of a config file takes
/// its default.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub grid: GridConfig,
    pub pathfinder: PathfinderConfig,
    pub motion: MotionConfig,
    /// Probability that a tile is walkable.
    pub walkable_chance: f64,
    /// Seed for the walkability fill and the scripted clicks.
    pub seed: u64,
    /// Length of one scheduler tick.
    pub tick_dt: f32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            grid: GridConfig::default(),
            pathfinder: PathfinderConfig::default(),
            motion: MotionConfig::default(),
            walkable_chance: RandomWalkable::<StdRng>::MOSTLY_WALKABLE,
            seed: 0,
            tick_dt: 1.0 / 60.0,
        }
    }
}

impl SimConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.grid.validate()?;
        self.pathfinder.validate()?;
        self.motion.validate()?;
        if !(0.0..=1.0).contains(&self.walkable_chance) {
            return Err(ConfigError::InvalidWalkableChance(self.walkable_chance));
        }
        ensure_positive(self.tick_dt, ConfigError::InvalidTick)
    }

    /// Parse and validate a JSON config.
    pub fn from_json(text: &str) -> Result<Self, Box<dyn Error>> {
        let config: SimConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a JSON config file.
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self, Box<dyn Error>> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }
}

// ---------------------------------------------------------------------------
// Scripted pointer
// ---------------------------------------------------------------------------

/// A pointer that replays a fixed list of clicks. `None` entries are clicks
/// that hit no geometry.
#[derive(Clone, Debug, Default)]
pub struct ScriptedClicks {
    clicks: VecDeque<Option<Vec3>>,
}

impl ScriptedClicks {
    pub fn new(clicks: impl IntoIterator<Item = Option<Vec3>>) -> Self {
        Self {
            clicks: clicks.into_iter().collect(),
        }
    }

    /// The next click, or `None` once the script is exhausted.
    pub fn next_click(&mut self) -> Option<Option<Vec3>> {
        self.clicks.pop_front()
    }

    pub fn len(&self) -> usize {
        self.clicks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clicks.is_empty()
    }
}

impl WorldPointSource for ScriptedClicks {
    fn resolve_world_point(&mut self) -> Option<Vec3> {
        self.next_click().flatten()
    }
}

// ---------------------------------------------------------------------------
// Simulation
// ---------------------------------------------------------------------------

/// One entity on a random grid, following selections.
pub struct Sim {
    grid: Rc<TileGrid>,
    position: Position,
    pathfinder: Rc<RefCell<Pathfinder>>,
    executor: Rc<RefCell<PathExecutor>>,
    scheduler: Scheduler,
    tick_dt: f32,
}

impl Sim {
    pub fn new(config: &SimConfig) -> Result<Self, ConfigError> {
        let mut policy = RandomWalkable::new(StdRng::seed_from_u64(config.seed), config.walkable_chance)?;
        let grid = TileGrid::new(&config.grid, &mut policy)?;
        Self::with_grid(Rc::new(grid), config)
    }

    /// Run on an existing grid. The entity starts on the center tile, or on
    /// the first walkable tile when the center is blocked.
    pub fn with_grid(grid: Rc<TileGrid>, config: &SimConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let start = spawn_tile(&grid);
        let position = Position::new(grid.world_point_for(start, 0.0));

        let pathfinder = Rc::new(RefCell::new(Pathfinder::new(
            Rc::clone(&grid),
            position.clone(),
            config.pathfinder.clone(),
        )?));
        let executor = Rc::new(RefCell::new(PathExecutor::new(
            Rc::clone(&grid),
            position.clone(),
            config.motion.clone(),
        )?));

        grid.on_selection(log_selection);
        Pathfinder::follow_selection(&pathfinder);
        PathExecutor::follow(&executor, &pathfinder.borrow());

        let mut scheduler = Scheduler::new();
        let p: Rc<RefCell<dyn Tick>> = pathfinder.clone();
        let e: Rc<RefCell<dyn Tick>> = executor.clone();
        scheduler.add(p);
        scheduler.add(e);

        log::info!(
            "{}x{} grid, {} walkable, entity at {start}",
            grid.width(),
            grid.depth(),
            grid.walkable_count()
        );
        Ok(Self {
            grid,
            position,
            pathfinder,
            executor,
            scheduler,
            tick_dt: config.tick_dt,
        })
    }

    pub fn grid(&self) -> &Rc<TileGrid> {
        &self.grid
    }

    pub fn position(&self) -> Vec3 {
        self.position.get()
    }

    /// The tile the entity stands on.
    pub fn entity_tile(&self) -> Option<Tile> {
        self.grid.tile_at(self.position.get())
    }

    pub fn outcome(&self) -> SearchOutcome {
        self.pathfinder.borrow().outcome().clone()
    }

    pub fn ticks(&self) -> u64 {
        self.scheduler.ticks()
    }

    /// Take one click from `pointer` and broadcast the tile under it.
    pub fn click(&mut self, pointer: &mut impl WorldPointSource) -> Option<Tile> {
        self.grid.select_from(pointer)
    }

    /// Whether nothing is searching or moving.
    pub fn is_settled(&self) -> bool {
        !self.pathfinder.borrow().is_searching()
            && self.executor.borrow().state() == ExecutorState::Idle
    }

    /// Tick until settled or `max_ticks` have run. Returns the ticks run.
    pub fn run_until_settled(&mut self, max_ticks: usize) -> usize {
        let pathfinder = Rc::clone(&self.pathfinder);
        let executor = Rc::clone(&self.executor);
        self.scheduler.run_until(self.tick_dt, max_ticks, || {
            !pathfinder.borrow().is_searching() && executor.borrow().state() == ExecutorState::Idle
        })
    }

    pub fn run(&mut self, ticks: usize) {
        self.scheduler.run(self.tick_dt, ticks);
    }
}

/// A walkable tile for the entity to start on: the center when it is
/// walkable, otherwise the first walkable tile in row-major order.
fn spawn_tile(grid: &TileGrid) -> Point {
    let center = Point::new(grid.width() / 2, grid.depth() / 2);
    if grid.is_walkable(center) {
        return center;
    }
    grid.iter().find(|t| t.is_walkable()).map_or(center, Tile::pos)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small(rows: &[&str]) -> Sim {
        let grid = Rc::new(TileGrid::from_rows(rows, 1.0).unwrap());
        let config = SimConfig {
            tick_dt: 0.1,
            ..SimConfig::default()
        };
        Sim::with_grid(grid, &config).unwrap()
    }

    #[test]
    fn default_config_is_valid() {
        assert!(SimConfig::default().validate().is_ok());
    }

    #[test]
    fn json_overrides_only_given_fields() {
        let cfg = SimConfig::from_json(
            r#"{ "grid": { "width": 20, "depth": 10 }, "pathfinder": { "heuristic": "COMBINED" }, "seed": 7 }"#,
        )
        .unwrap();
        assert_eq!(cfg.grid, GridConfig::new(20, 10, 1.0));
        assert_eq!(cfg.pathfinder.heuristic, tilepath_paths::Heuristic::Combined);
        assert_eq!(cfg.seed, 7);
        assert_eq!(cfg.motion, MotionConfig::default());
    }

    #[test]
    fn json_is_validated() {
        assert!(SimConfig::from_json(r#"{ "tick_dt": 0.0 }"#).is_err());
        assert!(SimConfig::from_json(r#"{ "walkable_chance": 2.0 }"#).is_err());
        assert!(SimConfig::from_json("not json").is_err());
    }

    #[test]
    fn click_walks_entity_to_tile() {
        let mut sim = small(&[".....", ".#...", "....."]);
        assert_eq!(sim.entity_tile().map(Tile::pos), Some(Point::new(2, 1)));

        let target = Point::new(1, 2);
        let mut pointer = ScriptedClicks::new([Some(sim.grid().world_point_for(target, 0.0))]);
        assert_eq!(sim.click(&mut pointer).map(Tile::pos), Some(target));

        let ticks = sim.run_until_settled(1000);
        assert!(ticks < 1000);
        assert_eq!(sim.entity_tile().map(Tile::pos), Some(target));
        assert!(matches!(sim.outcome(), SearchOutcome::Found(_)));
    }

    #[test]
    fn missed_clicks_do_nothing() {
        let mut sim = small(&["...", "..."]);
        let before = sim.position();
        let mut pointer = ScriptedClicks::new([None, Some(Vec3::new(40.0, 0.0, 0.0))]);
        assert_eq!(sim.click(&mut pointer), None);
        assert_eq!(sim.click(&mut pointer), None);
        assert!(pointer.is_empty());
        assert_eq!(sim.run_until_settled(10), 0);
        assert_eq!(sim.position(), before);
        assert_eq!(sim.outcome(), SearchOutcome::Idle);
    }

    #[test]
    fn random_grid_is_seeded() {
        let config = SimConfig {
            grid: GridConfig::new(16, 16, 1.0),
            seed: 99,
            ..SimConfig::default()
        };
        let a = Sim::new(&config).unwrap();
        let b = Sim::new(&config).unwrap();
        let walkable = |s: &Sim| s.grid().iter().map(|t| t.is_walkable()).collect::<Vec<_>>();
        assert_eq!(walkable(&a), walkable(&b));
    }
}
