use std::cell::RefCell;
use std::rc::Rc;

use tilepath_core::{
    ConfigError, ListenerId, Position, Step, TaskHandle, TaskSlot, Tick, Tile, TileGrid,
    error::ensure_positive, is_valid_dt,
};
use tilepath_paths::{Path, Pathfinder};

use crate::steer::move_towards;

/// Movement settings for a [`PathExecutor`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MotionConfig {
    /// World units per unit of time.
    pub speed: f32,
    /// Distance at which a tile counts as reached.
    pub tolerance: f32,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            speed: 3.0,
            tolerance: 1e-4,
        }
    }
}

impl MotionConfig {
    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f32) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_positive(self.speed, ConfigError::InvalidSpeed)?;
        ensure_positive(self.tolerance, ConfigError::InvalidTolerance)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ExecutorState {
    Idle,
    Moving,
}

/// Progress along one path.
#[derive(Debug)]
struct MotionTask {
    tiles: Vec<Tile>,
    next: usize,
}

impl MotionTask {
    fn remaining(&self) -> usize {
        self.tiles.len().saturating_sub(self.next)
    }

    fn advance(&mut self, grid: &TileGrid, position: &Position, max_step: f32, tolerance: f32) -> Step<()> {
        while let Some(tile) = self.tiles.get(self.next) {
            let here = position.get();
            if !here.is_finite() {
                log::warn!("position {here} is not finite, holding");
                return Step::Yield;
            }
            let goal = grid.world_point_for(tile.pos(), here.y);
            if here.distance(goal) > tolerance {
                let to = move_towards(here, goal, max_step);
                log::trace!("moving toward {tile}: {here} -> {to}");
                position.set(to);
                return Step::Yield;
            }
            self.next += 1;
        }
        Step::Done(())
    }
}

/// Moves an entity along the paths it is handed.
///
/// Idle until a path arrives, then Moving until its last tile is reached.
/// A path received while Moving replaces the current one; the entity turns
/// toward the new path's first tile from wherever it is.
#[derive(Debug)]
pub struct PathExecutor {
    grid: Rc<TileGrid>,
    position: Position,
    config: MotionConfig,
    motion: TaskSlot<MotionTask>,
}

impl PathExecutor {
    pub fn new(grid: Rc<TileGrid>, position: Position, config: MotionConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            grid,
            position,
            config,
            motion: TaskSlot::new(),
        })
    }

    /// Subscribe `this` to the paths `pathfinder` broadcasts.
    ///
    /// The pathfinder only keeps a weak handle to the executor; the first
    /// path after the executor is dropped unregisters the listener.
    pub fn follow(this: &Rc<RefCell<PathExecutor>>, pathfinder: &Pathfinder) -> ListenerId {
        let weak = Rc::downgrade(this);
        pathfinder.on_path_ready_while(move |path| {
            let Some(executor) = weak.upgrade() else {
                return false;
            };
            match executor.try_borrow_mut() {
                Ok(mut executor) => {
                    executor.accept_path(path);
                }
                Err(_) => log::warn!("executor busy, path of {} tiles dropped", path.len()),
            }
            true
        })
    }

    /// Start walking `path`, abandoning any path in progress. Movement
    /// begins on the next tick.
    pub fn accept_path(&mut self, path: &Path) -> TaskHandle {
        if self.motion.is_running() {
            log::debug!("redirected with {} tiles left", self.remaining());
        }
        self.motion.start(MotionTask {
            tiles: path.tiles().to_vec(),
            next: 0,
        })
    }

    /// Stop moving. Returns `true` if a path was in progress.
    pub fn stop(&mut self) -> bool {
        self.motion.cancel()
    }

    pub fn state(&self) -> ExecutorState {
        if self.motion.is_running() {
            ExecutorState::Moving
        } else {
            ExecutorState::Idle
        }
    }

    /// Tiles of the current path not reached yet.
    pub fn remaining(&self) -> usize {
        self.motion.task().map_or(0, MotionTask::remaining)
    }

    /// The tile currently headed for.
    pub fn heading(&self) -> Option<Tile> {
        self.motion.task().and_then(|t| t.tiles.get(t.next).copied())
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn config(&self) -> &MotionConfig {
        &self.config
    }

    pub fn grid(&self) -> &Rc<TileGrid> {
        &self.grid
    }
}

impl Tick for PathExecutor {
    fn tick(&mut self, dt: f32) {
        if !is_valid_dt(dt) {
            log::warn!("invalid dt {dt}, motion tick skipped");
            return;
        }
        let max_step = self.config.speed * dt;
        let tolerance = self.config.tolerance;
        let grid = &*self.grid;
        let position = &self.position;
        let done = self
            .motion
            .advance(|task| task.advance(grid, position, max_step, tolerance));
        if done.is_some() {
            log::debug!("arrived at {}", position.get());
        }
    }
}


#[cfg(all(test, feature = "serde"))]
mod serde_tests {
    use super::*;

    #[test]
    fn partial_config_keeps_defaults() {
        let cfg: MotionConfig = serde_json::from_str(r#"{ "speed": 5.0 }"#).unwrap();
        assert_eq!(cfg, MotionConfig::default().with_speed(5.0));
    }
}
