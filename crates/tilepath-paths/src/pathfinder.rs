use std::cell::RefCell;
use std::rc::Rc;

use tilepath_core::{
    ConfigError, ListenerId, Listeners, Position, Step, TaskHandle, TaskSlot, Tick, Tile, TileGrid,
};

use crate::astar::{SearchContext, SearchState};
use crate::heuristic::Heuristic;
use crate::path::Path;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Settings for a [`Pathfinder`].
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PathfinderConfig {
    pub heuristic: Heuristic,
    /// Tiles expanded per tick. `None` finishes every search inside
    /// [`Pathfinder::find_path`].
    pub max_expansions_per_tick: Option<usize>,
}

impl PathfinderConfig {
    pub fn with_heuristic(mut self, heuristic: Heuristic) -> Self {
        self.heuristic = heuristic;
        self
    }

    pub fn with_budget(mut self, max_expansions_per_tick: usize) -> Self {
        self.max_expansions_per_tick = Some(max_expansions_per_tick);
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.max_expansions_per_tick {
            Some(0) => Err(ConfigError::ZeroExpansionBudget),
            _ => Ok(()),
        }
    }
}

/// What the most recent request came to.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum SearchOutcome {
    /// No request, or the last one was a no-op.
    #[default]
    Idle,
    /// A search is running.
    Pending,
    /// The search arrived. An empty path means the requester already stands
    /// next to its blocked target.
    Found(Path),
    /// The search ran out of tiles.
    Unreachable,
}

// ---------------------------------------------------------------------------
// Pathfinder
// ---------------------------------------------------------------------------

/// Computes paths for one requester on a shared grid and broadcasts every
/// non-empty result to its path listeners.
///
/// At most one search is live. A new request stops the previous one before
/// it can report, so only the latest target ever produces an event.
#[derive(Debug)]
pub struct Pathfinder {
    grid: Rc<TileGrid>,
    position: Position,
    config: PathfinderConfig,
    search: TaskSlot<SearchContext>,
    outcome: SearchOutcome,
    cached: Option<Path>,
    path_ready: Listeners<Path>,
}

impl Pathfinder {
    /// A pathfinder for the entity at `position`.
    pub fn new(grid: Rc<TileGrid>, position: Position, config: PathfinderConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            grid,
            position,
            config,
            search: TaskSlot::new(),
            outcome: SearchOutcome::Idle,
            cached: None,
            path_ready: Listeners::new(),
        })
    }

    /// Subscribe `this` to its grid's selection channel: every selected tile
    /// becomes a [`find_path`](Self::find_path) request.
    ///
    /// The grid only keeps a weak handle; the first selection after the
    /// pathfinder is dropped unregisters the listener.
    pub fn follow_selection(this: &Rc<RefCell<Pathfinder>>) -> ListenerId {
        let weak = Rc::downgrade(this);
        let grid = Rc::clone(&this.borrow().grid);
        grid.on_selection_while(move |tile| {
            let Some(pathfinder) = weak.upgrade() else {
                return false;
            };
            match pathfinder.try_borrow_mut() {
                Ok(mut pathfinder) => {
                    pathfinder.find_path(*tile);
                }
                Err(_) => log::warn!("pathfinder busy, selection of {tile} dropped"),
            }
            true
        })
    }

    /// Request a path from the requester's tile to `target`.
    ///
    /// Any running search is cancelled first and the cached path cleared.
    /// Returns `None`, with nothing broadcast, when the requester stands off
    /// the grid, `target` is not one of its tiles, or the two coincide.
    /// Otherwise returns the handle of the new search, which has already run
    /// its first step (the whole search when no budget is set).
    pub fn find_path(&mut self, target: Tile) -> Option<TaskHandle> {
        if self.search.cancel() {
            log::debug!("search superseded by request for {target}");
        }
        self.cached = None;
        self.outcome = SearchOutcome::Idle;

        let start = self.grid.tile_at(self.position.get())?;
        let target = self.grid.tile(target.pos())?;
        if start == target {
            return None;
        }
        let ctx = SearchContext::new(&*self.grid, start.pos(), target.pos(), self.config.heuristic)?;
        log::debug!("searching {start} -> {target} ({:?})", self.config.heuristic);

        self.outcome = SearchOutcome::Pending;
        let handle = self.search.start(ctx);
        self.resume();
        Some(handle)
    }

    /// Stop the running search without reporting. Returns `true` if one was
    /// running.
    pub fn cancel(&mut self) -> bool {
        let cancelled = self.search.cancel();
        if cancelled {
            self.outcome = SearchOutcome::Idle;
        }
        cancelled
    }

    fn resume(&mut self) {
        let budget = self.config.max_expansions_per_tick.unwrap_or(usize::MAX);
        let grid = &*self.grid;
        let done = self.search.advance(|ctx| match ctx.step(grid, budget) {
            SearchState::InProgress => Step::Yield,
            SearchState::Found(path) => Step::Done(Some(path)),
            SearchState::Exhausted => Step::Done(None),
        });
        if let Some(result) = done {
            self.complete(result);
        }
    }

    fn complete(&mut self, result: Option<Path>) {
        match result {
            Some(path) if path.is_empty() => {
                log::debug!("already next to target, nothing to walk");
                self.outcome = SearchOutcome::Found(path);
            }
            Some(path) => {
                log::debug!("path of {} tiles ready", path.len());
                self.cached = Some(path.clone());
                self.outcome = SearchOutcome::Found(path.clone());
                self.path_ready.dispatch(&path);
            }
            None => {
                log::debug!("no path");
                self.outcome = SearchOutcome::Unreachable;
            }
        }
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn outcome(&self) -> &SearchOutcome {
        &self.outcome
    }

    /// The last path found, until the next request.
    pub fn cached_path(&self) -> Option<&Path> {
        self.cached.as_ref()
    }

    #[inline]
    pub fn is_searching(&self) -> bool {
        self.search.is_running()
    }

    /// State of the running search.
    pub fn search_context(&self) -> Option<&SearchContext> {
        self.search.task()
    }

    pub fn heuristic(&self) -> Heuristic {
        self.config.heuristic
    }

    /// Takes effect from the next request.
    pub fn set_heuristic(&mut self, heuristic: Heuristic) {
        self.config.heuristic = heuristic;
    }

    pub fn config(&self) -> &PathfinderConfig {
        &self.config
    }

    pub fn grid(&self) -> &Rc<TileGrid> {
        &self.grid
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    /// The tile the requester currently stands on.
    pub fn requester_tile(&self) -> Option<Tile> {
        self.grid.tile_at(self.position.get())
    }

    // -----------------------------------------------------------------------
    // Path-ready channel
    // -----------------------------------------------------------------------

    pub fn on_path_ready(&self, listener: impl Fn(&Path) + 'static) -> ListenerId {
        self.path_ready.add(listener)
    }

    /// Register a listener that stays registered while it returns `true`.
    pub fn on_path_ready_while(&self, listener: impl Fn(&Path) -> bool + 'static) -> ListenerId {
        self.path_ready.add_while(listener)
    }

    pub fn remove_path_listener(&self, id: ListenerId) -> bool {
        self.path_ready.remove(id)
    }

    pub fn path_listeners(&self) -> usize {
        self.path_ready.len()
    }
}

impl Tick for Pathfinder {
    fn tick(&mut self, _dt: f32) {
        if self.search.is_running() {
            self.resume();
        }
    }
}


#[cfg(all(test, feature = "serde"))]
mod serde_tests {
    use super::*;

    #[test]
    fn config_from_json() {
        let cfg: PathfinderConfig =
            serde_json::from_str(r#"{ "heuristic": "MANHATTAN", "max_expansions_per_tick": 16 }"#).unwrap();
        assert_eq!(cfg, PathfinderConfig::default().with_heuristic(Heuristic::Manhattan).with_budget(16));
        let cfg: PathfinderConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg, PathfinderConfig::default());
    }
}
