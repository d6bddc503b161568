//! **tilepath-core**: the tile grid and the plumbing around it.
//!
//! This crate provides the types shared by the rest of the *tilepath*
//! workspace: tile-space geometry, the [`TileGrid`] walkability map with its
//! world transform and selection channel, an ordered observer registry, and
//! the single-threaded cooperative task primitives the pathfinder and the
//! path executor are built on.

pub mod config;
pub mod error;
pub mod geom;
pub mod grid;
pub mod listeners;
pub mod position;
pub mod task;
pub mod tile;
pub mod walkability;

pub use config::GridConfig;
pub use error::ConfigError;
pub use geom::{Point, Range};
pub use grid::{TileGrid, WorldPointSource, log_selection};
pub use listeners::{ListenerId, Listeners};
pub use position::Position;
pub use task::{Scheduler, Step, TaskHandle, TaskSlot, TaskStatus, Tick, is_valid_dt};
pub use tile::Tile;
pub use walkability::{AllWalkable, RandomWalkable, WalkabilityPolicy};

pub use glam;
