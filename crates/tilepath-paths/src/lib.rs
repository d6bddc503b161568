//! A* pathfinding for *tilepath* grids.
//!
//! - [`search`] and [`SearchContext`]: the search itself, one-shot or
//!   resumable under an expansion budget
//! - [`Pathfinder`]: a per-entity component that turns selected tiles into
//!   paths and broadcasts them
//! - [`Heuristic`]: the distance estimates, which double as step costs
//!
//! Targets that cannot be stood on are approached instead: the search stops
//! on the first tile orthogonally next to them.

mod astar;
mod heuristic;
mod path;
mod pathfinder;
mod traits;

pub use astar::{Score, SearchContext, SearchState, search};
pub use heuristic::{Heuristic, euclidean, manhattan};
pub use path::Path;
pub use pathfinder::{Pathfinder, PathfinderConfig, SearchOutcome};
pub use traits::TileSource;
