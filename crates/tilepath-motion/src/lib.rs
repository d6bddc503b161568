//! Path execution for *tilepath*.
//!
//! A [`PathExecutor`] walks an entity's shared [`Position`](tilepath_core::Position)
//! across the tiles of a [`Path`](tilepath_paths::Path) at a fixed speed,
//! advancing once per scheduler tick. Receiving a new path abandons the old
//! one on the spot.

mod executor;
mod steer;

pub use executor::{ExecutorState, MotionConfig, PathExecutor};
pub use steer::move_towards;
