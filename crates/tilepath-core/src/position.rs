//! [`Position`], a world-space position shared by the components that act
//! on one entity.

use std::cell::Cell;
use std::rc::Rc;

use glam::Vec3;

/// Shared handle to an entity's world position.
///
/// Clones refer to the same position: the pathfinder reads it to find the
/// requester's tile while the path executor writes it as the entity moves.
#[derive(Clone, Debug, Default)]
pub struct Position(Rc<Cell<Vec3>>);

impl Position {
    pub fn new(at: Vec3) -> Self {
        Self(Rc::new(Cell::new(at)))
    }

    #[inline]
    pub fn get(&self) -> Vec3 {
        self.0.get()
    }

    #[inline]
    pub fn set(&self, at: Vec3) {
        self.0.set(at);
    }
}
