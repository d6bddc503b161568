//! The [`Tile`] type, one cell of the walkability map.

use std::fmt;
use std::hash::{Hash, Hasher};

use crate::geom::Point;

/// A grid cell with a walkability flag.
///
/// Identity is the coordinate pair: two tiles at the same position compare
/// equal and hash the same regardless of their `walkable` flag.
#[derive(Copy, Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tile {
    pos: Point,
    walkable: bool,
}

impl Tile {
    #[inline]
    pub const fn new(pos: Point, walkable: bool) -> Self {
        Self { pos, walkable }
    }

    /// The tile coordinate.
    #[inline]
    pub const fn pos(self) -> Point {
        self.pos
    }

    #[inline]
    pub const fn x(self) -> i32 {
        self.pos.x
    }

    #[inline]
    pub const fn y(self) -> i32 {
        self.pos.y
    }

    /// Whether an entity may stand on this tile.
    #[inline]
    pub const fn is_walkable(self) -> bool {
        self.walkable
    }

    #[inline]
    pub(crate) fn set_walkable(&mut self, walkable: bool) {
        self.walkable = walkable;
    }
}

impl PartialEq for Tile {
    fn eq(&self, other: &Self) -> bool {
        self.pos == other.pos
    }
}

impl Eq for Tile {}

impl Hash for Tile {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.pos.hash(state);
    }
}

impl fmt::Display for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.walkable {
            write!(f, "{}", self.pos)
        } else {
            write!(f, "{}#", self.pos)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn identity_ignores_walkability() {
        let a = Tile::new(Point::new(2, 3), true);
        let b = Tile::new(Point::new(2, 3), false);
        assert_eq!(a, b);

        let mut set = HashSet::new();
        set.insert(a);
        assert!(set.contains(&b));
    }

    #[test]
    fn display_marks_blocked_tiles() {
        assert_eq!(Tile::new(Point::new(1, 0), true).to_string(), "(1, 0)");
        assert_eq!(Tile::new(Point::new(1, 0), false).to_string(), "(1, 0)#");
    }
}
