//! Tile-space geometry: [`Point`] and [`Range`].
//!
//! Tile coordinates are integer indices into the grid. `x` runs along the
//! grid width and `y` along its depth (the world `z` axis).

use std::fmt;
use std::ops::{Add, Sub};

// ---------------------------------------------------------------------------
// Point
// ---------------------------------------------------------------------------

/// A 2D integer tile coordinate.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    /// Create a new point.
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The four orthogonal neighbours, in search expansion order:
    /// `(x, y+1)`, `(x+1, y)`, `(x, y-1)`, `(x-1, y)`.
    ///
    /// The order is observable: it decides which of several equally good
    /// tiles the search settles on.
    #[inline]
    pub const fn orthogonal(self) -> [Point; 4] {
        [
            Self::new(self.x, self.y + 1),
            Self::new(self.x + 1, self.y),
            Self::new(self.x, self.y - 1),
            Self::new(self.x - 1, self.y),
        ]
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl Add for Point {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl From<(i32, i32)> for Point {
    #[inline]
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

// ---------------------------------------------------------------------------
// Range
// ---------------------------------------------------------------------------

/// The tiles with `min.x <= x < max.x` and `min.y <= y < max.y`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Range {
    pub min: Point,
    pub max: Point,
}

impl Range {
    /// The rectangle between corners `(x0, y0)` and `(x1, y1)`, given in
    /// any order.
    pub fn new(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        let (lo_x, hi_x) = if x0 <= x1 { (x0, x1) } else { (x1, x0) };
        let (lo_y, hi_y) = if y0 <= y1 { (y0, y1) } else { (y1, y0) };
        Self {
            min: Point::new(lo_x, lo_y),
            max: Point::new(hi_x, hi_y),
        }
    }

    #[inline]
    pub fn width(self) -> i32 {
        self.max.x - self.min.x
    }

    #[inline]
    pub fn height(self) -> i32 {
        self.max.y - self.min.y
    }

    /// Number of tiles covered.
    pub fn len(self) -> usize {
        self.width().max(0) as usize * self.height().max(0) as usize
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn contains(self, p: Point) -> bool {
        (self.min.x..self.max.x).contains(&p.x) && (self.min.y..self.max.y).contains(&p.y)
    }

    /// Every tile, row by row.
    pub fn iter(self) -> RangeIter {
        RangeIter {
            range: self,
            next: 0,
        }
    }
}

impl IntoIterator for Range {
    type Item = Point;
    type IntoIter = RangeIter;

    fn into_iter(self) -> RangeIter {
        self.iter()
    }
}

/// Row-major walk over a [`Range`].
#[derive(Clone, Debug)]
pub struct RangeIter {
    range: Range,
    next: usize,
}

impl Iterator for RangeIter {
    type Item = Point;

    fn next(&mut self) -> Option<Point> {
        if self.next >= self.range.len() {
            return None;
        }
        let w = self.range.width() as usize;
        let p = Point::new(
            self.range.min.x + (self.next % w) as i32,
            self.range.min.y + (self.next / w) as i32,
        );
        self.next += 1;
        Some(p)
    }
}
