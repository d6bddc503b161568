use tilepath_core::{Point, Tile};

/// A resolved route: every tile to step on, in order.
///
/// The tile the search started from is not included; the last tile is
/// where the route ends (the target itself, or a tile next to it when the
/// target cannot be stood on).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Path {
    tiles: Vec<Tile>,
}

impl Path {
    pub fn new(tiles: Vec<Tile>) -> Self {
        Self { tiles }
    }

    #[inline]
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// The tile the route ends on.
    #[inline]
    pub fn end(&self) -> Option<Tile> {
        self.tiles.last().copied()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Tile> {
        self.tiles.iter()
    }

    /// Tile coordinates along the route.
    pub fn points(&self) -> impl Iterator<Item = Point> + '_ {
        self.tiles.iter().map(|t| t.pos())
    }
}

impl<'a> IntoIterator for &'a Path {
    type Item = &'a Tile;
    type IntoIter = std::slice::Iter<'a, Tile>;

    fn into_iter(self) -> Self::IntoIter {
        self.tiles.iter()
    }
}

impl FromIterator<Tile> for Path {
    fn from_iter<I: IntoIterator<Item = Tile>>(iter: I) -> Self {
        Self {
            tiles: iter.into_iter().collect(),
        }
    }
}
