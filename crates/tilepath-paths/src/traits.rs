use tilepath_core::{Point, Tile, TileGrid};

/// Read-only tile lookup, the only thing the search needs from a map.
pub trait TileSource {
    /// The tile at `p`, or `None` when `p` is outside the map.
    fn tile(&self, p: Point) -> Option<Tile>;
}

impl TileSource for TileGrid {
    #[inline]
    fn tile(&self, p: Point) -> Option<Tile> {
        TileGrid::tile(self, p)
    }
}
