//! The [`TileGrid`] type: the walkability map and its world transform.
//!
//! The grid is centered on the world origin: tile `(0, 0)` sits at the
//! `(-x, -z)` corner and world `y` (height) plays no part in the mapping.
//! Walkability is written while the grid is being built and is read-only
//! afterwards; share a finished grid behind an `Rc` and no one can change
//! it under a running search.

use glam::{Vec2, Vec3};

use crate::config::GridConfig;
use crate::error::ConfigError;
use crate::geom::{Point, Range};
use crate::listeners::{ListenerId, Listeners};
use crate::tile::Tile;
use crate::walkability::{AllWalkable, WalkabilityPolicy};

/// A fixed-size rectangular matrix of [`Tile`]s.
#[derive(Debug)]
pub struct TileGrid {
    tiles: Vec<Tile>,
    bounds: Range,
    scale: f32,
    selection: Listeners<Tile>,
}

impl TileGrid {
    /// Build a grid, asking `policy` once per tile whether it is walkable.
    pub fn new(config: &GridConfig, policy: &mut impl WalkabilityPolicy) -> Result<Self, ConfigError> {
        config.validate()?;
        let bounds = Range::new(0, 0, config.width, config.depth);
        let tiles = bounds
            .iter()
            .map(|p| Tile::new(p, policy.is_walkable(p)))
            .collect();
        log::debug!(
            "built {}x{} tile grid, scale {}",
            config.width,
            config.depth,
            config.scale
        );
        Ok(Self {
            tiles,
            bounds,
            scale: config.scale,
            selection: Listeners::new(),
        })
    }

    /// Build a grid where every tile is walkable.
    pub fn open(config: &GridConfig) -> Result<Self, ConfigError> {
        Self::new(config, &mut AllWalkable)
    }

    /// Build a grid from text rows: `.` is walkable, `#` is blocked.
    /// Row `i` holds the tiles with `y == i`.
    pub fn from_rows(rows: &[&str], scale: f32) -> Result<Self, ConfigError> {
        let width = rows.first().map_or(0, |r| r.chars().count());
        let mut walkable = Vec::with_capacity(width * rows.len());
        for (row, line) in rows.iter().enumerate() {
            let len = line.chars().count();
            if len != width {
                return Err(ConfigError::RaggedRow {
                    row,
                    len,
                    expected: width,
                });
            }
            for (col, ch) in line.chars().enumerate() {
                match ch {
                    '.' => walkable.push(true),
                    '#' => walkable.push(false),
                    _ => return Err(ConfigError::UnknownMapChar { ch, row, col }),
                }
            }
        }
        let config = GridConfig::new(width as i32, rows.len() as i32, scale);
        let mut cells = walkable.into_iter();
        Self::new(&config, &mut |_: Point| cells.next().unwrap_or(false))
    }

    // -----------------------------------------------------------------------
    // Topology
    // -----------------------------------------------------------------------

    #[inline]
    fn index(&self, p: Point) -> Option<usize> {
        if self.bounds.contains(p) {
            Some(p.y as usize * self.bounds.width() as usize + p.x as usize)
        } else {
            None
        }
    }

    /// Number of tiles along world `x`.
    #[inline]
    pub fn width(&self) -> i32 {
        self.bounds.width()
    }

    /// Number of tiles along world `z`.
    #[inline]
    pub fn depth(&self) -> i32 {
        self.bounds.height()
    }

    #[inline]
    pub fn bounds(&self) -> Range {
        self.bounds
    }

    /// World units per tile edge.
    #[inline]
    pub fn scale(&self) -> f32 {
        self.scale
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    #[inline]
    pub fn contains(&self, p: Point) -> bool {
        self.bounds.contains(p)
    }

    /// The tile at `p`, or `None` outside the grid.
    #[inline]
    pub fn tile(&self, p: Point) -> Option<Tile> {
        self.index(p).map(|i| self.tiles[i])
    }

    /// Whether `p` is inside the grid and walkable.
    #[inline]
    pub fn is_walkable(&self, p: Point) -> bool {
        self.tile(p).is_some_and(Tile::is_walkable)
    }

    /// Change the walkability of `p`. Returns `false` outside the grid.
    pub fn set_walkable(&mut self, p: Point, walkable: bool) -> bool {
        match self.index(p) {
            Some(i) => {
                self.tiles[i].set_walkable(walkable);
                true
            }
            None => false,
        }
    }

    /// Row-major iterator over every tile.
    pub fn iter(&self) -> impl Iterator<Item = Tile> + '_ {
        self.tiles.iter().copied()
    }

    pub fn walkable_count(&self) -> usize {
        self.tiles.iter().filter(|t| t.is_walkable()).count()
    }

    // -----------------------------------------------------------------------
    // World transform
    // -----------------------------------------------------------------------

    /// Half the grid's world-space footprint on (x, z).
    #[inline]
    fn half_extent(&self) -> Vec2 {
        Vec2::new(self.width() as f32, self.depth() as f32) * (self.scale / 2.0)
    }

    /// The tile containing world point `world`, or `None` when the point
    /// falls outside the grid.
    pub fn tile_at(&self, world: Vec3) -> Option<Tile> {
        if !world.is_finite() {
            return None;
        }
        let local = (Vec2::new(world.x, world.z) + self.half_extent()) / self.scale;
        let p = Point::new(local.x.floor() as i32, local.y.floor() as i32);
        self.tile(p)
    }

    /// World position of the center of tile `p`, at height `height`.
    ///
    /// `tile_at(world_point_for(p, h))` is `p` for every `p` in bounds.
    pub fn world_point_for(&self, p: Point, height: f32) -> Vec3 {
        let half = self.half_extent();
        Vec3::new(
            (p.x as f32 + 0.5) * self.scale - half.x,
            height,
            (p.y as f32 + 0.5) * self.scale - half.y,
        )
    }

    // -----------------------------------------------------------------------
    // Selection channel
    // -----------------------------------------------------------------------

    /// Register a listener for tile selections.
    pub fn on_selection(&self, listener: impl Fn(&Tile) + 'static) -> ListenerId {
        self.selection.add(listener)
    }

    /// Register a listener that stays registered while it returns `true`.
    pub fn on_selection_while(&self, listener: impl Fn(&Tile) -> bool + 'static) -> ListenerId {
        self.selection.add_while(listener)
    }

    pub fn remove_selection_listener(&self, id: ListenerId) -> bool {
        self.selection.remove(id)
    }

    pub fn selection_listeners(&self) -> usize {
        self.selection.len()
    }

    /// Broadcast `tile` to every selection listener, in registration order.
    /// Returns the number of listeners notified.
    pub fn notify_selection(&self, tile: Tile) -> usize {
        self.selection.dispatch(&tile)
    }

    /// Resolve a world point from an input collaborator and broadcast the
    /// tile under it. Nothing fires when there is no point or no tile.
    pub fn select_world_point(&self, world: Option<Vec3>) -> Option<Tile> {
        let tile = self.tile_at(world?)?;
        self.notify_selection(tile);
        Some(tile)
    }

    /// Ask `source` for a world point and broadcast the tile under it.
    pub fn select_from(&self, source: &mut impl WorldPointSource) -> Option<Tile> {
        self.select_world_point(source.resolve_world_point())
    }
}

/// The input side of selection: something that turns pointer input into a
/// world-space point, or nothing when the pointer hits no geometry.
pub trait WorldPointSource {
    fn resolve_world_point(&mut self) -> Option<Vec3>;
}

impl<F: FnMut() -> Option<Vec3>> WorldPointSource for F {
    fn resolve_world_point(&mut self) -> Option<Vec3> {
        self()
    }
}

/// A selection listener that logs the selected tile.
pub fn log_selection(tile: &Tile) {
    log::debug!("selected tile {tile}");
}
