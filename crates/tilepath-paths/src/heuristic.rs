use tilepath_core::Point;

/// Straight-line distance between two tiles.
#[inline]
pub fn euclidean(a: Point, b: Point) -> f32 {
    let dx = (a.x - b.x) as f32;
    let dy = (a.y - b.y) as f32;
    (dx * dx + dy * dy).sqrt()
}

/// Manhattan (L1) distance between two tiles.
#[inline]
pub fn manhattan(a: Point, b: Point) -> f32 {
    ((a.x - b.x).abs() + (a.y - b.y).abs()) as f32
}

/// Cost estimate between two tiles.
///
/// The same function prices a single step between adjacent tiles, so the
/// choice also changes what the search considers a cheap route, not only
/// how eagerly it heads for the target.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum Heuristic {
    /// `sqrt(dx² + dy²)`
    #[default]
    Euclidean,
    /// `|dx| + |dy|`
    Manhattan,
    /// `(0.3 · euclidean + 0.7 · manhattan) / 2`
    Combined,
}

impl Heuristic {
    pub const ALL: [Heuristic; 3] = [Self::Euclidean, Self::Manhattan, Self::Combined];

    #[inline]
    pub fn estimate(self, from: Point, to: Point) -> f32 {
        match self {
            Self::Euclidean => euclidean(from, to),
            Self::Manhattan => manhattan(from, to),
            Self::Combined => (0.3 * euclidean(from, to) + 0.7 * manhattan(from, to)) / 2.0,
        }
    }
}
