//! Walkability policies used once, when a [`TileGrid`](crate::TileGrid) is
//! filled.

use rand::Rng;

use crate::error::ConfigError;
use crate::geom::Point;

/// Decides whether the tile at a coordinate starts out walkable.
///
/// Called exactly once per tile, in row-major order.
pub trait WalkabilityPolicy {
    fn is_walkable(&mut self, p: Point) -> bool;
}

impl<F: FnMut(Point) -> bool> WalkabilityPolicy for F {
    fn is_walkable(&mut self, p: Point) -> bool {
        self(p)
    }
}

/// Every tile is walkable.
#[derive(Copy, Clone, Debug, Default)]
pub struct AllWalkable;

impl WalkabilityPolicy for AllWalkable {
    fn is_walkable(&mut self, _p: Point) -> bool {
        true
    }
}

/// Each tile is independently walkable with probability `walkable_chance`.
#[derive(Clone, Debug)]
pub struct RandomWalkable<R: Rng> {
    rng: R,
    walkable_chance: f64,
}

impl<R: Rng> RandomWalkable<R> {
    /// Nine tiles in ten are walkable.
    pub const MOSTLY_WALKABLE: f64 = 0.9;

    pub fn new(rng: R, walkable_chance: f64) -> Result<Self, ConfigError> {
        if !(0.0..=1.0).contains(&walkable_chance) {
            return Err(ConfigError::InvalidWalkableChance(walkable_chance));
        }
        Ok(Self {
            rng,
            walkable_chance,
        })
    }

    /// [`MOSTLY_WALKABLE`](Self::MOSTLY_WALKABLE) bias.
    pub fn mostly_walkable(rng: R) -> Self {
        Self {
            rng,
            walkable_chance: Self::MOSTLY_WALKABLE,
        }
    }

    pub fn walkable_chance(&self) -> f64 {
        self.walkable_chance
    }
}

impl<R: Rng> WalkabilityPolicy for RandomWalkable<R> {
    fn is_walkable(&mut self, _p: Point) -> bool {
        self.rng.random_bool(self.walkable_chance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn closure_policy() {
        let mut policy = |p: Point| p.x != 2;
        assert!(policy.is_walkable(Point::new(1, 0)));
        assert!(!policy.is_walkable(Point::new(2, 7)));
    }

    #[test]
    fn random_rejects_bad_chance() {
        let rng = StdRng::seed_from_u64(1);
        assert_eq!(
            RandomWalkable::new(rng, 1.5).err(),
            Some(ConfigError::InvalidWalkableChance(1.5))
        );
    }

    #[test]
    fn random_extremes() {
        let mut never = RandomWalkable::new(StdRng::seed_from_u64(3), 0.0).unwrap();
        let mut always = RandomWalkable::new(StdRng::seed_from_u64(3), 1.0).unwrap();
        for x in 0..50 {
            assert!(!never.is_walkable(Point::new(x, 0)));
            assert!(always.is_walkable(Point::new(x, 0)));
        }
    }

    #[test]
    fn random_is_reproducible_from_seed() {
        let sample = |seed| {
            let mut policy = RandomWalkable::mostly_walkable(StdRng::seed_from_u64(seed));
            (0..64).map(|x| policy.is_walkable(Point::new(x, 0))).collect::<Vec<_>>()
        };
        assert_eq!(sample(42), sample(42));
    }
}
