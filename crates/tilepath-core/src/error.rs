//! Configuration errors.
//!
//! Grid queries, searches and motion never fail with an error value: absent
//! tiles are `None` and an unreachable target simply produces no path. The
//! only fallible surface is building things from configuration values.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("grid dimensions must be positive, got {width}x{depth}")]
    InvalidDimensions { width: i32, depth: i32 },
    #[error("tile scale must be positive and finite, got {0}")]
    InvalidScale(f32),
    #[error("movement speed must be positive and finite, got {0}")]
    InvalidSpeed(f32),
    #[error("arrival tolerance must be positive and finite, got {0}")]
    InvalidTolerance(f32),
    #[error("tick length must be positive and finite, got {0}")]
    InvalidTick(f32),
    #[error("walkable chance must be within [0, 1], got {0}")]
    InvalidWalkableChance(f64),
    #[error("expansion budget per tick must be at least 1")]
    ZeroExpansionBudget,
    #[error("map row {row} has {len} columns, expected {expected}")]
    RaggedRow { row: usize, len: usize, expected: usize },
    #[error("unknown map character {ch:?} at row {row}, column {col}")]
    UnknownMapChar { ch: char, row: usize, col: usize },
}

/// `Ok` when `v` is a positive, finite float.
pub fn ensure_positive(v: f32, err: impl FnOnce(f32) -> ConfigError) -> Result<(), ConfigError> {
    if v.is_finite() && v > 0.0 { Ok(()) } else { Err(err(v)) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages() {
        let e = ConfigError::InvalidDimensions { width: 0, depth: 3 };
        assert_eq!(e.to_string(), "grid dimensions must be positive, got 0x3");
        assert_eq!(
            ConfigError::InvalidScale(-1.0).to_string(),
            "tile scale must be positive and finite, got -1"
        );
    }

    #[test]
    fn ensure_positive_rejects_nan_zero_and_infinity() {
        assert!(ensure_positive(1.0, ConfigError::InvalidSpeed).is_ok());
        assert!(ensure_positive(0.0, ConfigError::InvalidSpeed).is_err());
        assert!(ensure_positive(f32::NAN, ConfigError::InvalidSpeed).is_err());
        assert!(ensure_positive(f32::INFINITY, ConfigError::InvalidSpeed).is_err());
    }
}
