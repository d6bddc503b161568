//! Grid configuration.

use crate::error::{ConfigError, ensure_positive};

/// Dimensions and scale of a [`TileGrid`](crate::TileGrid).
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GridConfig {
    /// Number of tiles along world `x`.
    pub width: i32,
    /// Number of tiles along world `z`.
    pub depth: i32,
    /// World units per tile edge.
    pub scale: f32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            width: 100,
            depth: 100,
            scale: 1.0,
        }
    }
}

impl GridConfig {
    /// A grid of `width × depth` tiles of edge `scale`.
    pub fn new(width: i32, depth: i32, scale: f32) -> Self {
        Self { width, depth, scale }
    }

    /// Set the tile scale.
    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    /// Check every field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width <= 0 || self.depth <= 0 {
            return Err(ConfigError::InvalidDimensions {
                width: self.width,
                depth: self.depth,
            });
        }
        ensure_positive(self.scale, ConfigError::InvalidScale)
    }
}
