//! World configuration
//!
//! The collision space of a level: the rectangle covered by the quadtree root
//! and how finely it may be subdivided. Owned by whichever system loads the
//! level and handed to the collision space explicitly.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::math::Rect;

/// Default quadtree granularity, decent on both small and large worlds
pub const DEFAULT_DIVISIONS: u32 = 3;

/// Configuration errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("quadtree divisions must be at least 1")]
    ZeroDivisions,

    #[error("world bounds must have a positive size, got {width}x{height}")]
    InvalidBounds { width: f32, height: f32 },
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Collision world configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Area covered by the root of the quadtree
    pub bounds: Rect,
    /// Granularity of the quadtree
    pub divisions: u32,
}

impl WorldConfig {
    /// Create a validated configuration
    pub fn new(bounds: Rect, divisions: u32) -> ConfigResult<Self> {
        let config = Self { bounds, divisions };
        config.validate()?;
        Ok(config)
    }

    /// Check the configuration for values the quadtree cannot work with
    pub fn validate(&self) -> ConfigResult<()> {
        if self.divisions == 0 {
            return Err(ConfigError::ZeroDivisions);
        }
        if self.bounds.width <= 0.0 || self.bounds.height <= 0.0 {
            return Err(ConfigError::InvalidBounds {
                width: self.bounds.width,
                height: self.bounds.height,
            });
        }
        Ok(())
    }

    /// Smallest node extent that may still be subdivided
    pub fn min_size(&self) -> f32 {
        (self.bounds.width + self.bounds.height) / (2.0 * self.divisions.max(1) as f32)
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            bounds: Rect::new(0.0, 0.0, 640.0, 480.0),
            divisions: DEFAULT_DIVISIONS,
        }
    }
}
