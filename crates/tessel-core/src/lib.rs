//! # Tessel Core
//!
//! Foundational types shared by the Tessel collision engine:
//! - **Math**: axis-aligned rectangles, the shared rounding epsilon and point rotation
//! - **Time**: per-frame elapsed time with clamping, time scale and pause
//! - **Config**: world bounds and quadtree granularity owned by the level manager

pub mod config;
pub mod math;
pub mod time;

pub use config::{ConfigError, ConfigResult, WorldConfig};
pub use math::{ROUNDING_ERROR, Rect, Vec2};
pub use time::{DeltaTime, TimeConfig, TimeManager};
