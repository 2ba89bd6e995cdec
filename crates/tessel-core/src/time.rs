//! Time Management
//!
//! Per-frame elapsed time as seen by the physics integrator:
//! - Clamping of long frames so a hitch never tunnels bodies through walls
//! - Time scale for slow motion or fast forward
//! - Pause support

use serde::{Deserialize, Serialize};

/// Elapsed simulation time for one frame, in seconds
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd)]
pub struct DeltaTime(pub f64);

impl DeltaTime {
    pub const ZERO: Self = Self(0.0);

    pub fn from_secs(secs: f64) -> Self {
        Self(secs)
    }

    pub fn as_secs(&self) -> f64 {
        self.0
    }

    /// Seconds at the precision bodies integrate with
    pub fn as_secs_f32(&self) -> f32 {
        self.0 as f32
    }
}

/// Frame time configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeConfig {
    /// Longest frame the simulation will step in one go, in seconds
    pub max_elapsed: f64,
    /// Multiplier applied after clamping
    pub time_scale: f64,
}

impl Default for TimeConfig {
    fn default() -> Self {
        Self {
            max_elapsed: 0.0333,
            time_scale: 1.0,
        }
    }
}

/// Time manager producing the elapsed value handed to the integrator
#[derive(Debug, Clone)]
pub struct TimeManager {
    config: TimeConfig,
    delta_time: f64,
    total_time: f64,
    frame_count: u64,
    paused: bool,
}

impl TimeManager {
    /// Create a new time manager with default settings
    pub fn new() -> Self {
        Self::with_config(TimeConfig::default())
    }

    /// Create a new time manager with the given settings
    pub fn with_config(config: TimeConfig) -> Self {
        Self {
            config,
            delta_time: 0.0,
            total_time: 0.0,
            frame_count: 0,
            paused: false,
        }
    }

    /// Advance one frame given the real time since the previous frame
    pub fn update(&mut self, real_delta: f64) -> DeltaTime {
        let real_delta = if real_delta < 0.0 || real_delta.is_nan() {
            log::warn!("Ignoring invalid frame time {real_delta}");
            0.0
        } else {
            real_delta
        };

        let clamped = real_delta.min(self.config.max_elapsed);
        let scaled = if self.paused { 0.0 } else { clamped * self.config.time_scale };

        self.delta_time = scaled;
        self.total_time += scaled;
        self.frame_count += 1;

        DeltaTime(scaled)
    }

    /// Elapsed time handed out by the last [`update`](Self::update)
    pub fn delta_time(&self) -> DeltaTime {
        DeltaTime(self.delta_time)
    }

    /// Sum of every scaled frame so far
    pub fn total_time(&self) -> f64 {
        self.total_time
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Negative scales are treated as zero
    pub fn set_time_scale(&mut self, scale: f64) {
        self.config.time_scale = scale.max(0.0);
    }

    pub fn time_scale(&self) -> f64 {
        self.config.time_scale
    }

    /// Set the longest frame that will be stepped at once
    pub fn set_max_elapsed(&mut self, max_elapsed: f64) {
        self.config.max_elapsed = max_elapsed.max(0.0);
    }

    /// Frames updated while paused advance the frame counter only
    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }
}

impl Default for TimeManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delta_time_precision() {
        let dt = DeltaTime::from_secs(0.02);
        assert_eq!(dt.as_secs(), 0.02);
        assert!((dt.as_secs_f32() - 0.02).abs() < 1e-7);
        assert!(DeltaTime::ZERO < dt);
    }

    #[test]
    fn test_time_manager() {
        let mut tm = TimeManager::new();

        let dt = tm.update(0.016);
        assert_eq!(tm.frame_count(), 1);
        assert!((dt.as_secs() - 0.016).abs() < 0.0001);
    }

    #[test]
    fn test_long_frame_is_clamped() {
        let mut tm = TimeManager::new();

        let dt = tm.update(0.5);
        assert!((dt.as_secs() - 0.0333).abs() < 0.0001);
    }

    #[test]
    fn test_negative_frame_time() {
        let mut tm = TimeManager::new();

        assert_eq!(tm.update(-1.0), DeltaTime::ZERO);
        assert_eq!(tm.total_time(), 0.0);
    }

    #[test]
    fn test_time_manager_pause() {
        let mut tm = TimeManager::new();

        tm.pause();
        assert!(tm.is_paused());

        let total_before = tm.total_time();
        assert_eq!(tm.update(0.016), DeltaTime::ZERO);
        assert_eq!(tm.total_time(), total_before);
        assert_eq!(tm.frame_count(), 1);

        tm.resume();
        assert!(!tm.is_paused());
    }

    #[test]
    fn test_time_scale() {
        let mut tm = TimeManager::new();
        tm.set_time_scale(2.0);

        tm.update(0.016);
        assert!((tm.delta_time().as_secs() - 0.032).abs() < 0.001);

        // Scaling happens after the clamp
        tm.update(1.0);
        assert!((tm.delta_time().as_secs() - 0.0666).abs() < 0.0001);
    }
}
