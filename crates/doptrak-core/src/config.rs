//! Engine configuration
//!
//! All tunables live in one [`TrackerConfig`] tree so a deployment can be
//! captured, shipped and replayed as a single serialized document. Every
//! field has a default matching the shipped K-band roadside unit, and
//! every section deserializes with `#[serde(default)]`, so a config file
//! only needs the fields it changes.
//!
//! # Example
//!
//! ```
//! use doptrak_core::config::TrackerConfig;
//!
//! let config: TrackerConfig = serde_json::from_str(
//!     r#"{ "fft_size": 512, "initial_threshold": 30.0 }"#,
//! ).unwrap();
//! assert_eq!(config.fft_size, 512);
//! assert_eq!(config.capacity, 4);
//! config.validate().unwrap();
//! ```

use serde::{Deserialize, Serialize};

use crate::direction::DirectionConfig;
use crate::interpolator::SpeedConfig;
use crate::side_firing::SideFiringConfig;
use crate::spectrum::validate_fft_size;
use crate::types::{Mag, TrackerError, TrackerResult};

/// Complete engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Magnitude bins per frame, 128 or 512.
    pub fft_size: usize,
    /// Track table slots, one per concurrently tracked vehicle.
    pub capacity: usize,
    /// First searchable bin. Bin 0 carries DC and is never searched.
    pub start_bin: usize,
    /// Half-width of the re-acquisition window, and the bin distance under
    /// which a discovery duplicates an existing track.
    pub search_half_width: usize,
    /// Base bin displacement allowed per cycle on top of the previous
    /// accepted displacement. The default of 4 bins corresponds to about
    /// 3 mph per second of acceleration at the shipped frame rate.
    pub acceleration_bound: i32,
    /// Detection floor at power-on.
    pub initial_threshold: Mag,
    /// The adaptive floor never rises above this.
    pub threshold_ceiling: Mag,
    /// Adaptive floor creep per cycle.
    pub threshold_step: Mag,
    /// Fixed sensitivity floor. Discovery requires the full value,
    /// re-acquisition half of it.
    pub sensitivity_floor: Mag,
    /// Cap for the consecutive re-acquisition counter.
    pub track_counter_cap: u32,
    /// Cap for the magnitude confidence counter.
    pub magnitude_confidence_cap: i32,
    pub direction: DirectionConfig,
    pub side_firing: SideFiringConfig,
    pub speed: SpeedConfig,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            fft_size: 128,
            capacity: 4,
            start_bin: 1,
            search_half_width: 5,
            acceleration_bound: 4,
            initial_threshold: 50.0,
            threshold_ceiling: 50.0,
            threshold_step: 0.1,
            sensitivity_floor: 2.0,
            track_counter_cap: 1000,
            magnitude_confidence_cap: 20,
            direction: DirectionConfig::default(),
            side_firing: SideFiringConfig::default(),
            speed: SpeedConfig::default(),
        }
    }
}

impl TrackerConfig {
    /// Check the configuration for values the engine cannot run with.
    pub fn validate(&self) -> TrackerResult<()> {
        validate_fft_size(self.fft_size)?;
        if self.capacity == 0 {
            return Err(TrackerError::InvalidConfig(
                "capacity must be at least 1".into(),
            ));
        }
        if self.start_bin == 0 || self.start_bin >= self.fft_size {
            return Err(TrackerError::InvalidConfig(
                "start_bin must lie in 1..fft_size".into(),
            ));
        }
        if self.search_half_width == 0 {
            return Err(TrackerError::InvalidConfig(
                "search_half_width must be at least 1".into(),
            ));
        }
        if self.acceleration_bound < 1 {
            return Err(TrackerError::InvalidConfig(
                "acceleration_bound must be at least 1".into(),
            ));
        }
        if self.initial_threshold < 0.0
            || self.threshold_ceiling < 0.0
            || self.threshold_step <= 0.0
        {
            return Err(TrackerError::InvalidConfig(
                "threshold settings must be non-negative with a positive step".into(),
            ));
        }
        if self.sensitivity_floor < 0.0 {
            return Err(TrackerError::InvalidConfig(
                "sensitivity_floor must be non-negative".into(),
            ));
        }
        if self.direction.counter_limit < 1 {
            return Err(TrackerError::InvalidConfig(
                "direction.counter_limit must be at least 1".into(),
            ));
        }
        if self.direction.confidence_cap < 1 {
            return Err(TrackerError::InvalidConfig(
                "direction.confidence_cap must be at least 1".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.direction.delta_theta_filter)
            || self.direction.delta_theta_filter == 0.0
        {
            return Err(TrackerError::InvalidConfig(
                "direction.delta_theta_filter must lie in (0, 1]".into(),
            ));
        }
        if self.side_firing.confidence_min < 1
            || self.side_firing.confidence_max <= self.side_firing.confidence_min
        {
            return Err(TrackerError::InvalidConfig(
                "side_firing confidence bounds must satisfy 1 <= min < max".into(),
            ));
        }
        if self.side_firing.min_index >= self.fft_size {
            return Err(TrackerError::InvalidConfig(
                "side_firing.min_index must lie below fft_size".into(),
            ));
        }
        if self.speed.sample_rate_hz <= 0.0 {
            return Err(TrackerError::InvalidConfig(
                "speed.sample_rate_hz must be positive".into(),
            ));
        }
        Ok(())
    }
}
