//! # doptrak-core
//!
//! Multi-target Doppler vehicle tracking over FFT magnitude spectra.
//!
//! A roadside Doppler radar sees every vehicle in range as one spectral
//! peak: the bin is its radial speed, the magnitude its echo strength.
//! This crate turns a stream of such frames into stable vehicle tracks
//! with speed, direction and pass detection, using the fixed-size,
//! allocation-light structure of the firmware it descends from.
//!
//! The engine is single-threaded and synchronous. Feed one
//! [`SpectrumFrame`] per cycle into [`VehicleTracker::process_frame`] and
//! read the results back through [`VehicleTracker::tracks`] or
//! [`VehicleTracker::track_reports`].
//!
//! # Example
//!
//! ```
//! use doptrak_core::prelude::*;
//!
//! let mut tracker = VehicleTracker::new(TrackerConfig::default()).unwrap();
//!
//! let mut bins = vec![0.0; 128];
//! bins[45] = 250.0;
//! bins[46] = 320.0;
//! bins[47] = 240.0;
//! let frame = SpectrumFrame::from_magnitudes(bins).unwrap();
//!
//! tracker.process_frame(&frame).unwrap();
//! let reports = tracker.track_reports(&frame).unwrap();
//! assert_eq!(reports[0].bin, 46);
//! assert!(reports[0].speed > 100.0);
//! ```
//!
//! # Modules
//!
//! - [`tracker`]: the cycle engine tying everything together
//! - [`spectrum`]: frame ingestion and validation
//! - [`track`]: track slots, confidence counters, decay
//! - [`direction`]: direction classification with hysteresis
//! - [`side_firing`]: vehicle pass detection for side-firing installs
//! - [`threshold`]: occupancy-driven detection floor
//! - [`interpolator`]: sub-bin frequency and speed refinement
//! - [`config`]: the serializable configuration tree
//! - [`observe`]: logging setup for binaries

pub mod config;
pub mod direction;
pub mod interpolator;
pub mod observe;
pub mod side_firing;
pub mod spectrum;
pub mod threshold;
pub mod track;
pub mod tracker;
pub mod types;

pub use config::TrackerConfig;
pub use direction::{DirectionConfig, DirectionPolicy};
pub use interpolator::{interpolate_peak, PeakMeasurement, SpeedConfig, SpeedUnit};
pub use side_firing::{SfrState, SideFiringConfig, SideFiringSlot};
pub use spectrum::SpectrumFrame;
pub use threshold::AdaptiveThreshold;
pub use track::{Track, TrackConfidence};
pub use tracker::{CycleStats, TrackReport, TrackerStats, VehicleTracker};
pub use types::{Direction, Mag, TrackerError, TrackerResult};

/// Everything most users need, in one import.
pub mod prelude {
    pub use crate::config::TrackerConfig;
    pub use crate::direction::{DirectionConfig, DirectionPolicy};
    pub use crate::interpolator::{interpolate_peak, PeakMeasurement, SpeedConfig, SpeedUnit};
    pub use crate::side_firing::{SfrState, SideFiringConfig};
    pub use crate::spectrum::SpectrumFrame;
    pub use crate::track::{Track, TrackConfidence};
    pub use crate::tracker::{CycleStats, TrackReport, TrackerStats, VehicleTracker};
    pub use crate::types::{Direction, Mag, TrackerError, TrackerResult};
}
