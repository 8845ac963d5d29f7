//! Core types for Doppler traffic-radar tracking
//!
//! This module defines the fundamental types used throughout the tracking
//! engine, which operates on magnitude spectra produced by an external FFT
//! stage from a K-band Doppler audio signal.
//!
//! ## Spectrum frames and bins
//!
//! Each processing cycle delivers one frame of N magnitude samples (N = 128
//! or 512), one per frequency bin. A vehicle echo appears as a local peak
//! whose bin index is proportional to its radial speed:
//!
//! ```text
//!  magnitude
//!      ^
//!      |            *  <- vehicle echo (peak)
//!      |           * *
//!      |  *       *   *
//!      | * *     *     *
//!      |*   * * *       * * * ...
//!      +----------------------------> bin index (frequency)
//!       0   (DC / low-frequency noise lives in bin 0)
//! ```
//!
//! At K band the Doppler shift is about 72 Hz per mph of radial speed, so a
//! peak's bin maps directly to a vehicle speed once refined to sub-bin
//! resolution (see [`crate::interpolator`]).

use serde::{Deserialize, Serialize};

/// A magnitude, threshold, or phase value.
///
/// All algorithmic code goes through this alias so a fixed-point build for
/// small targets only has to swap the underlying type here.
pub type Mag = f64;

/// Result type for tracker operations.
pub type TrackerResult<T> = Result<T, TrackerError>;

/// Errors that can occur constructing the tracker or ingesting frames.
///
/// The tracking path itself never fails: a cycle with no usable peaks decays
/// tracks rather than erroring.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TrackerError {
    #[error("Unsupported FFT size: {0}. Must be 128 or 512")]
    UnsupportedFftSize(usize),

    #[error("Frame length mismatch: expected {expected}, got {actual}")]
    FrameSizeMismatch { expected: usize, actual: usize },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Movement classification of a tracked vehicle relative to the antenna.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// No confirmed direction (fresh track, or confidence lost).
    Unknown,
    /// Closing on the antenna.
    Towards,
    /// Receding from the antenna.
    Away,
}

impl Default for Direction {
    fn default() -> Self {
        Direction::Unknown
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Unknown => write!(f, "unknown"),
            Direction::Towards => write!(f, "towards"),
            Direction::Away => write!(f, "away"),
        }
    }
}
