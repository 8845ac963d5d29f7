//! Spectrum frame ingestion
//!
//! The tracking engine consumes one magnitude frame per processing cycle,
//! produced by an external FFT stage as N signed 16-bit values (N = 128 or
//! 512, one per frequency bin). [`SpectrumFrame`] owns a converted copy so
//! the producer can refill its own buffer while a cycle runs.
//!
//! A frame may additionally carry per-bin phase observations for the two
//! receive channels. These are only consulted by the phase-sensing
//! direction policy (see [`crate::direction`]); magnitude-only frames are
//! the common case.
//!
//! # Example
//!
//! ```
//! use doptrak_core::spectrum::SpectrumFrame;
//!
//! let raw = vec![0i16; 128];
//! let frame = SpectrumFrame::from_raw(&raw, 128).unwrap();
//! assert_eq!(frame.len(), 128);
//!
//! // Wrong length is rejected up front.
//! assert!(SpectrumFrame::from_raw(&raw, 512).is_err());
//! ```

use crate::types::{Mag, TrackerError, TrackerResult};

/// FFT output lengths the engine supports.
pub const SUPPORTED_FFT_SIZES: [usize; 2] = [128, 512];

/// Check a frame length against [`SUPPORTED_FFT_SIZES`].
pub fn validate_fft_size(n: usize) -> TrackerResult<()> {
    if SUPPORTED_FFT_SIZES.contains(&n) {
        Ok(())
    } else {
        Err(TrackerError::UnsupportedFftSize(n))
    }
}

/// One cycle's magnitude spectrum, read-only during a tracking pass.
#[derive(Debug, Clone)]
pub struct SpectrumFrame {
    bins: Vec<Mag>,
    phase_left: Option<Vec<Mag>>,
    phase_right: Option<Vec<Mag>>,
}

impl SpectrumFrame {
    /// Ingest a raw frame in the format the hardware FFT stage produces.
    ///
    /// `fft_size` is the configured bin count; the raw slice must match it
    /// exactly.
    pub fn from_raw(raw: &[i16], fft_size: usize) -> TrackerResult<Self> {
        validate_fft_size(fft_size)?;
        if raw.len() != fft_size {
            return Err(TrackerError::FrameSizeMismatch {
                expected: fft_size,
                actual: raw.len(),
            });
        }
        Ok(Self {
            bins: raw.iter().map(|&v| Mag::from(v)).collect(),
            phase_left: None,
            phase_right: None,
        })
    }

    /// Build a frame from already-converted magnitudes (simulation, tests).
    pub fn from_magnitudes(bins: Vec<Mag>) -> TrackerResult<Self> {
        validate_fft_size(bins.len())?;
        Ok(Self {
            bins,
            phase_left: None,
            phase_right: None,
        })
    }

    /// Attach per-bin phase observations for the left and right receive
    /// channels, in turns (one full revolution = 1.0).
    pub fn with_phases(mut self, left: Vec<Mag>, right: Vec<Mag>) -> TrackerResult<Self> {
        if left.len() != self.bins.len() {
            return Err(TrackerError::FrameSizeMismatch {
                expected: self.bins.len(),
                actual: left.len(),
            });
        }
        if right.len() != self.bins.len() {
            return Err(TrackerError::FrameSizeMismatch {
                expected: self.bins.len(),
                actual: right.len(),
            });
        }
        self.phase_left = Some(left);
        self.phase_right = Some(right);
        Ok(self)
    }

    /// Number of bins in this frame.
    pub fn len(&self) -> usize {
        self.bins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    /// Magnitude at `index`.
    #[inline]
    pub fn bin(&self, index: usize) -> Mag {
        self.bins[index]
    }

    /// All magnitudes in bin order.
    pub fn bins(&self) -> &[Mag] {
        &self.bins
    }

    /// Whether phase observations are attached.
    pub fn has_phases(&self) -> bool {
        self.phase_left.is_some() && self.phase_right.is_some()
    }

    /// `(left, right)` channel phases at `index`, if attached.
    pub fn phases_at(&self, index: usize) -> Option<(Mag, Mag)> {
        match (&self.phase_left, &self.phase_right) {
            (Some(left), Some(right)) => Some((left[index], right[index])),
            _ => None,
        }
    }
}
