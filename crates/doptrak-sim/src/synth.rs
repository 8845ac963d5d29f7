//! Tone synthesis and FFT front end
//!
//! Stands in for the analog chain: [`ToneSynth`] produces the audio-band
//! Doppler tone a scenario commands, with Gaussian channel noise, and
//! [`FftFrontEnd`] turns sample blocks into the integer magnitude frames
//! the tracker ingests, scaled the way the hardware FFT stage scales
//! them.
//!
//! The synthesizer keeps its oscillator phase across blocks, so a
//! frequency sweep stays free of phase discontinuities, and draws its
//! noise from a seeded generator so simulation runs reproduce exactly.

use std::f64::consts::PI;
use std::sync::Arc;

use num_complex::Complex;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use rustfft::{Fft, FftPlanner};

use doptrak_core::spectrum::{validate_fft_size, SpectrumFrame};
use doptrak_core::types::{TrackerError, TrackerResult};

/// Magnitude of a unit-amplitude, bin-centered tone after conversion.
const DEFAULT_FULL_SCALE: f64 = 1024.0;

/// Phase-continuous tone generator with Gaussian noise.
#[derive(Debug, Clone)]
pub struct ToneSynth {
    sample_rate_hz: f64,
    phase: f64,
    noise: Normal<f64>,
    rng: StdRng,
}

impl ToneSynth {
    /// `noise_std` must be finite and non-negative.
    pub fn new(sample_rate_hz: f64, noise_std: f64, seed: u64) -> Self {
        Self {
            sample_rate_hz,
            phase: 0.0,
            noise: Normal::new(0.0, noise_std).unwrap(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Produce one block of the commanded tone.
    pub fn block(&mut self, frequency_hz: f64, amplitude: f64, len: usize) -> Vec<f64> {
        let step = 2.0 * PI * frequency_hz / self.sample_rate_hz;
        let mut samples = Vec::with_capacity(len);
        for _ in 0..len {
            self.phase += step;
            if self.phase > 2.0 * PI {
                self.phase -= 2.0 * PI;
            }
            samples.push(amplitude * self.phase.sin() + self.noise.sample(&mut self.rng));
        }
        samples
    }
}

/// Real-input FFT stage producing tracker-ready magnitude frames.
pub struct FftFrontEnd {
    fft: Arc<dyn Fft<f64>>,
    output_bins: usize,
    full_scale: f64,
}

impl FftFrontEnd {
    /// Plan a front end for `output_bins` magnitude bins (a `2n`-point
    /// transform).
    pub fn new(output_bins: usize) -> TrackerResult<Self> {
        validate_fft_size(output_bins)?;
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(output_bins * 2);
        Ok(Self {
            fft,
            output_bins,
            full_scale: DEFAULT_FULL_SCALE,
        })
    }

    pub fn with_full_scale(mut self, full_scale: f64) -> Self {
        self.full_scale = full_scale;
        self
    }

    /// Samples consumed per frame.
    pub fn frame_len(&self) -> usize {
        self.output_bins * 2
    }

    /// Transform one sample block into a magnitude frame.
    ///
    /// A unit-amplitude tone centered on a bin lands at `full_scale`
    /// counts; everything saturates at `i16::MAX` like the hardware
    /// stage.
    pub fn frame(&self, samples: &[f64]) -> TrackerResult<SpectrumFrame> {
        if samples.len() != self.frame_len() {
            return Err(TrackerError::FrameSizeMismatch {
                expected: self.frame_len(),
                actual: samples.len(),
            });
        }

        let mut buffer: Vec<Complex<f64>> =
            samples.iter().map(|&s| Complex::new(s, 0.0)).collect();
        self.fft.process(&mut buffer);

        let gain = 2.0 * self.full_scale / self.frame_len() as f64;
        let raw: Vec<i16> = buffer[..self.output_bins]
            .iter()
            .map(|c| (c.norm() * gain).min(i16::MAX as f64) as i16)
            .collect();
        SpectrumFrame::from_raw(&raw, self.output_bins)
    }
}
