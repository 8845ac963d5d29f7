//! Sub-bin frequency and speed refinement
//!
//! Bin centers quantize speed: with a 44.1 kHz front end and 128 bins each
//! bin spans about 172 Hz, or 2.4 mph at K band. A real echo leaks energy
//! into its neighbors, and the asymmetry of that leakage says where within
//! the bin the true peak sits. Weighted finite differences against three
//! neighbors on each side move the estimate a fraction of a bin toward the
//! heavier flank.
//!
//! The fractional bin converts to a frequency through the front end's
//! bin width, plus a fixed calibration offset, and then to speed through
//! the Doppler constant of the configured [`SpeedUnit`].
//!
//! # Example
//!
//! ```
//! use doptrak_core::interpolator::{interpolate_peak, SpeedConfig};
//! use doptrak_core::spectrum::SpectrumFrame;
//!
//! let mut bins = vec![0.0; 128];
//! bins[39] = 100.0;
//! bins[40] = 300.0;
//! bins[41] = 100.0;
//! let frame = SpectrumFrame::from_magnitudes(bins).unwrap();
//!
//! let peak = interpolate_peak(&frame, 40, &SpeedConfig::default());
//! // Symmetric neighbors: the peak sits on the bin center.
//! assert_eq!(peak.fractional_bin, 40.0);
//! assert!(peak.speed > 90.0 && peak.speed < 100.0);
//! ```

use serde::{Deserialize, Serialize};

use crate::spectrum::SpectrumFrame;
use crate::types::Mag;

/// Doppler shift per mile-per-hour at K band (24.125 GHz).
pub const K_HZ_PER_MPH: Mag = 72.083;
/// Doppler shift per kilometer-per-hour at K band.
pub const K_HZ_PER_KPH: Mag = 44.7903;
/// Doppler shift per meter-per-second at K band.
pub const K_HZ_PER_MPS: Mag = 49.1475;
/// Doppler shift per foot-per-second at K band.
pub const K_HZ_PER_FPS: Mag = 161.2453;

/// Finite-difference weights for the first, second and third neighbor.
const NEIGHBOR_WEIGHTS: [Mag; 3] = [0.25, 0.125, 0.0625];

/// Unit of reported speeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpeedUnit {
    Mph,
    Kph,
    Mps,
    Fps,
}

impl SpeedUnit {
    /// Doppler shift produced by one unit of radial speed.
    pub fn hz_per_unit(self) -> Mag {
        match self {
            SpeedUnit::Mph => K_HZ_PER_MPH,
            SpeedUnit::Kph => K_HZ_PER_KPH,
            SpeedUnit::Mps => K_HZ_PER_MPS,
            SpeedUnit::Fps => K_HZ_PER_FPS,
        }
    }
}

impl Default for SpeedUnit {
    fn default() -> Self {
        SpeedUnit::Mph
    }
}

/// Frequency and speed conversion settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeedConfig {
    /// Sample rate feeding the FFT stage, in Hz.
    pub sample_rate_hz: Mag,
    /// Calibration offset added to every computed frequency, in Hz.
    pub frequency_offset_hz: Mag,
    /// Unit of the reported speed.
    pub unit: SpeedUnit,
}

impl Default for SpeedConfig {
    fn default() -> Self {
        Self {
            sample_rate_hz: 44_100.0,
            frequency_offset_hz: 40.0,
            unit: SpeedUnit::Mph,
        }
    }
}

impl SpeedConfig {
    /// Frequency spanned by one bin of an `n`-bin magnitude frame.
    ///
    /// The front end produces `n` magnitude bins from a `2n`-point real
    /// transform.
    pub fn hz_per_bin(&self, n: usize) -> Mag {
        self.sample_rate_hz / (2.0 * n as Mag)
    }
}

/// Refined measurement of one spectral peak.
///
/// A peak too close to either edge of the frame, or with no energy at the
/// nominal bin, yields the all-zero measurement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PeakMeasurement {
    /// Sub-bin peak position.
    pub fractional_bin: Mag,
    /// Doppler frequency in Hz, offset included.
    pub frequency_hz: Mag,
    /// Speed in the configured [`SpeedUnit`].
    pub speed: Mag,
    /// Magnitude at the nominal peak bin.
    pub signal_level: Mag,
}

/// Refine the peak at `index` to a fractional bin, frequency and speed.
///
/// `index` needs three valid neighbors on each side; bin 0 carries DC and
/// never participates.
pub fn interpolate_peak(frame: &SpectrumFrame, index: usize, cfg: &SpeedConfig) -> PeakMeasurement {
    let n = frame.len();
    if index <= NEIGHBOR_WEIGHTS.len() || index >= n - NEIGHBOR_WEIGHTS.len() {
        return PeakMeasurement::default();
    }
    let present = frame.bin(index);
    if present <= 0.0 {
        return PeakMeasurement::default();
    }

    let mut correction = 0.0;
    for (k, &weight) in NEIGHBOR_WEIGHTS.iter().enumerate() {
        let offset = k + 1;
        correction -= (present - frame.bin(index - offset)) * weight;
        correction += (present - frame.bin(index + offset)) * weight;
    }

    let fractional_bin = index as Mag - correction / present;
    let frequency_hz = cfg.hz_per_bin(n) * fractional_bin + cfg.frequency_offset_hz;
    let speed = frequency_hz / cfg.unit.hz_per_unit();

    PeakMeasurement {
        fractional_bin,
        frequency_hz,
        speed,
        signal_level: present,
    }
}
