//! Drive-by scenario
//!
//! Replays the Doppler signature of a single vehicle passing a
//! side-firing antenna as a frequency/amplitude command pair: silence,
//! an approach tone ramping up at full Doppler shift, a sweep down to
//! zero as the vehicle draws level, a short hold, the mirrored sweep
//! away, and fade-out. The scenario loops, so a soak test gets one pass
//! after another.
//!
//! Time advances in milliseconds through [`DriveByScenario::step`]; all
//! ramp rates scale with the step size, so frame-sized and
//! millisecond-sized steps trace the same envelope.
//!
//! # Example
//!
//! ```
//! use doptrak_sim::scenario::{DriveByConfig, DriveByScenario, DrivePhase};
//!
//! let mut scenario = DriveByScenario::new(DriveByConfig::default());
//! let tone = scenario.step(1000);
//! assert_eq!(scenario.phase(), DrivePhase::IncreaseAmplitude);
//! assert_eq!(tone.frequency_hz, 8000.0);
//! assert_eq!(tone.amplitude, 0.0);
//! ```

use serde::{Deserialize, Serialize};

/// Below this frequency the tone also fades, so the sweep does not park
/// audible energy in the DC bins.
const LOW_FREQUENCY_CUTOFF_HZ: f64 = 100.0;

/// Phases of the simulated pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrivePhase {
    /// Quiet period before the vehicle enters range.
    Startup,
    /// Approach tone ramping up at full Doppler shift.
    IncreaseAmplitude,
    /// Doppler sweep down to zero as the vehicle draws level.
    DecreaseFrequency,
    /// Directly in front: no radial speed.
    Hold,
    /// Doppler sweep back up as the vehicle departs.
    IncreaseFrequency,
    /// Departure tone fading out.
    DecreaseAmplitude,
    /// Quiet period after the pass; wraps back to [`DrivePhase::Startup`].
    Done,
}

/// Timing and envelope of one pass. Durations are in milliseconds and
/// must be positive.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DriveByConfig {
    pub startup_ms: u32,
    /// Approach tone ramp from silence to full amplitude.
    pub amplitude_ramp_ms: u32,
    /// Full-shift to zero sweep duration, each direction.
    pub frequency_ramp_ms: u32,
    /// Fade duration used near zero frequency.
    pub fade_ms: u32,
    pub hold_ms: u32,
    pub done_ms: u32,
    /// Doppler shift of the vehicle at full approach speed.
    pub peak_frequency_hz: f64,
    pub peak_amplitude: f64,
}

impl Default for DriveByConfig {
    fn default() -> Self {
        Self {
            startup_ms: 1000,
            amplitude_ramp_ms: 2000,
            frequency_ramp_ms: 2000,
            fade_ms: 100,
            hold_ms: 250,
            done_ms: 2500,
            peak_frequency_hz: 8000.0,
            peak_amplitude: 0.5,
        }
    }
}

/// Tone the synthesizer should produce for the current step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ToneCommand {
    pub frequency_hz: f64,
    pub amplitude: f64,
}

/// The looping pass generator.
#[derive(Debug, Clone)]
pub struct DriveByScenario {
    config: DriveByConfig,
    phase: DrivePhase,
    frequency_hz: f64,
    amplitude: f64,
    timer_ms: u32,
    laps: u32,
}

impl DriveByScenario {
    pub fn new(config: DriveByConfig) -> Self {
        Self {
            config,
            phase: DrivePhase::Startup,
            frequency_hz: 0.0,
            amplitude: 0.0,
            timer_ms: 0,
            laps: 0,
        }
    }

    /// Advance the scenario by `dt_ms` and return the tone to produce.
    pub fn step(&mut self, dt_ms: u32) -> ToneCommand {
        let dt = dt_ms as f64;
        let cfg = &self.config;
        match self.phase {
            DrivePhase::Startup => {
                self.frequency_hz = 0.0;
                self.amplitude = 0.0;
                self.timer_ms += dt_ms;
                if self.timer_ms >= cfg.startup_ms {
                    self.phase = DrivePhase::IncreaseAmplitude;
                    self.frequency_hz = cfg.peak_frequency_hz;
                }
            }
            DrivePhase::IncreaseAmplitude => {
                self.amplitude += dt * cfg.peak_amplitude / cfg.amplitude_ramp_ms as f64;
                if self.amplitude >= cfg.peak_amplitude {
                    self.amplitude = cfg.peak_amplitude;
                    self.phase = DrivePhase::DecreaseFrequency;
                }
            }
            DrivePhase::DecreaseFrequency => {
                self.frequency_hz -= dt * cfg.peak_frequency_hz / cfg.frequency_ramp_ms as f64;
                if self.frequency_hz < LOW_FREQUENCY_CUTOFF_HZ {
                    self.amplitude =
                        (self.amplitude - dt * cfg.peak_amplitude / cfg.fade_ms as f64).max(0.0);
                }
                if self.frequency_hz <= 0.0 {
                    self.frequency_hz = 0.0;
                    self.phase = DrivePhase::Hold;
                    self.timer_ms = 0;
                }
            }
            DrivePhase::Hold => {
                self.timer_ms += dt_ms;
                if self.timer_ms >= cfg.hold_ms {
                    self.phase = DrivePhase::IncreaseFrequency;
                }
            }
            DrivePhase::IncreaseFrequency => {
                self.frequency_hz += dt * cfg.peak_frequency_hz / cfg.frequency_ramp_ms as f64;
                self.amplitude = (self.amplitude + dt * cfg.peak_amplitude / cfg.fade_ms as f64)
                    .min(cfg.peak_amplitude);
                if self.frequency_hz >= cfg.peak_frequency_hz {
                    self.frequency_hz = cfg.peak_frequency_hz;
                    self.phase = DrivePhase::DecreaseAmplitude;
                }
            }
            DrivePhase::DecreaseAmplitude => {
                self.amplitude -= dt * cfg.peak_amplitude / cfg.amplitude_ramp_ms as f64;
                if self.amplitude <= 0.0 {
                    self.amplitude = 0.0;
                    self.phase = DrivePhase::Done;
                    self.timer_ms = 0;
                }
            }
            DrivePhase::Done => {
                self.timer_ms += dt_ms;
                if self.timer_ms >= cfg.done_ms {
                    self.phase = DrivePhase::Startup;
                    self.timer_ms = 0;
                    self.laps += 1;
                }
            }
        }
        ToneCommand {
            frequency_hz: self.frequency_hz,
            amplitude: self.amplitude,
        }
    }

    pub fn phase(&self) -> DrivePhase {
        self.phase
    }

    pub fn frequency_hz(&self) -> f64 {
        self.frequency_hz
    }

    pub fn amplitude(&self) -> f64 {
        self.amplitude
    }

    /// Completed passes since construction or reset.
    pub fn laps(&self) -> u32 {
        self.laps
    }

    /// Rewind to the start of the quiet period.
    pub fn reset(&mut self) {
        self.phase = DrivePhase::Startup;
        self.frequency_hz = 0.0;
        self.amplitude = 0.0;
        self.timer_ms = 0;
        self.laps = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_startup_is_silent_for_the_configured_delay() {
        let mut scenario = DriveByScenario::new(DriveByConfig::default());
        for _ in 0..9 {
            let tone = scenario.step(100);
            assert_eq!(scenario.phase(), DrivePhase::Startup);
            assert_eq!(tone.amplitude, 0.0);
            assert_eq!(tone.frequency_hz, 0.0);
        }
        scenario.step(100);
        assert_eq!(scenario.phase(), DrivePhase::IncreaseAmplitude);
        assert_relative_eq!(scenario.frequency_hz(), 8000.0);
    }

    #[test]
    fn test_amplitude_ramp_reaches_peak_on_schedule() {
        let mut scenario = DriveByScenario::new(DriveByConfig::default());
        scenario.step(1000);
        for _ in 0..19 {
            scenario.step(100);
            assert_eq!(scenario.phase(), DrivePhase::IncreaseAmplitude);
        }
        let tone = scenario.step(100);
        assert_eq!(scenario.phase(), DrivePhase::DecreaseFrequency);
        assert_relative_eq!(tone.amplitude, 0.5);
        assert_relative_eq!(tone.frequency_hz, 8000.0);
    }

    #[test]
    fn test_sweep_fades_near_zero_and_holds() {
        let mut scenario = DriveByScenario::new(DriveByConfig::default());
        scenario.step(1000);
        for _ in 0..20 {
            scenario.step(100);
        }
        assert_eq!(scenario.phase(), DrivePhase::DecreaseFrequency);
        for _ in 0..19 {
            scenario.step(100);
        }
        assert!(scenario.frequency_hz() > 0.0);
        let tone = scenario.step(100);
        assert_eq!(scenario.phase(), DrivePhase::Hold);
        assert_eq!(tone.frequency_hz, 0.0);
        assert_eq!(tone.amplitude, 0.0);
    }

    #[test]
    fn test_step_size_does_not_change_the_envelope() {
        let mut coarse = DriveByScenario::new(DriveByConfig::default());
        let mut fine = DriveByScenario::new(DriveByConfig::default());
        coarse.step(1000);
        for _ in 0..1000 {
            fine.step(1);
        }
        assert_eq!(coarse.phase(), fine.phase());

        coarse.step(500);
        for _ in 0..500 {
            fine.step(1);
        }
        assert_relative_eq!(coarse.amplitude(), fine.amplitude(), epsilon = 1e-9);
    }

    #[test]
    fn test_scenario_loops_back_to_startup() {
        let mut scenario = DriveByScenario::new(DriveByConfig::default());
        let mut steps = 0;
        while scenario.laps() == 0 {
            scenario.step(50);
            steps += 1;
            assert!(steps < 1000, "scenario failed to complete a lap");
        }
        assert_eq!(scenario.phase(), DrivePhase::Startup);
        assert_eq!(scenario.amplitude(), 0.0);
    }

    #[test]
    fn test_reset_rewinds_everything() {
        let mut scenario = DriveByScenario::new(DriveByConfig::default());
        scenario.step(1000);
        scenario.step(100);
        scenario.reset();
        assert_eq!(scenario.phase(), DrivePhase::Startup);
        assert_eq!(scenario.frequency_hz(), 0.0);
        assert_eq!(scenario.laps(), 0);
    }
}
