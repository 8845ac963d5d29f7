//! # doptrak-sim
//!
//! Host-side simulation harness for the tracking engine. A
//! [`DriveByScenario`] scripts the Doppler signature of a vehicle
//! passing the antenna, a [`ToneSynth`] renders it as noisy audio-band
//! samples, and an [`FftFrontEnd`] converts sample blocks into the
//! magnitude frames `doptrak-core` ingests. Together they exercise the
//! whole pipeline with no radar hardware on the bench.
//!
//! # Example
//!
//! ```
//! use doptrak_core::{TrackerConfig, VehicleTracker};
//! use doptrak_sim::{DriveByConfig, DriveByScenario, FftFrontEnd, ToneSynth};
//!
//! let mut scenario = DriveByScenario::new(DriveByConfig::default());
//! let mut synth = ToneSynth::new(44_100.0, 0.005, 1);
//! let front_end = FftFrontEnd::new(128).unwrap();
//! let mut tracker = VehicleTracker::new(TrackerConfig::default()).unwrap();
//!
//! // Skip the quiet period, ramp most of the approach tone in.
//! scenario.step(1000);
//! let tone = scenario.step(1800);
//!
//! let samples = synth.block(tone.frequency_hz, tone.amplitude, front_end.frame_len());
//! let frame = front_end.frame(&samples).unwrap();
//! let cycle = tracker.process_frame(&frame).unwrap();
//! assert_eq!(cycle.discovered, 1);
//! ```

pub mod scenario;
pub mod synth;

pub use scenario::{DriveByConfig, DriveByScenario, DrivePhase, ToneCommand};
pub use synth::{FftFrontEnd, ToneSynth};

#[cfg(test)]
mod tests {
    use doptrak_core::{SfrState, TrackerConfig, VehicleTracker};

    use crate::scenario::{DriveByConfig, DriveByScenario};
    use crate::synth::{FftFrontEnd, ToneSynth};

    #[test]
    fn test_drive_by_is_counted_end_to_end() {
        let mut scenario = DriveByScenario::new(DriveByConfig::default());
        // Noise low enough that no noise bin can cross the sensitivity
        // floor; every track in this run comes from the tone.
        let mut synth = ToneSynth::new(44_100.0, 0.001, 11);
        let front_end = FftFrontEnd::new(128).unwrap();
        let mut tracker = VehicleTracker::new(TrackerConfig::default()).unwrap();

        let mut top_speed: f64 = 0.0;
        let mut frames = 0;
        while scenario.laps() == 0 {
            let tone = scenario.step(6);
            let samples =
                synth.block(tone.frequency_hz, tone.amplitude, front_end.frame_len());
            let frame = front_end.frame(&samples).unwrap();
            tracker.process_frame(&frame).unwrap();

            for report in tracker.track_reports(&frame).unwrap() {
                if report.slot == 0 {
                    top_speed = top_speed.max(report.speed);
                }
            }

            frames += 1;
            assert!(frames < 4000, "scenario failed to complete a lap");
        }

        // Two events on the way in: approach confirmed, then closest
        // approach. The slow outbound sweep dwells several frames per bin,
        // which reads as a fresh approach and fires both again before the
        // bin climbs past the cutoff.
        assert_eq!(tracker.stats().vehicle_passes, 4);
        // The 8 kHz approach tone reads near 112 mph at K band.
        assert!(
            top_speed > 95.0 && top_speed < 125.0,
            "top speed was {top_speed}"
        );
        // The table drains once the tone fades.
        assert_eq!(tracker.occupancy(), 0);
        assert!(tracker
            .side_firing()
            .iter()
            .all(|slot| slot.state == SfrState::Waiting));
    }

    #[test]
    fn test_second_lap_repeats_the_count() {
        let mut scenario = DriveByScenario::new(DriveByConfig::default());
        let mut synth = ToneSynth::new(44_100.0, 0.001, 23);
        let front_end = FftFrontEnd::new(128).unwrap();
        let mut tracker = VehicleTracker::new(TrackerConfig::default()).unwrap();

        let mut frames = 0;
        while scenario.laps() < 2 {
            let tone = scenario.step(6);
            let samples =
                synth.block(tone.frequency_hz, tone.amplitude, front_end.frame_len());
            let frame = front_end.frame(&samples).unwrap();
            tracker.process_frame(&frame).unwrap();

            frames += 1;
            assert!(frames < 8000, "scenario failed to complete two laps");
        }

        assert_eq!(tracker.stats().vehicle_passes, 8);
    }
}
