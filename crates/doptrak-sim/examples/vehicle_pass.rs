//! Runs two simulated drive-bys through the full pipeline and logs what
//! the tracker sees.
//!
//! ```text
//! cargo run --example vehicle_pass
//! ```

use doptrak_core::observe::{init_logging, LogConfig};
use doptrak_core::{TrackerConfig, VehicleTracker};
use doptrak_sim::{DriveByConfig, DriveByScenario, FftFrontEnd, ToneSynth};
use tracing::info;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging(&LogConfig::development());

    let mut scenario = DriveByScenario::new(DriveByConfig::default());
    let mut synth = ToneSynth::new(44_100.0, 0.005, 11);
    let front_end = FftFrontEnd::new(128)?;
    let mut tracker = VehicleTracker::new(TrackerConfig::default())?;

    // 256 samples at 44.1 kHz is a hair under 6 ms per frame.
    let frame_ms = 6;
    let mut passes = 0;
    let mut frames = 0u32;
    while scenario.laps() < 2 {
        let tone = scenario.step(frame_ms);
        let samples = synth.block(tone.frequency_hz, tone.amplitude, front_end.frame_len());
        let frame = front_end.frame(&samples)?;
        tracker.process_frame(&frame)?;
        frames += 1;

        let stats = tracker.stats();
        if stats.vehicle_passes > passes {
            passes = stats.vehicle_passes;
            if let Some(report) = tracker.track_reports(&frame)?.first() {
                info!(
                    phase = ?scenario.phase(),
                    bin = report.bin,
                    speed_mph = report.speed,
                    magnitude = report.magnitude,
                    "pass event"
                );
            }
        }
    }

    let stats = tracker.stats();
    info!(
        frames,
        laps = scenario.laps(),
        passes = stats.vehicle_passes,
        "simulation complete"
    );
    Ok(())
}
