//! Multi-target Doppler vehicle tracker
//!
//! Tracks several vehicles at once through a stream of FFT magnitude
//! frames. Each vehicle appears as a spectral peak whose bin is its
//! radial speed; the engine's job is to keep peak identities stable from
//! frame to frame while peaks move, cross, fade and reappear.
//!
//! One call to [`VehicleTracker::process_frame`] runs the full cycle:
//!
//! 1. Re-acquisition. Every live track searches a window around its last
//!    bin, accepts the strongest in-window peak if it clears the floors
//!    and the acceleration bound, and claims the window so no later stage
//!    touches it. Tracks that miss decay instead of dropping.
//! 2. Discovery. The unclaimed remainder of the frame is mined for new
//!    peaks, strongest first, each claiming its full flank-to-flank span.
//!    Candidates too close to a live track are folded into it.
//! 3. Sort. Slots reorder strongest-first, so slot 0 is always the
//!    dominant echo.
//! 4. Pass detection. Each slot's side-firing automaton advances one
//!    step (see [`crate::side_firing`]).
//! 5. Floor adaptation. The detection floor follows table occupancy
//!    (see [`crate::threshold`]).
//!
//! # Example
//!
//! ```
//! use doptrak_core::{SpectrumFrame, TrackerConfig, VehicleTracker};
//!
//! let mut tracker = VehicleTracker::new(TrackerConfig::default()).unwrap();
//!
//! let mut bins = vec![0.0; 128];
//! bins[39] = 220.0;
//! bins[40] = 300.0;
//! bins[41] = 210.0;
//! let frame = SpectrumFrame::from_magnitudes(bins).unwrap();
//!
//! let cycle = tracker.process_frame(&frame).unwrap();
//! assert_eq!(cycle.discovered, 1);
//! assert_eq!(tracker.tracks()[0].index, 40);
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::config::TrackerConfig;
use crate::direction;
use crate::interpolator::interpolate_peak;
use crate::side_firing::{self, SideFiringSlot};
use crate::spectrum::SpectrumFrame;
use crate::threshold::AdaptiveThreshold;
use crate::track::{Track, TrackConfidence};
use crate::types::{Direction, Mag, TrackerError, TrackerResult};

/// Confidence granted to a freshly discovered track.
const INITIAL_MAGNITUDE_CONFIDENCE: i32 = 2;

/// Per-cycle outcome counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CycleStats {
    /// Tracks re-acquired this cycle.
    pub matched: usize,
    /// Tracks that missed and took a decay step.
    pub missed: usize,
    /// Tracks removed after their confidence ran out.
    pub dropped: usize,
    /// New tracks inserted into the table.
    pub discovered: usize,
    /// Occupied slots after the cycle.
    pub occupancy: usize,
}

/// Counters accumulated across cycles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackerStats {
    /// Pass-automaton advance events. A side-firing transit counts two on
    /// the way in (approach confirmed, then closest approach) and may count
    /// again if the departure is slow enough to read as a fresh approach.
    pub vehicle_passes: u32,
    /// Discovery candidates folded into live tracks last cycle.
    pub old_targets_last_cycle: usize,
    /// Discovery candidates that were genuinely new last cycle.
    pub new_targets_last_cycle: usize,
}

/// External view of one live track, with the refined speed readout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackReport {
    pub slot: usize,
    pub bin: usize,
    pub magnitude: Mag,
    pub track_counter: u32,
    pub direction: Direction,
    pub confidence: TrackConfidence,
    /// Sub-bin refined Doppler frequency, offset included.
    pub frequency_hz: Mag,
    /// Speed in the configured unit.
    pub speed: Mag,
}

/// The tracking engine. One instance per antenna.
#[derive(Debug, Clone)]
pub struct VehicleTracker {
    config: TrackerConfig,
    tracks: Vec<Track>,
    /// Discovery staging area, reused as the sort scratch table.
    scratch: Vec<Track>,
    /// Per-bin claim mask, rebuilt every cycle.
    claimed: Vec<bool>,
    side_firing: Vec<SideFiringSlot>,
    threshold: AdaptiveThreshold,
    stats: TrackerStats,
}

impl VehicleTracker {
    /// Build an engine from a validated configuration.
    pub fn new(config: TrackerConfig) -> TrackerResult<Self> {
        config.validate()?;
        Ok(Self {
            tracks: vec![Track::default(); config.capacity],
            scratch: vec![Track::default(); config.capacity],
            claimed: vec![false; config.fft_size],
            side_firing: vec![SideFiringSlot::default(); config.capacity],
            threshold: AdaptiveThreshold::new(
                config.initial_threshold,
                config.threshold_ceiling,
                config.threshold_step,
            ),
            stats: TrackerStats::default(),
            config,
        })
    }

    /// Run one complete tracking cycle against a frame.
    pub fn process_frame(&mut self, frame: &SpectrumFrame) -> TrackerResult<CycleStats> {
        self.check_frame(frame)?;

        // 1. Re-acquire existing tracks, claiming their windows.
        let (matched, missed, dropped) = self.match_existing_inner(frame);

        // 2. Mine the unclaimed remainder for new tracks.
        let discovered = self.discover_new_inner(frame);

        // 3. Strongest echo first.
        self.sort_tracks();

        // 4. Advance the per-slot pass automata.
        self.advance_side_firing();

        // 5. Let the detection floor follow occupancy.
        self.update_threshold();

        let occupancy = self.occupancy();
        trace!(
            matched,
            missed,
            dropped,
            discovered,
            occupancy,
            threshold = self.threshold.value(),
            "cycle complete"
        );
        Ok(CycleStats {
            matched,
            missed,
            dropped,
            discovered,
            occupancy,
        })
    }

    /// Re-acquire live tracks against a frame. Returns the match count.
    pub fn match_existing(&mut self, frame: &SpectrumFrame) -> TrackerResult<usize> {
        self.check_frame(frame)?;
        let (matched, _, _) = self.match_existing_inner(frame);
        Ok(matched)
    }

    /// Mine a frame for new tracks. Returns how many were inserted.
    ///
    /// Honors the claim mask left by [`VehicleTracker::match_existing`];
    /// calling it on a fresh cycle without matching first treats the whole
    /// frame as unclaimed.
    pub fn discover_new(&mut self, frame: &SpectrumFrame) -> TrackerResult<usize> {
        self.check_frame(frame)?;
        Ok(self.discover_new_inner(frame))
    }

    /// Reorder slots strongest-first, free slots last. Idempotent.
    pub fn sort_tracks(&mut self) {
        for dest in 0..self.config.capacity {
            let mut best: Option<usize> = None;
            let mut best_magnitude: Mag = 0.0;
            for (i, track) in self.tracks.iter().enumerate() {
                if track.is_occupied() && track.magnitude > best_magnitude {
                    best_magnitude = track.magnitude;
                    best = Some(i);
                }
            }
            match best {
                Some(i) => {
                    self.scratch[dest] = self.tracks[i];
                    self.tracks[i].clear();
                }
                None => self.scratch[dest].clear(),
            }
        }
        self.tracks.copy_from_slice(&self.scratch);
    }

    /// Advance every slot's pass automaton by one cycle.
    pub fn advance_side_firing(&mut self) {
        for slot in 0..self.config.capacity {
            let before = self.side_firing[slot].state;
            let passes = side_firing::advance(
                &mut self.side_firing[slot],
                &self.tracks[slot],
                &self.config.side_firing,
            );
            self.stats.vehicle_passes += passes;
            let after = self.side_firing[slot].state;
            if after != before {
                debug!(slot, ?before, ?after, "pass automaton transition");
            }
        }
    }

    /// One adaptation step of the detection floor.
    pub fn update_threshold(&mut self) {
        let occupancy = self.occupancy();
        self.threshold.update(occupancy, self.config.capacity);
    }

    /// Return the engine to its power-on state. The configuration stays.
    pub fn reset(&mut self) {
        for track in self.tracks.iter_mut() {
            track.clear();
        }
        for track in self.scratch.iter_mut() {
            track.clear();
        }
        for flag in self.claimed.iter_mut() {
            *flag = false;
        }
        for slot in self.side_firing.iter_mut() {
            *slot = SideFiringSlot::default();
        }
        self.threshold.set_value(self.config.initial_threshold);
        self.stats = TrackerStats::default();
        debug!("tracker reset");
    }

    /// External reports for every live track, speeds refined against the
    /// given frame.
    pub fn track_reports(&self, frame: &SpectrumFrame) -> TrackerResult<Vec<TrackReport>> {
        self.check_frame(frame)?;
        Ok(self
            .tracks
            .iter()
            .enumerate()
            .filter(|(_, track)| track.is_occupied())
            .map(|(slot, track)| {
                let peak = interpolate_peak(frame, track.index, &self.config.speed);
                TrackReport {
                    slot,
                    bin: track.index,
                    magnitude: track.magnitude,
                    track_counter: track.track_counter,
                    direction: track.direction,
                    confidence: track.confidence,
                    frequency_hz: peak.frequency_hz,
                    speed: peak.speed,
                }
            })
            .collect())
    }

    /// The track table, slot order.
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// The per-slot pass automata, slot order.
    pub fn side_firing(&self) -> &[SideFiringSlot] {
        &self.side_firing
    }

    /// Accumulated counters.
    pub fn stats(&self) -> TrackerStats {
        self.stats
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Current detection floor.
    pub fn minimum_magnitude(&self) -> Mag {
        self.threshold.value()
    }

    /// Force the detection floor, for calibration.
    pub fn set_minimum_magnitude(&mut self, value: Mag) {
        self.threshold.set_value(value);
    }

    /// Occupied slots.
    pub fn occupancy(&self) -> usize {
        self.tracks.iter().filter(|t| t.is_occupied()).count()
    }

    // ------------------------------------------------------------------
    // Private cycle stages
    // ------------------------------------------------------------------

    fn check_frame(&self, frame: &SpectrumFrame) -> TrackerResult<()> {
        if frame.len() != self.config.fft_size {
            return Err(TrackerError::FrameSizeMismatch {
                expected: self.config.fft_size,
                actual: frame.len(),
            });
        }
        Ok(())
    }

    fn match_existing_inner(&mut self, frame: &SpectrumFrame) -> (usize, usize, usize) {
        for flag in self.claimed.iter_mut() {
            *flag = false;
        }

        let mut matched = 0;
        let mut missed = 0;
        let mut dropped = 0;
        for slot in 0..self.config.capacity {
            let prev_index = self.tracks[slot].index;
            if prev_index == 0 || self.claimed[prev_index] {
                // Free slot, or an earlier track already claimed this peak.
                continue;
            }
            let prev_delta = self.tracks[slot].delta_index;

            let lo = prev_index
                .saturating_sub(self.config.search_half_width)
                .max(self.config.start_bin);
            let hi = (prev_index + self.config.search_half_width).min(self.config.fft_size - 1);

            let mut peak_bin = 0;
            let mut peak_magnitude: Mag = 0.0;
            for bin in lo..=hi {
                if frame.bin(bin) > peak_magnitude {
                    peak_magnitude = frame.bin(bin);
                    peak_bin = bin;
                }
            }

            let displacement = peak_bin as i32 - prev_index as i32;
            let accepted = peak_magnitude >= self.threshold.value()
                && peak_magnitude >= self.config.sensitivity_floor * 0.5
                && displacement.abs() < self.config.acceleration_bound + prev_delta;

            if accepted {
                for bin in lo..=hi {
                    self.claimed[bin] = true;
                }
                let track = &mut self.tracks[slot];
                if track.track_counter < self.config.track_counter_cap {
                    track.track_counter += 1;
                }
                track.delta_index = displacement;
                track.magnitude_prev = track.magnitude;
                track.index = peak_bin;
                track.magnitude = peak_magnitude;
                if track.confidence.magnitude < self.config.magnitude_confidence_cap {
                    track.confidence.magnitude += 1;
                }
                direction::observe_match(
                    &self.config.direction,
                    track,
                    frame.phases_at(peak_bin),
                );
                matched += 1;
                trace!(
                    slot,
                    bin = peak_bin,
                    displacement,
                    magnitude = peak_magnitude,
                    "track re-acquired"
                );
            } else {
                missed += 1;
                if self.tracks[slot].decay() {
                    dropped += 1;
                    debug!(slot, "track dropped");
                }
            }
        }
        (matched, missed, dropped)
    }

    fn discover_new_inner(&mut self, frame: &SpectrumFrame) -> usize {
        for candidate in self.scratch.iter_mut() {
            candidate.clear();
        }

        // Stage up to one candidate per slot, strongest unclaimed first.
        let mut staged = 0;
        for _ in 0..self.config.capacity {
            let mut peak_bin = 0;
            let mut peak_magnitude: Mag = 0.0;
            for bin in self.config.start_bin..self.config.fft_size {
                if self.claimed[bin] {
                    continue;
                }
                if frame.bin(bin) > peak_magnitude {
                    peak_magnitude = frame.bin(bin);
                    peak_bin = bin;
                }
            }

            if peak_bin == 0
                || peak_magnitude < self.threshold.value()
                || peak_magnitude < self.config.sensitivity_floor
            {
                break;
            }

            let (span_lo, span_hi) = peak_span(frame, peak_bin, self.config.start_bin);
            for bin in span_lo..=span_hi {
                self.claimed[bin] = true;
            }

            let candidate = &mut self.scratch[staged];
            candidate.index = peak_bin;
            candidate.magnitude = peak_magnitude;
            candidate.track_counter = 1;
            candidate.confidence.magnitude = INITIAL_MAGNITUDE_CONFIDENCE;
            candidate.confidence.magnitude_track = INITIAL_MAGNITUDE_CONFIDENCE;
            staged += 1;
        }

        // Candidates near a live track are that track, seen again.
        self.stats.old_targets_last_cycle = 0;
        let mut fresh = 0;
        for i in 0..staged {
            let candidate_bin = self.scratch[i].index;
            if candidate_bin == 0 {
                continue;
            }
            let duplicate = self.tracks.iter().filter(|t| t.is_occupied()).any(|t| {
                (t.index as i32 - candidate_bin as i32).abs()
                    < self.config.search_half_width as i32
            });
            if duplicate {
                if self.scratch[i].magnitude > 0.0 {
                    self.stats.old_targets_last_cycle += 1;
                }
                self.scratch[i].clear();
            } else {
                fresh += 1;
            }
        }
        self.stats.new_targets_last_cycle = fresh;

        // Fill free slots until the table or the candidates run out.
        let mut inserted = 0;
        for i in 0..staged {
            if !self.scratch[i].is_occupied() {
                continue;
            }
            match self.tracks.iter().position(|t| !t.is_occupied()) {
                Some(slot) => {
                    self.tracks[slot] = self.scratch[i];
                    inserted += 1;
                    debug!(
                        slot,
                        bin = self.scratch[i].index,
                        magnitude = self.scratch[i].magnitude,
                        "new track"
                    );
                }
                None => break,
            }
        }
        inserted
    }
}

/// Walk outward from `peak` while the magnitude is non-increasing.
///
/// The span ends at the first rising bin, which is included so the
/// neighboring peak's shoulder cannot seed a duplicate track, or at the
/// frame bound when no rise occurs. `peak` must lie in
/// `start_bin..frame.len()`.
pub fn peak_span(frame: &SpectrumFrame, peak: usize, start_bin: usize) -> (usize, usize) {
    let n = frame.len();

    let mut lo = peak;
    let mut prev = frame.bin(peak);
    let mut rising = false;
    let mut i = peak;
    while !rising && i > start_bin {
        i -= 1;
        let value = frame.bin(i);
        if value > prev {
            lo = i;
            rising = true;
        } else {
            prev = value;
        }
    }
    if !rising {
        lo = start_bin;
    }

    let mut hi = peak;
    prev = frame.bin(peak);
    rising = false;
    let mut j = peak + 1;
    while !rising && j < n {
        let value = frame.bin(j);
        if value > prev {
            hi = j;
            rising = true;
        } else {
            prev = value;
            j += 1;
        }
    }
    if !rising {
        hi = n - 1;
    }

    (lo, hi)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn frame_with(pairs: &[(usize, Mag)]) -> SpectrumFrame {
        let mut bins = vec![0.0; 128];
        for &(i, m) in pairs {
            bins[i] = m;
        }
        SpectrumFrame::from_magnitudes(bins).unwrap()
    }

    fn quiet_tracker(initial_threshold: Mag) -> VehicleTracker {
        VehicleTracker::new(TrackerConfig {
            initial_threshold,
            ..TrackerConfig::default()
        })
        .unwrap()
    }

    // -- Construction --------------------------------------------------------

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = TrackerConfig {
            capacity: 0,
            ..TrackerConfig::default()
        };
        assert!(VehicleTracker::new(config).is_err());
    }

    #[test]
    fn test_new_starts_empty_at_initial_floor() {
        let tracker = VehicleTracker::new(TrackerConfig::default()).unwrap();
        assert_eq!(tracker.occupancy(), 0);
        assert_relative_eq!(tracker.minimum_magnitude(), 50.0);
    }

    #[test]
    fn test_process_frame_rejects_wrong_length() {
        let mut tracker = VehicleTracker::new(TrackerConfig::default()).unwrap();
        let frame = SpectrumFrame::from_magnitudes(vec![0.0; 512]).unwrap();
        assert!(matches!(
            tracker.process_frame(&frame).unwrap_err(),
            TrackerError::FrameSizeMismatch { expected: 128, actual: 512 }
        ));
    }

    // -- Discovery -----------------------------------------------------------

    #[test]
    fn test_discovery_seeds_candidate_fields() {
        let mut tracker = quiet_tracker(8.0);
        let frame = frame_with(&[(1, 5.0), (2, 80.0), (3, 120.0), (4, 90.0), (5, 10.0)]);
        let cycle = tracker.process_frame(&frame).unwrap();
        assert_eq!(cycle.discovered, 1);
        assert_eq!(cycle.occupancy, 1);

        let track = tracker.tracks()[0];
        assert_eq!(track.index, 3);
        assert_relative_eq!(track.magnitude, 120.0);
        assert_eq!(track.track_counter, 1);
        assert_eq!(track.confidence.magnitude, 2);
        assert_eq!(track.confidence.magnitude_track, 2);
        assert_eq!(track.direction, Direction::Unknown);
    }

    #[test]
    fn test_discovery_ignores_peaks_below_floor() {
        let mut tracker = quiet_tracker(50.0);
        let frame = frame_with(&[(40, 49.0)]);
        let cycle = tracker.process_frame(&frame).unwrap();
        assert_eq!(cycle.discovered, 0);
        assert_eq!(tracker.occupancy(), 0);
    }

    #[test]
    fn test_occupancy_never_exceeds_capacity() {
        let mut tracker = quiet_tracker(8.0);
        // Six triangular peaks; only four slots exist.
        let frame = frame_with(&[
            (9, 80.0),
            (10, 180.0),
            (11, 80.0),
            (19, 70.0),
            (20, 160.0),
            (21, 70.0),
            (29, 90.0),
            (30, 200.0),
            (31, 90.0),
            (39, 60.0),
            (40, 150.0),
            (41, 60.0),
            (49, 85.0),
            (50, 190.0),
            (51, 85.0),
            (59, 65.0),
            (60, 170.0),
            (61, 65.0),
        ]);
        let cycle = tracker.process_frame(&frame).unwrap();
        assert_eq!(cycle.discovered, 4);
        assert_eq!(cycle.occupancy, 4);
        // Strongest first after the sort.
        assert_eq!(tracker.tracks()[0].index, 30);
        assert_eq!(tracker.tracks()[1].index, 50);
        assert_eq!(tracker.tracks()[2].index, 10);
        assert_eq!(tracker.tracks()[3].index, 60);
    }

    #[test]
    fn test_sort_is_idempotent() {
        let mut tracker = quiet_tracker(8.0);
        let frame = frame_with(&[
            (19, 70.0),
            (20, 160.0),
            (21, 70.0),
            (49, 85.0),
            (50, 190.0),
            (51, 85.0),
        ]);
        tracker.process_frame(&frame).unwrap();
        let before = tracker.tracks().to_vec();
        tracker.sort_tracks();
        assert_eq!(tracker.tracks(), &before[..]);
    }

    #[test]
    fn test_rediscovered_track_is_folded_not_duplicated() {
        let mut tracker = quiet_tracker(8.0);
        tracker.process_frame(&frame_with(&[(20, 100.0)])).unwrap();

        // The peak jumps 4 bins: inside the search window, but past the
        // acceleration bound. The track misses, so the discovery stage
        // sees the peak again and must fold it into the live track.
        let cycle = tracker.process_frame(&frame_with(&[(24, 90.0)])).unwrap();
        assert_eq!(cycle.matched, 0);
        assert_eq!(cycle.missed, 1);
        assert_eq!(cycle.discovered, 0);
        assert_eq!(tracker.occupancy(), 1);
        assert_eq!(tracker.stats().old_targets_last_cycle, 1);
        assert_eq!(tracker.stats().new_targets_last_cycle, 0);
        // The track itself decayed.
        assert_eq!(tracker.tracks()[0].index, 20);
        assert_relative_eq!(tracker.tracks()[0].magnitude, 87.5);
    }

    // -- Re-acquisition ------------------------------------------------------

    #[test]
    fn test_match_accepts_small_displacement() {
        let mut tracker = quiet_tracker(8.0);
        tracker.process_frame(&frame_with(&[(10, 60.0)])).unwrap();

        let cycle = tracker.process_frame(&frame_with(&[(12, 65.0)])).unwrap();
        assert_eq!(cycle.matched, 1);

        let track = tracker.tracks()[0];
        assert_eq!(track.index, 12);
        assert_eq!(track.delta_index, 2);
        assert_eq!(track.track_counter, 2);
        assert_eq!(track.confidence.magnitude, 3);
        assert_relative_eq!(track.magnitude, 65.0);
        assert_relative_eq!(track.magnitude_prev, 60.0);
    }

    #[test]
    fn test_match_rejects_displacement_at_bound() {
        let mut tracker = quiet_tracker(8.0);
        tracker.process_frame(&frame_with(&[(10, 60.0)])).unwrap();

        // Displacement 4 is not strictly below the bound of 4.
        let cycle = tracker.process_frame(&frame_with(&[(14, 65.0)])).unwrap();
        assert_eq!(cycle.matched, 0);
        assert_eq!(cycle.missed, 1);
        assert_eq!(tracker.tracks()[0].index, 10);
        assert_relative_eq!(tracker.tracks()[0].magnitude, 52.5);
    }

    #[test]
    fn test_accepted_drift_raises_next_bound() {
        let mut tracker = quiet_tracker(8.0);
        tracker.process_frame(&frame_with(&[(10, 60.0)])).unwrap();
        tracker.process_frame(&frame_with(&[(13, 65.0)])).unwrap();
        assert_eq!(tracker.tracks()[0].delta_index, 3);

        // Displacement 5 clears the raised bound of 4 + 3.
        let cycle = tracker.process_frame(&frame_with(&[(18, 70.0)])).unwrap();
        assert_eq!(cycle.matched, 1);
        assert_eq!(tracker.tracks()[0].index, 18);
        assert_eq!(tracker.tracks()[0].track_counter, 3);
    }

    #[test]
    fn test_search_window_clamps_to_frame_bounds() {
        let mut tracker = quiet_tracker(8.0);
        tracker.process_frame(&frame_with(&[(3, 100.0)])).unwrap();
        // Window around bin 3 reaches down to bin 1, never into DC.
        tracker.process_frame(&frame_with(&[(1, 95.0)])).unwrap();
        assert_eq!(tracker.tracks()[0].index, 1);

        let mut tracker = quiet_tracker(8.0);
        tracker.process_frame(&frame_with(&[(126, 100.0)])).unwrap();
        tracker.process_frame(&frame_with(&[(127, 95.0)])).unwrap();
        assert_eq!(tracker.tracks()[0].index, 127);
    }

    #[test]
    fn test_matches_vote_direction() {
        let mut tracker = quiet_tracker(8.0);
        tracker.process_frame(&frame_with(&[(40, 60.0)])).unwrap();
        assert_eq!(tracker.tracks()[0].direction, Direction::Unknown);
        tracker.process_frame(&frame_with(&[(40, 62.0)])).unwrap();
        // Single-channel policy: re-acquisitions converge on Away.
        assert_eq!(tracker.tracks()[0].direction, Direction::Away);
    }

    #[test]
    fn test_track_inside_claimed_span_is_left_untouched() {
        let mut tracker = quiet_tracker(8.0);
        // Two tracks, discovered one cycle apart.
        tracker.process_frame(&frame_with(&[(20, 100.0)])).unwrap();
        tracker
            .process_frame(&frame_with(&[(20, 100.0), (30, 80.0)]))
            .unwrap();
        assert_eq!(tracker.occupancy(), 2);

        // Walk the weaker track into the stronger one's window. Stored
        // negative displacement shrinks the bound, so small steps.
        for &(bin, magnitude) in &[(29, 85.0), (27, 87.0), (26, 89.0), (25, 90.0)] {
            tracker
                .process_frame(&frame_with(&[(20, 100.0), (bin, magnitude)]))
                .unwrap();
        }
        assert_eq!(tracker.tracks()[1].index, 25);
        let before = tracker.tracks()[1];

        // Slot 0 claims [15, 25] first, so the weaker track is skipped
        // outright: no match, but no decay either.
        let cycle = tracker.process_frame(&frame_with(&[(20, 100.0)])).unwrap();
        assert_eq!(cycle.matched, 1);
        assert_eq!(cycle.missed, 0);
        let after = tracker.tracks()[1];
        assert_eq!(after.track_counter, before.track_counter);
        assert_relative_eq!(after.magnitude, before.magnitude);
    }

    // -- Decay ---------------------------------------------------------------

    #[test]
    fn test_unmatched_track_decays_then_drops() {
        let mut tracker = quiet_tracker(8.0);
        tracker.process_frame(&frame_with(&[(40, 100.0)])).unwrap();

        let empty = frame_with(&[]);
        let cycle = tracker.process_frame(&empty).unwrap();
        assert_eq!(cycle.missed, 1);
        assert_eq!(cycle.dropped, 0);
        assert_relative_eq!(tracker.tracks()[0].magnitude, 87.5);
        assert_eq!(tracker.tracks()[0].confidence.magnitude, 1);

        let cycle = tracker.process_frame(&empty).unwrap();
        assert_eq!(cycle.dropped, 1);
        assert_eq!(cycle.occupancy, 0);
        assert!(!tracker.tracks()[0].is_occupied());
    }

    // -- Threshold coupling --------------------------------------------------

    #[test]
    fn test_floor_rises_with_nearly_full_table() {
        let mut tracker = quiet_tracker(8.0);
        let frame = frame_with(&[
            (19, 70.0),
            (20, 160.0),
            (21, 70.0),
            (49, 85.0),
            (50, 190.0),
            (51, 85.0),
        ]);
        tracker.process_frame(&frame).unwrap();
        // Two of four slots occupied counts as nearly full.
        assert_relative_eq!(tracker.minimum_magnitude(), 8.1);
    }

    #[test]
    fn test_floor_recovers_while_table_empty() {
        let mut tracker = quiet_tracker(8.0);
        let empty = frame_with(&[]);
        tracker.process_frame(&empty).unwrap();
        assert_relative_eq!(tracker.minimum_magnitude(), 7.0);
        tracker.process_frame(&empty).unwrap();
        assert_relative_eq!(tracker.minimum_magnitude(), 6.125);
    }

    // -- Pass detection ------------------------------------------------------

    #[test]
    fn test_side_firing_counts_a_drive_by() {
        let mut tracker = quiet_tracker(8.0);
        let mut index = 46;
        for frame_no in 1..=50 {
            // Hold until the automaton confirms the approach, then walk
            // the peak down one bin per cycle to the cutoff.
            if frame_no >= 15 && index > 10 {
                index -= 1;
            }
            tracker
                .process_frame(&frame_with(&[(index, 300.0)]))
                .unwrap();
        }
        assert_eq!(tracker.stats().vehicle_passes, 2);
        assert_eq!(
            tracker.side_firing()[0].state,
            crate::side_firing::SfrState::DirectlyInFront
        );
    }

    // -- Reports and lifecycle -----------------------------------------------

    #[test]
    fn test_track_reports_include_refined_speed() {
        let mut tracker = VehicleTracker::new(TrackerConfig::default()).unwrap();
        let frame = frame_with(&[(39, 100.0), (40, 300.0), (41, 100.0)]);
        tracker.process_frame(&frame).unwrap();

        let reports = tracker.track_reports(&frame).unwrap();
        assert_eq!(reports.len(), 1);
        let report = &reports[0];
        assert_eq!(report.slot, 0);
        assert_eq!(report.bin, 40);
        assert_relative_eq!(report.frequency_hz, 172.265_625 * 40.0 + 40.0);
        assert!(report.speed > 90.0 && report.speed < 100.0);
    }

    #[test]
    fn test_reset_restores_power_on_state() {
        let mut tracker = quiet_tracker(8.0);
        tracker.process_frame(&frame_with(&[(40, 100.0)])).unwrap();
        assert_eq!(tracker.occupancy(), 1);
        assert!(tracker.minimum_magnitude() < 8.0);

        tracker.reset();
        assert_eq!(tracker.occupancy(), 0);
        assert_relative_eq!(tracker.minimum_magnitude(), 8.0);
        assert_eq!(tracker.stats(), TrackerStats::default());
        assert_eq!(
            tracker.side_firing()[0],
            crate::side_firing::SideFiringSlot::default()
        );
    }

    // -- Peak spans ----------------------------------------------------------

    #[test]
    fn test_peak_span_extends_to_bounds_without_rise() {
        let frame = frame_with(&[(39, 50.0), (40, 100.0), (41, 50.0)]);
        assert_eq!(peak_span(&frame, 40, 1), (1, 127));
    }

    #[test]
    fn test_peak_span_includes_first_rising_bin() {
        let frame = frame_with(&[(25, 60.0), (30, 100.0)]);
        assert_eq!(peak_span(&frame, 30, 1), (25, 127));
    }

    #[test]
    fn test_peak_span_stops_at_adjacent_rise() {
        let frame = frame_with(&[(29, 120.0), (30, 100.0), (34, 90.0)]);
        let (lo, hi) = peak_span(&frame, 30, 1);
        assert_eq!(lo, 29);
        assert_eq!(hi, 34);
    }
}
