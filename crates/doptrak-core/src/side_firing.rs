//! Side-firing vehicle pass detection
//!
//! A side-firing install points the antenna across the roadway at a
//! shallow angle. A passing vehicle then traces a fixed signature: the
//! Doppler bin falls while the echo grows (approach), collapses into the
//! low bins at closest approach, and rises again while the echo fades
//! (departure). This module runs one small state machine per track slot
//! that walks that signature and counts completed passes.
//!
//! The automaton only engages while its slot holds a track that is well
//! inside the table: high enough bin, strong enough echo, long enough
//! history. The moment the guard fails the automaton falls back to
//! waiting, so a dying track cannot leave a half-walked signature behind.
//!
//! Trend decisions use two local hysteresis counters, one for bin index
//! and one for magnitude. A trend is confirmed only after both counters
//! clear the configured floor, which takes three consistent cycles from a
//! standing start.

use serde::{Deserialize, Serialize};

use crate::track::Track;
use crate::types::Mag;

/// Phases of the pass signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SfrState {
    /// Power-on state, left on the first engaged cycle and never re-entered.
    Initial,
    /// No engaged track, or the signature fell apart.
    Waiting,
    /// Engaged track, trend not yet confirmed.
    Found,
    /// Bin falling, echo growing: vehicle approaching.
    TrackingTowards,
    /// Bin at or below the cutoff: vehicle at closest approach.
    DirectlyInFront,
    /// Bin rising, echo fading: vehicle departing.
    TrackingAway,
    /// Terminal bookkeeping state. Drains to [`SfrState::Waiting`] within
    /// the same cycle, counting one pass on the way.
    ProcessFound,
    /// Drains to [`SfrState::Waiting`] on the next cycle.
    Done,
}

impl Default for SfrState {
    fn default() -> Self {
        SfrState::Initial
    }
}

/// Local trend counters, separate from the track's own confidence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SfrConfidence {
    pub index: i32,
    pub magnitude: i32,
}

/// Per-slot automaton state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SideFiringSlot {
    pub state: SfrState,
    /// Bin observed on the current engaged cycle.
    pub index: usize,
    /// Magnitude observed on the current engaged cycle.
    pub magnitude: Mag,
    /// Bin observed one cycle earlier.
    pub index_prev: usize,
    /// Magnitude observed one cycle earlier.
    pub magnitude_prev: Mag,
    pub confidence: SfrConfidence,
}

/// Engagement guard and trend thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SideFiringConfig {
    /// Tracks at or below this bin never engage the automaton.
    pub min_index: usize,
    /// Bin at or below which the vehicle counts as directly in front.
    pub cutoff_index: usize,
    /// Matches a track must have accumulated before engaging.
    pub min_track_counter: u32,
    /// Magnitude floor for engaging.
    pub min_magnitude: Mag,
    /// Both trend counters must exceed this to confirm a trend.
    pub confidence_min: i32,
    /// Upper bound for the trend counters.
    pub confidence_max: i32,
}

impl Default for SideFiringConfig {
    fn default() -> Self {
        Self {
            min_index: 5,
            cutoff_index: 10,
            min_track_counter: 10,
            min_magnitude: 100.0,
            confidence_min: 2,
            confidence_max: 10,
        }
    }
}

/// Advance one slot's automaton by one cycle against its track.
///
/// Returns the number of pass events counted this cycle. A transit counts
/// two events on the way in: one when the approach trend confirms and one
/// at closest approach. The trend comparisons are inclusive, so a slow
/// departure that dwells several cycles per bin reads as a fresh approach
/// and counts again on the way out.
pub fn advance(slot: &mut SideFiringSlot, track: &Track, cfg: &SideFiringConfig) -> u32 {
    let mut passes = 0;
    let engaged = track.is_occupied()
        && track.index > cfg.min_index
        && track.magnitude > cfg.min_magnitude
        && track.track_counter > cfg.min_track_counter;

    if engaged {
        // Refresh the observation from the live track before any decision.
        slot.index = track.index;
        slot.magnitude = track.magnitude;

        if slot.state == SfrState::Initial {
            slot.state = SfrState::Waiting;
        }
        match slot.state {
            SfrState::Initial | SfrState::Waiting => {
                if track.track_counter > cfg.confidence_min as u32 {
                    slot.state = SfrState::Found;
                }
            }
            SfrState::Found => {
                trend(&mut slot.confidence.index, slot.index <= slot.index_prev, cfg);
                trend(
                    &mut slot.confidence.magnitude,
                    slot.magnitude >= slot.magnitude_prev,
                    cfg,
                );
                if slot.confidence.index > cfg.confidence_min
                    && slot.confidence.magnitude > cfg.confidence_min
                {
                    slot.state = SfrState::TrackingTowards;
                    passes += 1;
                }
            }
            SfrState::TrackingTowards => {
                if slot.index <= cfg.cutoff_index {
                    slot.state = SfrState::DirectlyInFront;
                    passes += 1;
                }
            }
            SfrState::DirectlyInFront => {
                // The echo is erratic at closest approach; hold the
                // counters flat until the bin climbs back out.
                slot.confidence.index = 0;
                slot.confidence.magnitude = 0;
                if slot.index > cfg.cutoff_index {
                    slot.state = SfrState::TrackingAway;
                }
            }
            SfrState::TrackingAway => {
                trend(&mut slot.confidence.index, slot.index >= slot.index_prev, cfg);
                trend(
                    &mut slot.confidence.magnitude,
                    slot.magnitude <= slot.magnitude_prev,
                    cfg,
                );
                // A confirmed departure re-arms the cutoff detector for
                // the next vehicle in the slot.
                if slot.confidence.index > cfg.confidence_min
                    && slot.confidence.magnitude > cfg.confidence_min
                {
                    slot.state = SfrState::TrackingTowards;
                }
            }
            SfrState::ProcessFound => {
                passes += 1;
                slot.state = SfrState::Waiting;
            }
            SfrState::Done => {
                slot.state = SfrState::Waiting;
            }
        }
    } else {
        slot.state = SfrState::Waiting;
        slot.confidence.index = 0;
        slot.confidence.magnitude = 0;
    }

    slot.index_prev = slot.index;
    slot.magnitude_prev = slot.magnitude;
    passes
}

fn trend(counter: &mut i32, trending: bool, cfg: &SideFiringConfig) {
    if trending {
        if *counter < cfg.confidence_max {
            *counter += 1;
        }
    } else if *counter > 0 {
        *counter -= 1;
    }
}
