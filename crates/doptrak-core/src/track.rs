//! Track slots and graceful forgetting
//!
//! The engine keeps a small fixed table of [`Track`] slots, one per
//! concurrently tracked vehicle. A slot with `index == 0` is free: bin 0
//! carries DC energy and can never hold a moving target, so the index
//! doubles as the occupancy flag.
//!
//! Tracks are never dropped the moment they miss a cycle. A missed cycle
//! applies one [`Track::decay`] step instead, bleeding magnitude and
//! confidence until every confidence counter has reached zero. A vehicle
//! briefly masked by another echo therefore survives a few bad frames,
//! while noise-born tracks fade out within a handful of cycles.

use serde::{Deserialize, Serialize};

use crate::types::{Direction, Mag};

/// Fraction of magnitude lost per missed cycle.
const DECAY_FRACTION: Mag = 0.125;

/// Bounded hysteresis counters gating per-track decisions.
///
/// Events move counters up, misses move them down; decisions fire on
/// thresholds. A single noisy frame can never flip a classification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackConfidence {
    /// Direction classification confidence, raised by the tiered increment
    /// in [`crate::direction`].
    pub direction: i32,
    /// Acceleration plausibility confidence. The present matcher never
    /// raises it; it still participates in decay and in the drop decision.
    pub acceleration: i32,
    /// Peak re-acquisition confidence.
    pub magnitude: i32,
    /// Track persistence confidence.
    pub magnitude_track: i32,
}

impl TrackConfidence {
    /// True when every counter has decayed to zero.
    pub fn is_zero(&self) -> bool {
        self.direction == 0
            && self.acceleration == 0
            && self.magnitude == 0
            && self.magnitude_track == 0
    }
}

/// One slot of the track table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// Peak bin index. Zero marks a free slot.
    pub index: usize,
    /// Signed bin displacement accepted at the last match.
    pub delta_index: i32,
    /// Peak magnitude from the current cycle.
    pub magnitude: Mag,
    /// Peak magnitude from the previous match.
    pub magnitude_prev: Mag,
    /// Confirmed movement classification.
    pub direction: Direction,
    /// Direction vote counter. Negative votes mean towards the antenna,
    /// positive mean away; saturates at the configured limit.
    pub direction_counter: i32,
    /// Set when the vote counter saturates; holds `direction` steady until
    /// enough opposing votes accumulate.
    pub direction_locked: bool,
    /// Consecutive successful re-acquisitions, capped.
    pub track_counter: u32,
    /// Last observed left-channel phase, in turns.
    pub theta_left: Mag,
    /// Last observed right-channel phase, in turns.
    pub theta_right: Mag,
    /// Low-pass filtered left/right phase difference.
    pub delta_theta: Mag,
    /// `delta_theta` from the previous cycle.
    pub delta_theta_prev: Mag,
    /// Filtered rate of change of `delta_theta`, kept for diagnostics.
    pub delta_delta_theta: Mag,
    /// Hysteresis counters for this track.
    pub confidence: TrackConfidence,
}

impl Track {
    /// Whether this slot holds a live track.
    #[inline]
    pub fn is_occupied(&self) -> bool {
        self.index != 0
    }

    /// Return the slot to the free state.
    pub fn clear(&mut self) {
        *self = Track::default();
    }

    /// One decay step for a track that missed re-acquisition this cycle.
    ///
    /// Magnitude loses one eighth, direction evidence fades at double rate,
    /// every other confidence counter steps once toward zero. Returns true
    /// when the slot cleared because all confidence was exhausted.
    pub fn decay(&mut self) -> bool {
        self.magnitude -= self.magnitude * DECAY_FRACTION;
        // Twice for direction evidence.
        step_toward_zero(&mut self.confidence.direction);
        step_toward_zero(&mut self.confidence.direction);
        step_toward_zero(&mut self.direction_counter);
        step_toward_zero(&mut self.direction_counter);
        step_toward_zero(&mut self.confidence.acceleration);
        step_toward_zero(&mut self.confidence.magnitude);
        step_toward_zero(&mut self.confidence.magnitude_track);
        if self.confidence.is_zero() {
            self.clear();
            true
        } else {
            false
        }
    }
}

/// Move a counter one step closer to zero, stopping at zero.
#[inline]
pub fn step_toward_zero(value: &mut i32) {
    if *value > 0 {
        *value -= 1;
    } else if *value < 0 {
        *value += 1;
    }
}
