//! Direction classification with hysteresis
//!
//! A two-channel Doppler front end observes each echo on two antennas a
//! quarter wavelength apart. The sign of the left/right phase difference
//! then separates approaching from receding vehicles. Single-channel
//! hardware has no such observable, so the engine also supports a policy
//! that treats every confirmed match as a direction vote.
//!
//! Classification never flips on one frame. Matches cast votes into a
//! saturating counter; the counter's sign picks the direction, and
//! saturation locks the classification until enough opposing votes
//! accumulate. Stronger echoes earn confidence faster through a tiered
//! increment.
//!
//! # Example
//!
//! ```
//! use doptrak_core::direction::{observe_match, DirectionConfig};
//! use doptrak_core::track::Track;
//! use doptrak_core::types::Direction;
//!
//! let cfg = DirectionConfig::default();
//! let mut track = Track { index: 40, magnitude: 120.0, ..Track::default() };
//!
//! // Single-channel policy: every match is a confirmed vote.
//! observe_match(&cfg, &mut track, None);
//! assert_eq!(track.direction, Direction::Away);
//! ```

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::track::{step_toward_zero, Track};
use crate::types::{Direction, Mag};

/// Magnitude tiers selecting the direction-confidence increment.
const MAGNITUDE_CONFIDENCE_TIERS: [Mag; 5] = [10.0, 50.0, 100.0, 200.0, 400.0];

/// How confirmed matches contribute direction evidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DirectionPolicy {
    /// Every match counts as a confirmed vote; the classifier converges on
    /// [`Direction::Away`]. The single-channel configuration.
    IgnoreDirection,
    /// Vote from the wrapped left/right phase difference, judged against
    /// the configured towards and away bands.
    PhaseSensing,
}

impl Default for DirectionPolicy {
    fn default() -> Self {
        DirectionPolicy::IgnoreDirection
    }
}

/// Settings for the direction engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectionConfig {
    pub policy: DirectionPolicy,
    /// Saturating bound for the vote counter. Reaching it locks the
    /// classification; the unlock thresholds are a quarter of this value.
    pub counter_limit: i32,
    /// Upper bound for the direction confidence counter.
    pub confidence_cap: i32,
    /// Inclusive band of filtered phase deltas voting towards.
    pub towards_min: Mag,
    pub towards_max: Mag,
    /// Inclusive band of filtered phase deltas voting away.
    pub away_min: Mag,
    pub away_max: Mag,
    /// Calibration offset added to every raw phase difference.
    pub phase_offset: Mag,
    /// Low-pass coefficient folding raw phase differences into
    /// [`Track::delta_theta`]. 1.0 disables smoothing.
    pub delta_theta_filter: Mag,
}

impl Default for DirectionConfig {
    fn default() -> Self {
        Self {
            policy: DirectionPolicy::IgnoreDirection,
            counter_limit: 1,
            confidence_cap: 20,
            towards_min: 1.0,
            towards_max: 15.0,
            away_min: 1.0,
            away_max: 15.0,
            phase_offset: 1.0,
            delta_theta_filter: 0.25,
        }
    }
}

// ----------------------------------------------------------------------------
// Pure helpers
// ----------------------------------------------------------------------------

/// Wrapped difference of two channel phases, each in turns (0.0..1.0).
///
/// When the left phase has wrapped past the right one the difference is
/// unwrapped by a full revolution, keeping the result continuous across
/// the 1.0 -> 0.0 seam.
pub fn wrapped_phase_delta(right: Mag, left: Mag) -> Mag {
    if left > right {
        (right + 1.0) - left
    } else {
        right - left
    }
}

/// Direction-confidence increment earned by a match at `magnitude`.
///
/// Weak echoes vote slowly, strong echoes vote fast. Magnitudes above the
/// top tier fall back to the base increment of 2; peaks that strong tend
/// to be reflections off large flat surfaces rather than vehicles.
pub fn tiered_confidence_increment(magnitude: Mag) -> i32 {
    for (i, tier) in MAGNITUDE_CONFIDENCE_TIERS.iter().enumerate() {
        if magnitude < *tier {
            return i as i32 + 1;
        }
    }
    2
}

// ----------------------------------------------------------------------------
// Per-match update
// ----------------------------------------------------------------------------

/// Fold one confirmed re-acquisition into a track's direction state.
///
/// `phases` carries the `(left, right)` channel phases at the matched bin,
/// when the frame has them. The vote is cast per the configured policy,
/// then the lock state and classification are refreshed.
pub fn observe_match(cfg: &DirectionConfig, track: &mut Track, phases: Option<(Mag, Mag)>) {
    match (cfg.policy, phases) {
        (DirectionPolicy::PhaseSensing, Some((left, right))) => {
            track.theta_left = left;
            track.theta_right = right;
            let raw = wrapped_phase_delta(right, left) + cfg.phase_offset;
            track.delta_theta += (raw - track.delta_theta) * cfg.delta_theta_filter;
            let rate = track.delta_theta - track.delta_theta_prev;
            track.delta_delta_theta += (rate - track.delta_delta_theta) * 0.25;
            vote_from_bands(cfg, track);
        }
        (DirectionPolicy::PhaseSensing, None) => {
            trace!(
                index = track.index,
                "phase sensing without phase data, counting match as confirmed"
            );
            vote_confirmed(cfg, track);
        }
        (DirectionPolicy::IgnoreDirection, _) => vote_confirmed(cfg, track),
    }
    refresh_classification(cfg, track);
    track.delta_theta_prev = track.delta_theta;
}

fn vote_confirmed(cfg: &DirectionConfig, track: &mut Track) {
    if track.direction_counter < cfg.counter_limit {
        track.direction_counter += 1;
    } else {
        track.direction_locked = true;
    }
    raise_confidence(cfg, track);
}

fn vote_from_bands(cfg: &DirectionConfig, track: &mut Track) {
    let delta = track.delta_theta;
    if delta >= cfg.towards_min && delta <= cfg.towards_max {
        if track.direction_counter > -cfg.counter_limit {
            track.direction_counter -= 1;
        } else {
            track.direction_locked = true;
        }
        raise_confidence(cfg, track);
    } else if delta >= cfg.away_min && delta <= cfg.away_max {
        if track.direction_counter < cfg.counter_limit {
            track.direction_counter += 1;
        } else {
            track.direction_locked = true;
        }
        raise_confidence(cfg, track);
    } else {
        // Out of both bands. Twice, as for a missed cycle.
        step_toward_zero(&mut track.direction_counter);
        step_toward_zero(&mut track.confidence.direction);
        step_toward_zero(&mut track.direction_counter);
        step_toward_zero(&mut track.confidence.direction);
    }
}

fn raise_confidence(cfg: &DirectionConfig, track: &mut Track) {
    track.confidence.direction += tiered_confidence_increment(track.magnitude);
    if track.confidence.direction > cfg.confidence_cap {
        track.confidence.direction = cfg.confidence_cap;
    }
}

/// Refresh `direction` and the lock from the current counters.
fn refresh_classification(cfg: &DirectionConfig, track: &mut Track) {
    let quarter = cfg.counter_limit / 4;
    if !track.direction_locked {
        track.direction = if track.confidence.direction >= quarter {
            if track.direction_counter > 0 {
                Direction::Away
            } else if track.direction_counter < 0 {
                Direction::Towards
            } else {
                Direction::Unknown
            }
        } else {
            Direction::Unknown
        };
    } else {
        match track.direction {
            Direction::Towards => {
                if track.direction_counter > -quarter {
                    track.direction_locked = false;
                }
            }
            Direction::Away => {
                if track.direction_counter < quarter {
                    track.direction_locked = false;
                }
            }
            Direction::Unknown => track.direction_locked = false,
        }
    }
}
