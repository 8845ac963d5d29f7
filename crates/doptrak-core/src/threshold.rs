//! Occupancy-driven detection floor
//!
//! The discovery stage only considers peaks above a minimum magnitude.
//! Fixing that floor at build time fails in the field, where antenna gain,
//! mounting and site noise vary widely. Instead the floor adapts from one
//! observable the engine already has: how full the track table is.
//!
//! A near-full table means the floor is low enough to track noise, so it
//! creeps up. An empty table means real vehicles may sit below the floor,
//! so it recovers fast, shedding an eighth per cycle. A table under half
//! full creeps down slowly. The floor converges to the quietest setting
//! that does not fill the table with ghosts.

use crate::types::Mag;

/// Fraction of the floor shed per cycle while the table is empty.
const RECOVERY_FRACTION: Mag = 0.125;

/// Minimum detectable magnitude, tuned from track-table occupancy.
#[derive(Debug, Clone)]
pub struct AdaptiveThreshold {
    value: Mag,
    ceiling: Mag,
    step: Mag,
}

impl AdaptiveThreshold {
    pub fn new(initial: Mag, ceiling: Mag, step: Mag) -> Self {
        Self {
            value: initial,
            ceiling,
            step,
        }
    }

    /// Current floor.
    pub fn value(&self) -> Mag {
        self.value
    }

    /// Force the floor, for calibration or reset.
    pub fn set_value(&mut self, value: Mag) {
        self.value = value;
    }

    /// One per-cycle adjustment from current table occupancy.
    pub fn update(&mut self, occupancy: usize, capacity: usize) {
        if occupancy + 2 >= capacity {
            // Within two slots of full: the floor is tracking noise.
            if self.value < self.ceiling {
                self.value += self.step;
            }
        } else if occupancy == 0 {
            self.value -= self.value * RECOVERY_FRACTION;
        } else if occupancy < capacity / 2 {
            if self.value > 0.0 {
                self.value = (self.value - self.step).max(0.0);
            }
        }
    }
}
