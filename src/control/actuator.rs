//! Duty-cycle regulator for the heater PWM channel.
//!
//! The policy is evaluated on the duty value *before* adjustment:
//!
//! ```text
//!   duty ≤ low            → pin to pin_low
//!   low < duty < high     → duty - output      (no clamp afterwards)
//!   duty ≥ high           → pin to pin_high
//! ```
//!
//! A large output can therefore push the duty outside the band in one
//! step.  The out-of-band value is written to the compare register and
//! stays there for one full control cycle; the next cycle pins it back.

use crate::config::RegulatorConfig;

/// Which branch of the policy produced the new duty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DutyAction {
    /// Inside the band: output subtracted.
    Adjusted,
    /// At or below the band: pinned to the low pin value.
    PinnedLow,
    /// At or above the band: pinned to the high pin value.
    PinnedHigh,
}

pub struct DutyRegulator {
    duty: i32,
    band_low: i32,
    band_high: i32,
    pin_low: i32,
    pin_high: i32,
}

impl DutyRegulator {
    pub fn new(initial_duty: i32, band: (i32, i32), pins: (i32, i32)) -> Self {
        Self {
            duty: initial_duty,
            band_low: band.0,
            band_high: band.1,
            pin_low: pins.0,
            pin_high: pins.1,
        }
    }

    pub fn from_config(config: &RegulatorConfig) -> Self {
        Self::new(
            config.initial_duty,
            (config.duty_band_low, config.duty_band_high),
            (config.duty_pin_low, config.duty_pin_high),
        )
    }

    /// Apply one controller output and return the new duty.
    pub fn apply(&mut self, output: i32) -> (i32, DutyAction) {
        let action = if self.duty > self.band_low && self.duty < self.band_high {
            self.duty = self.duty.saturating_sub(output);
            DutyAction::Adjusted
        } else if self.duty >= self.band_high {
            self.duty = self.pin_high;
            DutyAction::PinnedHigh
        } else {
            self.duty = self.pin_low;
            DutyAction::PinnedLow
        };
        (self.duty, action)
    }

    /// Current compare value.  May lie outside the band for one cycle.
    pub fn duty(&self) -> i32 {
        self.duty
    }

    /// Whether the duty currently sits strictly inside the operating band.
    pub fn in_band(&self) -> bool {
        self.duty > self.band_low && self.duty < self.band_high
    }
}
