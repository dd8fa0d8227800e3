//! Hardware adapter — bridges a PWM peripheral to the [`HeaterPort`].
//!
//! Any channel implementing `embedded_hal::pwm::SetDutyCycle` can drive the
//! heater.  The regulator thinks in compare counts out of `period`; this
//! adapter maps them onto the peripheral's own duty range and saturates
//! values the regulator may hold outside `0..=period`.

use embedded_hal::pwm::SetDutyCycle;
use log::{info, warn};

use crate::app::ports::HeaterPort;

/// Heater output on an `embedded-hal` PWM channel.
pub struct PwmHeater<P> {
    pwm: P,
    period: u16,
    last_written: u16,
    write_errors: u32,
}

impl<P: SetDutyCycle> PwmHeater<P> {
    pub fn new(pwm: P) -> Self {
        Self {
            pwm,
            period: 0,
            last_written: 0,
            write_errors: 0,
        }
    }

    /// Compare value actually applied, after saturation.
    pub fn last_written(&self) -> u16 {
        self.last_written
    }

    /// Number of writes the peripheral rejected.
    pub fn write_errors(&self) -> u32 {
        self.write_errors
    }

    pub fn into_inner(self) -> P {
        self.pwm
    }

    fn apply(&mut self, duty: i32) {
        if self.period == 0 {
            warn!("PWM write before configure dropped");
            return;
        }
        let counts = duty.clamp(0, i32::from(self.period)) as u16;
        match self.pwm.set_duty_cycle_fraction(counts, self.period) {
            Ok(()) => self.last_written = counts,
            Err(e) => {
                self.write_errors = self.write_errors.saturating_add(1);
                warn!("PWM write of {} failed: {:?}", counts, e);
            }
        }
    }
}

impl<P: SetDutyCycle> HeaterPort for PwmHeater<P> {
    fn configure(&mut self, period: u16, initial_duty: i32) {
        self.period = period;
        info!(
            "PWM heater: period={} counts, peripheral max={}",
            period,
            self.pwm.max_duty_cycle()
        );
        self.apply(initial_duty);
    }

    fn write_duty(&mut self, duty: i32) {
        self.apply(duty);
    }
}
