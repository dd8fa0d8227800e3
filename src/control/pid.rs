//! PID controller for heater regulation
//!
//! Integer error, floating-point terms.  The truncation points are part
//! of the control behaviour and must stay where they are:
//!
//! - the derivative divides the error delta by the sampling interval in
//!   integer arithmetic before the gain is applied;
//! - the output is truncated toward zero when handed to the actuator.
//!
//! Only the integral *contribution* is clamped.  The running error
//! integral itself keeps accumulating, so a long excursion winds it up
//! well past what the clamped term reflects.

use core::num::NonZeroI32;

use log::debug;

use crate::config::RegulatorConfig;
use crate::error::ConfigError;

/// Per-invocation breakdown, kept for diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PidTerms {
    pub error: i32,
    pub proportional: f32,
    pub derivative: f32,
    pub integral: f32,
    /// Sum of the three terms, truncated toward zero.
    pub output: i32,
}

/// PID controller
#[derive(Debug, Clone)]
pub struct PidController {
    kp: f32,
    ki: f32,
    kd: f32,
    setpoint: i32,
    sampling_interval: NonZeroI32,
    integral_min: f32,
    integral_max: f32,
    prev_error: i32,
    running_integral: i64,
    last: PidTerms,
}

impl PidController {
    pub fn new(kp: f32, ki: f32, kd: f32, setpoint: i32, sampling_interval: NonZeroI32) -> Self {
        Self {
            kp,
            ki,
            kd,
            setpoint,
            sampling_interval,
            integral_min: -40.0,
            integral_max: 40.0,
            prev_error: 0,
            running_integral: 0,
            last: PidTerms::default(),
        }
    }

    pub fn from_config(config: &RegulatorConfig) -> Result<Self, ConfigError> {
        let interval = NonZeroI32::new(config.sampling_interval)
            .ok_or(ConfigError::ValidationFailed("sampling_interval must be non-zero"))?;
        let mut pid = Self::new(config.kp, config.ki, config.kd, config.setpoint_c, interval);
        pid.set_integral_limits(config.integral_min, config.integral_max);
        Ok(pid)
    }

    /// Set the bounds of the integral contribution
    pub fn set_integral_limits(&mut self, min: f32, max: f32) {
        self.integral_min = min;
        self.integral_max = max;
    }

    /// Run one control step against the filtered temperature.
    pub fn compute(&mut self, temperature: i32) -> PidTerms {
        let interval = self.sampling_interval.get();
        let error = self.setpoint.saturating_sub(temperature);

        // Integral accumulator (unclamped)
        self.running_integral = self
            .running_integral
            .saturating_add(i64::from(error) * i64::from(interval));

        // Proportional
        let proportional = self.kp * error as f32;

        // Derivative
        let derivative = self.kd * (error.saturating_sub(self.prev_error) / interval) as f32;

        // Integral contribution (clamped)
        let integral =
            (self.ki * self.running_integral as f32).clamp(self.integral_min, self.integral_max);

        self.prev_error = error;

        let output = (proportional + derivative + integral) as i32;

        debug!(
            "PID: e={} P={:.2} D={:.2} I={:.2} (acc={}) -> {}",
            error, proportional, derivative, integral, self.running_integral, output
        );

        self.last = PidTerms {
            error,
            proportional,
            derivative,
            integral,
            output,
        };
        self.last
    }

    /// Terms of the most recent invocation (all zero before the first).
    pub fn last_terms(&self) -> PidTerms {
        self.last
    }

    pub fn previous_error(&self) -> i32 {
        self.prev_error
    }

    /// Raw accumulated error integral, unclamped.
    pub fn running_integral(&self) -> i64 {
        self.running_integral
    }
}
