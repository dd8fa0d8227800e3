//! Regulator configuration parameters
//!
//! Every tunable of the control loop lives here.  Defaults reproduce the
//! reference bench setup (45 °C setpoint, 10 ms filter tick, 1 s
//! diagnostics).  Values can be overridden from a JSON document; missing
//! fields fall back to the defaults.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Largest moving-average window the filter can hold.
pub const MAX_FILTER_WINDOW: usize = 32;

/// Largest calibration offset magnitude.  Keeps a full window of corrected
/// 16-bit samples inside `i32`.
pub const MAX_CALIBRATION_OFFSET: i32 = 65_535;

/// Accepted setpoints, whole degrees.
pub const SETPOINT_RANGE: core::ops::RangeInclusive<i32> = -273..=1_000;

/// Core regulator configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegulatorConfig {
    // --- Setpoint ---
    /// Target temperature in whole degrees
    pub setpoint_c: i32,

    // --- Sampling ---
    /// ADC channel the thermistor divider is wired to
    pub adc_channel: u8,
    /// ADC conversion resolution in bits
    pub adc_resolution_bits: u8,

    // --- Timing ---
    /// Delay before the first filter tick (milliseconds)
    pub filter_initial_delay_ms: u32,
    /// Filter tick period (milliseconds)
    pub filter_period_ms: u32,
    /// Delay before the first diagnostics report (milliseconds)
    pub diagnostics_initial_delay_ms: u32,
    /// Diagnostics report period (milliseconds)
    pub diagnostics_period_ms: u32,

    // --- Filter ---
    /// Number of corrected samples averaged per published temperature
    pub filter_window: usize,
    /// Subtracted from every raw sample before averaging
    pub calibration_offset: i32,
    /// Averaged counts per degree
    pub scale_factor: i32,

    // --- PID ---
    pub kp: f32,
    pub kd: f32,
    pub ki: f32,
    /// Controller sampling interval (dimensionless, must be non-zero)
    pub sampling_interval: i32,
    /// Lower bound of the integral term's contribution
    pub integral_min: f32,
    /// Upper bound of the integral term's contribution
    pub integral_max: f32,

    // --- Actuator ---
    /// Lower edge of the duty operating band (exclusive)
    pub duty_band_low: i32,
    /// Upper edge of the duty operating band (exclusive)
    pub duty_band_high: i32,
    /// Duty written when the duty has fallen to or below the band
    pub duty_pin_low: i32,
    /// Duty written when the duty has risen to or above the band
    pub duty_pin_high: i32,
    /// PWM period in timer ticks
    pub pwm_period: u16,
    /// Duty loaded into the compare register at start-up
    pub initial_duty: i32,
}

impl Default for RegulatorConfig {
    fn default() -> Self {
        Self {
            // Setpoint
            setpoint_c: 45,

            // Sampling
            adc_channel: 0,
            adc_resolution_bits: 10,

            // Timing
            filter_initial_delay_ms: 50,
            filter_period_ms: 10,         // 100 Hz filter, 20 Hz control
            diagnostics_initial_delay_ms: 60,
            diagnostics_period_ms: 1000,  // 1 Hz

            // Filter
            filter_window: 5,
            calibration_offset: 100,
            scale_factor: 10,

            // PID
            kp: 3.0,
            kd: 2.0,
            ki: 0.5,
            sampling_interval: 1,
            integral_min: -40.0,
            integral_max: 40.0,

            // Actuator
            duty_band_low: 100,
            duty_band_high: 1000,
            duty_pin_low: 101,
            duty_pin_high: 999,
            pwm_period: 1000,
            initial_duty: 100,
        }
    }
}

impl RegulatorConfig {
    /// Check every field before the loop is built.
    ///
    /// Invalid values are rejected, never clamped.  A zero sampling
    /// interval in particular would divide by zero in the derivative term.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !SETPOINT_RANGE.contains(&self.setpoint_c) {
            return Err(ConfigError::ValidationFailed("setpoint_c must be in -273..=1000"));
        }
        if self.sampling_interval == 0 {
            return Err(ConfigError::ValidationFailed("sampling_interval must be non-zero"));
        }
        if self.filter_window == 0 || self.filter_window > MAX_FILTER_WINDOW {
            return Err(ConfigError::ValidationFailed("filter_window must be in 1..=32"));
        }
        if self.scale_factor == 0 {
            return Err(ConfigError::ValidationFailed("scale_factor must be non-zero"));
        }
        if self.calibration_offset.unsigned_abs() > MAX_CALIBRATION_OFFSET as u32 {
            return Err(ConfigError::ValidationFailed(
                "calibration_offset must be in -65535..=65535",
            ));
        }
        if self.filter_period_ms == 0 {
            return Err(ConfigError::ValidationFailed("filter_period_ms must be non-zero"));
        }
        if self.diagnostics_period_ms == 0 {
            return Err(ConfigError::ValidationFailed("diagnostics_period_ms must be non-zero"));
        }
        if !(1..=16).contains(&self.adc_resolution_bits) {
            return Err(ConfigError::ValidationFailed("adc_resolution_bits must be in 1..=16"));
        }
        if !(self.kp.is_finite() && self.kd.is_finite() && self.ki.is_finite()) {
            return Err(ConfigError::ValidationFailed("PID gains must be finite"));
        }
        if !(self.integral_min.is_finite() && self.integral_max.is_finite())
            || self.integral_min > self.integral_max
        {
            return Err(ConfigError::ValidationFailed("integral bounds must be finite and ordered"));
        }
        if self.duty_band_low >= self.duty_band_high {
            return Err(ConfigError::ValidationFailed("duty_band_low must be below duty_band_high"));
        }
        let in_band = |d: i32| d > self.duty_band_low && d < self.duty_band_high;
        if !in_band(self.duty_pin_low) || !in_band(self.duty_pin_high) {
            return Err(ConfigError::ValidationFailed("duty pin values must lie inside the band"));
        }
        if self.pwm_period == 0 {
            return Err(ConfigError::ValidationFailed("pwm_period must be non-zero"));
        }
        Ok(())
    }
}
