//! Host simulation adapters.
//!
//! [`SimAdc`] stands in for the converter driver: the main loop calls
//! [`SimAdc::convert`] at the conversion rate and the registered handler
//! receives the value.  [`ThermalPlant`] models the heated mass and the
//! thermistor divider, and [`SimPwm`] is the heater's compare register.
//!
//! The heater is driven through an inverting stage: a lower compare value
//! means more heat.

use log::{debug, info};

use crate::app::ports::{HeaterPort, SamplingSource};
use crate::config::RegulatorConfig;
use crate::error::SamplingError;
use crate::sensors::{ChannelConfig, RawSample, SampleHandler};

/// Highest channel number the simulated converter multiplexes.
const MAX_CHANNEL: u8 = 7;
/// Resolutions the simulated converter supports.
const RESOLUTIONS: [u8; 3] = [8, 10, 12];

// ───────────────────────────────────────────────────────────────
// SimAdc
// ───────────────────────────────────────────────────────────────

/// Single-slot simulated converter.
#[derive(Debug, Default)]
pub struct SimAdc {
    channel: Option<(ChannelConfig, SampleHandler)>,
    conversions: u64,
}

impl SimAdc {
    pub fn new() -> Self {
        Self::default()
    }

    /// Complete one conversion.  The value is clipped to the channel's
    /// full scale.  Returns `false` when no channel is registered.
    pub fn convert(&mut self, raw: RawSample) -> bool {
        let Some((config, handler)) = self.channel else {
            return false;
        };
        handler.on_conversion(raw.min(full_scale(config.resolution_bits)));
        self.conversions += 1;
        true
    }

    /// Largest code the registered channel can produce.
    pub fn full_scale(&self) -> Option<RawSample> {
        self.channel.map(|(c, _)| full_scale(c.resolution_bits))
    }

    pub fn conversions(&self) -> u64 {
        self.conversions
    }
}

fn full_scale(bits: u8) -> RawSample {
    ((1u32 << bits) - 1) as RawSample
}

impl SamplingSource for SimAdc {
    fn register_channel(
        &mut self,
        config: ChannelConfig,
        handler: SampleHandler,
    ) -> Result<(), SamplingError> {
        if config.channel > MAX_CHANNEL {
            return Err(SamplingError::InvalidChannel(config.channel));
        }
        if !RESOLUTIONS.contains(&config.resolution_bits) {
            return Err(SamplingError::UnsupportedResolution(config.resolution_bits));
        }
        if let Some((existing, _)) = self.channel {
            return Err(SamplingError::ChannelBusy(existing.channel));
        }
        info!(
            "SimAdc: channel {} registered ({} bits)",
            config.channel, config.resolution_bits
        );
        self.channel = Some((config, handler));
        Ok(())
    }
}

// ───────────────────────────────────────────────────────────────
// ThermalPlant
// ───────────────────────────────────────────────────────────────

/// First-order heated mass with Newtonian loss to ambient.
#[derive(Debug, Clone)]
pub struct ThermalPlant {
    temperature_c: f32,
    ambient_c: f32,
    /// °C/s gained at full heater power.
    heating_rate: f32,
    /// Fraction of the ambient difference lost per second.
    loss_coefficient: f32,
    calibration_offset: i32,
    scale_factor: i32,
}

impl ThermalPlant {
    pub fn new(ambient_c: f32, heating_rate: f32, loss_coefficient: f32) -> Self {
        Self {
            temperature_c: ambient_c,
            ambient_c,
            heating_rate,
            loss_coefficient,
            calibration_offset: 100,
            scale_factor: 10,
        }
    }

    /// Use the same divider calibration the regulator decodes with.
    pub fn with_calibration(mut self, config: &RegulatorConfig) -> Self {
        self.calibration_offset = config.calibration_offset;
        self.scale_factor = config.scale_factor;
        self
    }

    /// Advance the model by `dt_s` seconds at `power` (0.0..=1.0).
    pub fn step(&mut self, power: f32, dt_s: f32) {
        let power = power.clamp(0.0, 1.0);
        let gain = self.heating_rate * power;
        let loss = self.loss_coefficient * (self.temperature_c - self.ambient_c);
        self.temperature_c += (gain - loss) * dt_s;
    }

    pub fn temperature(&self) -> f32 {
        self.temperature_c
    }

    /// Converter code the thermistor divider produces right now.
    pub fn raw_reading(&self) -> RawSample {
        let raw = self.temperature_c * self.scale_factor as f32 + self.calibration_offset as f32;
        raw.clamp(0.0, f32::from(RawSample::MAX)) as RawSample
    }
}

impl Default for ThermalPlant {
    fn default() -> Self {
        Self::new(25.0, 3.0, 0.1)
    }
}

// ───────────────────────────────────────────────────────────────
// SimPwm
// ───────────────────────────────────────────────────────────────

/// Simulated compare register behind an inverting driver.
#[derive(Debug, Default)]
pub struct SimPwm {
    period: u16,
    compare: u16,
    writes: u64,
}

impl SimPwm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn compare(&self) -> u16 {
        self.compare
    }

    pub fn writes(&self) -> u64 {
        self.writes
    }

    /// Heater power delivered, 0.0..=1.0.
    pub fn power(&self) -> f32 {
        if self.period == 0 {
            return 0.0;
        }
        1.0 - f32::from(self.compare) / f32::from(self.period)
    }
}

impl HeaterPort for SimPwm {
    fn configure(&mut self, period: u16, initial_duty: i32) {
        self.period = period;
        self.write_duty(initial_duty);
        info!("SimPwm: period={} compare={}", period, self.compare);
    }

    fn write_duty(&mut self, duty: i32) {
        self.compare = duty.clamp(0, i32::from(self.period)) as u16;
        self.writes += 1;
        debug!("SimPwm: compare={} power={:.2}", self.compare, self.power());
    }
}
