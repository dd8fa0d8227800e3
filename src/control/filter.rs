//! Moving-average filter: raw thermistor counts → whole degrees.
//!
//! Each tick stores one corrected sample (`raw - calibration_offset`).
//! When the window is full the filter publishes
//! `(sum / window) / scale_factor`, both divisions truncating toward
//! zero, and starts the next window from an empty cursor.  Until the first
//! window completes the published temperature keeps its initial value of
//! zero.

use heapless::Vec;

use crate::config::{MAX_CALIBRATION_OFFSET, MAX_FILTER_WINDOW, RegulatorConfig};
use crate::error::ConfigError;
use crate::sensors::RawSample;

pub struct MovingAverage {
    window: Vec<i32, MAX_FILTER_WINDOW>,
    capacity: usize,
    calibration_offset: i32,
    scale_factor: i32,
    temperature: i32,
}

impl MovingAverage {
    /// Rejects the same window, offset and scale values as
    /// [`RegulatorConfig::validate`].
    pub fn new(
        capacity: usize,
        calibration_offset: i32,
        scale_factor: i32,
    ) -> Result<Self, ConfigError> {
        if capacity == 0 || capacity > MAX_FILTER_WINDOW {
            return Err(ConfigError::ValidationFailed("filter_window must be in 1..=32"));
        }
        if scale_factor == 0 {
            return Err(ConfigError::ValidationFailed("scale_factor must be non-zero"));
        }
        if calibration_offset.unsigned_abs() > MAX_CALIBRATION_OFFSET as u32 {
            return Err(ConfigError::ValidationFailed(
                "calibration_offset must be in -65535..=65535",
            ));
        }
        Ok(Self {
            window: Vec::new(),
            capacity,
            calibration_offset,
            scale_factor,
            temperature: 0,
        })
    }

    pub fn from_config(config: &RegulatorConfig) -> Result<Self, ConfigError> {
        Self::new(
            config.filter_window,
            config.calibration_offset,
            config.scale_factor,
        )
    }

    /// Feed one raw sample.
    ///
    /// Returns `Some(temperature)` exactly once per `capacity` calls, when
    /// the window completes; `None` otherwise.
    pub fn push(&mut self, raw: RawSample) -> Option<i32> {
        let corrected = i32::from(raw) - self.calibration_offset;
        // Cannot fail: the window is drained below as soon as it is full.
        let _ = self.window.push(corrected);

        if self.window.len() < self.capacity {
            return None;
        }

        let total: i32 = self.window.iter().sum();
        let mean = total / self.capacity as i32;
        self.temperature = mean / self.scale_factor;
        self.window.clear();
        Some(self.temperature)
    }

    /// Last published temperature (zero before the first full window).
    pub fn temperature(&self) -> i32 {
        self.temperature
    }

    /// Write position inside the current window, always `< capacity`.
    pub fn cursor(&self) -> usize {
        self.window.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
