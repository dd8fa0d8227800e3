//! Thermistor sampling — the boundary between the ADC driver and the loop.
//!
//! The ADC driver owns conversion mechanics.  The regulator hands it a
//! [`SampleHandler`] for one channel; the driver calls
//! [`SampleHandler::on_conversion`] from its completion interrupt.  The
//! handler only stores the value: no filtering, no scaling, no blocking.

pub mod latest;

pub use latest::{LatestValue, RawSample};

/// Which converter channel to sample, and at what resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelConfig {
    pub channel: u8,
    pub resolution_bits: u8,
}

/// Conversion-complete callback registered with a
/// [`SamplingSource`](crate::app::ports::SamplingSource).
///
/// Cheap to copy; every copy writes the same cell.
#[derive(Clone, Copy)]
pub struct SampleHandler {
    cell: &'static LatestValue,
}

impl SampleHandler {
    pub fn new(cell: &'static LatestValue) -> Self {
        Self { cell }
    }

    /// Called by the ADC driver, possibly from interrupt context.  O(1).
    #[inline]
    pub fn on_conversion(&self, raw: RawSample) {
        self.cell.store(raw);
    }
}

impl core::fmt::Debug for SampleHandler {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SampleHandler")
            .field("latest", &self.cell.load())
            .finish()
    }
}
