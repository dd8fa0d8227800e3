//! Mock hardware adapters for integration tests.
//!
//! Records every PWM write and every transport message so tests can
//! assert on the full history without touching real registers.

use thermoreg::app::ports::{CommandSink, HeaterPort, SamplingSource, SubsystemId, Version};
use thermoreg::error::{SamplingError, TransportError};
use thermoreg::sensors::{ChannelConfig, LatestValue, RawSample, SampleHandler};

/// Fresh sample cell for one test.
pub fn leak_cell() -> &'static LatestValue {
    Box::leak(Box::new(LatestValue::new(0)))
}

// ── MockPwm ───────────────────────────────────────────────────

#[derive(Default)]
pub struct MockPwm {
    pub period: Option<u16>,
    pub initial: Option<i32>,
    pub writes: Vec<i32>,
}

impl HeaterPort for MockPwm {
    fn configure(&mut self, period: u16, initial_duty: i32) {
        self.period = Some(period);
        self.initial = Some(initial_duty);
    }

    fn write_duty(&mut self, duty: i32) {
        self.writes.push(duty);
    }
}

// ── MockAdc ───────────────────────────────────────────────────

/// Converter that replays a scripted sequence of samples on demand.
#[derive(Default)]
pub struct MockAdc {
    pub channel: Option<ChannelConfig>,
    pub(crate) handler: Option<SampleHandler>,
    pub refuse: Option<SamplingError>,
}

#[allow(dead_code)]
impl MockAdc {
    /// Fire one conversion-complete interrupt.
    pub fn complete(&self, raw: RawSample) {
        if let Some(h) = self.handler {
            h.on_conversion(raw);
        }
    }

    pub fn handler(&self) -> Option<SampleHandler> {
        self.handler
    }
}

impl SamplingSource for MockAdc {
    fn register_channel(
        &mut self,
        config: ChannelConfig,
        handler: SampleHandler,
    ) -> Result<(), SamplingError> {
        if let Some(e) = self.refuse {
            return Err(e);
        }
        self.channel = Some(config);
        self.handler = Some(handler);
        Ok(())
    }
}

// ── MockTransport ─────────────────────────────────────────────

#[derive(Default)]
pub struct MockTransport {
    pub registered: Vec<(&'static str, Version)>,
    pub messages: Vec<String>,
    /// Reject every report with `Busy`.
    pub busy: bool,
    pub dropped: usize,
}

impl CommandSink for MockTransport {
    fn register(
        &mut self,
        name: &'static str,
        version: Version,
    ) -> Result<SubsystemId, TransportError> {
        self.registered.push((name, version));
        Ok(SubsystemId(self.registered.len() as u8 - 1))
    }

    fn report(&mut self, _subsystem: SubsystemId, message: &str) -> Result<(), TransportError> {
        if self.busy {
            self.dropped += 1;
            return Err(TransportError::Busy);
        }
        self.messages.push(message.to_string());
        Ok(())
    }
}
