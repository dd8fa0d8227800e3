//! Outbound reports.
//!
//! The [`RegulatorService`](super::service::RegulatorService) formats these
//! into fixed-capacity strings and hands them to the
//! [`CommandSink`](super::ports::CommandSink).  No heap.

use core::fmt::{self, Write};

use heapless::String;

use crate::error::TransportError;

/// Capacity of one formatted report.
pub const REPORT_CAPACITY: usize = 128;

pub type ReportBuf = String<REPORT_CAPACITY>;

/// A point-in-time snapshot of the control loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Telemetry {
    pub temperature_c: i32,
    pub duty: i32,
    pub proportional: f32,
    pub derivative: f32,
    pub integral: f32,
}

impl fmt::Display for Telemetry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Temperature, PWM, Error: {}, {}, {:.2}, {:.2}, {:.2}",
            self.temperature_c, self.duty, self.proportional, self.derivative, self.integral
        )
    }
}

/// Reply to a dispatched command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemperatureReply {
    pub temperature_c: i32,
}

impl fmt::Display for TemperatureReply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Temperature: {}", self.temperature_c)
    }
}

/// Render a report into a fixed buffer.
pub fn render(report: &impl fmt::Display) -> Result<ReportBuf, TransportError> {
    let mut buf = ReportBuf::new();
    write!(buf, "{report}").map_err(|_| TransportError::MessageTooLong)?;
    Ok(buf)
}
