//! Port traits — the boundary between the control loop and its collaborators.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ RegulatorService (domain)
//! ```
//!
//! The ADC driver, the cooperative scheduler, the logging/command
//! transport and the PWM hardware all sit behind these traits.  The
//! [`RegulatorService`](super::service::RegulatorService) consumes them via
//! generics, so the control core never touches hardware directly.

use core::fmt;

use crate::error::{SamplingError, SchedulerError, TransportError};
use crate::sensors::{ChannelConfig, SampleHandler};

// ───────────────────────────────────────────────────────────────
// Sampling port (driven adapter: ADC → domain)
// ───────────────────────────────────────────────────────────────

/// A push-based converter.  Once a channel is registered the driver calls
/// the handler on every completed conversion, at its own cadence.
pub trait SamplingSource {
    fn register_channel(
        &mut self,
        config: ChannelConfig,
        handler: SampleHandler,
    ) -> Result<(), SamplingError>;
}

// ───────────────────────────────────────────────────────────────
// Scheduler port (domain → cooperative task runtime)
// ───────────────────────────────────────────────────────────────

/// The periodic tasks the regulator runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskId {
    /// Sample → filter → (every window) PID → duty.
    Filter,
    /// Telemetry report to the transport.
    Diagnostics,
}

/// Registers periodic tasks with a cooperative runtime.
///
/// Tasks never block and are never cancelled.  When one is due the
/// runtime notifies a [`SchedulerDelegate`], which dispatches it.
pub trait TaskScheduler {
    fn register(
        &mut self,
        task: TaskId,
        initial_delay_ms: u32,
        period_ms: u32,
    ) -> Result<(), SchedulerError>;
}

/// Callback trait invoked when a registered task is due.
///
/// This decouples the [`Scheduler`](crate::scheduler::Scheduler) from what
/// the tasks do.  The main loop implements it by calling into the service.
pub trait SchedulerDelegate {
    fn on_task_due(&mut self, task: TaskId);
}

// ───────────────────────────────────────────────────────────────
// Command / logging transport (domain ↔ serial console)
// ───────────────────────────────────────────────────────────────

/// Opaque handle issued by [`CommandSink::register`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubsystemId(pub u8);

/// Subsystem firmware version, packed as `major.minor.build` in one word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Version {
    pub major: u8,
    pub minor: u8,
    pub build: u16,
}

impl Version {
    /// Unpack a `0xMMmmBBBB` version word.
    pub const fn from_word(word: u32) -> Self {
        Self {
            major: (word >> 24) as u8,
            minor: (word >> 16) as u8,
            build: word as u16,
        }
    }

    pub const fn word(self) -> u32 {
        ((self.major as u32) << 24) | ((self.minor as u32) << 16) | self.build as u32
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.build)
    }
}

/// The logging / command-dispatch transport.
///
/// A subsystem registers once by name and receives a handle; incoming
/// command lines addressed to that name are routed back to the subsystem
/// by the transport's owner.  Reports are fire-and-forget: callers drop
/// the message on error and never retry.
pub trait CommandSink {
    fn register(&mut self, name: &'static str, version: Version)
    -> Result<SubsystemId, TransportError>;

    fn report(&mut self, subsystem: SubsystemId, message: &str) -> Result<(), TransportError>;
}

// ───────────────────────────────────────────────────────────────
// Heater port (domain → PWM hardware)
// ───────────────────────────────────────────────────────────────

/// The heater's PWM channel.
pub trait HeaterPort {
    /// One-time bring-up: period and initial compare value.
    fn configure(&mut self, period: u16, initial_duty: i32);

    /// Write a new compare value.  `duty` is the regulator's value and may
    /// lie outside `0..=period`; implementations saturate it electrically.
    fn write_duty(&mut self, duty: i32);
}
