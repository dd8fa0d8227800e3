//! Unified error types for the regulator.
//!
//! A single `Error` enum that every subsystem converts into, so the
//! start-up path can use `?` throughout.  All variants are `Copy`.
//!
//! Nothing in the running control path returns an error: the filter,
//! controller and duty policy are pure arithmetic.  Errors only occur
//! while configuring and wiring the loop to its collaborators.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Configuration is invalid.
    Config(ConfigError),
    /// The sampling source refused the channel registration.
    Sampling(SamplingError),
    /// The task scheduler refused a task registration.
    Scheduler(SchedulerError),
    /// The logging / command transport failed.
    Transport(TransportError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Sampling(e) => write!(f, "sampling: {e}"),
            Self::Scheduler(e) => write!(f, "scheduler: {e}"),
            Self::Transport(e) => write!(f, "transport: {e}"),
        }
    }
}

impl core::error::Error for Error {}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ValidationFailed(msg) => write!(f, "validation failed: {msg}"),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Sampling errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamplingError {
    /// The requested channel does not exist on this converter.
    InvalidChannel(u8),
    /// The converter cannot run at the requested resolution.
    UnsupportedResolution(u8),
    /// A handler is already attached to this channel.
    ChannelBusy(u8),
}

impl fmt::Display for SamplingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidChannel(ch) => write!(f, "invalid ADC channel {ch}"),
            Self::UnsupportedResolution(bits) => write!(f, "unsupported resolution {bits} bits"),
            Self::ChannelBusy(ch) => write!(f, "ADC channel {ch} already registered"),
        }
    }
}

impl From<SamplingError> for Error {
    fn from(e: SamplingError) -> Self {
        Self::Sampling(e)
    }
}

// ---------------------------------------------------------------------------
// Scheduler errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerError {
    /// All task slots are taken.
    Full,
    /// A periodic task needs a non-zero period.
    ZeroPeriod,
}

impl fmt::Display for SchedulerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Full => write!(f, "no free task slot"),
            Self::ZeroPeriod => write!(f, "task period must be non-zero"),
        }
    }
}

impl From<SchedulerError> for Error {
    fn from(e: SchedulerError) -> Self {
        Self::Scheduler(e)
    }
}

// ---------------------------------------------------------------------------
// Transport errors
// ---------------------------------------------------------------------------

/// Errors from the logging / command-dispatch transport.
///
/// `Busy` and `MessageTooLong` are degraded-mode outcomes for reports:
/// the core drops the message and carries on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportError {
    /// The transport cannot accept a message right now.
    Busy,
    /// The formatted message did not fit the message buffer.
    MessageTooLong,
    /// No more subsystems can be registered.
    RegistryFull,
    /// The subsystem handle was never issued by this transport.
    UnknownSubsystem,
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Busy => write!(f, "transport busy"),
            Self::MessageTooLong => write!(f, "message too long"),
            Self::RegistryFull => write!(f, "subsystem registry full"),
            Self::UnknownSubsystem => write!(f, "unknown subsystem"),
        }
    }
}

impl From<TransportError> for Error {
    fn from(e: TransportError) -> Self {
        Self::Transport(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

pub type Result<T> = core::result::Result<T, Error>;
