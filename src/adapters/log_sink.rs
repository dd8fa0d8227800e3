//! Log-based command transport adapter.
//!
//! Implements [`CommandSink`] on top of the `log` facade (serial console /
//! stderr in practice).  Keeps a small registry of subsystem names so
//! that each report is tagged with its origin, and routes inbound command
//! lines (`"<subsystem> [args…]"`) back to the registered subsystem.

use heapless::Vec;
use log::info;

use crate::app::ports::{CommandSink, SubsystemId, Version};
use crate::error::TransportError;

/// Maximum number of subsystems that can register.
const MAX_SUBSYSTEMS: usize = 4;
/// Maximum number of arguments passed through on a command line.
pub const MAX_ARGS: usize = 8;

#[derive(Debug, Clone, Copy)]
struct Registration {
    name: &'static str,
    version: Version,
}

/// A parsed inbound command line.
#[derive(Debug, PartialEq, Eq)]
pub struct Dispatch<'a> {
    pub subsystem: SubsystemId,
    pub args: Vec<&'a str, MAX_ARGS>,
}

/// Adapter that writes every report to the log.
pub struct LogTransport {
    registry: Vec<Registration, MAX_SUBSYSTEMS>,
}

impl LogTransport {
    pub fn new() -> Self {
        Self {
            registry: Vec::new(),
        }
    }

    /// Route a command line to the subsystem it names.
    ///
    /// Returns `None` for blank lines and unknown subsystem names.  Extra
    /// arguments beyond [`MAX_ARGS`] are dropped.
    pub fn dispatch<'a>(&self, line: &'a str) -> Option<Dispatch<'a>> {
        let mut words = line.split_whitespace();
        let name = words.next()?;
        let index = self
            .registry
            .iter()
            .position(|r| r.name.eq_ignore_ascii_case(name))?;
        let mut args = Vec::new();
        for word in words {
            if args.push(word).is_err() {
                break;
            }
        }
        Some(Dispatch {
            subsystem: SubsystemId(index as u8),
            args,
        })
    }

    /// Name a handle was issued for.
    pub fn name_of(&self, subsystem: SubsystemId) -> Option<&'static str> {
        self.registry.get(usize::from(subsystem.0)).map(|r| r.name)
    }

    /// Version a subsystem registered with.
    pub fn version_of(&self, subsystem: SubsystemId) -> Option<Version> {
        self.registry.get(usize::from(subsystem.0)).map(|r| r.version)
    }
}

impl Default for LogTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandSink for LogTransport {
    fn register(
        &mut self,
        name: &'static str,
        version: Version,
    ) -> Result<SubsystemId, TransportError> {
        let id = SubsystemId(self.registry.len() as u8);
        self.registry
            .push(Registration { name, version })
            .map_err(|_| TransportError::RegistryFull)?;
        info!("SUBSYS | {} v{} registered as #{}", name, version, id.0);
        Ok(id)
    }

    fn report(&mut self, subsystem: SubsystemId, message: &str) -> Result<(), TransportError> {
        let name = self
            .name_of(subsystem)
            .ok_or(TransportError::UnknownSubsystem)?;
        info!("{} | {}", name, message);
        Ok(())
    }
}
