//! Control path state records: filter → PID → duty regulator.
//!
//! Each record is owned exclusively by
//! [`RegulatorService`](crate::app::service::RegulatorService) and is
//! pure arithmetic.  No I/O, no shared state.

pub mod actuator;
pub mod filter;
pub mod pid;
