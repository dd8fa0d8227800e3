//! Thermoreg heater regulator library.
//!
//! A thermistor is sampled by a push-based ADC, smoothed by a
//! moving-average filter, and fed to a PID controller whose output moves
//! the heater's PWM compare value.  Everything hardware-facing sits behind
//! the port traits in [`app::ports`]; the [`adapters`] module provides the
//! console transport, an `embedded-hal` PWM bridge and a host simulation.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod control;
pub mod error;
pub mod scheduler;
pub mod sensors;
