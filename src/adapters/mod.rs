//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements     | Connects to                      |
//! |------------|----------------|----------------------------------|
//! | `hardware` | HeaterPort     | any `embedded-hal` PWM channel   |
//! | `log_sink` | CommandSink    | Serial / stderr log output       |
//! | `sim`      | SamplingSource | Simulated ADC + thermal plant    |
//! |            | HeaterPort     | Simulated PWM                    |

pub mod hardware;
pub mod log_sink;
pub mod sim;
