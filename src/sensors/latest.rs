//! Single-slot "latest value" cell between the ADC conversion callback and
//! the filter task.
//!
//! ```text
//!  ADC ISR ──store()──▶ ┌─────────────┐ ──load()──▶ filter tick
//!  (any rate)           │ AtomicU16   │             (fixed rate)
//!                       └─────────────┘
//! ```
//!
//! Overwrite semantics: every conversion replaces the previous one and
//! nothing is queued.  When conversions outpace the filter tick the
//! intermediate samples are simply never observed.  A single atomic word
//! means a reader sees either the initial value or one complete write,
//! never a torn mix of two.

use core::sync::atomic::{AtomicU16, Ordering};

/// One raw ADC conversion, in counts.
pub type RawSample = u16;

pub struct LatestValue {
    value: AtomicU16,
}

impl LatestValue {
    /// `const` so the cell can live in a `static` shared with interrupt code.
    pub const fn new(initial: RawSample) -> Self {
        Self {
            value: AtomicU16::new(initial),
        }
    }

    /// Replace the stored sample.  Lock-free, safe from interrupt context.
    #[inline]
    pub fn store(&self, sample: RawSample) {
        self.value.store(sample, Ordering::Release);
    }

    /// Most recent complete sample.
    #[inline]
    pub fn load(&self) -> RawSample {
        self.value.load(Ordering::Acquire)
    }
}

impl Default for LatestValue {
    fn default() -> Self {
        Self::new(0)
    }
}
