//! Error type for the low-power firmware.
//!
//! The sleep path itself has no recoverable failures: every step is an
//! unconditional register write or a blocking poll. Errors only arise while
//! the board is being assembled.

use core::fmt;

/// Construction-time failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// More signal lines were registered than the quiescer can hold.
    TooManySignalLines {
        /// Fixed capacity of the quiescer
        capacity: usize,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooManySignalLines { capacity } => {
                write!(f, "signal line set is full (capacity {capacity})")
            }
        }
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for Error {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::TooManySignalLines { capacity } => {
                defmt::write!(f, "signal line set is full (capacity {})", capacity);
            }
        }
    }
}
