//! Signal Line Quiescing
//!
//! Any external line left as an input floats and draws current while the
//! core sleeps. Before every sleep entry each registered line is driven as
//! a low output.

use heapless::Vec;

use crate::config::MAX_SIGNAL_LINES;
use crate::error::Error;

/// An external-facing signal line
pub trait SignalLine {
    /// Configure the line as an output driven low
    fn drive_low(&mut self);

    /// Read back whether the line is currently an output driven low
    fn is_driven_low(&self) -> bool;
}

impl<L: SignalLine + ?Sized> SignalLine for &mut L {
    fn drive_low(&mut self) {
        (**self).drive_low();
    }

    fn is_driven_low(&self) -> bool {
        (**self).is_driven_low()
    }
}

/// Fixed-capacity set of lines driven low before sleep
pub struct Quiescer<L, const N: usize = MAX_SIGNAL_LINES> {
    lines: Vec<L, N>,
}

impl<L: SignalLine, const N: usize> Quiescer<L, N> {
    /// Create an empty quiescer
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Register a line
    ///
    /// # Errors
    ///
    /// Returns [`Error::TooManySignalLines`] once `N` lines are registered.
    pub fn add_line(&mut self, line: L) -> Result<(), Error> {
        self.lines
            .push(line)
            .map_err(|_| Error::TooManySignalLines { capacity: N })
    }

    /// Drive every registered line low
    pub fn quiesce_all(&mut self) {
        for line in &mut self.lines {
            line.drive_low();
        }
    }

    /// Check that every line reads back as a low output
    #[must_use]
    pub fn is_quiesced(&self) -> bool {
        self.lines.iter().all(SignalLine::is_driven_low)
    }

    /// Registered lines
    #[must_use]
    pub fn lines(&self) -> &[L] {
        &self.lines
    }

    /// Number of registered lines
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether no lines are registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl<L: SignalLine, const N: usize> Default for Quiescer<L, N> {
    fn default() -> Self {
        Self::new()
    }
}
