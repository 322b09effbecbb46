//! External Collaborators
//!
//! Board housekeeping, the communication link, the status indicators and
//! the blocking delay are provided by the board. The controller only ever
//! calls into them through [`Services`].

/// Which status indicator to drive
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Indicator {
    /// Lit for the whole startup grace window
    Startup,
    /// Blinked once per active phase
    Awake,
}

#[cfg(feature = "embedded")]
impl defmt::Format for Indicator {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Startup => defmt::write!(f, "startup"),
            Self::Awake => defmt::write!(f, "awake"),
        }
    }
}

/// Services the power-mode controller relies on
pub trait Services {
    /// Periodic board housekeeping tick
    fn board_service(&mut self);

    /// Service the communication / reprogramming link (must not block)
    fn link_service(&mut self);

    /// Set a status indicator on or off
    fn status_indicator(&mut self, indicator: Indicator, on: bool);

    /// Busy-wait for `ms` milliseconds
    fn delay_ms(&mut self, ms: u32);
}

impl<S: Services + ?Sized> Services for &mut S {
    fn board_service(&mut self) {
        (**self).board_service();
    }

    fn link_service(&mut self) {
        (**self).link_service();
    }

    fn status_indicator(&mut self, indicator: Indicator, on: bool) {
        (**self).status_indicator(indicator, on);
    }

    fn delay_ms(&mut self, ms: u32) {
        (**self).delay_ms(ms);
    }
}
