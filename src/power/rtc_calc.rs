//! RTC Wake-up Reload Calculation
//!
//! Converts a resolution and threshold into the STM32 RTC wake-up timer
//! programming. This module is testable on the host.
//!
//! # Theory of Operation
//!
//! The wake-up counter is clocked either from the 32.768 kHz RTC clock
//! through a /16, /8, /4 or /2 divider, or from the 1 Hz `ck_spre`. It
//! fires after `WUT + 1` counter clocks, so a threshold of `n` units is
//! loaded as `n - 1`. A zero threshold has no such encoding; it gets the
//! shortest wait the hardware offers (`RTC/2`, `WUT = 0`, two ticks).
//!
//! The finest divider that can hold the wait in 16 bits is chosen. Waits
//! that are not a whole number of counter clocks round up, so a wake is
//! never early.

use crate::config::SLEEP_CLOCK_HZ;
use crate::types::TimerResolution;

/// Wake-up counter clock (`RTC_CR.WUCKSEL`)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WakeupClock {
    /// RTC clock / 16
    Div16,
    /// RTC clock / 8
    Div8,
    /// RTC clock / 4
    Div4,
    /// RTC clock / 2
    Div2,
    /// 1 Hz synchronous prescaler output
    CkSpre,
}

impl WakeupClock {
    /// Dividers from coarsest to finest
    const DIVIDERS: [Self; 4] = [Self::Div16, Self::Div8, Self::Div4, Self::Div2];

    /// `WUCKSEL` field value
    #[must_use]
    pub const fn bits(self) -> u32 {
        match self {
            Self::Div16 => 0b000,
            Self::Div8 => 0b001,
            Self::Div4 => 0b010,
            Self::Div2 => 0b011,
            Self::CkSpre => 0b100,
        }
    }

    /// RTC clock ticks per counter clock
    #[must_use]
    pub const fn ticks(self) -> u32 {
        match self {
            Self::Div16 => 16,
            Self::Div8 => 8,
            Self::Div4 => 4,
            Self::Div2 => 2,
            Self::CkSpre => SLEEP_CLOCK_HZ,
        }
    }

    /// Counter clock a resolution starts from before a threshold is known
    #[must_use]
    pub const fn for_resolution(resolution: TimerResolution) -> Self {
        match resolution {
            TimerResolution::OnePeriod => Self::Div2,
            TimerResolution::Periods32 | TimerResolution::Periods1024 => Self::Div16,
            TimerResolution::Periods32768 => Self::CkSpre,
        }
    }
}

/// Counter clock and reload value for one wake-up
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WakeupReload {
    /// Counter clock
    pub clock: WakeupClock,
    /// Value for `RTC_WUTR.WUT`
    pub wut: u16,
}

impl WakeupReload {
    /// Shortest wait the wake-up timer can produce
    pub const SHORTEST: Self = Self {
        clock: WakeupClock::Div2,
        wut: 0,
    };

    /// Programming for `threshold` units of `resolution`
    #[must_use]
    pub fn new(resolution: TimerResolution, threshold: u16) -> Self {
        let ticks = u32::from(threshold) * resolution.periods();
        if ticks == 0 {
            return Self::SHORTEST;
        }

        for clock in WakeupClock::DIVIDERS.iter().rev() {
            if let Some(wut) = Self::reload(ticks, *clock) {
                return Self { clock: *clock, wut };
            }
        }

        // Every threshold is at most 65535 s, so ck_spre always fits.
        let wut = Self::reload(ticks, WakeupClock::CkSpre).unwrap_or(u16::MAX);
        Self {
            clock: WakeupClock::CkSpre,
            wut,
        }
    }

    fn reload(ticks: u32, clock: WakeupClock) -> Option<u16> {
        let units = ticks.div_ceil(clock.ticks());
        u16::try_from(units - 1).ok()
    }

    /// RTC clock ticks from counter start to the wake event
    #[must_use]
    pub const fn wake_ticks(&self) -> u32 {
        (self.wut as u32 + 1) * self.clock.ticks()
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for WakeupReload {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "WUT={} @{} ticks", self.wut, self.clock.ticks());
    }
}
