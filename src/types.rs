//! Shared types used across the low-power firmware
//!
//! This module defines domain-specific types that enforce invariants
//! at compile time and provide type safety throughout the codebase.

use core::fmt;

use bitflags::bitflags;

use crate::config::SLEEP_CLOCK_HZ;

/// Requested length of the next sleep phase, in seconds
///
/// Grows by one every active/sleep cycle and wraps from 65535 back to 0.
/// Lives in RAM only, so every cold boot starts again from zero.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SleepDuration(u16);

impl SleepDuration {
    /// Zero-length sleep, used for the very first cycle after boot
    pub const ZERO: Self = Self(0);

    /// Largest representable duration
    pub const MAX: Self = Self(u16::MAX);

    /// Create a duration from whole seconds
    #[must_use]
    pub const fn from_secs(secs: u16) -> Self {
        Self(secs)
    }

    /// Get the duration in seconds
    #[must_use]
    pub const fn as_secs(self) -> u16 {
        self.0
    }

    /// Duration for the following cycle (wraps at the 16-bit boundary)
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }

    /// Upper byte of the event threshold
    #[must_use]
    pub const fn high_byte(self) -> u8 {
        (self.0 >> 8) as u8
    }

    /// Lower byte of the event threshold
    #[must_use]
    pub const fn low_byte(self) -> u8 {
        (self.0 & 0xFF) as u8
    }
}

impl fmt::Debug for SleepDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0)
    }
}

impl fmt::Display for SleepDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} s", self.0)
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for SleepDuration {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "{}s", self.0);
    }
}

/// Power-mode controller state
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum PowerMode {
    /// Grace window after cold boot (entered once)
    #[default]
    Startup,
    /// Housekeeping and activity blink
    Active,
    /// Quiescing lines and programming the wake timer
    Arming,
    /// CPU suspended until the wake timer fires
    Sleeping,
}

impl PowerMode {
    /// Whether this state is part of the repeating cycle
    #[must_use]
    pub const fn is_cyclic(self) -> bool {
        !matches!(self, Self::Startup)
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for PowerMode {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Startup => defmt::write!(f, "STARTUP"),
            Self::Active => defmt::write!(f, "ACTIVE"),
            Self::Arming => defmt::write!(f, "ARMING"),
            Self::Sleeping => defmt::write!(f, "SLEEPING"),
        }
    }
}

/// CPU power mode selected by the mode-select bits
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SleepMode {
    /// Full-speed run mode
    #[default]
    Active,
    /// Deep sleep: core clocks halted, only the wake-timer reference runs
    DeepSleep,
}

#[cfg(feature = "embedded")]
impl defmt::Format for SleepMode {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Active => defmt::write!(f, "RUN"),
            Self::DeepSleep => defmt::write!(f, "DEEP"),
        }
    }
}

/// Wake-timer resolution: reference clock periods per threshold unit
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum TimerResolution {
    /// 1 period per unit (reset default)
    #[default]
    OnePeriod = 0,
    /// 2^5 periods per unit
    Periods32 = 1,
    /// 2^10 periods per unit
    Periods1024 = 2,
    /// 2^15 periods per unit (one second at 32.768 kHz)
    Periods32768 = 3,
}

impl TimerResolution {
    /// All resolutions, finest first
    pub const ALL: [Self; 4] = [
        Self::OnePeriod,
        Self::Periods32,
        Self::Periods1024,
        Self::Periods32768,
    ];

    /// Selector bits written to the timer control register
    #[must_use]
    pub const fn bits(self) -> u8 {
        self as u8
    }

    /// Decode selector bits (only the low two bits are significant)
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0 => Self::OnePeriod,
            1 => Self::Periods32,
            2 => Self::Periods1024,
            _ => Self::Periods32768,
        }
    }

    /// Reference clock periods per threshold unit
    #[must_use]
    pub const fn periods(self) -> u32 {
        match self {
            Self::OnePeriod => 1,
            Self::Periods32 => 1 << 5,
            Self::Periods1024 => 1 << 10,
            Self::Periods32768 => 1 << 15,
        }
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for TimerResolution {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "x{}", self.periods());
    }
}

/// Hardware encoding of a sleep duration
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimerConfig {
    /// Resolution selector
    pub resolution: TimerResolution,
    /// Upper threshold byte
    pub event_high: u8,
    /// Lower threshold byte
    pub event_low: u8,
}

impl TimerConfig {
    /// Resolution for one-second units
    pub const SECONDS: TimerResolution = TimerResolution::Periods32768;

    /// Encode a sleep duration
    #[must_use]
    pub const fn for_duration(duration: SleepDuration) -> Self {
        Self {
            resolution: Self::SECONDS,
            event_high: duration.high_byte(),
            event_low: duration.low_byte(),
        }
    }

    /// Combined 16-bit event threshold
    #[must_use]
    pub const fn threshold(&self) -> u16 {
        ((self.event_high as u16) << 8) | self.event_low as u16
    }

    /// Reference clock ticks until the wake event
    #[must_use]
    pub const fn wake_delay_ticks(&self) -> u32 {
        self.threshold() as u32 * self.resolution.periods()
    }

    /// Milliseconds until the wake event (truncated)
    #[must_use]
    pub const fn wake_delay_ms(&self) -> u32 {
        ((self.wake_delay_ticks() as u64 * 1000) / SLEEP_CLOCK_HZ as u64) as u32
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for TimerConfig {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "Timer({=u8:02x}{=u8:02x} {})",
            self.event_high,
            self.event_low,
            self.resolution
        );
    }
}

bitflags! {
    /// Interrupt sources enabled at a given instant
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct InterruptMask: u8 {
        /// Wake-up countdown timer
        const WAKE_TIMER = 1 << 0;
        /// USB controller
        const USB = 1 << 1;
        /// Serial port
        const SERIAL = 1 << 2;
        /// GPIO edge lines
        const GPIO = 1 << 3;
        /// DMA completion
        const DMA = 1 << 4;
        /// System time base
        const TIMEBASE = 1 << 5;
        /// Any enabled source not named above
        const OTHER = 1 << 6;
    }
}

impl InterruptMask {
    /// True when the wake timer is the one and only enabled source
    #[must_use]
    pub fn is_wake_exclusive(self) -> bool {
        self == Self::WAKE_TIMER
    }

    /// Sources other than the wake timer
    #[must_use]
    pub fn foreground(self) -> Self {
        self.difference(Self::WAKE_TIMER)
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for InterruptMask {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "Irq({=u8:#08b})", self.bits());
    }
}
