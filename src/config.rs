//! System configuration and hardware constants
//!
//! This module defines compile-time constants for the low-power node.
//! Timing windows, capacities and clock parameters are centralized here.

/// Wake-timer reference clock (LSE crystal)
pub const SLEEP_CLOCK_HZ: u32 = 32_768;

/// Iterations of the startup grace window
pub const STARTUP_GRACE_TICKS: u16 = 1000;

/// Delay between startup service iterations in milliseconds
pub const STARTUP_TICK_MS: u32 = 10;

/// How long the awake indicator stays lit each active phase
pub const AWAKE_BLINK_MS: u32 = 1000;

/// Reference clock edges the debounce wait must observe after a timer reset
pub const DEBOUNCE_EDGES: u8 = 2;

/// Maximum number of external signal lines the quiescer can hold
pub const MAX_SIGNAL_LINES: usize = 16;

/// Power-mode controller timing
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ControllerConfig {
    /// Service iterations in the startup grace window
    pub grace_ticks: u16,
    /// Delay after each grace iteration in milliseconds
    pub grace_tick_ms: u32,
    /// Awake indicator on-time in milliseconds
    pub awake_blink_ms: u32,
}

impl ControllerConfig {
    /// Configuration built from the compile-time constants
    #[must_use]
    pub const fn new() -> Self {
        Self {
            grace_ticks: STARTUP_GRACE_TICKS,
            grace_tick_ms: STARTUP_TICK_MS,
            awake_blink_ms: AWAKE_BLINK_MS,
        }
    }

    /// Override the startup grace window (returns new config)
    #[must_use]
    pub const fn with_grace(self, ticks: u16, tick_ms: u32) -> Self {
        Self {
            grace_ticks: ticks,
            grace_tick_ms: tick_ms,
            ..self
        }
    }

    /// Override the awake indicator on-time (returns new config)
    #[must_use]
    pub const fn with_awake_blink(self, ms: u32) -> Self {
        Self {
            awake_blink_ms: ms,
            ..self
        }
    }

    /// Total length of the startup grace window in milliseconds
    #[must_use]
    pub const fn grace_window_ms(&self) -> u32 {
        self.grace_ticks as u32 * self.grace_tick_ms
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for ControllerConfig {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "Config(grace={}x{}ms, blink={}ms)",
            self.grace_ticks,
            self.grace_tick_ms,
            self.awake_blink_ms
        );
    }
}
