//! Register Capabilities
//!
//! The wake-timer, mode-select and interrupt-enable registers are shared by
//! two execution contexts. Rather than one object with a lock, each context
//! gets its own capability over the register set:
//!
//! - [`ArmRegisters`] is owned by the foreground and used to arm the timer
//!   and suspend the CPU.
//! - [`AckRegisters`] is only ever constructed inside the wake interrupt and
//!   undoes what arming did.
//!
//! On a single core the interrupt never runs concurrently with foreground
//! code, so the two capabilities never touch the registers at the same time.

use crate::power::wake::WakeSignal;
use crate::types::{InterruptMask, SleepMode, TimerResolution};

/// Foreground capability: arm the wake timer and suspend
pub trait ArmRegisters {
    /// Currently enabled interrupt sources
    fn interrupt_mask(&self) -> InterruptMask;

    /// Enable exactly the sources in `mask`, disabling every other one
    fn set_interrupt_mask(&mut self, mask: InterruptMask);

    /// Unmask the wake event so the countdown can raise its interrupt
    fn unmask_wake_event(&mut self);

    /// Write the mode-select bits
    fn set_sleep_mode(&mut self, mode: SleepMode);

    /// Reset the countdown
    fn reset_timer(&mut self);

    /// Sample the free-running low-frequency reference clock
    fn clock_sample(&mut self) -> u8;

    /// Write the resolution selector
    fn set_resolution(&mut self, resolution: TimerResolution);

    /// Load the event threshold and start the countdown
    fn load_threshold(&mut self, high: u8, low: u8);

    /// Suspend the CPU until an interrupt arrives.
    ///
    /// Implementations must not suspend if `wake` has already been
    /// signaled, and must make that check atomic with the suspend request
    /// so a wake that lands in between is not lost.
    fn suspend(&mut self, wake: &WakeSignal);
}

/// Interrupt-time capability: acknowledge the wake event
pub trait AckRegisters {
    /// Clear the timer interrupt pending flag
    fn clear_timer_pending(&mut self);

    /// Clear the deep-sleep mode-select bits
    fn clear_sleep_mode(&mut self);

    /// Clear the timer interrupt enable bit
    fn disable_timer_interrupt(&mut self);

    /// Clear both the wake-event mask and the wake-event flag
    fn clear_wake_event(&mut self);

    /// Put the resolution selector back to its single-period default
    fn reset_resolution(&mut self);
}
