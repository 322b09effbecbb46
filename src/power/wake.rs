//! Wake Interrupt Handling
//!
//! The wake interrupt does two things: put the registers back the way they
//! were before arming, and tell the foreground that the sleep is over.
//! Everything else happens in the power-mode controller.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;

use crate::power::registers::AckRegisters;

/// Completion signal raised by the wake interrupt and taken by the foreground
pub type WakeSignal = Signal<CriticalSectionRawMutex, ()>;

/// Interrupt-time acknowledge routine
#[derive(Clone, Copy)]
pub struct WakeHandler<'s> {
    done: &'s WakeSignal,
}

impl<'s> WakeHandler<'s> {
    /// Create a handler that signals `done` on completion
    #[must_use]
    pub const fn new(done: &'s WakeSignal) -> Self {
        Self { done }
    }

    /// Acknowledge the wake event and signal completion.
    ///
    /// The clear order is fixed: pending flag, mode bits, interrupt enable,
    /// event mask and flag, resolution. The pending flag must be clear
    /// before the mode bits, and the event mask must not survive into the
    /// next arm cycle.
    pub fn acknowledge<R: AckRegisters + ?Sized>(&self, regs: &mut R) {
        regs.clear_timer_pending();
        regs.clear_sleep_mode();
        regs.disable_timer_interrupt();
        regs.clear_wake_event();
        regs.reset_resolution();
        self.done.signal(());
    }
}
