//! Sleep Timer Driver
//!
//! Programs the wake-up countdown and suspends the CPU. The arm sequence is
//! order sensitive:
//!
//! ```text
//! 1. interrupt mask := WAKE_TIMER only, unmask wake event
//! 2. mode-select    := deep sleep
//! 3. reset timer, wait for two fresh reference clock edges
//! 4. resolution     := seconds, threshold := duration (high, low)
//! 5. suspend        (returns once the wake handler has signaled)
//! ```
//!
//! Deep-sleep entry starts servicing interrupts as soon as the mode bits
//! change, so every other source is disabled before step 2. The countdown
//! only counts reliably after a reference clock edge that follows the
//! reset, hence the debounce in step 3.

use core::hint::spin_loop;

use crate::config::DEBOUNCE_EDGES;
use crate::power::registers::ArmRegisters;
use crate::power::wake::WakeSignal;
use crate::types::{InterruptMask, SleepDuration, SleepMode, TimerConfig};

/// Block until the reference clock has changed value `edges` times.
///
/// Each edge takes a fresh reference sample and spins until a later sample
/// differs from it. There is no timeout: if the clock has stopped this never
/// returns.
pub fn wait_for_clock_edges<R: ArmRegisters + ?Sized>(regs: &mut R, edges: u8) {
    for _ in 0..edges {
        let reference = regs.clock_sample();
        while regs.clock_sample() == reference {
            spin_loop();
        }
    }
}

/// Foreground owner of the wake-timer registers
pub struct SleepTimer<'s, R> {
    regs: R,
    wake: &'s WakeSignal,
}

impl<'s, R: ArmRegisters> SleepTimer<'s, R> {
    /// Take ownership of the arm capability.
    ///
    /// Any completion left over from before is discarded.
    pub fn new(regs: R, wake: &'s WakeSignal) -> Self {
        wake.reset();
        Self { regs, wake }
    }

    /// Sleep for `duration` seconds.
    ///
    /// Returns only after the wake handler has acknowledged the wake event
    /// raised by this arm cycle; a completion left over from earlier is
    /// dropped first. Interrupt sources that were enabled on entry (other than the wake
    /// timer itself) are re-enabled before returning.
    pub fn arm(&mut self, duration: SleepDuration) {
        let config = TimerConfig::for_duration(duration);
        let foreground = self.regs.interrupt_mask().foreground();
        self.wake.reset();

        self.regs.set_interrupt_mask(InterruptMask::WAKE_TIMER);
        self.regs.unmask_wake_event();

        self.regs.set_sleep_mode(SleepMode::DeepSleep);

        self.regs.reset_timer();
        wait_for_clock_edges(&mut self.regs, DEBOUNCE_EDGES);

        self.regs.set_resolution(config.resolution);
        self.regs.load_threshold(config.event_high, config.event_low);

        debug_assert!(
            self.regs.interrupt_mask().is_wake_exclusive(),
            "wake timer must be the only interrupt source during sleep"
        );

        while self.wake.try_take().is_none() {
            self.regs.suspend(self.wake);
        }

        self.regs.set_interrupt_mask(foreground);
    }

    /// Borrow the underlying registers
    #[must_use]
    pub fn registers(&self) -> &R {
        &self.regs
    }

    /// Give the registers back
    #[must_use]
    pub fn into_inner(self) -> R {
        self.regs
    }
}
