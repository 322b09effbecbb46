//! Power-Mode Controller
//!
//! Outer loop of the firmware:
//!
//! ```text
//! Startup ──(grace window)──► Active ──► Arming ──► Sleeping
//!                               ▲                      │
//!                               └──── duration += 1 ───┘
//! ```
//!
//! Startup runs once after cold boot and keeps the link serviced so the
//! board can be reprogrammed before it starts sleeping. The first sleep
//! requests zero seconds; each later one is one second longer, wrapping
//! at 65535.

use crate::config::ControllerConfig;
use crate::power::quiesce::{Quiescer, SignalLine};
use crate::power::registers::ArmRegisters;
use crate::power::sleep_timer::SleepTimer;
use crate::services::{Indicator, Services};
use crate::types::{PowerMode, SleepDuration};

/// Active/sleep state machine
pub struct PowerModeController<'s, R, L, S, const N: usize> {
    mode: PowerMode,
    duration: SleepDuration,
    completed_cycles: u32,
    timer: SleepTimer<'s, R>,
    quiescer: Quiescer<L, N>,
    services: S,
    config: ControllerConfig,
}

impl<'s, R, L, S, const N: usize> PowerModeController<'s, R, L, S, N>
where
    R: ArmRegisters,
    L: SignalLine,
    S: Services,
{
    /// Create a controller in the startup state
    pub fn new(
        timer: SleepTimer<'s, R>,
        quiescer: Quiescer<L, N>,
        services: S,
        config: ControllerConfig,
    ) -> Self {
        Self {
            mode: PowerMode::Startup,
            duration: SleepDuration::ZERO,
            completed_cycles: 0,
            timer,
            quiescer,
            services,
            config,
        }
    }

    /// Current state
    #[must_use]
    pub const fn mode(&self) -> PowerMode {
        self.mode
    }

    /// Duration the next sleep will request
    #[must_use]
    pub const fn duration(&self) -> SleepDuration {
        self.duration
    }

    /// Number of finished active/sleep cycles (wrapping)
    #[must_use]
    pub const fn completed_cycles(&self) -> u32 {
        self.completed_cycles
    }

    /// Timing configuration
    #[must_use]
    pub const fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// Borrow the sleep timer
    #[must_use]
    pub fn timer(&self) -> &SleepTimer<'s, R> {
        &self.timer
    }

    /// Borrow the quiescer
    #[must_use]
    pub fn quiescer(&self) -> &Quiescer<L, N> {
        &self.quiescer
    }

    /// Borrow the services
    #[must_use]
    pub fn services(&self) -> &S {
        &self.services
    }

    /// Mutably borrow the services
    pub fn services_mut(&mut self) -> &mut S {
        &mut self.services
    }

    /// Run the current state to completion and return the next one
    pub fn step(&mut self) -> PowerMode {
        self.mode = match self.mode {
            PowerMode::Startup => {
                self.run_startup();
                PowerMode::Active
            }
            PowerMode::Active => {
                self.run_active();
                PowerMode::Arming
            }
            PowerMode::Arming | PowerMode::Sleeping => {
                self.run_sleep();
                PowerMode::Active
            }
        };
        self.mode
    }

    /// Cycle forever
    pub fn run(mut self) -> ! {
        loop {
            self.step();
        }
    }

    fn run_startup(&mut self) {
        info!(
            "startup grace window: {} ms",
            self.config.grace_window_ms()
        );

        self.services.status_indicator(Indicator::Startup, true);
        for _ in 0..self.config.grace_ticks {
            self.services.board_service();
            self.services.link_service();
            self.services.delay_ms(self.config.grace_tick_ms);
        }
        self.services.status_indicator(Indicator::Startup, false);

        self.duration = SleepDuration::ZERO;
    }

    fn run_active(&mut self) {
        self.services.board_service();
        self.services.link_service();

        self.services.status_indicator(Indicator::Awake, true);
        self.services.delay_ms(self.config.awake_blink_ms);
        self.services.status_indicator(Indicator::Awake, false);
    }

    fn run_sleep(&mut self) {
        self.quiescer.quiesce_all();
        debug_assert!(self.quiescer.is_quiesced(), "signal line left floating");

        debug!("sleeping for {} s", self.duration.as_secs());
        self.mode = PowerMode::Sleeping;
        self.timer.arm(self.duration);

        self.duration = self.duration.next();
        self.completed_cycles = self.completed_cycles.wrapping_add(1);
        trace!("awake, cycle {}", self.completed_cycles);
    }
}
