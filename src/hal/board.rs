//! Board Services
//!
//! NUCLEO-G474RE implementation of the controller's collaborators.

use embassy_time::{Delay, Instant};
use embedded_hal::delay::DelayNs;

use crate::hal::gpio::StatusLed;
use crate::services::{Indicator, Services};

/// Board collaborators: indicators, delay and the housekeeping hooks
pub struct Board<'d> {
    startup_led: StatusLed<'d>,
    awake_led: StatusLed<'d>,
    delay: Delay,
    service_ticks: u32,
}

impl<'d> Board<'d> {
    /// Create the board services from its two status LEDs
    #[must_use]
    pub fn new(startup_led: StatusLed<'d>, awake_led: StatusLed<'d>) -> Self {
        Self {
            startup_led,
            awake_led,
            delay: Delay,
            service_ticks: 0,
        }
    }
}

impl Services for Board<'_> {
    fn board_service(&mut self) {
        self.service_ticks = self.service_ticks.wrapping_add(1);
        trace!(
            "board tick {} at {} ms",
            self.service_ticks,
            Instant::now().as_millis()
        );
    }

    fn link_service(&mut self) {
        // No link stack on this board; the SWD debugger stays attachable while
        // the core is awake.
    }

    fn status_indicator(&mut self, indicator: Indicator, on: bool) {
        match indicator {
            Indicator::Startup => self.startup_led.set(on),
            Indicator::Awake => self.awake_led.set(on),
        }
    }

    fn delay_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
    }
}
