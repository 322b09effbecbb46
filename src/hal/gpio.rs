//! GPIO Abstractions
//!
//! Status LEDs and the external signal lines that are quiesced before
//! every sleep.

use embassy_stm32::gpio::{Flex, Output, Speed};

use crate::power::quiesce::SignalLine;

/// Status LED driver
pub struct StatusLed<'d> {
    pin: Output<'d>,
}

impl<'d> StatusLed<'d> {
    /// Create a new status LED (initially off)
    #[must_use]
    pub fn new(mut pin: Output<'d>) -> Self {
        pin.set_low();
        Self { pin }
    }

    /// Turn LED on or off
    pub fn set(&mut self, on: bool) {
        if on {
            self.pin.set_high();
        } else {
            self.pin.set_low();
        }
    }
}

/// External line driven low before sleep
///
/// Wraps a [`Flex`] pin, which can be switched to an output whatever mode
/// the rest of the firmware left it in.
pub struct QuiescedLine<'d> {
    pin: Flex<'d>,
    is_output: bool,
}

impl<'d> QuiescedLine<'d> {
    /// Take a pin (left in its reset state until the first quiesce)
    #[must_use]
    pub fn new(pin: Flex<'d>) -> Self {
        Self {
            pin,
            is_output: false,
        }
    }
}

impl SignalLine for QuiescedLine<'_> {
    fn drive_low(&mut self) {
        // Output data register first so the pin never glitches high.
        self.pin.set_low();
        self.pin.set_as_output(Speed::Low);
        self.is_output = true;
    }

    fn is_driven_low(&self) -> bool {
        self.is_output && self.pin.is_set_low()
    }
}
