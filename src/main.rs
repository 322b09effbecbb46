//! Low Power Node Main Application
//!
//! Entry point for the STM32G474 timer-woken sleep firmware.
//! Initializes the clocks, the RTC wake-up timer and the GPIO lines, then
//! hands control to the power-mode controller for good.

#![no_std]
#![no_main]

use cortex_m_rt::entry;
use defmt::info;
use embassy_stm32::gpio::{Flex, Level, Output, Speed};
use embassy_stm32::rcc::LsConfig;
use {defmt_rtt as _, panic_probe as _};

use lowpower_node::hal::board::Board;
use lowpower_node::hal::gpio::{QuiescedLine, StatusLed};
use lowpower_node::hal::rtc_wakeup::{Stm32WakeTimer, WAKE_SIGNAL};
use lowpower_node::prelude::*;

/// Main entry point
#[entry]
fn main() -> ! {
    info!("Low Power Node Firmware v{}", env!("CARGO_PKG_VERSION"));

    // LSE drives the RTC so the wake-up timer keeps counting in Stop 1.
    let mut config = embassy_stm32::Config::default();
    config.rcc.ls = LsConfig::default_lse();
    let p = embassy_stm32::init(config);

    info!("Peripherals initialized");

    // PA5 = LD2 (awake), PB8 = startup indicator
    let board = Board::new(
        StatusLed::new(Output::new(p.PB8, Level::Low, Speed::Low)),
        StatusLed::new(Output::new(p.PA5, Level::Low, Speed::Low)),
    );

    // External lines; PA5/PB8 are LEDs, PA13/PA14 SWD, PC14/PC15 the LSE
    let lines = [
        Flex::new(p.PA0),
        Flex::new(p.PA1),
        Flex::new(p.PA4),
        Flex::new(p.PA6),
        Flex::new(p.PA7),
        Flex::new(p.PA8),
        Flex::new(p.PA9),
        Flex::new(p.PA10),
        Flex::new(p.PB0),
        Flex::new(p.PB1),
        Flex::new(p.PB4),
        Flex::new(p.PB5),
        Flex::new(p.PB6),
        Flex::new(p.PB7),
        Flex::new(p.PC0),
        Flex::new(p.PC1),
    ];
    let mut quiescer: Quiescer<QuiescedLine<'static>, MAX_SIGNAL_LINES> = Quiescer::new();
    for line in lines {
        defmt::unwrap!(quiescer.add_line(QuiescedLine::new(line)));
    }

    info!("{} signal lines registered", quiescer.len());

    let timer = SleepTimer::new(Stm32WakeTimer::new(p.RTC), &WAKE_SIGNAL);
    let controller = PowerModeController::new(timer, quiescer, board, ControllerConfig::new());

    info!("Entering power-mode loop");

    controller.run()
}
