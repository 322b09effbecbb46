//! RTC Wake-up Timer
//!
//! STM32G474 implementation of the register capabilities.
//!
//! # Register Mapping
//!
//! | Abstract                   | STM32G474                                   |
//! |----------------------------|---------------------------------------------|
//! | interrupt-enable bits      | every NVIC `ISER`/`ICER` word               |
//! | wake-event mask            | `RTC_CR.WUTIE` + EXTI line 20 (IMR, RTSR)   |
//! | wake-event flag            | `RTC_SR.WUTF` (cleared via `RTC_SCR.CWUTF`) |
//! | timer pending flag         | EXTI line 20 pending + NVIC pending         |
//! | mode-select bits           | `SCB_SCR.SLEEPDEEP` with `PWR_CR1.LPMS=Stop1` |
//! | resolution selector        | `RTC_CR.WUCKSEL`                            |
//! | event threshold            | `RTC_WUTR.WUT` via [`WakeupReload`]         |
//! | free-running clock         | `RTC_SSR` low byte (ck_apre, 256 Hz)        |
//! | suspend                    | `WFI` with interrupts masked                |
//!
//! The RTC is clocked from the 32.768 kHz LSE. The counter fires after
//! `WUT + 1` counter clocks, so the threshold is converted by
//! [`WakeupReload::new`] rather than written as is.
//!
//! Interrupt lines outside [`SOURCES`] (EXTI lines enabled by
//! `embassy_stm32::init`, the time driver timer, ...) are covered by
//! [`InterruptMask::OTHER`]: arming parks them and restoring the foreground
//! mask enables them again.

use core::hint::spin_loop;

use cortex_m::interrupt::InterruptNumber;
use cortex_m::peripheral::{NVIC, SCB};
use embassy_stm32::pac::{self, interrupt, Interrupt};
use embassy_stm32::peripherals::RTC;

use crate::power::irq_gate::{EnableSet, IrqGate, ENABLE_WORDS};
use crate::power::registers::{AckRegisters, ArmRegisters};
use crate::power::rtc_calc::{WakeupClock, WakeupReload};
use crate::power::wake::{WakeHandler, WakeSignal};
use crate::types::{InterruptMask, SleepMode, TimerResolution};

/// Completion signal raised by the `RTC_WKUP` handler
pub static WAKE_SIGNAL: WakeSignal = WakeSignal::new();

/// EXTI line wired to the RTC wake-up timer
const RTC_WKUP_EXTI_LINE: usize = 20;

/// EXTI register index for lines 0-31
const EXTI_REG_IDX: usize = 0;

const CR_WUCKSEL_MASK: u32 = 0b111;
const CR_WUTE: u32 = 1 << 10;
const CR_WUTIE: u32 = 1 << 14;
const ICSR_WUTWF: u32 = 1 << 2;
const SCR_CWUTF: u32 = 1 << 2;

const WPR_KEY1: u32 = 0xCA;
const WPR_KEY2: u32 = 0x53;
const WPR_LOCK: u32 = 0xFF;

const PWR_CR1_LPMS_MASK: u32 = 0b111;
const PWR_CR1_LPMS_STOP1: u32 = 0b001;
const PWR_CR1_DBP: u32 = 1 << 8;

const RCC_APB1ENR1_RTCAPBEN: u32 = 1 << 10;

const SCB_SCR_SLEEPDEEP: u32 = 1 << 2;

/// Interrupt sources named by [`InterruptMask`]
pub const SOURCES: [(InterruptMask, Interrupt); 6] = [
    (InterruptMask::WAKE_TIMER, Interrupt::RTC_WKUP),
    (InterruptMask::USB, Interrupt::USB_LP),
    (InterruptMask::SERIAL, Interrupt::USART2),
    (InterruptMask::GPIO, Interrupt::EXTI15_10),
    (InterruptMask::DMA, Interrupt::DMA1_CHANNEL1),
    (InterruptMask::TIMEBASE, Interrupt::TIM2),
];

/// Run `f` with the RTC write protection lifted
fn unlocked<T>(f: impl FnOnce() -> T) -> T {
    pac::RTC.wpr().write(|w| w.0 = WPR_KEY1);
    pac::RTC.wpr().write(|w| w.0 = WPR_KEY2);
    let result = f();
    pac::RTC.wpr().write(|w| w.0 = WPR_LOCK);
    result
}

/// Wait until the wake-up timer accepts configuration writes (WUTE must be 0)
fn wait_wakeup_writable() {
    while pac::RTC.icsr().read().0 & ICSR_WUTWF == 0 {
        spin_loop();
    }
}

fn write_wucksel(clock: WakeupClock) {
    pac::RTC
        .cr()
        .modify(|w| w.0 = (w.0 & !CR_WUCKSEL_MASK) | clock.bits());
}

fn set_sleepdeep(enabled: bool) {
    // SAFETY: SCR bits are only written by the foreground before WFI and by
    // the wake handler, which never run concurrently on this core.
    unsafe {
        (*SCB::PTR).scr.modify(|scr| {
            if enabled {
                scr | SCB_SCR_SLEEPDEEP
            } else {
                scr & !SCB_SCR_SLEEPDEEP
            }
        });
    }
}

/// Snapshot of every NVIC enable word
fn read_enables() -> EnableSet {
    let mut words = [0; ENABLE_WORDS];
    for (i, word) in words.iter_mut().enumerate() {
        // SAFETY: ISER reads have no side effects.
        *word = unsafe { (*NVIC::PTR).iser[i].read() };
    }
    EnableSet::from_words(words)
}

/// Make `target` the exact set of enabled lines
fn write_enables(target: EnableSet) {
    let words = target.words();
    // Disable first so no line outside `target` is ever briefly enabled
    // together with a newly enabled one.
    for (i, word) in words.iter().enumerate() {
        // SAFETY: ICER writes only disable lines.
        unsafe { (*NVIC::PTR).icer[i].write(!word) };
    }
    for (i, word) in words.iter().enumerate() {
        // SAFETY: only lines that were enabled before arming, or that have
        // installed handlers in SOURCES, are ever re-enabled.
        unsafe { (*NVIC::PTR).iser[i].write(*word) };
    }
}

/// Foreground capability over the RTC wake-up timer
pub struct Stm32WakeTimer {
    _rtc: RTC,
    gate: IrqGate<6>,
    resolution: TimerResolution,
}

impl Stm32WakeTimer {
    /// Take the RTC singleton.
    ///
    /// The RTC must already be clocked from the LSE (see
    /// `embassy_stm32::rcc::LsConfig`).
    #[must_use]
    pub fn new(rtc: RTC) -> Self {
        pac::RCC
            .apb1enr1()
            .modify(|w| w.0 |= RCC_APB1ENR1_RTCAPBEN);
        pac::PWR.cr1().modify(|w| w.0 |= PWR_CR1_DBP);
        Self {
            _rtc: rtc,
            gate: IrqGate::new(SOURCES.map(|(flag, irq)| (flag, irq.number()))),
            resolution: TimerResolution::default(),
        }
    }
}

impl ArmRegisters for Stm32WakeTimer {
    fn interrupt_mask(&self) -> InterruptMask {
        self.gate.observe(read_enables())
    }

    fn set_interrupt_mask(&mut self, mask: InterruptMask) {
        let target = self.gate.retarget(read_enables(), mask);
        write_enables(target);
    }

    fn unmask_wake_event(&mut self) {
        unlocked(|| pac::RTC.cr().modify(|w| w.0 |= CR_WUTIE));
        pac::EXTI
            .imr(EXTI_REG_IDX)
            .modify(|w| w.set_line(RTC_WKUP_EXTI_LINE, true));
        pac::EXTI
            .rtsr(EXTI_REG_IDX)
            .modify(|w| w.set_line(RTC_WKUP_EXTI_LINE, true));
    }

    fn set_sleep_mode(&mut self, mode: SleepMode) {
        match mode {
            SleepMode::DeepSleep => {
                pac::PWR
                    .cr1()
                    .modify(|w| w.0 = (w.0 & !PWR_CR1_LPMS_MASK) | PWR_CR1_LPMS_STOP1);
                set_sleepdeep(true);
            }
            SleepMode::Active => set_sleepdeep(false),
        }
    }

    fn reset_timer(&mut self) {
        unlocked(|| {
            pac::RTC.cr().modify(|w| w.0 &= !CR_WUTE);
            wait_wakeup_writable();
            pac::RTC.scr().write(|w| w.0 = SCR_CWUTF);
        });
    }

    fn clock_sample(&mut self) -> u8 {
        let ss = pac::RTC.ssr().read().0;
        // Reading SSR locks the calendar shadows until DR is read.
        let _ = pac::RTC.dr().read();
        (ss & 0xFF) as u8
    }

    fn set_resolution(&mut self, resolution: TimerResolution) {
        self.resolution = resolution;
        unlocked(|| write_wucksel(WakeupClock::for_resolution(resolution)));
    }

    fn load_threshold(&mut self, high: u8, low: u8) {
        let reload = WakeupReload::new(self.resolution, u16::from_be_bytes([high, low]));
        trace!("wake-up reload {}", reload);
        unlocked(|| {
            write_wucksel(reload.clock);
            pac::RTC.wutr().write(|w| w.0 = u32::from(reload.wut));
            pac::RTC.cr().modify(|w| w.0 |= CR_WUTE);
        });
    }

    fn suspend(&mut self, wake: &WakeSignal) {
        // WFI still returns on a pending interrupt while PRIMASK is set; the
        // handler then runs as soon as the critical section ends.
        critical_section::with(|_| {
            if !wake.signaled() {
                cortex_m::asm::dsb();
                cortex_m::asm::wfi();
            }
        });
    }
}

/// Interrupt-time capability, only constructed by the `RTC_WKUP` handler
struct WakeAck {
    _private: (),
}

impl AckRegisters for WakeAck {
    fn clear_timer_pending(&mut self) {
        pac::EXTI
            .pr(EXTI_REG_IDX)
            .write(|w| w.set_line(RTC_WKUP_EXTI_LINE, true));
        NVIC::unpend(Interrupt::RTC_WKUP);
    }

    fn clear_sleep_mode(&mut self) {
        set_sleepdeep(false);
    }

    fn disable_timer_interrupt(&mut self) {
        NVIC::mask(Interrupt::RTC_WKUP);
    }

    fn clear_wake_event(&mut self) {
        unlocked(|| {
            pac::RTC.cr().modify(|w| w.0 &= !(CR_WUTIE | CR_WUTE));
            pac::RTC.scr().write(|w| w.0 = SCR_CWUTF);
        });
        pac::EXTI
            .imr(EXTI_REG_IDX)
            .modify(|w| w.set_line(RTC_WKUP_EXTI_LINE, false));
    }

    fn reset_resolution(&mut self) {
        unlocked(|| {
            wait_wakeup_writable();
            write_wucksel(WakeupClock::for_resolution(TimerResolution::default()));
        });
    }
}

#[interrupt]
fn RTC_WKUP() {
    let mut ack = WakeAck { _private: () };
    WakeHandler::new(&WAKE_SIGNAL).acknowledge(&mut ack);
}
