//! Simulated hardware for host tests.
//!
//! `MockRegisters` is a register file implementing both capabilities. Its
//! `suspend` plays the part of the countdown hardware: it advances virtual
//! time by the programmed delay, raises the pending and event flags, and runs
//! the wake handler as the interrupt would. Every register access is logged
//! so tests can assert on ordering.

#![allow(dead_code)]

use std::collections::VecDeque;

use lowpower_node::power::irq_gate::{EnableSet, IrqGate};
use lowpower_node::power::quiesce::SignalLine;
use lowpower_node::power::registers::{AckRegisters, ArmRegisters};
use lowpower_node::power::wake::{WakeHandler, WakeSignal};
use lowpower_node::services::{Indicator, Services};
use lowpower_node::types::{InterruptMask, SleepMode, TimerConfig, TimerResolution};

/// Reads of a non-advancing clock before the simulator gives up
pub const STALL_READ_LIMIT: u32 = 100_000;

// ── Register access log ───────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegOp {
    SetInterruptMask(InterruptMask),
    UnmaskWakeEvent,
    SetSleepMode(SleepMode),
    ResetTimer,
    ClockSample(u8),
    SetResolution(TimerResolution),
    LoadThreshold(u8, u8),
    Suspend,
    ClearTimerPending,
    ClearSleepMode,
    DisableTimerInterrupt,
    ClearWakeEvent,
    ResetResolution,
}

impl RegOp {
    pub fn is_ack(self) -> bool {
        matches!(
            self,
            Self::ClearTimerPending
                | Self::ClearSleepMode
                | Self::DisableTimerInterrupt
                | Self::ClearWakeEvent
                | Self::ResetResolution
        )
    }
}

/// Register state captured at the instant of suspension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuspendSnapshot {
    pub interrupt_mask: InterruptMask,
    pub sleep_mode: SleepMode,
    pub resolution: TimerResolution,
    pub threshold: u16,
    pub event_mask: bool,
    pub edges_since_reset: u32,
}

// ── Reference clock model ─────────────────────────────────────

pub enum ClockModel {
    /// Advances by one every `reads_per_tick` samples
    Running { value: u8, reads_per_tick: u32, reads: u32 },
    /// Never advances
    Stalled,
    /// Returns the scripted samples in order, then behaves as stalled
    Scripted(VecDeque<u8>),
}

// ── MockRegisters ─────────────────────────────────────────────

pub struct MockRegisters {
    pub interrupt_mask: InterruptMask,
    pub sleep_mode: SleepMode,
    pub timer_pending: bool,
    pub event_mask: bool,
    pub event_flag: bool,
    pub resolution: TimerResolution,
    pub threshold: (u8, u8),
    pub timer_running: bool,
    pub ops: Vec<RegOp>,
    pub suspends: Vec<SuspendSnapshot>,
    pub elapsed_ticks: u64,
    /// Suspensions that return without the timer firing
    pub spurious_wakes: u32,
    /// When false, `arm` logs are not recorded (long-running tests)
    pub logging: bool,
    clock: ClockModel,
    last_sample: Option<u8>,
    stalled_reads: u32,
    edges_since_reset: u32,
}

impl MockRegisters {
    pub fn new() -> Self {
        Self::with_clock(ClockModel::Running {
            value: 0,
            reads_per_tick: 3,
            reads: 0,
        })
    }

    pub fn with_clock(clock: ClockModel) -> Self {
        Self {
            interrupt_mask: InterruptMask::empty(),
            sleep_mode: SleepMode::Active,
            timer_pending: false,
            event_mask: false,
            event_flag: false,
            resolution: TimerResolution::OnePeriod,
            threshold: (0, 0),
            timer_running: false,
            ops: Vec::new(),
            suspends: Vec::new(),
            elapsed_ticks: 0,
            spurious_wakes: 0,
            logging: true,
            clock,
            last_sample: None,
            stalled_reads: 0,
            edges_since_reset: 0,
        }
    }

    pub fn stalled() -> Self {
        Self::with_clock(ClockModel::Stalled)
    }

    pub fn scripted(samples: &[u8]) -> Self {
        Self::with_clock(ClockModel::Scripted(samples.iter().copied().collect()))
    }

    /// True when the register file is back in its fully-active state
    pub fn is_fully_active(&self) -> bool {
        !self.timer_pending
            && self.sleep_mode == SleepMode::Active
            && !self.interrupt_mask.contains(InterruptMask::WAKE_TIMER)
            && !self.event_mask
            && !self.event_flag
            && self.resolution == TimerResolution::OnePeriod
    }

    pub fn ack_ops(&self) -> Vec<RegOp> {
        self.ops.iter().copied().filter(|op| op.is_ack()).collect()
    }

    pub fn position(&self, op: RegOp) -> Option<usize> {
        self.ops.iter().position(|o| *o == op)
    }

    pub fn clear_log(&mut self) {
        self.ops.clear();
        self.suspends.clear();
    }

    fn log(&mut self, op: RegOp) {
        if self.logging {
            self.ops.push(op);
        }
    }

    fn next_clock_value(&mut self) -> u8 {
        let next = match &mut self.clock {
            ClockModel::Running {
                value,
                reads_per_tick,
                reads,
            } => {
                *reads += 1;
                if *reads % *reads_per_tick == 0 {
                    *value = value.wrapping_add(1);
                }
                Some(*value)
            }
            ClockModel::Scripted(samples) => samples.pop_front(),
            ClockModel::Stalled => None,
        };
        match next {
            Some(sample) => sample,
            None => self.stall(),
        }
    }

    fn stall(&mut self) -> u8 {
        self.stalled_reads += 1;
        assert!(
            self.stalled_reads < STALL_READ_LIMIT,
            "reference clock stalled after {} reads",
            self.stalled_reads
        );
        self.last_sample.unwrap_or(0)
    }

    /// Countdown hardware: fire the wake event and enter the interrupt
    fn fire_wake(&mut self, wake: &WakeSignal) {
        let config = TimerConfig {
            resolution: self.resolution,
            event_high: self.threshold.0,
            event_low: self.threshold.1,
        };
        self.elapsed_ticks += u64::from(config.wake_delay_ticks());
        self.timer_running = false;
        self.event_flag = true;
        self.timer_pending = true;

        assert!(
            self.interrupt_mask.contains(InterruptMask::WAKE_TIMER) && self.event_mask,
            "wake timer fired with its interrupt masked"
        );
        WakeHandler::new(wake).acknowledge(self);
    }
}

impl Default for MockRegisters {
    fn default() -> Self {
        Self::new()
    }
}

impl ArmRegisters for MockRegisters {
    fn interrupt_mask(&self) -> InterruptMask {
        self.interrupt_mask
    }

    fn set_interrupt_mask(&mut self, mask: InterruptMask) {
        self.log(RegOp::SetInterruptMask(mask));
        self.interrupt_mask = mask;
    }

    fn unmask_wake_event(&mut self) {
        self.log(RegOp::UnmaskWakeEvent);
        self.event_mask = true;
    }

    fn set_sleep_mode(&mut self, mode: SleepMode) {
        self.log(RegOp::SetSleepMode(mode));
        self.sleep_mode = mode;
    }

    fn reset_timer(&mut self) {
        self.log(RegOp::ResetTimer);
        self.timer_running = false;
        self.event_flag = false;
        self.edges_since_reset = 0;
        self.last_sample = None;
    }

    fn clock_sample(&mut self) -> u8 {
        let sample = self.next_clock_value();
        if let Some(last) = self.last_sample {
            if last != sample {
                self.edges_since_reset += 1;
            }
        }
        self.last_sample = Some(sample);
        self.log(RegOp::ClockSample(sample));
        sample
    }

    fn set_resolution(&mut self, resolution: TimerResolution) {
        self.log(RegOp::SetResolution(resolution));
        self.resolution = resolution;
    }

    fn load_threshold(&mut self, high: u8, low: u8) {
        self.log(RegOp::LoadThreshold(high, low));
        self.threshold = (high, low);
        self.timer_running = true;
    }

    fn suspend(&mut self, wake: &WakeSignal) {
        self.log(RegOp::Suspend);
        if self.logging {
            self.suspends.push(SuspendSnapshot {
                interrupt_mask: self.interrupt_mask,
                sleep_mode: self.sleep_mode,
                resolution: self.resolution,
                threshold: u16::from_be_bytes([self.threshold.0, self.threshold.1]),
                event_mask: self.event_mask,
                edges_since_reset: self.edges_since_reset,
            });
        }

        if wake.signaled() {
            return;
        }
        if self.spurious_wakes > 0 {
            self.spurious_wakes -= 1;
            return;
        }
        if self.timer_running {
            self.fire_wake(wake);
        }
    }
}

impl AckRegisters for MockRegisters {
    fn clear_timer_pending(&mut self) {
        self.log(RegOp::ClearTimerPending);
        self.timer_pending = false;
    }

    fn clear_sleep_mode(&mut self) {
        self.log(RegOp::ClearSleepMode);
        self.sleep_mode = SleepMode::Active;
    }

    fn disable_timer_interrupt(&mut self) {
        self.log(RegOp::DisableTimerInterrupt);
        self.interrupt_mask.remove(InterruptMask::WAKE_TIMER);
    }

    fn clear_wake_event(&mut self) {
        self.log(RegOp::ClearWakeEvent);
        self.event_mask = false;
        self.event_flag = false;
    }

    fn reset_resolution(&mut self) {
        self.log(RegOp::ResetResolution);
        self.resolution = TimerResolution::OnePeriod;
    }
}

// ── NVIC-backed register file ─────────────────────────────────

/// NVIC line of the wake timer (RTC_WKUP on the G474)
pub const WAKE_LINE: u16 = 3;
/// NVIC line of the USB controller (USB_LP)
pub const USB_LINE: u16 = 20;
/// NVIC line of the named GPIO source (EXTI15_10)
pub const GPIO_LINE: u16 = 40;
/// Unnamed line enabled by HAL init (EXTI0)
pub const EXTI0_LINE: u16 = 6;
/// Unnamed line used by the time driver (TIM3)
pub const TIMER_LINE: u16 = 29;

/// [`MockRegisters`] whose interrupt mask is a full set of NVIC lines
pub struct GatedRegisters {
    pub inner: MockRegisters,
    pub enabled: EnableSet,
    pub enabled_at_suspend: Vec<EnableSet>,
    gate: IrqGate<3>,
}

impl GatedRegisters {
    pub fn new(enabled: EnableSet) -> Self {
        let gate = IrqGate::new([
            (InterruptMask::WAKE_TIMER, WAKE_LINE),
            (InterruptMask::USB, USB_LINE),
            (InterruptMask::GPIO, GPIO_LINE),
        ]);
        let mut inner = MockRegisters::new();
        inner.interrupt_mask = gate.observe(enabled);
        Self {
            inner,
            enabled,
            enabled_at_suspend: Vec::new(),
            gate,
        }
    }
}

impl ArmRegisters for GatedRegisters {
    fn interrupt_mask(&self) -> InterruptMask {
        self.gate.observe(self.enabled)
    }

    fn set_interrupt_mask(&mut self, mask: InterruptMask) {
        self.enabled = self.gate.retarget(self.enabled, mask);
        self.inner.set_interrupt_mask(mask);
    }

    fn unmask_wake_event(&mut self) {
        self.inner.unmask_wake_event();
    }

    fn set_sleep_mode(&mut self, mode: SleepMode) {
        self.inner.set_sleep_mode(mode);
    }

    fn reset_timer(&mut self) {
        self.inner.reset_timer();
    }

    fn clock_sample(&mut self) -> u8 {
        self.inner.clock_sample()
    }

    fn set_resolution(&mut self, resolution: TimerResolution) {
        self.inner.set_resolution(resolution);
    }

    fn load_threshold(&mut self, high: u8, low: u8) {
        self.inner.load_threshold(high, low);
    }

    fn suspend(&mut self, wake: &WakeSignal) {
        self.enabled_at_suspend.push(self.enabled);
        self.inner.suspend(wake);
        // The wake handler masks its own NVIC line
        if !self.inner.interrupt_mask.contains(InterruptMask::WAKE_TIMER) {
            self.enabled = self.enabled.difference(EnableSet::line(WAKE_LINE));
        }
    }
}

// ── Signal lines ──────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Input,
    Output,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockLine {
    pub direction: Direction,
    pub high: bool,
    pub drives: u32,
}

impl MockLine {
    /// Floating input, as after reset
    pub fn input() -> Self {
        Self {
            direction: Direction::Input,
            high: false,
            drives: 0,
        }
    }

    /// Output currently driven high
    pub fn output_high() -> Self {
        Self {
            direction: Direction::Output,
            high: true,
            drives: 0,
        }
    }
}

impl SignalLine for MockLine {
    fn drive_low(&mut self) {
        self.high = false;
        self.direction = Direction::Output;
        self.drives += 1;
    }

    fn is_driven_low(&self) -> bool {
        self.direction == Direction::Output && !self.high
    }
}

// ── Services ──────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceCall {
    Board,
    Link,
    Indicator(Indicator, bool),
    Delay(u32),
}

pub struct MockServices {
    pub calls: Vec<ServiceCall>,
    pub elapsed_ms: u64,
    pub board_ticks: u32,
    pub link_ticks: u32,
    pub startup_led: bool,
    pub awake_led: bool,
    /// When false only the counters are updated
    pub recording: bool,
}

impl MockServices {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            elapsed_ms: 0,
            board_ticks: 0,
            link_ticks: 0,
            startup_led: false,
            awake_led: false,
            recording: true,
        }
    }

    fn record(&mut self, call: ServiceCall) {
        if self.recording {
            self.calls.push(call);
        }
    }

    pub fn count(&self, call: ServiceCall) -> usize {
        self.calls.iter().filter(|c| **c == call).count()
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }
}

impl Default for MockServices {
    fn default() -> Self {
        Self::new()
    }
}

impl Services for MockServices {
    fn board_service(&mut self) {
        self.board_ticks += 1;
        self.record(ServiceCall::Board);
    }

    fn link_service(&mut self) {
        self.link_ticks += 1;
        self.record(ServiceCall::Link);
    }

    fn status_indicator(&mut self, indicator: Indicator, on: bool) {
        match indicator {
            Indicator::Startup => self.startup_led = on,
            Indicator::Awake => self.awake_led = on,
        }
        self.record(ServiceCall::Indicator(indicator, on));
    }

    fn delay_ms(&mut self, ms: u32) {
        self.elapsed_ms += u64::from(ms);
        self.record(ServiceCall::Delay(ms));
    }
}
