//! Power Management
//!
//! Deep-sleep cycling driven by the wake-up countdown timer.
//! The foreground arms the timer through [`registers::ArmRegisters`];
//! the wake interrupt restores it through [`registers::AckRegisters`].

pub mod controller;
pub mod irq_gate;
pub mod quiesce;
pub mod registers;
pub mod rtc_calc;
pub mod sleep_timer;
pub mod wake;
