//! Low Power Node Firmware Library
//!
//! This library provides the power-mode controller for a battery-powered
//! STM32G474 node that spends almost all of its life in deep sleep and
//! wakes itself on the RTC wake-up timer. Each cycle it services the board
//! briefly, blinks an activity LED, quiesces every external signal line and
//! arms the countdown for one second longer than the previous cycle.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  POWER-MODE CONTROLLER                       │
//! │   Startup ──► Active ──► Arming ──► (Sleeping) ──► Active    │
//! ├─────────────────────────────────────────────────────────────┤
//! │   Quiescer   │   SleepTimer (arm)   │   WakeHandler (ack)    │
//! ├─────────────────────────────────────────────────────────────┤
//! │        ArmRegisters        │        AckRegisters            │
//! │    (foreground context)    │     (interrupt context)        │
//! ├─────────────────────────────────────────────────────────────┤
//! │          HAL: RTC wake-up timer, PWR, NVIC, GPIO             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Design Principles
//!
//! - **One writer at a time**: the register set is reached through two
//!   capability traits, one per execution context
//! - **Handler clears, foreground decides**: the ISR restores registers and
//!   signals completion, all application logic stays in the state machine
//! - **No unsafe in application code**: all unsafe isolated in the HAL
//! - **Host-testable core**: everything outside `hal` builds with `std`

#![cfg_attr(feature = "embedded", no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Must come first so the logging macros are visible to every module.
#[macro_use]
mod fmt;

// Re-export dependencies needed by applications (only in embedded mode)
#[cfg(feature = "embedded")]
pub use embassy_stm32;
#[cfg(feature = "embedded")]
pub use embassy_time;

/// Hardware Abstraction Layer
///
/// STM32G474 RTC wake-up timer gate, GPIO lines and the board services.
#[cfg(feature = "embedded")]
#[allow(unsafe_code)]
pub mod hal;

/// Power Management
///
/// Register capabilities, quiescing, sleep timer, wake handler and the
/// power-mode state machine.
pub mod power;

/// External collaborators invoked by the controller
pub mod services;

/// Shared types used across modules
pub mod types;

/// System configuration and constants
pub mod config;

/// Crate error type
pub mod error;

pub use error::Error;

/// Prelude module for common imports
pub mod prelude {
    //! Convenient re-exports for common types and traits.

    pub use crate::config::*;
    pub use crate::error::Error;
    pub use crate::types::*;

    pub use crate::power::controller::PowerModeController;
    pub use crate::power::quiesce::{Quiescer, SignalLine};
    pub use crate::power::registers::{AckRegisters, ArmRegisters};
    pub use crate::power::sleep_timer::SleepTimer;
    pub use crate::power::wake::{WakeHandler, WakeSignal};
    pub use crate::services::{Indicator, Services};
}
