//! Hardware Abstraction Layer
//!
//! STM32G474 implementations of the power-management seams.
//! This module isolates register-level and pin-level code; everything
//! outside it is hardware independent.

pub mod board;
pub mod gpio;
pub mod rtc_wakeup;
