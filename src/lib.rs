//! Driver for the 8 and 16-bit timer/counters on AVR microcontrollers, such as Timer1 and
//! Timer2 on the ATmega328P.
//!
//! Each timer can be set up for a periodic interrupt (CTC), or for symmetric PWM output on its
//! compare channels. Either way, the time elapsed in the current period can be read back
//! in µs.
//!
//! Register access goes through the [`RegisterPort`](traits::RegisterPort) trait.
//! [`regs::MmioPort`] implements it for the ATmega328P memory map; tests use an in-memory
//! stand-in.
//!
//! Interrupt masking uses the [`critical-section`](https://docs.rs/critical-section) crate.
//! The application provides an implementation, eg `avr-device`'s `critical-section-impl`
//! feature.

#![cfg_attr(not(test), no_std)]

#[macro_use]
mod macros;

pub mod clocks;
pub mod error;
pub mod gpio;
pub mod interrupt;
pub mod regs;
pub mod timer;
pub mod traits;
mod util;

pub use crate::{
    clocks::Clocks,
    error::{Error, Result},
    interrupt::{InterruptBridge, TimerCallback, TimerEvent},
    timer::{ClockSelect, PwmChannel, Timer, TimerError, TimerState},
};

/// Upper bound on busy-wait iterations, before giving up with `Error::RegisterUnchanged`.
pub(crate) const MAX_ITERS: u32 = 300_000;
