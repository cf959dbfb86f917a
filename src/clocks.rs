//! Clock configuration. On the devices this crate targets, the timer prescalers are fed
//! directly from the system clock, so one speed describes everything the timers need.

use crate::traits::{ClockCfg, ClocksValid};

/// Settings used to derive timer periods and elapsed times.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Clocks {
    /// System clock speed, in Hz. Eg the crystal or resonator frequency.
    pub sysclk: u32,
}

impl Clocks {
    pub const fn new(sysclk: u32) -> Self {
        Self { sysclk }
    }
}

impl Default for Clocks {
    /// 16Mhz, as on most ATmega328P boards.
    fn default() -> Self {
        Self { sysclk: 16_000_000 }
    }
}

impl ClockCfg for Clocks {
    fn sysclk(&self) -> u32 {
        self.sysclk
    }

    fn timer_clock(&self) -> u32 {
        self.sysclk
    }

    /// Elapsed-time conversion divides by the speed in kHz, so it's only exact for a
    /// whole number of kHz, at 1Mhz or above.
    fn validate_speeds(&self) -> ClocksValid {
        if self.sysclk < 1_000_000 || self.sysclk % 1_000 != 0 {
            ClocksValid::NotValid
        } else {
            ClocksValid::Valid
        }
    }
}
