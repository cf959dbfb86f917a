// Traits used across the library. Could be used more generally than in this lib.

use crate::{gpio::Pin, regs::Register};

/// Is a set of speeds valid?
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum ClocksValid {
    Valid,
    NotValid,
}

/// This trait allows you to return information about a clock's speeds.
/// It's used for configuring peripherals.
pub trait ClockCfg {
    /// System clock speed, in Hz.
    fn sysclk(&self) -> u32;

    /// Speed of the clock feeding the timer prescalers, in Hz.
    fn timer_clock(&self) -> u32;

    /// Validate that the clock speeds can be used for period and elapsed-time
    /// conversions.
    fn validate_speeds(&self) -> ClocksValid;
}

/// Access to the registers of a single timer/counter peripheral, and to the pin
/// direction registers its outputs share.
///
/// Implemented once per target. The timer logic never touches addresses directly, so
/// a fake implementation can stand in for the hardware on a host.
///
/// Reads and writes of 16-bit registers are not atomic on their own; callers that need
/// a coherent value wrap them in a critical section.
pub trait RegisterPort {
    /// Read a whole register. 8-bit registers return their value zero-extended.
    fn read(&self, reg: Register) -> u16;

    /// Write a whole register. 8-bit registers ignore the upper byte.
    fn write(&mut self, reg: Register, value: u16);

    /// Set or clear a single bit, leaving the others untouched.
    fn write_bit(&mut self, reg: Register, bit: u8, value: bool) {
        let current = self.read(reg);
        let updated = if value {
            current | (1 << bit)
        } else {
            current & !(1 << bit)
        };
        self.write(reg, updated);
    }

    /// Replace the bit group `mask << shift` with `value`.
    fn write_bit_group(&mut self, reg: Register, mask: u16, shift: u8, value: u16) {
        let current = self.read(reg) & !(mask << shift);
        self.write(reg, current | ((value & mask) << shift));
    }

    /// Configure a pin as an output, so a compare unit can drive it.
    fn set_pin_output(&mut self, pin: Pin);
}
