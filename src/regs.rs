//! Register names shared by all timers, and a memory-mapped `RegisterPort` for
//! ATmega328P-class devices.
//!
//! Addresses are data-space addresses, as listed in the register summary of the
//! ATmega48A/88A/168A/328 datasheet.

use crate::{gpio::Pin, traits::RegisterPort};

/// A timer register, named by function rather than by timer number.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Register {
    /// `TCCRnA`: compare output modes and the low waveform generation bits.
    ControlA,
    /// `TCCRnB`: the high waveform generation bits and clock select.
    ControlB,
    /// `TCNTn`
    Counter,
    /// `ICRn`. Only present on 16-bit timers.
    InputCapture,
    /// `OCRnA`
    CompareA,
    /// `OCRnB`
    CompareB,
    /// `TIMSKn`
    InterruptMask,
}

/// Data-space addresses of one timer's registers.
#[derive(Debug)]
pub struct RegisterMap {
    pub control_a: usize,
    pub control_b: usize,
    pub counter: usize,
    pub input_capture: Option<usize>,
    pub compare_a: usize,
    pub compare_b: usize,
    pub interrupt_mask: usize,
    /// Counter, input capture and compare registers are 16 bits wide, accessed through
    /// the shared `TEMP` byte.
    pub wide: bool,
}

impl RegisterMap {
    fn addr(&self, reg: Register) -> Option<usize> {
        match reg {
            Register::ControlA => Some(self.control_a),
            Register::ControlB => Some(self.control_b),
            Register::Counter => Some(self.counter),
            Register::InputCapture => self.input_capture,
            Register::CompareA => Some(self.compare_a),
            Register::CompareB => Some(self.compare_b),
            Register::InterruptMask => Some(self.interrupt_mask),
        }
    }

    fn is_wide(&self, reg: Register) -> bool {
        self.wide
            && matches!(
                reg,
                Register::Counter
                    | Register::InputCapture
                    | Register::CompareA
                    | Register::CompareB
            )
    }
}

/// Timer/Counter1, 16 bits.
pub const TIMER1_REGS: RegisterMap = RegisterMap {
    control_a: 0x80,
    control_b: 0x81,
    counter: 0x84,
    input_capture: Some(0x86),
    compare_a: 0x88,
    compare_b: 0x8A,
    interrupt_mask: 0x6F,
    wide: true,
};

/// Timer/Counter2, 8 bits.
pub const TIMER2_REGS: RegisterMap = RegisterMap {
    control_a: 0xB0,
    control_b: 0xB1,
    counter: 0xB2,
    input_capture: None,
    compare_a: 0xB3,
    compare_b: 0xB4,
    interrupt_mask: 0x70,
    wide: false,
};

/// Volatile access to a timer's registers at fixed addresses.
pub struct MmioPort {
    base: usize,
    map: &'static RegisterMap,
}

// The port only holds addresses; exclusivity is promised by the constructor's caller.
unsafe impl Send for MmioPort {}

impl MmioPort {
    /// Access the timer described by `map` at its device addresses.
    ///
    /// # Safety
    /// The caller must own the timer peripheral for the lifetime of the port: no other
    /// code may write its registers. Must only be used on a device with this memory map.
    pub const unsafe fn new(map: &'static RegisterMap) -> Self {
        Self { base: 0, map }
    }

    /// Access the registers relative to `base` instead of the data-space origin.
    ///
    /// # Safety
    /// `base` must point to a region that covers every address in `map` and every
    /// `DDRx` register, valid for volatile reads and writes while the port is alive.
    pub unsafe fn with_base(base: *mut u8, map: &'static RegisterMap) -> Self {
        Self {
            base: base as usize,
            map,
        }
    }

    fn ptr(&self, addr: usize) -> *mut u8 {
        (self.base + addr) as *mut u8
    }
}

impl RegisterPort for MmioPort {
    fn read(&self, reg: Register) -> u16 {
        let Some(addr) = self.map.addr(reg) else {
            return 0;
        };
        let ptr = self.ptr(addr);

        // SAFETY: addresses come from the register map the constructor vouched for.
        unsafe {
            if self.map.is_wide(reg) {
                // Reading the low byte latches the high byte into TEMP.
                let low = ptr.read_volatile();
                let high = ptr.wrapping_add(1).read_volatile();
                u16::from_le_bytes([low, high])
            } else {
                ptr.read_volatile() as u16
            }
        }
    }

    fn write(&mut self, reg: Register, value: u16) {
        let Some(addr) = self.map.addr(reg) else {
            return;
        };
        let ptr = self.ptr(addr);
        let [low, high] = value.to_le_bytes();

        // SAFETY: see `read`.
        unsafe {
            if self.map.is_wide(reg) {
                // The high byte goes to TEMP first; writing the low byte commits both.
                ptr.wrapping_add(1).write_volatile(high);
                ptr.write_volatile(low);
            } else {
                ptr.write_volatile(low);
            }
        }
    }

    fn set_pin_output(&mut self, pin: Pin) {
        let ptr = self.ptr(pin.port.ddr_addr());

        // SAFETY: DDRx registers are covered by the constructor's contract.
        unsafe {
            let ddr = ptr.read_volatile();
            ptr.write_volatile(ddr | (1 << pin.pin));
        }
    }
}
