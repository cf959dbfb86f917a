//! In-memory stand-in for one timer's registers.
//!
//! Reading the counter while a clock is selected advances it by `step` counts, the
//! way a running timer moves between two reads. Linear layouts count up to TOP and
//! restart at 0; symmetric ones turn around at TOP and at 0.

#![allow(dead_code)]

use std::cell::Cell;

use avr_timer_hal::{
    Clocks, InterruptBridge,
    gpio::Pin,
    regs::Register,
    timer::{Timer, TimerLayout},
    traits::RegisterPort,
};

pub struct FakePort {
    regs: [Cell<u16>; 7],
    top: Register,
    symmetric: bool,
    wide: bool,
    step: Cell<u16>,
    counting_up: Cell<bool>,
    pins: Vec<Pin>,
}

fn index(reg: Register) -> usize {
    match reg {
        Register::ControlA => 0,
        Register::ControlB => 1,
        Register::Counter => 2,
        Register::InputCapture => 3,
        Register::CompareA => 4,
        Register::CompareB => 5,
        Register::InterruptMask => 6,
    }
}

impl FakePort {
    pub fn new(layout: &TimerLayout) -> Self {
        Self {
            regs: Default::default(),
            top: layout.top,
            symmetric: layout.is_symmetric(),
            wide: layout.resolution > 8,
            step: Cell::new(1),
            counting_up: Cell::new(true),
            pins: Vec::new(),
        }
    }

    /// Read a register without advancing the counter.
    pub fn peek(&self, reg: Register) -> u16 {
        self.regs[index(reg)].get()
    }

    /// Set a register behind the driver's back, eg to place the counter.
    pub fn poke(&self, reg: Register, value: u16) {
        self.regs[index(reg)].set(value);
    }

    pub fn bit(&self, reg: Register, bit: u8) -> bool {
        self.peek(reg) & (1 << bit) != 0
    }

    /// `CSn2:0`
    pub fn clock_bits(&self) -> u16 {
        self.peek(Register::ControlB) & 0b111
    }

    /// Counts moved per counter read. 0 freezes the counter.
    pub fn set_step(&self, step: u16) {
        self.step.set(step);
    }

    pub fn set_counting_up(&self, up: bool) {
        self.counting_up.set(up);
    }

    pub fn output_pins(&self) -> &[Pin] {
        &self.pins
    }

    fn advance(&self) {
        let top = self.peek(self.top);
        let mut value = self.peek(Register::Counter);

        for _ in 0..self.step.get() {
            if top == 0 {
                value = 0;
            } else if !self.symmetric {
                value = if value >= top { 0 } else { value + 1 };
            } else if self.counting_up.get() {
                if value >= top {
                    self.counting_up.set(false);
                    value = top - 1;
                } else {
                    value += 1;
                }
            } else if value == 0 {
                self.counting_up.set(true);
                value = 1;
            } else {
                value -= 1;
            }
        }

        self.poke(Register::Counter, value);
    }
}

impl RegisterPort for FakePort {
    fn read(&self, reg: Register) -> u16 {
        let value = self.peek(reg);
        if reg == Register::Counter && self.clock_bits() != 0 {
            self.advance();
        }
        value
    }

    fn write(&mut self, reg: Register, value: u16) {
        let wide_reg = matches!(
            reg,
            Register::Counter | Register::InputCapture | Register::CompareA | Register::CompareB
        );
        let value = if self.wide && wide_reg {
            value
        } else {
            value & 0xFF
        };
        self.poke(reg, value);
    }

    fn set_pin_output(&mut self, pin: Pin) {
        self.pins.push(pin);
    }
}

/// A timer over a fresh fake port, at 16Mhz.
pub fn timer(layout: &'static TimerLayout, bridge: &'static InterruptBridge) -> Timer<FakePort> {
    Timer::new(FakePort::new(layout), layout, &Clocks::default(), bridge)
}
