//! Pin identity for timer outputs. Only what the timers need is here: naming the pin a
//! compare unit drives, and switching it to an output.

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// GPIO port letter.
pub enum Port {
    B,
    C,
    D,
}

impl Port {
    /// Data-space address of this port's `DDRx` register.
    pub(crate) const fn ddr_addr(&self) -> usize {
        match self {
            Self::B => 0x24,
            Self::C => 0x27,
            Self::D => 0x2A,
        }
    }
}

/// A single GPIO pin.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Pin {
    pub port: Port,
    pub pin: u8,
}

impl Pin {
    pub const fn new(port: Port, pin: u8) -> Self {
        Self { port, pin }
    }

    /// Map an Arduino Uno style pin number to its port and bit. D0-D7 are on port D,
    /// D8-D13 on port B, A0-A5 (14-19) on port C.
    pub const fn from_arduino(number: u8) -> Option<Self> {
        match number {
            0..=7 => Some(Self::new(Port::D, number)),
            8..=13 => Some(Self::new(Port::B, number - 8)),
            14..=19 => Some(Self::new(Port::C, number - 14)),
            _ => None,
        }
    }
}
