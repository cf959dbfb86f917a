//! Static descriptions of each supported timer and mode. A `Timer` is generic over its
//! register port; everything that differs between Timer1 and Timer2, or between their
//! compare and PWM modes, lives here.

use super::{ClockSelect, PwmChannel};
use crate::{
    gpio::{Pin, Port},
    interrupt::TimerEvent,
    regs::Register,
};

/// How the counter moves between BOTTOM and TOP.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Counting {
    /// Counts up to TOP, then restarts from BOTTOM.
    Linear,
    /// Counts up to TOP, then back down to BOTTOM. The counter value alone doesn't say
    /// which half of the period it's in.
    Symmetric,
}

/// One compare output channel.
#[derive(Debug)]
pub struct ChannelLayout {
    pub channel: PwmChannel,
    /// The pin the compare unit drives.
    pub pin: Pin,
    pub compare: Register,
    /// `COMnx1` in `TCCRnA`. Setting it alone selects non-inverting output.
    pub output_bit: u8,
}

#[derive(Debug)]
pub struct TimerLayout {
    /// Used in log messages.
    pub name: &'static str,
    /// Counter width, in bits.
    pub resolution: u8,
    /// Available clock selects, ascending. The register encoding of each is its
    /// position in this list, plus one.
    pub prescalers: &'static [ClockSelect],
    pub counting: Counting,
    pub event: TimerEvent,
    /// Waveform generation bits set after both control registers are cleared.
    pub mode_bits: &'static [(Register, u8)],
    /// The register holding TOP in this mode.
    pub top: Register,
    pub channels: &'static [ChannelLayout],
}

/// Clock select bits `CSn2:0`, in `TCCRnB`.
pub(crate) const CS_REG: Register = Register::ControlB;
pub(crate) const CS_MASK: u16 = 0b111;
pub(crate) const CS_SHIFT: u8 = 0;

impl TimerLayout {
    pub const fn is_symmetric(&self) -> bool {
        matches!(self.counting, Counting::Symmetric)
    }

    /// Duty cycles are expressed as a fraction of this value; it represents 100%.
    pub const fn duty_scale(&self) -> u32 {
        1 << self.resolution
    }

    /// Encode a clock select for `CSn2:0`. `NoClock`, or a clock this timer doesn't
    /// support, encode as 0, which stops the counter.
    pub fn clock_select_bits(&self, clock: ClockSelect) -> u16 {
        self.prescalers
            .iter()
            .position(|c| *c == clock)
            .map(|i| i as u16 + 1)
            .unwrap_or(0)
    }

    pub fn channel(&self, channel: PwmChannel) -> Option<&'static ChannelLayout> {
        self.channels.iter().find(|c| c.channel == channel)
    }
}

// TCCRnA
const COMNA1: u8 = 7;
const COMNB1: u8 = 5;
const WGMN0: u8 = 0;
const WGMN1: u8 = 1;
// TCCRnB
const WGMN2: u8 = 3;
const WGM13: u8 = 4;

const TIMER1_PRESCALERS: &[ClockSelect] = &[
    ClockSelect::Div1,
    ClockSelect::Div8,
    ClockSelect::Div64,
    ClockSelect::Div256,
    ClockSelect::Div1024,
];

const TIMER2_PRESCALERS: &[ClockSelect] = &[
    ClockSelect::Div1,
    ClockSelect::Div8,
    ClockSelect::Div32,
    ClockSelect::Div64,
    ClockSelect::Div128,
    ClockSelect::Div256,
    ClockSelect::Div1024,
];

/// Timer1, CTC with TOP in `OCR1A` (mode 4). Interrupts on `TIMER1_COMPA`.
pub static TIMER1_CTC: TimerLayout = TimerLayout {
    name: "timer1-ctc",
    resolution: 16,
    prescalers: TIMER1_PRESCALERS,
    counting: Counting::Linear,
    event: TimerEvent::CompareMatchA,
    mode_bits: &[(Register::ControlB, WGMN2)],
    top: Register::CompareA,
    channels: &[],
};

/// Timer1, phase and frequency correct PWM with TOP in `ICR1` (mode 8). Interrupts on
/// `TIMER1_OVF`. Outputs on D9 (`OC1A`) and D10 (`OC1B`).
pub static TIMER1_PWM: TimerLayout = TimerLayout {
    name: "timer1-pwm",
    resolution: 16,
    prescalers: TIMER1_PRESCALERS,
    counting: Counting::Symmetric,
    event: TimerEvent::Overflow,
    mode_bits: &[(Register::ControlB, WGM13)],
    top: Register::InputCapture,
    channels: &[
        ChannelLayout {
            channel: PwmChannel::A,
            pin: Pin::new(Port::B, 1),
            compare: Register::CompareA,
            output_bit: COMNA1,
        },
        ChannelLayout {
            channel: PwmChannel::B,
            pin: Pin::new(Port::B, 2),
            compare: Register::CompareB,
            output_bit: COMNB1,
        },
    ],
};

/// Timer2, CTC with TOP in `OCR2A` (mode 2). Interrupts on `TIMER2_COMPA`.
pub static TIMER2_CTC: TimerLayout = TimerLayout {
    name: "timer2-ctc",
    resolution: 8,
    prescalers: TIMER2_PRESCALERS,
    counting: Counting::Linear,
    event: TimerEvent::CompareMatchA,
    mode_bits: &[(Register::ControlA, WGMN1)],
    top: Register::CompareA,
    channels: &[],
};

/// Timer2, phase correct PWM with TOP in `OCR2A` (mode 5). Interrupts on `TIMER2_OVF`.
/// `OCR2A` holds TOP, so only `OC2B` (D3) is available as an output.
pub static TIMER2_PWM: TimerLayout = TimerLayout {
    name: "timer2-pwm",
    resolution: 8,
    prescalers: TIMER2_PRESCALERS,
    counting: Counting::Symmetric,
    event: TimerEvent::Overflow,
    mode_bits: &[(Register::ControlA, WGMN0), (Register::ControlB, WGMN2)],
    top: Register::CompareA,
    channels: &[ChannelLayout {
        channel: PwmChannel::B,
        pin: Pin::new(Port::D, 3),
        compare: Register::CompareB,
        output_bit: COMNB1,
    }],
};
