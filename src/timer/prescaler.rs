//! Conversion of a requested period into a prescaler choice and a counter top value.

/// Clock select: the division applied to the timer clock before it reaches the counter.
///
/// Each timer supports a subset of these; see `TimerLayout::prescalers`. The
/// register encoding depends on that subset, not on the variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockSelect {
    /// No clock source; the counter is stopped.
    NoClock,
    Div1,
    Div8,
    Div32,
    Div64,
    Div128,
    Div256,
    Div1024,
}

impl ClockSelect {
    /// log2 of the division ratio. This is what converts counts to time, so it comes
    /// from the ratio table rather than from the variant's position.
    pub const fn shift(&self) -> Option<u8> {
        match self {
            Self::NoClock => None,
            Self::Div1 => Some(0),
            Self::Div8 => Some(3),
            Self::Div32 => Some(5),
            Self::Div64 => Some(6),
            Self::Div128 => Some(7),
            Self::Div256 => Some(8),
            Self::Div1024 => Some(10),
        }
    }

    /// The division ratio, eg 64 for `Div64`.
    pub const fn ratio(&self) -> Option<u32> {
        match self.shift() {
            Some(shift) => Some(1 << shift),
            None => None,
        }
    }
}

/// A clock select and top value that together define one period. They are only ever
/// written to the timer as a pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PeriodSettings {
    pub clock: ClockSelect,
    pub top: u16,
    /// The requested period was longer than the timer can count; these are the
    /// settings for the longest period it can.
    pub clamped: bool,
}

/// Calculate the clock select and top value for a period of `period_us`. This can be
/// used for initial timer setup, or changing the value later.
///
/// `prescalers` lists the timer's ratios in ascending order. The first one that brings the
/// cycle count under `2^resolution` wins. If none does, the result is clamped to the
/// largest ratio and the largest top value, and marked `clamped`.
///
/// Symmetric (up/down) counting covers one period as an up-count plus a down-count, so
/// the top value there is half the cycle count.
pub fn calc_period_vals(
    period_us: u32,
    clock_speed: u32,
    resolution: u8,
    prescalers: &[ClockSelect],
    symmetric: bool,
) -> PeriodSettings {
    // cycles = round(clock_speed / 1_000_000 * period_us), kept in integers.
    let mut cycles = (clock_speed as u64 * period_us as u64 + 500_000) / 1_000_000;
    if symmetric {
        cycles /= 2;
    }

    let limit = 1_u64 << resolution;

    for clock in prescalers {
        let Some(shift) = clock.shift() else {
            continue;
        };
        let count = cycles >> shift;
        if count < limit {
            return PeriodSettings {
                clock: *clock,
                top: count as u16,
                clamped: false,
            };
        }
    }

    PeriodSettings {
        clock: prescalers.last().copied().unwrap_or(ClockSelect::NoClock),
        top: (limit - 1) as u16,
        clamped: true,
    }
}
