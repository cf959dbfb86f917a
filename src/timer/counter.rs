//! Counter access: applying a period, atomic snapshots, and elapsed-time reads.

use super::{
    ClockSelect, PeriodSettings, Timer, TimerError, TimerState, duty_to_compare,
    layout::{CS_MASK, CS_REG, CS_SHIFT},
};
use crate::{
    error::{Error, Result},
    regs::Register,
    traits::RegisterPort,
    util::bounded_loop,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum CountDir {
    Up = 0,
    Down = 1,
}

/// A counter value, the TOP it was read against, and the direction the counter was
/// moving when it was taken.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CounterSnapshot {
    pub raw: u16,
    pub top: u16,
    pub direction: CountDir,
}

impl CounterSnapshot {
    /// Timer ticks since the start of the period.
    pub fn ticks(&self) -> u32 {
        linearize(self.raw, self.top, self.direction)
    }
}

/// Place a counter value within the whole period. While counting down in a symmetric
/// mode, the counter is in the period's second half: `(top - raw) + top`.
pub fn linearize(raw: u16, top: u16, direction: CountDir) -> u32 {
    match direction {
        CountDir::Up => raw as u32,
        CountDir::Down => top.saturating_sub(raw) as u32 + top as u32,
    }
}

/// Convert timer ticks to µs: `(ticks * 1000) / (clock_speed / 1000) << shift`, where
/// `shift` is log2 of the prescaler ratio.
pub fn ticks_to_us(ticks: u32, clock_speed: u32, shift: u8) -> u32 {
    let khz = (clock_speed / 1_000).max(1) as u64;
    (((ticks as u64 * 1_000) / khz) << shift) as u32
}

impl<P: RegisterPort> Timer<P> {
    /// Write TOP, and the clock select if the timer is running, as one update. Compare
    /// values of channels with a duty set are recomputed against the new TOP.
    pub(super) fn apply_period(&mut self, settings: PeriodSettings) {
        let layout = self.layout;
        let running = self.state == TimerState::Running;
        let duties = self.duties;

        critical_section::with(|_| {
            self.port.write(layout.top, settings.top);

            for ch in layout.channels {
                if let Some(duty) = duties[ch.channel as usize] {
                    let compare = duty_to_compare(settings.top, duty, layout.resolution);
                    self.port.write(ch.compare, compare);
                }
            }

            if running {
                let bits = layout.clock_select_bits(settings.clock);
                self.port.write_bit_group(CS_REG, CS_MASK, CS_SHIFT, bits);
            }
        });

        self.clock_select = settings.clock;
        trace!("{}: clock {}, top {}", layout.name, settings.clock, settings.top);
    }

    pub(super) fn write_clock_select(&mut self, clock: ClockSelect) {
        let bits = self.layout.clock_select_bits(clock);
        critical_section::with(|_| self.port.write_bit_group(CS_REG, CS_MASK, CS_SHIFT, bits));
    }

    /// Remove the clock from a running counter, returning the direction it was moving
    /// in just before. Both happen in one critical section, so the direction matches
    /// the count the counter is left holding.
    pub(super) fn halt(&mut self) -> Result<CountDir> {
        let top_reg = self.layout.top;
        critical_section::with(|_| {
            let raw = self.port.read(Register::Counter);
            let top = self.port.read(top_reg);
            let direction = self.direction(raw, top);

            self.port.write_bit_group(CS_REG, CS_MASK, CS_SHIFT, 0);
            direction
        })
    }

    pub(super) fn reset_count(&mut self) {
        critical_section::with(|_| self.port.write(Register::Counter, 0));
    }

    /// The counter value, read in one piece.
    pub fn count(&self) -> u16 {
        critical_section::with(|_| self.port.read(Register::Counter))
    }

    /// The current TOP.
    pub fn top(&self) -> u16 {
        critical_section::with(|_| self.port.read(self.layout.top))
    }

    /// Spin until the counter no longer reads `from`, returning the new value. Callers
    /// hold a critical section or accept a torn 16-bit read.
    pub(super) fn wait_for_count_change(&self, from: u16) -> Result<u16> {
        let mut current = self.port.read(Register::Counter);
        bounded_loop!(current == from, Error::RegisterUnchanged, {
            current = self.port.read(Register::Counter);
        });
        Ok(current)
    }

    /// Which way a running counter that just read `raw` is moving. Linear counters
    /// always count up, as does a symmetric one with a TOP of 0, which never leaves
    /// BOTTOM.
    fn direction(&self, raw: u16, top: u16) -> Result<CountDir> {
        if !self.layout.is_symmetric() || top == 0 {
            return Ok(CountDir::Up);
        }

        // Symmetric counting turns at TOP and BOTTOM rather than wrapping, so a smaller
        // next value means it's counting down.
        let next = self.wait_for_count_change(raw)?;
        Ok(if next < raw { CountDir::Down } else { CountDir::Up })
    }

    /// Take a counter snapshot. In symmetric modes, while running, the counter is
    /// watched for one more tick to find which way it's moving. While stopped, the
    /// direction recorded by `stop` is used. The whole read happens in one critical
    /// section.
    pub fn read_raw(&self) -> Result<CounterSnapshot> {
        if !matches!(self.state, TimerState::Running | TimerState::Stopped) {
            return Err(TimerError::StateViolation.into());
        }

        let running = self.state == TimerState::Running;

        critical_section::with(|_| -> Result<CounterSnapshot> {
            let raw = self.port.read(Register::Counter);
            let top = self.port.read(self.layout.top);

            let direction = if running {
                self.direction(raw, top)?
            } else {
                self.stopped_direction
            };

            Ok(CounterSnapshot {
                raw,
                top,
                direction,
            })
        })
    }

    /// Time elapsed in the current period, in µs.
    pub fn read(&self) -> Result<u32> {
        if !matches!(self.state, TimerState::Running | TimerState::Stopped) {
            return Err(TimerError::StateViolation.into());
        }
        let Some(shift) = self.clock_select.shift() else {
            // No period was ever applied; there's no rate to convert with.
            return Err(TimerError::StateViolation.into());
        };

        let snapshot = self.read_raw()?;
        Ok(ticks_to_us(snapshot.ticks(), self.clock_speed, shift))
    }
}
