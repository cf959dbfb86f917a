//! PWM output on a timer's compare channels.
//!
//! Duty cycles are fractions of `2^resolution`: on Timer1, `1 << 15` is 50%, and
//! `1 << 16` is fully on. The compare value follows from the current TOP.

use super::{ChannelLayout, Timer, TimerError, TimerLayout, TimerState};
use crate::{error::Result, regs::Register, traits::RegisterPort};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum PwmChannel {
    A = 0,
    B = 1,
}

/// Compare value for `duty`, out of `2^resolution`: `floor(top * duty / 2^resolution)`.
/// For duty cycles in range, this never exceeds `top`.
pub fn duty_to_compare(top: u16, duty: u32, resolution: u8) -> u16 {
    ((top as u64 * duty as u64) >> resolution) as u16
}

/// The smallest duty cycle that maps back to `compare` against `top`.
fn compare_to_duty(top: u16, compare: u16, resolution: u8) -> u32 {
    if top == 0 {
        return 0;
    }
    (((compare as u64) << resolution).div_ceil(top as u64)) as u32
}

impl<P: RegisterPort> Timer<P> {
    /// Drive a channel's pin from its compare unit, non-inverting, at `duty`. A nonzero
    /// `period_us` sets the timer period first.
    ///
    /// If the period is out of range, the output is still enabled against the clamped
    /// period and `RangeViolation` is returned.
    pub fn enable_pwm(
        &mut self,
        channel: PwmChannel,
        duty: u32,
        period_us: Option<u32>,
    ) -> Result<()> {
        self.check_pwm_state()?;
        let ch = self.channel_layout(channel)?;
        self.check_duty(duty)?;

        let period_result = match period_us {
            Some(period_us) if period_us > 0 => self.set_period(period_us),
            _ => Ok(()),
        };

        self.port.set_pin_output(ch.pin);
        let bit = ch.output_bit;
        critical_section::with(|_| self.port.write_bit(Register::ControlA, bit, true));
        self.set_pwm_duty(channel, duty)?;

        debug!("{}: PWM enabled on channel {}, duty {}", self.layout.name, channel, duty);
        period_result
    }

    /// Disconnect a channel's pin from its compare unit. Disabling a disabled channel
    /// is a no-op.
    pub fn disable_pwm(&mut self, channel: PwmChannel) -> Result<()> {
        let ch = self.channel_layout(channel)?;

        let bit = ch.output_bit;
        critical_section::with(|_| self.port.write_bit(Register::ControlA, bit, false));
        self.duties[channel as usize] = None;

        debug!("{}: PWM disabled on channel {}", self.layout.name, channel);
        Ok(())
    }

    /// Set a channel's duty cycle, out of `2^resolution`. Out-of-range values are rejected
    /// without touching the hardware.
    pub fn set_pwm_duty(&mut self, channel: PwmChannel, duty: u32) -> Result<()> {
        self.check_pwm_state()?;
        let ch = self.channel_layout(channel)?;
        self.check_duty(duty)?;

        let layout = self.layout;
        critical_section::with(|_| {
            let top = self.port.read(layout.top);
            let compare = duty_to_compare(top, duty, layout.resolution);
            self.port.write(ch.compare, compare);
        });
        self.duties[channel as usize] = Some(duty);

        Ok(())
    }

    /// Set a channel's compare value directly. It can't exceed the current TOP.
    pub fn set_compare(&mut self, channel: PwmChannel, compare: u16) -> Result<()> {
        self.check_pwm_state()?;
        let ch = self.channel_layout(channel)?;

        let layout = self.layout;
        let top = critical_section::with(|_| -> Result<u16> {
            let top = self.port.read(layout.top);
            if compare > top {
                return Err(TimerError::RangeViolation.into());
            }
            self.port.write(ch.compare, compare);
            Ok(top)
        })?;
        self.duties[channel as usize] = Some(compare_to_duty(top, compare, layout.resolution));

        Ok(())
    }

    /// A channel's current compare value.
    pub fn compare(&self, channel: PwmChannel) -> Result<u16> {
        let ch = self.channel_layout(channel)?;
        Ok(critical_section::with(|_| self.port.read(ch.compare)))
    }

    /// The duty cycle last set on a channel, if it's been set since it was last
    /// disabled.
    pub fn duty(&self, channel: PwmChannel) -> Option<u32> {
        self.duties[channel as usize]
    }

    fn check_pwm_state(&self) -> Result<()> {
        match self.state {
            TimerState::Ready | TimerState::Running | TimerState::Stopped => Ok(()),
            _ => Err(TimerError::StateViolation.into()),
        }
    }

    fn check_duty(&self, duty: u32) -> Result<()> {
        if duty > self.layout.duty_scale() {
            warn!("{}: duty {} out of range", self.layout.name, duty);
            return Err(TimerError::RangeViolation.into());
        }
        Ok(())
    }

    fn channel_layout(&self, channel: PwmChannel) -> Result<&'static ChannelLayout> {
        let layout: &'static TimerLayout = self.layout;
        layout
            .channel(channel)
            .ok_or(TimerError::InvalidArgument.into())
    }

    /// Borrow one channel as an `embedded-hal` PWM pin.
    #[cfg(feature = "embedded_hal")]
    pub fn pwm_output(&mut self, channel: PwmChannel) -> Result<PwmOutput<'_, P>> {
        self.channel_layout(channel)?;
        Ok(PwmOutput {
            timer: self,
            channel,
        })
    }
}

/// One PWM channel of a timer. Duty cycles here are raw compare values, out of the
/// current TOP.
#[cfg(feature = "embedded_hal")]
pub struct PwmOutput<'a, P> {
    timer: &'a mut Timer<P>,
    channel: PwmChannel,
}

#[cfg(feature = "embedded_hal")]
mod embedded_hal_impl {
    use embedded_hal::pwm::{ErrorType, SetDutyCycle};

    use super::PwmOutput;
    use crate::{error::Error, traits::RegisterPort};

    impl<P: RegisterPort> ErrorType for PwmOutput<'_, P> {
        type Error = Error;
    }

    impl<P: RegisterPort> SetDutyCycle for PwmOutput<'_, P> {
        /// The current TOP. Zero until a period is set.
        fn max_duty_cycle(&self) -> u16 {
            self.timer.top()
        }

        fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
            self.timer.set_compare(self.channel, duty)
        }
    }
}
