//! Provides support for the 8 and 16-bit timer/counters: periodic interrupts, elapsed time
//! within the current period, and PWM on the compare outputs.
//!
//! One [`Timer`] drives one hardware counter. Which counter, and in which mode, is
//! described by a [`TimerLayout`]; the driver code is the same for all of them.
//!
//! ```rust,ignore
//! static TIMER1_OVF_BRIDGE: InterruptBridge = InterruptBridge::new();
//!
//! let port = unsafe { MmioPort::new(&TIMER1_REGS) };
//! let mut timer = Timer::new_timer1_pwm(port, &Clocks::default(), &TIMER1_OVF_BRIDGE);
//!
//! timer.init(20_000, None)?;
//! timer.enable_pwm(PwmChannel::A, 1 << 15, None)?; // 50%
//! timer.start()?;
//! ```

use paste::paste;

use crate::{
    clocks::Clocks,
    error::Result,
    interrupt::{InterruptBridge, TimerCallback},
    regs::Register,
    traits::{ClockCfg, ClocksValid, RegisterPort},
};

mod counter;
mod layout;
mod prescaler;
mod pwm;

pub use counter::{CountDir, CounterSnapshot, linearize, ticks_to_us};
pub use layout::{
    ChannelLayout, Counting, TIMER1_CTC, TIMER1_PWM, TIMER2_CTC, TIMER2_PWM, TimerLayout,
};
pub use prescaler::{ClockSelect, PeriodSettings, calc_period_vals};
#[cfg(feature = "embedded_hal")]
pub use pwm::PwmOutput;
pub use pwm::{PwmChannel, duty_to_compare};

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimerError {
    /// The operation isn't allowed in the timer's current state.
    StateViolation,
    /// The requested period or duty cycle can't be represented. For periods, the timer
    /// is still configured, with the longest period available.
    RangeViolation,
    /// Missing callback, or a channel this timer doesn't have.
    InvalidArgument,
}

/// Lifecycle of a timer. Operations that aren't valid in the current state fail with
/// `TimerError::StateViolation` and change nothing.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimerState {
    Uninitialized,
    /// Only seen during `init`.
    Initializing,
    /// Configured, with no clock applied.
    Ready,
    Running,
    Stopped,
}

/// Represents a timer/counter peripheral.
pub struct Timer<P> {
    port: P,
    layout: &'static TimerLayout,
    /// Timer clock speed, in Hz.
    clock_speed: u32,
    bridge: &'static InterruptBridge,
    state: TimerState,
    /// Applied on `start` and `resume`. Written to the hardware right away only while running.
    clock_select: ClockSelect,
    /// Last duty set per channel, re-applied when the period changes.
    duties: [Option<u32>; 2],
    /// The way the counter was moving when it was stopped. A stopped counter can't be
    /// watched to find out.
    stopped_direction: CountDir,
}

macro_rules! layout_constructors {
    ($($LAYOUT:ident),+ $(,)?) => {
        paste! {
            impl<P: RegisterPort> Timer<P> {
                $(
                    #[doc = concat!("Create a timer using the [`", stringify!($LAYOUT), "`] layout.")]
                    pub fn [<new_ $LAYOUT:lower>](
                        port: P,
                        clocks: &Clocks,
                        bridge: &'static InterruptBridge,
                    ) -> Self {
                        Self::new(port, &$LAYOUT, clocks, bridge)
                    }
                )+
            }
        }
    };
}

layout_constructors!(TIMER1_CTC, TIMER1_PWM, TIMER2_CTC, TIMER2_PWM);

impl<P: RegisterPort> Timer<P> {
    /// Create a timer in the `Uninitialized` state. Nothing is written to the hardware
    /// until `init`. `bridge` must be the one the layout's interrupt vector dispatches to.
    pub fn new(
        port: P,
        layout: &'static TimerLayout,
        clocks: &Clocks,
        bridge: &'static InterruptBridge,
    ) -> Self {
        if clocks.validate_speeds() == ClocksValid::NotValid {
            warn!(
                "{}: {} Hz timer clock; elapsed times will be approximate",
                layout.name,
                clocks.timer_clock()
            );
        }

        Self {
            port,
            layout,
            clock_speed: clocks.timer_clock(),
            bridge,
            state: TimerState::Uninitialized,
            clock_select: ClockSelect::NoClock,
            duties: [None; 2],
            stopped_direction: CountDir::Up,
        }
    }

    /// Configure the timer's mode and period, and optionally register a callback. Only
    /// valid once, from `Uninitialized`. Leaves the timer `Ready`, without a clock.
    ///
    /// A period longer than the timer can count returns `RangeViolation`, but the
    /// timer is still set up with its longest period and left `Ready`.
    pub fn init(&mut self, period_us: u32, callback: Option<TimerCallback>) -> Result<()> {
        if self.state != TimerState::Uninitialized {
            return Err(TimerError::StateViolation.into());
        }
        self.state = TimerState::Initializing;

        self.port.write(Register::ControlA, 0);
        self.port.write(Register::ControlB, 0);
        for &(reg, bit) in self.layout.mode_bits {
            self.port.write_bit(reg, bit, true);
        }

        let mut result = self.set_period(period_us);
        if callback.is_some() {
            result = result.and(self.attach_interrupt(callback));
        }

        self.state = TimerState::Ready;
        debug!("{}: initialized, {}us period", self.layout.name, period_us);
        result
    }

    /// Set the timer period, in µs. The new clock select and TOP are written together.
    /// If the timer isn't running, the clock select is kept for the next `start` or
    /// `resume`.
    ///
    /// Duty cycles set with `set_pwm_duty` are re-applied against the new TOP.
    pub fn set_period(&mut self, period_us: u32) -> Result<()> {
        let layout = self.layout;
        let settings = calc_period_vals(
            period_us,
            self.clock_speed,
            layout.resolution,
            layout.prescalers,
            layout.is_symmetric(),
        );

        self.apply_period(settings);

        if settings.clamped {
            warn!("{}: {}us period out of range, clamped", layout.name, period_us);
            return Err(TimerError::RangeViolation.into());
        }
        Ok(())
    }

    /// Reset the counter and apply the clock. If a callback is attached, the timer's
    /// interrupt is enabled too.
    pub fn start(&mut self) -> Result<()> {
        if !matches!(self.state, TimerState::Ready | TimerState::Stopped) {
            return Err(TimerError::StateViolation.into());
        }

        self.reset_count();
        self.write_clock_select(self.clock_select);

        if self.bridge.is_attached() {
            // The overflow flag is raised at BOTTOM, which is where the reset left the
            // counter. Wait for it to leave before unmasking. With a TOP of 0 it never
            // does.
            if self.layout.event.needs_start_guard() && self.top() != 0 {
                if let Err(e) = self.wait_for_count_change(0) {
                    self.write_clock_select(ClockSelect::NoClock);
                    return Err(e);
                }
            }
            self.enable_interrupt();
        }

        self.state = TimerState::Running;
        debug!("{}: running", self.layout.name);
        Ok(())
    }

    /// Remove the clock. The counter holds its value; the configuration is kept.
    /// Allowed in any state.
    ///
    /// A running symmetric counter is watched for one tick first, so reads while stopped
    /// can tell which half of the period it stopped in.
    pub fn stop(&mut self) {
        self.stopped_direction = match self.state {
            TimerState::Running => self.halt().unwrap_or_else(|_| {
                warn!("{}: counter frozen, direction unknown", self.layout.name);
                CountDir::Up
            }),
            TimerState::Stopped => {
                self.write_clock_select(ClockSelect::NoClock);
                self.stopped_direction
            }
            _ => {
                self.write_clock_select(ClockSelect::NoClock);
                CountDir::Up
            }
        };
        self.state = TimerState::Stopped;
        debug!("{}: stopped", self.layout.name);
    }

    /// Re-apply the clock after `stop`, continuing from the held count.
    pub fn resume(&mut self) -> Result<()> {
        if self.state != TimerState::Stopped {
            return Err(TimerError::StateViolation.into());
        }

        self.write_clock_select(self.clock_select);
        self.state = TimerState::Running;
        Ok(())
    }

    /// Register the callback run on each timer event, replacing any previous one.
    /// `None` is rejected with `InvalidArgument`. The interrupt is enabled now if the
    /// timer is running, otherwise on the next `start`.
    pub fn attach_interrupt(&mut self, callback: Option<TimerCallback>) -> Result<()> {
        let Some(callback) = callback else {
            return Err(TimerError::InvalidArgument.into());
        };

        self.bridge.attach(callback);
        if self.state == TimerState::Running {
            self.enable_interrupt();
        }
        debug!("{}: callback attached", self.layout.name);
        Ok(())
    }

    /// Disable the timer's interrupt and remove the callback. Allowed in any state.
    pub fn detach_interrupt(&mut self) {
        self.disable_interrupt();
        self.bridge.detach();
        debug!("{}: callback detached", self.layout.name);
    }

    pub fn is_interrupt_attached(&self) -> bool {
        self.bridge.is_attached()
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    /// The clock select in effect while running.
    pub fn clock_select(&self) -> ClockSelect {
        self.clock_select
    }

    pub fn layout(&self) -> &'static TimerLayout {
        self.layout
    }

    pub fn port(&self) -> &P {
        &self.port
    }

    /// Release the register port.
    pub fn free(self) -> P {
        self.port
    }

    fn enable_interrupt(&mut self) {
        let bit = self.layout.event.enable_bit();
        critical_section::with(|_| self.port.write_bit(Register::InterruptMask, bit, true));
    }

    fn disable_interrupt(&mut self) {
        let bit = self.layout.event.enable_bit();
        critical_section::with(|_| self.port.write_bit(Register::InterruptMask, bit, false));
    }
}
