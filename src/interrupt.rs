//! Hand-off from a timer's interrupt vector to the callback registered for it.
//!
//! The application declares one `InterruptBridge` per vector as a `static`, passes it to the
//! timer it belongs to, and calls [`InterruptBridge::on_interrupt`] from the vector:
//!
//! ```rust,ignore
//! static TIMER1_OVF_BRIDGE: InterruptBridge = InterruptBridge::new();
//!
//! #[avr_device::interrupt(atmega328p)]
//! fn TIMER1_OVF() {
//!     TIMER1_OVF_BRIDGE.on_interrupt();
//! }
//! ```

use core::cell::Cell;

use critical_section::Mutex;

/// Function run when a timer event fires. Runs in interrupt context; must not block.
pub type TimerCallback = fn();

/// The hardware event a timer interrupts on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimerEvent {
    /// The counter reached BOTTOM (symmetric modes) or MAX, and wrapped. `TOIEn`.
    Overflow,
    /// The counter matched `OCRnA`. `OCIEnA`.
    CompareMatchA,
}

impl TimerEvent {
    /// The event's enable bit in `TIMSKn`.
    pub const fn enable_bit(&self) -> u8 {
        match self {
            Self::Overflow => 0,
            Self::CompareMatchA => 1,
        }
    }

    /// Resetting the counter parks it on the value that raises an overflow flag, so the
    /// interrupt must not be enabled until the counter has moved on.
    pub const fn needs_start_guard(&self) -> bool {
        matches!(self, Self::Overflow)
    }
}

/// Holds at most one callback for one interrupt vector.
///
/// The timer writes the callback from normal code; the vector only reads it.
pub struct InterruptBridge {
    callback: Mutex<Cell<Option<TimerCallback>>>,
}

impl InterruptBridge {
    pub const fn new() -> Self {
        Self {
            callback: Mutex::new(Cell::new(None)),
        }
    }

    /// Replace the registered callback.
    pub fn attach(&self, callback: TimerCallback) {
        critical_section::with(|cs| self.callback.borrow(cs).set(Some(callback)));
    }

    /// Remove the registered callback. Events that still fire become no-ops.
    pub fn detach(&self) {
        critical_section::with(|cs| self.callback.borrow(cs).set(None));
    }

    pub fn is_attached(&self) -> bool {
        critical_section::with(|cs| self.callback.borrow(cs).get().is_some())
    }

    /// Run the registered callback, if there is one. Call this from the interrupt vector.
    pub fn on_interrupt(&self) {
        let callback = critical_section::with(|cs| self.callback.borrow(cs).get());
        if let Some(callback) = callback {
            callback();
        }
    }
}

impl Default for InterruptBridge {
    fn default() -> Self {
        Self::new()
    }
}
