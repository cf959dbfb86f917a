//! Common error definitions.

use core::fmt;

use crate::timer::TimerError;

macro_rules! impl_from_error {
    ($error:ident) => {
        impl From<$error> for Error {
            fn from(error: $error) -> Self {
                Self::$error(error)
            }
        }
    };
}

/// Alias for Result<T, Error>.
pub type Result<T> = core::result::Result<T, Error>;

/// Collection of all errors that can occur.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Occurs when an expected change of a register does not happen in time.
    ///
    /// This is returned when a bounded loop exceeds its allotted iteration count.
    RegisterUnchanged,
    TimerError(TimerError),
}

impl_from_error!(TimerError);

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RegisterUnchanged => write!(f, "register did not change in time"),
            Self::TimerError(TimerError::StateViolation) => {
                write!(f, "operation not permitted in the current timer state")
            }
            Self::TimerError(TimerError::RangeViolation) => {
                write!(f, "period or duty cycle out of range")
            }
            Self::TimerError(TimerError::InvalidArgument) => write!(f, "invalid argument"),
        }
    }
}

#[cfg(feature = "embedded_hal")]
mod embedded_hal_impl {
    use embedded_hal::pwm::{Error as PwmEhError, ErrorKind as PwmErrorKind};

    use super::Error;

    impl PwmEhError for Error {
        fn kind(&self) -> PwmErrorKind {
            PwmErrorKind::Other
        }
    }
}
