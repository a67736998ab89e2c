//! Error type shared by the coordination layer
//!
//! Nothing in this crate is fatal. Producers log an [`Error`] and carry on
//! with their next period.

use core::fmt;

/// Failures surfaced by the output path and by bounded waits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// The device stayed busy for the whole retry budget
    DeviceBusy { attempts: u32 },
    /// The serial driver reported a non-transient failure
    Device,
    /// A bounded wait elapsed before its condition was met
    Timeout,
    /// A formatted message did not fit its fixed-size buffer
    MessageTooLong,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::DeviceBusy { attempts } => {
                write!(f, "device still busy after {} attempts", attempts)
            }
            Error::Device => f.write_str("device error"),
            Error::Timeout => f.write_str("timed out"),
            Error::MessageTooLong => f.write_str("message exceeds buffer capacity"),
        }
    }
}

pub type Result<T> = core::result::Result<T, Error>;
