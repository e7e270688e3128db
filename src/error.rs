use thiserror::Error;

/// Errors returned by the expander lifecycle and pin operations.
///
/// `E` is the error type of the underlying I2C bus.  Chip drivers return `E` directly; the
/// lifecycle layer wraps it in [`Error::Transport`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error<E> {
    /// The operation is not allowed in the current lifecycle state.
    #[error("operation not allowed in this state: {0}")]
    Precondition(&'static str),
    /// `init()` was called on an already initialized expander.
    #[error("already initialized")]
    AlreadyInitialized,
    /// `begin()` was called on an expander that is already running.
    #[error("already begun")]
    AlreadyBegun,
    /// A device operation was called before `begin()`.
    #[error("not begun")]
    NotBegun,
    /// Pin index is not below the chip's pin count.
    #[error("invalid pin {0}")]
    InvalidPin(u8),
    /// Raw pin mode value is neither `INPUT` nor `OUTPUT`.
    #[error("invalid pin mode {0:#04x}")]
    InvalidMode(u8),
    /// Attempt to drive a level on a pin configured as input.
    #[error("pin {0} can't set level in input mode")]
    PinNotOutput(u8),
    /// No room left to track another device handle.
    #[error("out of device handle slots")]
    Allocation,
    /// Bus transaction or bus management call failed.
    #[error("bus transaction failed: {0:?}")]
    Transport(E),
}

impl<E> Error<E> {
    /// Whether this error reports lifecycle misuse rather than a bad argument, a pin
    /// configuration problem or a bus fault.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            Error::Precondition(_)
                | Error::AlreadyInitialized
                | Error::AlreadyBegun
                | Error::NotBegun
        )
    }
}

impl<E: core::fmt::Debug> embedded_hal::digital::Error for Error<E> {
    fn kind(&self) -> embedded_hal::digital::ErrorKind {
        embedded_hal::digital::ErrorKind::Other
    }
}

#[cfg(test)]
mod tests {
    use super::Error;
    use embedded_hal::i2c::ErrorKind;

    #[test]
    fn precondition_grouping() {
        assert!(Error::<ErrorKind>::NotBegun.is_precondition());
        assert!(Error::<ErrorKind>::AlreadyInitialized.is_precondition());
        assert!(Error::<ErrorKind>::Precondition("configured").is_precondition());
        assert!(!Error::<ErrorKind>::InvalidPin(12).is_precondition());
        assert!(!Error::<ErrorKind>::PinNotOutput(3).is_precondition());
        assert!(!Error::Transport(ErrorKind::Other).is_precondition());
    }

    #[test]
    fn display() {
        assert_eq!(Error::<ErrorKind>::InvalidPin(13).to_string(), "invalid pin 13");
        assert_eq!(Error::<ErrorKind>::InvalidMode(2).to_string(), "invalid pin mode 0x02");
        assert_eq!(
            Error::Transport(ErrorKind::Other).to_string(),
            "bus transaction failed: Other"
        );
    }
}
