use embedded_hal::digital::PinState;

use crate::Error;

/// Register-level contract every chip driver implements.
///
/// Values are pin bitmaps: bit `n` corresponds to pin `n`.  Drivers only move register contents
/// between the host and the chip; the pin-oriented algorithms on top (`set_direction`,
/// `set_level`, `get_level`) are provided here and shared by all chips.
pub trait PortDriver {
    type Error;

    /// Number of pins of the chip.
    const IO_COUNT: u8;

    /// Whether a `0` bit in the direction register means output.
    const DIR_OUT_BIT_ZERO: bool = false;

    fn read_input(&mut self) -> Result<u32, Self::Error>;
    fn write_output(&mut self, value: u32) -> Result<(), Self::Error>;
    fn read_output(&mut self) -> Result<u32, Self::Error>;
    fn write_direction(&mut self, value: u32) -> Result<(), Self::Error>;
    fn read_direction(&mut self) -> Result<u32, Self::Error>;

    /// Bring the chip back into its documented default state.
    fn reset(&mut self) -> Result<(), Self::Error>;

    /// Set the direction for all pins in `mask` to direction `dir`.
    ///
    /// The direction register is only written when its value actually changes.
    fn set_direction(&mut self, mask: u32, dir: Direction) -> Result<(), Self::Error> {
        let current = self.read_direction()?;
        let set_bits = (dir == Direction::Output) != Self::DIR_OUT_BIT_ZERO;
        let next = if set_bits {
            current | mask
        } else {
            current & !mask
        };
        if next != current {
            self.write_direction(next)?;
        }
        Ok(())
    }

    /// Drive all pins in `mask` to `level`.
    ///
    /// Every pin in `mask` must be configured as an output.  The output register is only
    /// written when its value actually changes.
    fn set_level(&mut self, mask: u32, level: PinState) -> Result<(), Error<Self::Error>> {
        let dir = self.read_direction().map_err(Error::Transport)?;
        for pin in 0..Self::IO_COUNT {
            let bit = 1 << pin;
            if mask & bit != 0 && !is_output::<Self>(dir, bit) {
                log::error!("Pin[{}] can't set level in input mode", pin);
                return Err(Error::PinNotOutput(pin));
            }
        }

        let current = self.read_output().map_err(Error::Transport)?;
        let next = match level {
            PinState::High => current | mask,
            PinState::Low => current & !mask,
        };
        if next != current {
            self.write_output(next).map_err(Error::Transport)?;
        }
        Ok(())
    }

    /// Sample the input level of all pins in `mask`.  Bits outside `mask` are always 0.
    fn get_level(&mut self, mask: u32) -> Result<u32, Self::Error> {
        Ok(self.read_input()? & mask)
    }
}

pub(crate) fn is_output<PD: PortDriver + ?Sized>(dir_reg: u32, bit: u32) -> bool {
    (dir_reg & bit != 0) != PD::DIR_OUT_BIT_ZERO
}

/// Bitmap covering every pin of a chip with `io_count` pins.
pub(crate) const fn io_mask(io_count: u8) -> u32 {
    ((1u64 << io_count) - 1) as u32
}

/// Raw mode value for an input pin, as used by Arduino-style code.
pub const INPUT: u8 = 0x01;
/// Raw mode value for an output pin, as used by Arduino-style code.
pub const OUTPUT: u8 = 0x03;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Input,
    Output,
}

/// A raw mode value that is neither [`INPUT`] nor [`OUTPUT`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidMode(pub u8);

impl TryFrom<u8> for Direction {
    type Error = InvalidMode;

    fn try_from(mode: u8) -> Result<Self, Self::Error> {
        match mode {
            INPUT => Ok(Direction::Input),
            OUTPUT => Ok(Direction::Output),
            other => Err(InvalidMode(other)),
        }
    }
}

impl<E> From<InvalidMode> for Error<E> {
    fn from(m: InvalidMode) -> Self {
        Error::InvalidMode(m.0)
    }
}

/// Uniform pin-oriented interface shared by every expander, whatever the chip.
pub trait DigitalPort {
    type Error: embedded_hal::digital::Error;

    fn pin_mode(&mut self, pin: u8, dir: Direction) -> Result<(), Self::Error>;
    fn digital_write(&mut self, pin: u8, level: PinState) -> Result<(), Self::Error>;
    fn digital_read(&mut self, pin: u8) -> Result<PinState, Self::Error>;
    /// Level the pin is currently being driven to.
    fn output_state(&mut self, pin: u8) -> Result<PinState, Self::Error>;
}

/// Pin Modes
pub mod mode {
    /// Trait for pin-modes which can be used to set a logic level.
    pub trait HasOutput {}
    /// Trait for pin-modes which can be used to read a logic level.
    pub trait HasInput {}

    /// Pin configured as an input.
    pub struct Input;
    impl HasInput for Input {}

    /// Pin configured as an output.
    pub struct Output;
    impl HasOutput for Output {}
}
