use core::marker::PhantomData;
use embedded_hal::digital::{self as hal_digital, PinState};

use crate::{mode, DigitalPort, Direction, PortMutex};

/// Representation of a single expander pin.
///
/// A `Pin` borrows the mutex-wrapped expander, so any number of pins (of one or several
/// expanders) can be handed out at the same time.  The mode is tracked in the type: only
/// [`mode::Output`] pins can be driven, only [`mode::Input`] pins can be read.
pub struct Pin<'a, MODE, MUTEX> {
    pin: u8,
    port: &'a MUTEX,
    _m: PhantomData<MODE>,
}

impl<'a, MODE, MUTEX, P> Pin<'a, MODE, MUTEX>
where
    P: DigitalPort,
    MUTEX: PortMutex<Port = P>,
{
    fn configure<NEW>(
        pin: u8,
        port: &'a MUTEX,
        dir: Direction,
    ) -> Result<Pin<'a, NEW, MUTEX>, P::Error> {
        port.lock(|p| p.pin_mode(pin, dir))?;
        Ok(Pin {
            pin,
            port,
            _m: PhantomData,
        })
    }

    pub fn pin_number(&self) -> u8 {
        self.pin
    }

    pub fn into_input(self) -> Result<Pin<'a, mode::Input, MUTEX>, P::Error> {
        Self::configure(self.pin, self.port, Direction::Input)
    }

    pub fn into_output(self) -> Result<Pin<'a, mode::Output, MUTEX>, P::Error> {
        Self::configure(self.pin, self.port, Direction::Output)
    }
}

impl<'a, MUTEX, P> Pin<'a, mode::Input, MUTEX>
where
    P: DigitalPort,
    MUTEX: PortMutex<Port = P>,
{
    /// Switch `pin` of the expander in `port` to input.
    pub fn new_input(pin: u8, port: &'a MUTEX) -> Result<Self, P::Error> {
        Self::configure(pin, port, Direction::Input)
    }
}

impl<'a, MUTEX, P> Pin<'a, mode::Output, MUTEX>
where
    P: DigitalPort,
    MUTEX: PortMutex<Port = P>,
{
    /// Switch `pin` of the expander in `port` to output.
    ///
    /// The pin keeps driving whatever level its output latch holds.
    pub fn new_output(pin: u8, port: &'a MUTEX) -> Result<Self, P::Error> {
        Self::configure(pin, port, Direction::Output)
    }
}

impl<'a, MODE: mode::HasInput, MUTEX, P> Pin<'a, MODE, MUTEX>
where
    P: DigitalPort,
    MUTEX: PortMutex<Port = P>,
{
    pub fn is_high(&self) -> Result<bool, P::Error> {
        let level = self.port.lock(|p| p.digital_read(self.pin))?;
        Ok(level == PinState::High)
    }

    pub fn is_low(&self) -> Result<bool, P::Error> {
        Ok(!self.is_high()?)
    }
}

impl<'a, MODE: mode::HasOutput, MUTEX, P> Pin<'a, MODE, MUTEX>
where
    P: DigitalPort,
    MUTEX: PortMutex<Port = P>,
{
    pub fn set_state(&mut self, state: PinState) -> Result<(), P::Error> {
        self.port.lock(|p| p.digital_write(self.pin, state))
    }

    pub fn set_high(&mut self) -> Result<(), P::Error> {
        self.set_state(PinState::High)
    }

    pub fn set_low(&mut self) -> Result<(), P::Error> {
        self.set_state(PinState::Low)
    }

    pub fn is_set_high(&self) -> Result<bool, P::Error> {
        let level = self.port.lock(|p| p.output_state(self.pin))?;
        Ok(level == PinState::High)
    }

    pub fn is_set_low(&self) -> Result<bool, P::Error> {
        Ok(!self.is_set_high()?)
    }

    pub fn toggle(&mut self) -> Result<(), P::Error> {
        self.port.lock(|p| {
            let level = p.output_state(self.pin)?;
            p.digital_write(self.pin, !level)
        })
    }
}

impl<'a, MODE, MUTEX, P> hal_digital::ErrorType for Pin<'a, MODE, MUTEX>
where
    P: DigitalPort,
    MUTEX: PortMutex<Port = P>,
{
    type Error = P::Error;
}

impl<'a, MODE: mode::HasInput, MUTEX, P> hal_digital::InputPin for Pin<'a, MODE, MUTEX>
where
    P: DigitalPort,
    MUTEX: PortMutex<Port = P>,
{
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Pin::is_high(self)
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Pin::is_low(self)
    }
}

impl<'a, MODE: mode::HasOutput, MUTEX, P> hal_digital::OutputPin for Pin<'a, MODE, MUTEX>
where
    P: DigitalPort,
    MUTEX: PortMutex<Port = P>,
{
    fn set_low(&mut self) -> Result<(), Self::Error> {
        Pin::set_low(self)
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        Pin::set_high(self)
    }

    fn set_state(&mut self, state: PinState) -> Result<(), Self::Error> {
        Pin::set_state(self, state)
    }
}

impl<'a, MODE: mode::HasOutput, MUTEX, P> hal_digital::StatefulOutputPin for Pin<'a, MODE, MUTEX>
where
    P: DigitalPort,
    MUTEX: PortMutex<Port = P>,
{
    fn is_set_high(&mut self) -> Result<bool, Self::Error> {
        Pin::is_set_high(self)
    }

    fn is_set_low(&mut self) -> Result<bool, Self::Error> {
        Pin::is_set_low(self)
    }

    fn toggle(&mut self) -> Result<(), Self::Error> {
        Pin::toggle(self)
    }
}
