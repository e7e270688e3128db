use embedded_hal::delay::DelayNs;
use embedded_hal::i2c as hal_i2c;

use crate::config::{DeviceFullConfig, HostFullConfig, HostId};

/// Blanket trait for types implementing `i2c::I2c` with 7-bit addresses
pub trait I2cBus: hal_i2c::ErrorType + hal_i2c::I2c<hal_i2c::SevenBitAddress> {
    type BusError: From<Self::Error> + core::fmt::Debug;
}

impl<T, E> I2cBus for T
where
    T: hal_i2c::ErrorType<Error = E> + hal_i2c::I2c<hal_i2c::SevenBitAddress>,
    E: hal_i2c::Error,
{
    type BusError = E;
}

/// Error type of the bus handed out by host `H`.
pub type BusError<H> = <<H as I2cHost>::Bus as I2cBus>::BusError;

/// Management side of an I2C bus controller.
///
/// The byte transactions themselves go through [`embedded_hal::i2c::I2c`] on the bus handle;
/// this trait covers what happens around them: bringing the controller up or down and
/// registering the device addresses that will be talked to.  No retries are expected at this
/// level, a failed call is reported as-is.
pub trait I2cHost {
    /// Handle for issuing transactions on the bus.
    type Bus: I2cBus;
    /// Blocking delay source, used for hardware settle times.
    type Delay: DelayNs;

    /// Install and configure bus controller `id`.  The expander owns the result.
    fn create_bus(
        &mut self,
        id: HostId,
        config: &HostFullConfig,
    ) -> Result<Self::Bus, BusError<Self>>;

    /// Obtain a handle to bus controller `id`, which was installed by somebody else.
    fn attach_bus(&mut self, id: HostId) -> Result<Self::Bus, BusError<Self>>;

    /// Uninstall bus controller `id`, previously created with [`I2cHost::create_bus`].
    fn destroy_bus(&mut self, id: HostId, bus: &mut Self::Bus) -> Result<(), BusError<Self>>;

    /// Register a device address on bus `id`.
    fn add_device(&mut self, id: HostId, config: &DeviceFullConfig)
        -> Result<(), BusError<Self>>;

    /// Remove a device address previously registered with [`I2cHost::add_device`].
    fn remove_device(&mut self, id: HostId, address: u8) -> Result<(), BusError<Self>>;

    fn delay(&mut self) -> Self::Delay;
}

pub(crate) trait I2cExt {
    type Error;

    fn write_byte(&mut self, addr: u8, value: u8) -> Result<(), Self::Error>;
    fn read_byte(&mut self, addr: u8) -> Result<u8, Self::Error>;
    fn write_reg<R: Into<u8>>(&mut self, addr: u8, reg: R, value: u8) -> Result<(), Self::Error>;
    fn write_reg16<R: Into<u8>>(
        &mut self,
        addr: u8,
        reg: R,
        value: u16,
    ) -> Result<(), Self::Error>;
    fn read_reg<R: Into<u8>>(&mut self, addr: u8, reg: R) -> Result<u8, Self::Error>;
    fn read_reg16<R: Into<u8>>(&mut self, addr: u8, reg: R) -> Result<u16, Self::Error>;
}

impl<I2C: I2cBus> I2cExt for I2C {
    type Error = I2C::BusError;

    fn write_byte(&mut self, addr: u8, value: u8) -> Result<(), Self::Error> {
        log::trace!("write {:#04x} <- {:#04x}", addr, value);
        self.write(addr, &[value])?;
        Ok(())
    }

    fn read_byte(&mut self, addr: u8) -> Result<u8, Self::Error> {
        let mut buf = [0x00];
        self.read(addr, &mut buf)?;
        log::trace!("read {:#04x} -> {:#04x}", addr, buf[0]);
        Ok(buf[0])
    }

    fn write_reg<R: Into<u8>>(&mut self, addr: u8, reg: R, value: u8) -> Result<(), Self::Error> {
        let reg = reg.into();
        log::trace!("write {:#04x}[{:#04x}] <- {:#04x}", addr, reg, value);
        self.write(addr, &[reg, value])?;
        Ok(())
    }

    fn write_reg16<R: Into<u8>>(
        &mut self,
        addr: u8,
        reg: R,
        value: u16,
    ) -> Result<(), Self::Error> {
        let reg = reg.into();
        log::trace!("write {:#04x}[{:#04x}] <- {:#06x}", addr, reg, value);
        let [lo, hi] = value.to_le_bytes();
        self.write(addr, &[reg, lo, hi])?;
        Ok(())
    }

    fn read_reg<R: Into<u8>>(&mut self, addr: u8, reg: R) -> Result<u8, Self::Error> {
        let mut buf = [0x00];
        self.write_read(addr, &[reg.into()], &mut buf)?;
        Ok(buf[0])
    }

    fn read_reg16<R: Into<u8>>(&mut self, addr: u8, reg: R) -> Result<u16, Self::Error> {
        let mut buf = [0x00; 2];
        self.write_read(addr, &[reg.into()], &mut buf)?;
        Ok(u16::from_le_bytes(buf))
    }
}
