//! Support for the `HT8574` "8-Bit I/O Expander for I2C Bus" (PCF8574 compatible)
//!
//! The chip has no registers and no direction control: writing a byte sets the output latches,
//! reading a byte samples the pins.  A pin works as an input when its latch is high (weak
//! pull-up), so pins switched to input get their latch released high.
use crate::I2cExt;

/// Address of a `HT8574` with the given address pin levels.
///
/// Unlike the `PCF8574`, the addresses are not contiguous.
pub const fn address(a0: bool, a1: bool, a2: bool) -> u8 {
    match ((a2 as u8) << 2) | ((a1 as u8) << 1) | (a0 as u8) {
        0b000 => 0x38,
        other => 0x28 | other,
    }
}

/// `HT8574` driver
pub struct Ht8574<I2C> {
    i2c: I2C,
    addr: u8,
    out: u8,
    dir: u8,
}

impl<I2C> Ht8574<I2C> {
    pub fn new(i2c: I2C, addr: u8) -> Self {
        Self {
            i2c,
            addr,
            out: 0xff,
            dir: 0xff,
        }
    }

    /// Byte that goes on the wire: inputs always released high.
    fn latches(out: u8, dir: u8) -> u8 {
        out | !dir
    }
}

impl<I2C: crate::I2cBus> crate::PortDriver for Ht8574<I2C> {
    type Error = I2C::BusError;

    const IO_COUNT: u8 = 8;

    fn read_input(&mut self) -> Result<u32, Self::Error> {
        Ok(self.i2c.read_byte(self.addr)? as u32)
    }

    fn write_output(&mut self, value: u32) -> Result<(), Self::Error> {
        let out = value as u8;
        self.i2c
            .write_byte(self.addr, Self::latches(out, self.dir))?;
        self.out = out;
        Ok(())
    }

    fn read_output(&mut self) -> Result<u32, Self::Error> {
        Ok(self.out as u32)
    }

    fn write_direction(&mut self, value: u32) -> Result<(), Self::Error> {
        let dir = value as u8;
        let previous = Self::latches(self.out, self.dir);
        let next = Self::latches(self.out, dir);
        if next != previous {
            self.i2c.write_byte(self.addr, next)?;
        }
        self.dir = dir;
        Ok(())
    }

    fn read_direction(&mut self) -> Result<u32, Self::Error> {
        Ok(self.dir as u32)
    }

    fn reset(&mut self) -> Result<(), Self::Error> {
        self.dir = 0xff;
        self.write_output(0xff)
    }
}

impl<I2C: crate::I2cBus, D> crate::dev::Chip<I2C, D> for Ht8574<I2C> {
    const NAME: &'static str = "HT8574";

    fn sub_addresses(address: u8) -> crate::dev::SubAddresses {
        crate::dev::single_address(address)
    }

    fn create(i2c: I2C, _delay: D, address: u8) -> Self {
        Self::new(i2c, address)
    }

    fn release(self) -> I2C {
        self.i2c
    }
}
