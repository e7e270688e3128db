//! Support for the `TCA95xx` family of register-based I/O expanders
//!
//! - 8-bit: `TCA9554` / `TCA9554A` "Low Voltage 8-Bit I2C and SMBus I/O Expander"
//! - 16-bit: `TCA9555` / `TCA9539` "Low-Voltage 16-Bit I2C and SMBus I/O Expander"
//!
//! All of them use a `1` bit in the configuration register for input.  The output and
//! configuration registers are shadowed, only the input register is read from the chip.
use crate::I2cExt;

#[allow(dead_code)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Regs8 {
    InputPort = 0x00,
    OutputPort = 0x01,
    PolarityInversion = 0x02,
    Configuration = 0x03,
}

impl From<Regs8> for u8 {
    fn from(r: Regs8) -> u8 {
        r as u8
    }
}

/// Register pairs; the chip auto-increments from port 0 to port 1.
#[allow(dead_code)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Regs16 {
    InputPort0 = 0x00,
    OutputPort0 = 0x02,
    PolarityInversion0 = 0x04,
    Configuration0 = 0x06,
}

impl From<Regs16> for u8 {
    fn from(r: Regs16) -> u8 {
        r as u8
    }
}

/// Address of a `TCA9554` with the given address pin levels.
pub const fn tca9554_address(a0: bool, a1: bool, a2: bool) -> u8 {
    0x20 | ((a2 as u8) << 2) | ((a1 as u8) << 1) | (a0 as u8)
}

/// Address of a `TCA9554A` with the given address pin levels.
pub const fn tca9554a_address(a0: bool, a1: bool, a2: bool) -> u8 {
    0x38 | ((a2 as u8) << 2) | ((a1 as u8) << 1) | (a0 as u8)
}

/// Address of a `TCA9555` with the given address pin levels.
pub const fn tca9555_address(a0: bool, a1: bool, a2: bool) -> u8 {
    tca9554_address(a0, a1, a2)
}

/// Address of a `TCA9539` with the given address pin levels.
pub const fn tca9539_address(a0: bool, a1: bool) -> u8 {
    0x74 | ((a1 as u8) << 1) | (a0 as u8)
}

/// `TCA9554` / `TCA9554A` driver
pub struct Tca95xx8<I2C> {
    i2c: I2C,
    addr: u8,
    out: u8,
    dir: u8,
}

impl<I2C> Tca95xx8<I2C> {
    pub fn new(i2c: I2C, addr: u8) -> Self {
        Self {
            i2c,
            addr,
            out: 0xff,
            dir: 0xff,
        }
    }
}

impl<I2C: crate::I2cBus> crate::PortDriver for Tca95xx8<I2C> {
    type Error = I2C::BusError;

    const IO_COUNT: u8 = 8;
    const DIR_OUT_BIT_ZERO: bool = true;

    fn read_input(&mut self) -> Result<u32, Self::Error> {
        Ok(self.i2c.read_reg(self.addr, Regs8::InputPort)? as u32)
    }

    fn write_output(&mut self, value: u32) -> Result<(), Self::Error> {
        let value = value as u8;
        self.i2c.write_reg(self.addr, Regs8::OutputPort, value)?;
        self.out = value;
        Ok(())
    }

    fn read_output(&mut self) -> Result<u32, Self::Error> {
        Ok(self.out as u32)
    }

    fn write_direction(&mut self, value: u32) -> Result<(), Self::Error> {
        let value = value as u8;
        self.i2c.write_reg(self.addr, Regs8::Configuration, value)?;
        self.dir = value;
        Ok(())
    }

    fn read_direction(&mut self) -> Result<u32, Self::Error> {
        Ok(self.dir as u32)
    }

    fn reset(&mut self) -> Result<(), Self::Error> {
        self.write_direction(0xff)?;
        self.write_output(0xff)
    }
}

impl<I2C: crate::I2cBus, D> crate::dev::Chip<I2C, D> for Tca95xx8<I2C> {
    const NAME: &'static str = "TCA95xx_8bit";

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

/// `TCA9555` / `TCA9539` driver
pub struct Tca95xx16<I2C> {
    i2c: I2C,
    addr: u8,
    out: u16,
    dir: u16,
}

impl<I2C> Tca95xx16<I2C> {
    pub fn new(i2c: I2C, addr: u8) -> Self {
        Self {
            i2c,
            addr,
            out: 0xffff,
            dir: 0xffff,
        }
    }
}

impl<I2C: crate::I2cBus> crate::PortDriver for Tca95xx16<I2C> {
    type Error = I2C::BusError;

    const IO_COUNT: u8 = 16;
    const DIR_OUT_BIT_ZERO: bool = true;

    fn read_input(&mut self) -> Result<u32, Self::Error> {
        Ok(self.i2c.read_reg16(self.addr, Regs16::InputPort0)? as u32)
    }

    fn write_output(&mut self, value: u32) -> Result<(), Self::Error> {
        let value = value as u16;
        self.i2c.write_reg16(self.addr, Regs16::OutputPort0, value)?;
        self.out = value;
        Ok(())
    }

    fn read_output(&mut self) -> Result<u32, Self::Error> {
        Ok(self.out as u32)
    }

    fn write_direction(&mut self, value: u32) -> Result<(), Self::Error> {
        let value = value as u16;
        self.i2c
            .write_reg16(self.addr, Regs16::Configuration0, value)?;
        self.dir = value;
        Ok(())
    }

    fn read_direction(&mut self) -> Result<u32, Self::Error> {
        Ok(self.dir as u32)
    }

    fn reset(&mut self) -> Result<(), Self::Error> {
        self.write_direction(0xffff)?;
        self.write_output(0xffff)
    }
}

impl<I2C: crate::I2cBus, D> crate::dev::Chip<I2C, D> for Tca95xx16<I2C> {
    const NAME: &'static str = "TCA95xx_16bit";

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
