//! Support for the `CH422G` "I2C-bus 8-bit bidirectional and 4-bit output expander"
//!
//! The chip does not have register addresses.  Instead, each function answers on its own I2C
//! address: `WR_SET` (control), `WR_OC` (outputs OC0-OC3), `WR_IO` (outputs IO0-IO7) and
//! `RD_IO` (inputs IO0-IO7).  Only `RD_IO` can be read, so the driver keeps a shadow copy of
//! everything it wrote.
//!
//! Logical pins 0-7 are IO0-IO7, pins 8-11 are OC0-OC3.  IO0-IO7 share a single output-enable
//! bit, so their direction can only be switched as a whole.  OC0-OC3 are outputs only.
use embedded_hal::delay::DelayNs;

use crate::I2cExt;

const WR_SET: u8 = 0x48 >> 1;
const WR_OC: u8 = 0x46 >> 1;
const WR_IO: u8 = 0x70 >> 1;
const RD_IO: u8 = 0x4D >> 1;

// WR_SET bits: | - | - | - | - | SLEEP | OD_EN | A_SCAN | IO_OE |
const FLAG_IO_OE: u8 = 1;
#[allow(dead_code)]
const FLAG_A_SCAN: u8 = 1 << 1;
const FLAG_OD_EN: u8 = 1 << 2;
const FLAG_SLEEP: u8 = 1 << 3;

const SET_DEFAULT: u8 = FLAG_IO_OE;
const OC_DEFAULT: u8 = 0x0f;
const IO_DEFAULT: u8 = 0xff;

const OUTPUT_DEFAULT: u32 = ((OC_DEFAULT as u32) << 8) | IO_DEFAULT as u32;
const DIRECTION_DEFAULT: u32 = 0xfff;

const DIR_OUT_VALUE: u32 = 0xfff;
const DIR_IN_VALUE: u32 = 0xf00;

/// Address usually passed for the CH422G.  The chip ignores it, its sub-addresses are fixed.
pub const DEFAULT_ADDRESS: u8 = 0x24;

/// Time IO0-IO7 need after being switched to input before `RD_IO` reports valid levels.
pub const INPUT_SETTLE_MS: u32 = 2;

/// Last values written to the write-only registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Shadow {
    set: u8,
    oc: u8,
    io: u8,
}

impl Default for Shadow {
    fn default() -> Self {
        Self {
            set: SET_DEFAULT,
            oc: OC_DEFAULT,
            io: IO_DEFAULT,
        }
    }
}

/// `CH422G` driver
pub struct Ch422g<I2C, D> {
    i2c: I2C,
    delay: D,
    regs: Shadow,
}

impl<I2C, D> Ch422g<I2C, D>
where
    I2C: crate::I2cBus,
    D: DelayNs,
{
    pub fn new(i2c: I2C, delay: D) -> Self {
        Self {
            i2c,
            delay,
            regs: Shadow::default(),
        }
    }

    fn write_set(&mut self, data: u8) -> Result<(), I2C::BusError> {
        self.i2c.write_byte(WR_SET, data)?;
        self.regs.set = data;
        Ok(())
    }

    /// Drive OC0-OC3 as open-drain outputs.
    pub fn set_oc_open_drain(&mut self) -> Result<(), I2C::BusError> {
        self.write_set(self.regs.set | FLAG_OD_EN)
    }

    /// Drive OC0-OC3 as push-pull outputs.
    pub fn set_oc_push_pull(&mut self) -> Result<(), I2C::BusError> {
        self.write_set(self.regs.set & !FLAG_OD_EN)
    }

    /// Switch IO0-IO7 to input and wait until the inputs are valid.
    pub fn set_all_input(&mut self) -> Result<(), I2C::BusError> {
        self.write_set(self.regs.set & !FLAG_IO_OE)?;
        self.delay.delay_ms(INPUT_SETTLE_MS);
        Ok(())
    }

    /// Switch IO0-IO7 to output.
    pub fn set_all_output(&mut self) -> Result<(), I2C::BusError> {
        self.write_set(self.regs.set | FLAG_IO_OE)
    }

    pub fn enter_sleep(&mut self) -> Result<(), I2C::BusError> {
        self.write_set(self.regs.set | FLAG_SLEEP)
    }

    pub fn exit_sleep(&mut self) -> Result<(), I2C::BusError> {
        self.write_set(self.regs.set & !FLAG_SLEEP)
    }
}

impl<I2C, D> crate::PortDriver for Ch422g<I2C, D>
where
    I2C: crate::I2cBus,
    D: DelayNs,
{
    type Error = I2C::BusError;

    const IO_COUNT: u8 = 12;

    fn read_input(&mut self) -> Result<u32, Self::Error> {
        Ok(self.i2c.read_byte(RD_IO)? as u32)
    }

    /// Zero bytes are never sent: a group whose new value is `0x00` keeps its previous level
    /// on the chip and in the shadow.
    fn write_output(&mut self, value: u32) -> Result<(), Self::Error> {
        let oc = ((value & 0xf00) >> 8) as u8;
        let io = (value & 0xff) as u8;

        if oc != 0 {
            self.i2c.write_byte(WR_OC, oc)?;
            self.regs.oc = oc;
        }
        if io != 0 {
            self.i2c.write_byte(WR_IO, io)?;
            self.regs.io = io;
        }
        Ok(())
    }

    fn read_output(&mut self) -> Result<u32, Self::Error> {
        Ok(self.regs.io as u32 | ((self.regs.oc as u32) << 8))
    }

    fn write_direction(&mut self, value: u32) -> Result<(), Self::Error> {
        let group = (value & 0xff) as u8;
        if group != 0x00 && group != 0xff {
            log::warn!(
                "CH422G: IO0-IO7 share one direction, mask {:#04x} keeps all of them as outputs",
                group
            );
        }

        if group != 0 {
            self.write_set(self.regs.set | FLAG_IO_OE)
        } else {
            self.write_set(self.regs.set & !FLAG_IO_OE)?;
            self.delay.delay_ms(INPUT_SETTLE_MS);
            Ok(())
        }
    }

    fn read_direction(&mut self) -> Result<u32, Self::Error> {
        Ok(if self.regs.set & FLAG_IO_OE != 0 {
            DIR_OUT_VALUE
        } else {
            DIR_IN_VALUE
        })
    }

    fn reset(&mut self) -> Result<(), Self::Error> {
        // direction first, so the default levels land on driven pins
        self.write_direction(DIRECTION_DEFAULT)?;
        self.write_output(OUTPUT_DEFAULT)
    }
}

impl<I2C, D> crate::dev::Chip<I2C, D> for Ch422g<I2C, D>
where
    I2C: crate::I2cBus,
    D: DelayNs,
{
    const NAME: &'static str = "CH422G";

    fn sub_addresses(_address: u8) -> crate::dev::SubAddresses {
        [WR_SET, WR_OC, WR_IO, RD_IO].into_iter().collect()
    }

    fn create(i2c: I2C, delay: D, _address: u8) -> Self {
        Self::new(i2c, delay)
    }

    fn release(self) -> I2C {
        self.i2c
    }
}

#[cfg(test)]
mod tests {
    use embedded_hal::i2c::ErrorKind;
    use embedded_hal_mock::eh1::delay::{self as mock_delay, CheckedDelay};
    use embedded_hal_mock::eh1::i2c as mock_i2c;

    use super::*;
    use crate::PortDriver;

    #[test]
    fn sub_addresses() {
        use crate::dev::Chip;
        let addrs = <Ch422g<mock_i2c::Mock, CheckedDelay> as Chip<_, _>>::sub_addresses(0x55);
        assert_eq!(addrs.as_slice(), &[0x24, 0x23, 0x38, 0x26]);
    }

    #[test]
    fn reset_from_arbitrary_shadow() {
        let expectations = [
            // sleep and open-drain survive, output-enable gets set
            mock_i2c::Transaction::write(WR_SET, vec![0b00001101]),
            mock_i2c::Transaction::write(WR_OC, vec![0x0f]),
            mock_i2c::Transaction::write(WR_IO, vec![0xff]),
        ];
        let mut bus = mock_i2c::Mock::new(&expectations);
        let mut delay = CheckedDelay::new(&[]);

        let mut ch422g = Ch422g::new(bus.clone(), delay.clone());
        ch422g.regs = Shadow {
            set: FLAG_SLEEP | FLAG_OD_EN,
            oc: 0x03,
            io: 0x12,
        };

        ch422g.reset().unwrap();

        assert_eq!(ch422g.read_direction().unwrap(), 0xfff);
        assert_eq!(ch422g.read_output().unwrap(), 0xfff);
        assert_eq!(ch422g.regs.oc, 0x0f);
        assert_eq!(ch422g.regs.io, 0xff);
        assert_ne!(ch422g.regs.set & FLAG_IO_OE, 0);

        bus.done();
        delay.done();
    }

    #[test]
    fn output_skips_zero_groups() {
        let expectations = [
            mock_i2c::Transaction::write(WR_OC, vec![0x05]),
            mock_i2c::Transaction::write(WR_IO, vec![0xa5]),
            // 0x0a5: OC group is zero and skipped
            mock_i2c::Transaction::write(WR_IO, vec![0xa5]),
            // 0x300: IO group is zero and skipped
            mock_i2c::Transaction::write(WR_OC, vec![0x03]),
        ];
        let mut bus = mock_i2c::Mock::new(&expectations);
        let mut delay = CheckedDelay::new(&[]);

        let mut ch422g = Ch422g::new(bus.clone(), delay.clone());
        ch422g.write_output(0x5a5).unwrap();
        ch422g.write_output(0x0a5).unwrap();
        assert_eq!(ch422g.read_output().unwrap(), 0x5a5);

        ch422g.write_output(0x300).unwrap();
        assert_eq!(ch422g.read_output().unwrap(), 0x3a5);

        // nothing at all goes out for zero
        ch422g.write_output(0x000).unwrap();
        assert_eq!(ch422g.read_output().unwrap(), 0x3a5);

        bus.done();
        delay.done();
    }

    #[test]
    fn failed_write_keeps_shadow() {
        let expectations = [
            mock_i2c::Transaction::write(WR_OC, vec![0x01]),
            mock_i2c::Transaction::write(WR_IO, vec![0x10]).with_error(ErrorKind::Other),
            mock_i2c::Transaction::write(WR_SET, vec![0b00000101]).with_error(ErrorKind::Other),
        ];
        let mut bus = mock_i2c::Mock::new(&expectations);
        let mut delay = CheckedDelay::new(&[]);

        let mut ch422g = Ch422g::new(bus.clone(), delay.clone());
        assert_eq!(ch422g.write_output(0x110), Err(ErrorKind::Other));
        // OC went through before IO failed
        assert_eq!(ch422g.read_output().unwrap(), 0x1ff);

        assert_eq!(ch422g.set_oc_open_drain(), Err(ErrorKind::Other));
        assert_eq!(ch422g.regs.set, SET_DEFAULT);

        bus.done();
        delay.done();
    }

    #[test]
    fn control_bits() {
        let expectations = [
            mock_i2c::Transaction::write(WR_SET, vec![0b00000101]),
            mock_i2c::Transaction::write(WR_SET, vec![0b00001101]),
            mock_i2c::Transaction::write(WR_SET, vec![0b00001100]),
            mock_i2c::Transaction::write(WR_SET, vec![0b00001101]),
            mock_i2c::Transaction::write(WR_SET, vec![0b00001001]),
            mock_i2c::Transaction::write(WR_SET, vec![0b00000001]),
        ];
        let mut bus = mock_i2c::Mock::new(&expectations);
        let mut delay = CheckedDelay::new(&[mock_delay::Transaction::delay_ms(INPUT_SETTLE_MS)]);

        let mut ch422g = Ch422g::new(bus.clone(), delay.clone());
        ch422g.set_oc_open_drain().unwrap();
        ch422g.enter_sleep().unwrap();

        ch422g.set_all_input().unwrap();
        assert_eq!(ch422g.read_direction().unwrap(), 0xf00);

        ch422g.set_all_output().unwrap();
        assert_eq!(ch422g.read_direction().unwrap(), 0xfff);

        ch422g.set_oc_push_pull().unwrap();
        ch422g.exit_sleep().unwrap();

        bus.done();
        delay.done();
    }

    #[test]
    fn direction_is_all_or_nothing() {
        let expectations = [
            // any nonzero low byte enables all of IO0-IO7
            mock_i2c::Transaction::write(WR_SET, vec![0b00000001]),
            mock_i2c::Transaction::write(WR_SET, vec![0b00000000]),
            // OC bits alone don't count
            mock_i2c::Transaction::write(WR_SET, vec![0b00000000]),
        ];
        let mut bus = mock_i2c::Mock::new(&expectations);
        let mut delay = CheckedDelay::new(&[
            mock_delay::Transaction::delay_ms(INPUT_SETTLE_MS),
            mock_delay::Transaction::delay_ms(INPUT_SETTLE_MS),
        ]);

        let mut ch422g = Ch422g::new(bus.clone(), delay.clone());
        ch422g.write_direction(0x008).unwrap();
        assert_eq!(ch422g.read_direction().unwrap(), 0xfff);

        ch422g.write_direction(0x000).unwrap();
        assert_eq!(ch422g.read_direction().unwrap(), 0xf00);
        ch422g.write_direction(0xf00).unwrap();

        bus.done();
        delay.done();
    }

    #[test]
    fn input_reads_io_group_only() {
        let expectations = [
            mock_i2c::Transaction::read(RD_IO, vec![0b01000000]),
            mock_i2c::Transaction::read(RD_IO, vec![0b10111111]),
        ];
        let mut bus = mock_i2c::Mock::new(&expectations);
        let mut delay = CheckedDelay::new(&[]);

        let mut ch422g = Ch422g::new(bus.clone(), delay.clone());
        assert_eq!(ch422g.read_input().unwrap(), 0x040);
        assert_eq!(ch422g.get_level(0x0c0).unwrap(), 0x080);

        bus.done();
        delay.done();
    }

    #[test]
    fn reset_failing_midway_keeps_partial_shadow() {
        let expectations = [
            mock_i2c::Transaction::write(WR_SET, vec![0b00000001]),
            mock_i2c::Transaction::write(WR_OC, vec![0x0f]).with_error(ErrorKind::Other),
        ];
        let mut bus = mock_i2c::Mock::new(&expectations);
        let mut delay = CheckedDelay::new(&[]);

        let mut ch422g = Ch422g::new(bus.clone(), delay.clone());
        ch422g.regs = Shadow {
            set: 0x00,
            oc: 0x03,
            io: 0x12,
        };

        assert_eq!(ch422g.reset(), Err(ErrorKind::Other));
        // direction went out, outputs were never written
        assert_eq!(
            ch422g.regs,
            Shadow {
                set: SET_DEFAULT,
                oc: 0x03,
                io: 0x12,
            }
        );

        bus.done();
        delay.done();
    }
}
