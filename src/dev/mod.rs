//! The device module contains the internals for each of the supported port expanders.
//!
//! In most cases you will not need anything from here explicitly, the [`Expander`][crate::Expander]
//! wrapper and the exposed types at the root of the crate should be enough.

pub mod ch422g;
pub mod ht8574;
pub mod tca95xx;

/// Most sub-addresses a single chip package answers on.
pub const MAX_SUB_DEVICES: usize = 4;

/// I2C addresses a chip needs registered on the bus.
pub type SubAddresses = heapless::Vec<u8, MAX_SUB_DEVICES>;

/// A chip family that can be created on a bus and torn down again.
///
/// `I2C` is the bus handle the driver issues transactions on, `D` the delay source for chips
/// that need settle times.
pub trait Chip<I2C, D>: crate::PortDriver<Error = I2C::BusError> + Sized
where
    I2C: crate::I2cBus,
{
    const NAME: &'static str;

    /// Addresses to register with the host for a device configured at `address`.
    fn sub_addresses(address: u8) -> SubAddresses;

    /// Create the driver.  No bus traffic happens until `reset()`.
    fn create(i2c: I2C, delay: D, address: u8) -> Self;

    /// Tear the driver down and hand the bus back.
    fn release(self) -> I2C;
}

pub(crate) fn single_address(address: u8) -> SubAddresses {
    [address].into_iter().collect()
}
