//! Lifecycle-managed drivers for I2C GPIO expanders.
//!
//! Supported chips:
//!
//! - `CH422G`: 8 bidirectional pins (IO0-IO7) plus 4 output-only pins (OC0-OC3)
//! - `TCA9554` / `TCA9554A` and `TCA9555` / `TCA9539`: 8 and 16 bidirectional pins
//! - `HT8574`: 8 quasi-bidirectional pins
//!
//! Each chip is driven through an [`Expander`], which owns the bus handle obtained from an
//! [`I2cHost`] and walks through `init()` / `begin()` / `del()`.  Pins are addressed by number or
//! by bitmask; for `embedded-hal` pin objects, wrap the expander in a [`PortMutex`] and create
//! [`Pin`]s from it.
#![cfg_attr(not(test), no_std)]

#[cfg(all(feature = "std", not(test)))]
extern crate std;

mod bus;
mod common;
mod config;
pub mod dev;
mod error;
mod expander;
#[cfg(test)]
mod mock;
mod mutex;
mod pin;

pub use bus::{BusError, I2cBus, I2cHost};
pub use common::mode;
pub use common::{DigitalPort, Direction, InvalidMode, PortDriver, INPUT, OUTPUT};
pub use config::{
    AddressLength, BusMode, ClockSource, Config, DeviceConfig, DeviceFullConfig,
    DevicePartialConfig, HostConfig, HostFullConfig, HostId, HostPartialConfig, ResolvedConfig,
    CLK_SPEED_DEFAULT, HOST_ID_DEFAULT, TIMEOUT_MS_DEFAULT,
};
pub use error::Error;
pub use expander::{
    Ch422gExpander, Expander, Ht8574Expander, LifecycleState, PinStatus, PinStatuses,
    Tca95xx16Expander, Tca95xx8Expander,
};
pub use mutex::PortMutex;
pub use pin::Pin;

pub(crate) use bus::I2cExt;

pub use dev::ch422g::Ch422g;
pub use dev::ht8574::Ht8574;
pub use dev::tca95xx::{Tca95xx16, Tca95xx8};
pub use dev::Chip;
