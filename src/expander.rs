//! Lifecycle shared by all expander chips.
//!
//! An [`Expander`] goes through three states:
//!
//! 1. `Uninit`: only the configuration exists.
//! 2. `Init`: the bus is available, either created by the expander or attached to one the
//!    caller installed ([`Config::host`] is `None`).
//! 3. `Begun`: the chip's device addresses are registered, the driver exists and the chip was
//!    reset to its defaults.  Only now pin operations are allowed.
//!
//! [`Expander::del`] walks back down to `Uninit` and is a no-op when called again.
//!
//! ## Example
//! ```no_run
//! # fn demo<H: i2c_expander::I2cHost>(host: H) -> Result<(), i2c_expander::Error<i2c_expander::BusError<H>>> {
//! use embedded_hal::digital::PinState;
//! use i2c_expander::{Ch422gExpander, Direction};
//!
//! let mut expander = Ch422gExpander::new(host, 18, 19, 0x24);
//! expander.begin()?;
//! expander.pin_mode(3, Direction::Output)?;
//! expander.digital_write(3, PinState::High)?;
//! expander.del()?;
//! # Ok(())
//! # }
//! ```
use core::mem;

use embedded_hal::digital::PinState;
use log::{debug, info, warn};

use crate::bus::{BusError, I2cHost};
use crate::common::{io_mask, is_output};
use crate::config::{Config, DeviceFullConfig, HostId, ResolvedConfig};
use crate::dev::ch422g::Ch422g;
use crate::dev::ht8574::Ht8574;
use crate::dev::tca95xx::{Tca95xx16, Tca95xx8};
use crate::dev::{Chip, SubAddresses};
use crate::{DigitalPort, Direction, Error};

type ExpResult<T, H> = Result<T, Error<BusError<H>>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LifecycleState {
    Uninit,
    Init,
    Begun,
}

/// Direction and levels of a single pin, as reported by [`Expander::pin_status`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinStatus {
    pub direction: Direction,
    pub input: PinState,
    pub output: PinState,
}

/// One [`PinStatus`] per pin, indexed by pin number.
pub type PinStatuses = heapless::Vec<PinStatus, 32>;

enum Stage<B, C> {
    Uninit,
    Init { bus: B },
    Begun { driver: C },
}

/// An expander chip `C` on a bus managed through host `H`.
pub struct Expander<H, C>
where
    H: I2cHost,
    C: Chip<H::Bus, H::Delay>,
{
    host: H,
    config: Config,
    skip_bus_init: bool,
    resolved: Option<ResolvedConfig>,
    sub_devices: SubAddresses,
    stage: Stage<H::Bus, C>,
}

pub type Ch422gExpander<H> = Expander<H, Ch422g<<H as I2cHost>::Bus, <H as I2cHost>::Delay>>;
pub type Tca95xx8Expander<H> = Expander<H, Tca95xx8<<H as I2cHost>::Bus>>;
pub type Tca95xx16Expander<H> = Expander<H, Tca95xx16<<H as I2cHost>::Bus>>;
pub type Ht8574Expander<H> = Expander<H, Ht8574<<H as I2cHost>::Bus>>;

impl<H, C> Expander<H, C>
where
    H: I2cHost,
    C: Chip<H::Bus, H::Delay>,
{
    /// Expander that creates its own bus on the given pins.
    pub fn new(host: H, scl_io_num: i32, sda_io_num: i32, address: u8) -> Self {
        Self::with_config(host, Config::internal(scl_io_num, sda_io_num, address))
    }

    /// Expander on bus `host_id`, which the caller already installed.
    pub fn with_external_bus(host: H, host_id: HostId, address: u8) -> Self {
        Self::with_config(host, Config::external(host_id, address))
    }

    pub fn with_config(host: H, config: Config) -> Self {
        Self {
            host,
            skip_bus_init: config.skip_bus_init(),
            config,
            resolved: None,
            sub_devices: SubAddresses::new(),
            stage: Stage::Uninit,
        }
    }

    pub fn state(&self) -> LifecycleState {
        match self.stage {
            Stage::Uninit => LifecycleState::Uninit,
            Stage::Init { .. } => LifecycleState::Init,
            Stage::Begun { .. } => LifecycleState::Begun,
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn skip_bus_init(&self) -> bool {
        self.skip_bus_init
    }

    /// Decide whether `init()` creates the bus or attaches to an existing one.
    ///
    /// Only allowed before `init()`.
    pub fn configure_skip_bus_init(&mut self, skip: bool) -> ExpResult<(), H> {
        if self.state() != LifecycleState::Uninit {
            return Err(Error::Precondition(
                "bus ownership can only be configured before init",
            ));
        }
        self.skip_bus_init = skip;
        self.resolved = None;
        Ok(())
    }

    fn resolved(&mut self) -> ResolvedConfig {
        let (config, skip) = (self.config, self.skip_bus_init);
        *self
            .resolved
            .get_or_insert_with(|| config.materialize(skip))
    }

    /// Bring up (or attach to) the bus.
    pub fn init(&mut self) -> ExpResult<(), H> {
        if self.state() != LifecycleState::Uninit {
            return Err(Error::AlreadyInitialized);
        }

        let resolved = self.resolved();
        let bus = match resolved.host {
            Some(host_config) => {
                let bus = self
                    .host
                    .create_bus(resolved.host_id, &host_config)
                    .map_err(Error::Transport)?;
                info!("Init I2C host({})", resolved.host_id);
                bus
            }
            None => self
                .host
                .attach_bus(resolved.host_id)
                .map_err(Error::Transport)?,
        };
        self.stage = Stage::Init { bus };
        Ok(())
    }

    /// Create the chip driver and reset the chip.  Calls `init()` first if needed.
    ///
    /// On failure, everything registered so far is released again and the expander stays
    /// initialized.
    pub fn begin(&mut self) -> ExpResult<(), H> {
        match self.state() {
            LifecycleState::Begun => return Err(Error::AlreadyBegun),
            LifecycleState::Uninit => self.init()?,
            LifecycleState::Init => {}
        }

        let bus = match mem::replace(&mut self.stage, Stage::Uninit) {
            Stage::Init { bus } => bus,
            other => {
                self.stage = other;
                return Err(Error::Precondition("bus not available"));
            }
        };

        let resolved = self.resolved();
        if let Err(e) = self.add_sub_devices(&resolved) {
            self.stage = Stage::Init { bus };
            return Err(e);
        }

        let delay = self.host.delay();
        let mut driver = C::create(bus, delay, resolved.device.address);
        if let Err(e) = driver.reset() {
            warn!("Reset {} failed, releasing devices", C::NAME);
            self.remove_sub_devices_best_effort();
            self.stage = Stage::Init {
                bus: driver.release(),
            };
            return Err(Error::Transport(e));
        }

        debug!("Create {} IO expander", C::NAME);
        self.stage = Stage::Begun { driver };
        Ok(())
    }

    fn add_sub_devices(&mut self, resolved: &ResolvedConfig) -> ExpResult<(), H> {
        for address in C::sub_addresses(resolved.device.address) {
            let config = DeviceFullConfig {
                address,
                ..resolved.device
            };
            if let Err(e) = self.host.add_device(resolved.host_id, &config) {
                self.remove_sub_devices_best_effort();
                return Err(Error::Transport(e));
            }
            // only reachable if a chip reports more addresses than `MAX_SUB_DEVICES`
            if self.sub_devices.push(address).is_err() {
                if let Err(e) = self.host.remove_device(resolved.host_id, address) {
                    warn!("Remove device({:#04x}) failed: {:?}", address, e);
                }
                self.remove_sub_devices_best_effort();
                return Err(Error::Allocation);
            }
            debug!("Add device({:#04x})", address);
        }
        Ok(())
    }

    fn remove_sub_devices_best_effort(&mut self) {
        let host_id = self.config.host_id;
        while let Some(address) = self.sub_devices.pop() {
            if let Err(e) = self.host.remove_device(host_id, address) {
                warn!("Remove device({:#04x}) failed: {:?}", address, e);
            }
        }
    }

    /// Tear down the device and, if the expander created it, the bus.
    ///
    /// A device address is only forgotten once its removal succeeded, so a failed `del()` can
    /// simply be called again.
    pub fn del(&mut self) -> ExpResult<(), H> {
        let host_id = self.config.host_id;

        if let Stage::Begun { .. } = self.stage {
            while let Some(&address) = self.sub_devices.last() {
                self.host
                    .remove_device(host_id, address)
                    .map_err(Error::Transport)?;
                self.sub_devices.pop();
                debug!("Remove device({:#04x})", address);
            }
            if let Stage::Begun { driver } = mem::replace(&mut self.stage, Stage::Uninit) {
                self.stage = Stage::Init {
                    bus: driver.release(),
                };
            }
            debug!("Delete {} IO expander", C::NAME);
        }

        if let Stage::Init { bus } = &mut self.stage {
            if !self.skip_bus_init {
                self.host
                    .destroy_bus(host_id, bus)
                    .map_err(Error::Transport)?;
                info!("Delete I2C host({})", host_id);
            }
            self.stage = Stage::Uninit;
        }

        Ok(())
    }

    /// Reset the chip to its default register state.
    pub fn reset(&mut self) -> ExpResult<(), H> {
        self.driver()?.reset().map_err(Error::Transport)
    }

    fn driver(&mut self) -> ExpResult<&mut C, H> {
        match &mut self.stage {
            Stage::Begun { driver } => Ok(driver),
            _ => Err(Error::NotBegun),
        }
    }

    /// The chip driver, once begun.
    pub fn device_mut(&mut self) -> Option<&mut C> {
        self.driver().ok()
    }

    fn pin_bit(pin: u8) -> ExpResult<u32, H> {
        if pin < C::IO_COUNT {
            Ok(1 << pin)
        } else {
            Err(Error::InvalidPin(pin))
        }
    }

    fn clamp_mask(mask: u32) -> u32 {
        let valid = io_mask(C::IO_COUNT);
        if mask & !valid != 0 {
            warn!(
                "Pin mask {:#x} out of range, bits higher than {} are ignored",
                mask,
                C::IO_COUNT - 1
            );
        }
        mask & valid
    }

    pub fn pin_mode(&mut self, pin: u8, dir: Direction) -> ExpResult<(), H> {
        let driver = self.driver()?;
        debug!("Param: pin({}), mode({:?})", pin, dir);
        let bit = Self::pin_bit(pin)?;
        driver.set_direction(bit, dir).map_err(Error::Transport)
    }

    pub fn digital_write(&mut self, pin: u8, level: PinState) -> ExpResult<(), H> {
        let driver = self.driver()?;
        debug!("Param: pin({}), level({:?})", pin, level);
        let bit = Self::pin_bit(pin)?;
        driver.set_level(bit, level)
    }

    pub fn digital_read(&mut self, pin: u8) -> ExpResult<PinState, H> {
        let driver = self.driver()?;
        debug!("Param: pin({})", pin);
        let bit = Self::pin_bit(pin)?;
        let levels = driver.get_level(bit).map_err(Error::Transport)?;
        Ok(PinState::from(levels & bit != 0))
    }

    pub fn multi_pin_mode(&mut self, mask: u32, dir: Direction) -> ExpResult<(), H> {
        let driver = self.driver()?;
        debug!("Param: pin_mask({:#x}), mode({:?})", mask, dir);
        driver
            .set_direction(Self::clamp_mask(mask), dir)
            .map_err(Error::Transport)
    }

    pub fn multi_digital_write(&mut self, mask: u32, level: PinState) -> ExpResult<(), H> {
        let driver = self.driver()?;
        debug!("Param: pin_mask({:#x}), level({:?})", mask, level);
        driver.set_level(Self::clamp_mask(mask), level)
    }

    /// Input levels of the pins in `mask`, one bit per pin.
    pub fn multi_digital_read(&mut self, mask: u32) -> ExpResult<u32, H> {
        let driver = self.driver()?;
        debug!("Param: pin_mask({:#x})", mask);
        driver
            .get_level(Self::clamp_mask(mask))
            .map_err(Error::Transport)
    }

    /// Levels the pins in `mask` are being driven to, one bit per pin.
    pub fn multi_output_read(&mut self, mask: u32) -> ExpResult<u32, H> {
        let driver = self.driver()?;
        let output = driver.read_output().map_err(Error::Transport)?;
        Ok(output & Self::clamp_mask(mask))
    }

    /// Direction, input level and output level of every pin.
    pub fn pin_status(&mut self) -> ExpResult<PinStatuses, H> {
        let driver = self.driver()?;
        let input = driver.read_input().map_err(Error::Transport)?;
        let output = driver.read_output().map_err(Error::Transport)?;
        let dir = driver.read_direction().map_err(Error::Transport)?;

        let mut statuses = PinStatuses::new();
        for pin in 0..C::IO_COUNT {
            let bit = 1 << pin;
            let status = PinStatus {
                direction: if is_output::<C>(dir, bit) {
                    Direction::Output
                } else {
                    Direction::Input
                },
                input: PinState::from(input & bit != 0),
                output: PinState::from(output & bit != 0),
            };
            statuses.push(status).map_err(|_| Error::Allocation)?;
        }
        Ok(statuses)
    }

    /// Log direction, input and output level of every pin.
    pub fn print_status(&mut self) -> ExpResult<(), H> {
        let statuses = self.pin_status()?;

        info!("{} status:", C::NAME);
        for (pin, status) in statuses.iter().enumerate() {
            info!(
                "index[{:2}]: direction {}, input {}, output {}",
                pin,
                match status.direction {
                    Direction::Output => "out",
                    Direction::Input => "in ",
                },
                status.input as u8,
                status.output as u8,
            );
        }
        Ok(())
    }
}

impl<H> Expander<H, Ch422g<H::Bus, H::Delay>>
where
    H: I2cHost,
{
    /// Drive OC0-OC3 as open-drain outputs.
    pub fn enable_oc_open_drain(&mut self) -> ExpResult<(), H> {
        self.driver()?.set_oc_open_drain().map_err(Error::Transport)
    }

    /// Drive OC0-OC3 as push-pull outputs.
    pub fn enable_oc_push_pull(&mut self) -> ExpResult<(), H> {
        self.driver()?.set_oc_push_pull().map_err(Error::Transport)
    }

    /// Switch all of IO0-IO7 to input.  Blocks until the inputs are valid.
    pub fn enable_all_io_input(&mut self) -> ExpResult<(), H> {
        self.driver()?.set_all_input().map_err(Error::Transport)
    }

    /// Switch all of IO0-IO7 to output.
    pub fn enable_all_io_output(&mut self) -> ExpResult<(), H> {
        self.driver()?.set_all_output().map_err(Error::Transport)
    }

    pub fn enter_sleep(&mut self) -> ExpResult<(), H> {
        self.driver()?.enter_sleep().map_err(Error::Transport)
    }

    pub fn exit_sleep(&mut self) -> ExpResult<(), H> {
        self.driver()?.exit_sleep().map_err(Error::Transport)
    }
}

impl<H, C> DigitalPort for Expander<H, C>
where
    H: I2cHost,
    C: Chip<H::Bus, H::Delay>,
{
    type Error = Error<BusError<H>>;

    fn pin_mode(&mut self, pin: u8, dir: Direction) -> Result<(), Self::Error> {
        Expander::pin_mode(self, pin, dir)
    }

    fn digital_write(&mut self, pin: u8, level: PinState) -> Result<(), Self::Error> {
        Expander::digital_write(self, pin, level)
    }

    fn digital_read(&mut self, pin: u8) -> Result<PinState, Self::Error> {
        Expander::digital_read(self, pin)
    }

    fn output_state(&mut self, pin: u8) -> Result<PinState, Self::Error> {
        let output = self.driver()?.read_output().map_err(Error::Transport)?;
        let bit = Self::pin_bit(pin)?;
        Ok(PinState::from(output & bit != 0))
    }
}

impl<H, C> Drop for Expander<H, C>
where
    H: I2cHost,
    C: Chip<H::Bus, H::Delay>,
{
    fn drop(&mut self) {
        if let Err(e) = self.del() {
            warn!("Delete {} failed: {:?}", C::NAME, e);
        }
    }
}
