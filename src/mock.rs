//! Test double for [`crate::I2cHost`] on top of `embedded-hal-mock`.

use std::vec::Vec;

use embedded_hal::i2c::ErrorKind;
use embedded_hal_mock::eh1::delay::CheckedDelay;
use embedded_hal_mock::eh1::i2c as mock_i2c;

use crate::config::{DeviceFullConfig, HostFullConfig, HostId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostEvent {
    CreateBus(HostId),
    AttachBus(HostId),
    DestroyBus(HostId),
    AddDevice(u8),
    RemoveDevice(u8),
}

pub struct MockHost {
    bus: mock_i2c::Mock,
    /// Successful management calls, in order.
    pub events: Vec<HostEvent>,
    /// The first call matching this event fails with `ErrorKind::Other`.
    pub fail: Option<HostEvent>,
    delay: CheckedDelay,
    /// Set when the delay mock was created here rather than handed in by the test.
    owns_delay: bool,
    pub last_host_config: Option<HostFullConfig>,
    pub device_configs: Vec<DeviceFullConfig>,
}

impl MockHost {
    /// Host whose delays are not expected to be used.
    pub fn new(bus: &mock_i2c::Mock) -> Self {
        let mut host = Self::with_delay(bus, &CheckedDelay::new(&[]));
        host.owns_delay = true;
        host
    }

    /// Host handing out clones of `delay`.  The test calls `delay.done()` itself.
    pub fn with_delay(bus: &mock_i2c::Mock, delay: &CheckedDelay) -> Self {
        Self {
            bus: bus.clone(),
            events: Vec::new(),
            fail: None,
            delay: delay.clone(),
            owns_delay: false,
            last_host_config: None,
            device_configs: Vec::new(),
        }
    }

    pub fn failing(bus: &mock_i2c::Mock, event: HostEvent) -> Self {
        let mut host = Self::new(bus);
        host.fail = Some(event);
        host
    }

    fn record(&mut self, event: HostEvent) -> Result<(), ErrorKind> {
        if self.fail == Some(event) {
            self.fail = None;
            return Err(ErrorKind::Other);
        }
        self.events.push(event);
        Ok(())
    }
}

impl crate::I2cHost for MockHost {
    type Bus = mock_i2c::Mock;
    type Delay = CheckedDelay;

    fn create_bus(&mut self, id: HostId, config: &HostFullConfig) -> Result<Self::Bus, ErrorKind> {
        self.record(HostEvent::CreateBus(id))?;
        self.last_host_config = Some(*config);
        Ok(self.bus.clone())
    }

    fn attach_bus(&mut self, id: HostId) -> Result<Self::Bus, ErrorKind> {
        self.record(HostEvent::AttachBus(id))?;
        Ok(self.bus.clone())
    }

    fn destroy_bus(&mut self, id: HostId, _bus: &mut Self::Bus) -> Result<(), ErrorKind> {
        self.record(HostEvent::DestroyBus(id))
    }

    fn add_device(&mut self, _id: HostId, config: &DeviceFullConfig) -> Result<(), ErrorKind> {
        self.record(HostEvent::AddDevice(config.address))?;
        self.device_configs.push(*config);
        Ok(())
    }

    fn remove_device(&mut self, _id: HostId, address: u8) -> Result<(), ErrorKind> {
        self.record(HostEvent::RemoveDevice(address))
    }

    fn delay(&mut self) -> Self::Delay {
        self.delay.clone()
    }
}

impl Drop for MockHost {
    fn drop(&mut self) {
        if self.owns_delay && !std::thread::panicking() {
            self.delay.done();
        }
    }
}
