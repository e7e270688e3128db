//! Bus and device configuration.
//!
//! Both the host (bus controller) and the device side of the configuration come in a partial
//! form, carrying only what a user usually cares about, and a full form carrying every field the
//! transport needs.  The partial form is turned into the full form by [`HostConfig::materialize`]
//! / [`DeviceConfig::materialize`].

/// Identifier of an I2C bus controller.
pub type HostId = u8;

/// Bus controller used when none is given explicitly.
pub const HOST_ID_DEFAULT: HostId = 0;

/// Default bus clock.
pub const CLK_SPEED_DEFAULT: u32 = 400_000;

/// Default timeout of a single bus transaction.
pub const TIMEOUT_MS_DEFAULT: u32 = 10;

/// Role of the bus controller.  Expanders are always driven as master.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BusMode {
    #[default]
    Master,
}

/// Clock source selection flags handed through to the bus controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClockSource {
    #[default]
    Normal,
}

/// Minimal host configuration: pins, pull-ups and clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostPartialConfig {
    /// SDA GPIO number, `-1` if unset.
    pub sda_io_num: i32,
    /// SCL GPIO number, `-1` if unset.
    pub scl_io_num: i32,
    pub sda_pullup_en: bool,
    pub scl_pullup_en: bool,
    pub clk_speed: u32,
}

impl Default for HostPartialConfig {
    fn default() -> Self {
        Self {
            sda_io_num: -1,
            scl_io_num: -1,
            sda_pullup_en: true,
            scl_pullup_en: true,
            clk_speed: CLK_SPEED_DEFAULT,
        }
    }
}

/// Every field the bus controller is created with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostFullConfig {
    pub mode: BusMode,
    pub sda_io_num: i32,
    pub scl_io_num: i32,
    pub sda_pullup_en: bool,
    pub scl_pullup_en: bool,
    pub clk_speed: u32,
    pub clk_source: ClockSource,
}

impl Default for HostFullConfig {
    fn default() -> Self {
        HostPartialConfig::default().into()
    }
}

impl From<HostPartialConfig> for HostFullConfig {
    fn from(p: HostPartialConfig) -> Self {
        Self {
            mode: BusMode::Master,
            sda_io_num: p.sda_io_num,
            scl_io_num: p.scl_io_num,
            sda_pullup_en: p.sda_pullup_en,
            scl_pullup_en: p.scl_pullup_en,
            clk_speed: p.clk_speed,
            clk_source: ClockSource::Normal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostConfig {
    Partial(HostPartialConfig),
    Full(HostFullConfig),
}

impl HostConfig {
    pub fn materialize(&self) -> HostFullConfig {
        match *self {
            HostConfig::Partial(p) => p.into(),
            HostConfig::Full(f) => f,
        }
    }
}

impl Default for HostConfig {
    fn default() -> Self {
        HostConfig::Partial(HostPartialConfig::default())
    }
}

/// I2C address width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AddressLength {
    #[default]
    SevenBit,
}

/// Minimal device configuration: address and clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DevicePartialConfig {
    /// 7-bit device address.
    pub address: u8,
    pub scl_speed_hz: u32,
}

impl DevicePartialConfig {
    pub fn new(address: u8) -> Self {
        Self {
            address,
            scl_speed_hz: CLK_SPEED_DEFAULT,
        }
    }
}

/// Every field a device is registered on the bus with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceFullConfig {
    pub address_length: AddressLength,
    pub address: u8,
    pub scl_speed_hz: u32,
    /// Upper bound for each transaction; exceeding it is reported as a bus error.
    pub timeout_ms: u32,
}

impl From<DevicePartialConfig> for DeviceFullConfig {
    fn from(p: DevicePartialConfig) -> Self {
        Self {
            address_length: AddressLength::SevenBit,
            address: p.address,
            scl_speed_hz: p.scl_speed_hz,
            timeout_ms: TIMEOUT_MS_DEFAULT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceConfig {
    Partial(DevicePartialConfig),
    Full(DeviceFullConfig),
}

impl DeviceConfig {
    pub fn materialize(&self) -> DeviceFullConfig {
        match *self {
            DeviceConfig::Partial(p) => p.into(),
            DeviceConfig::Full(f) => f,
        }
    }
}

/// Complete expander configuration.
///
/// A `host` of `None` means the bus controller is owned by somebody else and the expander only
/// attaches to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    pub host_id: HostId,
    pub host: Option<HostConfig>,
    pub device: DeviceConfig,
}

impl Config {
    /// Configuration for a bus that the expander creates itself on the given pins.
    pub fn internal(scl_io_num: i32, sda_io_num: i32, address: u8) -> Self {
        Self {
            host_id: HOST_ID_DEFAULT,
            host: Some(HostConfig::Partial(HostPartialConfig {
                sda_io_num,
                scl_io_num,
                ..Default::default()
            })),
            device: DeviceConfig::Partial(DevicePartialConfig::new(address)),
        }
    }

    /// Configuration for a bus that was already created by the caller.
    pub fn external(host_id: HostId, address: u8) -> Self {
        Self {
            host_id,
            host: None,
            device: DeviceConfig::Partial(DevicePartialConfig::new(address)),
        }
    }

    pub fn skip_bus_init(&self) -> bool {
        self.host.is_none()
    }

    /// Convert every partial part into its full form.
    ///
    /// If `skip_bus_init` is false and no host configuration was given, the defaults are used.
    pub fn materialize(&self, skip_bus_init: bool) -> ResolvedConfig {
        ResolvedConfig {
            host_id: self.host_id,
            host: if skip_bus_init {
                None
            } else {
                Some(self.host.unwrap_or_default().materialize())
            },
            device: self.device.materialize(),
        }
    }
}

/// Materialized form of a [`Config`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub host_id: HostId,
    pub host: Option<HostFullConfig>,
    pub device: DeviceFullConfig,
}
