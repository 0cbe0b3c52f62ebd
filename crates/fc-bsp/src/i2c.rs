use crate::{spi::find_pin, BspError, IoTag, PinDef};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum I2cInstance {
    I2c1,
    I2c2,
    I2c3,
    I2c4,
}

impl I2cInstance {
    /// 1 - 4
    pub const fn number(self) -> u8 {
        self as u8 + 1
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum I2cSpeed {
    /// up to 100 kHz
    Standard,
    /// up to 400 kHz
    Fast,
    /// up to 1 MHz
    FastPlus,
}

impl I2cSpeed {
    pub const MIN_KHZ: u16 = 100;
    pub const MAX_KHZ: u16 = 1000;

    pub const fn from_khz(clock_khz: u16) -> Self {
        if clock_khz <= 100 {
            I2cSpeed::Standard
        } else if clock_khz <= 400 {
            I2cSpeed::Fast
        } else {
            I2cSpeed::FastPlus
        }
    }
}

/// The pins an I2C instance can be routed to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct I2cHardware {
    pub instance: I2cInstance,
    pub scl: &'static [PinDef],
    pub sda: &'static [PinDef],
}

/// The pins and bus settings a board uses for an I2C instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct I2cPinConfig {
    pub instance: I2cInstance,
    pub scl: IoTag,
    pub sda: IoTag,
    /// Enable the internal pull-ups.
    pub pullup: bool,
    pub clock_khz: u16,
}

impl I2cPinConfig {
    /// 400 kHz without internal pull-ups.
    pub const fn new(instance: I2cInstance, scl: IoTag, sda: IoTag) -> Self {
        Self {
            instance,
            scl,
            sda,
            pullup: false,
            clock_khz: 400,
        }
    }

    pub const fn with_pullup(self, pullup: bool) -> Self {
        Self { pullup, ..self }
    }

    pub const fn with_clock_khz(self, clock_khz: u16) -> Self {
        Self { clock_khz, ..self }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ResolvedI2c {
    pub instance: I2cInstance,
    pub scl: PinDef,
    pub sda: PinDef,
    pub pullup: bool,
    /// Clamped to 100 - 1000 kHz.
    pub clock_khz: u16,
    pub speed: I2cSpeed,
}

/// Check a board's pin choice against what the MCU can route.
pub fn resolve(hw: &[I2cHardware], config: &I2cPinConfig) -> Result<ResolvedI2c, BspError> {
    let hw = hw
        .iter()
        .find(|h| h.instance == config.instance)
        .ok_or(BspError::UnknownDevice)?;
    let clock_khz = config.clock_khz.clamp(I2cSpeed::MIN_KHZ, I2cSpeed::MAX_KHZ);
    Ok(ResolvedI2c {
        instance: config.instance,
        scl: find_pin(hw.scl, config.scl)?,
        sda: find_pin(hw.sda, config.sda)?,
        pullup: config.pullup,
        clock_khz,
        speed: I2cSpeed::from_khz(clock_khz),
    })
}
