use embedded_hal::spi::{Mode, MODE_3};

use crate::{BspError, IoTag};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SpiInstance {
    Spi1,
    Spi2,
    Spi3,
    Spi4,
    Spi5,
    Spi6,
}

impl SpiInstance {
    /// 1 - 6
    pub const fn number(self) -> u8 {
        self as u8 + 1
    }
}

/// A pin option of a peripheral signal and the alternate function selecting it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PinDef {
    pub tag: IoTag,
    pub af: u8,
}

impl PinDef {
    pub const fn new(tag: IoTag, af: u8) -> Self {
        Self { tag, af }
    }
}

/// Find the option of `options` routed to `tag`.
pub(crate) fn find_pin(options: &[PinDef], tag: IoTag) -> Result<PinDef, BspError> {
    if tag.is_none() {
        return Err(BspError::PinNotRoutable(tag));
    }
    options
        .iter()
        .find(|p| p.tag == tag)
        .copied()
        .ok_or(BspError::PinNotRoutable(tag))
}

/// The pins an SPI instance can be routed to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpiHardware {
    pub instance: SpiInstance,
    pub sck: &'static [PinDef],
    pub sdi: &'static [PinDef],
    pub sdo: &'static [PinDef],
}

/// The pins a board wires to an SPI instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SpiPinConfig {
    pub instance: SpiInstance,
    pub sck: IoTag,
    pub sdi: IoTag,
    pub sdo: IoTag,
}

/// An SPI instance with each signal bound to a pin and alternate function.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ResolvedSpi {
    pub instance: SpiInstance,
    pub sck: PinDef,
    pub sdi: PinDef,
    pub sdo: PinDef,
}

/// Check a board's pin choice against what the MCU can route.
pub fn resolve(hw: &[SpiHardware], config: &SpiPinConfig) -> Result<ResolvedSpi, BspError> {
    let hw = hw
        .iter()
        .find(|h| h.instance == config.instance)
        .ok_or(BspError::UnknownDevice)?;
    Ok(ResolvedSpi {
        instance: config.instance,
        sck: find_pin(hw.sck, config.sck)?,
        sdi: find_pin(hw.sdi, config.sdi)?,
        sdo: find_pin(hw.sdo, config.sdo)?,
    })
}

/// The smallest power of 2 divisor (2 - 256) that brings `bus_hz` down
/// to `target_hz` or below. 256 if none does.
pub const fn calculate_divisor(bus_hz: u32, target_hz: u32) -> u16 {
    let mut divisor: u32 = 2;
    while divisor < 256 && bus_hz / divisor > target_hz {
        divisor *= 2;
    }
    divisor as u16
}

pub const fn clock_for_divisor(bus_hz: u32, divisor: u16) -> u32 {
    bus_hz / divisor as u32
}

/// The baud rate control bits (`BR[2:0]`) of a divisor from [`calculate_divisor()`].
pub const fn prescaler_bits(divisor: u16) -> u8 {
    (divisor.trailing_zeros() as u8).saturating_sub(1) & 0x7
}

/// Bus parameters of a device on an SPI instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpiBusConfig {
    pub instance: SpiInstance,
    pub mode: Mode,
    pub clock_hz: u32,
}

impl SpiBusConfig {
    /// Mode 3, the mode most flight controller sensors use.
    pub const fn new(instance: SpiInstance, clock_hz: u32) -> Self {
        Self {
            instance,
            mode: MODE_3,
            clock_hz,
        }
    }

    pub const fn with_mode(self, mode: Mode) -> Self {
        Self { mode, ..self }
    }

    /// The divisor to program for a peripheral clocked at `bus_hz`.
    pub const fn divisor(&self, bus_hz: u32) -> u16 {
        calculate_divisor(bus_hz, self.clock_hz)
    }
}
