//! Hardware tables for flight controller boards.
//!
//! Describes which pins, timers and DMA streams a board wires to which
//! function, checks those choices against what the MCU can route, and
//! arbitrates ownership of pins and DMA streams at start-up. No register is
//! touched here: HAL drivers consume the resolved tables.
//!
//! ```
//! use fc_bsp::{find_board, DmaAllocator, ResourceRegistry};
//!
//! let board = find_board("matekf405").unwrap();
//! let mut io = ResourceRegistry::<48>::new();
//! let mut dma = DmaAllocator::new();
//! board.claim_resources(&mut io, &mut dma).unwrap();
//! ```
#![no_std]

#[cfg(feature = "std")]
extern crate std;

#[macro_use]
mod fmt;

mod error;
pub use error::BspError;

mod io;
pub use io::{IoTag, Owner, Port, ResourceRegistry};

pub mod timer;
pub use timer::{Timer, TimerChannel, TimerHardware, TimerUsage};

pub mod dma;
pub use dma::{
    DmaAllocator, DmaChannelSpec, DmaIdentifier, DmaPeripheral, DmaPeripheralMapping,
    DmaTimerMapping,
};

pub mod spi;
pub use spi::{PinDef, ResolvedSpi, SpiBusConfig, SpiHardware, SpiInstance, SpiPinConfig};

pub mod i2c;
pub use i2c::{I2cHardware, I2cInstance, I2cPinConfig, I2cSpeed, ResolvedI2c};

mod mcu;
pub use mcu::Mcu;

mod board;
pub use board::{find_board, Board, AT32F435_GENERIC, BOARDS, MATEKF405};
