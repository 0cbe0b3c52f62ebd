//! Value types decoded from (or encoded into) the radio's registers.

use core::fmt::{Display, Formatter, Result};

use bitfield_struct::bitfield;

/// Power Amplifier level, as written to the `RF_PWR` bits of `RF_SETUP`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PaLevel {
    /// -18 dBm
    Min,
    /// -12 dBm
    Low,
    /// -6 dBm
    High,
    /// 0 dBm
    Max,
}

impl PaLevel {
    pub(crate) const MASK: u8 = 0b110;

    pub(crate) const fn into_bits(self) -> u8 {
        match self {
            PaLevel::Min => 0,
            PaLevel::Low => 2,
            PaLevel::High => 4,
            PaLevel::Max => 6,
        }
    }

    pub(crate) const fn from_bits(value: u8) -> Self {
        match value & Self::MASK {
            0 => PaLevel::Min,
            2 => PaLevel::Low,
            4 => PaLevel::High,
            _ => PaLevel::Max,
        }
    }
}

impl Display for PaLevel {
    fn fmt(&self, f: &mut Formatter) -> Result {
        match self {
            PaLevel::Min => write!(f, "-18 dBm"),
            PaLevel::Low => write!(f, "-12 dBm"),
            PaLevel::High => write!(f, "-6 dBm"),
            PaLevel::Max => write!(f, "0 dBm"),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for PaLevel {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            PaLevel::Min => defmt::write!(fmt, "-18 dBm"),
            PaLevel::Low => defmt::write!(fmt, "-12 dBm"),
            PaLevel::High => defmt::write!(fmt, "-6 dBm"),
            PaLevel::Max => defmt::write!(fmt, "0 dBm"),
        }
    }
}

/// Over the air data rate, as written to `RF_DR_LOW`/`RF_DR_HIGH` of `RF_SETUP`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DataRate {
    /// 1 Mbps
    Mbps1,
    /// 2 Mbps
    Mbps2,
    /// 250 Kbps (not supported by non-plus variants)
    Kbps250,
}

impl DataRate {
    pub(crate) const MASK: u8 = 0x28;

    pub(crate) const fn into_bits(self) -> u8 {
        match self {
            DataRate::Mbps1 => 0,
            DataRate::Mbps2 => 0x08,
            DataRate::Kbps250 => 0x20,
        }
    }

    pub(crate) const fn from_bits(value: u8) -> Self {
        match value & Self::MASK {
            0x08 => DataRate::Mbps2,
            0x20 => DataRate::Kbps250,
            _ => DataRate::Mbps1,
        }
    }
}

impl Display for DataRate {
    fn fmt(&self, f: &mut Formatter) -> Result {
        match self {
            DataRate::Mbps1 => write!(f, "1 Mbps"),
            DataRate::Mbps2 => write!(f, "2 Mbps"),
            DataRate::Kbps250 => write!(f, "250 Kbps"),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for DataRate {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            DataRate::Mbps1 => defmt::write!(fmt, "1 Mbps"),
            DataRate::Mbps2 => defmt::write!(fmt, "2 Mbps"),
            DataRate::Kbps250 => defmt::write!(fmt, "250 Kbps"),
        }
    }
}

/// The CRC scheme used to validate packets (`EN_CRC` and `CRCO` bits of `CONFIG`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CrcLength {
    Disabled,
    Bit8,
    Bit16,
}

impl CrcLength {
    pub(crate) const MASK: u8 = 0b1100;

    pub(crate) const fn into_bits(self) -> u8 {
        match self {
            CrcLength::Disabled => 0,
            CrcLength::Bit8 => 0b1000,
            CrcLength::Bit16 => 0b1100,
        }
    }

    pub(crate) const fn from_bits(value: u8) -> Self {
        match value & Self::MASK {
            0b1000 => CrcLength::Bit8,
            0b1100 => CrcLength::Bit16,
            _ => CrcLength::Disabled,
        }
    }
}

impl Display for CrcLength {
    fn fmt(&self, f: &mut Formatter) -> Result {
        match self {
            CrcLength::Disabled => write!(f, "disabled"),
            CrcLength::Bit8 => write!(f, "8 bit"),
            CrcLength::Bit16 => write!(f, "16 bit"),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for CrcLength {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            CrcLength::Disabled => defmt::write!(fmt, "disabled"),
            CrcLength::Bit8 => defmt::write!(fmt, "8 bit"),
            CrcLength::Bit16 => defmt::write!(fmt, "16 bit"),
        }
    }
}

/// Primary role of the radio (the `PRIM_RX` bit).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Role {
    Transmitter,
    Receiver,
}

/// The result of a finished transmission.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TxOutcome {
    /// The payload was sent (and acknowledged, if auto-ack is enabled).
    Sent,
    /// The auto-retry count was exhausted without an acknowledgement.
    /// The TX FIFO has been flushed.
    MaxRetries,
}

/// The STATUS byte, which the radio clocks out on MISO during the first
/// byte of every SPI transaction.
#[bitfield(u8, order = Msb)]
#[derive(PartialEq, Eq)]
pub struct Status {
    #[bits(1)]
    _reserved: u8,

    /// RX Data Ready.
    #[bits(1, access = RO)]
    pub rx_dr: bool,

    /// TX Data Sent.
    #[bits(1, access = RO)]
    pub tx_ds: bool,

    /// Maximum number of retransmits reached.
    #[bits(1, access = RO)]
    pub max_rt: bool,

    /// Pipe number of the payload available in the RX FIFO (7 when empty).
    #[bits(3, access = RO)]
    pub rx_pipe: u8,

    #[bits(1, access = RO)]
    pub tx_full: bool,
}

impl Status {
    /// Is the RX FIFO empty (according to the `RX_P_NO` field)?
    pub const fn rx_fifo_empty(&self) -> bool {
        self.rx_pipe() == 7
    }
}

impl Display for Status {
    fn fmt(&self, f: &mut Formatter) -> Result {
        write!(
            f,
            "Status rx_dr: {}, tx_ds: {}, max_rt: {}, rx_pipe: {}, tx_full: {}",
            self.rx_dr(),
            self.tx_ds(),
            self.max_rt(),
            self.rx_pipe(),
            self.tx_full()
        )
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Status {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(
            fmt,
            "Status rx_dr: {}, tx_ds: {}, max_rt: {}, rx_pipe: {}, tx_full: {}",
            self.rx_dr(),
            self.tx_ds(),
            self.max_rt(),
            self.rx_pipe(),
            self.tx_full()
        )
    }
}

/// The FIFO_STATUS register.
#[bitfield(u8, order = Msb)]
#[derive(PartialEq, Eq)]
pub struct FifoStatus {
    #[bits(1)]
    _reserved_hi: u8,

    #[bits(1, access = RO)]
    pub tx_reuse: bool,

    #[bits(1, access = RO)]
    pub tx_full: bool,

    #[bits(1, access = RO)]
    pub tx_empty: bool,

    #[bits(2)]
    _reserved_lo: u8,

    #[bits(1, access = RO)]
    pub rx_full: bool,

    #[bits(1, access = RO)]
    pub rx_empty: bool,
}
