/// The nRF24L01 register map.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Register {
    Config = 0x00,
    EnAa = 0x01,
    EnRxAddr = 0x02,
    SetupAw = 0x03,
    SetupRetr = 0x04,
    RfCh = 0x05,
    RfSetup = 0x06,
    Status = 0x07,
    ObserveTx = 0x08,
    Rpd = 0x09,
    RxAddrP0 = 0x0A,
    RxAddrP1 = 0x0B,
    RxAddrP2 = 0x0C,
    RxAddrP3 = 0x0D,
    RxAddrP4 = 0x0E,
    RxAddrP5 = 0x0F,
    TxAddr = 0x10,
    RxPwP0 = 0x11,
    RxPwP1 = 0x12,
    RxPwP2 = 0x13,
    RxPwP3 = 0x14,
    RxPwP4 = 0x15,
    RxPwP5 = 0x16,
    FifoStatus = 0x17,
    Dynpd = 0x1C,
    Feature = 0x1D,
}

impl Register {
    /// The register's 5 bit address.
    pub const fn addr(self) -> u8 {
        self as u8 & commands::REGISTER_MASK
    }

    /// The maximum number of bytes the register holds.
    pub const fn width(self) -> usize {
        match self {
            Register::RxAddrP0 | Register::RxAddrP1 | Register::TxAddr => 5,
            _ => 1,
        }
    }

    /// The RX address register of a given `pipe` (0 - 5).
    pub const fn rx_addr(pipe: u8) -> Option<Register> {
        match pipe {
            0 => Some(Register::RxAddrP0),
            1 => Some(Register::RxAddrP1),
            2 => Some(Register::RxAddrP2),
            3 => Some(Register::RxAddrP3),
            4 => Some(Register::RxAddrP4),
            5 => Some(Register::RxAddrP5),
            _ => None,
        }
    }

    /// The static payload width register of a given `pipe` (0 - 5).
    pub const fn rx_pw(pipe: u8) -> Option<Register> {
        match pipe {
            0 => Some(Register::RxPwP0),
            1 => Some(Register::RxPwP1),
            2 => Some(Register::RxPwP2),
            3 => Some(Register::RxPwP3),
            4 => Some(Register::RxPwP4),
            5 => Some(Register::RxPwP5),
            _ => None,
        }
    }
}

/// SPI command bytes.
pub mod commands {
    pub const R_REGISTER: u8 = 0x00;
    pub const W_REGISTER: u8 = 0x20;
    pub const REGISTER_MASK: u8 = 0x1F;
    pub const ACTIVATE: u8 = 0x50;
    pub const R_RX_PL_WID: u8 = 0x60;
    pub const R_RX_PAYLOAD: u8 = 0x61;
    pub const W_TX_PAYLOAD: u8 = 0xA0;
    pub const W_ACK_PAYLOAD: u8 = 0xA8;
    pub const W_TX_PAYLOAD_NO_ACK: u8 = 0xB0;
    pub const FLUSH_TX: u8 = 0xE1;
    pub const FLUSH_RX: u8 = 0xE2;
    pub const REUSE_TX_PL: u8 = 0xE3;
    pub const NOP: u8 = 0xFF;

    /// The data byte that must follow [`ACTIVATE`].
    pub const ACTIVATE_KEY: u8 = 0x73;
}

/// Bit mnemonics of the CONFIG, STATUS and FEATURE registers.
pub mod mnemonics {
    // CONFIG
    pub const MASK_RX_DR: u8 = 1 << 6;
    pub const MASK_TX_DS: u8 = 1 << 5;
    pub const MASK_MAX_RT: u8 = 1 << 4;
    pub const EN_CRC: u8 = 1 << 3;
    pub const CRCO: u8 = 1 << 2;
    pub const PWR_UP: u8 = 1 << 1;
    pub const PRIM_RX: u8 = 1;

    // STATUS (write 1 to clear)
    pub const RX_DR: u8 = 1 << 6;
    pub const TX_DS: u8 = 1 << 5;
    pub const MAX_RT: u8 = 1 << 4;

    // FEATURE
    pub const EN_DPL: u8 = 1 << 2;
    pub const EN_ACK_PAY: u8 = 1 << 1;
    pub const EN_DYN_ACK: u8 = 1;

    // RF_SETUP
    pub const LNA_HCURR: u8 = 1;
}
