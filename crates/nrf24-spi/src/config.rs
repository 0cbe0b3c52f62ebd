use crate::{
    registers::mnemonics,
    types::{CrcLength, DataRate, PaLevel},
};

/// An object to configure the radio.
///
/// This struct follows a builder pattern. All fields are private, so start with
/// [`Nrf24Config::default`] and chain the `with_*` setters:
/// ```
/// use nrf24_spi::{DataRate, Nrf24Config};
///
/// let config = Nrf24Config::default()
///     .with_channel(42)
///     .with_data_rate(DataRate::Mbps2);
/// assert_eq!(config.channel(), 42);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Nrf24Config {
    channel: u8,
    address_width: u8,
    data_rate: DataRate,
    pa_level: PaLevel,
    lna_enable: bool,
    crc_length: CrcLength,
    retry_delay: u8,
    retry_count: u8,
    auto_ack: u8,
    payload_length: u8,
    dynamic_payloads: bool,
    ack_payloads: bool,
    dynamic_ack: bool,
    rx_dr: bool,
    tx_ds: bool,
    max_rt: bool,
    tx_address: [u8; 5],
    pipe0: [u8; 5],
    pipe1: [u8; 5],
    pipes2_5: [u8; 4],
    rx_pipes_enabled: u8,
}

impl Default for Nrf24Config {
    /// Instantiate a [`Nrf24Config`] with the chip's power-on values
    /// (except the CRC, which is 16 bit).
    ///
    /// | feature | default value |
    /// |--------:|:--------------|
    /// | [`Nrf24Config::channel()`] | `76` |
    /// | [`Nrf24Config::address_width()`] | `5` |
    /// | [`Nrf24Config::data_rate()`] | [`DataRate::Mbps1`] |
    /// | [`Nrf24Config::pa_level()`] | [`PaLevel::Max`] |
    /// | [`Nrf24Config::crc_length()`] | [`CrcLength::Bit16`] |
    /// | [`Nrf24Config::retry_delay()`] | `5` (1500 us) |
    /// | [`Nrf24Config::retry_count()`] | `15` |
    /// | [`Nrf24Config::auto_ack()`] | `0x3F` |
    /// | [`Nrf24Config::payload_length()`] | `32` |
    /// | [`Nrf24Config::dynamic_payloads()`] | `false` |
    /// | [`Nrf24Config::ack_payloads()`] | `false` |
    /// | [`Nrf24Config::dynamic_ack()`] | `false` |
    /// | [`Nrf24Config::tx_address()`] | `[0xE7; 5]` |
    /// | pipe 0 | closed, `[0xE7; 5]` |
    /// | pipe 1 | open, `[0xC2; 5]` |
    /// | pipes 2 - 5 | closed, `0xC3` - `0xC6` |
    fn default() -> Self {
        Self {
            channel: 76,
            address_width: 5,
            data_rate: DataRate::Mbps1,
            pa_level: PaLevel::Max,
            lna_enable: true,
            crc_length: CrcLength::Bit16,
            retry_delay: 5,
            retry_count: 15,
            auto_ack: 0x3F,
            payload_length: 32,
            dynamic_payloads: false,
            ack_payloads: false,
            dynamic_ack: false,
            rx_dr: true,
            tx_ds: true,
            max_rt: true,
            tx_address: [0xE7; 5],
            pipe0: [0xE7; 5],
            pipe1: [0xC2; 5],
            pipes2_5: [0xC3, 0xC4, 0xC5, 0xC6],
            rx_pipes_enabled: 2,
        }
    }
}

impl Nrf24Config {
    pub const fn channel(&self) -> u8 {
        self.channel
    }

    /// Set the RF channel. The frequency is `2400 + channel` MHz.
    ///
    /// This value is clamped to range [0, 125].
    pub fn with_channel(self, channel: u8) -> Self {
        Self {
            channel: channel.min(125),
            ..self
        }
    }

    pub const fn address_width(&self) -> u8 {
        self.address_width
    }

    /// Set the address width used by all pipes.
    ///
    /// This value is clamped to range [3, 5].
    pub fn with_address_width(self, width: u8) -> Self {
        Self {
            address_width: width.clamp(3, 5),
            ..self
        }
    }

    pub const fn data_rate(&self) -> DataRate {
        self.data_rate
    }

    pub fn with_data_rate(self, data_rate: DataRate) -> Self {
        Self { data_rate, ..self }
    }

    pub const fn pa_level(&self) -> PaLevel {
        self.pa_level
    }

    pub fn with_pa_level(self, pa_level: PaLevel) -> Self {
        Self { pa_level, ..self }
    }

    pub const fn lna_enable(&self) -> bool {
        self.lna_enable
    }

    /// Only has an effect on non-plus variants and Si24R1 clones.
    pub fn with_lna_enable(self, lna_enable: bool) -> Self {
        Self { lna_enable, ..self }
    }

    pub const fn crc_length(&self) -> CrcLength {
        self.crc_length
    }

    pub fn with_crc_length(self, crc_length: CrcLength) -> Self {
        Self { crc_length, ..self }
    }

    pub const fn retry_delay(&self) -> u8 {
        self.retry_delay
    }

    pub const fn retry_count(&self) -> u8 {
        self.retry_count
    }

    /// Set the auto-retry `delay` (in steps of 250 us, plus 250 us) and `count`.
    ///
    /// Both values are clamped to range [0, 15].
    pub fn with_auto_retries(self, delay: u8, count: u8) -> Self {
        Self {
            retry_delay: delay.min(15),
            retry_count: count.min(15),
            ..self
        }
    }

    /// The auto-ack bitmask (bit `n` enables pipe `n`).
    pub const fn auto_ack(&self) -> u8 {
        self.auto_ack
    }

    pub fn with_auto_ack(self, pipes: u8) -> Self {
        Self {
            auto_ack: pipes & 0x3F,
            ..self
        }
    }

    pub const fn payload_length(&self) -> u8 {
        self.payload_length
    }

    /// Set the static payload length for all pipes.
    ///
    /// This value is clamped to range [1, 32].
    pub fn with_payload_length(self, length: u8) -> Self {
        Self {
            payload_length: length.clamp(1, 32),
            ..self
        }
    }

    pub const fn dynamic_payloads(&self) -> bool {
        self.dynamic_payloads
    }

    /// Disabling dynamic payloads also disables ACK payloads.
    pub fn with_dynamic_payloads(self, enable: bool) -> Self {
        Self {
            dynamic_payloads: enable,
            ack_payloads: self.ack_payloads && enable,
            ..self
        }
    }

    pub const fn ack_payloads(&self) -> bool {
        self.ack_payloads
    }

    /// Enabling ACK payloads also enables dynamic payloads.
    pub fn with_ack_payloads(self, enable: bool) -> Self {
        Self {
            ack_payloads: enable,
            dynamic_payloads: self.dynamic_payloads || enable,
            ..self
        }
    }

    pub const fn dynamic_ack(&self) -> bool {
        self.dynamic_ack
    }

    /// Allow payloads written with `ack = false` to skip the acknowledgement.
    pub fn with_dynamic_ack(self, enable: bool) -> Self {
        Self {
            dynamic_ack: enable,
            ..self
        }
    }

    /// Select which events assert the IRQ pin.
    pub fn with_irq(self, rx_dr: bool, tx_ds: bool, max_rt: bool) -> Self {
        Self {
            rx_dr,
            tx_ds,
            max_rt,
            ..self
        }
    }

    pub fn tx_address(&self) -> &[u8] {
        &self.tx_address[..self.address_width as usize]
    }

    pub fn with_tx_address(self, address: &[u8]) -> Self {
        let mut tx_address = self.tx_address;
        let len = address.len().min(5);
        tx_address[..len].copy_from_slice(&address[..len]);
        Self { tx_address, ..self }
    }

    /// Set the RX address of a `pipe` and open it.
    ///
    /// Pipes 2 - 5 only store the first byte of `address`;
    /// the rest is shared with pipe 1. Pipes above 5 are ignored.
    pub fn with_rx_address(self, pipe: u8, address: &[u8]) -> Self {
        if pipe > 5 || address.is_empty() {
            return self;
        }
        let mut new = self;
        let len = address.len().min(5);
        match pipe {
            0 => new.pipe0[..len].copy_from_slice(&address[..len]),
            1 => new.pipe1[..len].copy_from_slice(&address[..len]),
            _ => new.pipes2_5[pipe as usize - 2] = address[0],
        }
        new.rx_pipes_enabled |= 1 << pipe;
        new
    }

    pub fn close_rx_pipe(self, pipe: u8) -> Self {
        if pipe > 5 {
            return self;
        }
        Self {
            rx_pipes_enabled: self.rx_pipes_enabled & !(1 << pipe),
            ..self
        }
    }

    pub const fn is_rx_pipe_enabled(&self, pipe: u8) -> bool {
        pipe < 6 && (self.rx_pipes_enabled & (1 << pipe)) > 0
    }

    /// The bytes written to a pipe's RX_ADDR register.
    pub(crate) fn rx_address(&self, pipe: u8) -> &[u8] {
        let width = self.address_width as usize;
        match pipe {
            0 => &self.pipe0[..width],
            1 => &self.pipe1[..width],
            2..=5 => core::slice::from_ref(&self.pipes2_5[pipe as usize - 2]),
            _ => &[],
        }
    }

    /// CONFIG register value (powered down, PTX).
    pub(crate) const fn config_reg(&self) -> u8 {
        let mut value = self.crc_length.into_bits();
        if !self.rx_dr {
            value |= mnemonics::MASK_RX_DR;
        }
        if !self.tx_ds {
            value |= mnemonics::MASK_TX_DS;
        }
        if !self.max_rt {
            value |= mnemonics::MASK_MAX_RT;
        }
        value
    }

    pub(crate) const fn setup_aw(&self) -> u8 {
        self.address_width - 2
    }

    pub(crate) const fn setup_retr(&self) -> u8 {
        (self.retry_delay << 4) | self.retry_count
    }

    pub(crate) const fn rf_setup(&self) -> u8 {
        self.data_rate.into_bits() | self.pa_level.into_bits() | self.lna_enable as u8
    }

    pub(crate) const fn feature(&self) -> u8 {
        let mut value = 0;
        if self.dynamic_payloads {
            value |= mnemonics::EN_DPL;
        }
        if self.ack_payloads {
            value |= mnemonics::EN_ACK_PAY;
        }
        if self.dynamic_ack {
            value |= mnemonics::EN_DYN_ACK;
        }
        value
    }

    pub(crate) const fn dynpd(&self) -> u8 {
        0x3F * self.dynamic_payloads as u8
    }

    pub(crate) const fn en_rxaddr(&self) -> u8 {
        self.rx_pipes_enabled
    }
}
